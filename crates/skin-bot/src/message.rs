//! Chat Messages
//!
//! Transport-neutral reply format: text plus an optional button grid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation identifier
pub type ChatId = i64;

/// Inline button; `data` is fed back to the bot verbatim when pressed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// One outgoing message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,

    /// Rows of buttons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Vec<Button>>,

    /// Picture to show alongside the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Vec<Button>>) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// All button payloads, row by row
    pub fn button_data(&self) -> impl Iterator<Item = &str> {
        self.buttons.iter().flatten().map(|b| b.data.as_str())
    }
}

/// Message pushed to a chat outside a request/response exchange
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Background run that produced it
    pub run_id: Uuid,
    pub chat_id: ChatId,
    pub reply: Reply,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(run_id: Uuid, chat_id: ChatId, reply: Reply) -> Self {
        Self {
            run_id,
            chat_id,
            reply,
            created_at: Utc::now(),
        }
    }
}
