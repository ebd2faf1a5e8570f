//! # skin-bot
//!
//! Chat front end for the skin market advisor: ranked lists, item details,
//! budget plans and on-demand analysis, rendered as text plus buttons.
//!
//! ## Conversation map
//!
//! ```text
//! ┌────────┐    ┌──────────────┐  cat_*   ┌─────────────┐  item_*  ┌─────────┐
//! │ /start │    │ /top (menu)  │ ───────► │ ranked list │ ───────► │ details │
//! └────────┘    └──────────────┘ ◄─────── │  page_n_*   │          └─────────┘
//!                      ▲   back_to_top    └─────────────┘               │
//!                      └────────────────────────────────────────────────┘
//!
//! ┌────────────────┐ budget_* / "15000" ┌──────────┐
//! │ /budget (menu) │ ─────────────────► │   plan   │ ── budget_new ──► menu
//! └────────────────┘                    └──────────┘
//!
//! /analyze ──► ack now ──► sweep on a task ──► Notification later
//! ```
//!
//! The bot does not know about any chat network. A transport feeds it text or
//! button payloads and delivers the returned [`Reply`] values.

pub mod bot;
pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod message;

pub use bot::BotService;
pub use command::Command;
pub use config::BotConfig;
pub use error::{BotError, Result};
pub use message::{Button, ChatId, Notification, Reply};
