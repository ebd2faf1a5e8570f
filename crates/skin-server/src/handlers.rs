//! HTTP/WebSocket Handlers

use axum::{
    Json,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use skin_advisor::scheduler::run_analysis;
use skin_advisor::{AllocationPlan, Category, ItemTrend, TrendQuery};
use skin_bot::{ChatId, Notification, Reply};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// Upper bound for `limit` on ranked listings
const MAX_TREND_LIMIT: usize = 200;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub market: String,
    pub tracked_items: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub replies: Vec<Reply>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsParams {
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub min_score: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct BudgetRequest {
    pub budget: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    pub chat_id: Option<ChatId>,
}

/// Outbound WebSocket frame
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamFrame<'a> {
    Reply { chat_id: ChatId, reply: &'a Reply },
    Notification(&'a Notification),
    Error { error: String },
}

impl StreamFrame<'_> {
    fn to_message(&self) -> Message {
        let text = serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({"type": "error", "error": e.to_string()}).to_string()
        });
        Message::Text(text.into())
    }
}

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let tracked_items = state.catalog.item_count().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "item count unavailable");
        0
    });

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        market: state.market_source.clone(),
        tracked_items,
    })
}

/// One chat turn: text or button payload in, replies out
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let replies = state.bot.handle(payload.chat_id, &payload.text);
    Json(ChatResponse { replies })
}

/// Ranked trends as JSON
pub async fn trends_handler(
    State(state): State<AppState>,
    Query(params): Query<TrendsParams>,
) -> Result<Json<Vec<ItemTrend>>, ApiError> {
    let category = match params.category.as_deref() {
        None | Some("" | "all") => None,
        Some(slug) => Some(Category::parse(slug).ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("unknown category '{slug}'"),
                "UNKNOWN_CATEGORY",
            )
        })?),
    };

    let defaults = state.bot.config();
    let limit = params
        .limit
        .unwrap_or(defaults.list_limit)
        .clamp(1, MAX_TREND_LIMIT);
    let min_score = params.min_score.unwrap_or(defaults.min_score).min(10);

    let query = TrendQuery::new(limit)
        .with_category(category)
        .with_min_score(min_score);

    state.trends.top(&query).map(Json).map_err(|e| {
        tracing::error!(error = %e, "trend query failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), "TRENDS_ERROR")
    })
}

/// Allocation plan for a budget
pub async fn budget_handler(
    State(state): State<AppState>,
    Json(payload): Json<BudgetRequest>,
) -> Result<Json<AllocationPlan>, ApiError> {
    let config = state.bot.config();
    if payload.budget < config.min_budget || payload.budget > config.max_budget {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!(
                "budget must be between {} and {}",
                config.min_budget, config.max_budget
            ),
            "BUDGET_OUT_OF_RANGE",
        ));
    }

    state.bot.advisor().plan(payload.budget).map(Json).map_err(|e| {
        tracing::error!(error = %e, "budget planning failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), "BUDGET_ERROR")
    })
}

/// Start a sweep in the background
pub async fn analyze_handler(State(state): State<AppState>) -> (StatusCode, Json<AnalyzeResponse>) {
    let analyzer = state.analyzer.clone();
    tokio::spawn(async move {
        match run_analysis(analyzer).await {
            Ok(report) => tracing::info!(?report, "on-demand analysis finished"),
            Err(e) => tracing::error!(error = %e, "on-demand analysis failed"),
        }
    });

    (StatusCode::ACCEPTED, Json(AnalyzeResponse { status: "started" }))
}

/// WebSocket chat with pushed notifications
pub async fn chat_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state, params.chat_id))
}

/// The socket is bound to one chat: the `chat_id` query parameter, or else
/// the chat of the first inbound frame. Only that chat's notifications are
/// forwarded.
async fn handle_stream(socket: WebSocket, state: AppState, mut chat_id: Option<ChatId>) {
    let (mut sender, mut receiver) = socket.split();
    let mut notifications = state.bot.subscribe();

    loop {
        tokio::select! {
            inbound = receiver.next() => {
                let text = match inbound {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => continue,
                };

                let request: ChatRequest = match serde_json::from_str(&text) {
                    Ok(r) => r,
                    Err(e) => {
                        let frame = StreamFrame::Error { error: e.to_string() };
                        if sender.send(frame.to_message()).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };
                chat_id.get_or_insert(request.chat_id);

                for reply in state.bot.handle(request.chat_id, &request.text) {
                    let frame = StreamFrame::Reply { chat_id: request.chat_id, reply: &reply };
                    if sender.send(frame.to_message()).await.is_err() {
                        return;
                    }
                }
            }
            pushed = notifications.recv() => {
                match pushed {
                    Ok(notification) if Some(notification.chat_id) == chat_id => {
                        let frame = StreamFrame::Notification(&notification);
                        if sender.send(frame.to_message()).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "stream fell behind on notifications");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}
