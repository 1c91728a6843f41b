//! API routes

mod session;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{Html, IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::core::{ChatRequest, ChatResponse};
use crate::error::ApiError;
use crate::AppState;

pub use session::{UserContext, USER_COOKIE};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const SCRIPTS_JS: &str = include_str!("../../static/js/scripts.js");

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateConversationResponse {
    pub conversation_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteConversationRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteConversationResponse {
    pub message: String,
}

async fn index(user: UserContext, jar: CookieJar) -> impl IntoResponse {
    let jar = if user.is_new {
        tracing::debug!("New visitor {}", user.user_id);
        jar.add(user.cookie())
    } else {
        jar
    };
    (jar, Html(INDEX_HTML))
}

async fn scripts() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        SCRIPTS_JS,
    )
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.config.llm.provider.clone(),
    })
}

async fn chat(
    State(state): State<AppState>,
    user: UserContext,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::debug!("Chat turn from user {}", user.user_id);

    let response = state
        .chat_engine
        .chat(request)
        .await
        .map_err(ApiError::from_chat_turn)?;

    Ok(Json(response))
}

async fn create_conversation(
    State(state): State<AppState>,
) -> Result<Json<CreateConversationResponse>, ApiError> {
    let conversation_id = state.chat_engine.create_conversation().await?;
    Ok(Json(CreateConversationResponse { conversation_id }))
}

async fn get_conversations(
    State(state): State<AppState>,
) -> Result<Json<ConversationsResponse>, ApiError> {
    let conversations = state.chat_engine.list_conversations().await?;
    Ok(Json(ConversationsResponse { conversations }))
}

async fn delete_conversation(
    State(state): State<AppState>,
    payload: Result<Json<DeleteConversationRequest>, JsonRejection>,
) -> Result<Json<DeleteConversationResponse>, ApiError> {
    // An unreadable body is treated the same as a missing ID
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    state
        .chat_engine
        .delete_conversation(request.conversation_id.as_deref())
        .await?;

    Ok(Json(DeleteConversationResponse {
        message: "Conversation deleted successfully".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/static/js/scripts.js", get(scripts))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/create_conversation", post(create_conversation))
        .route("/get_conversations", get(get_conversations))
        .route("/delete_conversation", delete(delete_conversation))
}
