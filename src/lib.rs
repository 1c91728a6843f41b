//! Moxie Chat - web chat with persistent conversations
//!
//! Accepts chat messages over HTTP, builds a context from the conversation so
//! far, asks an LLM provider for a reply, tidies the reply into lines and saves
//! the exchange. A separate `moxie-widget` binary offers the same model as a
//! stateless prompt.

pub mod config;
pub mod conversation;
pub mod core;
pub mod error;
pub mod providers;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::core::ChatEngine;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat_engine: Arc<ChatEngine>,
}

/// Build the full HTTP application
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
