//! Moxie Chat server

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moxie_chat::config::{Config, StorageBackend};
use moxie_chat::conversation::{ConversationStore, InMemoryStore};
use moxie_chat::core::{ChatEngine, MemoryStore};
use moxie_chat::providers::Provider;
use moxie_chat::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moxie_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let provider = Provider::from_config(&config.llm)?;
    tracing::info!(
        "Using {} provider with model {}",
        provider.name(),
        config.llm.model
    );

    let sqlite = match config.storage {
        StorageBackend::Sqlite => {
            let path = config.database_path();
            tracing::info!("Conversations stored in {}", path.display());
            Some(Arc::new(MemoryStore::new(&path).await?))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory conversation store; history is lost on exit");
            None
        }
    };

    let store: Arc<dyn ConversationStore> = match &sqlite {
        Some(db) => db.clone(),
        None => Arc::new(InMemoryStore::new()),
    };

    let chat_engine = Arc::new(ChatEngine::new(store, Arc::new(provider)));
    let state = AppState {
        config,
        chat_engine,
    };

    let app = moxie_chat::app(state);

    tracing::info!("Moxie Chat running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = sqlite {
        db.close().await;
    }
    tracing::info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown requested");
}
