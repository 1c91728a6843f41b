//! Moxie widget: a stateless chat prompt on the terminal
//!
//! Each line typed is sent to the configured provider as-is and the raw reply
//! is printed. Nothing is stored.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moxie_chat::config::Config;
use moxie_chat::core::widget;
use moxie_chat::providers::Provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moxie_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let provider = Provider::from_config(&config.llm)?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(
            format!(
                "Moxie ({} / {}). Ask a question, Ctrl-D to quit.\n",
                provider.name(),
                config.llm.model
            )
            .as_bytes(),
        )
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match widget::reply(&provider, &line).await {
            Ok(answer) => {
                stdout.write_all(answer.as_bytes()).await?;
                stdout.write_all(b"\n\n").await?;
            }
            Err(e) => {
                tracing::error!("Provider request failed: {}", e);
                stdout.write_all(b"Sorry, the model is unavailable right now.\n\n").await?;
            }
        }
    }

    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
