//! Terminal client for the coverage advisor chat

use advisor_chat::config::ChatConfig;
use advisor_chat::gateway::{HttpGateway, LoggingGateway};
use advisor_chat::presenter::{numbered_choices, parse_command, Command, TerminalPresenter};
use advisor_chat::runtime::{spawn_runtime, TranscriptObserver};
use advisor_chat::state_machine::ChatContext;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisor_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env();
    tracing::info!(
        api_url = %config.api_url,
        request_timeout_secs = config.request_timeout.as_secs(),
        reminder_delay_secs = config.reminder_delay.as_secs(),
        "Starting advisor chat"
    );

    let gateway = LoggingGateway::new(HttpGateway::from_config(&config)?);
    let presenter: Arc<dyn TranscriptObserver> =
        Arc::new(TerminalPresenter::new(std::io::stdout()));
    let handle = spawn_runtime(ChatContext::from_config(&config), gateway, vec![presenter]);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::NewSession => handle.new_session().await?,
            Command::QuickReply(n) => {
                let view = handle.view();
                let choice = n
                    .checked_sub(1)
                    .and_then(|i| numbered_choices(&view).get(i).map(ToString::to_string));
                match choice {
                    Some(option) => handle.quick_reply(option).await?,
                    None => tracing::debug!(index = n, "No quick reply at that index"),
                }
            }
            Command::Text(text) => {
                handle.set_input(text).await?;
                handle.submit().await?;
            }
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}
