use alertwatch_core::{
    Cadence, ConfigError, DiscordWebhook, Evaluator, FeedSource, HttpFeedSource, LogNotifier,
    Notifier, QueryCommand, SelectedItem, SnapshotExchange, StatusQuery, SystemClock, Watcher,
};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::load_config;

/// Run the watcher until Ctrl-C. Query commands typed on stdin are answered
/// on stdout.
pub async fn run(config_path: Option<&Path>, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    let notifier: Arc<dyn Notifier> = if dry_run {
        Arc::new(LogNotifier)
    } else {
        if !config.discord.is_configured() {
            return Err(ConfigError::MissingKey(
                "discord.webhook_id / discord.webhook_token (or pass --dry-run)".into(),
            )
            .into());
        }
        Arc::new(DiscordWebhook::from_config(&config.discord)?)
    };

    let source: Arc<dyn FeedSource> = Arc::new(HttpFeedSource::from_config(&config.feed)?);
    let exchange = SnapshotExchange::new();
    let selected = SelectedItem::new();

    let evaluator = Evaluator::new(Arc::clone(&notifier), selected.clone())
        .with_heads_up(config.evaluation.heads_up());
    let cadence = Cadence::from_config(&config);

    info!(
        url = %config.feed.url,
        notifier = notifier.name(),
        refresh_secs = config.feed.refresh_secs,
        interval_ms = config.evaluation.interval_ms,
        "alertwatch starting"
    );
    let handle = Watcher::new(source, Arc::new(SystemClock), cadence, exchange.clone())
        .start(evaluator)
        .await;

    let query = StatusQuery::new(exchange, selected);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("interrupt received, shutting down");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if let Some(command) = QueryCommand::parse(&config.query.prefix, &line) {
                        println!("{}", query.answer(command, Utc::now()));
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin closed: {e}");
                    stdin_open = false;
                }
            },
        }
    }

    handle.abort();
    Ok(())
}
