use alertwatch_core::feed::FeedSource;
use alertwatch_core::{
    select_boundary_candidate, BoundaryKind, HttpFeedSource, QueryCommand, SelectedItem,
    SnapshotExchange, StatusQuery,
};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

use super::load_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Current,
    All,
}

/// Fetch the feed once and print the answer to a status query.
///
/// Nothing is dispatched.
pub async fn run(config_path: Option<&Path>, scope: Scope) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let source = HttpFeedSource::from_config(&config.feed)?;
    let snapshot = Arc::new(source.fetch().await?);
    let now = Utc::now();

    let selected = SelectedItem::new();
    if let Some(c) = select_boundary_candidate(&snapshot, BoundaryKind::Start, now) {
        selected.publish(c.item.clone());
    }

    let exchange = SnapshotExchange::new();
    exchange.publish(snapshot);

    let command = match scope {
        Scope::Current => QueryCommand::Current,
        Scope::All => QueryCommand::All,
    };
    print!("{}", StatusQuery::new(exchange, selected).answer(command, now));
    Ok(())
}
