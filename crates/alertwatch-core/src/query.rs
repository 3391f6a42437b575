//! On-demand status queries.
//!
//! Read-only: answers come from the latest snapshot and the last selected
//! item, never blocking the fetch or evaluation loops.

use chrono::{DateTime, Utc};

use crate::exchange::{SelectedItem, SnapshotExchange};
use crate::notify::AlertFormatter;

pub const NO_ACTIVE_ALERT: &str = "No active alert.";
pub const NO_ALERTS: &str = "No alerts available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCommand {
    /// The most recently selected item.
    Current,
    /// Every item with both a start and an expiry.
    All,
}

impl QueryCommand {
    /// Parse `"{prefix}alert"` / `"{prefix}alerts"`.
    pub fn parse(prefix: &str, text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix(prefix)?;
        if rest.ends_with("alerts") {
            Some(QueryCommand::All)
        } else if rest.ends_with("alert") {
            Some(QueryCommand::Current)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusQuery {
    exchange: SnapshotExchange,
    selected: SelectedItem,
    formatter: AlertFormatter,
}

impl StatusQuery {
    pub fn new(exchange: SnapshotExchange, selected: SelectedItem) -> Self {
        Self {
            exchange,
            selected,
            formatter: AlertFormatter::default(),
        }
    }

    pub fn with_formatter(mut self, formatter: AlertFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn answer(&self, command: QueryCommand, now: DateTime<Utc>) -> String {
        match command {
            QueryCommand::Current => match self.selected.latest() {
                Some(item) => self.formatter.format_alert(now, &item),
                None => NO_ACTIVE_ALERT.to_string(),
            },
            QueryCommand::All => {
                let Some(snapshot) = self.exchange.latest() else {
                    return NO_ALERTS.to_string();
                };
                let text: String = snapshot
                    .bounded()
                    .map(|item| self.formatter.format_alert(now, item))
                    .collect();
                if text.is_empty() {
                    NO_ALERTS.to_string()
                } else {
                    text
                }
            }
        }
    }
}
