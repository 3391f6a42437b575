//! Alert message rendering.

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::feed::Item;
use crate::ranker::Transition;

const TIMESTAMP_LAYOUT: &str = "%d/%m/%Y %H:%M:%S";
const MISSING_TIMESTAMP: &str = "--/--/---- --:--:--";

pub const ALREADY_STARTED: &str = "already started";
pub const ALREADY_EXPIRED: &str = "already expired";
pub const NOT_AVAILABLE: &str = "n/a";

const EXPIRED_BANNER: &str = "**EXPIRED!**";
const HEADS_UP_BANNER: &str = "**HEADS UP!**";

/// Zone absolute timestamps are rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

/// Renders the human-readable alert text for an item.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertFormatter {
    zone: RenderZone,
}

impl AlertFormatter {
    pub fn new(zone: RenderZone) -> Self {
        Self { zone }
    }

    /// Render in a fixed offset, independent of the host time zone.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self::new(RenderZone::Fixed(offset))
    }

    /// Title, countdown phrases, absolute boundaries and category label.
    pub fn format_alert(&self, now: DateTime<Utc>, item: &Item) -> String {
        let start = countdown(now, item.starts_at, ALREADY_STARTED);
        let expiry = countdown(now, item.ends_at, ALREADY_EXPIRED);
        let starts = self.timestamp(item.starts_at);
        let ends = self.timestamp(item.ends_at);

        format!(
            "**Title:** {}\n**Starts:** {start} *({starts})*\n**Expires:** {expiry} *({ends})*\n**Type:** {}\n\n",
            item.title, item.category
        )
    }

    /// The message dispatched when `transition` is crossed.
    pub fn format_notification(
        &self,
        transition: Transition,
        now: DateTime<Utc>,
        item: &Item,
    ) -> String {
        let body = self.format_alert(now, item);
        match transition {
            Transition::Starting => body,
            Transition::Expiring => format!("{EXPIRED_BANNER}\n{body}"),
            Transition::StartingSoon => format!("{HEADS_UP_BANNER}\n{body}"),
        }
    }

    fn timestamp(&self, at: Option<DateTime<Utc>>) -> String {
        let Some(at) = at else {
            return MISSING_TIMESTAMP.to_string();
        };
        match self.zone {
            RenderZone::Local => at.with_timezone(&Local).format(TIMESTAMP_LAYOUT).to_string(),
            RenderZone::Fixed(offset) => at.with_timezone(&offset).format(TIMESTAMP_LAYOUT).to_string(),
        }
    }
}

/// `+Nm` while the boundary is still ahead, `reached` once it has passed.
fn countdown(now: DateTime<Utc>, boundary: Option<DateTime<Utc>>, reached: &str) -> String {
    match boundary {
        None => NOT_AVAILABLE.to_string(),
        Some(at) if at > now => format!("+{}m", (at - now).num_minutes()),
        Some(_) => reached.to_string(),
    }
}
