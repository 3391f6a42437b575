use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// One feed entry.
///
/// Boundaries are stored in UTC and only localized when rendered. A missing
/// boundary means the item is not tracked for that transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity (the feed's `guid`).
    pub guid: String,
    pub title: String,
    /// Author / mission type label.
    pub category: String,
    pub description: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(guid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_start(mut self, at: DateTime<Utc>) -> Self {
        self.starts_at = Some(at);
        self
    }

    pub fn with_end(mut self, at: DateTime<Utc>) -> Self {
        self.ends_at = Some(at);
        self
    }

    /// Both boundaries known; these are the items listed by the `alerts` query.
    pub fn is_bounded(&self) -> bool {
        self.starts_at.is_some() && self.ends_at.is_some()
    }
}

/// Immutable result of one fetch cycle.
///
/// A new snapshot replaces the previous one wholesale. Once published it is
/// shared behind an `Arc` and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    items: Vec<Item>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(items: Vec<Item>, fetched_at: DateTime<Utc>) -> Self {
        Self { items, fetched_at }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Items with both a start and an expiry, in feed order.
    pub fn bounded(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_bounded())
    }
}

impl Deref for Snapshot {
    type Target = [Item];

    fn deref(&self) -> &[Item] {
        &self.items
    }
}
