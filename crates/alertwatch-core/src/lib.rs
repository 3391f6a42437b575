//! # alertwatch Core Library
//!
//! Tracks time-bounded events published in a periodically refreshed RSS
//! feed and emits at-most-once notifications when an event starts, is about
//! to start, or expires.
//!
//! ## Architecture
//!
//! - **Feed**: HTTP fetcher and charset-aware RSS codec producing immutable
//!   [`Snapshot`]s
//! - **Ranker**: picks the item whose start/expiry boundary was reached most
//!   recently
//! - **Ledger**: per (item, transition) at-most-once bookkeeping
//! - **Notify**: alert formatting and delivery (Discord webhook, dry-run log)
//! - **Exchange**: single-slot handoff of the latest snapshot and the
//!   currently selected item
//! - **Pipeline**: the evaluation engine plus the fetch and evaluation loops
//! - **Query**: read-only answers for `alert` / `alerts` commands
//!
//! ## Key Components
//!
//! - [`Evaluator`]: one serialized evaluation cycle per tick
//! - [`Watcher`]: eager fetch plus the two periodic loops
//! - [`Config`]: TOML configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod exchange;
pub mod feed;
pub mod ledger;
pub mod notify;
pub mod pipeline;
pub mod query;
pub mod ranker;

pub use clock::{Cadence, Clock, SystemClock};
pub use config::Config;
pub use error::{
    ConfigError, CoreError, DecodeError, DeliveryError, FetchError, TimestampParseError,
};
pub use exchange::{SelectedItem, SnapshotExchange};
pub use feed::{FeedSource, HttpFeedSource, Item, Snapshot};
pub use ledger::{AnnouncementLedger, TransitionRecord};
pub use notify::{AlertFormatter, DiscordWebhook, LogNotifier, Notifier, RenderZone};
pub use pipeline::{Evaluator, EvaluationReport, Watcher, WatcherHandle};
pub use query::{QueryCommand, StatusQuery};
pub use ranker::{select_boundary_candidate, BoundaryKind, Candidate, Transition};
