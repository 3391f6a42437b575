pub mod codec;
pub mod fetcher;
pub mod item;

pub use codec::{decode_items, decode_snapshot, parse_timestamp, FEED_TIMESTAMP_FORMAT};
pub use fetcher::{FeedSource, HttpFeedSource};
pub use item::{Item, Snapshot};
