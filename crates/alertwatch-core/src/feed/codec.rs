//! RSS payload decoding.
//!
//! The payload is decoded to UTF-8 first (BOM, then the XML declaration's
//! `encoding` label, then UTF-8 as a fallback) and deserialized with
//! quick-xml. Only the item children we consume are modelled; anything else
//! in the document is ignored.

use chrono::{DateTime, Utc};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use tracing::warn;

use super::item::{Item, Snapshot};
use crate::error::{DecodeError, TimestampParseError};

/// Feed timestamp layout: RFC-1123 with a numeric zone,
/// e.g. `Sat, 04 May 2024 18:30:00 +0000`.
pub const FEED_TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

#[derive(Debug, Deserialize)]
struct RssDocument {
    #[serde(default)]
    channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RawItem>,
}

/// Element whose attributes we do not care about (e.g. `<guid isPermaLink="false">`).
#[derive(Debug, Default, Deserialize)]
pub struct TextNode {
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// An `<item>` exactly as it appears in the feed, before timestamp parsing.
#[derive(Debug, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub guid: Option<TextNode>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
}

impl RawItem {
    /// Convert into the internal model.
    ///
    /// Each present timestamp is parsed on its own; a bad value drops only
    /// that boundary and is reported alongside the item.
    pub fn into_item(self) -> (Item, Vec<TimestampParseError>) {
        let guid = self
            .guid
            .map(|g| g.value.trim().to_string())
            .unwrap_or_default();

        let mut errors = Vec::new();
        let starts_at = parse_field(&guid, "pubDate", self.pub_date.as_deref(), &mut errors);
        let ends_at = parse_field(&guid, "expiry", self.expiry.as_deref(), &mut errors);

        let item = Item {
            guid,
            title: self.title.trim().to_string(),
            category: self.author.trim().to_string(),
            description: self.description.trim().to_string(),
            starts_at,
            ends_at,
        };
        (item, errors)
    }
}

/// Parse a feed timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_str(value.trim(), FEED_TIMESTAMP_FORMAT).map(|dt| dt.with_timezone(&Utc))
}

fn parse_field(
    guid: &str,
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<TimestampParseError>,
) -> Option<DateTime<Utc>> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match parse_timestamp(value) {
        Ok(at) => Some(at),
        Err(e) => {
            errors.push(TimestampParseError {
                guid: guid.to_string(),
                field,
                value: value.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

/// Resolve the payload's charset and return it as UTF-8 text.
pub fn decode_payload(bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }

    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => match declared_encoding(bytes) {
            Some(label) => Encoding::for_label(label.as_bytes())
                .ok_or(DecodeError::Charset { label })?,
            None => UTF_8,
        },
    };

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(charset = used.name(), "feed payload contained malformed byte sequences");
    }
    Ok(text.into_owned())
}

/// The `encoding` attribute of the XML declaration, if there is one.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Decl(decl)) => {
                let label = decl.encoding()?.ok()?;
                return Some(String::from_utf8_lossy(&label).trim().to_string());
            }
            Ok(Event::Text(t)) if t.iter().all(u8::is_ascii_whitespace) => {
                buf.clear();
            }
            _ => return None,
        }
    }
}

/// Decode a raw payload into items plus the timestamps that had to be dropped.
pub fn decode_items(bytes: &[u8]) -> Result<(Vec<Item>, Vec<TimestampParseError>), DecodeError> {
    let text = decode_payload(bytes)?;
    let document: RssDocument = quick_xml::de::from_str(&text)?;

    let mut items = Vec::with_capacity(document.channel.items.len());
    let mut rejected = Vec::new();
    for raw in document.channel.items {
        let (item, errors) = raw.into_item();
        items.push(item);
        rejected.extend(errors);
    }
    Ok((items, rejected))
}

/// Decode a raw payload into a snapshot, logging dropped timestamps.
pub fn decode_snapshot(bytes: &[u8], fetched_at: DateTime<Utc>) -> Result<Snapshot, DecodeError> {
    let (items, rejected) = decode_items(bytes)?;
    for err in &rejected {
        warn!(guid = %err.guid, field = err.field, "{err}");
    }
    Ok(Snapshot::new(items, fetched_at))
}
