//! Integration tests for feed retrieval against a mocked HTTP endpoint.

use std::sync::Arc;
use std::time::Duration;

use alertwatch_core::feed::FeedSource;
use alertwatch_core::pipeline::fetch_once;
use alertwatch_core::{CoreError, FetchError, HttpFeedSource, SnapshotExchange};
use chrono::{TimeZone, Utc};
use indoc::indoc;

const FEED: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <rss version="2.0">
      <channel>
        <title>Alerts</title>
        <item>
          <guid>alert-1</guid>
          <title>Defense on Venus</title>
          <author>Alert</author>
          <description>Orokin Cell</description>
          <pubDate>Sat, 04 May 2024 18:30:00 +0000</pubDate>
          <expiry>Sat, 04 May 2024 19:30:00 +0000</expiry>
        </item>
        <item>
          <guid>invasion-7</guid>
          <title>Grineer vs Corpus</title>
          <author>Invasion</author>
          <pubDate>Sat, 04 May 2024 17:00:00 +0000</pubDate>
          <expiry>not a date</expiry>
        </item>
      </channel>
    </rss>
"#};

fn source(server: &mockito::ServerGuard) -> HttpFeedSource {
    HttpFeedSource::new(format!("{}/rss.php", server.url()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetch_decodes_feed_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rss.php")
        .with_status(200)
        .with_header("content-type", "application/rss+xml; charset=utf-8")
        .with_body(FEED)
        .create_async()
        .await;

    let snapshot = source(&server).fetch().await.unwrap();
    mock.assert_async().await;

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].guid, "alert-1");
    assert_eq!(
        snapshot[0].ends_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 4, 19, 30, 0).unwrap())
    );
    // The unparsable expiry is dropped; the item and its start survive.
    assert_eq!(snapshot[1].guid, "invasion-7");
    assert!(snapshot[1].starts_at.is_some());
    assert!(snapshot[1].ends_at.is_none());
}

#[tokio::test]
async fn server_error_is_a_fetch_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rss.php")
        .with_status(503)
        .create_async()
        .await;

    let err = source(&server).fetch().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Fetch(FetchError::Status { status: 503 })
    ));
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rss.php")
        .with_status(200)
        .with_body("<rss><channel><item>")
        .create_async()
        .await;

    let err = source(&server).fetch().await.unwrap_err();
    assert!(matches!(err, CoreError::Decode(_)), "{err}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let source = HttpFeedSource::new("http://127.0.0.1:9/rss.php", Duration::from_secs(2)).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Fetch(FetchError::Transport(_) | FetchError::Timeout { .. })
    ));
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/rss.php")
        .with_status(200)
        .with_body(FEED)
        .expect(1)
        .create_async()
        .await;

    let source = source(&server);
    let exchange = SnapshotExchange::new();
    assert!(fetch_once(&source, &exchange).await);
    ok.assert_async().await;
    let before = exchange.latest().unwrap();

    ok.remove_async().await;
    server
        .mock("GET", "/rss.php")
        .with_status(500)
        .create_async()
        .await;

    assert!(!fetch_once(&source, &exchange).await);
    let after = exchange.latest().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after[0].guid, "alert-1");
}
