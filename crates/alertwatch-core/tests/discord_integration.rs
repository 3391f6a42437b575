//! Integration tests for Discord webhook delivery.

use alertwatch_core::config::DiscordConfig;
use alertwatch_core::{DeliveryError, DiscordWebhook, Notifier};
use mockito::Matcher;
use serde_json::json;

fn webhook(server: &mockito::ServerGuard) -> DiscordWebhook {
    let config = DiscordConfig {
        webhook_id: "123456".into(),
        webhook_token: "abc123".into(),
        api_base: format!("{}/api/webhooks", server.url()),
    };
    DiscordWebhook::from_config(&config).unwrap()
}

#[tokio::test]
async fn posts_message_as_content_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/webhooks/123456/abc123")
        .match_body(Matcher::Json(json!({ "content": "**Title:** Alpha" })))
        .with_status(204)
        .create_async()
        .await;

    webhook(&server).dispatch("**Title:** Alpha").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_message_reports_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/webhooks/123456/abc123")
        .with_status(401)
        .with_body(r#"{"message": "Invalid Webhook Token"}"#)
        .create_async()
        .await;

    let err = webhook(&server).dispatch("hello").await.unwrap_err();
    match err {
        DeliveryError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid Webhook Token"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
