//! Fire-and-forget dispatch

use std::time::{Duration, Instant};

use botline_client::{
    BatchKey, Client, DispatchResult, FieldValue, Fields, InputFile, InvocationSpec,
    OptionOverrides, Resolved,
};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::config_for;
use crate::skip_on_windows;

fn background() -> OptionOverrides {
    OptionOverrides::new().run_in_background(true)
}

/// A client whose launcher exits immediately without touching the network.
fn detached_client(server: &MockServer) -> Client {
    Client::new(config_for(server).with_launcher("true")).unwrap()
}

#[tokio::test]
async fn flat_call_returns_launched_without_waiting() {
    skip_on_windows!();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .expect(0)
        .mount(&server)
        .await;

    let client = detached_client(&server);
    let started = Instant::now();
    let result = client
        .send_message(Fields::new().with("chat_id", 1).with("text", "hi"), background())
        .await
        .unwrap();

    assert_eq!(result, DispatchResult::Single(Resolved::Launched));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn unsupported_kind_fails_only_its_element() {
    skip_on_windows!();

    let server = MockServer::start().await;
    let client = detached_client(&server);
    let params = InvocationSpec::batch([
        Fields::new().with("chat_id", 1).with("text", "a"),
        Fields::new()
            .with("chat_id", 2)
            .with("entities", FieldValue::Json(json!([{"type": "bold", "offset": 0}]))),
        Fields::new()
            .with("chat_id", 3)
            .with("document", InputFile::new("/tmp/botline-report.txt")),
    ]);

    let result = client.send_message(params, background()).await.unwrap();

    assert_eq!(result.get(&BatchKey::Index(0)), Some(&Resolved::Launched));
    assert_eq!(result.get(&BatchKey::Index(1)), Some(&Resolved::Failed));
    assert_eq!(result.get(&BatchKey::Index(2)), Some(&Resolved::Launched));
    assert_eq!(result.to_json(), json!({"0": true, "1": false, "2": true}));
}

#[tokio::test]
async fn missing_launcher_resolves_failed() {
    let server = MockServer::start().await;
    let client =
        Client::new(config_for(&server).with_launcher("/nonexistent/botline-launcher")).unwrap();

    let result = client
        .call_json(
            "sendMessage",
            json!({"chat_id": 1, "text": "hi"}),
            &json!({"run_in_background": true}),
        )
        .await
        .unwrap();
    assert_eq!(result, DispatchResult::Single(Resolved::Failed));
}

#[tokio::test]
async fn background_failures_are_not_escalated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = Client::new(
        config_for(&server)
            .with_launcher("/nonexistent/botline-launcher")
            .with_diagnostic_chat(99.into()),
    )
    .unwrap();
    let result = client
        .send_message(Fields::new().with("chat_id", 1), background().send_error(true))
        .await
        .unwrap();
    assert_eq!(result, DispatchResult::Single(Resolved::Failed));
}
