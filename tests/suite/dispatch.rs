//! Foreground dispatch against a mock API

use std::time::Duration;

use botline_client::botline_types::{InlineKeyboard, InlineKeyboardButton};
use botline_client::{
    BatchKey, Client, DispatchRequest, DispatchResult, Fields, InvocationSpec, OptionOverrides,
    OutputMode, Resolved,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, config_for, method_path, mount_method, ok_body};

fn quiet() -> OptionOverrides {
    OptionOverrides::new().send_error(false)
}

#[tokio::test]
async fn send_message_returns_result_map() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains("chat_id=123"))
        .and(body_string_contains("text=hi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_body(&json!({
            "message_id": 1,
            "chat": {"id": 123},
            "text": "hi"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .send_message(Fields::new().with("chat_id", 123).with("text", "hi"), quiet())
        .await
        .unwrap();

    let Some(Resolved::Map(value)) = result.single() else {
        panic!("expected a map, got {result:?}");
    };
    assert_eq!(value["chat"]["id"], 123);
    assert_eq!(value["text"], "hi");
}

#[tokio::test]
async fn empty_body_resolves_failed() {
    let server = MockServer::start().await;
    mount_method(&server, "sendMessage", ResponseTemplate::new(200)).await;

    let client = client_for(&server);
    let result = client
        .send_message(Fields::new().with("chat_id", 123).with("text", "hi"), quiet())
        .await
        .unwrap();
    assert_eq!(result, DispatchResult::Single(Resolved::Failed));
}

#[tokio::test]
async fn batch_elements_resolve_independently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains("chat_id=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_body(&json!({"text": "a"}))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains("chat_id=2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .call_json(
            "sendMessage",
            json!([{"chat_id": 1, "text": "a"}, {"chat_id": 2, "text": "b"}]),
            &json!({"send_error": false}),
        )
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.keys(), [&BatchKey::Index(0), &BatchKey::Index(1)]);
    assert_eq!(
        result.get(&BatchKey::Index(0)),
        Some(&Resolved::Map(json!({"text": "a"})))
    );
    assert_eq!(result.get(&BatchKey::Index(1)), Some(&Resolved::Failed));
    assert_eq!(result.to_json(), json!({"0": {"text": "a"}, "1": false}));
}

#[tokio::test]
async fn keyed_batch_preserves_names_and_order() {
    let server = MockServer::start().await;
    mount_method(
        &server,
        "getChat",
        ResponseTemplate::new(200).set_body_string(ok_body(&json!({"id": 5}))),
    )
    .await;

    let client = client_for(&server);
    let params = InvocationSpec::keyed([
        ("zeta", Fields::new().with("chat_id", 5)),
        ("alpha", Fields::new().with("chat_id", 5)),
        ("mid", Fields::new().with("chat_id", 5)),
    ]);
    let result = client.get_chat(params, quiet()).await.unwrap();

    let names: Vec<String> = result.keys().iter().map(ToString::to_string).collect();
    assert_eq!(names, ["zeta", "alpha", "mid"]);
}

#[tokio::test]
async fn empty_batch_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .call("sendMessage", InvocationSpec::batch(Vec::new()))
        .await
        .unwrap();
    assert_eq!(result, DispatchResult::Batch(Vec::new()));
    assert!(result.is_empty());

    let untyped = client
        .call_json("sendMessage", json!([]), &json!({}))
        .await
        .unwrap();
    assert_eq!(untyped, DispatchResult::Batch(Vec::new()));
}

#[tokio::test]
async fn return_modes_shape_the_same_body() {
    let body = r#"{"ok":true,"result":{"id":42,"is_bot":true,"first_name":"Bot"}}"#;
    let server = MockServer::start().await;
    mount_method(
        &server,
        "getMe",
        ResponseTemplate::new(200).set_body_string(body),
    )
    .await;
    let client = client_for(&server);

    let run = |mode: OutputMode| {
        let client = &client;
        async move {
            client
                .get_me(Fields::new(), quiet().output(mode))
                .await
                .unwrap()
                .into_single()
                .unwrap()
        }
    };

    assert_eq!(run(OutputMode::RawResponse).await, Resolved::Raw(body.to_string()));
    assert_eq!(
        run(OutputMode::RawResponseMap).await.to_json(),
        json!({"ok": true, "result": {"id": 42, "is_bot": true, "first_name": "Bot"}})
    );
    let Resolved::Envelope(envelope) = run(OutputMode::RawResponseObject).await else {
        panic!("expected an envelope");
    };
    assert!(envelope.ok);
    let Resolved::Object(me) = run(OutputMode::ResultObject).await else {
        panic!("expected an object");
    };
    assert_eq!(me.get_i64("id"), Some(42));
    assert_eq!(me.get_str("first_name"), Some("Bot"));
}

#[tokio::test]
async fn refused_call_is_failed_in_result_modes_only() {
    let refused = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
    let server = MockServer::start().await;
    mount_method(
        &server,
        "getChat",
        ResponseTemplate::new(400).set_body_string(refused),
    )
    .await;
    let client = client_for(&server);

    let mapped = client
        .get_chat(Fields::new().with("chat_id", 1), quiet())
        .await
        .unwrap();
    assert_eq!(mapped, DispatchResult::Single(Resolved::Failed));

    let raw = client
        .get_chat(
            Fields::new().with("chat_id", 1),
            quiet().output(OutputMode::RawResponse),
        )
        .await
        .unwrap();
    assert_eq!(raw, DispatchResult::Single(Resolved::Raw(refused.to_string())));
}

#[tokio::test]
async fn timed_out_element_fails_without_blocking_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("chat_id=1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ok_body(&json!({"slow": true})))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("chat_id=2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_body(&json!({"fast": true}))))
        .mount(&server)
        .await;

    let client = Client::new(config_for(&server).with_timeout(Duration::from_millis(500))).unwrap();
    let result = client
        .dispatch(
            DispatchRequest::new(
                "sendMessage",
                vec![
                    Fields::new().with("chat_id", 1),
                    Fields::new().with("chat_id", 2),
                ],
            )
            .with_overrides(quiet()),
        )
        .await
        .unwrap();

    assert_eq!(result.get(&BatchKey::Index(0)), Some(&Resolved::Failed));
    assert_eq!(
        result.get(&BatchKey::Index(1)),
        Some(&Resolved::Map(json!({"fast": true})))
    );
}

#[tokio::test]
async fn structured_fields_are_sent_json_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains("reply_markup=%7B%22inline_keyboard%22"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_body(&json!({"id": 1}))))
        .expect(1)
        .mount(&server)
        .await;

    let markup = InlineKeyboard::new().row([InlineKeyboardButton::callback("Yes", "y")]);
    let client = client_for(&server);
    let result = client
        .send_message(
            Fields::new()
                .with("chat_id", 1)
                .with("text", "Continue?")
                .with("reply_markup", markup),
            quiet(),
        )
        .await
        .unwrap();
    assert!(!result.single().unwrap().is_failed());
}
