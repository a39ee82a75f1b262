//! Failure reports through sendMessage

use botline_client::{
    ChatId, DispatchRequest, DispatchResult, Fields, OptionOverrides, Resolved, UpdateContext,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, client_with_diagnostics, method_path};

/// Expect `count` requests whose body contains `needle`, answered with `response`.
async fn expect_post(server: &MockServer, needle: &str, response: ResponseTemplate, count: u64) {
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains(needle))
        .respond_with(response)
        .expect(count)
        .mount(server)
        .await;
}

fn hello() -> Fields {
    Fields::new().with("chat_id", 1).with("text", "hello")
}

#[tokio::test]
async fn empty_body_sends_exactly_one_report() {
    let server = MockServer::start().await;
    expect_post(&server, "text=hello", ResponseTemplate::new(200), 1).await;
    // The report fails the same way and must not be reported in turn.
    expect_post(&server, "chat_id=999", ResponseTemplate::new(200), 1).await;

    let client = client_with_diagnostics(&server, ChatId::Id(999));
    let result = client
        .send_message(hello(), OptionOverrides::new())
        .await
        .unwrap();

    assert_eq!(result, DispatchResult::Single(Resolved::Failed));
}

#[tokio::test]
async fn report_names_method_and_failure() {
    let server = MockServer::start().await;
    expect_post(&server, "text=hello", ResponseTemplate::new(200), 1).await;
    expect_post(
        &server,
        "text=sendMessage+failed%3A+empty+response",
        ResponseTemplate::new(200).set_body_string(r#"{"ok":true,"result":{"message_id":1}}"#),
        1,
    )
    .await;

    let client = client_with_diagnostics(&server, ChatId::Id(999));
    client
        .send_message(hello(), OptionOverrides::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn api_error_is_reported_but_refusal_with_ok_status_is_not() {
    let server = MockServer::start().await;
    expect_post(
        &server,
        "text=blocked",
        ResponseTemplate::new(403)
            .set_body_string(r#"{"ok":false,"error_code":403,"description":"Forbidden"}"#),
        1,
    )
    .await;
    expect_post(
        &server,
        "text=soft",
        ResponseTemplate::new(200).set_body_string(r#"{"ok":false,"description":"nope"}"#),
        1,
    )
    .await;
    expect_post(&server, "chat_id=999", ResponseTemplate::new(200), 1).await;

    let client = client_with_diagnostics(&server, ChatId::Id(999));
    let blocked = client
        .send_message(
            Fields::new().with("chat_id", 1).with("text", "blocked"),
            OptionOverrides::new(),
        )
        .await
        .unwrap();
    let soft = client
        .send_message(
            Fields::new().with("chat_id", 1).with("text", "soft"),
            OptionOverrides::new(),
        )
        .await
        .unwrap();

    assert_eq!(blocked, DispatchResult::Single(Resolved::Failed));
    assert_eq!(soft, DispatchResult::Single(Resolved::Failed));
}

#[tokio::test]
async fn disabled_send_error_stays_silent() {
    let server = MockServer::start().await;
    expect_post(&server, "text=hello", ResponseTemplate::new(200), 1).await;
    expect_post(&server, "chat_id=999", ResponseTemplate::new(200), 0).await;

    let client = client_with_diagnostics(&server, ChatId::Id(999));
    client
        .send_message(hello(), OptionOverrides::new().send_error(false))
        .await
        .unwrap();
}

#[tokio::test]
async fn update_chat_is_reported_before_diagnostic_chat() {
    let server = MockServer::start().await;
    expect_post(&server, "text=hello", ResponseTemplate::new(200), 1).await;
    expect_post(&server, "chat_id=-100200", ResponseTemplate::new(200), 1).await;
    expect_post(&server, "chat_id=999", ResponseTemplate::new(200), 1).await;

    let client = client_with_diagnostics(&server, ChatId::Id(999));
    let context = UpdateContext {
        from: Some(ChatId::Id(42)),
        from_chat: Some(ChatId::Id(-100_200)),
    };
    client
        .dispatch(DispatchRequest::new("sendMessage", hello()).with_context(&context))
        .await
        .unwrap();
}

#[tokio::test]
async fn no_targets_means_no_report() {
    let server = MockServer::start().await;
    expect_post(&server, "text=hello", ResponseTemplate::new(200), 1).await;

    let client = client_for(&server);
    let result = client
        .send_message(hello(), OptionOverrides::new())
        .await
        .unwrap();
    assert_eq!(result, DispatchResult::Single(Resolved::Failed));
}

#[tokio::test]
async fn each_failed_batch_element_is_reported() {
    let server = MockServer::start().await;
    expect_post(&server, "text=one", ResponseTemplate::new(200), 1).await;
    expect_post(&server, "text=two", ResponseTemplate::new(200), 1).await;
    expect_post(&server, "chat_id=999", ResponseTemplate::new(200), 2).await;

    let client = client_with_diagnostics(&server, ChatId::Id(999));
    let result = client
        .send_message(
            vec![
                Fields::new().with("chat_id", 1).with("text", "one"),
                Fields::new().with("chat_id", 1).with("text", "two"),
            ],
            OptionOverrides::new(),
        )
        .await
        .unwrap();
    assert_eq!(result.len(), 2);
}
