//! Shared test utilities and fixtures
//!
//! Mock API servers and clients pointed at them.

#![allow(dead_code)]

use std::time::Duration;

use botline_client::{BotToken, ChatId, Client, ClientConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "123456:test-token";

/// Path a method is served on for [`TOKEN`].
pub fn method_path(name: &str) -> String {
    format!("/bot{TOKEN}/{name}")
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(BotToken::new(TOKEN).expect("test token is valid"))
        .with_api_base(&server.uri())
        .expect("mock server uri is valid")
        .with_timeout(Duration::from_secs(5))
}

pub fn client_for(server: &MockServer) -> Client {
    Client::new(config_for(server)).expect("client builds")
}

pub fn client_with_diagnostics(server: &MockServer, chat: ChatId) -> Client {
    Client::new(config_for(server).with_diagnostic_chat(chat)).expect("client builds")
}

/// Successful call whose `result` echoes the given value.
pub fn ok_body(result: &serde_json::Value) -> String {
    serde_json::json!({ "ok": true, "result": result }).to_string()
}

/// Mount a fixed response for one method.
pub async fn mount_method(server: &MockServer, name: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(method_path(name)))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Macro to skip tests on specific platforms
#[macro_export]
macro_rules! skip_on_windows {
    () => {
        #[cfg(target_os = "windows")]
        {
            eprintln!("Skipping test: not supported on Windows");
            return;
        }
    };
}
