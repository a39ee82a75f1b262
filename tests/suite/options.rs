//! Option and parameter validation through the public API

use botline_client::botline_types::{ParamShape, ShapeError};
use botline_client::{
    BatchKey, DispatchError, InvocationSpec, OptionOverrides, Options, OutputMode,
};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::client_for;

#[test]
fn overrides_fall_back_to_defaults_field_by_field() {
    let defaults = Options {
        send_error: false,
        run_in_background: true,
        output: OutputMode::RawResponse,
    };
    let resolved = OptionOverrides::from_json(&json!({"return": "result_object"}))
        .unwrap()
        .resolve(&defaults);
    assert_eq!(
        resolved,
        Options {
            send_error: false,
            run_in_background: true,
            output: OutputMode::ResultObject,
        }
    );
}

#[test]
fn every_return_mode_is_accepted() {
    for mode in OutputMode::ALL {
        let overrides = OptionOverrides::from_json(&json!({ "return": mode.as_str() })).unwrap();
        assert_eq!(overrides.output, Some(mode));
    }
}

#[test]
fn unknown_keys_and_values_are_rejected() {
    for options in [
        json!({"retries": 3}),
        json!({"return": "xml"}),
        json!({"send_error": "yes"}),
        json!({"run_in_background": 1}),
        json!({"send_error": null}),
        json!({"return": null}),
        json!(["send_error"]),
    ] {
        assert!(OptionOverrides::from_json(&options).is_err(), "{options}");
    }
}

#[test]
fn classification_is_stable_and_first_element_driven() {
    let batch = json!([{"chat_id": 1}, {"chat_id": 2, "reply_markup": {"inline_keyboard": []}}]);
    assert_eq!(ParamShape::classify(&batch), Ok(ParamShape::Batched));
    assert_eq!(ParamShape::classify(&batch), ParamShape::classify(&batch));

    assert_eq!(ParamShape::classify(&json!({"chat_id": 1})), Ok(ParamShape::Flat));
    assert_eq!(ParamShape::classify(&json!(5)), Err(ShapeError::Depth(0)));
    assert_eq!(
        ParamShape::classify(&json!([[{"chat_id": 1}]])),
        Err(ShapeError::Depth(3))
    );
}

#[test]
fn batch_elements_must_be_mappings() {
    let err = InvocationSpec::from_json(json!([{"chat_id": 1}, 7])).unwrap_err();
    assert_eq!(err, ShapeError::ElementNotAMapping(BatchKey::Index(1)));
}

#[tokio::test]
async fn rejected_options_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .call_json(
            "sendMessage",
            json!({"chat_id": 1, "text": "hi"}),
            &json!({"return": "everything"}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidOption(_)));
    assert!(err.to_string().contains("everything"));
}
