//! Core domain types for Botline.
//!
//! Pure data with no IO and no async: parameter sets and their shape, dispatch
//! options, identifiers, response shapes, inbound update parsing, keyboard
//! markup, and the webhook source allow-list. The dispatch engine in
//! `botline-client` is built on top of these.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod fields;
mod ids;
mod invocation;
mod markup;
mod options;
mod response;
mod update;
mod webhook;

pub use fields::{FieldKind, FieldValue, Fields, InputFile};
pub use ids::{BotToken, ChatId, ChatIdParseError, MethodName, MethodNameError, TokenError};
pub use invocation::{BatchKey, InvocationSpec, ParamShape, ShapeError};
pub use markup::{
    ForceReply, InlineKeyboard, InlineKeyboardButton, KeyboardButton, KeyboardRemove,
    ReplyKeyboard, ReplyMarkup,
};
pub use options::{OptionError, OptionOverrides, Options, OutputMode};
pub use response::{
    ApiEnvelope, ApiObject, DispatchResult, Resolved, ResponseParameters, is_empty_value,
};
pub use update::{Update, UpdateContext, UpdateKind, UpdateParseError};
pub use webhook::{TRUSTED_RANGES, UntrustedSource, is_trusted_source, verify_source};
