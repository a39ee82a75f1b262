//! Inbound update parsing.
//!
//! An update is a JSON object with an `update_id` and exactly one variant key
//! (`message`, `callback_query`, ...). Parsing identifies the variant and
//! derives an [`UpdateContext`]: who sent it and in which chat. The context is
//! a plain value the caller passes to a dispatch when failures should be
//! reported back to that chat.

use serde_json::Value;
use thiserror::Error;

use crate::ChatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    CallbackQuery,
    InlineQuery,
    ChosenInlineResult,
    ShippingQuery,
    PreCheckoutQuery,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
}

impl UpdateKind {
    pub const ALL: [Self; 13] = [
        Self::Message,
        Self::EditedMessage,
        Self::ChannelPost,
        Self::EditedChannelPost,
        Self::CallbackQuery,
        Self::InlineQuery,
        Self::ChosenInlineResult,
        Self::ShippingQuery,
        Self::PreCheckoutQuery,
        Self::PollAnswer,
        Self::MyChatMember,
        Self::ChatMember,
        Self::ChatJoinRequest,
    ];

    /// Top-level key carrying this variant's payload.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::EditedMessage => "edited_message",
            Self::ChannelPost => "channel_post",
            Self::EditedChannelPost => "edited_channel_post",
            Self::CallbackQuery => "callback_query",
            Self::InlineQuery => "inline_query",
            Self::ChosenInlineResult => "chosen_inline_result",
            Self::ShippingQuery => "shipping_query",
            Self::PreCheckoutQuery => "pre_checkout_query",
            Self::PollAnswer => "poll_answer",
            Self::MyChatMember => "my_chat_member",
            Self::ChatMember => "chat_member",
            Self::ChatJoinRequest => "chat_join_request",
        }
    }
}

#[derive(Debug, Error)]
pub enum UpdateParseError {
    #[error("update is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("update must be a JSON object")]
    NotAnObject,
    #[error("update has no recognized variant key")]
    UnknownVariant,
}

/// Sender and chat of the update being handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateContext {
    pub from: Option<ChatId>,
    pub from_chat: Option<ChatId>,
}

impl UpdateContext {
    /// Where a failure report about this update should go: the chat, else the sender.
    #[must_use]
    pub fn report_target(&self) -> Option<&ChatId> {
        self.from_chat.as_ref().or(self.from.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    update_id: Option<i64>,
    kind: UpdateKind,
    payload: Value,
}

impl Update {
    pub fn parse(body: &str) -> Result<Self, UpdateParseError> {
        Self::from_value(serde_json::from_str(body)?)
    }

    pub fn from_value(value: Value) -> Result<Self, UpdateParseError> {
        let Value::Object(mut map) = value else {
            return Err(UpdateParseError::NotAnObject);
        };
        let update_id = map.get("update_id").and_then(Value::as_i64);
        let kind = UpdateKind::ALL
            .into_iter()
            .find(|kind| map.contains_key(kind.key()))
            .ok_or(UpdateParseError::UnknownVariant)?;
        let payload = map.remove(kind.key()).unwrap_or(Value::Null);
        Ok(Self {
            update_id,
            kind,
            payload,
        })
    }

    #[must_use]
    pub fn update_id(&self) -> Option<i64> {
        self.update_id
    }

    #[must_use]
    pub fn kind(&self) -> UpdateKind {
        self.kind
    }

    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    #[must_use]
    pub fn context(&self) -> UpdateContext {
        UpdateContext {
            from: self.from_id().map(ChatId::Id),
            from_chat: self.chat_id().map(ChatId::Id),
        }
    }

    /// Message the update is about: the payload itself, or the message a
    /// callback button was attached to.
    fn message(&self) -> Option<&Value> {
        match self.kind {
            UpdateKind::Message
            | UpdateKind::EditedMessage
            | UpdateKind::ChannelPost
            | UpdateKind::EditedChannelPost => Some(&self.payload),
            UpdateKind::CallbackQuery => self.payload.get("message"),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_id(&self) -> Option<i64> {
        let sender = match self.kind {
            UpdateKind::PollAnswer => self.payload.get("user"),
            _ => self.payload.get("from"),
        };
        sender.and_then(|user| user.get("id")).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn chat_id(&self) -> Option<i64> {
        self.message()
            .or(Some(&self.payload))
            .and_then(|source| source.get("chat"))
            .and_then(|chat| chat.get("id"))
            .and_then(Value::as_i64)
    }

    #[must_use]
    pub fn message_id(&self) -> Option<i64> {
        self.message()
            .and_then(|message| message.get("message_id"))
            .and_then(Value::as_i64)
    }

    /// Message text (or caption), callback data, or inline query text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self.kind {
            UpdateKind::CallbackQuery => self.payload.get("data").and_then(Value::as_str),
            UpdateKind::InlineQuery | UpdateKind::ChosenInlineResult => {
                self.payload.get("query").and_then(Value::as_str)
            }
            _ => self.message().and_then(|message| {
                message
                    .get("text")
                    .or_else(|| message.get("caption"))
                    .and_then(Value::as_str)
            }),
        }
    }

    /// Id to answer a callback, inline, shipping or pre-checkout query with.
    #[must_use]
    pub fn query_id(&self) -> Option<&str> {
        match self.kind {
            UpdateKind::CallbackQuery
            | UpdateKind::InlineQuery
            | UpdateKind::ShippingQuery
            | UpdateKind::PreCheckoutQuery => self.payload.get("id").and_then(Value::as_str),
            _ => None,
        }
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.payload
            .get("from")
            .and_then(|user| user.get("username"))
            .and_then(Value::as_str)
    }
}
