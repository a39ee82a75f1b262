//! Keyboard markup builders.
//!
//! The API takes `reply_markup` as a JSON-encoded string field, so every
//! markup converts into a [`FieldValue::Text`].

use serde::Serialize;

use crate::FieldValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_contact: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_location: bool,
}

impl KeyboardButton {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: false,
            request_location: false,
        }
    }

    #[must_use]
    pub fn request_contact(mut self) -> Self {
        self.request_contact = true;
        self
    }

    #[must_use]
    pub fn request_location(mut self) -> Self {
        self.request_location = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
}

impl InlineKeyboardButton {
    fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: None,
            switch_inline_query: None,
            switch_inline_query_current_chat: None,
        }
    }

    #[must_use]
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            callback_data: Some(data.into()),
            ..Self::bare(text)
        }
    }

    #[must_use]
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(text)
        }
    }

    #[must_use]
    pub fn switch_inline(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            switch_inline_query: Some(query.into()),
            ..Self::bare(text)
        }
    }

    #[must_use]
    pub fn switch_inline_current_chat(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            switch_inline_query_current_chat: Some(query.into()),
            ..Self::bare(text)
        }
    }
}

/// Custom reply keyboard shown in place of the system keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboard {
    keyboard: Vec<Vec<KeyboardButton>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    resize_keyboard: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    one_time_keyboard: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    selective: bool,
}

impl ReplyKeyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn row(mut self, buttons: impl IntoIterator<Item = KeyboardButton>) -> Self {
        self.keyboard.push(buttons.into_iter().collect());
        self
    }

    #[must_use]
    pub fn resize(mut self) -> Self {
        self.resize_keyboard = true;
        self
    }

    #[must_use]
    pub fn one_time(mut self) -> Self {
        self.one_time_keyboard = true;
        self
    }

    #[must_use]
    pub fn selective(mut self) -> Self {
        self.selective = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn row(mut self, buttons: impl IntoIterator<Item = InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(buttons.into_iter().collect());
        self
    }
}

/// Hide the current custom keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardRemove {
    remove_keyboard: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    selective: bool,
}

/// Ask the client to open a reply prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForceReply {
    force_reply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_field_placeholder: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    selective: bool,
}

/// Any `reply_markup` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboard),
    Inline(InlineKeyboard),
    Remove(KeyboardRemove),
    ForceReply(ForceReply),
}

impl ReplyMarkup {
    #[must_use]
    pub fn remove_keyboard(selective: bool) -> Self {
        Self::Remove(KeyboardRemove {
            remove_keyboard: true,
            selective,
        })
    }

    #[must_use]
    pub fn force_reply(placeholder: Option<&str>, selective: bool) -> Self {
        Self::ForceReply(ForceReply {
            force_reply: true,
            input_field_placeholder: placeholder.map(str::to_string),
            selective,
        })
    }

    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<ReplyKeyboard> for ReplyMarkup {
    fn from(keyboard: ReplyKeyboard) -> Self {
        Self::Keyboard(keyboard)
    }
}

impl From<InlineKeyboard> for ReplyMarkup {
    fn from(keyboard: InlineKeyboard) -> Self {
        Self::Inline(keyboard)
    }
}

impl From<ReplyMarkup> for FieldValue {
    fn from(markup: ReplyMarkup) -> Self {
        Self::Text(markup.to_json_string())
    }
}

impl From<InlineKeyboard> for FieldValue {
    fn from(keyboard: InlineKeyboard) -> Self {
        ReplyMarkup::from(keyboard).into()
    }
}

impl From<ReplyKeyboard> for FieldValue {
    fn from(keyboard: ReplyKeyboard) -> Self {
        ReplyMarkup::from(keyboard).into()
    }
}
