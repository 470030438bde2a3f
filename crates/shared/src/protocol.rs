use serde::{Deserialize, Serialize};

use crate::domain::{ChatId, PageDirection};

/// One inbound update handed over by the chat transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotUpdate {
    pub chat_id: ChatId,
    pub action: UpdateAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UpdateAction {
    Command {
        name: String,
        #[serde(default)]
        args: String,
    },
    Callback {
        token: String,
    },
}

/// Callback payloads round-trip through rendered keyboards as opaque tokens.
/// The handlers mint tokens via [`CallbackAction::token`]; the dispatcher
/// parses them back with [`CallbackAction::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Page(PageDirection),
    Vote(String),
    MatchVote(String),
}

impl CallbackAction {
    pub fn token(&self) -> String {
        match self {
            CallbackAction::Page(PageDirection::Next) => "page:next".to_string(),
            CallbackAction::Page(PageDirection::Prev) => "page:prev".to_string(),
            CallbackAction::Vote(name) => format!("vote:{name}"),
            CallbackAction::MatchVote(name) => format!("duel:{name}"),
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "page:next" => return Some(CallbackAction::Page(PageDirection::Next)),
            "page:prev" => return Some(CallbackAction::Page(PageDirection::Prev)),
            _ => {}
        }
        if let Some(name) = token.strip_prefix("vote:") {
            return Some(CallbackAction::Vote(name.to_string()));
        }
        token
            .strip_prefix("duel:")
            .map(|name| CallbackAction::MatchVote(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            label: label.into(),
            token: action.token(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn push_row(&mut self, row: Vec<Button>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outbound effect for the transport to render: either a full chat message
/// (optionally with an inline keyboard) or a lightweight acknowledgment of a
/// button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BotReply {
    Message {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keyboard: Option<Keyboard>,
    },
    Ack {
        text: String,
    },
}

impl BotReply {
    pub fn message(text: impl Into<String>) -> Self {
        BotReply::Message {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn message_with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        BotReply::Message {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn ack(text: impl Into<String>) -> Self {
        BotReply::Ack { text: text.into() }
    }
}
