use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use shared::domain::ChatId;

use crate::tournament::Tournament;

/// Per-conversation interaction state, created on first use and kept for the
/// process lifetime. A finished tournament clears its slot back to `None`.
#[derive(Debug, Default)]
pub struct Session {
    pub page: usize,
    pub tournament: Option<Tournament>,
}

#[derive(Debug, Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<ChatId, Session>>>,
}

impl Sessions {
    /// Runs `f` against the chat's session, creating the session first if
    /// this chat has not been seen before.
    pub async fn with<T>(&self, chat_id: ChatId, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.inner.lock().await;
        f(sessions.entry(chat_id).or_default())
    }
}
