//! Per-conversation session state and the concurrent session store
//!
//! Sessions are created lazily on the first utterance for an unknown id.
//! Different sessions are independent; turns within one session are
//! serialized by an async mutex held for the duration of the turn.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use lead_agent_core::{ChannelMode, CollectedData, Turn, TurnRole};

use crate::flow::Stage;

/// Mutable per-conversation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub stage: Stage,
    pub data: CollectedData,
    /// Failed matching attempts on the current stage; reset on advance
    pub retry_count: u32,
    /// Total user turns processed
    pub turn_count: u32,
    pub turns: Vec<Turn>,
    pub channel: ChannelMode,
    /// Greeting subflow: the caller said "wrong person" and we are
    /// waiting for their actual name
    pub awaiting_name: bool,
    /// The service introduction has been delivered
    pub introduced: bool,
    /// The caller confirmed (or corrected) their identity
    pub name_confirmed: bool,
    /// Callback number supplied by the host, spoken back in closings
    pub phone: Option<String>,
    /// Match count from the property search, once it has run
    pub search_count: Option<u32>,
    /// Titles spoken in the search summary
    pub search_titles: Vec<String>,
    /// The last response carried `is_complete = true`
    pub completed: bool,
}

impl Session {
    pub fn new(id: impl Into<String>, channel: ChannelMode) -> Self {
        Self {
            id: id.into(),
            stage: Stage::default(),
            data: CollectedData::default(),
            retry_count: 0,
            turn_count: 0,
            turns: Vec::new(),
            channel,
            awaiting_name: false,
            introduced: false,
            name_confirmed: false,
            phone: None,
            search_count: None,
            search_titles: Vec::new(),
            completed: false,
        }
    }

    pub fn push_user_turn(&mut self, text: &str) {
        if !text.is_empty() {
            self.turns.push(Turn::user(text));
        }
    }

    pub fn push_assistant_turn(&mut self, text: &str) {
        self.turns.push(Turn::assistant(text));
    }

    /// Advance to the next stage, resetting the retry counter when the
    /// stage actually changes
    pub fn advance(&mut self, next: Stage) {
        if next != self.stage {
            self.retry_count = 0;
        }
        self.stage = next;
    }

    /// Name to address the caller by, falling back to a neutral form
    pub fn display_name(&self) -> String {
        self.data
            .name
            .as_ref()
            .map(|s| s.value.clone())
            .unwrap_or_else(|| "there".to_string())
    }

    /// True once a real name has been confirmed
    pub fn has_real_name(&self) -> bool {
        self.name_confirmed
            && self
                .data
                .name
                .as_ref()
                .map(|s| {
                    let lower = s.value.to_lowercase();
                    !lower.is_empty() && lower != "customer" && lower != "there"
                })
                .unwrap_or(false)
    }

    /// Number the expert should call, spoken back in closings
    pub fn display_phone(&self) -> String {
        self.phone
            .clone()
            .unwrap_or_else(|| "this number".to_string())
    }

    /// User-side transcript texts, oldest first
    pub fn user_texts(&self) -> Vec<&str> {
        self.turns
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .map(|t| t.text.as_str())
            .collect()
    }
}

/// Concurrent session store keyed by session id.
///
/// The map itself is lock-free for readers; each session carries its own
/// async mutex so turns for one session run strictly one at a time while
/// other sessions proceed in parallel.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for an id, creating it on first sight
    pub fn get_or_create(&self, session_id: &str, channel: ChannelMode) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, "creating session");
                Arc::new(Mutex::new(Session::new(session_id, channel)))
            })
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Drop a session. Eviction policy is the host's concern; this is
    /// the hook it uses.
    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_agent_core::SlotValue;

    #[test]
    fn advance_resets_retries_only_on_change() {
        let mut session = Session::new("s", ChannelMode::Voice);
        session.retry_count = 2;
        session.advance(Stage::Greeting);
        assert_eq!(session.retry_count, 2);
        session.advance(Stage::Location);
        assert_eq!(session.retry_count, 0);
    }

    #[test]
    fn real_name_requires_confirmation_and_substance() {
        let mut session = Session::new("s", ChannelMode::Voice);
        assert!(!session.has_real_name());

        session.data.name = Some(SlotValue::new("Customer".to_string(), 1.0, 1));
        session.name_confirmed = true;
        assert!(!session.has_real_name());

        session.data.name = Some(SlotValue::new("Asha".to_string(), 1.0, 1));
        assert!(session.has_real_name());
    }

    #[test]
    fn store_creates_lazily_and_reuses() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let a = store.get_or_create("s1", ChannelMode::Chat);
        let b = store.get_or_create("s1", ChannelMode::Voice);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);

        store.remove("s1");
        assert!(store.get("s1").is_none());
    }

    #[tokio::test]
    async fn sessions_default_to_greeting() {
        let store = SessionStore::new();
        let session = store.get_or_create("s1", ChannelMode::Voice);
        assert_eq!(session.lock().await.stage, Stage::Greeting);
    }
}
