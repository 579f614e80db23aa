//! crates/gateway_core/src/session.rs
//!
//! Process-lifetime store of extracted web content, keyed by an opaque
//! session token. Constructed once at service start and injected into
//! request handlers; nothing survives a restart.

use std::collections::HashMap;
use std::sync::RwLock;

use indexmap::IndexMap;

/// Maps a session token to the (URL -> extracted text) pairs collected for
/// that session. URLs iterate in insertion order, which downstream prompt
/// assembly relies on.
///
/// Each `merge` call is atomic under the lock. Two concurrent merges to the
/// same URL key are last-write-wins; this is an accepted limitation, not a
/// coordination point.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, IndexMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges extracted pages into a session, creating it on first use.
    /// Re-extracting a URL overwrites its prior text.
    pub fn merge(&self, session_id: &str, pages: IndexMap<String, String>) {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        sessions
            .entry(session_id.to_string())
            .or_default()
            .extend(pages);
    }

    /// Returns a snapshot of the session's content, or `None` for an unknown
    /// token.
    pub fn get(&self, session_id: &str) -> Option<IndexMap<String, String>> {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        sessions.get(session_id).cloned()
    }

    /// Drops a session. Returns whether the token existed.
    pub fn clear(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        sessions.remove(session_id).is_some()
    }
}
