//! Local-existence lookups consulted during mention expansion.
//!
//! The user/session database lives outside this crate; the feed engine
//! only ever asks it two questions.

use std::collections::BTreeSet;

/// Capability for checking whether a user or feed exists on the local pod.
pub trait Store: Send + Sync {
    fn has_user(&self, username: &str) -> bool;
    fn has_feed(&self, name: &str) -> bool;
}

/// In-memory store, for tests and single-shot CLI runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: BTreeSet<String>,
    feeds: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, username: impl Into<String>) {
        self.users.insert(username.into());
    }

    pub fn add_feed(&mut self, name: impl Into<String>) {
        self.feeds.insert(name.into());
    }
}

impl Store for MemoryStore {
    fn has_user(&self, username: &str) -> bool {
        self.users.contains(username)
    }

    fn has_feed(&self, name: &str) -> bool {
        self.feeds.contains(name)
    }
}
