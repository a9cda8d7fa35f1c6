use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PodConfig;
use crate::urls::{normalize_username, url_for_user};

/// Identity of a feed owner: nickname plus canonical feed URL.
/// Immutable once constructed; embedded in every twt parsed from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Twter {
    pub nick: String,
    pub url: String,
}

impl Twter {
    pub fn new(nick: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            url: url.into(),
        }
    }
}

/// One post in a feed. Twts are immutable after creation; "editing" appends
/// a replacement line carrying the original `created` timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Twt {
    pub twter: Twter,
    pub created: DateTime<Utc>,
    pub text: String,
}

/// Ordered collection of twts. Display order is newest first; see
/// [`sort_newest_first`].
pub type Twts = Vec<Twt>;

/// Stable sort, newest first, on the creation timestamp only.
/// Twts with equal timestamps keep their input order.
pub fn sort_newest_first(twts: &mut [Twt]) {
    twts.sort_by(|a, b| b.created.cmp(&a.created));
}

/// A local identity: the composing user and who they follow
/// (nickname -> feed URL). Supplies context for mention expansion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub following: HashMap<String, String>,
}

impl User {
    /// A user with an empty following map. Pod-owned special feeds are
    /// modeled this way.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            following: HashMap::new(),
        }
    }

    /// The identity stamped onto twts this user authors.
    pub fn twter(&self, conf: &PodConfig) -> Twter {
        let name = normalize_username(&self.username);
        Twter {
            url: url_for_user(conf, &name),
            nick: name,
        }
    }
}
