//! Mention and tag expansion.
//!
//! Applied once, at compose time; the expanded form is what gets
//! persisted. Stored feed lines are never re-expanded on read. Each pass
//! is a single leftmost-first sweep and never re-scans its own output.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::config::PodConfig;
use crate::store::Store;
use crate::types::User;
use crate::urls::{normalize_username, url_for_tag, url_for_user};

// `@nick`, optionally followed by `@domain` where the domain looks like a
// dotted hostname or an NNN/NN-style address.
static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"@([a-zA-Z0-9][a-zA-Z0-9_-]+)(?:@)?((?:[_a-z0-9](?:[_a-z0-9-]{0,61}[a-z0-9]\.)|(?:[0-9]+/[0-9]{2})\.)+(?:[a-z](?:[a-z0-9-]{0,61}[a-z0-9])?)?)?",
    )
    .expect("mention regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([-\w]+)").expect("tag regex"));

/// Turn `@nick` into `@<nick URL>` if we follow them or they exist on the
/// local pod, and `@nick@domain` into the cross-pod form unconditionally.
/// Unknown mentions pass through verbatim.
pub fn expand_mentions(conf: &PodConfig, store: &dyn Store, user: &User, text: &str) -> String {
    MENTION_RE
        .replace_all(text, |caps: &Captures| {
            let nick = &caps[1];
            let domain = caps.get(2).map(|m| m.as_str()).unwrap_or("");

            if !domain.is_empty() {
                // Cross-pod mention: assume https and the conventional
                // feed path, no existence check against the remote end.
                return format!("@<{nick} https://{domain}/user/{nick}/twtxt.txt>");
            }

            for (followed_nick, followed_url) in &user.following {
                if nick == followed_nick {
                    return format!("@<{followed_nick} {followed_url}>");
                }
            }

            let username = normalize_username(nick);
            if store.has_user(&username) || store.has_feed(&username) {
                return format!("@<{} {}>", username, url_for_user(conf, &username));
            }

            // Not following, not local: leave the match untouched.
            caps[0].to_string()
        })
        .into_owned()
}

/// Turn `#tag` into `#<tag URL>`. Every tag is assumed valid.
pub fn expand_tags(conf: &PodConfig, text: &str) -> String {
    TAG_RE
        .replace_all(text, |caps: &Captures| {
            let tag = &caps[1];
            format!("#<{} {}>", tag, url_for_tag(&conf.base_url, tag))
        })
        .into_owned()
}
