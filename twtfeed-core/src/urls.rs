//! Canonical identity normalization and URL construction for local
//! users, feeds and tags.

use crate::config::PodConfig;

/// Canonical feed-file username: trimmed and lower-cased.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Canonical feed URL for a local user or feed.
pub fn url_for_user(conf: &PodConfig, username: &str) -> String {
    format!(
        "{}/user/{}/twtxt.txt",
        conf.base_url.trim_end_matches('/'),
        username
    )
}

/// Canonical search URL for a tag. Tags need no existence check.
pub fn url_for_tag(base_url: &str, tag: &str) -> String {
    format!("{}/search?tag={}", base_url.trim_end_matches('/'), tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("Alice"), "alice");
        assert_eq!(normalize_username("  bob  "), "bob");
        assert_eq!(normalize_username("charlie"), "charlie");
    }

    #[test]
    fn test_url_builders() {
        let conf = PodConfig::new("/tmp/pod", "https://pod.example/");
        assert_eq!(
            url_for_user(&conf, "alice"),
            "https://pod.example/user/alice/twtxt.txt"
        );
        assert_eq!(
            url_for_tag("https://pod.example", "rust"),
            "https://pod.example/search?tag=rust"
        );
    }
}
