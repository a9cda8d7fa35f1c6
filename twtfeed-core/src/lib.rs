pub mod config;
pub mod error;
pub mod expand;
pub mod feed;
pub mod parse;
pub mod store;
pub mod times;
pub mod types;
pub mod urls;

pub use config::PodConfig;
pub use error::{FeedError, Result};
pub use expand::{expand_mentions, expand_tags};
pub use feed::{
    append_special, append_twt, delete_last_twt, edit_last_twt, feed_exists, get_all_feeds,
    get_all_twts, get_feed_count, get_last_twt, get_twts, truncate_feed, PostOptions,
};
pub use parse::{parse_feed, parse_line};
pub use store::{MemoryStore, Store};
pub use times::parse_timestamp;
pub use types::{sort_newest_first, Twt, Twter, Twts, User};
pub use urls::{normalize_username, url_for_tag, url_for_user};
