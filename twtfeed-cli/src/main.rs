//! twtfeed CLI - append-only twtxt feed storage and inspection
//!
//! Thin front-end over twtfeed-core:
//! - Posting, editing and undoing twts (`post`, `edit`, `undo`)
//! - Reading feeds newest-first with TTL/cap aggregation (`timeline`, `last`)
//! - Pod housekeeping (`feeds`, `stats`)

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use twtfeed_core::{
    append_twt, delete_last_twt, edit_last_twt, feed_exists, get_all_feeds, get_feed_count,
    get_last_twt, get_twts, PodConfig, PostOptions, Store, Twt, User,
};

#[derive(Parser, Debug)]
#[command(
    name = "twtfeed",
    author,
    version,
    about = "Append-only twtxt feed storage engine",
    long_about = "Store, edit and read line-oriented twtxt feeds. One plain-text file per \
                  feed is the durable store; no database involved."
)]
struct Cli {
    /// Path to config file (default: ~/.twtfeed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data root override (feeds live under <data>/feeds/)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Pod base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a new twt to a feed
    Post(PostArgs),
    /// Show a feed's twts, newest first
    Timeline(TimelineArgs),
    /// Show the most recent twt in a feed
    Last {
        /// Feed name
        name: String,
    },
    /// Remove the most recent twt from a feed
    Undo {
        /// Feed name
        name: String,
    },
    /// Replace the most recent twt, preserving its timestamp
    Edit {
        /// Feed name
        name: String,
        /// Replacement text
        text: String,
    },
    /// List all feeds on this pod
    Feeds,
    /// Count the records in a feed
    Stats {
        /// Feed name
        name: String,
    },
}

#[derive(Parser, Debug)]
struct PostArgs {
    /// Feed to post to
    name: String,

    /// Post text; mentions and tags are expanded before the write
    text: String,

    /// Followed feed as nick=url, repeatable; used for mention expansion
    #[arg(long = "follow", value_name = "NICK=URL")]
    follow: Vec<String>,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Feed name
    name: String,

    /// Archive twts older than this many seconds (0 keeps everything current)
    #[arg(long, default_value_t = 0)]
    ttl: i64,

    /// Cap the current bucket at N twts (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max: usize,

    /// Include archived twts in the output
    #[arg(long)]
    archived: bool,

    /// Emit one JSON object per twt instead of text
    #[arg(long)]
    json: bool,
}

/// Store backed by the local feeds directory: a name exists when its feed
/// file does. The CLI has no user database.
struct DirStore {
    conf: PodConfig,
}

impl Store for DirStore {
    fn has_user(&self, _username: &str) -> bool {
        false
    }

    fn has_feed(&self, name: &str) -> bool {
        feed_exists(&self.conf, name).unwrap_or(false)
    }
}

fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn load_config(cli: &Cli) -> Result<PodConfig> {
    let mut conf = PodConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(data) = &cli.data {
        conf.data = data.clone();
    }
    if let Some(base_url) = &cli.base_url {
        conf.base_url = base_url.clone();
    }
    Ok(conf)
}

fn user_with_following(name: &str, follow: &[String]) -> Result<User> {
    let mut user = User::new(name);
    for entry in follow {
        let (nick, url) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("--follow takes NICK=URL, got '{entry}'"))?;
        user.following.insert(nick.to_string(), url.to_string());
    }
    Ok(user)
}

fn print_twt(twt: &Twt, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(twt)?);
    } else {
        println!(
            "{}  @{}: {}",
            twt.created.format("%Y-%m-%d %H:%M:%S"),
            twt.twter.nick,
            twt.text
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;
    let conf = load_config(&cli)?;

    match &cli.command {
        Commands::Post(args) => {
            let user = user_with_following(&args.name, &args.follow)?;
            let store = DirStore { conf: conf.clone() };
            let twt = append_twt(&conf, &store, &user, &args.text, PostOptions::default())
                .context("failed to post twt")?;
            print_twt(&twt, false)?;
        }
        Commands::Timeline(args) => {
            let (current, archived) = get_twts(
                &conf,
                &args.name,
                Duration::seconds(args.ttl),
                args.max,
            )
            .with_context(|| format!("failed to read feed '{}'", args.name))?;

            for twt in &current {
                print_twt(twt, args.json)?;
            }
            if args.archived {
                for twt in &archived {
                    print_twt(twt, args.json)?;
                }
            }
        }
        Commands::Last { name } => {
            let user = User::new(name);
            let (twt, _offset) = get_last_twt(&conf, &user)
                .with_context(|| format!("failed to read last twt of '{name}'"))?;
            print_twt(&twt, false)?;
        }
        Commands::Undo { name } => {
            let user = User::new(name);
            delete_last_twt(&conf, &user)
                .with_context(|| format!("failed to delete last twt of '{name}'"))?;
        }
        Commands::Edit { name, text } => {
            let user = User::new(name);
            let store = DirStore { conf: conf.clone() };
            let twt = edit_last_twt(&conf, &store, &user, text)
                .with_context(|| format!("failed to edit last twt of '{name}'"))?;
            print_twt(&twt, false)?;
        }
        Commands::Feeds => {
            let mut feeds = get_all_feeds(&conf).context("failed to list feeds")?;
            feeds.sort();
            for feed in feeds {
                println!("{feed}");
            }
        }
        Commands::Stats { name } => {
            let count = get_feed_count(&conf, name)
                .with_context(|| format!("failed to count records of '{name}'"))?;
            println!("{count}");
        }
    }

    Ok(())
}
