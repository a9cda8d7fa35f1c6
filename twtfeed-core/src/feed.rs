//! Feed-file storage and the high-level post operations.
//!
//! One plain-text file per normalized username under `<data>/feeds/`,
//! one `<timestamp>\t<text>` record per line, newline-terminated. The
//! file is the durable store: appends grow it, truncation only ever
//! removes the most recent line, and reads always re-scan it.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use tracing::{debug, error, instrument, warn};

use crate::config::PodConfig;
use crate::error::{FeedError, Result};
use crate::expand::{expand_mentions, expand_tags};
use crate::parse::{parse_feed, parse_line};
use crate::store::Store;
use crate::types::{Twt, Twter, Twts, User};
use crate::urls::{normalize_username, url_for_user};

// Reverse-scan block size for last-line reads.
const CHUNK: usize = 4096;

// Writers are serialized per feed file; interleaved partial appends would
// corrupt the tab/newline record boundary. Reads stay lock-free.
static FEED_LOCKS: Lazy<Mutex<HashMap<String, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn feed_lock(name: &str) -> Arc<Mutex<()>> {
    let mut locks = FEED_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    locks.entry(name.to_string()).or_default().clone()
}

/// Options for [`append_twt`]. A `created` override backdates the record;
/// the edit flow uses it to preserve the original creation timestamp.
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    pub created: Option<DateTime<Utc>>,
}

fn ensure_feeds_dir(conf: &PodConfig) -> Result<PathBuf> {
    let dir = conf.feeds_dir();
    if let Err(err) = fs::create_dir_all(&dir) {
        error!(dir = %dir.display(), %err, "error creating feeds directory");
        return Err(err.into());
    }
    Ok(dir)
}

fn feed_path(conf: &PodConfig, name: &str) -> Result<PathBuf> {
    Ok(ensure_feeds_dir(conf)?.join(normalize_username(name)))
}

/// Append a new twt to the user's feed.
///
/// The text is trimmed and rejected if empty, mentions and tags are
/// expanded (in that order), and the record is written as a single
/// buffered line. Nothing is written unless the whole expand+append
/// succeeds. Returns the twt exactly as it went to disk.
#[instrument(skip_all, fields(user = %user.username))]
pub fn append_twt(
    conf: &PodConfig,
    store: &dyn Store,
    user: &User,
    text: &str,
    opts: PostOptions,
) -> Result<Twt> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FeedError::EmptyTwt);
    }

    let name = normalize_username(&user.username);
    let path = feed_path(conf, &name)?;

    let created = opts.created.unwrap_or_else(Utc::now);
    let expanded = expand_tags(conf, &expand_mentions(conf, store, user, text));
    let line = format!(
        "{}\t{}\n",
        created.to_rfc3339_opts(SecondsFormat::Secs, true),
        expanded
    );

    {
        let lock = feed_lock(&name);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
    }

    debug!(feed = %name, "appended twt");

    // Hand back what actually went to disk.
    parse_line(line.trim_end_matches('\n'), &user.twter(conf))?.ok_or(FeedError::InvalidLine)
}

/// Append to a pod-owned feed (news, support, ...). Special feeds follow
/// nobody, so mentions only resolve against the local store.
pub fn append_special(
    conf: &PodConfig,
    store: &dyn Store,
    feed: &str,
    text: &str,
    opts: PostOptions,
) -> Result<Twt> {
    let user = User::new(feed);
    append_twt(conf, store, &user, text, opts)
}

/// Read the most recent twt and the byte offset where its line starts.
/// The offset is the truncation point for [`delete_last_twt`].
pub fn get_last_twt(conf: &PodConfig, user: &User) -> Result<(Twt, u64)> {
    let path = feed_path(conf, &user.username)?;

    let (data, offset) = read_last_line(&path)?;
    let line = String::from_utf8_lossy(&data);

    let twt = parse_line(&line, &user.twter(conf))?.ok_or(FeedError::InvalidLine)?;
    Ok((twt, offset))
}

/// Shrink a feed file to exactly `offset` bytes. Bytes before the offset
/// are untouched; this only ever undoes the most recent append.
pub fn truncate_feed(conf: &PodConfig, user: &User, offset: u64) -> Result<()> {
    let name = normalize_username(&user.username);
    let path = feed_path(conf, &name)?;

    let lock = feed_lock(&name);
    let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    let file = OpenOptions::new().write(true).open(&path)?;
    file.set_len(offset)?;
    Ok(())
}

/// Remove the most recent twt by truncating the feed file to the start of
/// its final line.
#[instrument(skip_all, fields(user = %user.username))]
pub fn delete_last_twt(conf: &PodConfig, user: &User) -> Result<()> {
    let (_twt, offset) = get_last_twt(conf, user)?;
    truncate_feed(conf, user, offset)
}

/// Replace the most recent twt while preserving its creation timestamp.
///
/// There is no in-place rewrite: the old record is truncated away and the
/// replacement is appended with the original `created`.
pub fn edit_last_twt(
    conf: &PodConfig,
    store: &dyn Store,
    user: &User,
    text: &str,
) -> Result<Twt> {
    let (last, _offset) = get_last_twt(conf, user)?;
    delete_last_twt(conf, user)?;
    append_twt(
        conf,
        store,
        user,
        text,
        PostOptions {
            created: Some(last.created),
        },
    )
}

/// Existence probe. A missing feed file is `Ok(false)`, never an error;
/// only true I/O failures propagate.
pub fn feed_exists(conf: &PodConfig, username: &str) -> Result<bool> {
    let path = conf.feeds_dir().join(normalize_username(username));
    Ok(path.try_exists()?)
}

/// Count the newline-delimited records in a feed without parsing them.
pub fn get_feed_count(conf: &PodConfig, name: &str) -> Result<usize> {
    let path = feed_path(conf, name)?;

    let file = File::open(&path).map_err(|err| {
        error!(path = %path.display(), %err, "error opening feed file");
        FeedError::from(err)
    })?;

    count_lines(BufReader::new(file))
}

/// Enumerate the feeds directory, one entry per feed file.
/// Order is unspecified; callers sort if they need to.
pub fn get_all_feeds(conf: &PodConfig) -> Result<Vec<String>> {
    let dir = ensure_feeds_dir(conf)?;

    let entries = fs::read_dir(&dir).map_err(|err| {
        error!(dir = %dir.display(), %err, "error reading feeds directory");
        FeedError::from(err)
    })?;

    let mut feeds = Vec::new();
    for entry in entries {
        let entry = entry?;
        feeds.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(feeds)
}

/// Scan a feed into (current, archived) twts with the given TTL and cap.
pub fn get_twts(conf: &PodConfig, name: &str, ttl: Duration, max: usize) -> Result<(Twts, Twts)> {
    let name = normalize_username(name);
    let path = feed_path(conf, &name)?;

    let twter = Twter {
        url: url_for_user(conf, &name),
        nick: name,
    };

    let file = File::open(&path).map_err(|err| {
        warn!(path = %path.display(), %err, "error opening feed");
        FeedError::from(err)
    })?;

    parse_feed(BufReader::new(file), &twter, ttl, max)
}

/// Read every twt in a feed, newest first.
pub fn get_all_twts(conf: &PodConfig, name: &str) -> Result<Twts> {
    let (twts, _archived) = get_twts(conf, name, Duration::zero(), 0)?;
    Ok(twts)
}

/// Read the final line of a file and its starting byte offset without
/// scanning the whole file, walking backwards in fixed-size blocks.
fn read_last_line(path: &Path) -> Result<(Vec<u8>, u64)> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok((Vec::new(), 0));
    }

    // A complete feed record ends in exactly one newline; ignore it.
    let mut end = len;
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        end -= 1;
    }

    let mut start = 0u64;
    let mut pos = end;
    let mut buf = vec![0u8; CHUNK];
    'scan: while pos > 0 {
        let take = CHUNK.min(pos as usize);
        pos -= take as u64;
        file.seek(SeekFrom::Start(pos))?;
        let block = &mut buf[..take];
        file.read_exact(block)?;

        for (i, byte) in block.iter().enumerate().rev() {
            if *byte == b'\n' {
                start = pos + i as u64 + 1;
                break 'scan;
            }
        }
    }

    let mut content = vec![0u8; (end - start) as usize];
    file.seek(SeekFrom::Start(start))?;
    file.read_exact(&mut content)?;
    Ok((content, start))
}

fn count_lines<R: Read>(mut reader: R) -> Result<usize> {
    let mut count = 0;
    let mut buf = [0u8; 32 * 1024];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => count += buf[..n].iter().filter(|&&b| b == b'\n').count(),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_last_line_single() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed");
        fs::write(&path, "only line\n").unwrap();

        let (data, offset) = read_last_line(&path).unwrap();
        assert_eq!(data, b"only line");
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_read_last_line_multi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed");
        fs::write(&path, "first\nsecond\nthird\n").unwrap();

        let (data, offset) = read_last_line(&path).unwrap();
        assert_eq!(data, b"third");
        assert_eq!(offset, "first\nsecond\n".len() as u64);
    }

    #[test]
    fn test_read_last_line_longer_than_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed");

        let long = "x".repeat(CHUNK * 2 + 17);
        fs::write(&path, format!("short\n{long}\n")).unwrap();

        let (data, offset) = read_last_line(&path).unwrap();
        assert_eq!(data, long.as_bytes());
        assert_eq!(offset, "short\n".len() as u64);
    }

    #[test]
    fn test_read_last_line_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed");
        fs::write(&path, "").unwrap();

        let (data, offset) = read_last_line(&path).unwrap();
        assert!(data.is_empty());
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(&b""[..]).unwrap(), 0);
        assert_eq!(count_lines(&b"one\ntwo\nthree\n"[..]).unwrap(), 3);
        assert_eq!(count_lines(&b"unterminated"[..]).unwrap(), 0);
    }
}
