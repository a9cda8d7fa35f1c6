//! Line and feed parsing.
//!
//! A feed is a sequence of `<timestamp>\t<text>` records. Individual bad
//! lines are tolerated during a full scan; a feed where every line fails
//! is rejected outright, which distinguishes a briefly malformed feed
//! from something that is not a feed at all.

use std::io::BufRead;

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{FeedError, Result};
use crate::times::parse_timestamp;
use crate::types::{sort_newest_first, Twt, Twter, Twts};

// Ungreedy head: the timestamp token runs up to the first whitespace run.
static LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s+(.+)$").expect("twt line regex"));

/// Parse one raw feed line into a twt owned by `twter`.
///
/// Empty lines and `#` comment lines are legitimate non-posts and return
/// `Ok(None)`. Structurally malformed lines and lines with an unparseable
/// timestamp both surface as [`FeedError::InvalidLine`]; callers cannot
/// distinguish the two origins at this layer.
pub fn parse_line(line: &str, twter: &Twter) -> Result<Option<Twt>> {
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('#') {
        return Ok(None);
    }

    let caps = LINE_RE.captures(line).ok_or(FeedError::InvalidLine)?;
    let created = parse_timestamp(&caps[1]).map_err(|_| FeedError::InvalidLine)?;

    Ok(Some(Twt {
        twter: twter.clone(),
        created,
        text: caps[2].to_string(),
    }))
}

/// Scan a whole feed into (current, archived) twts.
///
/// Lines come from `reader` lazily; per-line parse failures are counted
/// and skipped. Valid twts strictly older than `now - ttl` land in the
/// archive bucket (a non-positive `ttl` archives nothing). Both buckets
/// are sorted newest first, then if `max > 0` the current bucket is
/// capped at `max` entries and the overflow is appended to the archive.
///
/// A plain full read is the special case `ttl` zero, `max` 0.
pub fn parse_feed<R: BufRead>(
    reader: R,
    twter: &Twter,
    ttl: Duration,
    max: usize,
) -> Result<(Twts, Twts)> {
    let mut current: Twts = Vec::new();
    let mut archived: Twts = Vec::new();

    let cutoff = Utc::now() - ttl;
    let split_by_age = ttl > Duration::zero();

    let mut lines = 0usize;
    let mut errors = 0usize;

    for line in reader.lines() {
        let line = line?;
        lines += 1;

        let twt = match parse_line(&line, twter) {
            Ok(Some(twt)) => twt,
            Ok(None) => continue,
            Err(_) => {
                errors += 1;
                continue;
            }
        };

        if split_by_age && twt.created < cutoff {
            archived.push(twt);
        } else {
            current.push(twt);
        }
    }

    if lines > 0 && lines == errors {
        warn!(lines, errors, "erroneous feed detected, rejecting scan");
        return Err(FeedError::InvalidFeed { lines, errors });
    }

    sort_newest_first(&mut current);
    sort_newest_first(&mut archived);

    if max > 0 && current.len() > max {
        let overflow = current.split_off(max);
        archived.extend(overflow);
    }

    Ok((current, archived))
}
