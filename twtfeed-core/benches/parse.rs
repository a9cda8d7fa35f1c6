use std::io::Cursor;

use chrono::{Duration, SecondsFormat, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use twtfeed_core::{parse_feed, parse_line, Twter};

fn twter() -> Twter {
    Twter {
        nick: "bench".to_string(),
        url: "https://pod.example/user/bench/twtxt.txt".to_string(),
    }
}

fn synthetic_feed(lines: usize) -> String {
    let now = Utc::now();
    (0..lines)
        .map(|i| {
            format!(
                "{}\tpost number {} with a #tag and some filler text",
                (now - Duration::minutes(i as i64)).to_rfc3339_opts(SecondsFormat::Secs, true),
                i
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_parse_line(c: &mut Criterion) {
    let twter = twter();
    let line = "2020-07-18T12:39:52.132+02:00\thello @<alice https://pod.example/alice.txt> world";

    c.bench_function("parse_line", |b| {
        b.iter(|| parse_line(black_box(line), &twter).unwrap())
    });
}

fn bench_parse_feed(c: &mut Criterion) {
    let twter = twter();
    let feed = synthetic_feed(1000);

    c.bench_function("parse_feed_1000_lines", |b| {
        b.iter(|| {
            let (twts, old) =
                parse_feed(Cursor::new(feed.as_bytes()), &twter, Duration::zero(), 0).unwrap();
            black_box((twts, old))
        })
    });
}

fn bench_parse_feed_with_ttl(c: &mut Criterion) {
    let twter = twter();
    let feed = synthetic_feed(1000);

    c.bench_function("parse_feed_ttl_and_cap", |b| {
        b.iter(|| {
            let (twts, old) = parse_feed(
                Cursor::new(feed.as_bytes()),
                &twter,
                Duration::hours(8),
                100,
            )
            .unwrap();
            black_box((twts, old))
        })
    });
}

criterion_group!(
    benches,
    bench_parse_line,
    bench_parse_feed,
    bench_parse_feed_with_ttl
);
criterion_main!(benches);
