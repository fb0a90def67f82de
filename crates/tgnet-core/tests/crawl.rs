//! Full-crawl tests driving the engine against a scripted in-memory source.

use std::{fs, io::Write, path::Path, sync::Arc};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tempfile::tempdir;

use tgnet_core::{config::Config, crawl::Crawler, domain::ChatId, scan::Pacing};
use tgnet_mem::{forwarded_message, text_message, MemChat, MemSource};

fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
}

fn config(data_dir: &Path) -> Config {
    Config {
        data_dir: data_dir.to_path_buf(),
        pacing: Pacing::disabled(),
        ..Config::default()
    }
}

fn read_lines(dir: &Path, name: &str) -> Vec<String> {
    fs::read_to_string(dir.join(name))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn end_to_end_forward_and_mention() {
    let alpha = MemChat::channel(-100200, "Alpha").participants(500);
    let beta = MemChat::channel(-100300, "Beta")
        .username("betachan")
        .participants(10);
    let seed = MemChat::channel(-100100, "Seed")
        .participants(50)
        .message(forwarded_message(1, ts(10), &alpha))
        .message(text_message(2, ts(9), "join https://t.me/betachan today"));
    let source = MemSource::new()
        .with_chat(seed)
        .with_chat(alpha)
        .with_chat(beta);

    let data = tempdir().unwrap();
    let mut cfg = config(data.path());

    // Drive the whole pipeline including the seed file.
    let seeds_path = data.path().join("seeds.tsv");
    let mut f = fs::File::create(&seeds_path).unwrap();
    writeln!(f, "id\tlabel").unwrap();
    writeln!(f, "100\tSeed").unwrap();
    cfg.seeds_file = seeds_path;

    let summary = Crawler::new(Arc::new(source), cfg).run().await.unwrap();

    assert_eq!(summary.rounds_run, 2);
    assert_eq!(summary.nodes_written, 2);
    assert_eq!(summary.edges_written, 2);

    // Newest-first scan sees the forward (10:00) before the mention (09:00).
    assert_eq!(
        read_lines(&summary.run_dir, "node.csv"),
        vec![
            "id\tlabel\tsize",
            "200\tAlpha\t500",
            "300\tBeta\t10",
        ]
    );
    assert_eq!(
        read_lines(&summary.run_dir, "edge.csv"),
        vec![
            "source\ttarget\tconnection_type\tconnection_date",
            "100\t200\tforward\t2025-03-01T10:00:00+00:00",
            "100\t300\tmention\t2025-03-01T09:00:00+00:00",
        ]
    );
    assert!(summary.run_dir.join("file.log").exists());
}

#[tokio::test]
async fn user_forward_still_yields_mention_from_text() {
    let user = MemChat::user(900, "Some Body");
    let beta = MemChat::channel(-100300, "Beta")
        .username("betachan")
        .participants(10);
    let mut fwd = forwarded_message(1, ts(10), &user);
    fwd.text = "see https://t.me/betachan".to_string();
    let seed = MemChat::channel(-100100, "Seed")
        .participants(50)
        .message(fwd);
    let source = MemSource::new().with_chat(seed).with_chat(beta);

    let data = tempdir().unwrap();
    let cfg = Config {
        rounds: 1,
        ..config(data.path())
    };
    let summary = Crawler::new(Arc::new(source), cfg)
        .run_with_seeds(vec![ChatId(100)])
        .await
        .unwrap();

    assert_eq!(summary.edges_written, 1);
    let edges = read_lines(&summary.run_dir, "edge.csv");
    assert!(edges[1].starts_with("100\t300\tmention"));
}

#[tokio::test]
async fn offset_date_scans_oldest_first_and_ignores_limit() {
    let day = |d| Utc.with_ymd_and_hms(2025, 3, d, 9, 0, 0).unwrap();
    let a = MemChat::channel(-100201, "A").participants(1);
    let b = MemChat::channel(-100202, "B").participants(2);
    let c = MemChat::channel(-100203, "C").participants(3);
    let d = MemChat::channel(-100204, "D").participants(4);
    let seed = MemChat::channel(-100100, "Seed")
        .participants(5)
        .message(forwarded_message(1, day(1), &a))
        .message(forwarded_message(2, day(2), &b))
        .message(forwarded_message(3, day(3), &c))
        .message(forwarded_message(4, day(4), &d));
    let source = MemSource::new()
        .with_chat(seed)
        .with_chat(a)
        .with_chat(b)
        .with_chat(c)
        .with_chat(d);

    let data = tempdir().unwrap();
    let cfg = Config {
        rounds: 1,
        // With an offset date the limit must not apply.
        message_limit: 1,
        offset_date: Some(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()),
        ..config(data.path())
    };
    let summary = Crawler::new(Arc::new(source), cfg)
        .run_with_seeds(vec![ChatId(100)])
        .await
        .unwrap();

    // Everything from March 2 on, chronologically.
    assert_eq!(summary.edges_written, 3);
    let edges = read_lines(&summary.run_dir, "edge.csv");
    assert!(edges[1].starts_with("100\t202\tforward\t2025-03-02"));
    assert!(edges[2].starts_with("100\t203\tforward\t2025-03-03"));
    assert!(edges[3].starts_with("100\t204\tforward\t2025-03-04"));
}

#[tokio::test]
async fn private_seed_yields_empty_contribution() {
    let alpha = MemChat::channel(-100200, "Alpha").participants(500);
    let open = MemChat::channel(-100100, "Open")
        .participants(50)
        .message(forwarded_message(1, ts(10), &alpha));
    let locked = MemChat::channel(-100666, "Locked").private();
    let source = MemSource::new()
        .with_chat(open)
        .with_chat(locked)
        .with_chat(alpha);

    let data = tempdir().unwrap();
    let cfg = Config {
        rounds: 1,
        ..config(data.path())
    };

    let summary = Crawler::new(Arc::new(source), cfg)
        .run_with_seeds(vec![ChatId(100), ChatId(666)])
        .await
        .unwrap();

    assert_eq!(summary.edges_written, 1);
    let edges = read_lines(&summary.run_dir, "edge.csv");
    assert_eq!(edges.len(), 2); // header + the one edge from the open chat
    assert!(edges[1].starts_with("100\t200\tforward"));
}

#[tokio::test]
async fn crawl_stops_when_frontier_empties() {
    let quiet = MemChat::channel(-100100, "Quiet")
        .participants(5)
        .message(text_message(1, ts(9), "no links here"));
    let source = MemSource::new().with_chat(quiet);

    let data = tempdir().unwrap();
    let summary = Crawler::new(Arc::new(source), config(data.path()))
        .run_with_seeds(vec![ChatId(100)])
        .await
        .unwrap();

    // Budget is 2 but round 0 discovers nothing, so round 1 never scans.
    assert_eq!(summary.rounds_run, 1);
    assert_eq!(summary.nodes_written, 0);
    assert_eq!(summary.edges_written, 0);
}

#[tokio::test]
async fn unknown_size_targets_are_dropped_entirely() {
    let hidden = MemChat::channel(-100300, "Hidden"); // no participant count
    let seed = MemChat::channel(-100100, "Seed")
        .participants(5)
        .message(forwarded_message(1, ts(9), &hidden));
    let source = MemSource::new().with_chat(seed).with_chat(hidden);

    let data = tempdir().unwrap();
    let summary = Crawler::new(Arc::new(source), config(data.path()))
        .run_with_seeds(vec![ChatId(100)])
        .await
        .unwrap();

    assert_eq!(summary.nodes_written, 0);
    assert_eq!(summary.edges_written, 0);
    assert_eq!(read_lines(&summary.run_dir, "node.csv").len(), 1);
    assert_eq!(read_lines(&summary.run_dir, "edge.csv").len(), 1);
}

#[tokio::test]
async fn repeated_discoveries_are_written_repeatedly() {
    let alpha = MemChat::channel(-100200, "Alpha").participants(500);
    let seed = MemChat::channel(-100100, "Seed")
        .participants(5)
        .message(forwarded_message(1, ts(10), &alpha))
        .message(forwarded_message(2, ts(9), &alpha));
    let source = MemSource::new().with_chat(seed).with_chat(alpha);

    let data = tempdir().unwrap();
    let cfg = Config {
        rounds: 1,
        ..config(data.path())
    };
    let summary = Crawler::new(Arc::new(source), cfg)
        .run_with_seeds(vec![ChatId(100)])
        .await
        .unwrap();

    assert_eq!(summary.nodes_written, 2);
    assert_eq!(summary.edges_written, 2);
    let nodes = read_lines(&summary.run_dir, "node.csv");
    assert_eq!(nodes[1], nodes[2]);
}

#[tokio::test]
async fn cycles_rescan_by_default_but_not_with_visited_tracking() {
    let seed_proto = MemChat::channel(-100100, "Seed").participants(5);
    let alpha_proto = MemChat::channel(-100200, "Alpha").participants(500);
    let seed = seed_proto
        .clone()
        .message(forwarded_message(1, ts(10), &alpha_proto));
    let alpha = alpha_proto.message(forwarded_message(2, ts(11), &seed_proto));

    let build_source = || {
        MemSource::new()
            .with_chat(seed.clone())
            .with_chat(alpha.clone())
    };

    // Reference behavior: the 100 -> 200 -> 100 cycle keeps re-scanning.
    let data = tempdir().unwrap();
    let cfg = Config {
        rounds: 3,
        ..config(data.path())
    };
    let summary = Crawler::new(Arc::new(build_source()), cfg)
        .run_with_seeds(vec![ChatId(100)])
        .await
        .unwrap();
    assert_eq!(summary.rounds_run, 3);
    assert_eq!(summary.edges_written, 3);

    // With tracking on, the rediscovered seed never re-enters the frontier,
    // though its edge row is still recorded.
    let data = tempdir().unwrap();
    let cfg = Config {
        rounds: 3,
        track_visited: true,
        ..config(data.path())
    };
    let summary = Crawler::new(Arc::new(build_source()), cfg)
        .run_with_seeds(vec![ChatId(100)])
        .await
        .unwrap();
    assert_eq!(summary.rounds_run, 2);
    assert_eq!(summary.edges_written, 2);
    let edges = read_lines(&summary.run_dir, "edge.csv");
    assert!(edges[2].starts_with("200\t100\tforward"));
}
