//! Crawl a small scripted chat network without touching the real platform.
//!
//! Run with `cargo run -p tgnet-mem --example offline_crawl`; output lands
//! in `data/run_<timestamp>/`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use tgnet_core::{config::Config, crawl::Crawler, domain::ChatId, logging, scan::Pacing};
use tgnet_mem::{forwarded_message, text_message, MemChat, MemSource};

#[tokio::main]
async fn main() -> Result<(), tgnet_core::Error> {
    logging::init("offline_crawl")?;

    let ts = |h| Utc.with_ymd_and_hms(2025, 3, 1, h, 0, 0).unwrap();

    let alpha = MemChat::channel(-100200, "Alpha News").participants(500);
    let beta = MemChat::channel(-100300, "Beta Chat")
        .username("betachan")
        .participants(10);
    let seed = MemChat::channel(-100100, "Seed Channel")
        .participants(50)
        .message(forwarded_message(1, ts(10), &alpha))
        .message(text_message(2, ts(9), "discuss at https://t.me/betachan"));

    let source = MemSource::new()
        .with_chat(seed)
        .with_chat(alpha)
        .with_chat(beta);

    let cfg = Config {
        pacing: Pacing::disabled(),
        ..Config::default()
    };
    let summary = Crawler::new(Arc::new(source), cfg)
        .run_with_seeds(vec![ChatId(100)])
        .await?;

    println!(
        "crawled {} rounds: {} nodes, {} edges -> {}",
        summary.rounds_run,
        summary.nodes_written,
        summary.edges_written,
        summary.run_dir.display()
    );
    Ok(())
}
