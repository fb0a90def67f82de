//! Telegram chat-graph discovery engine.
//!
//! Starting from a seed set of chats, the [`crawl::Crawler`] expands
//! breadth-first for a bounded number of rounds, classifying each scanned
//! message into forward-origin or mention edges and appending the
//! discovered graph to per-run `node.csv` / `edge.csv` files.
//!
//! This crate is intentionally platform-agnostic: the Telegram wire
//! protocol lives behind the [`source::MessageSource`] port, implemented in
//! adapter crates (`tgnet-mem` for tests and offline replays).

pub mod classify;
pub mod config;
pub mod crawl;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod record;
pub mod scan;
pub mod seeds;
pub mod source;

pub use errors::{Error, Result};
