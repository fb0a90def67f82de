use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveDate;

use crate::{classify::MentionPolicy, errors::Error, scan::Pacing, Result};

/// Crawl invocation parameters, loaded from the environment (plus an
/// optional `.env` file). All fields are public so embedding callers and
/// tests can build a `Config` directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Breadth-first round budget.
    pub rounds: u32,
    /// Tab-separated seed file with an `id` column.
    pub seeds_file: PathBuf,
    /// Parent directory for per-run output directories.
    pub data_dir: PathBuf,
    /// When set, scan oldest-first from this date; `message_limit` is then
    /// ignored.
    pub offset_date: Option<NaiveDate>,
    /// Newest-first per-chat message cap.
    pub message_limit: usize,
    pub pacing: Pacing,
    pub mention_policy: MentionPolicy,
    /// Drop already-scanned chats from later frontiers. Off by default to
    /// keep reference output semantics (cycles re-scan).
    pub track_visited: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rounds: 2,
            seeds_file: PathBuf::from("seeds.tsv"),
            data_dir: PathBuf::from("data"),
            offset_date: None,
            message_limit: 100,
            pacing: Pacing::default(),
            mention_policy: MentionPolicy::default(),
            track_visited: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let mut cfg = Config::default();
        if let Some(n) = env_u32("TGNET_ROUNDS") {
            cfg.rounds = n;
        }
        if let Some(p) = env_path("TGNET_SEEDS_FILE") {
            cfg.seeds_file = p;
        }
        if let Some(p) = env_path("TGNET_DATA_DIR") {
            cfg.data_dir = p;
        }
        if let Some(s) = env_str("TGNET_OFFSET_DATE") {
            cfg.offset_date = Some(parse_offset_date(&s)?);
        }
        if let Some(n) = env_usize("TGNET_MESSAGE_LIMIT") {
            cfg.message_limit = n;
        }
        if let Some(ms) = env_u64("TGNET_PACING_MIN_MS") {
            cfg.pacing.min = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("TGNET_PACING_MAX_MS") {
            cfg.pacing.max = Duration::from_millis(ms);
        }
        if let Some(s) = env_str("TGNET_MENTION_POLICY") {
            cfg.mention_policy = parse_mention_policy(&s)?;
        }
        if let Some(b) = env_bool("TGNET_TRACK_VISITED") {
            cfg.track_visited = b;
        }
        Ok(cfg)
    }
}

pub(crate) fn parse_offset_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        Error::Config(format!(
            "invalid TGNET_OFFSET_DATE {s:?} (expected YYYY-MM-DD)"
        ))
    })
}

pub(crate) fn parse_mention_policy(s: &str) -> Result<MentionPolicy> {
    match s.trim().to_lowercase().as_str() {
        "first" => Ok(MentionPolicy::First),
        "all" => Ok(MentionPolicy::All),
        other => Err(Error::Config(format!(
            "invalid TGNET_MENTION_POLICY {other:?} (expected `first` or `all`)"
        ))),
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}
