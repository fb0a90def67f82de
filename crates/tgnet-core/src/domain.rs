use std::fmt;

use chrono::{DateTime, Utc};

/// Telegram's "-100" marker prefixing broadcast/supergroup ids in API
/// payloads. Stripped once, syntactically, to get the canonical form.
const SUPERGROUP_MARKER: &str = "-100";

/// Canonical chat id (numeric).
///
/// Both output files only ever contain canonical ids, so the raw platform
/// form is normalized at the boundary: construct via [`ChatId::canonical`]
/// for anything coming off the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl ChatId {
    /// Normalize a raw platform id.
    ///
    /// `-1001318845663` becomes `1318845663`; anything without the marker
    /// passes through, so the operation is idempotent.
    pub fn canonical(raw: i64) -> ChatId {
        let s = raw.to_string();
        match s.strip_prefix(SUPERGROUP_MARKER) {
            Some(rest) if !rest.is_empty() => {
                rest.parse::<i64>().map(ChatId).unwrap_or(ChatId(raw))
            }
            _ => ChatId(raw),
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a discovered chat is related to the chat it was discovered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionType {
    /// A message in the source chat was forwarded from the target chat.
    Forward,
    /// A message in the source chat links to the target chat.
    Mention,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionType::Forward => f.write_str("forward"),
            ConnectionType::Mention => f.write_str("mention"),
        }
    }
}

/// A chat as recorded in `node.csv`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatNode {
    pub id: ChatId,
    pub label: String,
    /// Participant count. `None` while unresolved; nodes are only persisted
    /// once the size is known.
    pub size: Option<u64>,
}

/// A relation as recorded in `edge.csv`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    /// The chat that was being scanned.
    pub source: ChatId,
    /// The chat discovered via a message in `source`.
    pub target: ChatId,
    pub connection_type: ConnectionType,
    /// Timestamp of the originating message.
    pub observed_at: DateTime<Utc>,
}

/// A candidate edge produced by classification, before the unknown-size
/// filter decides whether it is recorded at all.
#[derive(Clone, Debug)]
pub struct Discovery {
    pub source: ChatId,
    pub target: ChatId,
    pub label: String,
    pub size: Option<u64>,
    pub connection_type: ConnectionType,
    pub observed_at: DateTime<Utc>,
}

impl Discovery {
    pub fn node(&self) -> ChatNode {
        ChatNode {
            id: self.target,
            label: self.label.clone(),
            size: self.size,
        }
    }

    pub fn edge(&self) -> Edge {
        Edge {
            source: self.source,
            target: self.target,
            connection_type: self.connection_type,
            observed_at: self.observed_at,
        }
    }
}
