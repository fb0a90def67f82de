use chrono::{DateTime, Utc};

/// What kind of entity a username or forward header points at.
///
/// Only groups and channels become graph nodes; forwards from (or links to)
/// individual users are ignored by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Group,
    Channel,
}

impl EntityKind {
    pub fn is_chat(self) -> bool {
        matches!(self, EntityKind::Group | EntityKind::Channel)
    }
}

/// A resolved platform entity. `id` is the raw platform id, not yet
/// canonicalized.
#[derive(Clone, Debug)]
pub struct Entity {
    pub id: i64,
    pub title: String,
    pub kind: EntityKind,
}

/// Forward provenance attached to a message.
#[derive(Clone, Debug)]
pub struct ForwardOrigin {
    /// Raw platform id of the chat the message was forwarded from.
    pub id: i64,
    pub title: String,
    pub kind: EntityKind,
}

/// One message as produced by the Message Source.
#[derive(Clone, Debug)]
pub struct SourceMessage {
    pub id: i64,
    pub text: String,
    pub date: DateTime<Utc>,
    pub forward: Option<ForwardOrigin>,
}

/// Which slice of a chat's history to iterate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanWindow {
    /// When set, iterate oldest-first from this instant and ignore `limit`.
    pub offset_date: Option<DateTime<Utc>>,
    /// Newest-first message cap; only honored when `offset_date` is unset.
    pub limit: Option<usize>,
}

impl ScanWindow {
    pub fn newest(limit: usize) -> Self {
        Self {
            offset_date: None,
            limit: Some(limit),
        }
    }

    pub fn since(offset_date: DateTime<Utc>) -> Self {
        Self {
            offset_date: Some(offset_date),
            limit: None,
        }
    }
}
