use async_trait::async_trait;

use crate::{
    domain::ChatId,
    source::types::{Entity, ScanWindow, SourceMessage},
};

/// Failure taxonomy of the Message Source, kept separate from the engine's
/// [`crate::Error`] so callers match on it exhaustively instead of catching
/// and rethrowing. `AccessDenied` and `NotFound` are expected conditions the
/// engine recovers from locally; `Transport` covers everything else.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("access denied")]
    AccessDenied,

    #[error("entity not found")]
    NotFound,

    #[error("transport error: {0}")]
    Transport(String),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Lazy message sequence for one chat. Pagination is the implementation's
/// concern; the engine only pulls one message at a time.
#[async_trait]
pub trait MessageIter: Send {
    async fn next(&mut self) -> SourceResult<Option<SourceMessage>>;
}

/// The messaging-platform capability the engine crawls through.
///
/// The MTProto adapter lives in its own crate behind this port (same split
/// as the rest of the workspace: engine crates stay framework-agnostic).
/// The `tgnet-mem` crate is the in-memory implementation used by tests.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Start iterating a chat's history. Fails with `AccessDenied` when the
    /// whole chat is private or otherwise unreadable.
    async fn iter_messages(
        &self,
        chat: ChatId,
        window: ScanWindow,
    ) -> SourceResult<Box<dyn MessageIter>>;

    /// Resolve a public username to an entity. `NotFound` covers both
    /// syntactically invalid and unregistered names.
    async fn resolve_username(&self, username: &str) -> SourceResult<Entity>;

    /// Participant count of a chat. `AccessDenied` when the chat is private.
    async fn participant_count(&self, chat: ChatId) -> SourceResult<u64>;
}
