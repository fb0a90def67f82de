//! In-memory `MessageSource` for tests and offline replays.
//!
//! Chats are scripted up front with the builder on [`MemChat`]; the source
//! then answers history iteration, username resolution and participant
//! counts the way the live platform would, including the access-denied and
//! not-found failure modes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tgnet_core::{
    domain::ChatId,
    source::{
        Entity, EntityKind, ForwardOrigin, MessageIter, MessageSource, ScanWindow, SourceError,
        SourceMessage, SourceResult,
    },
};

/// One scripted chat. `id` is the raw platform id (supergroups keep their
/// `-100` prefix here, exactly as the wire would deliver them).
#[derive(Clone)]
pub struct MemChat {
    pub id: i64,
    pub title: String,
    pub kind: EntityKind,
    pub username: Option<String>,
    /// `None` means the count is hidden (private chat).
    pub participants: Option<u64>,
    /// `false` means history iteration is denied outright.
    pub accessible: bool,
    pub messages: Vec<SourceMessage>,
}

impl MemChat {
    pub fn channel(id: i64, title: &str) -> Self {
        Self::with_kind(id, title, EntityKind::Channel)
    }

    pub fn group(id: i64, title: &str) -> Self {
        Self::with_kind(id, title, EntityKind::Group)
    }

    pub fn user(id: i64, name: &str) -> Self {
        Self::with_kind(id, name, EntityKind::User)
    }

    fn with_kind(id: i64, title: &str, kind: EntityKind) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind,
            username: None,
            participants: None,
            accessible: true,
            messages: Vec::new(),
        }
    }

    pub fn username(mut self, name: &str) -> Self {
        self.username = Some(name.to_string());
        self
    }

    pub fn participants(mut self, n: u64) -> Self {
        self.participants = Some(n);
        self
    }

    pub fn private(mut self) -> Self {
        self.accessible = false;
        self
    }

    pub fn message(mut self, message: SourceMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn canonical_id(&self) -> ChatId {
        ChatId::canonical(self.id)
    }

    /// The entity a username lookup for this chat resolves to.
    fn entity(&self) -> Entity {
        Entity {
            id: self.id,
            title: self.title.clone(),
            kind: self.kind,
        }
    }
}

/// Plain text message helper.
pub fn text_message(id: i64, date: DateTime<Utc>, text: &str) -> SourceMessage {
    SourceMessage {
        id,
        text: text.to_string(),
        date,
        forward: None,
    }
}

/// Message forwarded from another scripted chat.
pub fn forwarded_message(id: i64, date: DateTime<Utc>, origin: &MemChat) -> SourceMessage {
    SourceMessage {
        id,
        text: String::new(),
        date,
        forward: Some(ForwardOrigin {
            id: origin.id,
            title: origin.title.clone(),
            kind: origin.kind,
        }),
    }
}

#[derive(Default)]
pub struct MemSource {
    chats: Vec<MemChat>,
}

impl MemSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(mut self, chat: MemChat) -> Self {
        self.chats.push(chat);
        self
    }

    fn find(&self, chat: ChatId) -> Option<&MemChat> {
        self.chats.iter().find(|c| c.canonical_id() == chat)
    }
}

struct MemIter {
    messages: std::vec::IntoIter<SourceMessage>,
}

#[async_trait]
impl MessageIter for MemIter {
    async fn next(&mut self) -> SourceResult<Option<SourceMessage>> {
        Ok(self.messages.next())
    }
}

#[async_trait]
impl MessageSource for MemSource {
    async fn iter_messages(
        &self,
        chat: ChatId,
        window: ScanWindow,
    ) -> SourceResult<Box<dyn MessageIter>> {
        let Some(scripted) = self.find(chat) else {
            return Err(SourceError::NotFound);
        };
        if !scripted.accessible {
            return Err(SourceError::AccessDenied);
        }

        let mut messages = scripted.messages.clone();
        match window.offset_date {
            Some(offset) => {
                // Chronological from the offset, unbounded.
                messages.retain(|m| m.date >= offset);
                messages.sort_by_key(|m| m.date);
            }
            None => {
                messages.sort_by(|a, b| b.date.cmp(&a.date));
                if let Some(limit) = window.limit {
                    messages.truncate(limit);
                }
            }
        }
        Ok(Box::new(MemIter {
            messages: messages.into_iter(),
        }))
    }

    async fn resolve_username(&self, username: &str) -> SourceResult<Entity> {
        self.chats
            .iter()
            .find(|c| {
                c.username
                    .as_deref()
                    .is_some_and(|u| u.eq_ignore_ascii_case(username))
            })
            .map(MemChat::entity)
            .ok_or(SourceError::NotFound)
    }

    async fn participant_count(&self, chat: ChatId) -> SourceResult<u64> {
        match self.find(chat) {
            None => Err(SourceError::NotFound),
            Some(c) => c.participants.ok_or(SourceError::AccessDenied),
        }
    }
}
