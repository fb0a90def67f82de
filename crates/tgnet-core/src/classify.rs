use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::{
    domain::{ChatId, ConnectionType, Discovery},
    source::{MessageSource, SourceError, SourceMessage},
};

/// How many deep links in one message may become edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MentionPolicy {
    /// Reference behavior: only the first well-formed link counts.
    #[default]
    First,
    /// Every distinct well-formed link counts, in text order.
    All,
}

/// Inspects one message and emits candidate edges.
///
/// Precedence: forward provenance from a group or channel wins over textual
/// mentions, and such a message never also yields mention edges. A forward
/// from an individual user is not a chat relation, so classification falls
/// through to the mention check.
pub struct Classifier {
    source: Arc<dyn MessageSource>,
    mention_policy: MentionPolicy,
    link_re: Regex,
}

impl Classifier {
    pub fn new(source: Arc<dyn MessageSource>, mention_policy: MentionPolicy) -> Self {
        // Telegram usernames: 5-32 chars, letters/digits/underscore, must
        // start with a letter. Invite links (t.me/+hash) never match.
        let link_re = Regex::new(r"https://t\.me/([A-Za-z][A-Za-z0-9_]{4,31})")
            .expect("valid regex");
        Self {
            source,
            mention_policy,
            link_re,
        }
    }

    /// Classify one message scanned in `seed`. Returns zero or more
    /// candidate edges; targets whose participant count could not be
    /// resolved come back with `size: None` and are filtered by the caller,
    /// not here.
    pub async fn classify(&self, seed: ChatId, message: &SourceMessage) -> Vec<Discovery> {
        if let Some(forward) = &message.forward {
            if forward.kind.is_chat() {
                let target = ChatId::canonical(forward.id);
                let size = self.lookup_size(target).await;
                return vec![Discovery {
                    source: seed,
                    target,
                    label: forward.title.clone(),
                    size,
                    connection_type: ConnectionType::Forward,
                    observed_at: message.date,
                }];
            }
            // User-origin forward: no forward edge, but the text may still
            // mention a chat.
        }

        self.classify_mentions(seed, message).await
    }

    async fn classify_mentions(&self, seed: ChatId, message: &SourceMessage) -> Vec<Discovery> {
        let mut out = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for caps in self.link_re.captures_iter(&message.text) {
            let Some(username) = caps.get(1) else {
                continue;
            };
            // The 32-char cap must not truncate a longer token into a
            // "valid" username; require a real boundary after the match.
            let tail = message.text.as_bytes().get(username.end());
            if tail.is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_') {
                continue;
            }
            if seen.contains(&username.as_str()) {
                continue;
            }
            seen.push(username.as_str());
            let entity = match self.source.resolve_username(username.as_str()).await {
                Ok(entity) => entity,
                Err(SourceError::NotFound) => continue,
                Err(err) => {
                    debug!(username = username.as_str(), %err, "mention resolution failed");
                    continue;
                }
            };
            if !entity.kind.is_chat() {
                continue;
            }

            let target = ChatId::canonical(entity.id);
            let size = self.lookup_size(target).await;
            out.push(Discovery {
                source: seed,
                target,
                label: entity.title,
                size,
                connection_type: ConnectionType::Mention,
                observed_at: message.date,
            });

            if self.mention_policy == MentionPolicy::First {
                break;
            }
        }
        out
    }

    /// Participant count, or `None` when the chat keeps it hidden. Failure
    /// here never fails the message: the unknown-size filter decides later.
    async fn lookup_size(&self, chat: ChatId) -> Option<u64> {
        match self.source.participant_count(chat).await {
            Ok(n) => Some(n),
            Err(SourceError::AccessDenied) | Err(SourceError::NotFound) => None,
            Err(err) => {
                debug!(%chat, %err, "participant count lookup failed");
                None
            }
        }
    }
}
