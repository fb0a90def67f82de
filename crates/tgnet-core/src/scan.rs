use std::{sync::Arc, time::Duration};

use rand::Rng;
use tracing::debug;

use crate::{
    classify::Classifier,
    domain::{ChatId, Discovery},
    record::RunLog,
    source::{MessageSource, ScanWindow, SourceError},
};

/// Randomized per-message delay, to stay under the platform's implicit
/// flood limits. Policy knob, not a correctness requirement.
#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(50),
            max: Duration::from_millis(150),
        }
    }
}

impl Pacing {
    /// No delay at all; used by tests and offline replays.
    pub fn disabled() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    async fn pause(&self) {
        if self.max.is_zero() {
            return;
        }
        let (lo, hi) = (self.min.min(self.max), self.max.max(self.min));
        let millis = rand::thread_rng().gen_range(lo.as_millis()..=hi.as_millis());
        tokio::time::sleep(Duration::from_millis(millis as u64)).await;
    }
}

/// Walks one chat's messages through the Message Source and classifies them.
///
/// Source failures are absorbed here: an inaccessible chat contributes an
/// empty result and the crawl moves on. Only candidates with a known
/// participant count survive the final filter.
pub struct Scanner {
    source: Arc<dyn MessageSource>,
    classifier: Classifier,
    pacing: Pacing,
}

impl Scanner {
    pub fn new(source: Arc<dyn MessageSource>, classifier: Classifier, pacing: Pacing) -> Self {
        Self {
            source,
            classifier,
            pacing,
        }
    }

    pub async fn scan(&self, log: &RunLog, seed: ChatId, window: ScanWindow) -> Vec<Discovery> {
        log.debug("scan", &format!("collecting chats from {seed}"));

        let mut iter = match self.source.iter_messages(seed, window).await {
            Ok(iter) => iter,
            Err(SourceError::AccessDenied | SourceError::NotFound) => {
                log.debug("scan", &format!("chat {seed} is not accessible, skipped"));
                debug!(%seed, "chat not accessible");
                return Vec::new();
            }
            Err(err) => {
                log.warn("scan", &format!("chat {seed} failed to open: {err}"));
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        loop {
            match iter.next().await {
                Ok(Some(message)) => {
                    self.pacing.pause().await;
                    found.extend(self.classifier.classify(seed, &message).await);
                }
                Ok(None) => break,
                Err(err) => {
                    // Abandon the seed entirely; a half-scanned chat would
                    // skew the graph more than a missing one.
                    log.warn("scan", &format!("chat {seed} aborted mid-scan: {err}"));
                    debug!(%seed, %err, "scan aborted");
                    return Vec::new();
                }
            }
        }

        found.retain(|d| d.size.is_some());
        found
    }
}
