//! Search response fencing.
//!
//! The search box fires a request per debounced keystroke, and responses can
//! arrive out of order. Every search is issued a sequence number within its
//! scope (session + provider); when the upstream call settles, only the
//! latest sequence in that scope is delivered.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use sha2::{Digest, Sha256};

use seeklit_core::MetadataProvider;

/// Scopes idle for this long are forgotten.
const SCOPE_IDLE_TTL: Duration = Duration::from_secs(600);
const MAX_SCOPES: u64 = 10_000;

/// Tracks the latest search per scope.
#[derive(Clone)]
pub struct SearchFence {
    latest: Cache<String, Arc<AtomicU64>>,
    counter: Arc<AtomicU64>,
}

impl Default for SearchFence {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchFence {
    #[must_use]
    pub fn new() -> Self {
        Self {
            latest: Cache::builder()
                .max_capacity(MAX_SCOPES)
                .time_to_idle(SCOPE_IDLE_TTL)
                .build(),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a new search and return its sequence number.
    pub async fn begin(&self, token: &str, provider: MetadataProvider) -> u64 {
        let slot = self
            .latest
            .get_with(scope_key(token, provider), async { Arc::new(AtomicU64::new(0)) })
            .await;
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        slot.fetch_max(seq, Ordering::AcqRel);
        seq
    }

    /// Whether `seq` is still the latest search in its scope.
    ///
    /// A scope that has been evicted has nothing newer, so it counts as current.
    pub async fn is_current(&self, token: &str, provider: MetadataProvider, seq: u64) -> bool {
        self.latest
            .get(&scope_key(token, provider))
            .await
            .is_none_or(|slot| slot.load(Ordering::Acquire) == seq)
    }
}

/// Scope key without keeping the raw token in memory.
fn scope_key(token: &str, provider: MetadataProvider) -> String {
    format!("{:x}:{}", Sha256::digest(token.as_bytes()), provider.path_segment())
}
