//! OAuth access token cache.
//!
//! Tokens are refreshed a minute before they expire. Concurrent callers
//! share one refresh, and a failed refresh keeps serving the old token
//! until it actually expires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh this long before the provider-reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Used when the provider's expiry cannot be converted.
const FALLBACK_TTL: Duration = Duration::from_secs(50 * 60);

/// Scope granting Firestore REST access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Time left until `expires_at`, zero if already past.
fn remaining_ttl(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    if expires_at <= now {
        return Duration::ZERO;
    }
    (expires_at - now).to_std().unwrap_or(FALLBACK_TTL)
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    deadline: Instant,
}

impl CachedToken {
    fn fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.deadline
    }

    fn alive(&self, now: Instant) -> bool {
        now < self.deadline
    }
}

/// Shared access-token cache over a `gcp_auth` provider.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            slot: RwLock::new(None),
        }
    }

    /// Drop the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    /// Return a token that is good for at least the refresh margin.
    pub async fn get_token(&self) -> FirestoreResult<String> {
        if let Some(token) = self.peek_fresh().await {
            return Ok(token);
        }

        let mut slot = self.slot.write().await;
        // Someone else may have refreshed while we waited for the lock.
        if let Some(cached) = slot.as_ref().filter(|c| c.fresh(Instant::now())) {
            return Ok(cached.value.clone());
        }

        match self.provider.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let ttl = remaining_ttl(token.expires_at(), Utc::now());
                let cached = CachedToken {
                    value: token.as_str().to_string(),
                    deadline: Instant::now() + ttl,
                };
                debug!(ttl_secs = ttl.as_secs(), "Refreshed Firestore access token");
                let value = cached.value.clone();
                *slot = Some(cached);
                Ok(value)
            }
            Err(e) => match slot.as_ref().filter(|c| c.alive(Instant::now())) {
                Some(cached) => {
                    warn!(error = %e, "Token refresh failed, reusing current token");
                    Ok(cached.value.clone())
                }
                None => Err(FirestoreError::auth_error(format!(
                    "Failed to obtain auth token: {e}"
                ))),
            },
        }
    }

    async fn peek_fresh(&self) -> Option<String> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|c| c.fresh(Instant::now()))
            .map(|c| c.value.clone())
    }
}
