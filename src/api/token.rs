// src/api/token.rs
//! Tenant access token caching with single-flight refresh.
//!
//! The provider issues short-lived application-level tokens. This cache
//! reuses a token until shortly before its real expiry and guards the
//! refresh with a single lock so concurrent workflows never trigger
//! duplicate issuance calls — a caller that arrives during a refresh
//! awaits the in-flight one and reuses its result.

use crate::constants::TOKEN_EXPIRY_SKEW;
use crate::error::AppError;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// The ability to obtain a fresh credential from the provider.
///
/// Implemented by [`FeishuClient`](super::FeishuClient); tests supply
/// scripted issuers.
#[async_trait::async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue(&self) -> Result<IssuedCredential, AppError>;
}

/// A freshly issued credential and its provider-reported lifetime.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub lifetime: Duration,
}

#[derive(Debug, Clone)]
struct Credential {
    token: String,
    expires_at: Instant,
}

impl Credential {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-wide cache for the tenant access token.
///
/// Invalid (empty) until the first successful issuance; mutated only by a
/// successful refresh. `expires_at` is always issuance time plus lifetime
/// minus the safety skew, so a refresh happens slightly before real expiry.
#[derive(Default)]
pub struct TokenCache {
    slot: Mutex<Option<Credential>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a valid access token, refreshing through `issuer` when the
    /// cached one is absent or expired.
    ///
    /// The slot lock is held across the issuance call: that is the
    /// single-flight guarantee. A second caller blocks on the lock and
    /// then observes the token the first caller just wrote.
    pub async fn token(&self, issuer: &dyn CredentialIssuer) -> Result<String, AppError> {
        let mut slot = self.slot.lock().await;

        if let Some(credential) = slot.as_ref() {
            if credential.is_fresh(Instant::now()) {
                log::debug!("Using cached access token");
                return Ok(credential.token.clone());
            }
            log::debug!("Cached access token expired, refreshing");
        }

        let issued = issuer.issue().await?;
        let effective_lifetime = issued.lifetime.saturating_sub(TOKEN_EXPIRY_SKEW);
        let credential = Credential {
            token: issued.token,
            expires_at: Instant::now() + effective_lifetime,
        };
        log::info!(
            "Access token refreshed (valid for {}s after skew)",
            effective_lifetime.as_secs()
        );

        let token = credential.token.clone();
        *slot = Some(credential);
        Ok(token)
    }

    /// Drops the cached credential so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingIssuer {
        calls: AtomicUsize,
        lifetime: Duration,
    }

    impl CountingIssuer {
        fn with_lifetime(lifetime: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                lifetime,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl CredentialIssuer for CountingIssuer {
        async fn issue(&self) -> Result<IssuedCredential, AppError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(IssuedCredential {
                token: format!("token-{}", n),
                lifetime: self.lifetime,
            })
        }
    }

    struct RejectingIssuer;

    #[async_trait::async_trait]
    impl CredentialIssuer for RejectingIssuer {
        async fn issue(&self) -> Result<IssuedCredential, AppError> {
            Err(AppError::Auth {
                code: 99991645,
                message: "app secret invalid".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn fresh_token_is_reused_without_reissuing() {
        let cache = TokenCache::new();
        let issuer = CountingIssuer::with_lifetime(Duration::from_secs(7200));

        let first = cache.token(&issuer).await.unwrap();
        let second = cache.token(&issuer).await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-1");
        assert_eq!(issuer.call_count(), 1);
    }

    #[tokio::test]
    async fn expired_token_triggers_refresh() {
        let cache = TokenCache::new();
        // Lifetime below the skew yields a zero effective lifetime, so the
        // cached token is already stale on the next lookup.
        let issuer = CountingIssuer::with_lifetime(Duration::from_secs(60));

        let first = cache.token(&issuer).await.unwrap();
        let second = cache.token(&issuer).await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-2");
        assert_eq!(issuer.call_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let cache = Arc::new(TokenCache::new());
        let issuer = Arc::new(CountingIssuer::with_lifetime(Duration::from_secs(7200)));

        let (a, b) = tokio::join!(
            cache.token(issuer.as_ref()),
            cache.token(issuer.as_ref()),
        );

        assert_eq!(a.unwrap(), "token-1");
        assert_eq!(b.unwrap(), "token-1");
        assert_eq!(issuer.call_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_reissue() {
        let cache = TokenCache::new();
        let issuer = CountingIssuer::with_lifetime(Duration::from_secs(7200));

        let first = cache.token(&issuer).await.unwrap();
        cache.invalidate().await;
        let second = cache.token(&issuer).await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-2");
    }

    #[tokio::test]
    async fn issuance_rejection_propagates_and_caches_nothing() {
        let cache = TokenCache::new();

        let err = cache.token(&RejectingIssuer).await.unwrap_err();
        assert!(matches!(err, AppError::Auth { code: 99991645, .. }));

        // A later call against a working issuer starts clean.
        let issuer = CountingIssuer::with_lifetime(Duration::from_secs(7200));
        assert_eq!(cache.token(&issuer).await.unwrap(), "token-1");
    }
}
