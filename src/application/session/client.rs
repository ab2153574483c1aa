//! Caller-side cached identity
//!
//! A client keeps the last token and user around so it does not have to
//! sign in for every action. The cache is untrusted: it only becomes usable
//! after `restore` has reconciled it against the server, and `invalidate`
//! is the one place it is ever discarded.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::identity::AccessService;
use crate::domain::{AccessResult, User};

/// Server operations the cached identity reconciles against.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn check(&self, token: &str) -> AccessResult<User>;
    async fn logout(&self, token: &str) -> AccessResult<()>;
}

#[async_trait]
impl SessionGateway for AccessService {
    async fn check(&self, token: &str) -> AccessResult<User> {
        AccessService::check(self, token).await.map(|v| v.user)
    }

    async fn logout(&self, token: &str) -> AccessResult<()> {
        AccessService::logout(self, token);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedSession {
    token: String,
    user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum CacheState {
    #[default]
    Empty,
    /// Loaded from local storage; not yet confirmed by the server
    Unverified(CachedSession),
    Verified(CachedSession),
}

#[derive(Debug, Default)]
pub struct CachedIdentity {
    state: CacheState,
}

impl CachedIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from local storage at process start. Unusable until `restore`.
    pub fn from_saved(token: String, user: User) -> Self {
        Self {
            state: CacheState::Unverified(CachedSession { token, user }),
        }
    }

    /// Remember a session the server has just issued.
    pub fn signed_in(&mut self, token: String, user: User) {
        self.state = CacheState::Verified(CachedSession { token, user });
    }

    /// Confirmed user, if any.
    pub fn current(&self) -> Option<&User> {
        match &self.state {
            CacheState::Verified(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            CacheState::Verified(session) => Some(&session.token),
            _ => None,
        }
    }

    /// Reconcile the cache with the server. On success the cached user is
    /// replaced by the server's current record; on any failure the cache is
    /// discarded.
    pub async fn restore(&mut self, gateway: &dyn SessionGateway) -> Option<&User> {
        let token = match &self.state {
            CacheState::Empty => return None,
            CacheState::Unverified(s) | CacheState::Verified(s) => s.token.clone(),
        };

        match gateway.check(&token).await {
            Ok(user) => {
                self.state = CacheState::Verified(CachedSession { token, user });
                self.current()
            }
            Err(e) => {
                debug!(reason = e.kind(), "Cached session rejected by server");
                self.invalidate();
                None
            }
        }
    }

    /// Ask the server to end the session, then clear locally regardless
    /// of whether the server call succeeded.
    pub async fn logout(&mut self, gateway: &dyn SessionGateway) {
        let token = match &self.state {
            CacheState::Empty => None,
            CacheState::Unverified(s) | CacheState::Verified(s) => Some(s.token.clone()),
        };
        if let Some(token) = token {
            if let Err(e) = gateway.logout(&token).await {
                warn!(error = %e, "Server-side logout failed; clearing local session anyway");
            }
        }
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.state = CacheState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use crate::domain::{AccessError, UserRole};

    struct UnreachableServer;

    #[async_trait]
    impl SessionGateway for UnreachableServer {
        async fn check(&self, _token: &str) -> AccessResult<User> {
            Err(AccessError::Storage("connection refused".into()))
        }

        async fn logout(&self, _token: &str) -> AccessResult<()> {
            Err(AccessError::Storage("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn saved_identity_is_untrusted_until_restored() {
        let fx = Fixture::new().await;
        fx.staff("ops@x.com", "secret1", UserRole::Manager).await;
        let auth = fx.access.login("ops@x.com", "secret1").await.unwrap();

        let mut cache = CachedIdentity::from_saved(auth.session.token.clone(), auth.user.clone());
        assert!(cache.current().is_none());

        let restored = cache.restore(&*fx.access).await.cloned();
        assert_eq!(restored.map(|u| u.id), Some(auth.user.id));
        assert_eq!(cache.token(), Some(auth.session.token.as_str()));
    }

    #[tokio::test]
    async fn restore_discards_cache_after_deactivation() {
        let fx = Fixture::new().await;
        let user = fx.staff("ops@x.com", "secret1", UserRole::Manager).await;
        let auth = fx.access.login("ops@x.com", "secret1").await.unwrap();

        let mut cache = CachedIdentity::new();
        cache.signed_in(auth.session.token, auth.user);
        assert!(cache.current().is_some());

        fx.deactivate_directly(&user.id).await;
        assert!(cache.restore(&*fx.access).await.is_none());
        assert!(cache.current().is_none());
        assert!(cache.token().is_none());
    }

    #[tokio::test]
    async fn logout_clears_locally_even_when_server_fails() {
        let fx = Fixture::new().await;
        let user = fx.staff("ops@x.com", "secret1", UserRole::Manager).await;

        let mut cache = CachedIdentity::new();
        cache.signed_in("token".into(), user);
        cache.logout(&UnreachableServer).await;
        assert!(cache.current().is_none());
    }

    #[tokio::test]
    async fn logout_ends_the_server_session() {
        let fx = Fixture::new().await;
        fx.staff("ops@x.com", "secret1", UserRole::Manager).await;
        let auth = fx.access.login("ops@x.com", "secret1").await.unwrap();
        let token = auth.session.token.clone();

        let mut cache = CachedIdentity::new();
        cache.signed_in(auth.session.token, auth.user);
        cache.logout(&*fx.access).await;

        assert!(cache.current().is_none());
        assert!(fx.access.check(&token).await.is_err());
    }
}
