//! Shared state for the router and middleware.

use std::sync::{Arc, Mutex};

use chrono::Duration;
use vitalis_core::services::{AuthService, DEFAULT_TOKEN_TTL_HOURS};
use vitalis_core::{Database, PasswordHasher, Principal, ServiceResult, TokenIssuer};

use crate::error::ApiError;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Database>>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
    token_ttl: Duration,
}

impl ApiContext {
    pub fn new(
        db: Database,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            hasher,
            issuer,
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Run one synchronous service call under the database lock.
    ///
    /// The guard is released before this returns, so it is never held
    /// across an `.await`.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> ServiceResult<T>,
    ) -> Result<T, ApiError> {
        let db = self
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))?;
        f(&*db).map_err(ApiError::from)
    }

    /// Run one call against an [`AuthService`] wired with this context's
    /// hasher, issuer and token lifetime.
    pub fn with_auth<T>(
        &self,
        f: impl FnOnce(AuthService<'_>) -> ServiceResult<T>,
    ) -> Result<T, ApiError> {
        self.with_db(|db| {
            let auth = AuthService::new(db, self.hasher.as_ref(), self.issuer.as_ref())
                .with_token_ttl(self.token_ttl);
            f(auth)
        })
    }

    /// Run CPU-heavy password work on the blocking pool, away from both the
    /// async workers and the database lock.
    pub async fn with_hasher<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn PasswordHasher) -> ServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || f(hasher.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(format!("password worker failed: {e}")))?
            .map_err(ApiError::from)
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after the bearer token has been resolved.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub principal: Principal,
    /// Raw bearer token, kept for logout
    pub token: String,
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration as StdDuration;

    use super::*;
    use vitalis_core::RandomTokenIssuer;

    /// Hasher that parks inside every call until released.
    struct Gated {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Gated {
        fn park(&self) {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release
                .lock()
                .unwrap()
                .recv_timeout(StdDuration::from_secs(5))
                .unwrap();
        }
    }

    impl PasswordHasher for Gated {
        fn hash(&self, password: &str) -> String {
            self.park();
            format!("gated${password}")
        }

        fn verify(&self, password: &str, encoded: &str) -> bool {
            self.park();
            encoded == format!("gated${password}")
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn password_work_leaves_database_free() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let hasher = Gated {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let ctx = ApiContext::new(
            Database::open_in_memory().unwrap(),
            Arc::new(hasher),
            Arc::new(RandomTokenIssuer),
        );

        let pending = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                ctx.with_hasher(|h| Ok(h.verify("s3cret!", "gated$s3cret!")))
                    .await
            })
        };
        entered_rx.recv_timeout(StdDuration::from_secs(5)).unwrap();

        // the hash is mid-flight; other requests still reach the database
        assert!(ctx.db.try_lock().is_ok());
        let users = ctx.with_db(|db| Ok(db.user_email_exists("ana@vitalis.com")?)).unwrap();
        assert!(!users);

        release_tx.send(()).unwrap();
        assert!(pending.await.unwrap().unwrap());
    }
}
