//! Signed session cookies backed by a server-side session table.
//!
//! The `sessionid` cookie holds an HS256 token naming the worker and a
//! random session key. A token is only honoured while its key is still in
//! the [`SessionStore`], so signing out revokes it immediately.

use super::cookies;
use crate::worker::domain::WorkerId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionid";

const SESSION_KEY_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: WorkerId,
    sid: String,
    iat: i64,
    exp: i64,
}

/// HS256 keys derived from the configured secret.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    /// Derives signing keys from `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for `worker` in session `sid`.
    ///
    /// # Errors
    ///
    /// Returns the signing error.
    pub fn issue(
        &self,
        worker: WorkerId,
        sid: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: worker,
            sid: sid.to_owned(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    /// Returns the worker and session key of a valid, unexpired token.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<(WorkerId, String)> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .ok()
            .map(|data| (data.claims.sub, data.claims.sid))
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

/// Severity of a one-shot message shown as a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// Something worked.
    Success,
    /// Neutral information.
    Info,
    /// Something was refused.
    Error,
}

/// A message displayed once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    /// Severity.
    pub level: FlashLevel,
    /// Text.
    pub message: String,
}

#[derive(Debug)]
struct Session {
    worker: WorkerId,
    expires_at: DateTime<Utc>,
    flashes: Vec<Flash>,
}

/// Live sessions with their pending flash messages.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Creates an empty store whose sessions live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens a session for `worker` and returns its key. Expired sessions
    /// are purged on the way.
    pub fn open(&self, worker: WorkerId, now: DateTime<Utc>) -> String {
        let mut bytes = [0_u8; SESSION_KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let key = hex::encode(bytes);
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            key.clone(),
            Session {
                worker,
                expires_at: now + self.ttl,
                flashes: Vec::new(),
            },
        );
        key
    }

    /// Returns `true` when `key` names a live session of `worker`.
    pub fn resolve(&self, key: &str, worker: WorkerId, now: DateTime<Utc>) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(key) {
            Some(session) if session.expires_at <= now => {
                sessions.remove(key);
                false
            }
            Some(session) => session.worker == worker,
            None => false,
        }
    }

    /// Ends a session.
    pub fn close(&self, key: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Queues a flash message for the session's next page.
    pub fn flash(&self, key: &str, level: FlashLevel, message: impl Into<String>) {
        if let Some(session) = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(key)
        {
            session.flashes.push(Flash {
                level,
                message: message.into(),
            });
        }
    }

    /// Removes and returns the queued flash messages.
    pub fn take_flashes(&self, key: &str) -> Vec<Flash> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(key)
            .map(|session| std::mem::take(&mut session.flashes))
            .unwrap_or_default()
    }
}

/// `Set-Cookie` value carrying a session token.
#[must_use]
pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    cookies::build(SESSION_COOKIE, token, ttl.num_seconds(), true, secure)
}

/// `Set-Cookie` value that deletes the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    cookies::build(SESSION_COOKIE, "", 0, true, secure)
}

#[cfg(test)]
mod tests {
    use super::{FlashLevel, SessionKeys, SessionStore};
    use crate::worker::domain::WorkerId;
    use chrono::{Duration, Utc};
    use rstest::rstest;

    #[rstest]
    fn tokens_verify_only_with_the_signing_secret() {
        let worker = WorkerId::new();
        let keys = SessionKeys::new("first secret");
        let token = keys
            .issue(worker, "abc", Utc::now(), Duration::hours(1))
            .expect("token issued");

        assert_eq!(keys.verify(&token), Some((worker, "abc".to_owned())));
        assert_eq!(SessionKeys::new("other secret").verify(&token), None);
        assert_eq!(keys.verify("garbage"), None);
    }

    #[rstest]
    fn expired_tokens_are_rejected() {
        let keys = SessionKeys::new("secret");
        let long_ago = Utc::now() - Duration::days(30);
        let token = keys
            .issue(WorkerId::new(), "abc", long_ago, Duration::hours(1))
            .expect("token issued");
        assert_eq!(keys.verify(&token), None);
    }

    #[rstest]
    fn closed_and_expired_sessions_do_not_resolve() {
        let store = SessionStore::new(Duration::hours(1));
        let worker = WorkerId::new();
        let now = Utc::now();
        let key = store.open(worker, now);

        assert!(store.resolve(&key, worker, now));
        assert!(!store.resolve(&key, WorkerId::new(), now));
        assert!(!store.resolve(&key, worker, now + Duration::hours(2)));
        assert!(!store.resolve(&key, worker, now));

        let other = store.open(worker, now);
        store.close(&other);
        assert!(!store.resolve(&other, worker, now));
    }

    #[rstest]
    fn flashes_are_delivered_once() {
        let store = SessionStore::new(Duration::hours(1));
        let key = store.open(WorkerId::new(), Utc::now());
        store.flash(&key, FlashLevel::Success, "Task created successfully!");

        let flashes = store.take_flashes(&key);
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes.first().map(|f| f.level), Some(FlashLevel::Success));
        assert!(store.take_flashes(&key).is_empty());
    }
}
