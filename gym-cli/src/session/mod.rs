use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

use crate::config::SessionConfig;
use crate::models::User;
use crate::storage::Storage;

/// Local storage key holding `{user, token, timestamp}`
pub const AUTH_KEY: &str = "auth";
/// Local storage key holding the admin snapshot
pub const ADMIN_DATA_KEY: &str = "adminData";
/// Cookie carrying the bearer token
pub const AUTH_COOKIE: &str = "auth_token";
/// Every cookie name a backend session may have left behind
pub const AUTH_COOKIE_NAMES: [&str; 7] = [
    "auth_token",
    "token",
    "jwt",
    "session",
    "session_id",
    "connect.sid",
    "remember_token",
];

/// The client's record of the logged-in user and their token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: String,
}

impl Session {
    pub fn new(user: Option<User>, token: impl Into<String>) -> Self {
        Self {
            user: user.map(User::normalized),
            token: token.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::has_admin_role)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAuth {
    user: Option<User>,
    token: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminData {
    admin: User,
    token: String,
    is_admin: bool,
    timestamp: DateTime<Utc>,
}

/// Session state held in memory and mirrored to local storage and a cookie
pub struct SessionStore {
    storage: Storage,
    current: RwLock<Session>,
    cookie_max_age: Duration,
    cookie_secure: bool,
}

impl SessionStore {
    pub fn new(storage: Storage, config: &SessionConfig) -> Self {
        Self {
            storage,
            current: RwLock::new(Session::default()),
            cookie_max_age: Duration::days(config.cookie_max_age_days),
            cookie_secure: config.cookie_secure,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Snapshot of the in-memory session
    pub fn current(&self) -> Session {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, session: Session) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Read the persisted session back into memory.
    ///
    /// Admin data wins over regular auth data; a bare cookie yields a session
    /// whose user is not yet known. Corrupt entries are removed.
    pub fn restore(&self) -> Result<Session> {
        let session = match self.read_admin_data()? {
            Some(session) => session,
            None => match self.read_stored_auth()? {
                Some(session) => session,
                None => self
                    .cookie_token()?
                    .map(|token| Session::new(None, token))
                    .unwrap_or_default(),
            },
        };

        tracing::debug!(
            authenticated = session.is_authenticated(),
            admin = session.is_admin(),
            "Restored session"
        );

        self.replace(session.clone());
        Ok(session)
    }

    fn read_admin_data(&self) -> Result<Option<Session>> {
        let Some(raw) = self.storage.get_item(ADMIN_DATA_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<AdminData>(&raw) {
            Ok(data) if !data.token.is_empty() => {
                let mut admin = data.admin;
                admin.is_admin = true;
                Ok(Some(Session::new(Some(admin), data.token)))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Removing corrupt admin data: {}", e);
                self.storage.remove_item(ADMIN_DATA_KEY)?;
                Ok(None)
            }
        }
    }

    fn read_stored_auth(&self) -> Result<Option<Session>> {
        let Some(raw) = self.storage.get_item(AUTH_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredAuth>(&raw) {
            Ok(StoredAuth {
                user: Some(user),
                token,
                ..
            }) if !token.is_empty() => Ok(Some(Session::new(Some(user), token))),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Removing corrupt auth data: {}", e);
                self.storage.remove_item(AUTH_KEY)?;
                Ok(None)
            }
        }
    }

    /// Token from the `auth_token` cookie, if present and not expired
    pub fn cookie_token(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get_cookie(AUTH_COOKIE)?
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty()))
    }

    /// Token from local storage (`auth`, then `adminData`)
    pub fn local_token(&self) -> Result<Option<String>> {
        if let Some(session) = self.read_stored_auth()? {
            return Ok(Some(session.token));
        }
        Ok(self.read_admin_data()?.map(|session| session.token))
    }

    /// Token to attach to outgoing requests: cookie, local storage, then memory
    pub fn token(&self) -> Result<Option<String>> {
        if let Some(token) = self.cookie_token()? {
            return Ok(Some(token));
        }
        if let Some(token) = self.local_token()? {
            return Ok(Some(token));
        }

        let current = self.current();
        Ok(current.is_authenticated().then_some(current.token))
    }

    /// Write the `auth_token` cookie with the configured lifetime
    pub fn issue_cookie(&self, token: &str) -> Result<()> {
        let cookie = Cookie::build((AUTH_COOKIE, token.to_string()))
            .path("/")
            .expires(OffsetDateTime::now_utc() + self.cookie_max_age)
            .secure(self.cookie_secure)
            .same_site(SameSite::Strict)
            .build();

        self.storage.set_cookie(&cookie)
    }

    /// Replace the session. With `persist`, the session is also written to
    /// local storage and the cookie; admins get an `adminData` entry too.
    /// A session without a token clears everything.
    pub fn set_auth(&self, session: Session, persist: bool) -> Result<()> {
        if !session.is_authenticated() {
            return self.clear();
        }

        let session = Session::new(session.user, session.token);
        self.replace(session.clone());

        if persist {
            let now = Utc::now();
            let stored = StoredAuth {
                user: session.user.clone(),
                token: session.token.clone(),
                timestamp: now,
            };
            let raw = serde_json::to_string(&stored).context("Failed to serialize auth data")?;
            self.storage.set_item(AUTH_KEY, &raw)?;
            self.issue_cookie(&session.token)?;

            match session.user.clone().filter(User::has_admin_role) {
                Some(admin) => self.store_admin_data(admin, &session.token)?,
                None => {
                    self.storage.remove_item(ADMIN_DATA_KEY)?;
                }
            }
        }

        Ok(())
    }

    /// Record the admin snapshot used to restore admin sessions
    pub fn store_admin_data(&self, admin: User, token: &str) -> Result<()> {
        let data = AdminData {
            admin: admin.normalized(),
            token: token.to_string(),
            is_admin: true,
            timestamp: Utc::now(),
        };
        let raw = serde_json::to_string(&data).context("Failed to serialize admin data")?;
        self.storage.set_item(ADMIN_DATA_KEY, &raw)
    }

    /// Wipe the session from memory, local storage and every auth cookie
    pub fn clear(&self) -> Result<()> {
        self.replace(Session::default());
        self.wipe_persisted()
    }

    /// Clear the session after the server rejected its token.
    ///
    /// Returns `true` only for the call that found a live session, so a burst
    /// of concurrent 401s reports the expiry once.
    pub fn expire(&self) -> Result<bool> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let live = current.is_authenticated()
            || self.cookie_token()?.is_some()
            || self.local_token()?.is_some();

        *current = Session::default();
        self.wipe_persisted()?;
        Ok(live)
    }

    fn wipe_persisted(&self) -> Result<()> {
        self.storage.remove_item(AUTH_KEY)?;
        self.storage.remove_item(ADMIN_DATA_KEY)?;
        for name in AUTH_COOKIE_NAMES {
            self.storage.remove_cookie(name)?;
        }

        tracing::debug!("Cleared session state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Storage::temporary().unwrap(), &SessionConfig::default())
    }

    fn member() -> User {
        serde_json::from_str(r#"{"_id":"u1","name":"Asha","email":"asha@example.com","role":0}"#)
            .unwrap()
    }

    fn admin() -> User {
        serde_json::from_str(r#"{"_id":"a1","name":"Root","email":"root@example.com","role":1}"#)
            .unwrap()
    }

    #[test]
    fn test_persisted_session_restores() -> Result<()> {
        let store = store();
        store.set_auth(Session::new(Some(member()), "tok-1"), true)?;

        assert_eq!(store.cookie_token()?.as_deref(), Some("tok-1"));
        assert!(store.storage().get_item(AUTH_KEY)?.is_some());
        assert!(store.storage().get_item(ADMIN_DATA_KEY)?.is_none());

        store.replace(Session::default());
        let restored = store.restore()?;
        assert_eq!(restored.token, "tok-1");
        assert_eq!(restored.user.unwrap().name, "Asha");
        Ok(())
    }

    #[test]
    fn test_admin_persists_admin_data() -> Result<()> {
        let store = store();
        store.set_auth(Session::new(Some(admin()), "tok-a"), true)?;

        assert!(store.storage().get_item(ADMIN_DATA_KEY)?.is_some());
        let restored = store.restore()?;
        assert!(restored.is_admin());
        Ok(())
    }

    #[test]
    fn test_unpersisted_session_stays_in_memory() -> Result<()> {
        let store = store();
        store.set_auth(Session::new(Some(member()), "tok-mem"), false)?;

        assert!(store.storage().get_item(AUTH_KEY)?.is_none());
        assert!(store.cookie_token()?.is_none());
        assert_eq!(store.token()?.as_deref(), Some("tok-mem"));
        Ok(())
    }

    #[test]
    fn test_cookie_only_session_has_no_user() -> Result<()> {
        let store = store();
        store.issue_cookie("tok-c")?;

        let restored = store.restore()?;
        assert!(restored.is_authenticated());
        assert!(restored.user.is_none());
        Ok(())
    }

    #[test]
    fn test_corrupt_auth_is_removed() -> Result<()> {
        let store = store();
        store.storage().set_item(AUTH_KEY, "{not json")?;

        let restored = store.restore()?;
        assert!(!restored.is_authenticated());
        assert!(store.storage().get_item(AUTH_KEY)?.is_none());
        Ok(())
    }

    #[test]
    fn test_clear_wipes_everything() -> Result<()> {
        let store = store();
        store.set_auth(Session::new(Some(admin()), "tok-a"), true)?;
        store.storage().set_cookie(&Cookie::new("jwt", "legacy"))?;

        store.clear()?;

        assert!(store.storage().get_item(AUTH_KEY)?.is_none());
        assert!(store.storage().get_item(ADMIN_DATA_KEY)?.is_none());
        assert!(store.storage().cookie_names()?.is_empty());
        assert!(!store.current().is_authenticated());
        assert_eq!(store.token()?, None);
        Ok(())
    }

    #[test]
    fn test_member_login_replaces_admin_snapshot() -> Result<()> {
        let store = store();
        store.set_auth(Session::new(Some(admin()), "tok-a"), true)?;
        store.set_auth(Session::new(Some(member()), "tok-m"), true)?;

        assert!(store.storage().get_item(ADMIN_DATA_KEY)?.is_none());

        let reopened = SessionStore::new(store.storage().clone(), &SessionConfig::default());
        let restored = reopened.restore()?;
        assert_eq!(restored.token, "tok-m");
        assert_eq!(restored.user.as_ref().map(|u| u.name.as_str()), Some("Asha"));
        assert!(!restored.is_admin());
        assert_eq!(reopened.token()?.as_deref(), Some("tok-m"));
        Ok(())
    }

    #[test]
    fn test_expire_reports_once() -> Result<()> {
        let store = store();
        store.set_auth(Session::new(Some(admin()), "tok-a"), true)?;

        assert!(store.expire()?);
        assert!(!store.expire()?);
        assert!(store.storage().get_item(ADMIN_DATA_KEY)?.is_none());
        assert_eq!(store.token()?, None);
        Ok(())
    }

    #[test]
    fn test_empty_token_clears() -> Result<()> {
        let store = store();
        store.set_auth(Session::new(Some(member()), "tok-1"), true)?;
        store.set_auth(Session::default(), true)?;

        assert_eq!(store.token()?, None);
        Ok(())
    }
}
