// Local storage module using sled embedded database
// Holds the terminal equivalents of the browser's localStorage and cookie jar,
// plus the favorites mirror.

use anyhow::{Context, Result};
use cookie::time::OffsetDateTime;
use cookie::Cookie;
use sled::Db;
use std::path::PathBuf;

use crate::models::Exercise;

const LOCAL_STORAGE_TREE: &str = "local_storage";
const COOKIES_TREE: &str = "cookies";
const FAVORITES_TREE: &str = "favorites";
const FAVORITES_KEY: &str = "list";

/// Storage manager for local embedded database
#[derive(Clone)]
pub struct Storage {
    db: Db,
}

impl Storage {
    /// Get database directory path (~/.gym-cli/store)
    pub fn db_path() -> Result<PathBuf> {
        Ok(crate::config::Config::config_dir()?.join("store"))
    }

    /// Initialize storage with sled database
    pub fn init() -> Result<Self> {
        Self::init_with_path(Self::db_path()?)
    }

    /// Initialize storage with custom path
    pub fn init_with_path(path: PathBuf) -> Result<Self> {
        tracing::debug!("Opening sled database at {:?}", path);

        let db = sled::open(path).context("Failed to open sled database")?;

        Ok(Self { db })
    }

    /// In-memory database removed on drop
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .context("Failed to open temporary sled database")?;

        Ok(Self { db })
    }

    // Local storage operations

    /// Read a local storage entry
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let tree = self
            .db
            .open_tree(LOCAL_STORAGE_TREE)
            .context("Failed to open local storage tree")?;

        match tree.get(key.as_bytes()).context("Failed to read local storage")? {
            Some(value) => {
                let value = String::from_utf8(value.to_vec())
                    .context("Local storage entry is not UTF-8")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Write a local storage entry
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let tree = self
            .db
            .open_tree(LOCAL_STORAGE_TREE)
            .context("Failed to open local storage tree")?;

        tree.insert(key.as_bytes(), value.as_bytes())
            .context("Failed to write local storage")?;

        self.db.flush().context("Failed to flush database")?;

        tracing::debug!("Stored local storage key {}", key);
        Ok(())
    }

    /// Remove a local storage entry
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let tree = self
            .db
            .open_tree(LOCAL_STORAGE_TREE)
            .context("Failed to open local storage tree")?;

        let removed = tree
            .remove(key.as_bytes())
            .context("Failed to remove local storage key")?
            .is_some();

        if removed {
            self.db.flush().context("Failed to flush database")?;
            tracing::debug!("Removed local storage key {}", key);
        }

        Ok(removed)
    }

    /// Remove every local storage entry
    pub fn clear_local(&self) -> Result<()> {
        let tree = self
            .db
            .open_tree(LOCAL_STORAGE_TREE)
            .context("Failed to open local storage tree")?;

        tree.clear().context("Failed to clear local storage")?;
        self.db.flush().context("Failed to flush database")?;

        Ok(())
    }

    // Cookie operations

    /// Store a cookie, replacing any cookie with the same name
    pub fn set_cookie(&self, cookie: &Cookie<'_>) -> Result<()> {
        let tree = self
            .db
            .open_tree(COOKIES_TREE)
            .context("Failed to open cookies tree")?;

        tree.insert(cookie.name().as_bytes(), cookie.to_string().as_bytes())
            .context("Failed to store cookie")?;

        self.db.flush().context("Failed to flush database")?;

        tracing::debug!("Stored cookie {}", cookie.name());
        Ok(())
    }

    /// Read a cookie; expired cookies are dropped and read as absent
    pub fn get_cookie(&self, name: &str) -> Result<Option<Cookie<'static>>> {
        let tree = self
            .db
            .open_tree(COOKIES_TREE)
            .context("Failed to open cookies tree")?;

        let Some(value) = tree.get(name.as_bytes()).context("Failed to read cookie")? else {
            return Ok(None);
        };

        let raw = String::from_utf8(value.to_vec()).context("Cookie is not UTF-8")?;
        let cookie = match Cookie::parse(raw) {
            Ok(cookie) => cookie,
            Err(e) => {
                tracing::warn!("Dropping unparsable cookie {}: {}", name, e);
                self.remove_cookie(name)?;
                return Ok(None);
            }
        };

        if let Some(expires) = cookie.expires_datetime() {
            if expires <= OffsetDateTime::now_utc() {
                tracing::debug!("Cookie {} expired", name);
                self.remove_cookie(name)?;
                return Ok(None);
            }
        }

        Ok(Some(cookie))
    }

    /// Remove a cookie
    pub fn remove_cookie(&self, name: &str) -> Result<bool> {
        let tree = self
            .db
            .open_tree(COOKIES_TREE)
            .context("Failed to open cookies tree")?;

        let removed = tree
            .remove(name.as_bytes())
            .context("Failed to remove cookie")?
            .is_some();

        if removed {
            self.db.flush().context("Failed to flush database")?;
            tracing::debug!("Removed cookie {}", name);
        }

        Ok(removed)
    }

    /// Names of all stored cookies
    pub fn cookie_names(&self) -> Result<Vec<String>> {
        let tree = self
            .db
            .open_tree(COOKIES_TREE)
            .context("Failed to open cookies tree")?;

        let mut names = Vec::new();
        for item in tree.iter() {
            let (key, _value) = item.context("Failed to iterate cookies")?;
            names.push(String::from_utf8_lossy(&key).into_owned());
        }

        Ok(names)
    }

    // Favorites operations

    /// Load the favorites list in insertion order
    pub fn load_favorites(&self) -> Result<Vec<Exercise>> {
        let tree = self
            .db
            .open_tree(FAVORITES_TREE)
            .context("Failed to open favorites tree")?;

        match tree.get(FAVORITES_KEY).context("Failed to read favorites")? {
            Some(value) => {
                bincode::deserialize(&value).context("Failed to deserialize favorites")
            }
            None => Ok(Vec::new()),
        }
    }

    /// Replace the stored favorites list
    pub fn save_favorites(&self, favorites: &[Exercise]) -> Result<()> {
        let tree = self
            .db
            .open_tree(FAVORITES_TREE)
            .context("Failed to open favorites tree")?;

        let value = bincode::serialize(favorites).context("Failed to serialize favorites")?;
        tree.insert(FAVORITES_KEY, value)
            .context("Failed to store favorites")?;

        self.db.flush().context("Failed to flush database")?;

        tracing::debug!("Saved {} favorites", favorites.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookie::time::Duration;

    fn create_test_storage() -> Result<Storage> {
        Storage::temporary()
    }

    #[test]
    fn test_storage_init() {
        let storage = create_test_storage();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_local_storage_roundtrip() -> Result<()> {
        let storage = create_test_storage()?;

        assert_eq!(storage.get_item("auth")?, None);

        storage.set_item("auth", r#"{"token":"abc"}"#)?;
        assert_eq!(storage.get_item("auth")?.as_deref(), Some(r#"{"token":"abc"}"#));

        assert!(storage.remove_item("auth")?);
        assert!(!storage.remove_item("auth")?);
        assert_eq!(storage.get_item("auth")?, None);

        Ok(())
    }

    #[test]
    fn test_clear_local() -> Result<()> {
        let storage = create_test_storage()?;
        storage.set_item("auth", "{}")?;
        storage.set_item("adminData", "{}")?;

        storage.clear_local()?;

        assert_eq!(storage.get_item("auth")?, None);
        assert_eq!(storage.get_item("adminData")?, None);
        Ok(())
    }

    #[test]
    fn test_cookie_roundtrip() -> Result<()> {
        let storage = create_test_storage()?;

        let cookie = Cookie::build(("auth_token", "tok-1"))
            .path("/")
            .expires(OffsetDateTime::now_utc() + Duration::days(7))
            .build();
        storage.set_cookie(&cookie)?;

        let stored = storage.get_cookie("auth_token")?.expect("cookie stored");
        assert_eq!(stored.value(), "tok-1");
        assert_eq!(stored.path(), Some("/"));
        assert_eq!(storage.cookie_names()?, vec!["auth_token".to_string()]);

        Ok(())
    }

    #[test]
    fn test_expired_cookie_reads_as_absent() -> Result<()> {
        let storage = create_test_storage()?;

        let cookie = Cookie::build(("auth_token", "old"))
            .expires(OffsetDateTime::now_utc() - Duration::hours(1))
            .build();
        storage.set_cookie(&cookie)?;

        assert!(storage.get_cookie("auth_token")?.is_none());
        assert!(storage.cookie_names()?.is_empty());

        Ok(())
    }

    #[test]
    fn test_favorites_keep_order() -> Result<()> {
        let storage = create_test_storage()?;
        assert!(storage.load_favorites()?.is_empty());

        let favorites = vec![Exercise::from_slug("squat"), Exercise::from_slug("push-up")];
        storage.save_favorites(&favorites)?;

        let loaded = storage.load_favorites()?;
        assert_eq!(loaded, favorites);

        Ok(())
    }
}
