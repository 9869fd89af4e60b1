//! Record-level operations over the user collection.
//!
//! The underlying store only knows whole-collection reads and writes, so
//! every mutation here is a read-modify-write of the full collection.
//! Within one process that is safe (single-threaded, synchronous); across
//! processes the last writer wins, same as the original storage layout.

use crate::store::Storage;
use crate::user::{default_users, Role, User};
use anyhow::Result;

/// Fields an edit may overwrite. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Repository over an injected storage backend
pub struct UserRepo<S: Storage> {
    storage: S,
}

impl<S: Storage> UserRepo<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Seed the default accounts into an empty store.
    ///
    /// A no-op whenever the store already holds at least one record, so
    /// calling this on every submit is safe.
    pub fn seed_defaults(&self) -> Result<()> {
        if self.storage.load_users().is_empty() {
            self.storage.save_users(&default_users())?;
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<User> {
        self.storage.load_users()
    }

    pub fn find(&self, id: i64) -> Option<User> {
        self.storage.load_users().into_iter().find(|u| u.id == id)
    }

    pub fn username_taken(&self, username: &str) -> bool {
        // Case-sensitive, exact match.
        self.storage
            .load_users()
            .iter()
            .any(|u| u.username == username)
    }

    pub fn find_credentials(&self, username: &str, password: &str) -> Option<User> {
        self.storage
            .load_users()
            .into_iter()
            .find(|u| u.username == username && u.password == password)
    }

    /// Append a new record with a fresh creation-instant id.
    ///
    /// No uniqueness check on this path; only registration checks for
    /// conflicts, matching the original behavior.
    pub fn create(&self, username: &str, password: &str, role: Role) -> Result<User> {
        let user = User::new(username, password, role);
        let mut users = self.storage.load_users();
        users.push(user.clone());
        self.storage.save_users(&users)?;
        Ok(user)
    }

    /// Shallow-overwrite the given fields of an existing record.
    ///
    /// Returns the updated record, or `None` when no record has that id.
    pub fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>> {
        let mut users = self.storage.load_users();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(password) = &patch.password {
            user.password = password.clone();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        let updated = user.clone();
        self.storage.save_users(&users)?;
        Ok(Some(updated))
    }

    /// Remove a record by id. Returns whether anything was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let mut users = self.storage.load_users();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }
        self.storage.save_users(&users)?;
        Ok(true)
    }

    /// Session snapshot persisted at login, consulted at startup
    pub fn current_user(&self) -> Option<User> {
        self.storage.load_session()
    }

    pub fn set_current_user(&self, user: &User) -> Result<()> {
        self.storage.save_session(user)
    }

    pub fn clear_current_user(&self) -> Result<()> {
        self.storage.clear_session()
    }
}
