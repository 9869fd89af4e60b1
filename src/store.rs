//! Persistence for the two storage slots: the user collection and the
//! current-session snapshot.
//!
//! Both slots are whole-value reads and writes; there is no partial update.
//! A missing or unparsable slot always reads as empty rather than failing,
//! so a corrupted file costs the data but never blocks startup. The next
//! save simply overwrites it.

use crate::user::User;
use anyhow::Result;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// File name of the user collection slot
pub const USERS_SLOT: &str = "users.json";
/// File name of the session slot
pub const SESSION_SLOT: &str = "currentUser.json";

/// Storage backend for the two slots.
///
/// Injected into the repository so tests can swap in `MemoryStore`.
pub trait Storage {
    fn load_users(&self) -> Vec<User>;
    fn save_users(&self, users: &[User]) -> Result<()>;
    fn load_session(&self) -> Option<User>;
    fn save_session(&self, user: &User) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}

/// JSON files in a data directory
pub struct FileStore {
    dir: PathBuf,
    debug: bool,
}

impl FileStore {
    pub fn new(dir: &Path, debug: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            debug,
        }
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(slot)
    }

    /// Read and parse a slot, defaulting to `None` when the file is
    /// missing or the content does not parse.
    fn read_slot<T: serde::de::DeserializeOwned>(&self, slot: &str) -> Option<T> {
        let path = self.slot_path(slot);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                if self.debug {
                    eprintln!("[DEBUG] Malformed slot {}: {}", path.display(), e);
                }
                None
            }
        }
    }

    fn write_slot<T: serde::Serialize>(&self, slot: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(self.slot_path(slot), content)?;
        Ok(())
    }
}

impl Storage for FileStore {
    fn load_users(&self) -> Vec<User> {
        self.read_slot(USERS_SLOT).unwrap_or_default()
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.write_slot(USERS_SLOT, &users)
    }

    fn load_session(&self) -> Option<User> {
        self.read_slot(SESSION_SLOT)
    }

    fn save_session(&self, user: &User) -> Result<()> {
        self.write_slot(SESSION_SLOT, user)
    }

    fn clear_session(&self) -> Result<()> {
        let path = self.slot_path(SESSION_SLOT);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory fake for tests
#[derive(Default)]
pub struct MemoryStore {
    users: RefCell<Vec<User>>,
    session: RefCell<Option<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn load_users(&self) -> Vec<User> {
        self.users.borrow().clone()
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        *self.users.borrow_mut() = users.to_vec();
        Ok(())
    }

    fn load_session(&self) -> Option<User> {
        self.session.borrow().clone()
    }

    fn save_session(&self, user: &User) -> Result<()> {
        *self.session.borrow_mut() = Some(user.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        *self.session.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{Role, User};

    fn sample_users() -> Vec<User> {
        vec![
            User::new("alice", "pw1", Role::User),
            User::new("bob", "pw2", Role::Admin),
        ]
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        let users = sample_users();
        store.save_users(&users).unwrap();
        assert_eq!(store.load_users(), users);
    }

    #[test]
    fn test_missing_slot_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);
        assert!(store.load_users().is_empty());
        assert!(store.load_session().is_none());
    }

    #[test]
    fn test_malformed_slot_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(USERS_SLOT), "{not json").unwrap();
        let store = FileStore::new(dir.path(), false);
        assert!(store.load_users().is_empty());

        // The next save replaces the corrupted slot.
        let users = sample_users();
        store.save_users(&users).unwrap();
        assert_eq!(store.load_users(), users);
    }

    #[test]
    fn test_session_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        let user = User::new("alice", "pw1", Role::User);
        store.save_session(&user).unwrap();
        assert_eq!(store.load_session(), Some(user));

        store.clear_session().unwrap();
        assert!(store.load_session().is_none());
        // Clearing an already-clear session is fine.
        store.clear_session().unwrap();
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let users = sample_users();
        store.save_users(&users).unwrap();
        assert_eq!(store.load_users(), users);

        store.save_session(&users[0]).unwrap();
        assert_eq!(store.load_session(), Some(users[0].clone()));
        store.clear_session().unwrap();
        assert!(store.load_session().is_none());
    }
}
