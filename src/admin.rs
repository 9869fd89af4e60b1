//! Pure projections and guards for the admin dashboard.
//!
//! Nothing here touches storage; the dashboard applies these over the
//! collection it loaded and persists mutations through the repository.

use crate::user::{Role, User};

/// Attempting to delete the currently authenticated account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfDeletionError;

impl std::fmt::Display for SelfDeletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "You cannot delete your own account")
    }
}

impl std::error::Error for SelfDeletionError {}

/// Refuse deletion of the authenticated identity's own record.
pub fn check_delete(target_id: i64, current_id: i64) -> Result<(), SelfDeletionError> {
    if target_id == current_id {
        Err(SelfDeletionError)
    } else {
        Ok(())
    }
}

/// Case-insensitive substring filter over username OR role.
///
/// A pure projection: never persisted, recomputed per render.
pub fn filter_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let term = term.to_lowercase();
    users
        .iter()
        .filter(|u| {
            u.username.to_lowercase().contains(&term) || u.role.as_str().contains(&term)
        })
        .collect()
}

/// Header counts shown above the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCounts {
    pub total: usize,
    pub admins: usize,
    pub users: usize,
}

pub fn role_counts(users: &[User]) -> RoleCounts {
    RoleCounts {
        total: users.len(),
        admins: users.iter().filter(|u| u.role == Role::Admin).count(),
        users: users.iter().filter(|u| u.role == Role::User).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<User> {
        vec![
            User::new("admin", "admin123", Role::Admin),
            User::new("bob", "pw3", Role::User),
            User::new("Carol", "pw4", Role::User),
        ]
    }

    #[test]
    fn test_filter_matches_username_substring() {
        let users = sample();
        let hits = filter_users(&users, "adm");
        // Matching both username and role still yields the record once.
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "admin");
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let users = sample();
        let hits = filter_users(&users, "CAROL");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "Carol");
    }

    #[test]
    fn test_filter_matches_role() {
        let users = sample();
        let hits = filter_users(&users, "user");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|u| u.role == Role::User));
    }

    #[test]
    fn test_empty_term_matches_everything() {
        let users = sample();
        assert_eq!(filter_users(&users, "").len(), users.len());
    }

    #[test]
    fn test_role_counts() {
        let counts = role_counts(&sample());
        assert_eq!(
            counts,
            RoleCounts {
                total: 3,
                admins: 1,
                users: 2
            }
        );
    }

    #[test]
    fn test_self_deletion_guard() {
        assert_eq!(check_delete(1, 1), Err(SelfDeletionError));
        assert!(check_delete(2, 1).is_ok());
        assert_eq!(
            SelfDeletionError.to_string(),
            "You cannot delete your own account"
        );
    }
}
