//! Login and registration against the user store.
//!
//! Both operations validate first, then lazily seed the default accounts,
//! then take the login or register branch. Error messages are the exact
//! strings shown to the user in the form.

use crate::repo::UserRepo;
use crate::store::Storage;
use crate::user::{Role, User};
use anyhow::Result;

/// A failed login or registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password left empty
    MissingFields,
    /// No record matches the credential pair
    InvalidCredentials,
    /// Registration with a username already in the store
    UsernameTaken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            AuthError::MissingFields => "Please fill in all fields",
            AuthError::InvalidCredentials => "Invalid username or password",
            AuthError::UsernameTaken => "Username already exists",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for AuthError {}

/// Outcome of a submit: either the authenticated user or a form error
pub type AuthResult = std::result::Result<User, AuthError>;

fn validate(username: &str, password: &str) -> std::result::Result<(), AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    Ok(())
}

/// Authenticate against the store with an exact, case-sensitive match.
///
/// Seeds the default accounts first if the store is empty. On success the
/// matched record is returned; establishing the session is the caller's
/// job.
pub fn login<S: Storage>(repo: &UserRepo<S>, username: &str, password: &str) -> Result<AuthResult> {
    if let Err(e) = validate(username, password) {
        return Ok(Err(e));
    }
    repo.seed_defaults()?;
    match repo.find_credentials(username, password) {
        Some(user) => Ok(Ok(user)),
        None => Ok(Err(AuthError::InvalidCredentials)),
    }
}

/// Create a new account with the chosen role.
///
/// Rejects an already-taken username (exact, case-sensitive) without
/// touching the store; otherwise appends the new record and returns it.
pub fn register<S: Storage>(
    repo: &UserRepo<S>,
    username: &str,
    password: &str,
    role: Role,
) -> Result<AuthResult> {
    if let Err(e) = validate(username, password) {
        return Ok(Err(e));
    }
    repo.seed_defaults()?;
    if repo.username_taken(username) {
        return Ok(Err(AuthError::UsernameTaken));
    }
    let user = repo.create(username, password, role)?;
    Ok(Ok(user))
}
