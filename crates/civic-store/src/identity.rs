//! Identity context: who is calling into the store.
//!
//! Credentials are not checked here. A sign-in resolves an email to a
//! directory user (creating one on first sight) and yields an `Actor`.

use crate::directory::UserDirectory;
use crate::error::StoreError;
use crate::seed::ADMIN_USERNAME;
use crate::user::{Role, User};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{info, warn};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// The calling identity, supplied by the host's session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

impl Actor {
    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: Role::User,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Local part of an email address, used as the username.
pub fn username_from_email(email: &str) -> Option<&str> {
    let email = email.trim();
    if !EMAIL_RE.is_match(email) {
        return None;
    }
    email.split_once('@').map(|(local, _)| local)
}

/// Resolve a sign-in email to an actor.
///
/// The configured admin email always maps to the `admin` account. Any
/// other address becomes (or finds) a plain user keyed by its local part;
/// an address whose local part names an admin account is refused.
/// Banned users are refused.
pub fn sign_in(
    directory: &mut UserDirectory,
    email: &str,
    admin_email: &str,
) -> Result<Actor, StoreError> {
    let email = email.trim();
    let username = username_from_email(email)
        .ok_or_else(|| StoreError::InvalidInput(format!("invalid email address: {email:?}")))?;

    if email.eq_ignore_ascii_case(admin_email.trim()) {
        if directory
            .get(ADMIN_USERNAME)
            .is_none_or(|user| !user.is_admin())
        {
            directory.insert(User::admin(ADMIN_USERNAME, email));
        }
        info!(username = ADMIN_USERNAME, "admin signed in");
        return Ok(Actor::admin(ADMIN_USERNAME));
    }

    let user = directory.get_or_create(username, email);
    if user.is_admin() {
        warn!(username, email, "sign-in refused for admin account");
        return Err(StoreError::Forbidden {
            username: email.to_string(),
            action: "sign in as an administrator",
        });
    }
    if user.is_banned {
        return Err(StoreError::Banned(user.username.clone()));
    }
    info!(username, "user signed in");
    Ok(Actor::from(user))
}
