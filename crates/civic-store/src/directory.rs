//! User directory: lookup-or-create and ban state.

use crate::user::User;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Known users keyed by username, listed in first-seen order.
///
/// Users are never removed. Ban state is recorded here but not enforced;
/// enforcement belongs to whoever calls into the store.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: BTreeMap<String, User>,
    order: Vec<String>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn list_all(&self) -> Vec<&User> {
        self.order
            .iter()
            .filter_map(|username| self.users.get(username))
            .collect()
    }

    /// Insert or replace a user record.
    ///
    /// Returns the previous record if the username was already known.
    pub fn insert(&mut self, user: User) -> Option<User> {
        let username = user.username.clone();
        let previous = self.users.insert(username.clone(), user);
        if previous.is_none() {
            self.order.push(username);
        }
        previous
    }

    /// Return the existing user or create a plain, unbanned one.
    ///
    /// An existing record is returned untouched, even if `email` differs.
    pub fn get_or_create(&mut self, username: &str, email: &str) -> &User {
        if !self.users.contains_key(username) {
            info!(username, "user created");
            self.order.push(username.to_string());
            self.users
                .insert(username.to_string(), User::new(username, email));
        }
        &self.users[username]
    }

    /// Mark a user banned. Unknown usernames are ignored.
    ///
    /// Returns whether the user exists.
    pub fn ban(&mut self, username: &str) -> bool {
        self.set_banned(username, true)
    }

    /// Clear a user's ban. Unknown usernames are ignored.
    pub fn unban(&mut self, username: &str) -> bool {
        self.set_banned(username, false)
    }

    fn set_banned(&mut self, username: &str, banned: bool) -> bool {
        let Some(user) = self.users.get_mut(username) else {
            debug!(username, banned, "ban change skipped: unknown user");
            return false;
        };
        if user.is_banned != banned {
            info!(username, banned, "user ban state changed");
        }
        user.is_banned = banned;
        true
    }
}
