//! User accounts and the denormalized friendship adjacency.
//!
//! A friendship is not a first-class record: it is two one-directional
//! list memberships (`A.friends` names `B` and `B.friends` names `A`).
//! The write path keeps both sides in one save; the login path repairs
//! records that predate that invariant or were left half-written.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::document::DocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::UserId;

/// Profile image reported for a friend who never uploaded one.
pub const DEFAULT_PROFILE_IMAGE: &str = "/images/default.png";
/// Presence reported for a friend without a stored status.
pub const DEFAULT_STATUS: &str = "online";

/// One account in `users.json`.
///
/// Passwords are stored and compared verbatim; friend lists are ordered
/// and deduplication is not enforced on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub friends: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Friend-list entry with display defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendView {
    pub username: String,
    pub profile_image: String,
    pub status: String,
}

/// CRUD over user records and the friendship adjacency they embed.
pub struct UserRegistry {
    store: DocumentStore<User>,
}

impl UserRegistry {
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Ok(Self {
            store: DocumentStore::open(path)?,
        })
    }

    /// Create a new account. The username must be unused; the match is
    /// case-sensitive and exact.
    pub fn signup(&self, username: &str, password: &str) -> StoreResult<User> {
        let mut users = self.store.load()?;
        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict(format!(
                "username {username:?} already exists"
            )));
        }

        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            password: password.to_string(),
            friends: Vec::new(),
            profile_image: None,
            status: None,
        };
        users.push(user.clone());
        self.store.save(&users)?;
        Ok(user)
    }

    /// Authenticate and run the login-time friendship repair.
    ///
    /// For every other user whose friend list names this user, the missing
    /// reverse entry is appended to the logging-in user's own list. The
    /// patch is one-directional (the other side is never rewritten) and
    /// idempotent; the collection is persisted only when at least one
    /// entry was appended.
    pub fn login(&self, username: &str, password: &str) -> StoreResult<User> {
        let mut users = self.store.load()?;
        let position = users
            .iter()
            .position(|u| u.username == username && u.password == password)
            .ok_or_else(|| StoreError::Auth("invalid username or password".to_string()))?;

        let missing: Vec<String> = users
            .iter()
            .filter(|other| {
                other.username != username
                    && other.friends.iter().any(|f| f == username)
                    && !users[position].friends.contains(&other.username)
            })
            .map(|other| other.username.clone())
            .collect();

        if !missing.is_empty() {
            for friend in &missing {
                info!(user = %username, %friend, "repaired one-way friendship");
            }
            users[position].friends.extend(missing);
            self.store.save(&users)?;
        }

        Ok(users[position].clone())
    }

    /// Record a friendship in both directions. Acceptance is immediate;
    /// there is no pending-request state.
    pub fn send_friend_request(&self, from_username: &str, to_username: &str) -> StoreResult<()> {
        let mut users = self.store.load()?;
        let from = users
            .iter()
            .position(|u| u.username == from_username)
            .ok_or_else(|| StoreError::NotFound(format!("user {from_username:?} not found")))?;
        let to = users
            .iter()
            .position(|u| u.username == to_username)
            .ok_or_else(|| StoreError::NotFound(format!("user {to_username:?} not found")))?;

        if users[to].friends.iter().any(|f| f == from_username) {
            return Err(StoreError::Conflict(format!(
                "{to_username:?} already lists {from_username:?} as a friend"
            )));
        }

        users[to].friends.push(from_username.to_string());
        users[from].friends.push(to_username.to_string());
        self.store.save(&users)?;
        Ok(())
    }

    /// Resolve a user's friend list into display entries. A friend whose
    /// own record has gone missing still appears, with defaults.
    pub fn list_friends(&self, username: &str) -> StoreResult<Vec<FriendView>> {
        let users = self.store.load()?;
        let user = users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| StoreError::NotFound(format!("user {username:?} not found")))?;

        let friends = user
            .friends
            .iter()
            .map(|name| {
                let friend = users.iter().find(|u| &u.username == name);
                FriendView {
                    username: name.clone(),
                    profile_image: friend
                        .and_then(|f| f.profile_image.clone())
                        .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string()),
                    status: friend
                        .and_then(|f| f.status.clone())
                        .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
                }
            })
            .collect();
        Ok(friends)
    }

    /// Point a user's profile image at a freshly stored file and return
    /// the recorded path.
    pub fn update_profile_image(&self, user_id: &UserId, stored_path: &str) -> StoreResult<String> {
        let mut users = self.store.load()?;
        let user = users
            .iter_mut()
            .find(|u| &u.id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id} not found")))?;
        user.profile_image = Some(stored_path.to_string());
        self.store.save(&users)?;
        Ok(stored_path.to_string())
    }

    pub fn change_password(
        &self,
        user_id: &UserId,
        old_password: &str,
        new_password: &str,
    ) -> StoreResult<()> {
        let mut users = self.store.load()?;
        let user = users
            .iter_mut()
            .find(|u| &u.id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id} not found")))?;
        if user.password != old_password {
            return Err(StoreError::Auth("invalid current password".to_string()));
        }
        user.password = new_password.to_string();
        self.store.save(&users)?;
        Ok(())
    }

    /// Fail with `NotFound` unless the username is registered.
    pub fn require_user(&self, username: &str) -> StoreResult<()> {
        let users = self.store.load()?;
        if users.iter().any(|u| u.username == username) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!(
                "user {username:?} not found"
            )))
        }
    }
}
