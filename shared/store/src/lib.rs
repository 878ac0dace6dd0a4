//! Flat-file conversation and relationship store for Palaver.
//!
//! Everything lives in two JSON document collections (`users.json`,
//! `messages.json`) plus a filesystem tree for uploaded binary payloads.
//! The store is synchronous and single-process: every operation is one
//! load-mutate-save cycle over a whole collection.

pub mod attachments;
pub mod document;
pub mod error;
pub mod ledger;
pub mod users;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use attachments::{AttachmentTree, StoredFile};
pub use document::DocumentStore;
pub use error::{StoreError, StoreResult};
pub use ledger::{
    ChatDescriptor, ChatMessage, FileMessage, FriendChatDescriptor, LedgerRecord, MessageLedger,
    UserConversations,
};
pub use users::{FriendView, User, UserRegistry};

/// Unique identifier assigned to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier assigned to a logical conversation.
///
/// A conversation descriptor stores this as its own record id, and every
/// message in the conversation carries it as `conversationId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
