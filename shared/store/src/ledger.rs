//! The heterogeneous conversation ledger.
//!
//! One collection (`messages.json`) holds four kinds of record: plain
//! messages, file messages, broadcast chat descriptors, and friend-chat
//! descriptors, distinguished by an explicit `type` tag. A descriptor's
//! own id doubles as the conversation id carried by every message in
//! that conversation; nothing enforces that link on disk, so every write
//! path here maintains it by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use crate::attachments::{AttachmentTree, StoredFile};
use crate::document::DocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::users::UserRegistry;
use crate::{ConversationId, UserId};

/// Conversation name used when a friend chat is created without a name
/// and without an initial message to borrow one from.
const FALLBACK_FRIEND_CHAT_NAME: &str = "Friend Chat";

/// Plain text message inside a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub from_username: String,
    pub conversation_id: ConversationId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Uploaded file recorded as a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMessage {
    pub id: Uuid,
    pub from_username: String,
    pub to_username: String,
    pub conversation_id: ConversationId,
    /// Path relative to the upload tree root.
    pub file_url: String,
    pub timestamp: DateTime<Utc>,
}

/// Broadcast conversation, visible to every user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDescriptor {
    pub id: ConversationId,
    pub conversation_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Two-participant conversation created between friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendChatDescriptor {
    pub id: ConversationId,
    pub conversation_name: String,
    pub creator: UserId,
    pub participants: [UserId; 2],
    pub timestamp: DateTime<Utc>,
}

/// One entry in the conversation ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerRecord {
    #[serde(rename = "message")]
    Message(ChatMessage),
    #[serde(rename = "file")]
    File(FileMessage),
    #[serde(rename = "chat")]
    Chat(ChatDescriptor),
    #[serde(rename = "friend-chat")]
    FriendChat(FriendChatDescriptor),
}

impl LedgerRecord {
    /// Whether this record belongs to the given conversation, either by
    /// carrying its id or by being its descriptor.
    pub fn belongs_to(&self, conversation: &ConversationId) -> bool {
        match self {
            LedgerRecord::Message(message) => &message.conversation_id == conversation,
            LedgerRecord::File(file) => &file.conversation_id == conversation,
            LedgerRecord::Chat(chat) => &chat.id == conversation,
            LedgerRecord::FriendChat(chat) => &chat.id == conversation,
        }
    }
}

/// Conversations visible to one user, split by creatorship.
#[derive(Debug, Clone, Serialize)]
pub struct UserConversations {
    pub created: Vec<LedgerRecord>,
    pub joined: Vec<LedgerRecord>,
}

/// CRUD over the ledger, plus the attachment-directory lifecycle tied to
/// conversation creation and deletion.
pub struct MessageLedger {
    store: DocumentStore<LedgerRecord>,
    attachments: AttachmentTree,
}

impl MessageLedger {
    pub fn open(path: impl Into<PathBuf>, attachments: AttachmentTree) -> StoreResult<Self> {
        Ok(Self {
            store: DocumentStore::open(path)?,
            attachments,
        })
    }

    pub fn attachments(&self) -> &AttachmentTree {
        &self.attachments
    }

    /// Append a plain text message and return the created record.
    pub fn post_message(
        &self,
        from_username: &str,
        conversation_id: &ConversationId,
        text: &str,
    ) -> StoreResult<ChatMessage> {
        if from_username.is_empty() {
            return Err(StoreError::Validation(
                "fromUsername must not be empty".to_string(),
            ));
        }
        if text.is_empty() {
            return Err(StoreError::Validation(
                "message must not be empty".to_string(),
            ));
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            from_username: from_username.to_string(),
            conversation_id: conversation_id.clone(),
            message: text.to_string(),
            timestamp: Utc::now(),
        };
        let mut records = self.store.load()?;
        records.push(LedgerRecord::Message(message.clone()));
        self.store.save(&records)?;
        Ok(message)
    }

    /// Record an uploaded file as a message. Sender and recipient must be
    /// registered users, and a file must actually have been stored.
    pub fn post_file_message(
        &self,
        registry: &UserRegistry,
        conversation_id: &ConversationId,
        from_username: &str,
        to_username: &str,
        stored: Option<&StoredFile>,
    ) -> StoreResult<FileMessage> {
        registry.require_user(from_username)?;
        registry.require_user(to_username)?;
        let stored = stored.ok_or_else(|| {
            StoreError::Validation("no file was uploaded".to_string())
        })?;

        let message = FileMessage {
            id: Uuid::new_v4(),
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            conversation_id: conversation_id.clone(),
            file_url: stored.relative_path.clone(),
            timestamp: Utc::now(),
        };
        let mut records = self.store.load()?;
        records.push(LedgerRecord::File(message.clone()));
        self.store.save(&records)?;
        Ok(message)
    }

    /// Create a broadcast conversation and its attachment directory.
    pub fn create_broadcast_chat(&self, name: &str) -> StoreResult<ChatDescriptor> {
        if name.is_empty() {
            return Err(StoreError::Validation(
                "conversationName must not be empty".to_string(),
            ));
        }

        let descriptor = ChatDescriptor {
            id: ConversationId::new(),
            conversation_name: name.to_string(),
            timestamp: Utc::now(),
        };
        self.attachments
            .ensure_conversation_dir(Some(&descriptor.id))?;

        let mut records = self.store.load()?;
        records.push(LedgerRecord::Chat(descriptor.clone()));
        self.store.save(&records)?;
        Ok(descriptor)
    }

    /// Create a two-participant conversation. The name falls back to the
    /// first two words of the initial message, then to a fixed label.
    pub fn create_friend_chat(
        &self,
        from: &UserId,
        to: &UserId,
        initial_message: Option<&str>,
        name: Option<&str>,
    ) -> StoreResult<FriendChatDescriptor> {
        let conversation_name = match (name, initial_message) {
            (Some(name), _) if !name.is_empty() => name.to_string(),
            (_, Some(message)) if !message.trim().is_empty() => message
                .split_whitespace()
                .take(2)
                .collect::<Vec<_>>()
                .join(" "),
            _ => FALLBACK_FRIEND_CHAT_NAME.to_string(),
        };

        let descriptor = FriendChatDescriptor {
            id: ConversationId::new(),
            conversation_name,
            creator: from.clone(),
            participants: [from.clone(), to.clone()],
            timestamp: Utc::now(),
        };
        self.attachments
            .ensure_conversation_dir(Some(&descriptor.id))?;

        let mut records = self.store.load()?;
        records.push(LedgerRecord::FriendChat(descriptor.clone()));
        self.store.save(&records)?;
        Ok(descriptor)
    }

    /// Remove a conversation: its descriptor, every message belonging to
    /// it, and finally its attachment directory. The directory removal is
    /// best-effort; a failure after the ledger rewrite leaves an orphaned
    /// directory behind, not an inconsistent ledger.
    pub fn delete_conversation(&self, conversation_id: &ConversationId) -> StoreResult<()> {
        let mut records = self.store.load()?;
        let before = records.len();
        records.retain(|record| !record.belongs_to(conversation_id));
        let removed = before - records.len();
        self.store.save(&records)?;

        self.attachments.remove_conversation_dir(conversation_id);
        debug!(conversation = %conversation_id, removed, "deleted conversation");
        Ok(())
    }

    /// Every record in a conversation, including its own descriptor (a
    /// freshly created, empty conversation yields just the descriptor).
    pub fn conversation_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> StoreResult<Vec<LedgerRecord>> {
        let records = self.store.load()?;
        let matching: Vec<LedgerRecord> = records
            .into_iter()
            .filter(|record| record.belongs_to(conversation_id))
            .collect();
        debug!(conversation = %conversation_id, count = matching.len(), "loaded conversation records");
        Ok(matching)
    }

    /// Conversations visible to a user: friend chats they created or take
    /// part in, plus every broadcast chat unconditionally. Broadcast
    /// chats always land in `joined` since they have no creator.
    pub fn user_conversations(&self, user: &UserId) -> StoreResult<UserConversations> {
        let records = self.store.load()?;
        let mut created = Vec::new();
        let mut joined = Vec::new();
        for record in records {
            match &record {
                LedgerRecord::Chat(_) => joined.push(record),
                LedgerRecord::FriendChat(chat) => {
                    if &chat.creator == user {
                        created.push(record);
                    } else if chat.participants.contains(user) {
                        joined.push(record);
                    }
                }
                LedgerRecord::Message(_) | LedgerRecord::File(_) => {}
            }
        }
        Ok(UserConversations { created, joined })
    }
}
