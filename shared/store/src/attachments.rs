//! Filesystem directories for uploaded binary content.
//!
//! Two trees: one subdirectory per conversation under the upload root
//! (plus a shared `general` bucket for uploads without a conversation),
//! and one subdirectory per user under the profile-image root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::{ConversationId, UserId};

/// Bucket receiving uploads that carry no conversation id.
pub const GENERAL_BUCKET: &str = "general";

/// Fixed file stem for profile images; one per user, overwritten on change.
const PROFILE_IMAGE_STEM: &str = "profile";

/// A file placed into one of the attachment trees.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    /// Path relative to the owning tree root, `/`-separated. This is the
    /// value recorded as `fileUrl` / `profileImage`.
    pub relative_path: String,
    /// Absolute location on disk.
    pub absolute_path: PathBuf,
}

/// Maps conversations and users to their dedicated upload directories.
#[derive(Debug, Clone)]
pub struct AttachmentTree {
    uploads_root: PathBuf,
    profile_images_root: PathBuf,
}

impl AttachmentTree {
    pub fn new(
        uploads_root: impl Into<PathBuf>,
        profile_images_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            uploads_root: uploads_root.into(),
            profile_images_root: profile_images_root.into(),
        }
    }

    pub fn uploads_root(&self) -> &Path {
        &self.uploads_root
    }

    pub fn profile_images_root(&self) -> &Path {
        &self.profile_images_root
    }

    /// Directory holding one conversation's uploads; the shared general
    /// bucket when no conversation id is supplied.
    pub fn conversation_dir(&self, conversation: Option<&ConversationId>) -> PathBuf {
        self.uploads_root.join(bucket_name(conversation))
    }

    /// Create the conversation directory, including missing parents.
    /// Recreating an existing directory is a no-op.
    pub fn ensure_conversation_dir(
        &self,
        conversation: Option<&ConversationId>,
    ) -> StoreResult<PathBuf> {
        let dir = self.conversation_dir(conversation);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Store an uploaded file under its conversation directory, named by
    /// a fresh identifier plus the original extension so uploads never
    /// collide or overwrite.
    pub fn store_conversation_file(
        &self,
        conversation: Option<&ConversationId>,
        original_name: &str,
        contents: &[u8],
    ) -> StoreResult<StoredFile> {
        let dir = self.ensure_conversation_dir(conversation)?;
        let file_name = with_extension(&Uuid::new_v4().to_string(), original_name);
        write_file(dir, &bucket_name(conversation), file_name, contents)
    }

    /// Store a user's profile image under the fixed `profile` name,
    /// overwriting any previous image with the same extension.
    pub fn store_profile_image(
        &self,
        user: &UserId,
        original_name: &str,
        contents: &[u8],
    ) -> StoreResult<StoredFile> {
        let dir = self.profile_images_root.join(user.to_string());
        fs::create_dir_all(&dir)?;
        let file_name = with_extension(PROFILE_IMAGE_STEM, original_name);
        write_file(dir, &user.to_string(), file_name, contents)
    }

    /// Recursively remove a conversation's directory. Best-effort:
    /// absence is not an error and other failures are only logged.
    pub fn remove_conversation_dir(&self, conversation: &ConversationId) {
        let dir = self.conversation_dir(Some(conversation));
        match fs::remove_dir_all(&dir) {
            Ok(()) => debug!(path = %dir.display(), "removed conversation directory"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %dir.display(), %err, "failed to remove conversation directory")
            }
        }
    }
}

fn bucket_name(conversation: Option<&ConversationId>) -> String {
    match conversation {
        Some(id) => id.to_string(),
        None => GENERAL_BUCKET.to_string(),
    }
}

fn write_file(
    dir: PathBuf,
    bucket: &str,
    file_name: String,
    contents: &[u8],
) -> StoreResult<StoredFile> {
    let absolute_path = dir.join(&file_name);
    fs::write(&absolute_path, contents)?;
    debug!(path = %absolute_path.display(), "stored attachment");
    Ok(StoredFile {
        relative_path: format!("{bucket}/{file_name}"),
        absolute_path,
    })
}

/// Append `original_name`'s extension to a stem, when it has one.
fn with_extension(stem: &str, original_name: &str) -> String {
    match Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}
