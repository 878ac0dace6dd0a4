use crate::config::AppConfig;
use palaver_store::{AttachmentTree, MessageLedger, UserRegistry};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state.
///
/// Each document collection sits behind its own mutex so that concurrent
/// requests never interleave load-mutate-save cycles on the same file.
/// The upload path locks the registry before the ledger; no other
/// handler takes both.
pub struct AppState {
    config: AppConfig,
    registry: Mutex<UserRegistry>,
    ledger: Mutex<MessageLedger>,
    attachments: AttachmentTree,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let attachments = AttachmentTree::new(
            config.uploads_dir.clone(),
            config.user_images_dir.clone(),
        );
        let registry = UserRegistry::open(config.users_file())?;
        let ledger = MessageLedger::open(config.messages_file(), attachments.clone())?;

        Ok(Arc::new(Self {
            config,
            registry: Mutex::new(registry),
            ledger: Mutex::new(ledger),
            attachments,
        }))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &Mutex<UserRegistry> {
        &self.registry
    }

    pub fn ledger(&self) -> &Mutex<MessageLedger> {
        &self.ledger
    }

    pub fn attachments(&self) -> &AttachmentTree {
        &self.attachments
    }
}
