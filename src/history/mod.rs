mod file;
mod memory;
use async_trait::async_trait;
use log::{ info, warn };
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::models::chat::ChatMessage;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported store type: {0}")]
    UnsupportedType(String),
}

/// String key/value storage, the same shape as a browser's session or local
/// storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub fn create_store(
    store_type: &str,
    dir: PathBuf
) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match store_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "file" => Ok(Arc::new(FileStore::new(dir))),
        other => Err(StoreError::UnsupportedType(other.to_string())),
    }
}

pub fn initialize_session_store(args: &Args) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    let dir = args.session_dir();
    if args.session_store.eq_ignore_ascii_case("file") {
        info!("Chat history will be stored in files under {}", dir.display());
    } else {
        info!("Chat history will be kept in {} storage", args.session_store);
    }
    create_store(&args.session_store, dir)
}

pub fn initialize_prefs_store(args: &Args) -> Arc<dyn KeyValueStore> {
    info!("Preferences will be stored under {}", args.prefs_dir);
    Arc::new(FileStore::new(PathBuf::from(&args.prefs_dir)))
}

/// Reads the persisted conversation. Missing, unreadable or malformed data
/// yields an empty list.
pub async fn load_conversation(store: &dyn KeyValueStore, key: &str) -> Vec<ChatMessage> {
    let raw = match store.get_item(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            return Vec::new();
        }
        Err(e) => {
            warn!("Could not read chat history '{}': {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
        Ok(messages) => messages,
        Err(e) => {
            warn!("Discarding malformed chat history '{}': {}", key, e);
            Vec::new()
        }
    }
}

/// Overwrites the persisted conversation with the full message list.
pub async fn save_conversation(
    store: &dyn KeyValueStore,
    key: &str,
    messages: &[ChatMessage]
) -> Result<(), StoreError> {
    let json = serde_json::to_string(messages)?;
    store.set_item(key, &json).await
}
