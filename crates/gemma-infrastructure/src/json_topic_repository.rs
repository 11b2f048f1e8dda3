//! JSON-file TopicRepository implementation

use crate::dto::{create_chat_history_migrator, load_chat_history, save_chat_history};
use crate::storage::AtomicJsonFile;
use gemma_core::error::Result;
use gemma_core::topic::{ChatHistory, ChatTopic, TopicRepository};
use std::path::{Path, PathBuf};

/// File name of the persisted chat document.
pub const CHATS_FILE_NAME: &str = "chats.json";

/// A repository that keeps every topic in one pretty-printed JSON document.
///
/// - Uses version-migrate DTOs (`ChatHistoryV*`) for persistence
/// - Reads the legacy bare-array format and migrates it on the fly
/// - Rewrites the whole document on every save (temp file + rename)
///
/// ```text
/// <data_dir>/
/// └── chats.json     { "version": "2.0.0", "topics": [...] }
/// ```
pub struct JsonTopicRepository {
    file: AtomicJsonFile,
}

impl JsonTopicRepository {
    /// Creates a repository backed by the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicJsonFile::new(path.into()),
        }
    }

    /// Creates a repository storing `chats.json` inside `data_dir`.
    ///
    /// The directory is created eagerly so the first save cannot fail on a
    /// missing parent. A failure here is only logged; saves retry it.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        if let Err(e) = std::fs::create_dir_all(data_dir) {
            tracing::warn!("Failed to create storage directory {:?}: {}", data_dir, e);
        }
        Self::new(data_dir.join(CHATS_FILE_NAME))
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads all topics, reporting any failure.
    ///
    /// A missing or blank document is not a failure and yields an empty vector.
    /// A document whose version has no migration path (a newer major, for
    /// instance) is a `Migration` error.
    pub fn try_load(&self) -> Result<Vec<ChatTopic>> {
        let Some(value) = self.file.load()? else {
            return Ok(Vec::new());
        };
        let migrator = create_chat_history_migrator()?;
        Ok(load_chat_history(&migrator, value)?.topics)
    }

    /// Writes all topics as the latest document version, reporting any failure.
    pub fn try_save(&self, topics: &[ChatTopic]) -> Result<()> {
        let migrator = create_chat_history_migrator()?;
        let document = save_chat_history(
            &migrator,
            ChatHistory {
                topics: topics.to_vec(),
            },
        )?;
        self.file.save(&document)
    }
}

impl TopicRepository for JsonTopicRepository {
    fn load(&self) -> Vec<ChatTopic> {
        match self.try_load() {
            Ok(topics) => {
                tracing::debug!("Loaded {} topics from {:?}", topics.len(), self.path());
                topics
            }
            Err(e) => {
                tracing::error!("Error loading chats from {:?}: {}", self.path(), e);
                Vec::new()
            }
        }
    }

    fn save(&self, topics: &[ChatTopic]) {
        if let Err(e) = self.try_save(topics) {
            tracing::error!("Error saving chats to {:?}: {}", self.path(), e);
        }
    }
}
