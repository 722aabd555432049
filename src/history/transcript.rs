// file: src/history/transcript.rs
// description: persistent chat transcript stored as a json array
// reference: https://docs.rs/serde_json

use crate::error::{PipelineError, Result};
use crate::models::{AnswerRecord, PassageMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<PassageMetadata>,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<PassageMetadata>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
            timestamp: Utc::now(),
        }
    }
}

pub struct TranscriptStore {
    storage_path: PathBuf,
    entries: Vec<TranscriptEntry>,
}

impl TranscriptStore {
    pub async fn open(storage_path: PathBuf) -> Result<Self> {
        if let Some(parent) = storage_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::FileOperation {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let mut store = Self {
            storage_path,
            entries: Vec::new(),
        };
        store.load().await?;

        Ok(store)
    }

    pub async fn load(&mut self) -> Result<()> {
        if !self.storage_path.exists() {
            debug!("No transcript found at {:?}", self.storage_path);
            return Ok(());
        }

        let contents = fs::read_to_string(&self.storage_path)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: self.storage_path.clone(),
                source: e,
            })?;

        self.entries = match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to parse transcript, starting fresh: {}", e);
                Vec::new()
            }
        };

        info!("Loaded {} transcript entries", self.entries.len());
        Ok(())
    }

    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.entries)?;

        fs::write(&self.storage_path, contents)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: self.storage_path.clone(),
                source: e,
            })?;

        debug!("Saved {} transcript entries", self.entries.len());
        Ok(())
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Appends the question and the final answer with its citations, then saves.
    pub async fn record(&mut self, record: &AnswerRecord) -> Result<()> {
        self.push(TranscriptEntry::user(record.question.clone()));
        self.push(TranscriptEntry::assistant(
            record.grounded_answer.clone(),
            record.citations(),
        ));
        self.save().await
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save().await
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerOutcome;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_transcript_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history/chat_history.json");

        {
            let mut store = TranscriptStore::open(path.clone()).await.unwrap();
            let record = AnswerRecord::new(
                "What was growth?",
                "Revenue grew by 12%",
                "Revenue grew by 12%.",
                Vec::new(),
                AnswerOutcome::Answered,
            );
            store.record(&record).await.unwrap();
        }

        let store = TranscriptStore::open(path).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].role, Role::User);
        assert_eq!(store.entries()[1].content, "Revenue grew by 12%.");
    }

    #[tokio::test]
    async fn test_corrupt_transcript_starts_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = TranscriptStore::open(path).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");

        let mut store = TranscriptStore::open(path.clone()).await.unwrap();
        store.push(TranscriptEntry::user("kya hai?"));
        store.save().await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap().trim(), "[]");
    }

    #[test]
    fn test_entry_serializes_role_lowercase() {
        let entry = TranscriptEntry::assistant("ok", Vec::new());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json["timestamp"].is_string());
    }
}
