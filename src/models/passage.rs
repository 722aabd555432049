// file: src/models/passage.rs
// description: passage model shared by ingestion, indexing and citation
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Upper bound on the passage text copied into a citation.
pub const CITATION_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassageKind {
    Text,
    TableRow,
    /// A table kept verbatim because its rows could not be parsed.
    Table,
}

impl PassageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TableRow => "tableRow",
            Self::Table => "table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "tableRow" | "table_row" => Some(Self::TableRow),
            "table" => Some(Self::Table),
            _ => None,
        }
    }
}

impl fmt::Display for PassageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passage candidate produced by assembly and chunking, before embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageDraft {
    pub text: String,
    pub source: String,
    pub page: u32,
    pub kind: PassageKind,
}

impl PassageDraft {
    /// Returns `None` for blank text; a passage always carries content.
    pub fn new(
        text: impl Into<String>,
        source: impl Into<String>,
        page: u32,
        kind: PassageKind,
    ) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }

        Some(Self {
            text,
            source: source.into(),
            page,
            kind,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: u32,
    pub kind: PassageKind,
    pub embedding: Vec<f32>,
}

impl Passage {
    pub fn from_draft(draft: PassageDraft, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: draft.text,
            source: draft.source,
            page: draft.page,
            kind: draft.kind,
            embedding,
        }
    }

    pub fn metadata(&self) -> PassageMetadata {
        PassageMetadata::from(self)
    }
}

/// Citation payload returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageMetadata {
    pub source: String,
    pub page: u32,
    #[serde(rename = "type")]
    pub kind: PassageKind,
    pub content: String,
}

impl From<&Passage> for PassageMetadata {
    fn from(passage: &Passage) -> Self {
        Self {
            source: passage.source.clone(),
            page: passage.page,
            kind: passage.kind,
            content: passage.text.chars().take(CITATION_PREVIEW_CHARS).collect(),
        }
    }
}
