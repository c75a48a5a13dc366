use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source and target language names as given in configuration, e.g.
/// `English` → `Assamese`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Transliterate,
    ExtractEntities,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Transliterate => "transliterate",
            Operation::ExtractEntities => "extract_entities",
        }
    }
}

/// A single request to the model. `system` carries every instruction,
/// `user` carries only the quoted source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub operation: Operation,
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransliterationResult {
    pub original_text: String,
    pub transliterated_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityExtraction {
    pub entities: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    PlainText,
}

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
