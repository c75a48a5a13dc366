use crate::adapters::document::extract_text;
use crate::core::prompt::{build_entity_prompt, build_transliteration_prompt};
use crate::core::response::{parse_entities, parse_transliteration};
use crate::domain::model::{
    DocumentKind, EntityExtraction, LanguagePair, TransliterationResult, Upload,
};
use crate::domain::ports::LlmClient;
use crate::utils::error::{Result, ServiceError};
use std::sync::Arc;

/// Runs the three request operations: validate, optionally extract the
/// document text, prompt the model, parse its reply.
#[derive(Clone)]
pub struct TransliterationPipeline {
    llm: Arc<dyn LlmClient>,
    languages: LanguagePair,
}

impl TransliterationPipeline {
    pub fn new(llm: Arc<dyn LlmClient>, languages: LanguagePair) -> Self {
        Self { llm, languages }
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub async fn transliterate_text(&self, text: String) -> Result<TransliterationResult> {
        if text.trim().is_empty() {
            return Err(ServiceError::validation("Please provide text input."));
        }

        let prompt = build_transliteration_prompt(&text, &self.languages);
        tracing::debug!(
            "Transliterating {} chars from {} to {}",
            text.chars().count(),
            self.languages.source,
            self.languages.target
        );

        let raw = self.llm.generate(&prompt).await?;
        tracing::debug!("Model replied with {} chars", raw.chars().count());
        let transliterated_text = parse_transliteration(&raw)?;

        Ok(TransliterationResult {
            original_text: text,
            transliterated_text,
        })
    }

    pub async fn transliterate_document(&self, upload: Upload) -> Result<TransliterationResult> {
        let text = document_text(upload).await?;
        self.transliterate_text(text).await
    }

    pub async fn extract_entities(&self, upload: Upload) -> Result<EntityExtraction> {
        let text = document_text(upload).await?;

        let prompt = build_entity_prompt(&text, &self.languages);
        let raw = self.llm.generate(&prompt).await?;
        tracing::debug!("Model replied with {} chars", raw.chars().count());

        let extraction = parse_entities(&raw)?;
        for warning in &extraction.warnings {
            tracing::warn!("Entity reply: {}", warning);
        }
        tracing::info!(
            "Extracted {} entities ({} warnings)",
            extraction.entities.len(),
            extraction.warnings.len()
        );

        Ok(extraction)
    }
}

async fn document_text(upload: Upload) -> Result<String> {
    let kind = DocumentKind::detect(upload.file_name.as_deref(), upload.content_type.as_deref())?;
    tracing::debug!(
        "Extracting {:?} upload {:?} ({} bytes)",
        kind,
        upload.file_name,
        upload.bytes.len()
    );

    let text = tokio::task::spawn_blocking(move || extract_text(kind, &upload.bytes))
        .await
        .map_err(|e| ServiceError::document_format(format!("document extraction aborted: {}", e)))??;

    if text.trim().is_empty() {
        return Err(ServiceError::validation("The uploaded document contains no text."));
    }
    Ok(text)
}
