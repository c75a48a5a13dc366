//! Request handlers. Each one reads its form field, hands it to the
//! pipeline and serialises the result; errors render through
//! [`ServiceError`]'s `IntoResponse`.

use crate::adapters::gemini::GeminiClient;
use crate::api::types::{HealthResponse, TextForm, WelcomeResponse};
use crate::config::ServiceConfig;
use crate::core::pipeline::TransliterationPipeline;
use crate::domain::model::{EntityExtraction, TransliterationResult, Upload};
use crate::utils::error::{Result, ServiceError};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        FromRequest, Multipart, Request, State,
    },
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use std::sync::Arc;

pub struct AppState {
    pub pipeline: TransliterationPipeline,
}

impl AppState {
    pub fn new(pipeline: TransliterationPipeline) -> Arc<Self> {
        Arc::new(Self { pipeline })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Arc<Self>> {
        let client = GeminiClient::new(config.gemini_settings())?;
        let pipeline = TransliterationPipeline::new(Arc::new(client), config.languages.clone());
        Ok(Self::new(pipeline))
    }
}

/// GET|POST / - welcome message
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the AI Transliteration and NER API! POST form data to \
                  /transliterate/text, /transliterate/file or /ner."
            .to_string(),
    })
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let languages = state.pipeline.languages();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.pipeline.model().to_string(),
        input_lang: languages.source.clone(),
        output_lang: languages.target.clone(),
    })
}

/// POST /transliterate/text - form field `text`
pub async fn transliterate_text(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<TransliterationResult>> {
    let text = read_text_field(request).await?;
    let result = state.pipeline.transliterate_text(text).await?;
    Ok(Json(result))
}

/// POST /transliterate/file - form field `file` (.docx or .txt)
pub async fn transliterate_file(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<TransliterationResult>> {
    let upload = read_upload(multipart).await?;
    let result = state.pipeline.transliterate_document(upload).await?;
    Ok(Json(result))
}

/// POST /ner - form field `file` (.docx or .txt)
pub async fn extract_entities(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<EntityExtraction>> {
    let upload = read_upload(multipart).await?;
    let result = state.pipeline.extract_entities(upload).await?;
    Ok(Json(result))
}

async fn read_text_field(request: Request) -> Result<String> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let text = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &()).await;
        let field = read_field(multipart, "text").await?;
        match field {
            Some(upload) => String::from_utf8(upload.bytes)
                .map_err(|_| ServiceError::validation("Field 'text' is not valid UTF-8."))?,
            None => String::new(),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<TextForm>::from_request(request, &())
            .await
            .map_err(|rejection| ServiceError::validation(rejection.body_text()))?;
        form.text.unwrap_or_default()
    } else {
        return Err(ServiceError::validation(
            "Expected a multipart/form-data or application/x-www-form-urlencoded body.",
        ));
    };

    Ok(text)
}

async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Upload> {
    let upload = read_field(multipart, "file")
        .await?
        .ok_or_else(|| ServiceError::validation("Please provide a file."))?;

    // Browsers send an empty, unnamed part when no file was chosen.
    let unnamed = upload.file_name.as_deref().map_or(true, str::is_empty);
    if upload.bytes.is_empty() && unnamed {
        return Err(ServiceError::validation("Please provide a file."));
    }
    Ok(upload)
}

async fn read_field(
    multipart: std::result::Result<Multipart, MultipartRejection>,
    name: &str,
) -> Result<Option<Upload>> {
    let mut multipart =
        multipart.map_err(|rejection| ServiceError::validation(rejection.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ServiceError::validation("Upload is too large.");
    }
    ServiceError::validation(format!("Could not read form data: {}", err.body_text()))
}
