use serde::{Deserialize, Serialize};

/// Body of every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind, e.g. `ValidationError` or `ProviderTimeoutError`
    pub kind: String,
    /// Human-readable message
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub input_lang: String,
    pub output_lang: String,
}

/// `application/x-www-form-urlencoded` body of `/transliterate/text`.
#[derive(Debug, Deserialize)]
pub struct TextForm {
    pub text: Option<String>,
}
