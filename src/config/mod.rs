pub mod cli;
pub mod toml_config;

use crate::adapters::gemini::{GeminiSettings, DEFAULT_BASE_URL};
use crate::domain::model::LanguagePair;
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use cli::CliArgs;
use std::fmt;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Clone)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub api_key: String,
    pub languages: LanguagePair,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub max_upload_bytes: usize,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("server", &self.server)
            .field("api_key", &"<redacted>")
            .field("languages", &self.languages)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ServiceConfig {
    /// Loads the optional TOML file named by `--config`, merges it under the
    /// flags and environment, and validates the result.
    pub fn load(cli: &CliArgs) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };
        let config = Self::resolve(cli, file.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Precedence: flag or environment variable, then the file, then the
    /// built-in default. Fails only when a required value is absent.
    pub fn resolve(cli: &CliArgs, file: Option<&TomlConfig>) -> Result<Self> {
        let provider = file.and_then(|f| f.provider());
        let server = file.and_then(|f| f.server());
        let languages = file.and_then(|f| f.languages());
        let limits = file.and_then(|f| f.limits());

        let api_key = cli
            .api_key
            .clone()
            .or_else(|| provider.and_then(|p| p.api_key.clone()));
        let input_lang = cli
            .input_lang
            .clone()
            .or_else(|| languages.and_then(|l| l.input.clone()));
        let output_lang = cli
            .output_lang
            .clone()
            .or_else(|| languages.and_then(|l| l.output.clone()));
        let model = cli
            .model
            .clone()
            .or_else(|| provider.and_then(|p| p.model.clone()));

        let api_key = validate_required_field("api_key (GEMINI_API_KEY)", &api_key)?.clone();
        let input_lang = validate_required_field("input_lang (INPUT_LANG)", &input_lang)?.clone();
        let output_lang =
            validate_required_field("output_lang (OUTPUT_LANG)", &output_lang)?.clone();
        let model = validate_required_field("model (LLM_MODEL)", &model)?.clone();

        let timeout_secs = cli
            .timeout_secs
            .or_else(|| provider.and_then(|p| p.timeout_seconds))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let retry_backoff_ms = provider
            .and_then(|p| p.retry_backoff_ms)
            .unwrap_or(DEFAULT_RETRY_BACKOFF_MS);
        let max_upload_mb = cli
            .max_upload_mb
            .or_else(|| limits.and_then(|l| l.max_upload_mb))
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Ok(Self {
            server: ServerConfig {
                host: cli
                    .host
                    .clone()
                    .or_else(|| server.and_then(|s| s.host.clone()))
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: cli
                    .port
                    .or_else(|| server.and_then(|s| s.port))
                    .unwrap_or(DEFAULT_PORT),
            },
            api_key,
            languages: LanguagePair::new(input_lang.trim(), output_lang.trim()),
            model: model.trim().to_string(),
            api_base_url: cli
                .api_base_url
                .clone()
                .or_else(|| provider.and_then(|p| p.base_url.clone()))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            max_retries: cli
                .max_retries
                .or_else(|| provider.and_then(|p| p.retry_attempts))
                .unwrap_or(DEFAULT_MAX_RETRIES),
            retry_backoff: Duration::from_millis(retry_backoff_ms),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.api_base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout: self.request_timeout,
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
        }
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api_key", &self.api_key)?;
        if self.api_key.contains("${") {
            return Err(ServiceError::config(
                "api_key",
                "contains an unresolved ${...} placeholder; is the variable exported?",
            ));
        }

        validate_non_empty_string("input_lang", &self.languages.source)?;
        validate_non_empty_string("output_lang", &self.languages.target)?;
        validate_non_empty_string("model", &self.model)?;
        if self.model.contains('/') || self.model.contains(char::is_whitespace) {
            return Err(ServiceError::config(
                "model",
                format!("'{}' is not a valid model identifier", self.model),
            ));
        }

        validate_url("api_base_url", &self.api_base_url)?;
        validate_range(
            "request_timeout_secs",
            self.request_timeout.as_secs(),
            1,
            600,
        )?;
        validate_range("max_retries", self.max_retries, 0, 10)?;
        validate_range(
            "retry_backoff_ms",
            self.retry_backoff.as_millis(),
            0,
            60_000,
        )?;
        validate_range(
            "max_upload_mb",
            self.max_upload_bytes / (1024 * 1024),
            1,
            100,
        )?;

        Ok(())
    }
}
