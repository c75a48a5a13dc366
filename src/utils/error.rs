use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Document format error: {message}")]
    DocumentFormat { message: String },

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("Provider did not respond within {elapsed_ms}ms")]
    ProviderTimeout { elapsed_ms: u64 },

    #[error("Provider rate limit exceeded")]
    ProviderRateLimit { retry_after_secs: Option<u64> },

    #[error("Could not parse model output: {message}")]
    Parse { message: String },

    #[error("Configuration error in '{field}': {reason}")]
    Config { field: String, reason: String },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn document_format(message: impl Into<String>) -> Self {
        Self::DocumentFormat {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable name sent to clients in the `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::DocumentFormat { .. } => "DocumentFormatError",
            Self::Provider { .. } => "ProviderError",
            Self::ProviderTimeout { .. } => "ProviderTimeoutError",
            Self::ProviderRateLimit { .. } => "ProviderRateLimitError",
            Self::Parse { .. } => "ParseError",
            Self::Config { .. } => "ConfigError",
        }
    }

    /// Caller-side problems that the client can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::DocumentFormat { .. })
    }

    /// Only throttling and timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderTimeout { .. } | Self::ProviderRateLimit { .. }
        )
    }
}

impl From<zip::result::ZipError> for ServiceError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::document_format(format!("not a valid DOCX archive: {}", err))
    }
}

impl From<quick_xml::Error> for ServiceError {
    fn from(err: quick_xml::Error) -> Self {
        Self::document_format(format!("malformed document XML: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_per_variant() {
        let errors = [
            ServiceError::validation("x"),
            ServiceError::document_format("x"),
            ServiceError::provider("x"),
            ServiceError::ProviderTimeout { elapsed_ms: 1 },
            ServiceError::ProviderRateLimit {
                retry_after_secs: None,
            },
            ServiceError::parse("x"),
            ServiceError::config("f", "r"),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn only_timeout_and_rate_limit_are_retryable() {
        assert!(ServiceError::ProviderTimeout { elapsed_ms: 10 }.is_retryable());
        assert!(ServiceError::ProviderRateLimit {
            retry_after_secs: Some(3)
        }
        .is_retryable());
        assert!(!ServiceError::provider("500").is_retryable());
        assert!(!ServiceError::validation("empty").is_retryable());
        assert!(!ServiceError::document_format("bad zip").is_retryable());
        assert!(!ServiceError::parse("no json").is_retryable());
    }

    #[test]
    fn client_errors_are_validation_and_document_format() {
        assert!(ServiceError::validation("x").is_client_error());
        assert!(ServiceError::document_format("x").is_client_error());
        assert!(!ServiceError::provider("x").is_client_error());
        assert!(!ServiceError::parse("x").is_client_error());
    }

    #[test]
    fn timeout_display_mentions_elapsed() {
        let e = ServiceError::ProviderTimeout { elapsed_ms: 5000 };
        assert!(e.to_string().contains("5000ms"), "got: {e}");
    }
}
