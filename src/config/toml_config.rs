use crate::utils::error::{Result, ServiceError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Optional configuration file. Every field may be omitted; flags and
/// environment variables take precedence over anything set here.
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 8080
///
/// [provider]
/// api_key = "${GEMINI_API_KEY}"
/// model = "gemini-1.5-flash"
/// timeout_seconds = 60
/// retry_attempts = 2
///
/// [languages]
/// input = "English"
/// output = "Assamese"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub provider: Option<ProviderSection>,
    pub languages: Option<LanguageSection>,
    pub limits: Option<LimitsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageSection {
    pub input: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsSection {
    pub max_upload_mb: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::config(
                "config",
                format!("could not read {}: {}", path.display(), e),
            )
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| ServiceError::config("config", format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the value of `VAR`. Unset variables are left
    /// as-is so validation can name them.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| {
                    tracing::warn!("Environment variable {} referenced in config is not set", var_name);
                    format!("${{{}}}", var_name)
                })
            })
            .into_owned()
    }

    pub fn provider(&self) -> Option<&ProviderSection> {
        self.provider.as_ref()
    }

    pub fn server(&self) -> Option<&ServerSection> {
        self.server.as_ref()
    }

    pub fn languages(&self) -> Option<&LanguageSection> {
        self.languages.as_ref()
    }

    pub fn limits(&self) -> Option<&LimitsSection> {
        self.limits.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_file() {
        let config = TomlConfig::from_toml_str(
            r#"
[server]
host = "127.0.0.1"
port = 9000

[provider]
api_key = "abc"
model = "gemini-1.5-pro"
timeout_seconds = 20
retry_attempts = 1

[languages]
input = "English"
output = "Bengali"

[limits]
max_upload_mb = 4
"#,
        )
        .unwrap();

        assert_eq!(config.server().unwrap().port, Some(9000));
        assert_eq!(config.provider().unwrap().model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.languages().unwrap().output.as_deref(), Some("Bengali"));
        assert_eq!(config.limits().unwrap().max_upload_mb, Some(4));
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.provider().is_none());
        assert!(config.server().is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = TomlConfig::from_toml_str("[provider]\napi_kee = \"typo\"\n").unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("TRANSLIT_GATEWAY_TEST_KEY", "from-env");
        let config = TomlConfig::from_toml_str(
            "[provider]\napi_key = \"${TRANSLIT_GATEWAY_TEST_KEY}\"\nmodel = \"${TRANSLIT_GATEWAY_TEST_UNSET}\"\n",
        )
        .unwrap();

        let provider = config.provider().unwrap();
        assert_eq!(provider.api_key.as_deref(), Some("from-env"));
        assert_eq!(
            provider.model.as_deref(),
            Some("${TRANSLIT_GATEWAY_TEST_UNSET}")
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[languages]\ninput = \"English\"\noutput = \"Hindi\"").unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.languages().unwrap().output.as_deref(), Some("Hindi"));

        let err = TomlConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("could not read"));
    }
}
