use clap::Parser;
use std::path::PathBuf;

/// Command-line flags. Every provider setting can also come from the
/// environment variable named next to it, or from the TOML file.
#[derive(Clone, Default, Parser)]
#[command(name = "transliteration-gateway")]
#[command(about = "HTTP service for LLM-backed transliteration and entity transliteration")]
pub struct CliArgs {
    #[arg(long, env = "GATEWAY_HOST", help = "Address to listen on [default: 0.0.0.0]")]
    pub host: Option<String>,

    #[arg(long, env = "GATEWAY_PORT", help = "Port to listen on [default: 8000]")]
    pub port: Option<u16>,

    #[arg(long, short = 'c', help = "Optional TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "INPUT_LANG", help = "Source language, e.g. English")]
    pub input_lang: Option<String>,

    #[arg(long, env = "OUTPUT_LANG", help = "Target language, e.g. Assamese")]
    pub output_lang: Option<String>,

    #[arg(long, env = "LLM_MODEL", help = "Model identifier, e.g. gemini-1.5-flash")]
    pub model: Option<String>,

    #[arg(long, env = "GEMINI_API_BASE")]
    pub api_base_url: Option<String>,

    #[arg(long, env = "LLM_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[arg(long, env = "LLM_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    #[arg(long, help = "Largest accepted upload in MiB [default: 10]")]
    pub max_upload_mb: Option<usize>,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}
