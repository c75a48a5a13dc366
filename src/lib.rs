pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use api::{create_router, serve, AppState};
pub use config::{cli::CliArgs, ServiceConfig};
pub use core::pipeline::TransliterationPipeline;
pub use domain::model::{EntityExtraction, LanguagePair, TransliterationResult, Upload};
pub use domain::ports::LlmClient;
pub use utils::error::{Result, ServiceError};
