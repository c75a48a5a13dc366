pub mod pipeline;
pub mod prompt;
pub mod response;

pub use crate::domain::model::{EntityExtraction, LanguagePair, Prompt, TransliterationResult};
pub use crate::domain::ports::LlmClient;
pub use crate::utils::error::Result;
