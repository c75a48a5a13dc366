//! HTTP surface.
//!
//! - `POST /transliterate/text` - form field `text`
//! - `POST /transliterate/file` - form field `file`
//! - `POST /ner` - form field `file`
//! - `GET|POST /` - welcome message
//! - `GET /health` - liveness and active model
//!
//! ```bash
//! curl -F "text=Hello, how are you?" http://localhost:8000/transliterate/text
//! curl -F "file=@judgement.docx" http://localhost:8000/ner
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::status_for;
pub use handlers::AppState;
pub use server::{create_router, serve};
pub use types::{ErrorResponse, HealthResponse, WelcomeResponse};
