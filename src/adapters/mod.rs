// Adapters layer: concrete implementations for external systems.

pub mod document;
pub mod gemini;
