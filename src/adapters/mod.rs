// Adapters layer: concrete implementations for external systems (geocoding, AI, map surface, storage).

pub mod gemini;
pub mod geocoding;
pub mod storage;
pub mod style_document;

pub use gemini::{GeminiClient, GeminiFactory};
pub use geocoding::MapboxGeocoder;
pub use storage::LocalStorage;
pub use style_document::StyleDocument;
