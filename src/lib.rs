//! KRX Intent Router
//!
//! Turns a free-form (mostly Korean) stock-market question into a catalog
//! intent, the API endpoint that serves it, and the parameters found in
//! the text.
//!
//! CASCADE:
//! KEYWORD → EMBEDDING → LLM → KEYWORD FALLBACK → UNKNOWN

pub mod api;
pub mod catalog;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extractor;
pub mod keyword;
pub mod llm;
pub mod models;
pub mod router;

pub use error::Result;

// Re-export common types
pub use catalog::IntentCatalog;
pub use config::RouterConfig;
pub use models::*;
pub use router::IntentRouter;
