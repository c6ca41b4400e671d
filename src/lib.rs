//! Buddy Docs document library
//!
//! This library provides a durable store for typed documents (notes, wikis,
//! lists, interactive pieces, fiction) and the query layer that filters,
//! searches and orders them for display.

mod cli;
mod config;
mod display;
mod document;
mod errors;
mod helper;
mod query;
mod state;
mod storage;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use display::*;
pub use document::{DocumentDraft, Document, DocumentId, DocumentType};
pub use errors::*;
pub use helper::*;
pub use query::*;
pub use state::*;
pub use storage::*;
pub use types::*;
