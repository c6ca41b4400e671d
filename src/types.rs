//! Shared types for the buddydocs application.
//!
//! This module holds the crate-wide `Result` alias, the observable store
//! status and the CLI subcommand definitions.
use std::path::PathBuf;

use clap::Subcommand;

use crate::DocsError;

/// A specialized Result type for buddydocs operations.
pub type Result<T> = std::result::Result<T, DocsError>;

/// Observable initialization state of a `DocumentStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    /// Nothing has opened the backing store yet. Opening happens inside a
    /// single operation and is never observed from outside.
    Uninitialized,
    /// Backing store open and cache loaded
    Ready,
    /// The last open attempt failed; the next operation retries it
    Failed { reason: String },
}

/// Available subcommands for the buddydocs application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new document
    Create {
        /// Title of the document
        #[clap(short = 'T', long)]
        title: String,

        /// Document type: document, wiki, list, interactive or fiction
        #[clap(short = 'k', long = "type")]
        doc_type: Option<String>,

        /// Initial content (HTML)
        #[clap(short, long)]
        content: Option<String>,

        /// Deadline, as YYYY-MM-DD or RFC 3339
        #[clap(short, long)]
        deadline: Option<String>,

        /// Pin the document on creation
        #[clap(short, long)]
        pin: bool,
    },

    /// View a document by ID
    View {
        /// ID of the document to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List documents, optionally filtered by type
    List {
        /// Type filter ("all" for every type)
        #[clap(short = 'k', long = "type", default_value = "all")]
        filter: String,

        /// Free text search over title and content
        #[clap(short, long, default_value = "")]
        query: String,

        /// Limit the number of documents shown
        #[clap(short = 'n', long)]
        limit: Option<usize>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Search documents by title or content
    Search {
        /// Search query text
        query: String,

        /// Type filter ("all" for every type)
        #[clap(short = 'k', long = "type", default_value = "all")]
        filter: String,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit the title and content of a document
    Edit {
        /// ID of the document to edit
        id: String,

        /// New title
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content (HTML)
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Rename a document
    Rename {
        /// ID of the document to rename
        id: String,

        /// New title
        title: String,
    },

    /// Toggle the pinned flag of a document
    Pin {
        /// ID of the document
        id: String,
    },

    /// Toggle the completed flag of a deadline-bearing document
    Complete {
        /// ID of the document
        id: String,
    },

    /// Set or clear the deadline of a document
    Deadline {
        /// ID of the document
        id: String,

        /// Deadline, as YYYY-MM-DD or RFC 3339
        #[clap(conflicts_with = "clear", required_unless_present = "clear")]
        date: Option<String>,

        /// Remove the deadline
        #[clap(long)]
        clear: bool,
    },

    /// Delete a document by ID
    Delete {
        /// ID of the document to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,

        /// Succeed even when the document does not exist
        #[clap(long)]
        missing_ok: bool,
    },

    /// Configuration management
    Config {
        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
