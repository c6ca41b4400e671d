//! Command-line front end for the document store.
mod app;
mod args;

pub use app::*;
pub use args::*;
