//! Explicit application state for a UI collaborator.
//!
//! Holds what a front end needs between actions: the active type filter and
//! search query, the document currently open, and the last listing. The
//! listing is a cache; any mutation must call [`AppState::invalidate`] so the
//! next [`AppState::visible`] re-fetches from the store.
use log::trace;

use crate::{Document, DocumentId, DocumentQueryService, Result};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    filter: String,
    query: String,
    current: Option<DocumentId>,
    listing: Option<Vec<Document>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            filter: "all".to_string(),
            ..Default::default()
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current(&self) -> Option<DocumentId> {
        self.current
    }

    /// Changes the type filter. The cached listing is dropped.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self.listing = None;
        self
    }

    /// Changes the search query. The cached listing is dropped.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self.listing = None;
        self
    }

    pub fn open(&mut self, id: DocumentId) {
        self.current = Some(id);
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    /// Forgets the cached listing after a mutation.
    pub fn invalidate(&mut self) {
        trace!("Document listing invalidated");
        self.listing = None;
    }

    /// Whether [`AppState::visible`] would hit the store.
    pub fn is_stale(&self) -> bool {
        self.listing.is_none()
    }

    /// The filtered, ordered listing, fetched through `service` if stale.
    pub async fn visible(&mut self, service: &DocumentQueryService) -> Result<&[Document]> {
        if self.listing.is_none() {
            let fresh = service.list(&self.filter, &self.query).await?;
            self.listing = Some(fresh);
        }
        Ok(self.listing.as_deref().unwrap_or_default())
    }
}
