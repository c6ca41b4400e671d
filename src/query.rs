//! Filtering, searching and ordering of the document list.
//!
//! [`list_documents`] is a pure function of its inputs; [`DocumentQueryService`]
//! wraps it with a read of the full set from a [`DocumentStore`].
use std::{cmp::Ordering, sync::Arc};

use log::debug;

use crate::{Document, DocumentStore, Result};

/// Returns the display-ready subset of `documents`.
///
/// `type_filter` of `"all"` (any case) or empty keeps every type; anything
/// else keeps documents whose type matches case-insensitively. A non-empty
/// `search_query` keeps documents whose title or content contains it,
/// ignoring case.
pub fn list_documents(
    documents: Vec<Document>,
    type_filter: &str,
    search_query: &str,
) -> Vec<Document> {
    let filter = type_filter.trim().to_lowercase();
    let needle = search_query.trim().to_lowercase();

    let mut visible: Vec<Document> = documents
        .into_iter()
        .filter(|doc| {
            filter.is_empty() || filter == "all" || doc.doc_type.as_str().to_lowercase() == filter
        })
        .filter(|doc| needle.is_empty() || doc.matches_query(&needle))
        .collect();

    visible.sort_by(display_order);
    visible
}

/// Active deadlines first (soonest due first), then pinned, then most
/// recently modified. Ties fall back to id so repeated listings agree.
pub fn display_order(a: &Document, b: &Document) -> Ordering {
    let by_deadline = match (active_deadline(a), active_deadline(b)) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_deadline
        .then_with(|| b.pinned.cmp(&a.pinned))
        .then_with(|| b.last_modified.cmp(&a.last_modified))
        .then_with(|| a.id.cmp(&b.id))
}

fn active_deadline(doc: &Document) -> Option<chrono::DateTime<chrono::Utc>> {
    if doc.has_active_deadline() {
        doc.deadline
    } else {
        None
    }
}

/// Derives the visible document list from the store.
#[derive(Clone)]
pub struct DocumentQueryService {
    store: Arc<DocumentStore>,
}

impl DocumentQueryService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Reads every document and applies [`list_documents`].
    pub async fn list(&self, type_filter: &str, search_query: &str) -> Result<Vec<Document>> {
        let documents = self.store.get_all().await?;
        let total = documents.len();
        let visible = list_documents(documents, type_filter, search_query);
        debug!(
            "Listing {} of {} documents (filter='{}', query='{}')",
            visible.len(),
            total,
            type_filter,
            search_query
        );
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentDraft, DocumentId, DocumentType};
    use chrono::{Duration, Utc};

    fn doc(id: u64, title: &str, doc_type: DocumentType) -> Document {
        Document::from_draft(
            DocumentId(id),
            DocumentDraft::new(title, doc_type),
            Utc::now() - Duration::days(10),
        )
    }

    fn ids(docs: &[Document]) -> Vec<u64> {
        docs.iter().map(|d| d.id.0).collect()
    }

    #[test]
    fn deadline_then_pinned_then_recent() {
        let now = Utc::now();
        let mut a = doc(1, "A", DocumentType::Document);
        a.deadline = Some(now + Duration::days(1));
        let mut b = doc(2, "B", DocumentType::Document);
        b.pinned = true;
        let mut c = doc(3, "C", DocumentType::Document);
        c.last_modified = now;

        let listed = list_documents(vec![c, b, a], "all", "");
        assert_eq!(ids(&listed), vec![1, 2, 3]);
    }

    #[test]
    fn soonest_deadline_first_and_completed_ones_lose_priority() {
        let now = Utc::now();
        let mut later = doc(1, "later", DocumentType::List);
        later.deadline = Some(now + Duration::days(5));
        let mut sooner = doc(2, "sooner", DocumentType::List);
        sooner.deadline = Some(now + Duration::days(1));
        let mut done = doc(3, "done", DocumentType::List);
        done.deadline = Some(now - Duration::days(1));
        done.completed = true;
        done.last_modified = now;
        let mut pinned = doc(4, "pinned", DocumentType::List);
        pinned.pinned = true;

        let listed = list_documents(vec![done, later, pinned, sooner], "all", "");
        assert_eq!(ids(&listed), vec![2, 1, 4, 3]);
    }

    #[test]
    fn filters_by_type_case_insensitively() {
        let docs = vec![
            doc(1, "Home", DocumentType::Wiki),
            doc(2, "Todo", DocumentType::List),
            doc(3, "Recipes", DocumentType::Wiki),
        ];

        assert_eq!(ids(&list_documents(docs.clone(), "wiki", "")), vec![1, 3]);
        assert_eq!(ids(&list_documents(docs.clone(), "WIKI", "")), vec![1, 3]);
        assert_eq!(list_documents(docs.clone(), "All", "").len(), 3);
        assert_eq!(list_documents(docs.clone(), "", "").len(), 3);
        assert!(list_documents(docs, "fiction", "").is_empty());
    }

    #[test]
    fn filter_matches_raw_value_of_unrecognized_types() {
        let legacy = doc(1, "Budget", DocumentType::Unknown("Spreadsheet".to_string()));
        let docs = vec![legacy, doc(2, "Plain", DocumentType::Document)];

        assert_eq!(ids(&list_documents(docs.clone(), "spreadsheet", "")), vec![1]);
        assert!(list_documents(docs.clone(), "unknown", "").is_empty());
        assert_eq!(ids(&list_documents(docs, "document", "")), vec![2]);
    }

    #[test]
    fn searches_title_and_content() {
        let mut notes = doc(1, "Notes", DocumentType::Document);
        notes.content = "the quick fox".to_string();
        let docs = vec![notes, doc(2, "Quickstart", DocumentType::Wiki), doc(3, "Other", DocumentType::Wiki)];

        assert_eq!(ids(&list_documents(docs.clone(), "all", "quick")), vec![1, 2]);
        assert_eq!(ids(&list_documents(docs.clone(), "all", "QUICK")), vec![1, 2]);
        assert!(list_documents(docs.clone(), "all", "zzz").is_empty());
        assert_eq!(ids(&list_documents(docs, "wiki", "quick")), vec![2]);
    }

    #[test]
    fn empty_content_never_matches_content_search() {
        let docs = vec![doc(1, "Title", DocumentType::Document)];
        assert!(list_documents(docs, "all", "body").is_empty());
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(list_documents(Vec::new(), "all", "anything").is_empty());
    }

    #[test]
    fn listing_is_idempotent_regardless_of_input_order() {
        let stamp = Utc::now();
        let mut docs: Vec<Document> = (1..=6)
            .map(|i| {
                let mut d = doc(i, &format!("doc {}", i), DocumentType::Document);
                d.last_modified = stamp;
                d
            })
            .collect();

        let first = list_documents(docs.clone(), "all", "doc");
        docs.reverse();
        let second = list_documents(docs, "all", "doc");
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![1, 2, 3, 4, 5, 6]);
    }
}
