use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use walkdir::WalkDir;

use crate::{
    document::validate_title, load_document_from_file, write_json_atomic, DocsError, Document,
    DocumentDraft, DocumentId, DocumentType, Result, StoreStatus,
};

const SCHEMA_FILE: &str = "store.json";
const DOCUMENTS_DIR: &str = "documents";
const SCHEMA_VERSION: u32 = 1;

/// Contents of `store.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaFile {
    schema_version: u32,
    /// Next identifier to hand out. Persisted before use so ids are never reused.
    next_id: u64,
}

/// The open backing store: on-disk layout plus the in-memory cache.
struct Backing {
    root: PathBuf,
    next_id: u64,
    documents: HashMap<DocumentId, Document>,
    /// Every file that carries a given id, canonical `<id>.json` or not
    files: HashMap<DocumentId, Vec<PathBuf>>,
}

enum StoreState {
    Uninitialized,
    Opening,
    Ready(Backing),
    Failed { reason: String },
}

/// Durable CRUD over the document collection.
///
/// The store opens its backing directory lazily: every public operation
/// drives the `Uninitialized -> Opening -> Ready | Failed` state machine, so
/// callers never sequence an explicit init. A failed open is retried by the
/// next operation.
pub struct DocumentStore {
    /// Directory holding `store.json` and `documents/`
    root: PathBuf,

    state: Mutex<StoreState>,
}

impl DocumentStore {
    /// Creates a store rooted at `root`. Nothing is touched on disk until
    /// the first operation.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(StoreState::Uninitialized),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current initialization state.
    pub async fn status(&self) -> StoreStatus {
        match &*self.state.lock().await {
            // Opening only exists while an operation holds the lock.
            StoreState::Uninitialized | StoreState::Opening => StoreStatus::Uninitialized,
            StoreState::Ready(_) => StoreStatus::Ready,
            StoreState::Failed { reason } => StoreStatus::Failed {
                reason: reason.clone(),
            },
        }
    }

    /// Opens the backing store now instead of on first use.
    pub async fn open(&self) -> Result<()> {
        self.with_backing(|_| Ok(())).await
    }

    /// Runs `op` against the ready backing store, opening it first if needed.
    async fn with_backing<T>(&self, op: impl FnOnce(&mut Backing) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().await;

        if !matches!(*state, StoreState::Ready(_)) {
            if let StoreState::Failed { reason } = &*state {
                debug!("Retrying open after previous failure: {}", reason);
            }
            *state = StoreState::Opening;
            match Backing::open(&self.root) {
                Ok(backing) => *state = StoreState::Ready(backing),
                Err(e) => {
                    error!("Failed to open document store at {}: {}", self.root.display(), e);
                    *state = StoreState::Failed {
                        reason: e.to_string(),
                    };
                    return Err(e);
                }
            }
        }

        match &mut *state {
            StoreState::Ready(backing) => op(backing),
            _ => Err(DocsError::storage("document store is not ready")),
        }
    }

    /// Creates a document from `draft` and returns its new identifier.
    pub async fn create(&self, draft: DocumentDraft) -> Result<DocumentId> {
        draft.validate()?;
        self.with_backing(|backing| {
            let id = backing.allocate_id()?;
            let document = Document::from_draft(id, draft, Utc::now());
            backing.write(document)?;
            info!("Document added with ID: {}", id);
            Ok(id)
        })
        .await
    }

    /// Every live document, in no particular order.
    pub async fn get_all(&self) -> Result<Vec<Document>> {
        self.with_backing(|backing| {
            debug!("Returning {} documents", backing.documents.len());
            Ok(backing.documents.values().cloned().collect())
        })
        .await
    }

    pub async fn get_by_id(&self, id: DocumentId) -> Result<Document> {
        self.with_backing(|backing| backing.get(id).cloned()).await
    }

    /// Documents of the given type, unordered.
    pub async fn get_by_type(&self, doc_type: DocumentType) -> Result<Vec<Document>> {
        self.with_backing(|backing| {
            Ok(backing
                .documents
                .values()
                .filter(|d| d.doc_type == doc_type)
                .cloned()
                .collect())
        })
        .await
    }

    /// Documents whose title equals `title`, ignoring case and surrounding
    /// whitespace. Titles are not unique.
    pub async fn get_by_title(&self, title: &str) -> Result<Vec<Document>> {
        let wanted = title.trim().to_lowercase();
        self.with_backing(|backing| {
            Ok(backing
                .documents
                .values()
                .filter(|d| d.title.trim().to_lowercase() == wanted)
                .cloned()
                .collect())
        })
        .await
    }

    /// Replaces the mutable fields of an existing document.
    ///
    /// `id` and `created` always come from the stored record and
    /// `last_modified` is stamped here. Changing the type is rejected.
    pub async fn update(&self, document: Document) -> Result<()> {
        validate_title(&document.title)?;
        self.with_backing(|backing| backing.replace(document).map(|_| ()))
            .await
    }

    /// Changes only the title.
    pub async fn rename(&self, id: DocumentId, title: &str) -> Result<Document> {
        validate_title(title)?;
        self.modify(id, |doc| {
            doc.title = title.trim().to_string();
            Ok(())
        })
        .await
    }

    /// Saves editor output: title and content together.
    pub async fn save(&self, id: DocumentId, title: &str, content: &str) -> Result<Document> {
        validate_title(title)?;
        self.modify(id, |doc| {
            doc.title = title.trim().to_string();
            doc.content = content.to_string();
            Ok(())
        })
        .await
    }

    /// Flips `pinned` and returns the new value.
    pub async fn toggle_pinned(&self, id: DocumentId) -> Result<bool> {
        let doc = self
            .modify(id, |doc| {
                doc.pinned = !doc.pinned;
                Ok(())
            })
            .await?;
        Ok(doc.pinned)
    }

    /// Flips `completed` and returns the new value.
    pub async fn toggle_completed(&self, id: DocumentId) -> Result<bool> {
        let doc = self
            .modify(id, |doc| {
                if doc.deadline.is_none() {
                    return Err(DocsError::validation(format!(
                        "Document {} has no deadline to complete",
                        doc.id
                    )));
                }
                doc.completed = !doc.completed;
                Ok(())
            })
            .await?;
        Ok(doc.completed)
    }

    /// Sets or clears the deadline. Clearing also clears `completed`.
    pub async fn set_deadline(
        &self,
        id: DocumentId,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Document> {
        self.modify(id, |doc| {
            doc.deadline = deadline;
            if deadline.is_none() {
                doc.completed = false;
            }
            Ok(())
        })
        .await
    }

    /// Read-modify-write of a single document inside one store transaction.
    async fn modify(
        &self,
        id: DocumentId,
        change: impl FnOnce(&mut Document) -> Result<()>,
    ) -> Result<Document> {
        self.with_backing(|backing| {
            let mut document = backing.get(id)?.clone();
            change(&mut document)?;
            backing.replace(document)
        })
        .await
    }

    /// Removes a document permanently. Fails with `NotFound` if absent.
    pub async fn delete(&self, id: DocumentId) -> Result<()> {
        self.with_backing(|backing| {
            if backing.remove(id)? {
                Ok(())
            } else {
                Err(DocsError::NotFound { id })
            }
        })
        .await
    }

    /// Idempotent delete: returns whether a document was removed.
    pub async fn delete_if_exists(&self, id: DocumentId) -> Result<bool> {
        self.with_backing(|backing| backing.remove(id)).await
    }
}

fn file_name(id: DocumentId) -> String {
    format!("{}.json", id)
}

fn storage_err(context: &str, path: &Path, e: impl std::fmt::Display) -> DocsError {
    DocsError::storage(format!("{} {}: {}", context, path.display(), e))
}

impl Backing {
    /// Creates the layout when missing and loads every document into memory.
    fn open(root: &Path) -> Result<Self> {
        info!("Opening document store at {}", root.display());

        let documents_dir = root.join(DOCUMENTS_DIR);
        fs::create_dir_all(&documents_dir)
            .map_err(|e| storage_err("Failed to create directory", &documents_dir, e))?;

        let schema_path = root.join(SCHEMA_FILE);
        let mut schema = if schema_path.exists() {
            let raw = fs::read_to_string(&schema_path)
                .map_err(|e| storage_err("Failed to read", &schema_path, e))?;
            let schema: SchemaFile = serde_json::from_str(&raw)
                .map_err(|e| storage_err("Corrupt schema file", &schema_path, e))?;
            if schema.schema_version > SCHEMA_VERSION {
                return Err(DocsError::storage(format!(
                    "Schema version {} is newer than supported version {}",
                    schema.schema_version, SCHEMA_VERSION
                )));
            }
            schema
        } else {
            debug!("Schema file missing, initializing {}", schema_path.display());
            SchemaFile {
                schema_version: SCHEMA_VERSION,
                next_id: 1,
            }
        };

        let mut documents: HashMap<DocumentId, Document> = HashMap::new();
        let mut files: HashMap<DocumentId, Vec<PathBuf>> = HashMap::new();
        let mut load_errors = 0usize;
        for entry in WalkDir::new(&documents_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !(path.is_file() && path.extension().is_some_and(|ext| ext == "json")) {
                continue;
            }
            match load_document_from_file(path) {
                Ok(document) => {
                    let id = document.id;
                    let canonical = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name == file_name(id));
                    let sources = files.entry(id).or_default();
                    if !sources.is_empty() {
                        warn!(
                            "Document {} is stored more than once, also in {}",
                            id,
                            path.display()
                        );
                    } else if !canonical {
                        debug!("Document {} loaded from {}", id, path.display());
                    }
                    sources.push(path.to_path_buf());

                    // The file named after the id wins over copies.
                    if canonical || !documents.contains_key(&id) {
                        documents.insert(id, document);
                    }
                }
                Err(e) => {
                    warn!("Skipping unreadable document {}: {}", path.display(), e);
                    load_errors += 1;
                }
            }
        }

        // Files copied in from elsewhere may carry ids past the counter.
        if let Some(max_id) = documents.keys().map(|id| id.0).max() {
            let after = max_id.checked_add(1).ok_or_else(|| {
                DocsError::storage(format!("Document id {} leaves no room for new ids", max_id))
            })?;
            schema.next_id = schema.next_id.max(after);
        }
        write_json_atomic(&schema_path, &schema)
            .map_err(|e| storage_err("Failed to write", &schema_path, e))?;

        if load_errors > 0 {
            error!("Encountered {} errors while loading documents", load_errors);
        }
        info!("Loaded {} documents", documents.len());

        Ok(Backing {
            root: root.to_path_buf(),
            next_id: schema.next_id,
            documents,
            files,
        })
    }

    fn document_path(&self, id: DocumentId) -> PathBuf {
        self.root.join(DOCUMENTS_DIR).join(file_name(id))
    }

    fn get(&self, id: DocumentId) -> Result<&Document> {
        self.documents.get(&id).ok_or_else(|| {
            debug!("Document not found: {}", id);
            DocsError::NotFound { id }
        })
    }

    /// Reserves the next id and persists the counter before handing it out.
    fn allocate_id(&mut self) -> Result<DocumentId> {
        let id = DocumentId(self.next_id);
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| DocsError::storage("Document ids exhausted"))?;
        let schema = SchemaFile {
            schema_version: SCHEMA_VERSION,
            next_id,
        };
        let schema_path = self.root.join(SCHEMA_FILE);
        write_json_atomic(&schema_path, &schema)
            .map_err(|e| storage_err("Failed to write", &schema_path, e))?;
        self.next_id = next_id;
        trace!("Allocated document id {}", id);
        Ok(id)
    }

    /// Persists `document` under its canonical name, then updates the cache.
    /// Copies found under other names are removed so they cannot resurface.
    fn write(&mut self, document: Document) -> Result<()> {
        let id = document.id;
        let path = self.document_path(id);
        write_json_atomic(&path, &document)
            .map_err(|e| storage_err("Failed to write", &path, e))?;
        self.documents.insert(id, document);

        let mut kept = vec![path.clone()];
        for stale in self.files.remove(&id).unwrap_or_default() {
            if stale == path {
                continue;
            }
            match fs::remove_file(&stale) {
                Ok(()) => debug!("Removed stale copy {} of document {}", stale.display(), id),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    // The canonical file wins on the next open regardless.
                    warn!("Failed to remove stale copy {}: {}", stale.display(), e);
                    kept.push(stale);
                }
            }
        }
        self.files.insert(id, kept);
        Ok(())
    }

    /// Full replace of the mutable fields of an existing record.
    fn replace(&mut self, mut document: Document) -> Result<Document> {
        let stored = self.get(document.id)?;
        if document.doc_type != stored.doc_type {
            return Err(DocsError::validation(format!(
                "Document type is immutable: {} cannot become {}",
                stored.doc_type, document.doc_type
            )));
        }

        document.created = stored.created;
        document.last_modified = Utc::now().max(stored.last_modified);
        document.title = document.title.trim().to_string();

        self.write(document.clone())?;
        info!("Document {} updated successfully", document.id);
        Ok(document)
    }

    /// Deletes every file carrying `id`, then the cache entry. Returns false
    /// when nothing existed.
    fn remove(&mut self, id: DocumentId) -> Result<bool> {
        if !self.documents.contains_key(&id) {
            debug!("Delete of missing document {}", id);
            return Ok(false);
        }

        let paths = self
            .files
            .remove(&id)
            .unwrap_or_else(|| vec![self.document_path(id)]);
        let mut remaining = Vec::new();
        let mut failure = None;
        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => trace!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Document file {} already gone", path.display());
                }
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(storage_err("Failed to delete", &path, e));
                    }
                    remaining.push(path);
                }
            }
        }
        if let Some(err) = failure {
            self.files.insert(id, remaining);
            return Err(err);
        }

        self.documents.remove(&id);
        info!("Document {} deleted successfully", id);
        Ok(true)
    }
}
