use std::{fs, io::Write, path::Path};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use log::{debug, error, trace};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{DocsError, Document, Result};

/// Helper method to load a single document from file
pub fn load_document_from_file(path: &Path) -> Result<Document> {
    debug!("Loading document from file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to open document file {}: {}", path.display(), e);
        DocsError::Io(e)
    })?;

    let document: Document = serde_json::from_str(&content)?;

    if document.title.trim().is_empty() {
        return Err(DocsError::validation(format!(
            "Document from {} has an empty title",
            path.display()
        )));
    }
    if document.last_modified < document.created {
        return Err(DocsError::validation(format!(
            "Document from {} was modified before it was created",
            path.display()
        )));
    }

    trace!("Successfully loaded document: {}", document.id);
    Ok(document)
}

/// Writes `value` as pretty JSON to `path`, replacing any previous file
/// atomically. The temporary file lives next to the target so the final
/// rename never crosses filesystems.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp_file = NamedTempFile::new_in(dir)?;

    let json = serde_json::to_string_pretty(value)?;
    temp_file.write_all(json.as_bytes())?;
    temp_file.flush()?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        DocsError::Io(e.error)
    })?;
    Ok(())
}

/// Parses a user supplied deadline.
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates, the latter
/// meaning the start of that day in local time.
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        DocsError::validation(format!(
            "Invalid deadline '{}', expected YYYY-MM-DD or an RFC 3339 timestamp",
            input
        ))
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| DocsError::validation(format!("Deadline '{}' does not exist locally", input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentDraft, DocumentId, DocumentType};
    use tempfile::TempDir;

    #[test]
    fn parses_rfc3339_deadline() {
        let ts = parse_deadline("2026-03-01T12:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-01T12:00:00+00:00");
    }

    #[test]
    fn parses_plain_date_deadline() {
        let ts = parse_deadline("2026-03-01").unwrap();
        assert_eq!(
            ts.with_timezone(&Local).date_naive(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_deadline() {
        assert!(matches!(
            parse_deadline("next tuesday"),
            Err(DocsError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.json");
        let doc = Document::from_draft(
            DocumentId(1),
            DocumentDraft::new("Atomic", DocumentType::Document),
            Utc::now(),
        );

        write_json_atomic(&path, &doc).unwrap();
        write_json_atomic(&path, &doc).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(load_document_from_file(&path).unwrap(), doc);
    }
}
