//! Disk persistence for uploaded files. Uploads land on disk before the
//! workflow transaction runs; callers clean up on a failed transition.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

pub const MAX_FILE_BYTES: usize = 20 * 1024 * 1024;

pub const ABSTRACT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const FULL_PAPER_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file type '{0}'. Allowed: PDF, DOC, DOCX, JPEG, PNG")]
    UnsupportedType(String),
    #[error("File exceeds the {max_mb} MB size limit")]
    TooLarge { max_mb: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A file already written to disk, ready to be referenced from the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub file_type: String,
    pub file_path: String,
}

pub fn ensure_dirs(upload_folder: &Path, full_paper_folder: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)?;
    std::fs::create_dir_all(full_paper_folder)?;
    Ok(())
}

fn generate_stored_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    format!(
        "{}_{}.{}",
        Utc::now().format("%Y%m%d"),
        &Uuid::new_v4().to_string()[..8],
        ext
    )
}

/// Validate type and size, then write the upload under `dir` with a unique
/// generated name. The content type falls back to an extension guess when the
/// client did not send one.
pub fn save_upload(
    dir: &Path,
    original_name: &str,
    content_type: Option<&str>,
    allowed_types: &[&str],
    data: &[u8],
) -> Result<StoredFile, StorageError> {
    if data.len() > MAX_FILE_BYTES {
        return Err(StorageError::TooLarge {
            max_mb: MAX_FILE_BYTES / (1024 * 1024),
        });
    }

    let file_type = match content_type {
        Some(ct) => ct.to_string(),
        None => mime_guess::from_path(original_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };
    if !allowed_types.contains(&file_type.as_str()) {
        return Err(StorageError::UnsupportedType(file_type));
    }

    let path: PathBuf = dir.join(generate_stored_name(original_name));
    std::fs::write(&path, data)?;

    Ok(StoredFile {
        file_name: original_name.to_string(),
        file_type,
        file_path: path.to_string_lossy().into_owned(),
    })
}

/// Best-effort removal of files persisted ahead of a transition that failed.
pub fn discard(files: &[StoredFile]) {
    for file in files {
        if let Err(e) = std::fs::remove_file(&file.file_path) {
            tracing::warn!(path = %file.file_path, error = %e, "failed to remove orphaned upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_pdf_under_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let stored = save_upload(
            dir.path(),
            "paper.pdf",
            Some("application/pdf"),
            FULL_PAPER_MIME_TYPES,
            b"%PDF-1.4",
        )
        .unwrap();

        assert_eq!(stored.file_name, "paper.pdf");
        assert_eq!(stored.file_type, "application/pdf");
        assert!(stored.file_path.ends_with(".pdf"));
        assert_eq!(std::fs::read(&stored.file_path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn guesses_type_from_extension_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let stored =
            save_upload(dir.path(), "scan.png", None, FULL_PAPER_MIME_TYPES, &[0u8; 4]).unwrap();
        assert_eq!(stored.file_type, "image/png");
    }

    #[test]
    fn rejects_disallowed_type() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_upload(
            dir.path(),
            "notes.txt",
            Some("text/plain"),
            ABSTRACT_MIME_TYPES,
            b"hi",
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedType(t) if t == "text/plain"));
    }

    #[test]
    fn rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![0u8; MAX_FILE_BYTES + 1];
        let err = save_upload(
            dir.path(),
            "big.pdf",
            Some("application/pdf"),
            FULL_PAPER_MIME_TYPES,
            &data,
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { max_mb: 20 }));
    }

    #[test]
    fn discard_removes_stored_files() {
        let dir = tempfile::tempdir().unwrap();
        let stored = save_upload(
            dir.path(),
            "paper.pdf",
            Some("application/pdf"),
            FULL_PAPER_MIME_TYPES,
            b"%PDF-1.4",
        )
        .unwrap();

        discard(std::slice::from_ref(&stored));
        assert!(!Path::new(&stored.file_path).exists());
    }
}
