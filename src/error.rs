//! Error types for the pdf2jpg library.
//!
//! Every failure is terminal for the run that produced it: there are no
//! retries and no partial-success results. The fine-grained variants of
//! [`ExportError`] keep the precise cause for logs and messages, while
//! [`ExportError::kind`] folds them into the three coarse kinds a shell
//! needs to decide how to present a failure:
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | [`ErrorKind::MissingInput`] | no source path was supplied |
//! | [`ErrorKind::SourceOpen`]   | the PDF cannot be found, read or parsed |
//! | [`ErrorKind::PageExport`]   | one page failed to render or to be written |
//!
//! Two further kinds cover failures that happen before a run exists:
//! [`ErrorKind::Engine`] (pdfium could not be bound) and
//! [`ErrorKind::Config`] (builder validation).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2jpg library.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The request carried an empty source path.
    #[error("No PDF file selected. Choose a PDF file first.")]
    MissingInput,

    // ── Source errors ─────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// Process does not have read permission on the source file.
    #[error("Permission denied reading '{path}'")]
    SourcePermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The PDF engine refused to open the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptSource { path: PathBuf, detail: String },

    // ── Page errors ───────────────────────────────────────────────────────
    /// Rasterisation failed for one page (1-based).
    #[error("Page {page}/{total}: rendering failed: {detail}")]
    PageRenderFailed {
        page: usize,
        total: usize,
        detail: String,
    },

    /// The rendered page could not be encoded or written to disk.
    #[error("Page {page}/{total}: failed to write '{path}': {source}")]
    PageWriteFailed {
        page: usize,
        total: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── Engine / config errors ────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the executable, or set PDFIUM_LIB_PATH=/path/to/libpdfium."
    )]
    EngineUnavailable(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of an [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    SourceOpen,
    PageExport,
    Engine,
    Config,
}

impl ExportError {
    /// The coarse kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::MissingInput => ErrorKind::MissingInput,
            ExportError::SourceNotFound { .. }
            | ExportError::SourcePermissionDenied { .. }
            | ExportError::NotAPdf { .. }
            | ExportError::PasswordRequired { .. }
            | ExportError::WrongPassword { .. }
            | ExportError::CorruptSource { .. } => ErrorKind::SourceOpen,
            ExportError::PageRenderFailed { .. } | ExportError::PageWriteFailed { .. } => {
                ErrorKind::PageExport
            }
            ExportError::EngineUnavailable(_) => ErrorKind::Engine,
            ExportError::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// The 1-based page that failed, for page-level errors.
    pub fn page(&self) -> Option<usize> {
        match self {
            ExportError::PageRenderFailed { page, .. } | ExportError::PageWriteFailed { page, .. } => {
                Some(*page)
            }
            _ => None,
        }
    }
}

impl From<pdfium_loader::PdfiumLoadError> for ExportError {
    fn from(e: pdfium_loader::PdfiumLoadError) -> Self {
        ExportError::EngineUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_share_a_kind() {
        let path = PathBuf::from("/tmp/a.pdf");
        let errors = [
            ExportError::SourceNotFound { path: path.clone() },
            ExportError::SourcePermissionDenied { path: path.clone() },
            ExportError::NotAPdf {
                path: path.clone(),
                magic: b"PK\x03\x04".to_vec(),
            },
            ExportError::PasswordRequired { path: path.clone() },
            ExportError::WrongPassword { path: path.clone() },
            ExportError::CorruptSource {
                path,
                detail: "bad xref".into(),
            },
        ];
        for e in &errors {
            assert_eq!(e.kind(), ErrorKind::SourceOpen, "{e}");
            assert_eq!(e.page(), None);
        }
    }

    #[test]
    fn page_write_display_names_page_and_path() {
        let io = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let e = ExportError::PageWriteFailed {
            page: 2,
            total: 7,
            path: PathBuf::from("/out/report_page_2.jpg"),
            source: image::ImageError::IoError(io),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 2/7"), "got: {msg}");
        assert!(msg.contains("report_page_2.jpg"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::PageExport);
        assert_eq!(e.page(), Some(2));
    }

    #[test]
    fn render_failure_reports_page() {
        let e = ExportError::PageRenderFailed {
            page: 4,
            total: 9,
            detail: "bitmap allocation failed".into(),
        };
        assert_eq!(e.page(), Some(4));
        assert!(e.to_string().contains("bitmap allocation failed"));
    }

    #[test]
    fn missing_input_kind() {
        assert_eq!(ExportError::MissingInput.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn error_kind_serialises_snake_case() {
        let json = serde_json::to_string(&ErrorKind::PageExport).unwrap();
        assert_eq!(json, "\"page_export\"");
    }
}
