//! Input validation: turn a [`ConversionRequest`] into concrete paths.
//!
//! The checks here run before pdfium ever sees the file, so callers get a
//! precise error (missing, unreadable, not a PDF) instead of a generic
//! engine failure. Nothing is written and the destination directory is not
//! touched; an unusable destination surfaces later as a page write error.

use crate::error::ExportError;
use crate::output::ConversionRequest;
use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A request whose source has been checked and whose destination is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub base_name: OsString,
}

/// Validate the request's source file and resolve the destination.
pub fn validate_request(request: &ConversionRequest) -> Result<ValidatedRequest, ExportError> {
    let source = request.source_path();
    if source.as_os_str().is_empty() {
        return Err(ExportError::MissingInput);
    }

    let path = source.to_path_buf();
    if !path.exists() {
        return Err(ExportError::SourceNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExportError::SourcePermissionDenied { path });
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExportError::SourceNotFound { path });
        }
        Err(e) => {
            return Err(ExportError::CorruptSource {
                path,
                detail: e.to_string(),
            });
        }
    };

    // Short files yield fewer than four bytes and fail the magic check.
    let mut magic = Vec::with_capacity(PDF_MAGIC.len());
    if let Err(e) = (&mut file).take(PDF_MAGIC.len() as u64).read_to_end(&mut magic) {
        return Err(ExportError::CorruptSource {
            path,
            detail: e.to_string(),
        });
    }
    if magic.as_slice() != PDF_MAGIC {
        return Err(ExportError::NotAPdf { path, magic });
    }

    let validated = ValidatedRequest {
        destination: request.resolved_destination(),
        base_name: request.base_name(),
        source: path,
    };
    debug!(
        "Validated source {} → {}",
        validated.source.display(),
        validated.destination.display()
    );
    Ok(validated)
}
