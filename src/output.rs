//! Request, progress and summary types shared by every entry point.

use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Stem used when the source path has no usable file name.
const FALLBACK_STEM: &str = "document";

/// One conversion: which PDF to read and where to put the pages.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    source_path: PathBuf,
    destination_dir: Option<PathBuf>,
}

impl ConversionRequest {
    /// Request that writes next to the source file.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            destination_dir: None,
        }
    }

    /// Request with an explicit destination directory.
    pub fn with_destination(
        source_path: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            destination_dir: Some(destination_dir.into()),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Destination as supplied, before defaulting.
    pub fn destination_dir(&self) -> Option<&Path> {
        self.destination_dir.as_deref()
    }

    /// Destination after defaulting to the source's parent directory.
    pub fn resolved_destination(&self) -> PathBuf {
        match self.destination_dir {
            Some(ref d) if !d.as_os_str().is_empty() => d.clone(),
            _ => match self.source_path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Source file name without its extension, byte for byte.
    pub fn base_name(&self) -> OsString {
        self.source_path
            .file_stem()
            .filter(|s| !s.is_empty())
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| OsString::from(FALLBACK_STEM))
    }
}

/// `<base_name>_page_<page_index>.jpg` (1-based).
pub fn output_file_name(base_name: &OsStr, page_index: usize) -> OsString {
    let mut name = base_name.to_os_string();
    name.push(format!("_page_{page_index}.jpg"));
    name
}

/// Full output path for one page.
pub fn output_path(destination_dir: &Path, base_name: &OsStr, page_index: usize) -> PathBuf {
    destination_dir.join(output_file_name(base_name, page_index))
}

/// Progress after one page has been written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionProgress {
    /// 1-based index of the page just written.
    pub page_index: usize,
    pub total_pages: usize,
    /// `page_index / total_pages`, in `(0, 1]`.
    pub fraction_complete: f64,
}

impl ConversionProgress {
    /// Progress for `page_index` of `total_pages`. `total_pages` must be ≥ 1.
    pub fn new(page_index: usize, total_pages: usize) -> Self {
        debug_assert!(total_pages > 0 && page_index <= total_pages);
        Self {
            page_index,
            total_pages,
            fraction_complete: page_index as f64 / total_pages as f64,
        }
    }
}

/// A page that was rendered and written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageExported {
    pub progress: ConversionProgress,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total_pages: usize,
    pub destination_dir: PathBuf,
    /// Written files in page order.
    pub outputs: Vec<PathBuf>,
    pub duration_ms: u64,
}
