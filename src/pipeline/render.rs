//! PDF rasterisation behind the [`Rasterizer`] seam.
//!
//! The pipeline only needs two things from a PDF engine: open a file into a
//! [`SourceDocument`], then render page *i* of it at a given density.
//! [`PdfiumRasterizer`] provides both via `pdfium-render`; tests substitute
//! an in-memory double.
//!
//! ## Density
//!
//! PDF user space is 72 units per inch, so rendering at `dpi` scales every
//! page by `dpi / 72`. A US-Letter page at 200 DPI comes out 1700 × 2200 px.

use crate::error::ExportError;
use image::DynamicImage;
use once_cell::unsync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// An opened, paged document. Dropping it releases the underlying handle.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Render page `index` (0-based) at `dpi`.
    ///
    /// Errors are returned as the engine's description; the pipeline wraps
    /// them with the page number.
    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, String>;
}

/// Opens PDF files into [`SourceDocument`]s.
pub trait Rasterizer {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn SourceDocument + 'a>, ExportError>;
}

/// Render scale for a target density.
pub fn scale_for_dpi(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`Rasterizer`] backed by a bound pdfium library.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Locate and bind pdfium (see `pdfium_loader::bind_pdfium`).
    pub fn new() -> Result<Self, ExportError> {
        let pdfium = pdfium_loader::bind_pdfium()?;
        Ok(Self { pdfium })
    }

    /// Bind pdfium from an explicit library file, or a directory holding one.
    pub fn from_library_path(path: &Path) -> Result<Self, ExportError> {
        let pdfium = pdfium_loader::bind_pdfium_from_path(path)?;
        Ok(Self { pdfium })
    }

    /// Wrap an already-bound instance.
    pub fn from_pdfium(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn SourceDocument + 'a>, ExportError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, password)
            .map_err(|e| open_error(path, password.is_some(), &e))?;

        info!(
            "PDF loaded: {} ({} pages)",
            path.display(),
            document.pages().len()
        );

        Ok(Box::new(PdfiumDocument {
            document,
            path: path.to_path_buf(),
        }))
    }
}

/// [`Rasterizer`] that binds pdfium on the first `open`.
///
/// Requests are validated before any document is opened, so a missing or
/// non-PDF source is reported as such even when pdfium is not installed.
/// A bind failure surfaces from `open` as [`ExportError::EngineUnavailable`].
pub struct LazyPdfiumRasterizer {
    library_path: Option<PathBuf>,
    bound: OnceCell<PdfiumRasterizer>,
}

impl LazyPdfiumRasterizer {
    /// Bind through the loader's search order on first use.
    pub fn new() -> Self {
        Self {
            library_path: None,
            bound: OnceCell::new(),
        }
    }

    /// Bind from `path` (file or directory) on first use.
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
            bound: OnceCell::new(),
        }
    }

    /// The bound rasterizer, binding it now if needed.
    pub fn get(&self) -> Result<&PdfiumRasterizer, ExportError> {
        self.bound.get_or_try_init(|| match self.library_path {
            Some(ref path) => PdfiumRasterizer::from_library_path(path),
            None => PdfiumRasterizer::new(),
        })
    }
}

impl Default for LazyPdfiumRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for LazyPdfiumRasterizer {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn SourceDocument + 'a>, ExportError> {
        self.get()?.open(path, password)
    }
}

/// Classify a pdfium load failure.
fn open_error(path: &Path, had_password: bool, e: &PdfiumError) -> ExportError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            ExportError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            ExportError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        ExportError::CorruptSource {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    path: PathBuf,
}

impl SourceDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, String> {
        let page_index =
            u16::try_from(index).map_err(|_| format!("page index {index} exceeds pdfium limit"))?;

        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| format!("{:?}", e))?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale_for_dpi(dpi));

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| format!("{:?}", e))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

impl Drop for PdfiumDocument<'_> {
    fn drop(&mut self) {
        debug!("Closing PDF {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_page_at_200_dpi() {
        let scale = scale_for_dpi(200);
        assert_eq!((612.0 * scale).round() as u32, 1700);
        assert_eq!((792.0 * scale).round() as u32, 2200);
    }

    #[test]
    fn native_density_is_unscaled() {
        assert_eq!(scale_for_dpi(72), 1.0);
    }

    #[test]
    fn password_errors_are_classified() {
        let e = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError);
        let path = Path::new("/tmp/locked.pdf");
        assert!(matches!(
            open_error(path, false, &e),
            ExportError::PasswordRequired { .. }
        ));
        assert!(matches!(
            open_error(path, true, &e),
            ExportError::WrongPassword { .. }
        ));
    }

    #[test]
    fn lazy_rasterizer_reports_bind_failure_on_open() {
        let lazy = LazyPdfiumRasterizer::with_library_path("/nonexistent/pdf2jpg/libpdfium.so");
        match lazy.open(Path::new("/tmp/a.pdf"), None) {
            Err(e) => assert_eq!(e.kind(), crate::ErrorKind::Engine, "{e}"),
            Ok(_) => panic!("opened a document without an engine"),
        };
    }

    #[test]
    fn other_engine_errors_are_corrupt_source() {
        let e = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError);
        let err = open_error(Path::new("/tmp/broken.pdf"), false, &e);
        assert!(matches!(err, ExportError::CorruptSource { .. }));
    }
}
