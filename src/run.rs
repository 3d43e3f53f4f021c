//! Pull-based export: one page per `next()`.
//!
//! [`ExportRun`] is an [`Iterator`] over `Result<ExportStep, ExportError>`.
//! Each call renders and writes exactly one page, so the caller decides when
//! the next page starts and can repaint, log or yield in between. The
//! sequence always ends with exactly one terminal item, either
//! `Ok(ExportStep::Completed)` or `Err(_)`, after which the iterator is fused.
//!
//! The source document is dropped as soon as the last page is written or the
//! first error occurs, so the pdfium handle never outlives the work.
//!
//! ```rust,no_run
//! use pdf2jpg::{ConversionRequest, ExportConfig, ExportRun, ExportStep, PdfiumRasterizer};
//!
//! # fn main() -> Result<(), pdf2jpg::ExportError> {
//! let rasterizer = PdfiumRasterizer::new()?;
//! let config = ExportConfig::default();
//! let request = ConversionRequest::with_destination("report.pdf", "/tmp/out");
//!
//! for step in ExportRun::start(&rasterizer, &request, &config)? {
//!     match step? {
//!         ExportStep::Page(p) => println!("{}", p.path.display()),
//!         ExportStep::Completed(s) => println!("done: {} pages", s.total_pages),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::output::{self, ConversionProgress, ConversionRequest, ExportSummary, PageExported};
use crate::pipeline::input::{self, ValidatedRequest};
use crate::pipeline::render::{Rasterizer, SourceDocument};
use crate::pipeline::encode;
use crate::progress::ExportStage;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A non-error item produced by [`ExportRun`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExportStep {
    Page(PageExported),
    Completed(ExportSummary),
}

/// An in-progress export of one document.
pub struct ExportRun<'r> {
    document: Option<Box<dyn SourceDocument + 'r>>,
    request: ValidatedRequest,
    total_pages: usize,
    /// 1-based index of the next page to export.
    next_page: usize,
    dpi: u32,
    quality: u8,
    outputs: Vec<PathBuf>,
    started: Instant,
    stage: ExportStage,
}

impl<'r> ExportRun<'r> {
    /// Validate `request` and open its source.
    pub fn start(
        rasterizer: &'r dyn Rasterizer,
        request: &ConversionRequest,
        config: &'r ExportConfig,
    ) -> Result<Self, ExportError> {
        let validated = input::validate_request(request)?;
        Self::open(rasterizer, validated, config)
    }

    /// Open an already-validated request.
    pub fn open(
        rasterizer: &'r dyn Rasterizer,
        request: ValidatedRequest,
        config: &'r ExportConfig,
    ) -> Result<Self, ExportError> {
        let started = Instant::now();
        let document = rasterizer.open(&request.source, config.password.as_deref())?;
        let total_pages = document.page_count();

        if total_pages == 0 {
            warn!(
                "{} has no pages; nothing to export",
                request.source.display()
            );
        }
        info!(
            "Exporting {} pages of {} to {}",
            total_pages,
            request.source.display(),
            request.destination.display()
        );

        Ok(Self {
            document: Some(document),
            request,
            total_pages,
            next_page: 1,
            dpi: config.dpi(),
            quality: config.jpeg_quality(),
            outputs: Vec::with_capacity(total_pages),
            started,
            stage: ExportStage::Opening,
        })
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn destination_dir(&self) -> &Path {
        &self.request.destination
    }

    pub fn source_path(&self) -> &Path {
        &self.request.source
    }

    /// Stage reached by the most recent step.
    pub fn stage(&self) -> ExportStage {
        self.stage
    }

    /// The page the next `next()` call will export, if any remain.
    pub fn pending_page(&self) -> Option<usize> {
        if self.stage.is_terminal() || self.next_page > self.total_pages {
            None
        } else {
            Some(self.next_page)
        }
    }

    /// Files written so far, in page order.
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    fn export_page(&mut self, page_index: usize) -> Result<PageExported, ExportError> {
        let total = self.total_pages;
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| ExportError::PageRenderFailed {
                page: page_index,
                total,
                detail: "document already closed".into(),
            })?;

        let image = document
            .render_page(page_index - 1, self.dpi)
            .map_err(|detail| ExportError::PageRenderFailed {
                page: page_index,
                total,
                detail,
            })?;

        let path = output::output_path(&self.request.destination, &self.request.base_name, page_index);
        encode::write_jpeg(&image, &path, self.quality).map_err(|source| {
            ExportError::PageWriteFailed {
                page: page_index,
                total,
                path: path.clone(),
                source,
            }
        })?;

        Ok(PageExported {
            progress: ConversionProgress::new(page_index, total),
            path,
            width: image.width(),
            height: image.height(),
        })
    }

    fn close_document(&mut self) {
        if self.document.take().is_some() {
            debug!("Released {}", self.request.source.display());
        }
    }

    fn summary(&self) -> ExportSummary {
        ExportSummary {
            total_pages: self.total_pages,
            destination_dir: self.request.destination.clone(),
            outputs: self.outputs.clone(),
            duration_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

impl Iterator for ExportRun<'_> {
    type Item = Result<ExportStep, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stage.is_terminal() {
            return None;
        }

        if self.next_page > self.total_pages {
            self.close_document();
            self.stage = ExportStage::Completed;
            let summary = self.summary();
            info!(
                "Export complete: {} pages in {}ms → {}",
                summary.total_pages,
                summary.duration_ms,
                summary.destination_dir.display()
            );
            return Some(Ok(ExportStep::Completed(summary)));
        }

        let page_index = self.next_page;
        self.stage = ExportStage::Exporting { page_index };

        match self.export_page(page_index) {
            Ok(page) => {
                debug!("Page {}/{} → {}", page_index, self.total_pages, page.path.display());
                self.outputs.push(page.path.clone());
                self.next_page += 1;
                if self.next_page > self.total_pages {
                    self.close_document();
                }
                Some(Ok(ExportStep::Page(page)))
            }
            Err(e) => {
                warn!("Stopping export: {}", e);
                self.close_document();
                self.stage = ExportStage::Failed;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for ExportRun<'_> {}
