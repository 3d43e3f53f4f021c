//! Eager conversion entry points.
//!
//! [`convert`] drives an [`ExportRun`] to its end on the calling thread,
//! reporting every stage, page and the terminal outcome to an
//! [`ExportObserver`]. Use [`ExportRun`] directly to pull pages one at a
//! time instead.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::output::{self, ConversionRequest, ExportSummary};
use crate::pipeline::input;
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use crate::progress::{ExportObserver, ExportStage, NoopObserver};
use crate::run::{ExportRun, ExportStep};
use std::path::{Path, PathBuf};
use tracing::info;

/// Convert every page of `request`'s PDF into a JPEG.
///
/// # Returns
/// `Ok(ExportSummary)` once every page is written.
///
/// # Errors
/// The first failure ends the run. Pages written before a page failure are
/// left on disk. The same error is passed to
/// [`ExportObserver::on_export_failed`] before being returned.
pub fn convert(
    rasterizer: &dyn Rasterizer,
    request: &ConversionRequest,
    config: &ExportConfig,
    observer: &mut dyn ExportObserver,
) -> Result<ExportSummary, ExportError> {
    info!("Starting conversion: {}", request.source_path().display());

    // ── Step 1: Validate ─────────────────────────────────────────────────
    observer.on_stage_change(ExportStage::Validating);
    let validated = match input::validate_request(request) {
        Ok(v) => v,
        Err(e) => return Err(fail(observer, e)),
    };

    // ── Step 2: Open ─────────────────────────────────────────────────────
    observer.on_stage_change(ExportStage::Opening);
    let mut run = match ExportRun::open(rasterizer, validated, config) {
        Ok(run) => run,
        Err(e) => return Err(fail(observer, e)),
    };
    observer.on_export_start(run.total_pages(), run.destination_dir());

    // ── Step 3: Pages ────────────────────────────────────────────────────
    loop {
        if let Some(page_index) = run.pending_page() {
            observer.on_stage_change(ExportStage::Exporting { page_index });
        }
        match run.next() {
            Some(Ok(ExportStep::Page(page))) => observer.on_page_exported(&page),
            Some(Ok(ExportStep::Completed(summary))) => {
                observer.on_stage_change(ExportStage::Completed);
                observer.on_export_complete(&summary);
                return Ok(summary);
            }
            Some(Err(e)) => return Err(fail(observer, e)),
            None => break,
        }
    }

    unreachable!("ExportRun yields a terminal step before ending")
}

fn fail(observer: &mut dyn ExportObserver, e: ExportError) -> ExportError {
    observer.on_stage_change(ExportStage::Failed);
    observer.on_export_failed(&e);
    e
}

/// Convert with a freshly bound pdfium and no observer.
///
/// `destination_dir = None` writes next to the source file.
pub fn convert_pdf(
    source: impl AsRef<Path>,
    destination_dir: Option<&Path>,
    config: &ExportConfig,
) -> Result<ExportSummary, ExportError> {
    let request = match destination_dir {
        Some(dir) => ConversionRequest::with_destination(source.as_ref(), dir),
        None => ConversionRequest::new(source.as_ref()),
    };
    let rasterizer = PdfiumRasterizer::new()?;
    convert(&rasterizer, &request, config, &mut NoopObserver)
}

/// What a conversion would produce, without rendering anything.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExportPlan {
    pub source: PathBuf,
    pub destination_dir: PathBuf,
    pub total_pages: usize,
    pub outputs: Vec<PathBuf>,
}

/// Open the source and list the files a conversion would write.
pub fn inspect(
    rasterizer: &dyn Rasterizer,
    request: &ConversionRequest,
    config: &ExportConfig,
) -> Result<ExportPlan, ExportError> {
    let validated = input::validate_request(request)?;
    let total_pages = rasterizer
        .open(&validated.source, config.password.as_deref())?
        .page_count();

    let outputs = (1..=total_pages)
        .map(|k| output::output_path(&validated.destination, &validated.base_name, k))
        .collect();

    Ok(ExportPlan {
        source: validated.source,
        destination_dir: validated.destination,
        total_pages,
        outputs,
    })
}
