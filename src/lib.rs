//! # pdf2jpg
//!
//! Rasterise every page of a PDF into its own JPEG file.
//!
//! `report.pdf` with three pages becomes `report_page_1.jpg`,
//! `report_page_2.jpg` and `report_page_3.jpg` in the chosen directory (or
//! next to the PDF). Pages are rendered at a fixed 200 DPI through pdfium,
//! one after another on the calling thread, with a progress notification
//! after each page. The first failure stops the run; pages already written
//! stay on disk.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   validate the path, check the %PDF header, resolve destination
//!  ├─ 2. Open    load the document through pdfium
//!  ├─ 3. Render  rasterise page k at 200 DPI
//!  ├─ 4. Encode  write <stem>_page_<k>.jpg (temp file + rename)
//!  └─ 5. Report  progress k/N, then Completed or Failed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2jpg::{convert_pdf, ExportConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = convert_pdf("report.pdf", Some(Path::new("/tmp/out")), &ExportConfig::default())?;
//!     eprintln!("{} pages → {}", summary.total_pages, summary.destination_dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2jpg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod run;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportConfig, ExportConfigBuilder, JPEG_QUALITY, RENDER_DPI};
pub use convert::{convert, convert_pdf, inspect, ExportPlan};
pub use error::{ErrorKind, ExportError};
pub use output::{ConversionProgress, ConversionRequest, ExportSummary, PageExported};
pub use pipeline::render::{LazyPdfiumRasterizer, PdfiumRasterizer, Rasterizer, SourceDocument};
pub use progress::{
    EventRecorder, ExportEvent, ExportFailure, ExportObserver, ExportStage, NoopObserver,
};
pub use run::{ExportRun, ExportStep};
pub use session::{NullDisplay, Session, Severity, StatusDisplay, StatusView};
