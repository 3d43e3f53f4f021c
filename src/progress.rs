//! Observer trait for run-level and per-page export events.
//!
//! Pass a `&mut dyn ExportObserver` to [`crate::convert::convert`] to be told
//! about each stage transition, each written page and the terminal outcome.
//! Every call happens synchronously on the converting thread, and the next
//! page is not started until `on_page_exported` returns. A shell can
//! therefore repaint from inside the callback.
//!
//! # Example
//!
//! ```rust
//! use pdf2jpg::{ExportObserver, PageExported};
//!
//! struct Printer;
//!
//! impl ExportObserver for Printer {
//!     fn on_page_exported(&mut self, page: &PageExported) {
//!         eprintln!(
//!             "{}/{} → {}",
//!             page.progress.page_index,
//!             page.progress.total_pages,
//!             page.path.display()
//!         );
//!     }
//! }
//! ```

use crate::error::{ErrorKind, ExportError};
use crate::output::{ExportSummary, PageExported};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a run currently is.
///
/// `Idle → Validating → Opening → Exporting(k) → {Completed | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ExportStage {
    #[default]
    Idle,
    Validating,
    Opening,
    /// Rendering/writing page `page_index` (1-based).
    Exporting { page_index: usize },
    Completed,
    Failed,
}

impl ExportStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStage::Completed | ExportStage::Failed)
    }
}

/// Receives export events. All methods default to no-ops.
pub trait ExportObserver {
    fn on_stage_change(&mut self, stage: ExportStage) {
        let _ = stage;
    }

    /// Called once the document is open, before the first page.
    fn on_export_start(&mut self, total_pages: usize, destination_dir: &Path) {
        let _ = (total_pages, destination_dir);
    }

    fn on_page_exported(&mut self, page: &PageExported) {
        let _ = page;
    }

    fn on_export_complete(&mut self, summary: &ExportSummary) {
        let _ = summary;
    }

    fn on_export_failed(&mut self, error: &ExportError) {
        let _ = error;
    }
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl ExportObserver for NoopObserver {}

/// Serialisable description of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFailure {
    pub kind: ErrorKind,
    pub page: Option<usize>,
    pub message: String,
}

impl From<&ExportError> for ExportFailure {
    fn from(e: &ExportError) -> Self {
        Self {
            kind: e.kind(),
            page: e.page(),
            message: e.to_string(),
        }
    }
}

/// One observed event, in a form that can be logged or sent as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExportEvent {
    Started {
        total_pages: usize,
        destination_dir: PathBuf,
    },
    Page(PageExported),
    Completed(ExportSummary),
    Failed(ExportFailure),
}

/// Observer that keeps every event in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    pub events: Vec<ExportEvent>,
    pub stages: Vec<ExportStage>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page events only, in emission order.
    pub fn pages(&self) -> Vec<&PageExported> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExportEvent::Page(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<&ExportEvent> {
        self.events.last()
    }
}

impl ExportObserver for EventRecorder {
    fn on_stage_change(&mut self, stage: ExportStage) {
        self.stages.push(stage);
    }

    fn on_export_start(&mut self, total_pages: usize, destination_dir: &Path) {
        self.events.push(ExportEvent::Started {
            total_pages,
            destination_dir: destination_dir.to_path_buf(),
        });
    }

    fn on_page_exported(&mut self, page: &PageExported) {
        self.events.push(ExportEvent::Page(page.clone()));
    }

    fn on_export_complete(&mut self, summary: &ExportSummary) {
        self.events.push(ExportEvent::Completed(summary.clone()));
    }

    fn on_export_failed(&mut self, error: &ExportError) {
        self.events.push(ExportEvent::Failed(error.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ConversionProgress;

    #[test]
    fn noop_observer_does_not_panic() {
        let mut obs = NoopObserver;
        obs.on_stage_change(ExportStage::Validating);
        obs.on_export_start(5, Path::new("/out"));
        obs.on_export_failed(&ExportError::MissingInput);
    }

    #[test]
    fn recorder_keeps_order() {
        let mut rec = EventRecorder::new();
        rec.on_export_start(2, Path::new("/out"));
        for k in 1..=2 {
            rec.on_page_exported(&PageExported {
                progress: ConversionProgress::new(k, 2),
                path: PathBuf::from(format!("/out/a_page_{k}.jpg")),
                width: 1,
                height: 1,
            });
        }
        let idx: Vec<usize> = rec.pages().iter().map(|p| p.progress.page_index).collect();
        assert_eq!(idx, vec![1, 2]);
        assert!(matches!(rec.events[0], ExportEvent::Started { total_pages: 2, .. }));
    }

    #[test]
    fn failure_event_carries_kind() {
        let mut rec = EventRecorder::new();
        rec.on_export_failed(&ExportError::MissingInput);
        match rec.last() {
            Some(ExportEvent::Failed(f)) => {
                assert_eq!(f.kind, ErrorKind::MissingInput);
                assert_eq!(f.page, None);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn events_serialise_with_tag() {
        let ev = ExportEvent::Started {
            total_pages: 3,
            destination_dir: PathBuf::from("/out"),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"event\":\"started\""), "got: {json}");

        let stage = serde_json::to_string(&ExportStage::Exporting { page_index: 2 }).unwrap();
        assert_eq!(stage, r#"{"stage":"exporting","page_index":2}"#);
    }

    #[test]
    fn terminal_stages() {
        assert!(ExportStage::Completed.is_terminal());
        assert!(ExportStage::Failed.is_terminal());
        assert!(!ExportStage::Exporting { page_index: 1 }.is_terminal());
    }
}
