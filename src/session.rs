//! Presentation-agnostic session state for an interactive shell.
//!
//! A [`Session`] holds what a window would hold between clicks: the chosen
//! PDF, the chosen destination, the status line and the progress bar. A
//! front end feeds picker results into [`Session::select_source`] and
//! [`Session::select_destination`], calls [`Session::convert`] when the user
//! starts a run, and draws whatever [`StatusDisplay::render`] receives.
//!
//! `convert` is the single error boundary: any [`ExportError`] becomes an
//! `"Error: …"` status line. It takes `&mut self`, so two runs can never
//! overlap on one session.

use crate::config::ExportConfig;
use crate::convert::convert;
use crate::error::ExportError;
use crate::output::{ConversionRequest, ExportSummary, PageExported};
use crate::pipeline::render::Rasterizer;
use crate::progress::{ExportObserver, ExportStage};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const PROMPT_MESSAGE: &str = "Select a PDF file and a destination folder.";
pub const SOURCE_CANCELLED_MESSAGE: &str = "PDF selection was cancelled.";
pub const DESTINATION_CANCELLED_MESSAGE: &str = "Destination selection was cancelled.";

/// How a status line should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

/// Everything a front end needs to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub message: String,
    pub severity: Severity,
    /// `Some(fraction)` while a run is in progress; the bar is hidden otherwise.
    pub progress: Option<f64>,
    pub stage: ExportStage,
}

impl Default for StatusView {
    fn default() -> Self {
        Self {
            message: PROMPT_MESSAGE.to_string(),
            severity: Severity::Info,
            progress: None,
            stage: ExportStage::Idle,
        }
    }
}

/// Draws a [`StatusView`]. Called after every change, synchronously.
pub trait StatusDisplay {
    fn render(&mut self, view: &StatusView);
}

/// Display that draws nothing.
pub struct NullDisplay;

impl StatusDisplay for NullDisplay {
    fn render(&mut self, _view: &StatusView) {}
}

/// Shell state for one window lifetime.
pub struct Session<D: StatusDisplay> {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    view: StatusView,
    display: D,
}

impl<D: StatusDisplay> Session<D> {
    pub fn new(display: D) -> Self {
        let mut session = Self {
            source: None,
            destination: None,
            view: StatusView::default(),
            display,
        };
        session.display.render(&session.view);
        session
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    pub fn view(&self) -> &StatusView {
        &self.view
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Record the file picker's result. `None` means the picker was cancelled.
    pub fn select_source(&mut self, picked: Option<PathBuf>) {
        match picked {
            Some(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_status(format!("Selected PDF: {name}"), Severity::Info);
                self.source = Some(path);
            }
            None => self.set_status(SOURCE_CANCELLED_MESSAGE.to_string(), Severity::Error),
        }
    }

    /// Record the folder picker's result. `None` means the picker was cancelled.
    ///
    /// The outcome is appended to the current status so the selected PDF
    /// stays visible.
    pub fn select_destination(&mut self, picked: Option<PathBuf>) {
        match picked {
            Some(dir) => {
                let line = format!("Destination: {}", dir.display());
                self.append_status(&line, Severity::Info);
                self.destination = Some(dir);
            }
            None => self.append_status(DESTINATION_CANCELLED_MESSAGE, Severity::Error),
        }
    }

    /// Run a conversion with the current selections.
    ///
    /// The outcome is also reflected in [`Session::view`].
    pub fn convert(
        &mut self,
        rasterizer: &dyn Rasterizer,
        config: &ExportConfig,
    ) -> Result<ExportSummary, ExportError> {
        let request = match (&self.source, &self.destination) {
            (Some(src), Some(dst)) => ConversionRequest::with_destination(src, dst),
            (Some(src), None) => ConversionRequest::new(src),
            (None, _) => ConversionRequest::new(PathBuf::new()),
        };

        let mut observer = SessionObserver {
            view: &mut self.view,
            display: &mut self.display,
        };
        convert(rasterizer, &request, config, &mut observer)
    }

    fn set_status(&mut self, message: String, severity: Severity) {
        self.view.message = message;
        self.view.severity = severity;
        self.display.render(&self.view);
    }

    fn append_status(&mut self, line: &str, severity: Severity) {
        self.view.message.push('\n');
        self.view.message.push_str(line);
        self.view.severity = severity;
        self.display.render(&self.view);
    }
}

/// Forwards export events into the session's view.
struct SessionObserver<'s, D: StatusDisplay> {
    view: &'s mut StatusView,
    display: &'s mut D,
}

impl<D: StatusDisplay> ExportObserver for SessionObserver<'_, D> {
    fn on_stage_change(&mut self, stage: ExportStage) {
        self.view.stage = stage;
    }

    fn on_export_start(&mut self, _total_pages: usize, _destination_dir: &Path) {
        self.view.progress = Some(0.0);
        self.display.render(self.view);
    }

    fn on_page_exported(&mut self, page: &PageExported) {
        let p = page.progress;
        self.view.progress = Some(p.fraction_complete);
        self.view.message = format!("Converting page {}/{}…", p.page_index, p.total_pages);
        self.view.severity = Severity::Info;
        self.display.render(self.view);
    }

    fn on_export_complete(&mut self, summary: &ExportSummary) {
        self.view.progress = None;
        self.view.message = format!(
            "Saved {} page images.\nDestination: {}",
            summary.total_pages,
            summary.destination_dir.display()
        );
        self.view.severity = Severity::Info;
        self.display.render(self.view);
    }

    fn on_export_failed(&mut self, error: &ExportError) {
        self.view.progress = None;
        self.view.message = match error {
            ExportError::MissingInput => "Please select a PDF file.".to_string(),
            other => format!("Error: {other}"),
        };
        self.view.severity = Severity::Error;
        self.display.render(self.view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every rendered view.
    #[derive(Default)]
    struct Frames(Vec<StatusView>);

    impl StatusDisplay for Frames {
        fn render(&mut self, view: &StatusView) {
            self.0.push(view.clone());
        }
    }

    struct NeverOpens;

    impl Rasterizer for NeverOpens {
        fn open<'a>(
            &'a self,
            path: &Path,
            _password: Option<&'a str>,
        ) -> Result<Box<dyn crate::SourceDocument + 'a>, ExportError> {
            Err(ExportError::CorruptSource {
                path: path.to_path_buf(),
                detail: "test double".into(),
            })
        }
    }

    #[test]
    fn starts_with_prompt() {
        let s = Session::new(Frames::default());
        assert_eq!(s.view().message, PROMPT_MESSAGE);
        assert_eq!(s.display().0.len(), 1);
    }

    #[test]
    fn selections_build_up_status() {
        let mut s = Session::new(Frames::default());
        s.select_source(Some(PathBuf::from("/docs/report.pdf")));
        s.select_destination(Some(PathBuf::from("/out")));
        assert_eq!(s.view().message, "Selected PDF: report.pdf\nDestination: /out");
        assert_eq!(s.view().severity, Severity::Info);
        assert_eq!(s.destination(), Some(Path::new("/out")));
    }

    #[test]
    fn cancelled_pickers_are_errors_and_keep_state() {
        let mut s = Session::new(NullDisplay);
        s.select_source(Some(PathBuf::from("/docs/a.pdf")));
        s.select_destination(None);
        assert!(s.view().message.ends_with(DESTINATION_CANCELLED_MESSAGE));
        assert_eq!(s.view().severity, Severity::Error);
        assert_eq!(s.source(), Some(Path::new("/docs/a.pdf")));

        s.select_source(None);
        assert_eq!(s.view().message, SOURCE_CANCELLED_MESSAGE);
        assert_eq!(s.source(), Some(Path::new("/docs/a.pdf")));
    }

    #[test]
    fn convert_without_source_asks_for_one() {
        let mut s = Session::new(NullDisplay);
        let err = s.convert(&NeverOpens, &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, ExportError::MissingInput));
        assert_eq!(s.view().message, "Please select a PDF file.");
        assert_eq!(s.view().severity, Severity::Error);
        assert_eq!(s.view().stage, ExportStage::Failed);
    }

    #[test]
    fn missing_file_is_rendered_as_error() {
        let mut s = Session::new(Frames::default());
        s.select_source(Some(PathBuf::from("/definitely/not/here.pdf")));
        let err = s.convert(&NeverOpens, &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, ExportError::SourceNotFound { .. }));
        assert!(s.view().message.starts_with("Error: "), "{}", s.view().message);
        assert_eq!(s.view().progress, None);
    }
}
