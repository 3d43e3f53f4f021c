//! CLI binary for pdf2jpg.
//!
//! A thin shell over the library: it fills a [`Session`] from the command
//! line, runs the conversion and draws the session's status in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2jpg::{
    convert, inspect, ConversionRequest, EventRecorder, ExportConfig, ExportError,
    ExportObserver, ExportStage, ExportSummary, LazyPdfiumRasterizer, PageExported, Session,
    Severity, StatusDisplay, StatusView,
};
use pdf2jpg::session::PROMPT_MESSAGE;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal status display ──────────────────────────────────────────────────

/// Draws session updates: plain lines before a run, an indicatif bar during
/// it, and a final green or red summary.
struct TerminalDisplay {
    show_progress: bool,
    quiet: bool,
    bar: Option<ProgressBar>,
    /// Last message printed, so appended lines are printed once.
    printed: String,
}

impl TerminalDisplay {
    fn new(show_progress: bool, quiet: bool) -> Self {
        Self {
            show_progress,
            quiet,
            bar: None,
            // The session's opening prompt is meant for pickers, not a CLI.
            printed: PROMPT_MESSAGE.to_string(),
        }
    }

    fn start_bar(&mut self) {
        if !self.show_progress || self.bar.is_some() {
            return;
        }
        let bar = ProgressBar::new(1000);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {percent:>3}%  {msg}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(bar);
    }

    fn clear_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Print only the part of `message` not already on screen.
    fn print_new_lines(&mut self, message: &str, severity: Severity) {
        let fresh = match message.strip_prefix(self.printed.as_str()) {
            Some(rest) if !self.printed.is_empty() => rest.trim_start_matches('\n'),
            _ => message,
        };
        for line in fresh.lines().filter(|l| !l.is_empty()) {
            match severity {
                Severity::Info => eprintln!("{} {}", dim("·"), line),
                Severity::Error => eprintln!("{} {}", red("✗"), red(line)),
            }
        }
        self.printed = message.to_string();
    }
}

impl StatusDisplay for TerminalDisplay {
    fn render(&mut self, view: &StatusView) {
        match view.stage {
            ExportStage::Completed => {
                self.clear_bar();
                if !self.quiet {
                    let mut lines = view.message.lines();
                    if let Some(first) = lines.next() {
                        eprintln!("{} {}", green("✔"), bold(first));
                    }
                    for line in lines {
                        eprintln!("  {}", dim(line));
                    }
                }
            }
            ExportStage::Failed => {
                self.clear_bar();
                eprintln!("{} {}", red("✘"), red(&view.message));
            }
            _ => match view.progress {
                Some(fraction) => {
                    self.start_bar();
                    if let Some(ref bar) = self.bar {
                        bar.set_position((fraction * 1000.0).round() as u64);
                        bar.set_message(view.message.clone());
                    } else if !self.quiet && fraction > 0.0 {
                        eprintln!("{}", view.message);
                    }
                }
                None if !self.quiet || view.severity == Severity::Error => {
                    self.print_new_lines(&view.message, view.severity);
                }
                None => {}
            },
        }
    }
}

// ── JSON-lines observer ──────────────────────────────────────────────────────

/// Prints each export event as one JSON object per line on stdout.
struct JsonLines {
    recorder: EventRecorder,
}

impl JsonLines {
    fn emit(&self) {
        if let Some(event) = self.recorder.last() {
            match serde_json::to_string(event) {
                Ok(line) => {
                    let mut out = io::stdout().lock();
                    let _ = writeln!(out, "{line}");
                    let _ = out.flush();
                }
                Err(e) => tracing::error!("Failed to serialise event: {e}"),
            }
        }
    }
}

impl ExportObserver for JsonLines {
    fn on_export_start(&mut self, total_pages: usize, destination_dir: &Path) {
        self.recorder.on_export_start(total_pages, destination_dir);
        self.emit();
    }

    fn on_page_exported(&mut self, page: &PageExported) {
        self.recorder.on_page_exported(page);
        self.emit();
    }

    fn on_export_complete(&mut self, summary: &ExportSummary) {
        self.recorder.on_export_complete(summary);
        self.emit();
    }

    fn on_export_failed(&mut self, error: &ExportError) {
        self.recorder.on_export_failed(error);
        self.emit();
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Pages land next to the PDF: report_page_1.jpg, report_page_2.jpg, …
  pdf2jpg report.pdf

  # Choose the output folder
  pdf2jpg report.pdf -o ./pages

  # Encrypted document
  pdf2jpg --password s3cret locked.pdf

  # List the files that would be written, without rendering
  pdf2jpg --inspect-only report.pdf

  # Machine-readable progress, one JSON event per line
  pdf2jpg --json report.pdf -o ./pages

OUTPUT:
  Every page is rendered at 200 DPI and saved as <name>_page_<n>.jpg.
  Existing files with the same names are overwritten. If a page fails, the
  run stops; pages written before it are kept.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH    Path to libpdfium (file or directory)
  PDFIUM_CACHE_DIR   Extra directory searched for libpdfium
  RUST_LOG           Log filter, e.g. RUST_LOG=pdf2jpg=debug
"#;

/// Convert every page of a PDF into a JPEG image.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2jpg",
    version,
    about = "Convert every page of a PDF into a JPEG image",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Directory for the page images. Defaults to the PDF's directory.
    #[arg(short, long, env = "PDF2JPG_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2JPG_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library, or a directory containing it.
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Print export events as JSON lines on stdout.
    #[arg(long, env = "PDF2JPG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JPG_NO_PROGRESS")]
    no_progress: bool,

    /// List the output files only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JPG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2JPG_QUIET")]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep library INFO logs out of the way of the progress bar.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── PDF engine ───────────────────────────────────────────────────────
    // Bound on first open, after the request has been validated, so a bad
    // source is reported before a missing engine.
    let rasterizer = match cli.pdfium_lib {
        Some(ref path) => LazyPdfiumRasterizer::with_library_path(path),
        None => LazyPdfiumRasterizer::new(),
    };

    let mut builder = ExportConfig::builder();
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let request = build_request(&cli);
        let plan = inspect(&rasterizer, &request, &config).context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?
            );
        } else {
            println!("File:         {}", plan.source.display());
            println!("Pages:        {}", plan.total_pages);
            println!("Destination:  {}", plan.destination_dir.display());
            for path in &plan.outputs {
                println!("  {}", path.display());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── JSON mode ────────────────────────────────────────────────────────
    if cli.json {
        let request = build_request(&cli);
        let mut observer = JsonLines {
            recorder: EventRecorder::new(),
        };
        return Ok(match convert(&rasterizer, &request, &config, &mut observer) {
            Ok(_) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        });
    }

    // ── Interactive-style session ────────────────────────────────────────
    let mut session = Session::new(TerminalDisplay::new(show_progress, cli.quiet));
    session.select_source(Some(cli.input.clone()));
    if let Some(ref dir) = cli.output_dir {
        session.select_destination(Some(dir.clone()));
    }

    // The display has already shown the outcome; only the exit code is left.
    Ok(match session.convert(&rasterizer, &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

fn build_request(cli: &Cli) -> ConversionRequest {
    match cli.output_dir {
        Some(ref dir) => ConversionRequest::with_destination(&cli.input, dir),
        None => ConversionRequest::new(&cli.input),
    }
}
