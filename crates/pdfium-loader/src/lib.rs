//! # pdfium-loader
//!
//! Locate an already-installed [PDFium](https://pdfium.googlesource.com/pdfium/)
//! shared library and bind `pdfium-render` to it.
//!
//! ## Search order
//!
//! [`bind_pdfium`] tries each location in turn and binds the first library
//! file that exists:
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one.
//! 2. The directory holding the running executable.
//! 3. The current working directory.
//! 4. The per-user cache directory (see [`pdfium_cache_dir`]).
//!
//! When none of those hold a library, the platform loader is asked for a
//! system-wide copy (`LD_LIBRARY_PATH`, `DYLD_LIBRARY_PATH`, `PATH`, …).
//! Nothing is ever downloaded.
//!
//! ```rust,no_run
//! let pdfium = pdfium_loader::bind_pdfium().expect("PDFium unavailable");
//! # let _ = pdfium;
//! ```

use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, warn};

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable naming an explicit library file or directory.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "PDFIUM_CACHE_DIR";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating or binding PDFium.
#[derive(Error, Debug)]
pub enum PdfiumLoadError {
    /// The current OS/architecture combination has no known library name.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// A library file was found but `pdfium-render` could not load it.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    /// No candidate file existed and the system loader found nothing either.
    #[error("No PDFium library found.\nSearched: {searched}\nSystem loader: {reason}")]
    NotFound { searched: String, reason: String },
}

// ── Platform metadata ────────────────────────────────────────────────────────

/// File name of the PDFium shared library on the current platform.
pub fn platform_library_name() -> Result<&'static str, PdfiumLoadError> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;

    match os {
        "macos" | "ios" => Ok("libpdfium.dylib"),
        "linux" | "android" | "freebsd" | "openbsd" | "netbsd" => Ok("libpdfium.so"),
        "windows" => Ok("pdfium.dll"),
        _ => Err(PdfiumLoadError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }),
    }
}

// ── Cache directory resolution ───────────────────────────────────────────────

/// Per-user directory searched for a cached library.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/pdf2jpg/pdfium/`
/// - **Linux**: `~/.cache/pdf2jpg/pdfium/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2jpg\pdfium\`
///
/// Override by setting `PDFIUM_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var(CACHE_DIR_ENV) {
        if !override_dir.is_empty() {
            return PathBuf::from(override_dir);
        }
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2jpg").join("pdfium")
}

// ── Candidate search ─────────────────────────────────────────────────────────

/// Build the ordered candidate list from explicit inputs.
///
/// `explicit` may name the library file itself or a directory containing it.
pub fn candidate_paths_from(
    explicit: Option<&Path>,
    exe_dir: Option<&Path>,
    cwd: Option<&Path>,
    cache_dir: &Path,
    lib_name: &str,
) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(4);

    if let Some(p) = explicit {
        if p.is_dir() {
            candidates.push(p.join(lib_name));
        } else {
            candidates.push(p.to_path_buf());
        }
    }
    for dir in [exe_dir, cwd].into_iter().flatten() {
        candidates.push(dir.join(lib_name));
    }
    candidates.push(cache_dir.join(lib_name));

    candidates.dedup();
    candidates
}

/// Ordered candidate paths for the current process environment.
pub fn candidate_paths() -> Result<Vec<PathBuf>, PdfiumLoadError> {
    let lib_name = platform_library_name()?;

    let explicit = std::env::var_os(LIB_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    if let Some(msg) = explicit.as_deref().and_then(missing_explicit_path) {
        warn!("{msg}");
    }
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();

    Ok(candidate_paths_from(
        explicit.as_deref(),
        exe_dir.as_deref(),
        cwd.as_deref(),
        &pdfium_cache_dir(),
        lib_name,
    ))
}

/// Warning text for a `PDFIUM_LIB_PATH` that points at nothing.
fn missing_explicit_path(path: &Path) -> Option<String> {
    if path.exists() {
        None
    } else {
        Some(format!(
            "{} '{}' does not exist; searching default locations",
            LIB_PATH_ENV,
            path.display()
        ))
    }
}

/// First candidate path that exists on disk, if any.
pub fn find_pdfium_library() -> Option<PathBuf> {
    candidate_paths()
        .ok()?
        .into_iter()
        .find(|p| p.is_file())
}

// ── Binding ──────────────────────────────────────────────────────────────────

/// Bind to PDFium, preferring a located library file over the system loader.
pub fn bind_pdfium() -> Result<Pdfium, PdfiumLoadError> {
    if let Some(path) = find_pdfium_library() {
        return bind_pdfium_from_path(&path);
    }

    let searched = candidate_paths()?
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PdfiumLoadError::NotFound {
            searched,
            reason: e.to_string(),
        })
}

/// The library file an explicit path refers to: the path itself, or the
/// platform library inside it when `path` is a directory.
pub fn resolve_library_path(path: &Path) -> Result<PathBuf, PdfiumLoadError> {
    if path.is_dir() {
        Ok(path.join(platform_library_name()?))
    } else {
        Ok(path.to_path_buf())
    }
}

/// Binds to a PDFium library at an explicit `path` (file or directory).
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumLoadError> {
    let library = resolve_library_path(path)?;
    debug!("Binding PDFium from {}", library.display());
    Pdfium::bind_to_library(&library)
        .map(Pdfium::new)
        .map_err(|e| PdfiumLoadError::Bind {
            path: library,
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
