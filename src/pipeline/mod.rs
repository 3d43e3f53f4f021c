//! Pipeline stages for PDF-to-JPEG export.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the rendering backend can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode
//! (checks)  (pdfium)   (JPEG file)
//! ```
//!
//! 1. [`input`]: reject empty, missing, unreadable or non-PDF sources and
//!    resolve the destination directory
//! 2. [`render`]: open the document and rasterise one page at a time
//! 3. [`encode`]: flatten to RGB and write the JPEG via a temporary file

pub mod encode;
pub mod input;
pub mod render;
