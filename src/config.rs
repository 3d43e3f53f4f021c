//! Configuration for a page export run.
//!
//! Rendering density and output encoding are fixed: every page is rasterised
//! at [`RENDER_DPI`] and written as a baseline JPEG at [`JPEG_QUALITY`]. The
//! only caller-supplied knob is the password for encrypted documents.

use crate::error::ExportError;
use std::fmt;

/// Rasterisation density in dots per inch.
pub const RENDER_DPI: u32 = 200;

/// JPEG encoder quality (1–100).
pub const JPEG_QUALITY: u8 = 95;

/// Configuration for a PDF-to-JPEG export.
///
/// Built via [`ExportConfig::builder()`] or using [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2jpg::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .password("s3cret")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi(), 200);
/// ```
#[derive(Clone, Default)]
pub struct ExportConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("dpi", &RENDER_DPI)
            .field("jpeg_quality", &JPEG_QUALITY)
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn dpi(&self) -> u32 {
        RENDER_DPI
    }

    pub fn jpeg_quality(&self) -> u8 {
        JPEG_QUALITY
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        if let Some(ref pwd) = self.config.password {
            if pwd.is_empty() {
                return Err(ExportError::InvalidConfig(
                    "Password must not be empty; omit it instead".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fixed() {
        let c = ExportConfig::default();
        assert_eq!(c.dpi(), 200);
        assert_eq!(c.jpeg_quality(), 95);
        assert!(c.password.is_none());
    }

    #[test]
    fn empty_password_is_rejected() {
        let err = ExportConfig::builder().password("").build().unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ExportConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("redacted"));
    }
}
