//! Image encoding: `DynamicImage` → baseline JPEG file on disk.
//!
//! JPEG carries no alpha channel, so pages are flattened to RGB first.
//! pdfium renders onto an opaque white background, which makes the flatten
//! lossless in practice.
//!
//! Each page is encoded into `<name>.jpg.tmp` beside its final path and then
//! renamed over it. Whatever was at the final path before is replaced, and a
//! failed encode never leaves a truncated `.jpg` behind.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Encode `img` as JPEG at `quality` and atomically place it at `path`.
pub fn write_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), ImageError> {
    let tmp_path = temp_path_for(path);

    let result = encode_to(img, &tmp_path, quality)
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(ImageError::IoError));

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result?;

    debug!(
        "Wrote {} ({}x{} px)",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(())
}

fn encode_to(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), ImageError> {
    let file = File::create(path).map_err(ImageError::IoError)?;
    let mut writer = BufWriter::new(file);

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?;

    writer.flush().map_err(ImageError::IoError)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
