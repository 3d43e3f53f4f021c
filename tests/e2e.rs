//! End-to-end tests through a real pdfium library.
//!
//! The PDFs are generated on the fly, so no fixtures need downloading, but a
//! pdfium shared library must be discoverable (next to the test binary, in
//! the working directory or via `PDFIUM_LIB_PATH`). The tests are gated
//! behind the `E2E_ENABLED` environment variable so they do not run in CI
//! unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so \
//!     cargo test --test e2e -- --nocapture --test-threads=1

use pdf2jpg::{
    convert, inspect, ConversionRequest, ErrorKind, EventRecorder, ExportConfig,
    PdfiumRasterizer,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Bind pdfium, or skip the test if E2E_ENABLED is unset or binding fails.
macro_rules! e2e_rasterizer_or_skip {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match PdfiumRasterizer::new() {
            Ok(r) => r,
            Err(e) => {
                println!("SKIP — pdfium not available: {e}");
                return;
            }
        }
    }};
}

/// Build a US-Letter PDF with `pages` pages. Page 1 carries a blue square
/// whose lower-left corner sits one inch from the page's lower-left corner.
fn letter_pdf(pages: usize) -> Vec<u8> {
    let square = b"0 0 1 rg 72 72 200 200 re f\n";
    let first_page = 3;
    let content = first_page + pages;

    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", first_page + i)).collect();
    objects.push(
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages).into_bytes(),
    );
    for i in 0..pages {
        let contents = if i == 0 {
            format!(" /Contents {content} 0 R")
        } else {
            String::new()
        };
        objects.push(
            format!("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792]{contents} >>")
                .into_bytes(),
        );
    }
    let mut stream = format!("<< /Length {} >>\nstream\n", square.len()).into_bytes();
    stream.extend_from_slice(square);
    stream.extend_from_slice(b"endstream");
    objects.push(stream);

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        pdf.extend_from_slice(body);
        pdf.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for off in &offsets {
        pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    pdf
}

fn write_pdf(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write generated PDF");
    path
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[test]
fn test_letter_pages_render_at_200_dpi() {
    let rasterizer = e2e_rasterizer_or_skip!();
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let pdf = write_pdf(src.path(), "letter.pdf", &letter_pdf(2));
    let mut recorder = EventRecorder::new();

    let summary = convert(
        &rasterizer,
        &ConversionRequest::with_destination(&pdf, out.path()),
        &ExportConfig::default(),
        &mut recorder,
    )
    .expect("convert() should succeed");

    assert_eq!(summary.total_pages, 2);
    assert_eq!(
        summary.outputs,
        vec![
            out.path().join("letter_page_1.jpg"),
            out.path().join("letter_page_2.jpg"),
        ]
    );

    for path in &summary.outputs {
        let img = image::open(path).expect("output should decode as an image");
        let (w, h) = (img.width(), img.height());
        assert!(w.abs_diff(1700) <= 1, "{}: width {w}", path.display());
        assert!(h.abs_diff(2200) <= 1, "{}: height {h}", path.display());
        println!("✓ {} → {w}×{h}", path.display());
    }

    let reported: Vec<(u32, u32)> = recorder
        .pages()
        .iter()
        .map(|p| (p.width, p.height))
        .collect();
    assert_eq!(reported.len(), 2);
}

#[test]
fn test_page_content_survives_encoding() {
    let rasterizer = e2e_rasterizer_or_skip!();
    let src = TempDir::new().unwrap();
    let pdf = write_pdf(src.path(), "square.pdf", &letter_pdf(1));

    let summary = convert(
        &rasterizer,
        &ConversionRequest::new(&pdf),
        &ExportConfig::default(),
        &mut EventRecorder::new(),
    )
    .expect("convert() should succeed");
    assert_eq!(summary.destination_dir, src.path());

    let img = image::open(&summary.outputs[0]).unwrap().to_rgb8();
    // Square centre is (172pt, 172pt) from the bottom-left; image rows run top-down.
    let scale = 200.0 / 72.0;
    let x = (172.0 * scale) as u32;
    let y = img.height() - (172.0 * scale) as u32;
    let inside = img.get_pixel(x, y).0;
    assert!(inside[2] > 200 && inside[0] < 60, "expected blue, got {inside:?}");

    let corner = img.get_pixel(img.width() - 20, 20).0;
    assert!(corner.iter().all(|&c| c > 230), "expected white, got {corner:?}");
}

// ── Inspect and failures ─────────────────────────────────────────────────────

#[test]
fn test_inspect_counts_pages() {
    let rasterizer = e2e_rasterizer_or_skip!();
    let src = TempDir::new().unwrap();
    let pdf = write_pdf(src.path(), "five.pdf", &letter_pdf(5));

    let plan = inspect(&rasterizer, &ConversionRequest::new(&pdf), &ExportConfig::default())
        .expect("inspect() should succeed");

    assert_eq!(plan.total_pages, 5);
    assert_eq!(plan.outputs[4], src.path().join("five_page_5.jpg"));
    assert!(!plan.outputs[0].exists());
}

#[test]
fn test_truncated_pdf_is_rejected() {
    let rasterizer = e2e_rasterizer_or_skip!();
    let src = TempDir::new().unwrap();
    let pdf = write_pdf(src.path(), "broken.pdf", b"%PDF-1.4\nthis is not a document\n");

    let err = convert(
        &rasterizer,
        &ConversionRequest::new(&pdf),
        &ExportConfig::default(),
        &mut EventRecorder::new(),
    )
    .expect_err("a broken PDF must not convert");

    assert_eq!(err.kind(), ErrorKind::SourceOpen, "{err}");
    let leftovers = std::fs::read_dir(src.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "jpg"))
        .count();
    assert_eq!(leftovers, 0);
}
