//! PNG export of the view's current raster.
//!
//! Export reads the raster through [`QrCodeView::snapshot`], so it takes the
//! same lock as drawing and never observes a half-finished regeneration.

use crate::widgets::QrCodeView;
use qrview_render::RasterImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there is no QR code to export")]
    NothingToExport,
    #[error("failed to encode PNG: {0}")]
    Png(#[from] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to open file manager: {0}")]
    Reveal(String),
}

pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, ExportError> {
    Ok(image.encode_png()?)
}

/// Writes the view's current raster to `path` as PNG.
///
/// Missing parent directories are created. Returns the absolute path written.
pub fn export_png(view: &QrCodeView, path: &Path) -> Result<PathBuf, ExportError> {
    let image = view.snapshot().ok_or(ExportError::NothingToExport)?;
    let bytes = encode_png(&image)?;

    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, &bytes).map_err(io_error)?;

    let written = std::path::absolute(path).map_err(io_error)?;
    log::info!("Exported QR code ({} bytes) to {}", bytes.len(), written.display());
    Ok(written)
}

/// Opens the platform file manager on the folder containing `path`.
#[cfg(not(target_arch = "wasm32"))]
pub fn reveal_in_file_manager(path: &Path) -> Result<(), ExportError> {
    use std::process::Command;

    #[cfg(target_os = "windows")]
    let spawned = Command::new("explorer")
        .arg(format!("/select,{}", path.display()))
        .spawn();

    #[cfg(target_os = "macos")]
    let spawned = Command::new("open").arg("-R").arg(path).spawn();

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let spawned = Command::new("xdg-open")
        .arg(path.parent().unwrap_or(path))
        .spawn();

    spawned
        .map(|_| ())
        .map_err(|err| ExportError::Reveal(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrview_render::RenderConfig;

    #[test]
    fn test_empty_view_has_nothing_to_export() {
        let view = QrCodeView::new();

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("empty.png");
        assert!(matches!(
            export_png(&view, &path),
            Err(ExportError::NothingToExport)
        ));
        assert!(!path.exists(), "nothing should be written");
    }

    #[test]
    fn test_export_writes_decodable_png() {
        let view = QrCodeView::with_config(RenderConfig::builder().data("export me").build());
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("qr.png");

        let written = export_png(&view, &path).expect("export should succeed");
        assert!(written.is_absolute());

        let decoded = image::open(&written).expect("written file is a PNG");
        assert_eq!((decoded.width(), decoded.height()), (512, 512));
    }

    #[test]
    fn test_encoded_png_matches_snapshot() {
        let view = QrCodeView::with_config(RenderConfig::builder().data("bytes").build());
        let snapshot = view.snapshot().expect("has raster");
        let bytes = encode_png(&snapshot).expect("encodes");
        let decoded = image::load_from_memory(&bytes)
            .expect("valid PNG")
            .to_rgba8();
        assert_eq!(&decoded, snapshot.pixels());
    }
}
