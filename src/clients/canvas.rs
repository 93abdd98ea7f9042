//! Social preview image recompression onto a fixed canvas

use image::imageops::FilterType;
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Social preview canvas width (Open Graph recommended size)
pub const SOCIAL_WIDTH: u32 = 1200;
/// Social preview canvas height
pub const SOCIAL_HEIGHT: u32 = 630;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not process image: {0}")]
    Image(#[from] image::ImageError),

    #[error("image task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Top-left region of a `width`×`height` capture with the target aspect ratio
fn clip_region(width: u32, height: u32, target_width: u32, target_height: u32) -> (u32, u32) {
    let (w, h) = (u64::from(width), u64::from(height));
    let (tw, th) = (u64::from(target_width), u64::from(target_height));
    if w * th > h * tw {
        ((h * tw / th) as u32, height)
    } else {
        (width, (w * th / tw) as u32)
    }
}

/// Decode `bytes` and re-encode as a PNG of exactly `width`×`height`
///
/// A capture with a different aspect ratio is clipped from the top-left
/// corner before scaling, so the page is never stretched.
pub fn fit_to_canvas(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CanvasError> {
    let mut decoded = image::load_from_memory(bytes)?;
    let (clip_width, clip_height) = clip_region(decoded.width(), decoded.height(), width, height);
    if (clip_width, clip_height) != (decoded.width(), decoded.height()) {
        decoded = decoded.crop_imm(0, 0, clip_width.max(1), clip_height.max(1));
    }

    let resized = if decoded.width() == width && decoded.height() == height {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut out = Cursor::new(Vec::new());
    resized.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Recompress the PNG at `path` in place onto the fixed social canvas
pub async fn compress_social_image(path: &Path) -> Result<u64, CanvasError> {
    let io_err = |source| CanvasError::Io {
        path: path.to_path_buf(),
        source,
    };

    let original = tokio::fs::read(path).await.map_err(io_err)?;
    let original_len = original.len();
    let compressed =
        tokio::task::spawn_blocking(move || fit_to_canvas(&original, SOCIAL_WIDTH, SOCIAL_HEIGHT)).await??;
    tokio::fs::write(path, &compressed).await.map_err(io_err)?;

    info!(
        "Recompressed {} ({} -> {} bytes)",
        path.display(),
        original_len,
        compressed.len()
    );
    Ok(compressed.len() as u64)
}
