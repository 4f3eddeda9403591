use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::{imageops, imageops::FilterType, ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::config::MediaConfig;

const WATERMARK_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("uploaded file is not a supported image: {0}")]
    InvalidImage(image::ImageError),
    #[error("watermark image unavailable: {0}")]
    Watermark(image::ImageError),
    #[error("failed to store avatar: {0}")]
    Store(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Overlays the configured watermark on `upload` and writes it as
/// `<avatar_dir>/<uuid>.png`. Returns the stored path.
pub async fn watermark_and_store(
    media: &MediaConfig,
    upload: Bytes,
) -> Result<PathBuf, WatermarkError> {
    tokio::fs::create_dir_all(&media.avatar_dir).await?;
    let output = media
        .avatar_dir
        .join(format!("{}.png", uuid::Uuid::new_v4()));

    let media = media.clone();
    let target = output.clone();
    tokio::task::spawn_blocking(move || {
        let composed = compose(&upload, &media.watermark_path, media.position, media.transparency)?;
        composed.save_with_format(&target, ImageFormat::Png)?;
        Ok::<_, WatermarkError>(())
    })
    .await??;

    debug!(path = %output.display(), "avatar stored");
    Ok(output)
}

fn compose(
    upload: &[u8],
    watermark_path: &Path,
    position: (i64, i64),
    transparency: f32,
) -> Result<RgbaImage, WatermarkError> {
    let mut base = image::load_from_memory(upload)
        .map_err(WatermarkError::InvalidImage)?
        .to_rgba8();

    let mut mark = image::open(watermark_path)
        .map_err(WatermarkError::Watermark)?
        .resize_exact(WATERMARK_SIZE, WATERMARK_SIZE, FilterType::Lanczos3)
        .to_rgba8();
    for pixel in mark.pixels_mut() {
        pixel[3] = (f32::from(pixel[3]) * transparency).round() as u8;
    }

    imageops::overlay(&mut base, &mark, position.0, position.1);
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn media_in(dir: &Path) -> MediaConfig {
        let watermark_path = dir.join("watermark.png");
        std::fs::write(&watermark_path, png_bytes(10, 10, [255, 0, 0, 255])).unwrap();
        MediaConfig {
            avatar_dir: dir.join("avatar"),
            watermark_path,
            ..MediaConfig::default()
        }
    }

    #[tokio::test]
    async fn stores_a_watermarked_png() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_in(dir.path());
        let upload = Bytes::from(png_bytes(200, 200, [0, 0, 255, 255]));

        let path = watermark_and_store(&media, upload).await.unwrap();

        assert!(path.starts_with(&media.avatar_dir));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        let stored = image::open(&path).unwrap().to_rgba8();
        assert_eq!(stored.dimensions(), (200, 200));
        // Outside the watermark area the avatar is untouched.
        assert_eq!(stored.get_pixel(10, 10), &Rgba([0, 0, 255, 255]));
        // Inside it, half-transparent red is blended over blue.
        let blended = stored.get_pixel(100, 100);
        assert!(blended[0] > 100 && blended[2] < 160, "got {blended:?}");
    }

    #[tokio::test]
    async fn rejects_uploads_that_are_not_images() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_in(dir.path());

        let err = watermark_and_store(&media, Bytes::from_static(b"not an image"))
            .await
            .unwrap_err();

        assert!(matches!(err, WatermarkError::InvalidImage(_)));
    }

    #[tokio::test]
    async fn missing_watermark_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaConfig {
            avatar_dir: dir.path().join("avatar"),
            watermark_path: dir.path().join("missing.png"),
            ..MediaConfig::default()
        };
        let upload = Bytes::from(png_bytes(20, 20, [0, 0, 0, 255]));

        let err = watermark_and_store(&media, upload).await.unwrap_err();
        assert!(matches!(err, WatermarkError::Watermark(_)));
    }
}
