use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageBuffer, Rgb};

use crate::config::ScreenshotConfig;
use crate::gfx::CapturedFrame;

/// First `<prefix><n>.<extension>` in the screenshot directory that does not
/// exist yet, counting from 0.
pub fn next_screenshot_path(config: &ScreenshotConfig) -> PathBuf {
    (0u32..)
        .map(|n| screenshot_path(config, n))
        .find(|path| !path.exists())
        .unwrap_or_else(|| screenshot_path(config, u32::MAX))
}

fn screenshot_path(config: &ScreenshotConfig, index: u32) -> PathBuf {
    config
        .directory
        .join(format!("{}{index}.{}", config.prefix, config.extension))
}

/// Encodes `frame` to `path`, picking the format from the extension.
///
/// Float channels are clamped to `[0, 1]` and quantized to 8 bits.
pub fn save_screenshot(frame: &CapturedFrame, path: &Path) -> Result<()> {
    let buffer: ImageBuffer<Rgb<f32>, Vec<f32>> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.rgb.clone())
            .context("captured frame size does not match its pixel data")?;

    DynamicImage::ImageRgb32F(buffer)
        .to_rgb8()
        .save(path)
        .with_context(|| format!("failed to save screenshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> ScreenshotConfig {
        ScreenshotConfig {
            directory: dir.to_path_buf(),
            ..ScreenshotConfig::default()
        }
    }

    // ── numbering ─────────────────────────────────────────────────────────

    #[test]
    fn empty_directory_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            next_screenshot_path(&config(dir.path())),
            dir.path().join("Screenshot0.jpg")
        );
    }

    #[test]
    fn skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("Screenshot{i}.jpg")), b"").unwrap();
        }
        assert_eq!(
            next_screenshot_path(&config(dir.path())),
            dir.path().join("Screenshot5.jpg")
        );
    }

    #[test]
    fn fills_the_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        for i in [0, 1, 3] {
            std::fs::write(dir.path().join(format!("Screenshot{i}.jpg")), b"").unwrap();
        }
        assert_eq!(
            next_screenshot_path(&config(dir.path())),
            dir.path().join("Screenshot2.jpg")
        );
    }

    // ── encoding ──────────────────────────────────────────────────────────

    #[test]
    fn saves_png_with_clamped_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let frame = CapturedFrame {
            width: 2,
            height: 1,
            rgb: vec![1.0, 0.0, 2.0, -1.0, 0.5, 1.0],
        };

        save_screenshot(&frame, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[2], 255);
    }

    #[test]
    fn saves_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = next_screenshot_path(&config(dir.path()));
        let frame = CapturedFrame {
            width: 4,
            height: 4,
            rgb: vec![0.25; 4 * 4 * 3],
        };

        save_screenshot(&frame, &path).unwrap();

        assert!(path.exists());
        assert_eq!(
            next_screenshot_path(&config(dir.path())),
            dir.path().join("Screenshot1.jpg")
        );
    }

    #[test]
    fn mismatched_pixel_data_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let frame = CapturedFrame {
            width: 4,
            height: 4,
            rgb: vec![0.0; 3],
        };
        assert!(save_screenshot(&frame, &dir.path().join("x.png")).is_err());
    }
}
