//! Raster image loading
//!
//! Decodes PNG/JPEG/BMP (anything the `image` crate can sniff) into an RGB
//! [`PixelGrid`], dropping alpha and widening to `f32`, with an optional
//! resize step controlled by a scale factor.

use std::path::Path;

use chromacloud_core::{Error, PixelGrid, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use log::{debug, warn};

use crate::error::IoError;

/// Interpolation used when the scale factor is not 1.0
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Load an image from disk as an RGB pixel grid, resized by `scale_factor`.
///
/// # Arguments
/// * `path` - Image file to decode; the format is guessed from its content
/// * `scale_factor` - Multiplier applied to both dimensions, truncated to integers
///
/// # Errors
/// * [`Error::ImageLoad`] if the file is missing, unreadable or not an image
/// * [`Error::InvalidScale`] if the scale is not a positive finite number or
///   the resized image would be narrower or shorter than one pixel
pub fn load_image<P: AsRef<Path>>(path: P, scale_factor: f32) -> Result<PixelGrid> {
    let path = path.as_ref();
    check_scale_factor(scale_factor)?;

    let image = image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| IoError::from_io(path, e))?
        .decode()
        .map_err(|e| IoError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    to_pixel_grid(image, scale_factor)
}

/// Decode an in-memory image buffer with the same rules as [`load_image`]
pub fn decode_rgb(bytes: &[u8], scale_factor: f32) -> Result<PixelGrid> {
    check_scale_factor(scale_factor)?;
    let image = image::load_from_memory(bytes).map_err(|e| IoError::Decode {
        path: "<memory>".into(),
        message: e.to_string(),
    })?;
    to_pixel_grid(image, scale_factor)
}

/// Compute the resized dimensions for `scale_factor`.
///
/// Both dimensions are multiplied and truncated toward zero; a factor of
/// exactly 1.0 leaves them untouched.
pub fn resize_dimensions(width: u32, height: u32, scale_factor: f32) -> Result<(u32, u32)> {
    check_scale_factor(scale_factor)?;
    if scale_factor == 1.0 {
        return Ok((width, height));
    }

    let scale = f64::from(scale_factor);
    let new_width = (f64::from(width) * scale) as u32;
    let new_height = (f64::from(height) * scale) as u32;
    if new_width < 1 || new_height < 1 {
        return Err(Error::InvalidScale {
            scale: scale_factor,
            reason: format!(
                "{}x{} image would shrink to {}x{}",
                width, height, new_width, new_height
            ),
        });
    }
    Ok((new_width, new_height))
}

fn check_scale_factor(scale_factor: f32) -> Result<()> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(Error::InvalidScale {
            scale: scale_factor,
            reason: "scale factor must be a positive finite number".to_string(),
        });
    }
    Ok(())
}

fn to_pixel_grid(image: DynamicImage, scale_factor: f32) -> Result<PixelGrid> {
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    let (new_width, new_height) = resize_dimensions(width, height, scale_factor)?;

    let rgb: RgbImage = if (new_width, new_height) == (width, height) {
        rgb
    } else {
        if scale_factor > 1.0 {
            warn!(
                "upscaling {}x{} image by {} to {}x{}; rendering cost grows with the square of the scale",
                width, height, scale_factor, new_width, new_height
            );
        }
        imageops::resize(&rgb, new_width, new_height, RESIZE_FILTER)
    };

    PixelGrid::from_rgb_bytes(rgb.width() as usize, rgb.height() as usize, rgb.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("chromacloud_io_{}_{}", std::process::id(), name))
    }

    fn write_rgb_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = temp_path(name);
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn test_load_native_size() {
        let path = write_rgb_png("native.png", 7, 5);
        let grid = load_image(&path, 1.0).unwrap();
        assert_eq!(grid.dim(), (5, 7, 3));
        assert_eq!(grid.channel(0)[[2, 6]], 6.0);
        assert_eq!(grid.channel(1)[[4, 0]], 4.0);
        assert_eq!(grid.channel(2)[[0, 0]], 128.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_half_scale_truncates() {
        // width 100, height 200
        let path = write_rgb_png("half.png", 100, 200);
        let grid = load_image(&path, 0.5).unwrap();
        assert_eq!(grid.width(), 50);
        assert_eq!(grid.height(), 100);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_resize_dimensions() {
        assert_eq!(resize_dimensions(100, 200, 1.0).unwrap(), (100, 200));
        assert_eq!(resize_dimensions(100, 200, 0.5).unwrap(), (50, 100));
        assert_eq!(resize_dimensions(15, 19, 0.1).unwrap(), (1, 1));
        assert_eq!(resize_dimensions(10, 4, 2.5).unwrap(), (25, 10));
    }

    #[test]
    fn test_degenerate_scale_rejected() {
        // 9 * 0.1 truncates to zero rows
        let result = resize_dimensions(15, 9, 0.1);
        assert!(matches!(result, Err(Error::InvalidScale { .. })));

        for scale in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                resize_dimensions(100, 100, scale),
                Err(Error::InvalidScale { .. })
            ));
        }
    }

    #[test]
    fn test_load_rejects_degenerate_scale() {
        let path = write_rgb_png("tiny.png", 4, 4);
        let result = load_image(&path, 0.2);
        assert!(matches!(result, Err(Error::InvalidScale { .. })));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_upscale_supported() {
        let path = write_rgb_png("upscale.png", 3, 2);
        let grid = load_image(&path, 2.0).unwrap();
        assert_eq!((grid.width(), grid.height()), (6, 4));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_image_load_error() {
        let path = temp_path("does_not_exist.png");
        let result = load_image(&path, 1.0);
        match result {
            Err(Error::ImageLoad { path: reported, reason }) => {
                assert_eq!(reported, path);
                assert_eq!(reason, "file not found");
            }
            other => panic!("expected ImageLoad error, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_file_is_image_load_error() {
        let path = temp_path("not_an_image.png");
        fs::write(&path, b"definitely not a png").unwrap();
        let result = load_image(&path, 1.0);
        assert!(matches!(result, Err(Error::ImageLoad { .. })));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_alpha_is_dropped() {
        let path = temp_path("rgba.png");
        let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0]));
        img.save_with_format(&path, ImageFormat::Png).unwrap();

        let grid = load_image(&path, 1.0).unwrap();
        assert_eq!(grid.channels(), 3);
        assert_eq!(grid.channel(0)[[1, 1]], 10.0);
        assert_eq!(grid.channel(1)[[1, 1]], 20.0);
        assert_eq!(grid.channel(2)[[1, 1]], 30.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_grayscale_expands_to_rgb() {
        let mut bytes = Vec::new();
        let img = GrayImage::from_pixel(3, 1, Luma([200]));
        DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let grid = decode_rgb(&bytes, 1.0).unwrap();
        assert_eq!(grid.dim(), (1, 3, 3));
        for c in 0..3 {
            assert_eq!(grid.channel(c)[[0, 2]], 200.0);
        }
    }

    #[test]
    fn test_decode_garbage_bytes() {
        let result = decode_rgb(&[0, 1, 2, 3], 1.0);
        assert!(matches!(result, Err(Error::ImageLoad { .. })));
    }
}
