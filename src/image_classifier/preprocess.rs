//! Turns a decoded image into the network's input tensor.
//!
//! The pretrained weights were fit on inputs prepared exactly this way:
//! RGB, shorter edge resized to 256 (bilinear), center 224x224 crop, scaled to
//! `[0, 1]` and normalized per channel. Changing any step changes the scores.

use crate::error::ClassifierError;
use image::{imageops, DynamicImage, GenericImageView, RgbImage};
use tract_onnx::prelude::*;

pub const RESIZE_EDGE: u32 = 256;
pub const CROP_SIZE: u32 = 224;
pub const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Resizes so the shorter edge equals `edge`, keeping the aspect ratio.
/// The longer edge is `floor(edge * long / short)`.
pub fn resize_shorter_edge(image: &DynamicImage, edge: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let portrait = width <= height;
    let (short, long) = if portrait {
        (width, height)
    } else {
        (height, width)
    };

    if short == edge {
        return image.clone();
    }

    let new_long = (u64::from(edge) * u64::from(long) / u64::from(short)) as u32;
    let (new_width, new_height) = if portrait {
        (edge, new_long)
    } else {
        (new_long, edge)
    };

    image.resize_exact(new_width, new_height, imageops::FilterType::Triangle)
}

/// Offset of a centered window of `size` inside `dim`, rounding halves to even.
fn crop_offset(dim: u32, size: u32) -> u32 {
    (f64::from(dim.saturating_sub(size)) / 2.0).round_ties_even() as u32
}

pub fn center_crop(image: &DynamicImage, size: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    image.crop_imm(crop_offset(width, size), crop_offset(height, size), size, size)
}

/// NCHW tensor with each channel scaled to `[0, 1]` then normalized.
fn normalized_tensor(rgb: &RgbImage) -> Tensor {
    let (width, height) = rgb.dimensions();
    tract_ndarray::Array4::from_shape_fn(
        (1, 3, height as usize, width as usize),
        |(_, c, y, x)| {
            let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - CHANNEL_MEAN[c]) / CHANNEL_STD[c]
        },
    )
    .into_tensor()
}

pub fn preprocess(image: &DynamicImage) -> Result<Tensor, ClassifierError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ClassifierError::invalid_input(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }

    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let resized = resize_shorter_edge(&rgb, RESIZE_EDGE);
    let cropped = center_crop(&resized, CROP_SIZE);

    Ok(normalized_tensor(&cropped.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, Rgba};

    const PLANE: usize = (CROP_SIZE * CROP_SIZE) as usize;

    fn normalized(value: u8, channel: usize) -> f32 {
        (value as f32 / 255.0 - CHANNEL_MEAN[channel]) / CHANNEL_STD[channel]
    }

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_preprocess_shape() {
        let tensor = preprocess(&solid(640, 480, [0, 0, 0])).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_preprocess_normalizes_each_channel() {
        let tensor = preprocess(&solid(100, 100, [255, 0, 0])).unwrap();
        let slice = tensor.as_slice::<f32>().unwrap();

        assert!((slice[0] - normalized(255, 0)).abs() < 1e-5);
        assert!((slice[PLANE] - normalized(0, 1)).abs() < 1e-5);
        assert!((slice[2 * PLANE] - normalized(0, 2)).abs() < 1e-5);
    }

    #[test]
    fn test_preprocess_gray_value() {
        let tensor = preprocess(&solid(300, 300, [128, 128, 128])).unwrap();
        let slice = tensor.as_slice::<f32>().unwrap();

        for channel in 0..3 {
            let value = slice[channel * PLANE + 5 * 224 + 7];
            assert!((value - normalized(128, channel)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_preprocess_grayscale_becomes_three_channels() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(256, 256, Luma([100])));

        let tensor = preprocess(&image).unwrap();
        let slice = tensor.as_slice::<f32>().unwrap();

        for channel in 0..3 {
            assert!((slice[channel * PLANE] - normalized(100, channel)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_preprocess_drops_alpha() {
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            256,
            256,
            Rgba([10, 20, 30, 0]),
        ));

        let tensor = preprocess(&image).unwrap();
        let slice = tensor.as_slice::<f32>().unwrap();

        assert!((slice[0] - normalized(10, 0)).abs() < 1e-5);
        assert!((slice[PLANE] - normalized(20, 1)).abs() < 1e-5);
        assert!((slice[2 * PLANE] - normalized(30, 2)).abs() < 1e-5);
    }

    #[test]
    fn test_preprocess_rejects_empty_image() {
        let result = preprocess(&DynamicImage::new_rgb8(0, 0));

        assert!(matches!(result, Err(ClassifierError::InvalidInput { .. })));
    }

    #[test]
    fn test_resize_shorter_edge_landscape() {
        let resized = resize_shorter_edge(&solid(512, 300, [0, 0, 0]), RESIZE_EDGE);

        assert_eq!(resized.dimensions(), (436, 256));
    }

    #[test]
    fn test_resize_shorter_edge_portrait() {
        let resized = resize_shorter_edge(&solid(300, 600, [0, 0, 0]), RESIZE_EDGE);

        assert_eq!(resized.dimensions(), (256, 512));
    }

    #[test]
    fn test_resize_shorter_edge_upscales_small_images() {
        let resized = resize_shorter_edge(&solid(64, 32, [0, 0, 0]), RESIZE_EDGE);

        assert_eq!(resized.dimensions(), (512, 256));
    }

    #[test]
    fn test_crop_offset_rounds_half_to_even() {
        assert_eq!(crop_offset(256, 224), 16);
        assert_eq!(crop_offset(257, 224), 16);
        assert_eq!(crop_offset(259, 224), 18);
        assert_eq!(crop_offset(224, 224), 0);
    }

    #[test]
    fn test_center_crop_keeps_the_middle() {
        // Left half red, right half blue. The shorter edge is already 256 so
        // no resampling happens and the crop spans columns 144..368.
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(512, 256, |x, _| {
            if x < 256 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        }));

        let tensor = preprocess(&image).unwrap();
        let slice = tensor.as_slice::<f32>().unwrap();

        let red_at = |x: usize| slice[100 * 224 + x];
        assert!((red_at(0) - normalized(255, 0)).abs() < 1e-5);
        assert!((red_at(111) - normalized(255, 0)).abs() < 1e-5);
        assert!((red_at(112) - normalized(0, 0)).abs() < 1e-5);
        assert!((red_at(223) - normalized(0, 0)).abs() < 1e-5);
    }
}
