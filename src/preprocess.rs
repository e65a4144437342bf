//! Image preprocessing: decode, resize, normalize and score reduction.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

use crate::error::PredictError;

/// Side length the classifier was trained on.
pub const IMAGE_SIZE: u32 = 128;
pub const CHANNELS: usize = 3;

/// Input batch shape: (batch, height, width, channel).
pub const INPUT_SHAPE: [usize; 4] = [1, IMAGE_SIZE as usize, IMAGE_SIZE as usize, CHANNELS];

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PredictError> {
    if bytes.is_empty() {
        return Err(PredictError::Decode("empty upload".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| PredictError::Decode(e.to_string()))
}

/// Convert to RGB and stretch to `IMAGE_SIZE` x `IMAGE_SIZE`.
/// Images already at the target size are passed through untouched.
pub fn resize(image: &DynamicImage) -> RgbImage {
    let rgb = image.to_rgb8();
    if rgb.dimensions() == (IMAGE_SIZE, IMAGE_SIZE) {
        return rgb;
    }
    imageops::resize(&rgb, IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle)
}

/// Scale channels to [0, 1] and add the leading batch dimension.
pub fn to_batch(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    Array4::from_shape_fn(
        (1, height as usize, width as usize, CHANNELS),
        |(_, y, x, c)| image.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    )
}

/// Index of the highest score; ties go to the lowest index. NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb};
    use std::io::Cursor;

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode(b"not an image").unwrap_err();
        assert!(matches!(err, PredictError::Decode(_)));
        assert!(matches!(decode(&[]), Err(PredictError::Decode(_))));
    }

    #[test]
    fn resize_targets_fixed_size_for_any_input() {
        for (w, h) in [(1, 1), (300, 40), (128, 500)] {
            let image = decode(&png(w, h, [10, 20, 30])).unwrap();
            assert_eq!(resize(&image).dimensions(), (IMAGE_SIZE, IMAGE_SIZE));
        }
    }

    #[test]
    fn resize_is_identity_at_target_size() {
        let mut src = RgbImage::new(IMAGE_SIZE, IMAGE_SIZE);
        for (x, y, px) in src.enumerate_pixels_mut() {
            *px = Rgb([x as u8, y as u8, (x ^ y) as u8]);
        }
        let resized = resize(&DynamicImage::ImageRgb8(src.clone()));
        assert_eq!(resized, src);
    }

    #[test]
    fn batch_is_nhwc_and_normalized() {
        let mut img = RgbImage::from_pixel(IMAGE_SIZE, IMAGE_SIZE, Rgb([0, 0, 0]));
        img.put_pixel(5, 2, Rgb([255, 51, 0]));

        let batch = to_batch(&img);
        assert_eq!(batch.shape(), INPUT_SHAPE);
        assert_eq!(batch[[0, 2, 5, 0]], 1.0);
        assert!((batch[[0, 2, 5, 1]] - 0.2).abs() < 1e-6);
        assert_eq!(batch[[0, 2, 5, 2]], 0.0);
        assert!(batch.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
    }

    #[test]
    fn argmax_skips_nan_and_handles_empty() {
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.1]), Some(1));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }
}
