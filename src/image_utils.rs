use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3, ArrayView2};

use crate::error::{CompressionError, Result};

pub const CHANNELS: usize = 3;

/// Flattens an RGB image into a `(height * width, 3)` matrix, one row per
/// pixel in row-major order.
pub fn rgb_to_feature_matrix(image: &RgbImage) -> Array2<f64> {
    let raw = image.as_raw();
    let pixels = raw.len() / CHANNELS;

    Array2::from_shape_fn((pixels, CHANNELS), |(row, channel)| {
        raw[row * CHANNELS + channel] as f64
    })
}

/// Reshapes a `(height * width, 3)` matrix back into an image.
///
/// Values are clipped to `[0, 255]` and truncated toward zero. Also returns
/// how many channel values fell outside that range.
pub fn feature_matrix_to_rgb(
    matrix: ArrayView2<f64>,
    width: u32,
    height: u32,
) -> Result<(RgbImage, usize)> {
    let expected = (width as usize * height as usize, CHANNELS);
    if matrix.dim() != expected {
        return Err(CompressionError::InvalidParameter(format!(
            "feature matrix has shape {:?}, expected {:?} for a {}x{} image",
            matrix.dim(),
            expected,
            width,
            height
        )));
    }

    let saturated = matrix
        .iter()
        .filter(|&&v| v < 0.0 || v > 255.0)
        .count();

    let image = RgbImage::from_fn(width, height, |x, y| {
        let row = matrix.row(y as usize * width as usize + x as usize);
        Rgb([
            saturate_to_u8(row[0]),
            saturate_to_u8(row[1]),
            saturate_to_u8(row[2]),
        ])
    });

    Ok((image, saturated))
}

pub fn saturate_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0) as u8
}

/// `(height, width, 3)` view of an image as floats, for pixel-wise metrics.
pub fn rgb_to_array(image: &RgbImage) -> Array3<f64> {
    let (width, height) = image.dimensions();

    Array3::from_shape_fn(
        (height as usize, width as usize, CHANNELS),
        |(y, x, c)| image.get_pixel(x as u32, y as u32)[c] as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_matrix_follows_row_major_order() {
        let image = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, (x + 10 * y) as u8]));
        let matrix = rgb_to_feature_matrix(&image);

        assert_eq!(matrix.dim(), (6, 3));
        assert_eq!(matrix.row(0).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(matrix.row(2).to_vec(), vec![2.0, 0.0, 2.0]);
        assert_eq!(matrix.row(4).to_vec(), vec![1.0, 1.0, 11.0]);
    }

    #[test]
    fn test_feature_matrix_reshapes_back() {
        let image = RgbImage::from_fn(5, 4, |x, y| Rgb([x as u8 * 40, y as u8 * 60, 7]));
        let matrix = rgb_to_feature_matrix(&image);
        let (restored, saturated) = feature_matrix_to_rgb(matrix.view(), 5, 4).unwrap();

        assert_eq!(restored, image);
        assert_eq!(saturated, 0);
    }

    #[test]
    fn test_out_of_range_values_saturate() {
        let matrix =
            Array2::from_shape_vec((2, 3), vec![-12.0, 255.6, 300.0, 127.5, 0.4, 254.6]).unwrap();
        let (image, saturated) = feature_matrix_to_rgb(matrix.view(), 2, 1).unwrap();

        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 255, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([127, 0, 254]));
        assert_eq!(saturated, 3);
    }

    #[test]
    fn test_cast_truncates_toward_zero() {
        assert_eq!(saturate_to_u8(127.9999999), 127);
        assert_eq!(saturate_to_u8(0.999), 0);
        assert_eq!(saturate_to_u8(-0.4), 0);
        assert_eq!(saturate_to_u8(254.99), 254);
        assert_eq!(saturate_to_u8(255.0), 255);
        assert_eq!(saturate_to_u8(f64::NAN), 0);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let matrix = Array2::<f64>::zeros((5, 3));
        let result = feature_matrix_to_rgb(matrix.view(), 2, 2);

        assert!(matches!(result, Err(CompressionError::InvalidParameter(_))));
    }

    #[test]
    fn test_rgb_to_array_shape() {
        let image = RgbImage::from_pixel(4, 2, Rgb([1, 2, 3]));
        let arr = rgb_to_array(&image);

        assert_eq!(arr.dim(), (2, 4, 3));
        assert_eq!(arr[[1, 3, 2]], 3.0);
    }
}
