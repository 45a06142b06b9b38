use std::fmt;

use image::RgbImage;
use ndarray_stats::{DeviationExt, errors::{MultiInputError, ShapeMismatch}};
use serde::Serialize;

use crate::{error::Result, image_utils::rgb_to_array};

/// Peak value of an 8-bit channel.
pub const DATA_RANGE: f64 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityMetrics {
    /// Infinite when the two images are identical.
    pub psnr: f64,
    pub mse: f64,
}

impl QualityMetrics {
    pub fn compute(reference: &RgbImage, test: &RgbImage) -> Result<Self> {
        Ok(Self {
            psnr: peak_signal_to_noise_ratio(reference, test)?,
            mse: mean_squared_error(reference, test)?,
        })
    }

    pub fn is_lossless(&self) -> bool {
        self.mse == 0.0
    }
}

/// The two summary lines of a run: `PSNR: <v> dB` and `MSE: <v>`.
impl fmt::Display for QualityMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PSNR: {:.2} dB", self.psnr)?;
        write!(f, "MSE: {:.2}", self.mse)
    }
}

fn check_dimensions(reference: &RgbImage, test: &RgbImage) -> Result<()> {
    if reference.dimensions() != test.dimensions() {
        let (rw, rh) = reference.dimensions();
        let (tw, th) = test.dimensions();
        return Err(MultiInputError::ShapeMismatch(ShapeMismatch {
            first_shape: vec![rh as usize, rw as usize, 3],
            second_shape: vec![th as usize, tw as usize, 3],
        })
        .into());
    }
    Ok(())
}

/// Mean of the squared differences over every channel of every pixel.
pub fn mean_squared_error(reference: &RgbImage, test: &RgbImage) -> Result<f64> {
    check_dimensions(reference, test)?;
    Ok(rgb_to_array(reference).mean_sq_err(&rgb_to_array(test))?)
}

/// `10 * log10(255^2 / MSE)` in decibels.
pub fn peak_signal_to_noise_ratio(reference: &RgbImage, test: &RgbImage) -> Result<f64> {
    check_dimensions(reference, test)?;
    Ok(rgb_to_array(reference).peak_signal_to_noise_ratio(&rgb_to_array(test), DATA_RANGE)?)
}
