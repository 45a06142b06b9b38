use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CompressionError, Result},
    image_utils::{CHANNELS, feature_matrix_to_rgb, rgb_to_feature_matrix},
    metrics::QualityMetrics,
    pca::{Pca, PcaModel},
};

pub mod error;
pub mod image_utils;
pub mod metrics;
pub mod pca;
pub mod report;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub image_path: PathBuf,
    pub n_components: usize,
    pub output_path: PathBuf,
    pub figure_path: PathBuf,
    pub report_path: Option<PathBuf>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("image.jpg"),
            n_components: 1,
            output_path: PathBuf::from("compressed_output.jpg"),
            figure_path: PathBuf::from("comparison.png"),
            report_path: None,
        }
    }
}

impl CompressionConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_components == 0 || self.n_components > CHANNELS {
            return Err(CompressionError::InvalidComponents {
                requested: self.n_components,
                max: CHANNELS,
            });
        }
        Ok(())
    }
}

/// Compresses one RGB image by keeping only the leading principal axes of
/// its pixel colors.
pub struct Compressor {
    original: RgbImage,
    config: CompressionConfig,
}

impl Compressor {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let original = image::open(&path)?.to_rgb8();
        info!(
            "Loaded {} ({}x{})",
            path.as_ref().display(),
            original.width(),
            original.height()
        );

        Ok(Self {
            original,
            config: CompressionConfig {
                image_path: path.as_ref().to_path_buf(),
                ..CompressionConfig::default()
            },
        })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            original: image.to_rgb8(),
            config: CompressionConfig::default(),
        }
    }

    /// Validates `config` and loads the image it points at.
    pub fn from_config(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(&config.image_path)?.with_config(config))
    }

    pub fn with_config(mut self, config: CompressionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn original(&self) -> &RgbImage {
        &self.original
    }

    pub fn compress(&self) -> Result<CompressionResult> {
        self.compress_with(self.config.n_components)
    }

    pub fn compress_with(&self, n_components: usize) -> Result<CompressionResult> {
        let (width, height) = self.original.dimensions();

        let features = rgb_to_feature_matrix(&self.original);
        let (model, projected) = Pca::new(n_components).fit_transform(features.view())?;
        let restored = model.inverse_transform(projected.view())?;
        let (reconstructed, saturated_values) =
            feature_matrix_to_rgb(restored.view(), width, height)?;

        if saturated_values > 0 {
            warn!(
                "{} reconstructed channel values fell outside [0, 255] and were saturated",
                saturated_values
            );
        }

        let result = CompressionResult {
            original: self.original.clone(),
            reconstructed,
            model,
            saturated_values,
        };

        info!(
            "Compressed {}x{} image with n_components={} ({:.2}% variance retained)",
            width,
            height,
            n_components,
            result.retained_variance() * 100.0
        );

        Ok(result)
    }
}

/// Decodes `image_path` and returns `(original, reconstructed)` using
/// `n_components` principal axes.
pub fn pca_compression<P: AsRef<Path>>(
    image_path: P,
    n_components: usize,
) -> Result<(RgbImage, RgbImage)> {
    let result = Compressor::new(image_path)?.compress_with(n_components)?;
    Ok((result.original, result.reconstructed))
}

#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub original: RgbImage,
    pub reconstructed: RgbImage,
    pub model: PcaModel,
    /// Channel values that had to be clamped into `[0, 255]`.
    pub saturated_values: usize,
}

impl CompressionResult {
    pub fn n_components(&self) -> usize {
        self.model.n_components()
    }

    /// Fraction of the pixel color variance kept by the retained axes.
    pub fn retained_variance(&self) -> f64 {
        self.model.explained_variance_ratio().sum()
    }

    pub fn metrics(&self) -> Result<QualityMetrics> {
        QualityMetrics::compute(&self.original, &self.reconstructed)
    }

    /// Encodes the reconstructed image; the format follows the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.reconstructed.save(&path)?;
        info!("Saved compressed image to {}", path.as_ref().display());
        Ok(())
    }
}
