pub mod font;
pub mod visualization;

use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::{CompressionResult, error::Result, metrics::QualityMetrics};

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub image_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub n_components: usize,
    pub explained_variance_ratio: Vec<f64>,
    pub retained_variance: f64,
    pub saturated_values: usize,
    pub quality: QualitySection,
}

#[derive(Debug, Serialize)]
pub struct QualitySection {
    /// `None` when the images are identical and PSNR is infinite.
    pub psnr_db: Option<f64>,
    pub mse: f64,
}

impl From<&QualityMetrics> for QualitySection {
    fn from(metrics: &QualityMetrics) -> Self {
        Self {
            psnr_db: metrics.psnr.is_finite().then_some(metrics.psnr),
            mse: metrics.mse,
        }
    }
}

impl JsonReport {
    pub fn new(result: &CompressionResult, metrics: &QualityMetrics) -> Self {
        let (width, height) = result.original.dimensions();

        Self {
            image_path: None,
            width,
            height,
            n_components: result.n_components(),
            explained_variance_ratio: result.model.explained_variance_ratio().to_vec(),
            retained_variance: result.retained_variance(),
            saturated_values: result.saturated_values,
            quality: metrics.into(),
        }
    }

    pub fn with_image_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.image_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(&path, self.to_json()?)?;
        info!("Saved report to {}", path.as_ref().display());
        Ok(())
    }
}
