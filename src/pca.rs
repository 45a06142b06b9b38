use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{CompressionError, Result};

/// Principal component analysis over the rows of a feature matrix.
#[derive(Debug, Clone, Copy)]
pub struct Pca {
    n_components: usize,
}

/// Fitted state of a [`Pca`]: retained axes, the centering mean and the
/// variance each axis explains.
#[derive(Debug, Clone)]
pub struct PcaModel {
    /// Shape: (n_components, n_features). Rows are orthonormal.
    components: Array2<f64>,
    /// Shape: (n_features)
    mean: Array1<f64>,
    /// Shape: (n_components)
    explained_variance: Array1<f64>,
    total_variance: f64,
}

impl Pca {
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Fits the decomposition on `data`, one observation per row.
    ///
    /// `n_components` must lie in `1..=min(n_samples, n_features)`.
    pub fn fit(&self, data: ArrayView2<f64>) -> Result<PcaModel> {
        let (n_samples, n_features) = data.dim();

        if n_samples == 0 || n_features == 0 {
            return Err(CompressionError::InvalidParameter(
                "cannot fit PCA on an empty feature matrix".into(),
            ));
        }

        let max = n_samples.min(n_features);
        if self.n_components == 0 || self.n_components > max {
            return Err(CompressionError::InvalidComponents {
                requested: self.n_components,
                max,
            });
        }

        let mean = data.mean_axis(Axis(0)).ok_or_else(|| {
            CompressionError::InvalidParameter("feature matrix has no rows".into())
        })?;
        let centered = &data - &mean;

        let denominator = n_samples.saturating_sub(1).max(1) as f64;
        let covariance = centered.t().dot(&centered) / denominator;

        debug!(
            "PCA fit: {} samples x {} features, mean {:?}",
            n_samples, n_features, mean
        );

        let eigen = SymmetricEigen::new(DMatrix::from_fn(n_features, n_features, |i, j| {
            covariance[[i, j]]
        }));

        if eigen.eigenvalues.iter().any(|v| !v.is_finite())
            || eigen.eigenvectors.iter().any(|v| !v.is_finite())
        {
            return Err(CompressionError::DecompositionFailed(
                "eigen-decomposition produced non-finite values".into(),
            ));
        }

        let mut order = (0..n_features).collect::<Vec<_>>();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let mut components = Array2::zeros((self.n_components, n_features));
        for (row, &idx) in order.iter().take(self.n_components).enumerate() {
            let axis = eigen.eigenvectors.column(idx);

            // Flip so the largest-magnitude coordinate is positive.
            let pivot = (0..n_features)
                .max_by(|&a, &b| axis[a].abs().total_cmp(&axis[b].abs()))
                .unwrap_or(0);
            let sign = if axis[pivot] < 0.0 { -1.0 } else { 1.0 };

            for j in 0..n_features {
                components[[row, j]] = sign * axis[j];
            }
        }

        let explained_variance = order
            .iter()
            .take(self.n_components)
            .map(|&idx| eigen.eigenvalues[idx].max(0.0))
            .collect::<Array1<f64>>();
        let total_variance = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum::<f64>();

        debug!(
            "PCA eigenvalues (descending): {:?}",
            order.iter().map(|&i| eigen.eigenvalues[i]).collect::<Vec<_>>()
        );

        Ok(PcaModel {
            components,
            mean,
            explained_variance,
            total_variance,
        })
    }

    pub fn fit_transform(&self, data: ArrayView2<f64>) -> Result<(PcaModel, Array2<f64>)> {
        let model = self.fit(data)?;
        let projected = model.transform(data)?;
        Ok((model, projected))
    }
}

impl PcaModel {
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn explained_variance(&self) -> &Array1<f64> {
        &self.explained_variance
    }

    /// Fraction of the total variance carried by each retained axis. All zeros
    /// when the data has no variance.
    pub fn explained_variance_ratio(&self) -> Array1<f64> {
        if self.total_variance > 0.0 {
            self.explained_variance.mapv(|v| v / self.total_variance)
        } else {
            Array1::zeros(self.explained_variance.len())
        }
    }

    pub fn total_variance(&self) -> f64 {
        self.total_variance
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    /// Centers `data` and projects it onto the retained axes.
    pub fn transform(&self, data: ArrayView2<f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.n_features() {
            return Err(CompressionError::InvalidParameter(format!(
                "expected {} features, got {}",
                self.n_features(),
                data.ncols()
            )));
        }

        let centered = &data - &self.mean;
        Ok(centered.dot(&self.components.t()))
    }

    /// Maps projected rows back into feature space and re-adds the mean.
    pub fn inverse_transform(&self, projected: ArrayView2<f64>) -> Result<Array2<f64>> {
        if projected.ncols() != self.n_components() {
            return Err(CompressionError::InvalidParameter(format!(
                "expected {} components, got {}",
                self.n_components(),
                projected.ncols()
            )));
        }

        Ok(projected.dot(&self.components) + &self.mean)
    }
}
