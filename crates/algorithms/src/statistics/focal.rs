//! Moving-window (focal) means with mirror boundary extension
//!
//! The background estimate for relief thresholding is the mean over a
//! `(2r+1) x (2r+1)` square centered on each cell. Cells near the edge see
//! a mirrored copy of the interior (`d c b a | a b c d | d c b a`), so the
//! window never shrinks and never mixes in padding values. A NaN anywhere
//! in a window makes that output cell NaN.
//!
//! Sums are taken relative to the first finite cell of the raster, so a
//! window of equal values sums to exactly zero and its mean is exactly
//! that value.

use ndarray::{Array2, ArrayView2};
use crate::maybe_rayon::*;
use rasterfeat_core::raster::{reflect_index, Raster};
use rasterfeat_core::{Algorithm, Error, Result};
use tracing::debug;

/// Largest accepted window radius, in cells
pub const MAX_WINDOW_RADIUS: usize = 4096;

/// Parameters for the background estimator
#[derive(Debug, Clone)]
pub struct BackgroundParams {
    /// Window radius in cells (window side = 2*radius + 1)
    pub radius: usize,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

/// Background estimator
#[derive(Debug, Clone, Default)]
pub struct Background;

impl Algorithm for Background {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = BackgroundParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Background"
    }

    fn description(&self) -> &'static str {
        "Square moving-window mean with reflect boundary"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        uniform_mean(&input, params.radius)
    }
}

/// Convert a physical window distance into a cell radius.
///
/// `distance / cell_size` rounded to the nearest integer, never below 1.
pub fn window_radius(distance: f64, cell_size: f64) -> Result<usize> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(Error::InvalidWindowSize {
            value: distance.to_string(),
            reason: "window distance must be positive and finite".into(),
        });
    }
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(Error::InvalidWindowSize {
            value: cell_size.to_string(),
            reason: "cell size must be positive and finite".into(),
        });
    }

    let cells = (distance / cell_size).round().max(1.0);
    if cells > MAX_WINDOW_RADIUS as f64 {
        return Err(Error::InvalidWindowSize {
            value: format!("{} cells", cells),
            reason: format!("radius exceeds {}", MAX_WINDOW_RADIUS),
        });
    }
    Ok(cells as usize)
}

pub(crate) fn validate_radius(radius: usize) -> Result<()> {
    if radius == 0 {
        return Err(Error::InvalidWindowSize {
            value: "0".into(),
            reason: "window radius must be at least 1".into(),
        });
    }
    if radius > MAX_WINDOW_RADIUS {
        return Err(Error::InvalidWindowSize {
            value: radius.to_string(),
            reason: format!("radius exceeds {}", MAX_WINDOW_RADIUS),
        });
    }
    Ok(())
}

/// Sum over the `(2r+1)²` window of every cell, reflect boundary.
///
/// Separable: a horizontal pass then a vertical pass, each output cell
/// summed left-to-right / top-to-bottom, so the result does not depend on
/// how rows are scheduled.
pub(crate) fn box_sum_reflect(data: ArrayView2<'_, f64>, radius: usize) -> Result<Array2<f64>> {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { width: cols, height: rows });
    }
    let r = radius as isize;

    let horizontal: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let line = data.row(row);
            let mut out = vec![0.0; cols];
            for (col, cell) in out.iter_mut().enumerate() {
                let mut sum = 0.0;
                for dc in -r..=r {
                    sum += line[reflect_index(col as isize + dc, cols)];
                }
                *cell = sum;
            }
            out
        })
        .collect();
    let horizontal = Array2::from_shape_vec((rows, cols), horizontal)
        .map_err(|e| Error::Other(e.to_string()))?;

    let vertical: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut out = vec![0.0; cols];
            for dr in -r..=r {
                let src = horizontal.row(reflect_index(row as isize + dr, rows));
                for (cell, &v) in out.iter_mut().zip(src.iter()) {
                    *cell += v;
                }
            }
            out
        })
        .collect();

    Array2::from_shape_vec((rows, cols), vertical).map_err(|e| Error::Other(e.to_string()))
}

/// Local mean over a square window of side `2*radius + 1`.
///
/// # Errors
/// `InvalidWindowSize` when `radius` is 0 or above [`MAX_WINDOW_RADIUS`],
/// `InvalidDimensions` for an empty raster.
pub fn uniform_mean(raster: &Raster<f64>, radius: usize) -> Result<Raster<f64>> {
    validate_radius(radius)?;

    let n = ((2 * radius + 1) * (2 * radius + 1)) as f64;
    let anchor = raster.data().iter().copied().find(|v| v.is_finite()).unwrap_or(0.0);
    let shifted = raster.data().mapv(|v| v - anchor);
    let sums = box_sum_reflect(shifted.view(), radius)?;
    let mut output = raster.derive(sums.mapv(|s| s / n + anchor))?;
    output.set_nodata(Some(f64::NAN));

    debug!(radius, rows = raster.rows(), cols = raster.cols(), "background mean computed");
    Ok(output)
}

/// Background for a physical window distance, using the raster's cell size
pub fn background_for_distance(raster: &Raster<f64>, distance: f64) -> Result<Raster<f64>> {
    let radius = window_radius(distance, raster.cell_size())?;
    uniform_mean(raster, radius)
}
