//! Candidate-cell thresholding
//!
//! A cell is a candidate iff `value > reference + offset`. The comparison is
//! strict: cells sitting exactly on the threshold stay background. NaN or
//! infinite samples on either side fail the whole stage instead of being
//! silently classified.

use ndarray::Array2;
use rasterfeat_core::raster::{Mask, Raster};
use rasterfeat_core::{Error, Result};
use tracing::debug;

/// What each cell is compared against
#[derive(Debug, Clone, Copy)]
pub enum Reference<'a> {
    /// Per-cell reference surface, e.g. the background mean
    Raster(&'a Raster<f64>),
    /// Same reference for every cell
    Constant(f64),
}

/// Mark cells where `raster > reference + offset`.
///
/// # Errors
/// - `ShapeMismatch` if a raster reference differs in shape
/// - `NumericDomainError` for the first non-finite sample in row-major order
/// - `InvalidParameter` for a non-finite offset
pub fn threshold(raster: &Raster<f64>, reference: Reference<'_>, offset: f64) -> Result<Mask> {
    if !offset.is_finite() {
        return Err(Error::InvalidParameter {
            name: "offset",
            value: offset.to_string(),
            reason: "offset must be finite".into(),
        });
    }
    if let Reference::Raster(surface) = reference {
        raster.ensure_same_shape(surface)?;
    }

    let (rows, cols) = raster.shape();
    let mut out = Array2::<u8>::zeros((rows, cols));

    for ((row, col), &value) in raster.data().indexed_iter() {
        let base = match reference {
            Reference::Raster(surface) => surface.data()[(row, col)],
            Reference::Constant(c) => c,
        };
        if !value.is_finite() {
            return Err(Error::NumericDomainError { row, col, value });
        }
        if !base.is_finite() {
            return Err(Error::NumericDomainError { row, col, value: base });
        }
        if value > base + offset {
            out[(row, col)] = 1;
        }
    }

    let mask = raster.derive(out)?;
    debug!(candidates = mask.count_nonzero(), offset, "threshold applied");
    Ok(mask)
}

/// Relief threshold against a reference surface of the same shape
pub fn threshold_above(raster: &Raster<f64>, reference: &Raster<f64>, offset: f64) -> Result<Mask> {
    threshold(raster, Reference::Raster(reference), offset)
}

/// Absolute threshold: `raster > value`
pub fn threshold_scalar(raster: &Raster<f64>, value: f64) -> Result<Mask> {
    threshold(raster, Reference::Constant(value), 0.0)
}
