//! Majority (mode) filter for binary masks
//!
//! Each cell takes the majority value of its `(2r+1)²` window, reflecting
//! at the grid edges the same way the background mean does. A tie cannot
//! happen for an odd cell count, but a cell is only set when the `true`
//! cells strictly outnumber the `false` ones.

use rasterfeat_core::raster::Mask;
use rasterfeat_core::{Algorithm, Error, Result};
use tracing::debug;

use crate::statistics::focal::{box_sum_reflect, validate_radius};

/// Parameters for the majority filter
#[derive(Debug, Clone)]
pub struct MajorityParams {
    /// Window radius in cells
    pub radius: usize,
}

impl Default for MajorityParams {
    fn default() -> Self {
        Self { radius: 7 }
    }
}

/// Majority filter algorithm
#[derive(Debug, Clone, Default)]
pub struct Majority;

impl Algorithm for Majority {
    type Input = Mask;
    type Output = Mask;
    type Params = MajorityParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Majority"
    }

    fn description(&self) -> &'static str {
        "Binary majority filter over a square window with reflect boundary"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        majority(&input, params.radius)
    }
}

/// Replace every cell by the strict majority of its square window.
///
/// # Errors
/// `InvalidWindowSize` for radius 0 or above the window limit,
/// `InvalidDimensions` for an empty mask.
pub fn majority(mask: &Mask, radius: usize) -> Result<Mask> {
    validate_radius(radius)?;

    let n = (2 * radius + 1) * (2 * radius + 1);
    let ones = mask.view().mapv(|v| if v != 0 { 1.0 } else { 0.0 });
    let counts = box_sum_reflect(ones.view(), radius)?;
    let out = counts.mapv(|c| (2 * (c as usize) > n) as u8);

    let out = mask.derive(out)?;
    debug!(
        radius,
        before = mask.count_nonzero(),
        after = out.count_nonzero(),
        "majority filter applied"
    );
    Ok(out)
}
