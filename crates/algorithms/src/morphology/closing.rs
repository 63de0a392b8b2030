//! Binary morphological closing (dilation followed by erosion)
//!
//! Bridges gaps narrower than the element and merges regions that sit
//! within `2k` cells of each other. The mask is padded by the element
//! radius before the two passes and cropped afterwards, so cells near the
//! edge are closed as if the grid continued with background. The result
//! never drops a `true` cell and grows monotonically with the radius.

use ndarray::{s, Array2};
use rasterfeat_core::raster::Mask;
use rasterfeat_core::{Algorithm, Error, Result};
use tracing::debug;

use super::dilate::dilate_array;
use super::element::StructuringElement;
use super::erode::erode_array;

/// Parameters for morphological closing
#[derive(Debug, Clone)]
pub struct ClosingParams {
    /// Square element radius in cells
    pub radius: usize,
}

impl Default for ClosingParams {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

/// Closing algorithm
#[derive(Debug, Clone, Default)]
pub struct Closing;

impl Algorithm for Closing {
    type Input = Mask;
    type Output = Mask;
    type Params = ClosingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Closing"
    }

    fn description(&self) -> &'static str {
        "Binary closing (dilation then erosion) with an 8-connected square element"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        closing(&input, params.radius)
    }
}

/// Close a mask with a `(2k+1) x (2k+1)` square element
pub fn closing(mask: &Mask, radius: usize) -> Result<Mask> {
    closing_with(mask, &StructuringElement::Square(radius))
}

/// Close a mask with an arbitrary structuring element
pub fn closing_with(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    element.validate()?;
    let pad = element.radius();
    let (rows, cols) = mask.shape();

    let mut padded = Array2::<u8>::zeros((rows + 2 * pad, cols + 2 * pad));
    padded
        .slice_mut(s![pad..pad + rows, pad..pad + cols])
        .assign(&mask.view());

    let dilated = dilate_array(padded.view(), element)?;
    let closed = erode_array(dilated.view(), element)?;
    let cropped = closed.slice(s![pad..pad + rows, pad..pad + cols]).to_owned();

    let out = mask.derive(cropped)?;
    debug!(
        radius = pad,
        before = mask.count_nonzero(),
        after = out.count_nonzero(),
        "closing applied"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterfeat_core::Raster;

    fn mask_from(rows: usize, cols: usize, cells: &[(usize, usize)]) -> Mask {
        let mut m: Mask = Raster::new(rows, cols);
        for &(r, c) in cells {
            m.set(r, c, 1).unwrap();
        }
        m
    }

    #[test]
    fn test_closing_bridges_gap() {
        // Two cells two apart on one row: gap of 1 closes with k = 1
        let m = mask_from(5, 7, &[(2, 2), (2, 4)]);
        let out = closing(&m, 1).unwrap();
        assert_eq!(out.get(2, 3).unwrap(), 1);
        assert_eq!(out.get(2, 2).unwrap(), 1);
        assert_eq!(out.get(2, 4).unwrap(), 1);
        assert_eq!(out.get(1, 3).unwrap(), 0);
    }

    #[test]
    fn test_closing_is_extensive_at_edges() {
        let m = mask_from(4, 4, &[(0, 0), (3, 3), (0, 3)]);
        for k in 1..4 {
            let out = closing(&m, k).unwrap();
            for (o, i) in out.data().iter().zip(m.data().iter()) {
                assert!(*o >= *i, "k = {} dropped a cell", k);
            }
        }
    }

    #[test]
    fn test_closing_monotone_in_radius() {
        let m = mask_from(12, 12, &[(1, 1), (1, 5), (6, 6), (10, 2), (10, 10)]);
        let mut previous = closing(&m, 1).unwrap();
        for k in 2..5 {
            let out = closing(&m, k).unwrap();
            for (o, p) in out.data().iter().zip(previous.data().iter()) {
                assert!(*o >= *p, "closing not monotone at k = {}", k);
            }
            previous = out;
        }
    }

    #[test]
    fn test_closing_far_cells_untouched() {
        let m = mask_from(9, 9, &[(0, 0), (8, 8)]);
        let out = closing(&m, 1).unwrap();
        assert_eq!(out.count_nonzero(), 2);
    }

    #[test]
    fn test_closing_zero_radius_rejected() {
        let m = mask_from(3, 3, &[(1, 1)]);
        assert!(matches!(closing(&m, 0), Err(Error::InvalidWindowSize { .. })));
    }

    #[test]
    fn test_algorithm_trait() {
        let m = mask_from(3, 5, &[(1, 1), (1, 3)]);
        let out = Closing.execute_default(m).unwrap();
        assert_eq!(out.get(1, 2).unwrap(), 1);
    }
}
