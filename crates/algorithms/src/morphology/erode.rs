//! Binary erosion
//!
//! A cell stays `true` only when every cell under the structuring element
//! is `true`. Cells outside the grid count as background, so any window
//! reaching past the edge erodes the cell.

use ndarray::{Array2, ArrayView2};
use crate::maybe_rayon::*;
use rasterfeat_core::raster::Mask;
use rasterfeat_core::{Algorithm, Error, Result};

use super::dilate::{separable, Sweep};
use super::element::StructuringElement;

/// Parameters for binary erosion
#[derive(Debug, Clone, Default)]
pub struct ErodeParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = Mask;
    type Output = Mask;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Binary erosion over a structuring element"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        erode(&input, &params.element)
    }
}

pub(super) fn erode_array(data: ArrayView2<'_, u8>, element: &StructuringElement) -> Result<Array2<u8>> {
    if let StructuringElement::Square(r) = *element {
        return separable(data, r, Sweep::All);
    }

    let (rows, cols) = data.dim();
    let offsets = element.offsets();
    let radius = element.radius() as isize;

    let out: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];
            let r = row as isize;
            for (col, cell) in row_data.iter_mut().enumerate() {
                let c = col as isize;
                if r - radius < 0
                    || r + radius >= rows as isize
                    || c - radius < 0
                    || c + radius >= cols as isize
                {
                    continue;
                }
                let all = offsets
                    .iter()
                    .all(|&(dr, dc)| data[[(r + dr) as usize, (c + dc) as usize]] != 0);
                *cell = all as u8;
            }
            row_data
        })
        .collect();
    Array2::from_shape_vec((rows, cols), out).map_err(|e| Error::Other(e.to_string()))
}

/// Erode a mask by a structuring element
pub fn erode(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    element.validate()?;
    let out = erode_array(mask.view(), element)?;
    mask.derive(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterfeat_core::Raster;

    fn block(rows: usize, cols: usize, r0: usize, r1: usize, c0: usize, c1: usize) -> Mask {
        let mut m: Mask = Raster::new(rows, cols);
        for r in r0..r1 {
            for c in c0..c1 {
                m.set(r, c, 1).unwrap();
            }
        }
        m
    }

    #[test]
    fn test_erode_block_shrinks() {
        let out = erode(&block(9, 9, 2, 7, 2, 7), &StructuringElement::Square(1)).unwrap();
        assert_eq!(out.count_nonzero(), 9);
        assert_eq!(out.get(4, 4).unwrap(), 1);
        assert_eq!(out.get(2, 2).unwrap(), 0);
    }

    #[test]
    fn test_erode_full_grid_loses_border() {
        let out = erode(&block(5, 5, 0, 5, 0, 5), &StructuringElement::Square(1)).unwrap();
        assert_eq!(out.count_nonzero(), 9);
        assert_eq!(out.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_erode_cross_keeps_plus_center() {
        let mut m: Mask = Raster::new(5, 5);
        for &(r, c) in &[(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)] {
            m.set(r, c, 1).unwrap();
        }
        let out = erode(&m, &StructuringElement::Cross(1)).unwrap();
        assert_eq!(out.count_nonzero(), 1);
        assert_eq!(out.get(2, 2).unwrap(), 1);
    }

    #[test]
    fn test_erode_is_anti_extensive() {
        let m = block(8, 8, 1, 6, 2, 8);
        let out = erode(&m, &StructuringElement::Disk(1)).unwrap();
        for (a, b) in out.data().iter().zip(m.data().iter()) {
            assert!(*a <= *b);
        }
    }

    #[test]
    fn test_invalid_element() {
        let m = block(3, 3, 0, 3, 0, 3);
        assert!(matches!(
            erode(&m, &StructuringElement::Square(0)),
            Err(Error::InvalidWindowSize { .. })
        ));
    }
}
