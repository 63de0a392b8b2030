//! Binary dilation
//!
//! A cell becomes `true` when any cell under the structuring element is
//! `true`. Cells outside the grid count as background.

use ndarray::{Array2, ArrayView2};
use crate::maybe_rayon::*;
use rasterfeat_core::raster::Mask;
use rasterfeat_core::{Algorithm, Error, Result};

use super::element::StructuringElement;

/// Parameters for binary dilation
#[derive(Debug, Clone, Default)]
pub struct DilateParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = Mask;
    type Output = Mask;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Binary dilation over a structuring element"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate(&input, &params.element)
    }
}

/// 1D window reduction used by the separable square-element path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Sweep {
    /// Any set cell in the window (dilation)
    Any,
    /// Window fully inside the line and every cell set (erosion)
    All,
}

fn sweep_line(line: &[u8], radius: usize, op: Sweep) -> Vec<u8> {
    let n = line.len();
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0usize);
    for &v in line {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + (v != 0) as usize);
    }

    (0..n)
        .map(|i| match op {
            Sweep::Any => {
                let lo = i.saturating_sub(radius);
                let hi = (i + radius).min(n - 1);
                (prefix[hi + 1] - prefix[lo] > 0) as u8
            }
            Sweep::All => {
                if i < radius || i + radius >= n {
                    0
                } else {
                    (prefix[i + radius + 1] - prefix[i - radius] == 2 * radius + 1) as u8
                }
            }
        })
        .collect()
}

fn sweep_rows(data: ArrayView2<'_, u8>, radius: usize, op: Sweep) -> Result<Array2<u8>> {
    let (rows, cols) = data.dim();
    let out: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let line: Vec<u8> = data.row(row).iter().copied().collect();
            sweep_line(&line, radius, op)
        })
        .collect();
    Array2::from_shape_vec((rows, cols), out).map_err(|e| Error::Other(e.to_string()))
}

/// Square elements decompose into a row pass and a column pass
pub(super) fn separable(data: ArrayView2<'_, u8>, radius: usize, op: Sweep) -> Result<Array2<u8>> {
    let horizontal = sweep_rows(data, radius, op)?;
    let vertical = sweep_rows(horizontal.t(), radius, op)?;
    Ok(vertical.reversed_axes())
}

pub(super) fn dilate_array(data: ArrayView2<'_, u8>, element: &StructuringElement) -> Result<Array2<u8>> {
    if let StructuringElement::Square(r) = *element {
        return separable(data, r, Sweep::Any);
    }

    let (rows, cols) = data.dim();
    let offsets = element.offsets();
    let out: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let hit = offsets.iter().any(|&(dr, dc)| {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    nr >= 0
                        && nc >= 0
                        && (nr as usize) < rows
                        && (nc as usize) < cols
                        && data[[nr as usize, nc as usize]] != 0
                });
                *cell = hit as u8;
            }
            row_data
        })
        .collect();
    Array2::from_shape_vec((rows, cols), out).map_err(|e| Error::Other(e.to_string()))
}

/// Dilate a mask by a structuring element
pub fn dilate(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    element.validate()?;
    let out = dilate_array(mask.view(), element)?;
    mask.derive(out)
}
