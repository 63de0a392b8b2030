//! Connected-component labeling (8-connectivity)
//!
//! Components are numbered in the row-major order of their first cell:
//! the first candidate cell met scanning top-to-bottom, left-to-right gets
//! id 1, the first cell of the next unseen component gets id 2, and so on.
//! Ids are contiguous and background stays 0.

use ndarray::Array2;
use rasterfeat_core::raster::{LabelGrid, Mask};
use rasterfeat_core::{Algorithm, Error, Result};
use tracing::debug;

const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Labeling algorithm
#[derive(Debug, Clone, Default)]
pub struct Label;

impl Algorithm for Label {
    type Input = Mask;
    type Output = (LabelGrid, usize);
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Label"
    }

    fn description(&self) -> &'static str {
        "8-connected component labeling in scan order"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        label(&input)
    }
}

/// Label the 8-connected components of `mask`.
///
/// Returns the label grid (nodata = 0) and the number of components.
pub fn label(mask: &Mask) -> Result<(LabelGrid, usize)> {
    let (rows, cols) = mask.shape();
    let data = mask.data();
    let mut labels = Array2::<i32>::zeros((rows, cols));
    let mut count: i32 = 0;
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            if data[[r, c]] == 0 || labels[[r, c]] != 0 {
                continue;
            }

            count = count
                .checked_add(1)
                .ok_or_else(|| Error::Algorithm("more components than i32 label ids".into()))?;
            labels[[r, c]] = count;
            stack.push((r, c));

            while let Some((cr, cc)) = stack.pop() {
                for &(dr, dc) in &NEIGHBORS_8 {
                    let nr = cr as isize + dr;
                    let nc = cc as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if data[[nr, nc]] != 0 && labels[[nr, nc]] == 0 {
                        labels[[nr, nc]] = count;
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }

    let mut grid = mask.derive(labels)?;
    grid.set_nodata(Some(0));

    debug!(count, "labeled components");
    Ok((grid, count as usize))
}

/// For each label of `original`, the label of `merged` that absorbed it.
///
/// Index `i` of the result holds the merged id of original region `i`
/// (index 0 is background and always 0). A region whose cells were all
/// dropped from `merged` maps to 0.
///
/// # Errors
/// `ShapeMismatch` on differing grids; `Algorithm` if one original region
/// is split across several merged regions.
pub fn merge_map(original: &LabelGrid, merged: &LabelGrid) -> Result<Vec<i32>> {
    original.ensure_same_shape(merged)?;

    let max_id = original.data().iter().copied().max().unwrap_or(0).max(0) as usize;
    let mut map = vec![0i32; max_id + 1];

    for (&o, &m) in original.data().iter().zip(merged.data().iter()) {
        if o <= 0 || m <= 0 {
            continue;
        }
        let slot = &mut map[o as usize];
        if *slot == 0 {
            *slot = m;
        } else if *slot != m {
            return Err(Error::Algorithm(format!(
                "region {} spans merged regions {} and {}",
                o, slot, m
            )));
        }
    }

    Ok(map)
}
