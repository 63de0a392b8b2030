//! Hole filling for binary masks
//!
//! Background is flooded from every border cell using 4-connectivity, the
//! dual of the 8-connected foreground. Whatever background the flood does
//! not reach is enclosed and becomes foreground.

use ndarray::Array2;
use rasterfeat_core::raster::Mask;
use rasterfeat_core::{Algorithm, Error, Result};
use tracing::debug;

const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Hole filling algorithm
#[derive(Debug, Clone, Default)]
pub struct FillHoles;

impl Algorithm for FillHoles {
    type Input = Mask;
    type Output = Mask;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "FillHoles"
    }

    fn description(&self) -> &'static str {
        "Fill background enclosed by foreground"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        fill_holes(&input)
    }
}

/// Set every background cell that is not 4-connected to the grid border.
pub fn fill_holes(mask: &Mask) -> Result<Mask> {
    let (rows, cols) = mask.shape();
    let data = mask.data();
    let mut outside = Array2::<bool>::from_elem((rows, cols), false);
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let seed = |r: usize, c: usize, outside: &mut Array2<bool>, stack: &mut Vec<(usize, usize)>| {
        if data[[r, c]] == 0 && !outside[[r, c]] {
            outside[[r, c]] = true;
            stack.push((r, c));
        }
    };

    for c in 0..cols {
        seed(0, c, &mut outside, &mut stack);
        if rows > 1 {
            seed(rows - 1, c, &mut outside, &mut stack);
        }
    }
    for r in 0..rows {
        seed(r, 0, &mut outside, &mut stack);
        if cols > 1 {
            seed(r, cols - 1, &mut outside, &mut stack);
        }
    }

    while let Some((r, c)) = stack.pop() {
        for &(dr, dc) in &NEIGHBORS_4 {
            let nr = r as isize + dr;
            let nc = c as isize + dc;
            if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                continue;
            }
            let (nr, nc) = (nr as usize, nc as usize);
            if data[[nr, nc]] == 0 && !outside[[nr, nc]] {
                outside[[nr, nc]] = true;
                stack.push((nr, nc));
            }
        }
    }

    let filled = outside.mapv(|o| (!o) as u8);
    let out = mask.derive(filled)?;
    debug!(
        filled = out.count_nonzero() - mask.count_nonzero(),
        "holes filled"
    );
    Ok(out)
}
