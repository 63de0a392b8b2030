//! Window shapes and boundary handling for neighborhood operations

/// Defines a neighborhood pattern around a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// Square neighborhood of given radius
    Square(usize),
    /// Circular neighborhood of given radius (in cells)
    Circle(usize),
}

impl Neighborhood {
    /// Get the radius of the neighborhood
    pub fn radius(&self) -> usize {
        match self {
            Neighborhood::Square(r) | Neighborhood::Circle(r) => *r,
        }
    }

    /// Check if a relative position is within this neighborhood
    pub fn contains(&self, dr: isize, dc: isize) -> bool {
        let r = self.radius() as isize;
        match self {
            Neighborhood::Square(_) => dr.abs() <= r && dc.abs() <= r,
            Neighborhood::Circle(_) => dr * dr + dc * dc <= r * r,
        }
    }

    /// Relative positions in this neighborhood, row-major
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius() as isize;
        let mut offsets = Vec::new();

        for dr in -r..=r {
            for dc in -r..=r {
                if self.contains(dr, dc) {
                    offsets.push((dr, dc));
                }
            }
        }

        offsets
    }
}

/// Map a possibly out-of-range index onto `0..len` by mirror reflection.
///
/// The edge sample is repeated (`d c b a | a b c d | d c b a`), and the
/// reflection keeps folding when the index lies more than one grid length
/// outside, so any window size stays well defined.
///
/// # Panics
/// Panics if `len == 0`.
pub fn reflect_index(index: isize, len: usize) -> usize {
    assert!(len > 0, "cannot reflect into an empty axis");
    let n = len as isize;
    let period = 2 * n;
    let m = index.rem_euclid(period);
    if m < n { m as usize } else { (period - 1 - m) as usize }
}
