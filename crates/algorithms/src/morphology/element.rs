//! Structuring element definitions for morphological operations
//!
//! A structuring element defines the neighborhood shape used in
//! erosion, dilation, and closing. `Square` is the 8-connected element.

use rasterfeat_core::raster::Neighborhood;
use rasterfeat_core::{Error, Result};

use crate::statistics::MAX_WINDOW_RADIUS;

/// Shape of a structuring element for morphological operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuringElement {
    /// Square element of given radius (side = 2*radius + 1), 8-connected
    Square(usize),
    /// Cross (plus-shaped) element of given radius, 4-connected
    Cross(usize),
    /// Disk element of given radius
    Disk(usize),
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Square(1)
    }
}

impl StructuringElement {
    /// Reject zero and oversized radii
    pub fn validate(&self) -> Result<()> {
        let r = self.radius();
        if r == 0 {
            return Err(Error::InvalidWindowSize {
                value: "0".to_string(),
                reason: "structuring element radius must be at least 1".to_string(),
            });
        }
        if r > MAX_WINDOW_RADIUS {
            return Err(Error::InvalidWindowSize {
                value: r.to_string(),
                reason: format!("structuring element radius exceeds {}", MAX_WINDOW_RADIUS),
            });
        }
        Ok(())
    }

    /// Get the radius of the structuring element
    pub fn radius(&self) -> usize {
        match self {
            StructuringElement::Square(r)
            | StructuringElement::Cross(r)
            | StructuringElement::Disk(r) => *r,
        }
    }

    /// Compute (dr, dc) offsets relative to center for all active cells
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        match self {
            StructuringElement::Square(r) => Neighborhood::Square(*r).offsets(),
            StructuringElement::Disk(r) => Neighborhood::Circle(*r).offsets(),
            StructuringElement::Cross(r) => {
                let r = *r as isize;
                let mut offsets = Vec::new();
                for d in -r..=r {
                    offsets.push((d, 0));
                    if d != 0 {
                        offsets.push((0, d));
                    }
                }
                offsets
            }
        }
    }
}
