//! Raster data structures and operations

mod element;
mod geotransform;
mod grid;
mod neighborhood;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
pub use neighborhood::{reflect_index, Neighborhood};

/// Binary candidate mask: 1 = feature cell, 0 = background.
///
/// Any nonzero value is read as `true`.
pub type Mask = Raster<u8>;

/// Connected-component labels: 0 = background, regions are `1..=count`.
pub type LabelGrid = Raster<i32>;
