//! # rasterfeat core
//!
//! Core types, traits and I/O for the rasterfeat feature extractor.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced grid, plus the `Mask` and
//!   `LabelGrid` aliases passed between pipeline stages
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS`: Coordinate Reference System descriptor
//! - `FeatureRecord`: typed vector output record
//! - I/O for GeoTIFF rasters and GeoJSON features

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, LabelGrid, Mask, Raster, RasterElement};
pub use vector::{FeatureCollection, FeatureRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, LabelGrid, Mask, Raster, RasterElement};
    pub use crate::vector::{FeatureCollection, FeatureRecord};
    pub use crate::Algorithm;
}

/// Core trait for all pipeline stages.
///
/// Stages are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
