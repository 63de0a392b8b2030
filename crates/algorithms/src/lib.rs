//! # rasterfeat algorithms
//!
//! The stages of the raster-to-polygon feature extractor.
//!
//! ## Stages
//!
//! - **statistics**: reflect-boundary moving-window mean (background surface)
//! - **segmentation**: strict thresholding and 8-connected labeling
//! - **morphology**: majority denoise, closing, hole filling
//! - **regions**: per-region extremes, area and simplified outlines
//! - **pipeline**: all of the above on one raster

mod maybe_rayon;

pub mod morphology;
pub mod pipeline;
pub mod regions;
pub mod segmentation;
pub mod statistics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::morphology::{
        clean, closing, dilate, erode, fill_holes, majority, CleanupParams, CleanupStage,
        StructuringElement,
    };
    pub use crate::pipeline::{run, Pipeline, PipelineOutput, PipelineParams, ThresholdMode};
    pub use crate::regions::{
        cell_area_km2, region_stats, simplify_polygon, trace_region, vectorize, AreaModel,
        RegionStats, VectorizeParams,
    };
    pub use crate::segmentation::{label, merge_map, threshold, threshold_above, threshold_scalar, Reference};
    pub use crate::statistics::{background_for_distance, uniform_mean, window_radius};
    pub use rasterfeat_core::prelude::*;
}
