//! Region aggregation and vectorization
//!
//! - **zonal**: per-label extremes, cell count and projected area
//! - **trace**: 8-connected outlines with holes on the cell-corner lattice
//! - **simplify**: Douglas-Peucker that refuses to break ring topology
//! - **vectorize**: one typed feature record per label

mod simplify;
mod trace;
mod vectorize;
mod zonal;

pub use simplify::simplify_polygon;
pub use trace::{footprints, trace_cells, trace_region};
pub use vectorize::{vectorize, Vectorize, VectorizeInput, VectorizeParams};
pub use zonal::{
    cell_area_km2, region_stats, region_stats_with, AreaModel, RegionStats, KM_PER_DEGREE,
};
