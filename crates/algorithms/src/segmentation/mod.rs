//! Candidate detection and region labeling
//!
//! - **threshold**: strict `value > reference + offset` candidate masks
//! - **label**: 8-connected component labeling in scan order

mod label;
mod threshold;

pub use label::{label, merge_map, Label};
pub use threshold::{threshold, threshold_above, threshold_scalar, Reference};
