//! Binary morphology for candidate masks
//!
//! - **Dilation / erosion**: grow or shrink the mask by a structuring element
//! - **Closing**: dilation then erosion on a padded grid
//! - **Majority**: mode filter that removes speckle
//! - **Fill holes**: set background enclosed by foreground
//! - **Cleanup**: the three cleanup stages in a configurable order

mod cleanup;
mod closing;
mod dilate;
mod element;
mod erode;
mod fill_holes;
mod majority;

pub use cleanup::{clean, Cleanup, CleanupParams, CleanupStage};
pub use closing::{closing, closing_with, Closing, ClosingParams};
pub use dilate::{dilate, Dilate, DilateParams};
pub use element::StructuringElement;
pub use erode::{erode, Erode, ErodeParams};
pub use fill_holes::{fill_holes, FillHoles};
pub use majority::{majority, Majority, MajorityParams};
