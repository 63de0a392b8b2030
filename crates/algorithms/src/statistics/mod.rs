//! Local statistics over raster windows
//!
//! - **focal**: reflect-boundary moving-window mean used as the background
//!   surface for relief thresholding

pub mod focal;

pub use focal::{
    background_for_distance, uniform_mean, window_radius, Background, BackgroundParams,
    MAX_WINDOW_RADIUS,
};
