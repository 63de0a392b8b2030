//! End-to-end feature extraction
//!
//! `run` chains the stages on one borrowed raster: background mean,
//! threshold, cleanup, labeling and vectorization. Every intermediate
//! layer is returned so callers can inspect or persist it.

use std::path::Path;

use rasterfeat_core::raster::{LabelGrid, Mask, Raster};
use rasterfeat_core::{Algorithm, Error, FeatureCollection, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::morphology::{clean, CleanupParams};
use crate::regions::{vectorize, VectorizeParams};
use crate::segmentation::{label, threshold, Reference};
use crate::statistics::{uniform_mean, window_radius};

/// How candidate cells are selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThresholdMode {
    /// `value > local mean + offset`, mean over a square window reaching
    /// `distance` map units from each cell (about `2 * distance` wide)
    Background { distance: f64, offset: f64 },
    /// `value > value`
    Absolute { value: f64 },
}

impl Default for ThresholdMode {
    fn default() -> Self {
        ThresholdMode::Background {
            distance: 0.25,
            offset: 500.0,
        }
    }
}

/// Parameters for the whole pipeline, loadable from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub threshold: ThresholdMode,
    pub cleanup: CleanupParams,
    pub vectorize: VectorizeParams,
}

impl PipelineParams {
    /// Parse parameters from a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read parameters from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Every layer produced by [`run`]
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Local mean surface, absent in absolute mode
    pub background: Option<Raster<f64>>,
    /// Cells passing the threshold
    pub candidates: Mask,
    /// Candidates after cleanup
    pub cleaned: Mask,
    /// Region ids, 0 for background
    pub labels: LabelGrid,
    /// Number of regions
    pub count: usize,
    /// One record per region, in id order
    pub features: FeatureCollection,
}

/// Pipeline algorithm
#[derive(Debug, Clone, Default)]
pub struct Pipeline;

impl Algorithm for Pipeline {
    type Input = Raster<f64>;
    type Output = PipelineOutput;
    type Params = PipelineParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Pipeline"
    }

    fn description(&self) -> &'static str {
        "Threshold, clean, label and vectorize positive relief features"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        run(&input, &params)
    }
}

/// Run every stage on `raster`.
pub fn run(raster: &Raster<f64>, params: &PipelineParams) -> Result<PipelineOutput> {
    let (background, candidates) = match params.threshold {
        ThresholdMode::Background { distance, offset } => {
            let radius = window_radius(distance, raster.cell_size())?;
            debug!(distance, radius, "estimating background");
            let background = uniform_mean(raster, radius)?;
            let candidates = threshold(raster, Reference::Raster(&background), offset)?;
            (Some(background), candidates)
        }
        ThresholdMode::Absolute { value } => {
            let candidates = threshold(raster, Reference::Constant(value), 0.0)?;
            (None, candidates)
        }
    };

    let cleaned = clean(&candidates, &params.cleanup)?;
    let (labels, count) = label(&cleaned)?;
    let records = vectorize(raster, &labels, count, &params.vectorize)?;

    let mut features = FeatureCollection::new(raster.crs().cloned());
    for record in records {
        features.push(record);
    }

    info!(
        candidates = candidates.count_nonzero(),
        cleaned = cleaned.count_nonzero(),
        regions = count,
        "feature extraction finished"
    );

    Ok(PipelineOutput {
        background,
        candidates,
        cleaned,
        labels,
        count,
        features,
    })
}
