//! Region records: attributes plus simplified outline
//!
//! Each label id becomes one [`FeatureRecord`]. Extremes and area come from
//! [`region_stats_with`]; the outline is traced on the cell-corner lattice
//! and simplified with a tolerance of one cell unless told otherwise.

use crate::maybe_rayon::*;
use rasterfeat_core::raster::{LabelGrid, Raster};
use rasterfeat_core::{Algorithm, Error, FeatureRecord, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::simplify::simplify_polygon;
use super::trace::{footprints, trace_cells};
use super::zonal::{region_stats_with, AreaModel};

/// Parameters for [`vectorize`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizeParams {
    /// Simplification tolerance in map units; `None` uses the cell size
    pub tolerance: Option<f64>,
    /// Area model for `area_km2`
    pub area_model: AreaModel,
}

/// Input bundle for the [`Vectorize`] algorithm
#[derive(Debug, Clone)]
pub struct VectorizeInput {
    pub raster: Raster<f64>,
    pub labels: LabelGrid,
    pub count: usize,
}

/// Vectorization algorithm
#[derive(Debug, Clone, Default)]
pub struct Vectorize;

impl Algorithm for Vectorize {
    type Input = VectorizeInput;
    type Output = Vec<FeatureRecord>;
    type Params = VectorizeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Vectorize"
    }

    fn description(&self) -> &'static str {
        "Per-region extremes, area and simplified outline"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        vectorize(&input.raster, &input.labels, input.count, &params)
    }
}

fn to_attribute(value: f64) -> Result<i32> {
    let truncated = value.trunc();
    if truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
        return Err(Error::Algorithm(format!(
            "value {} does not fit an integer attribute",
            value
        )));
    }
    Ok(truncated as i32)
}

/// One record per label id `1..=count`, in id order.
///
/// `deepest` is the region maximum and `shallowest` the minimum, both
/// truncated toward zero.
///
/// # Errors
/// Everything [`region_stats_with`] reports, plus `InvalidParameter` for a
/// bad tolerance and `Algorithm` if a label is not one connected part.
pub fn vectorize(
    raster: &Raster<f64>,
    labels: &LabelGrid,
    count: usize,
    params: &VectorizeParams,
) -> Result<Vec<FeatureRecord>> {
    let stats = region_stats_with(raster, labels, count, params.area_model)?;
    if stats.is_empty() {
        return Ok(Vec::new());
    }

    let tolerance = params.tolerance.unwrap_or_else(|| raster.cell_size());
    let cells = footprints(labels, count)?;

    let records = (0..count)
        .into_par_iter()
        .map(|i| -> Result<FeatureRecord> {
            let s = &stats[i];
            let outline = trace_cells(labels, s.raster_id, &cells[i])?;
            let geometry = simplify_polygon(&outline, tolerance)?;
            Ok(FeatureRecord {
                raster_id: s.raster_id,
                deepest: to_attribute(s.max)?,
                shallowest: to_attribute(s.min)?,
                area_km2: s.area_km2,
                geometry,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(features = records.len(), tolerance, "regions vectorized");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::Area;
    use rasterfeat_core::GeoTransform;

    use crate::segmentation::label;

    fn scene() -> (Raster<f64>, LabelGrid, usize) {
        // Two blobs on a 0.25 degree grid near the equator
        let transform = GeoTransform::new(10.0, 1.0, 0.25, -0.25);
        let mut raster = Raster::filled(8, 8, -4000.0);
        raster.set_transform(transform);
        let mut mask = raster.derive(ndarray::Array2::<u8>::zeros((8, 8))).unwrap();
        for r in 1..4 {
            for c in 1..4 {
                raster.set(r, c, -2500.5 - (r * c) as f64).unwrap();
                mask.set(r, c, 1).unwrap();
            }
        }
        for r in 5..7 {
            for c in 5..8 {
                raster.set(r, c, -3100.9).unwrap();
                mask.set(r, c, 1).unwrap();
            }
        }
        let (labels, count) = label(&mask).unwrap();
        (raster, labels, count)
    }

    #[test]
    fn test_records_in_id_order() {
        let (raster, labels, count) = scene();
        let records = vectorize(&raster, &labels, count, &VectorizeParams::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raster_id, 1);
        assert_eq!(records[1].raster_id, 2);

        // max -2501.5 and min -2509.5 truncate toward zero
        assert_eq!(records[0].deepest, -2501);
        assert_eq!(records[0].shallowest, -2509);
        assert_eq!(records[1].deepest, -3100);
        assert_eq!(records[1].shallowest, -3100);
    }

    #[test]
    fn test_square_blob_outline_exact() {
        let (raster, labels, count) = scene();
        let records = vectorize(&raster, &labels, count, &VectorizeParams::default()).unwrap();
        // A 3x3 block is already a rectangle: four corners survive
        let poly = &records[0].geometry;
        assert_eq!(poly.exterior().0.len(), 5);
        assert_relative_eq!(poly.unsigned_area(), 9.0 * 0.25 * 0.25, epsilon = 1e-12);
        assert!(records[0].area_km2 > 0.0);
    }

    #[test]
    fn test_empty_labels() {
        let mut raster = Raster::filled(3, 3, 0.0);
        raster.set_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0));
        let labels = raster.derive(ndarray::Array2::<i32>::zeros((3, 3))).unwrap();
        let records = vectorize(&raster, &labels, 0, &VectorizeParams::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_attribute_range() {
        assert_eq!(to_attribute(-0.9).unwrap(), 0);
        assert_eq!(to_attribute(12.7).unwrap(), 12);
        assert!(to_attribute(1e12).is_err());
    }

    #[test]
    fn test_algorithm_trait() {
        let (raster, labels, count) = scene();
        let records = Vectorize
            .execute_default(VectorizeInput { raster, labels, count })
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
