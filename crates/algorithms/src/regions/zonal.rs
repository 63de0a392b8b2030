//! Per-region scalar attributes
//!
//! For every label id the aggregator reports the extreme raster values and
//! the projected area of the region's cells. Area on a geographic grid
//! shrinks with latitude, so each cell contributes
//! `(cell_size * 111.32)² * cos(lat)` square kilometres, evaluated at the
//! latitude of the cell center.

use rasterfeat_core::raster::{LabelGrid, Raster};
use rasterfeat_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kilometres per degree of arc on the sphere used for area estimates
pub const KM_PER_DEGREE: f64 = 111.32;

/// How cell size converts into area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaModel {
    /// Cell size in degrees, spherical Earth, area scaled by cos(latitude)
    #[default]
    Geographic,
    /// Cell size in metres, constant area per cell
    Planar,
}

/// Area in km² of one geographic cell centered at `latitude_deg`.
///
/// Never negative: latitudes past the poles contribute 0.
pub fn cell_area_km2(cell_size_deg: f64, latitude_deg: f64) -> f64 {
    let side = cell_size_deg * KM_PER_DEGREE;
    (side * side * latitude_deg.to_radians().cos()).max(0.0)
}

/// Attributes of one labeled region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    pub raster_id: i32,
    pub cell_count: usize,
    pub min: f64,
    pub max: f64,
    pub area_km2: f64,
}

/// Geographic-model region statistics, see [`region_stats_with`].
pub fn region_stats(raster: &Raster<f64>, labels: &LabelGrid, count: usize) -> Result<Vec<RegionStats>> {
    region_stats_with(raster, labels, count, AreaModel::Geographic)
}

/// One [`RegionStats`] per label id `1..=count`, in id order.
///
/// # Errors
/// - `ShapeMismatch` when the grids differ in shape
/// - `InvalidParameter` for non-square cells, a label outside `0..=count`
///   or an id in `1..=count` with no cells
/// - `NumericDomainError` for a NaN or infinite value inside a region
pub fn region_stats_with(
    raster: &Raster<f64>,
    labels: &LabelGrid,
    count: usize,
    model: AreaModel,
) -> Result<Vec<RegionStats>> {
    raster.ensure_same_shape(labels)?;
    let transform = raster.transform();
    if !transform.is_square() {
        return Err(Error::InvalidParameter {
            name: "transform",
            value: format!("{:?}", transform.to_gdal()),
            reason: "cells must be square and axis-aligned".into(),
        });
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let cell_size = transform.cell_size();
    let planar_area = cell_size * cell_size / 1.0e6;

    let mut stats: Vec<RegionStats> = (1..=count)
        .map(|id| RegionStats {
            raster_id: id as i32,
            cell_count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            area_km2: 0.0,
        })
        .collect();

    for ((row, col), &id) in labels.data().indexed_iter() {
        if id == 0 {
            continue;
        }
        if id < 0 || id as usize > count {
            return Err(Error::InvalidParameter {
                name: "labels",
                value: id.to_string(),
                reason: format!("label at ({}, {}) outside 0..={}", row, col, count),
            });
        }
        let value = raster.data()[(row, col)];
        if !value.is_finite() {
            return Err(Error::NumericDomainError { row, col, value });
        }

        let area = match model {
            AreaModel::Geographic => {
                let (_, lat) = transform.pixel_to_geo(col, row);
                cell_area_km2(cell_size, lat)
            }
            AreaModel::Planar => planar_area,
        };

        let entry = &mut stats[id as usize - 1];
        entry.cell_count += 1;
        entry.min = entry.min.min(value);
        entry.max = entry.max.max(value);
        entry.area_km2 += area;
    }

    if let Some(empty) = stats.iter().find(|s| s.cell_count == 0) {
        return Err(Error::InvalidParameter {
            name: "count",
            value: count.to_string(),
            reason: format!("label {} has no cells", empty.raster_id),
        });
    }

    debug!(regions = stats.len(), "region statistics computed");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rasterfeat_core::GeoTransform;

    fn grid(values: Vec<f64>, ids: Vec<i32>, rows: usize, cols: usize) -> (Raster<f64>, LabelGrid) {
        let transform = GeoTransform::new(-10.0, 10.0, 0.5, -0.5);
        let mut raster = Raster::from_vec(values, rows, cols).unwrap();
        raster.set_transform(transform);
        let mut labels = Raster::from_vec(ids, rows, cols).unwrap();
        labels.set_transform(transform);
        (raster, labels)
    }

    #[test]
    fn test_cell_area_equator_and_pole() {
        assert_relative_eq!(cell_area_km2(1.0, 0.0), 111.32 * 111.32, epsilon = 1e-9);
        assert_relative_eq!(cell_area_km2(1.0, 60.0), 111.32 * 111.32 * 0.5, epsilon = 1e-6);
        assert!(cell_area_km2(1.0, 90.0).abs() < 1e-9);
        assert_eq!(cell_area_km2(1.0, 120.0), 0.0);
    }

    #[test]
    fn test_min_max_count() {
        let (r, l) = grid(
            vec![-3000.0, -2500.0, -4000.0, -1000.0, -2000.0, -4100.0],
            vec![1, 1, 0, 2, 2, 0],
            2,
            3,
        );
        let stats = region_stats(&r, &l, 2).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].raster_id, 1);
        assert_eq!(stats[0].cell_count, 2);
        assert_eq!(stats[0].min, -3000.0);
        assert_eq!(stats[0].max, -2500.0);
        assert_eq!(stats[1].min, -2000.0);
        assert_eq!(stats[1].max, -1000.0);
    }

    #[test]
    fn test_area_uses_cell_center_latitude() {
        let (r, l) = grid(vec![1.0, 1.0], vec![1, 1], 1, 2);
        let stats = region_stats(&r, &l, 1).unwrap();
        // Row 0 centers at latitude 9.75
        let expected = 2.0 * cell_area_km2(0.5, 9.75);
        assert_relative_eq!(stats[0].area_km2, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_planar_area() {
        let mut r = Raster::filled(2, 2, 1.0);
        r.set_transform(GeoTransform::new(0.0, 0.0, 100.0, -100.0));
        let mut l: LabelGrid = Raster::filled(2, 2, 1);
        l.set_transform(*r.transform());
        let stats = region_stats_with(&r, &l, 1, AreaModel::Planar).unwrap();
        assert_relative_eq!(stats[0].area_km2, 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_area_monotone_in_cell_count() {
        let mut last = 0.0;
        for n in 1..6 {
            let mut ids = vec![0; 6];
            ids[..n].fill(1);
            let (r, l) = grid(vec![0.0; 6], ids, 1, 6);
            let area = region_stats(&r, &l, 1).unwrap()[0].area_km2;
            assert!(area >= last);
            last = area;
        }
    }

    #[test]
    fn test_zero_count_is_empty() {
        let (r, l) = grid(vec![0.0; 4], vec![0; 4], 2, 2);
        assert!(region_stats(&r, &l, 0).unwrap().is_empty());
    }

    #[test]
    fn test_shape_mismatch() {
        let r: Raster<f64> = Raster::new(2, 2);
        let l: LabelGrid = Raster::new(2, 3);
        assert!(matches!(region_stats(&r, &l, 1), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_label_above_count_rejected() {
        let (r, l) = grid(vec![0.0; 4], vec![1, 2, 3, 0], 2, 2);
        assert!(matches!(region_stats(&r, &l, 2), Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_nan_in_region_rejected() {
        let (r, l) = grid(vec![f64::NAN, 1.0, 2.0, 3.0], vec![0, 1, 1, 1], 2, 2);
        // NaN outside every region is ignored
        assert!(region_stats(&r, &l, 1).is_ok());
        let (r, l) = grid(vec![1.0, f64::NAN, 2.0, 3.0], vec![0, 1, 1, 1], 2, 2);
        assert!(matches!(
            region_stats(&r, &l, 1),
            Err(Error::NumericDomainError { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_non_square_cells_rejected() {
        let mut r: Raster<f64> = Raster::new(2, 2);
        r.set_transform(GeoTransform::new(0.0, 0.0, 1.0, -2.0));
        let l: LabelGrid = Raster::new(2, 2);
        assert!(matches!(region_stats(&r, &l, 0), Err(Error::InvalidParameter { .. })));
    }
}
