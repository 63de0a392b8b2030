//! Integration tests on synthetic seafloor rasters.
//!
//! The scenes are small grids of cones on a flat floor, georeferenced on a
//! geographic grid so area and outline coordinates can be checked by hand.

use geo::{Area, Contains, Point};
use rasterfeat_algorithms::morphology::{closing, fill_holes, CleanupParams, CleanupStage};
use rasterfeat_algorithms::pipeline::{run, PipelineParams, ThresholdMode};
use rasterfeat_algorithms::regions::{region_stats, vectorize, VectorizeParams};
use rasterfeat_algorithms::segmentation::{label, merge_map};
use rasterfeat_algorithms::statistics::uniform_mean;
use rasterfeat_core::io::{
    feature_collection_to_json, read_geotiff_from_buffer, write_labels_to_buffer,
};
use rasterfeat_core::raster::{LabelGrid, Mask, Raster};
use rasterfeat_core::{FeatureCollection, GeoTransform, CRS};

const FLOOR: f64 = -4000.0;

/// Flat floor with cones of height 1500 and radius 5 cells at `centers`
fn cone_field(rows: usize, cols: usize, centers: &[(f64, f64)]) -> Raster<f64> {
    let mut r = Raster::filled(rows, cols, FLOOR);
    r.set_transform(GeoTransform::new(140.0, 20.0, 0.05, -0.05));
    r.set_crs(Some(CRS::wgs84()));
    for row in 0..rows {
        for col in 0..cols {
            let mut v = FLOOR;
            for &(cr, cc) in centers {
                let d = ((row as f64 - cr).powi(2) + (col as f64 - cc).powi(2)).sqrt();
                if d < 5.0 {
                    v = v.max(FLOOR + 1500.0 * (1.0 - d / 5.0));
                }
            }
            r.set(row, col, v).unwrap();
        }
    }
    r
}

/// Deterministic speckle pattern
fn pseudo_random_mask(rows: usize, cols: usize, seed: u64) -> Mask {
    let mut m: Mask = Raster::new(rows, cols);
    let mut state = seed;
    for row in 0..rows {
        for col in 0..cols {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            if (state >> 33) % 3 == 0 {
                m.set(row, col, 1).unwrap();
            }
        }
    }
    m
}

/// Background window of radius 10 cells on the 0.05 degree grid
fn wide_window() -> ThresholdMode {
    ThresholdMode::Background {
        distance: 0.5,
        offset: 500.0,
    }
}

fn quiet_params() -> PipelineParams {
    PipelineParams {
        threshold: wide_window(),
        cleanup: CleanupParams {
            denoise_radius: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn separate_cones_become_separate_features() {
    let raster = cone_field(60, 60, &[(15.0, 15.0), (45.0, 40.0)]);
    let out = run(&raster, &quiet_params()).unwrap();

    assert_eq!(out.count, 2);
    assert_eq!(out.features.len(), 2);
    assert_eq!(out.features.crs, Some(CRS::wgs84()));

    // The first cone is first in scan order
    assert_eq!(out.labels.get(15, 15).unwrap(), 1);
    assert_eq!(out.labels.get(45, 40).unwrap(), 2);

    // Each outline encloses its own summit
    let (x1, y1) = raster.pixel_to_geo(15, 15);
    let (x2, y2) = raster.pixel_to_geo(40, 45);
    let f1 = out.features.get(1).unwrap();
    let f2 = out.features.get(2).unwrap();
    assert!(f1.geometry.contains(&Point::new(x1, y1)));
    assert!(f2.geometry.contains(&Point::new(x2, y2)));
    assert!(!f1.geometry.contains(&Point::new(x2, y2)));
}

#[test]
fn close_stage_merges_neighbouring_cones() {
    let raster = cone_field(40, 60, &[(20.0, 20.0), (20.0, 30.0)]);

    let apart = run(&raster, &quiet_params()).unwrap();
    assert_eq!(apart.count, 2);

    let merged_params = PipelineParams {
        threshold: wide_window(),
        cleanup: CleanupParams {
            denoise_radius: 1,
            close_radius: 3,
            order: vec![CleanupStage::Denoise, CleanupStage::Close, CleanupStage::Fill],
        },
        ..Default::default()
    };
    let merged = run(&raster, &merged_params).unwrap();
    assert_eq!(merged.count, 1);

    let map = merge_map(&apart.labels, &merged.labels).unwrap();
    assert_eq!(map, vec![0, 1, 1]);
}

#[test]
fn labels_round_trip_to_mask() {
    for seed in 1..6 {
        let mask = pseudo_random_mask(23, 31, seed);
        let (labels, count) = label(&mask).unwrap();
        for ((r, c), &m) in mask.data().indexed_iter() {
            let l = labels.data()[(r, c)];
            assert_eq!(m != 0, l > 0, "seed {} cell ({}, {})", seed, r, c);
        }
        assert_eq!(count == 0, mask.count_nonzero() == 0);
        let max = labels.data().iter().copied().max().unwrap_or(0) as usize;
        assert_eq!(max, count);
    }
}

#[test]
fn fill_holes_is_idempotent() {
    for seed in 1..6 {
        let mask = pseudo_random_mask(17, 19, seed);
        let once = fill_holes(&mask).unwrap();
        let twice = fill_holes(&once).unwrap();
        assert_eq!(once.data(), twice.data(), "seed {}", seed);
    }
}

#[test]
fn closing_count_monotone_in_radius() {
    for seed in 1..4 {
        let mask = pseudo_random_mask(20, 20, seed);
        let mut last = mask.count_nonzero();
        for k in 1..5 {
            let n = closing(&mask, k).unwrap().count_nonzero();
            assert!(n >= last, "seed {} k {}: {} < {}", seed, k, n, last);
            last = n;
        }
    }
}

#[test]
fn area_grows_with_region_size() {
    let mut raster = Raster::filled(10, 10, -3000.0);
    raster.set_transform(GeoTransform::new(0.0, 45.0, 0.1, -0.1));
    let mut last = 0.0;
    for width in 1..10 {
        let mut labels: LabelGrid = raster.derive(ndarray::Array2::zeros((10, 10))).unwrap();
        for col in 0..width {
            labels.set(4, col, 1).unwrap();
        }
        let area = region_stats(&raster, &labels, 1).unwrap()[0].area_km2;
        assert!(area >= 0.0);
        assert!(area >= last);
        last = area;
    }
}

#[test]
fn annulus_keeps_its_hole() {
    let mut raster = Raster::filled(9, 9, -2000.0);
    raster.set_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0));
    let mut mask: Mask = raster.derive(ndarray::Array2::zeros((9, 9))).unwrap();
    for r in 1..8 {
        for c in 1..8 {
            if !(3..6).contains(&r) || !(3..6).contains(&c) {
                mask.set(r, c, 1).unwrap();
            }
        }
    }
    let (labels, count) = label(&mask).unwrap();
    assert_eq!(count, 1);

    let params = VectorizeParams {
        tolerance: Some(0.5),
        ..Default::default()
    };
    let records = vectorize(&raster, &labels, count, &params).unwrap();
    let polygon = &records[0].geometry;
    assert_eq!(polygon.interiors().len(), 1);
    assert_eq!(polygon.unsigned_area(), 49.0 - 9.0);
}

#[test]
fn background_of_constant_raster_is_constant() {
    let raster = Raster::filled(13, 9, 5.0);
    for radius in [1, 4, 20] {
        let mean = uniform_mean(&raster, radius).unwrap();
        assert!(mean.data().iter().all(|&v| v == 5.0));
    }
}

#[test]
fn strict_threshold_boundary() {
    let raster = Raster::from_vec(vec![500.0, 500.001], 1, 2).unwrap();
    let p = PipelineParams {
        threshold: ThresholdMode::Absolute { value: 500.0 },
        cleanup: CleanupParams {
            order: vec![],
            ..Default::default()
        },
        vectorize: VectorizeParams {
            tolerance: Some(0.0),
            ..Default::default()
        },
    };
    let out = run(&raster, &p).unwrap();
    assert_eq!(out.candidates.get(0, 0).unwrap(), 0);
    assert_eq!(out.candidates.get(0, 1).unwrap(), 1);
    assert_eq!(out.count, 1);
}

#[test]
fn outputs_survive_io() {
    let raster = cone_field(30, 30, &[(15.0, 15.0)]);
    let out = run(&raster, &quiet_params()).unwrap();

    let bytes = write_labels_to_buffer(&out.labels).unwrap();
    let back: LabelGrid = read_geotiff_from_buffer(&bytes).unwrap();
    assert_eq!(back.data(), out.labels.data());
    assert_eq!(back.nodata(), Some(0));

    let json = feature_collection_to_json(&out.features);
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["raster_id"], 1);
    assert_eq!(features[0]["geometry"]["type"], "Polygon");

    let empty = FeatureCollection::new(None);
    assert_eq!(feature_collection_to_json(&empty)["features"].as_array().unwrap().len(), 0);
}
