//! Topology-preserving polygon simplification
//!
//! Rings are simplified with Douglas-Peucker. A result is accepted only if
//! every ring still encloses area with its original orientation, keeps at
//! least three vertices, and no two segments cross or overlap. Otherwise
//! the tolerance is halved for that polygon and the rings are simplified
//! again from the input. Rings may still touch at single points, as traced
//! outlines do where cells meet diagonally.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Contains, InteriorPoint, Line, LineString, Polygon, Simplify};
use rasterfeat_core::{Error, Result};
use tracing::debug;

/// Retries before falling back to the unsimplified rings
const MAX_HALVINGS: usize = 30;

/// Simplify `polygon` with a perpendicular-distance `tolerance`.
///
/// # Errors
/// - `InvalidParameter` for a negative or non-finite tolerance
/// - `DegenerateGeometry` if an input ring has fewer than 3 distinct
///   vertices or encloses no area
pub fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Result<Polygon<f64>> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(Error::InvalidParameter {
            name: "tolerance",
            value: tolerance.to_string(),
            reason: "tolerance must be finite and non-negative".into(),
        });
    }
    for ring in rings(polygon) {
        check_ring(ring)?;
    }

    let input_simple = is_simple(polygon);
    let mut t = tolerance;
    for _ in 0..=MAX_HALVINGS {
        let candidate = polygon.simplify(&t);
        if keeps_shape(polygon, &candidate) && (!input_simple || is_simple(&candidate)) {
            if t < tolerance {
                debug!(tolerance, used = t, "simplification tolerance reduced");
            }
            return Ok(candidate);
        }
        t /= 2.0;
    }

    debug!(tolerance, "simplification skipped");
    Ok(polygon.clone())
}

fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors().iter())
}

fn signed_ring_area(ring: &LineString<f64>) -> f64 {
    Polygon::new(ring.clone(), vec![]).signed_area()
}

fn check_ring(ring: &LineString<f64>) -> Result<()> {
    let open = &ring.0[..ring.0.len().saturating_sub(1)];
    let mut distinct = open.to_vec();
    distinct.dedup();
    if distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }
    if distinct.len() < 3 {
        return Err(Error::DegenerateGeometry(format!(
            "ring has {} distinct vertices",
            distinct.len()
        )));
    }
    if signed_ring_area(ring) == 0.0 {
        return Err(Error::DegenerateGeometry("ring encloses no area".into()));
    }
    Ok(())
}

/// Every ring kept at least a triangle with the same winding as before
fn keeps_shape(original: &Polygon<f64>, candidate: &Polygon<f64>) -> bool {
    if original.interiors().len() != candidate.interiors().len() {
        return false;
    }
    rings(original).zip(rings(candidate)).all(|(before, after)| {
        let a = signed_ring_area(before);
        let b = signed_ring_area(after);
        after.0.len() >= 4 && b != 0.0 && a.signum() == b.signum()
    })
}

fn overlaps(a: Line<f64>, b: Line<f64>, adjacent: bool) -> bool {
    match line_intersection(a, b) {
        Some(LineIntersection::SinglePoint { is_proper, .. }) => is_proper && !adjacent,
        Some(LineIntersection::Collinear { intersection }) => intersection.start != intersection.end,
        None => false,
    }
}

fn ring_is_simple(ring: &LineString<f64>) -> bool {
    let lines: Vec<Line<f64>> = ring.lines().collect();
    let n = lines.len();
    for i in 0..n {
        for j in i + 1..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if overlaps(lines[i], lines[j], adjacent) {
                return false;
            }
        }
    }
    true
}

fn rings_cross(a: &LineString<f64>, b: &LineString<f64>) -> bool {
    a.lines()
        .any(|la| b.lines().any(|lb| overlaps(la, lb, false)))
}

/// No ring crosses itself or another ring, and holes sit inside the
/// exterior without nesting
fn is_simple(polygon: &Polygon<f64>) -> bool {
    let all: Vec<&LineString<f64>> = rings(polygon).collect();
    if !all.iter().all(|r| ring_is_simple(r)) {
        return false;
    }
    for i in 0..all.len() {
        for j in i + 1..all.len() {
            if rings_cross(all[i], all[j]) {
                return false;
            }
        }
    }

    let shell = Polygon::new(polygon.exterior().clone(), vec![]);
    let holes: Vec<Polygon<f64>> = polygon
        .interiors()
        .iter()
        .map(|ring| Polygon::new(ring.clone(), vec![]))
        .collect();
    for (i, hole) in holes.iter().enumerate() {
        let Some(point) = hole.interior_point() else {
            return false;
        };
        if !shell.contains(&point) {
            return false;
        }
        if holes
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.contains(&point))
        {
            return false;
        }
    }
    true
}
