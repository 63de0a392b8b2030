//! Boundary tracing of labeled regions
//!
//! Region outlines are built on the lattice of cell corners. Every side of
//! a region cell that faces a non-member cell becomes a directed edge,
//! oriented so the region lies on its right when rows grow downward. The
//! edges link into closed rings: the outer boundary winds clockwise on
//! screen and each enclosed background patch gives a counter-clockwise
//! hole.
//!
//! Where two member cells touch only at a corner the vertex has two
//! outgoing edges. Taking the left-hand edge keeps the diagonal pair on one
//! ring, which matches 8-connected labeling; the background on the other
//! diagonal is split, which matches 4-connected hole filling.

use std::collections::{BTreeMap, HashSet};

use geo::{Coord, LineString, Polygon};
use rasterfeat_core::raster::{GeoTransform, LabelGrid};
use rasterfeat_core::{Error, Result};

/// Corner lattice vertex as (row, col), ordered row-major
type Vertex = (usize, usize);
/// Unit step as (dx, dy) with x along columns and y along rows
type Step = (isize, isize);

const EAST: Step = (1, 0);
const SOUTH: Step = (0, 1);
const WEST: Step = (-1, 0);
const NORTH: Step = (0, -1);

/// A closed ring on the corner lattice, vertices as (col, row)
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LatticeRing {
    pub vertices: Vec<(usize, usize)>,
}

impl LatticeRing {
    /// Twice the signed area in lattice units; positive for outer rings
    pub fn doubled_area(&self) -> i64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let (x0, y0) = self.vertices[i];
                let (x1, y1) = self.vertices[(i + 1) % n];
                x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
            })
            .sum()
    }

    fn to_line_string(&self, transform: &GeoTransform) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self
            .vertices
            .iter()
            .map(|&(x, y)| {
                let (gx, gy) = transform.corner_to_geo(x as f64, y as f64);
                Coord { x: gx, y: gy }
            })
            .collect();
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
        LineString::new(coords)
    }
}

/// Member cells of every label `1..=count`, in row-major order
pub fn footprints(labels: &LabelGrid, count: usize) -> Result<Vec<Vec<(usize, usize)>>> {
    let mut cells = vec![Vec::new(); count];
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
        cells[id as usize - 1].push((row, col));
    }
    Ok(cells)
}

/// Outline of label `id` as a polygon in geographic coordinates.
///
/// Scans the whole grid; use [`footprints`] with [`trace_cells`] when
/// tracing many labels.
pub fn trace_region(labels: &LabelGrid, id: i32) -> Result<Polygon<f64>> {
    let cells: Vec<(usize, usize)> = labels
        .data()
        .indexed_iter()
        .filter(|&(_, &v)| v == id)
        .map(|(idx, _)| idx)
        .collect();
    trace_cells(labels, id, &cells)
}

/// Outline of label `id` given its member cells.
///
/// # Errors
/// - `InvalidParameter` if `cells` is empty
/// - `Algorithm` if the cells form more than one 8-connected part
pub fn trace_cells(labels: &LabelGrid, id: i32, cells: &[(usize, usize)]) -> Result<Polygon<f64>> {
    let rings = lattice_rings(labels, id, cells)?;

    let mut outer: Option<&LatticeRing> = None;
    let mut holes = Vec::new();
    for ring in &rings {
        if ring.doubled_area() > 0 {
            if outer.is_some() {
                return Err(Error::Algorithm(format!(
                    "label {} has more than one connected part",
                    id
                )));
            }
            outer = Some(ring);
        } else {
            holes.push(ring);
        }
    }
    let outer = outer.ok_or_else(|| Error::Algorithm(format!("label {} has no outer boundary", id)))?;

    let transform = labels.transform();
    Ok(Polygon::new(
        outer.to_line_string(transform),
        holes.iter().map(|h| h.to_line_string(transform)).collect(),
    ))
}

pub(crate) fn lattice_rings(labels: &LabelGrid, id: i32, cells: &[(usize, usize)]) -> Result<Vec<LatticeRing>> {
    if cells.is_empty() {
        return Err(Error::InvalidParameter {
            name: "id",
            value: id.to_string(),
            reason: "label has no cells".into(),
        });
    }

    let (rows, cols) = labels.shape();
    let data = labels.data();
    let member = |r: isize, c: isize| -> bool {
        r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols && data[[r as usize, c as usize]] == id
    };

    let mut outgoing: BTreeMap<Vertex, Vec<Step>> = BTreeMap::new();
    for &(r, c) in cells {
        let (ri, ci) = (r as isize, c as isize);
        if !member(ri - 1, ci) {
            outgoing.entry((r, c)).or_default().push(EAST);
        }
        if !member(ri, ci + 1) {
            outgoing.entry((r, c + 1)).or_default().push(SOUTH);
        }
        if !member(ri + 1, ci) {
            outgoing.entry((r + 1, c + 1)).or_default().push(WEST);
        }
        if !member(ri, ci - 1) {
            outgoing.entry((r + 1, c)).or_default().push(NORTH);
        }
    }

    let mut used: HashSet<(Vertex, Step)> = HashSet::new();
    let mut rings = Vec::new();

    for (&start, steps) in &outgoing {
        for &first in steps {
            if used.contains(&(start, first)) {
                continue;
            }

            let mut vertices = Vec::new();
            let mut vertex = start;
            let mut step = first;
            loop {
                used.insert((vertex, step));
                vertices.push((vertex, step));

                let next = advance(vertex, step);
                let options = outgoing
                    .get(&next)
                    .ok_or_else(|| Error::Algorithm(format!("open boundary at {:?}", next)))?;
                let next_step = match options.as_slice() {
                    [only] => *only,
                    _ => {
                        let left = (step.1, -step.0);
                        if !options.contains(&left) {
                            return Err(Error::Algorithm(format!("ambiguous boundary at {:?}", next)));
                        }
                        left
                    }
                };

                if (next, next_step) == (start, first) {
                    break;
                }
                if used.contains(&(next, next_step)) {
                    return Err(Error::Algorithm(format!("boundary revisits {:?}", next)));
                }
                vertex = next;
                step = next_step;
            }

            rings.push(collapse(&vertices));
        }
    }

    Ok(rings)
}

fn advance((r, c): Vertex, (dx, dy): Step) -> Vertex {
    ((r as isize + dy) as usize, (c as isize + dx) as usize)
}

/// Keep only the vertices where the boundary changes direction
fn collapse(edges: &[(Vertex, Step)]) -> LatticeRing {
    let n = edges.len();
    let vertices = (0..n)
        .filter(|&i| edges[(i + n - 1) % n].1 != edges[i].1)
        .map(|i| {
            let (r, c) = edges[i].0;
            (c, r)
        })
        .collect();
    LatticeRing { vertices }
}
