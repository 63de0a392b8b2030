//! Typed vector output records

use crate::crs::CRS;
use geo_types::Polygon;

/// One extracted region, ready for a vector sink.
///
/// `deepest` is the maximum raster value inside the region and `shallowest`
/// the minimum; callers working with signed depth decide what those mean.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Label id in the label raster
    pub raster_id: i32,
    /// Maximum value among the region's cells, truncated toward zero
    pub deepest: i32,
    /// Minimum value among the region's cells, truncated toward zero
    pub shallowest: i32,
    /// Projected area in square kilometres
    pub area_km2: f64,
    /// Simplified outline, with interior rings for enclosed holes
    pub geometry: Polygon<f64>,
}

/// Records plus the coordinate reference system their geometry is in
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub crs: Option<CRS>,
    pub features: Vec<FeatureRecord>,
}

impl FeatureCollection {
    pub fn new(crs: Option<CRS>) -> Self {
        Self {
            crs,
            features: Vec::new(),
        }
    }

    pub fn push(&mut self, feature: FeatureRecord) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.features.iter()
    }

    /// Look up a record by label id
    pub fn get(&self, raster_id: i32) -> Option<&FeatureRecord> {
        self.features.iter().find(|f| f.raster_id == raster_id)
    }
}

impl FromIterator<FeatureRecord> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = FeatureRecord>>(iter: I) -> Self {
        Self {
            crs: None,
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = FeatureRecord;
    type IntoIter = std::vec::IntoIter<FeatureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
