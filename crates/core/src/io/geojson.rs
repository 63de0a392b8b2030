//! GeoJSON vector sink

use crate::error::Result;
use crate::vector::{FeatureCollection, FeatureRecord};
use geo_types::{LineString, Polygon};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn ring_to_json(ring: &LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_to_json(polygon: &Polygon<f64>) -> Value {
    let mut rings = vec![ring_to_json(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring_to_json));
    json!({ "type": "Polygon", "coordinates": rings })
}

fn feature_to_json(feature: &FeatureRecord) -> Value {
    json!({
        "type": "Feature",
        "id": feature.raster_id,
        "geometry": polygon_to_json(&feature.geometry),
        "properties": {
            "raster_id": feature.raster_id,
            "deepest": feature.deepest,
            "shallowest": feature.shallowest,
            "area_km2": feature.area_km2,
        }
    })
}

/// Build a GeoJSON FeatureCollection value.
///
/// When the collection carries an EPSG code it is recorded in the legacy
/// named `crs` member.
pub fn feature_collection_to_json(collection: &FeatureCollection) -> Value {
    let mut root = json!({
        "type": "FeatureCollection",
        "features": collection.iter().map(feature_to_json).collect::<Vec<_>>(),
    });
    if let Some(urn) = collection.crs.as_ref().and_then(|crs| crs.ogc_urn()) {
        root["crs"] = json!({ "type": "name", "properties": { "name": urn } });
    }
    root
}

/// Serialize a feature collection as GeoJSON into `writer`
pub fn write_geojson<W: Write>(collection: &FeatureCollection, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &feature_collection_to_json(collection))?;
    Ok(())
}

/// Serialize a feature collection as GeoJSON to a file
pub fn write_geojson_file<P: AsRef<Path>>(collection: &FeatureCollection, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_geojson(collection, &mut writer)?;
    writer.flush()?;
    Ok(())
}
