//! Raster source/sink (GeoTIFF) and vector sink (GeoJSON)

mod geojson;
mod native;

pub use geojson::{feature_collection_to_json, write_geojson, write_geojson_file};
pub use native::{
    read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer, write_labels,
    write_labels_to_buffer, GeoTiffOptions,
};
