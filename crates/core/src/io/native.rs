//! Native GeoTIFF reading/writing
//!
//! Uses the `tiff` crate. Georeferencing is carried by the
//! ModelPixelScale/ModelTiepoint tags, the CRS by the EPSG entries of the
//! GeoKey directory and the no-data value by the GDAL_NODATA ASCII tag.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, LabelGrid, Raster, RasterElement};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{ColorType, Gray32Float, GrayI32};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tracing::warn;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Write the GeoKey directory (EPSG code, raster type)
    pub write_geokeys: bool,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            write_geokeys: true,
        }
    }
}

/// Read the first band of a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data))
}

fn cast_all<S, T>(buf: Vec<S>) -> Result<Vec<T>>
where
    S: num_traits::NumCast + Copy + Display,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| {
            num_traits::cast(v).ok_or_else(|| {
                Error::UnsupportedDataType(format!(
                    "sample {} does not fit in {}",
                    v,
                    std::any::type_name::<T>()
                ))
            })
        })
        .collect()
}

fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader)
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(buf)?,
        DecodingResult::F64(buf) => cast_all(buf)?,
        DecodingResult::U8(buf) => cast_all(buf)?,
        DecodingResult::U16(buf) => cast_all(buf)?,
        DecodingResult::U32(buf) => cast_all(buf)?,
        DecodingResult::I8(buf) => cast_all(buf)?,
        DecodingResult::I16(buf) => cast_all(buf)?,
        DecodingResult::I32(buf) => cast_all(buf)?,
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    // Multi-sample images decode interleaved; only single-band input is meaningful here
    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    match read_geotransform(&mut decoder) {
        Some(transform) => raster.set_transform(transform),
        None => warn!(
            rows,
            cols,
            "no ModelPixelScale/ModelTiepoint tags, using unit pixel coordinates"
        ),
    }
    raster.set_crs(read_crs(&mut decoder));
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT)).ok()?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    None
}

fn read_crs<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder.get_tag_u16_vec(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY)).ok()?;
    // Header is 4 shorts; each entry is (key, location, count, value)
    keys.get(4..)?
        .chunks_exact(4)
        .find(|entry| {
            (entry[0] == GEOGRAPHIC_TYPE_KEY || entry[0] == PROJECTED_CS_TYPE_KEY)
                && entry[1] == 0
                && entry[3] != 0
                && entry[3] != 32767
        })
        .map(|entry| CRS::from_epsg(entry[3] as u32))
}

fn read_nodata<T, R>(decoder: &mut Decoder<R>) -> Option<T>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let text = decoder.get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA)).ok()?;
    let value: f64 = text.trim_matches(char::from(0)).trim().parse().ok()?;
    if value.is_nan() {
        return Some(T::default_nodata()).filter(|_| T::is_float());
    }
    T::from_f64(value)
}

/// Write a Raster to a GeoTIFF file as 32-bit float samples
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = BufWriter::new(File::create(path.as_ref())?);
    encode_geotiff(raster, file, &options.unwrap_or_default())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), &options.unwrap_or_default())?;
    Ok(buf)
}

/// Persist a label grid as 32-bit integer samples with the pipeline's
/// no-data convention (`0` = background)
pub fn write_labels<P: AsRef<Path>>(labels: &LabelGrid, path: P) -> Result<()> {
    let file = BufWriter::new(File::create(path.as_ref())?);
    encode_labels(labels, file)
}

/// Encode a label grid into an in-memory GeoTIFF, as [`write_labels`] does
pub fn write_labels_to_buffer(labels: &LabelGrid) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_labels(labels, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_labels<W>(labels: &LabelGrid, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut out = labels.clone();
    out.set_nodata(Some(0));
    let data: Vec<i32> = out.data().iter().copied().collect();
    encode_samples::<GrayI32, _, _>(&out, &data, writer, &GeoTiffOptions::default())
}

fn geokeys(crs: Option<&CRS>) -> Vec<u16> {
    // RasterPixelIsArea
    let raster_type = [GT_RASTER_TYPE_KEY, 0, 1, 1];
    let (model_type, cs_key) = match crs.and_then(CRS::epsg) {
        Some(4326) => (2, Some((GEOGRAPHIC_TYPE_KEY, 4326))),
        Some(code) if code <= u16::MAX as u32 => (1, Some((PROJECTED_CS_TYPE_KEY, code as u16))),
        _ => (1, None),
    };

    let mut entries = vec![GT_MODEL_TYPE_KEY, 0, 1, model_type];
    entries.extend_from_slice(&raster_type);
    if let Some((key, code)) = cs_key {
        entries.extend_from_slice(&[key, 0, 1, code]);
    }

    let mut out = vec![1, 1, 0, (entries.len() / 4) as u16];
    out.extend(entries);
    out
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();
    encode_samples::<Gray32Float, _, _>(raster, &data, writer, options)
}

/// Write `data` (row-major samples of `raster`) with the raster's georeferencing
fn encode_samples<C, T, W>(
    raster: &Raster<T>,
    data: &[C::Inner],
    writer: W,
    options: &GeoTiffOptions,
) -> Result<()>
where
    C: ColorType,
    [C::Inner]: TiffValue,
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();

    let mut image = encoder
        .new_image::<C>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    if options.write_geokeys {
        let keys = geokeys(raster.crs());
        image
            .encoder()
            .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), keys.as_slice())
            .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;
    }

    if let Some(nodata) = raster.nodata().and_then(RasterElement::to_f64) {
        let text = format!("{}", nodata);
        image
            .encoder()
            .write_tag(Tag::Unknown(GDAL_NODATA), text.as_str())
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
