//! ESRI ASCII grid reading/writing
//!
//! A plain-text exchange format: a short `key value` header followed by
//! `nrows` lines of `ncols` values, top row first. No-data cells map to
//! elevation `0.0` and classification `0` on the way in, and back to the
//! header's no-data value on the way out when the caller asks for it.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::raster::{GridMetadata, Raster, RasterElement, TerrainGrid};

/// No-data marker written to output files
pub const ASCII_NODATA: f64 = -9999.0;

/// How empty cells of a floating point layer are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataPolicy {
    /// Elevation surfaces: cells without data become [`ASCII_NODATA`]
    MarkEmpty,
    /// Score surfaces: zero and negative values are real results
    Verbatim,
}

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: f64,
    yll: f64,
    cellsize: f64,
    nodata: Option<f64>,
}

/// Read an ASCII grid file into a terrain grid
pub fn read_ascii_grid<P: AsRef<Path>>(path: P) -> Result<TerrainGrid> {
    let mut text = String::new();
    File::open(path.as_ref())?.read_to_string(&mut text)?;
    parse_ascii_grid(&text)
}

/// Parse ASCII grid text into a terrain grid
pub fn parse_ascii_grid(text: &str) -> Result<TerrainGrid> {
    let mut tokens = text.split_whitespace().peekable();
    let mut header = Header {
        cellsize: 1.0,
        ..Header::default()
    };

    while let Some(&key) = tokens.peek() {
        if !key.starts_with(|c: char| c.is_ascii_alphabetic()) {
            break;
        }
        tokens.next();
        let value = tokens
            .next()
            .ok_or_else(|| Error::Format(format!("header key `{}` has no value", key)))?;

        match key.to_ascii_lowercase().as_str() {
            "ncols" => header.ncols = Some(parse_value(key, value)?),
            "nrows" => header.nrows = Some(parse_value(key, value)?),
            "xllcorner" | "xllcenter" => header.xll = parse_value(key, value)?,
            "yllcorner" | "yllcenter" => header.yll = parse_value(key, value)?,
            "cellsize" => header.cellsize = parse_value(key, value)?,
            "nodata_value" => header.nodata = Some(parse_value(key, value)?),
            _ => return Err(Error::Format(format!("unknown header key `{}`", key))),
        }
    }

    let width = header
        .ncols
        .ok_or_else(|| Error::Format("missing ncols".into()))?;
    let height = header
        .nrows
        .ok_or_else(|| Error::Format("missing nrows".into()))?;

    let cells = width
        .checked_mul(height)
        .ok_or_else(|| Error::Format(format!("grid of {} x {} cells is too large", width, height)))?;

    let mut elevation = Vec::new();
    for token in tokens {
        let z: f64 = parse_value("cell", token)?;
        let is_nodata = header.nodata.map_or(false, |nd| z == nd) || z.is_nan();
        elevation.push(if is_nodata { 0.0 } else { z });
    }

    if elevation.len() != cells {
        return Err(Error::SizeMismatch {
            layer: "elevation",
            expected: cells,
            actual: elevation.len(),
        });
    }

    let grid = TerrainGrid::from_elevation(width, height, elevation)?;
    let stats = grid.elevation().statistics();
    let metadata = GridMetadata {
        left: header.xll,
        top: header.yll + height as f64 * header.cellsize,
        right: header.xll + width as f64 * header.cellsize,
        bottom: header.yll,
        physical_low: stats.min.unwrap_or(0.0),
        physical_high: stats.max.unwrap_or(0.0),
        zone: None,
    };

    Ok(grid.with_metadata(metadata))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Format(format!("cannot parse `{}` for {}", value, key)))
}

/// Write a layer to an ASCII grid file, georeferenced by `metadata`
pub fn write_ascii_grid<T, P>(
    raster: &Raster<T>,
    metadata: &GridMetadata,
    policy: NoDataPolicy,
    path: P,
) -> Result<()>
where
    T: RasterElement + Display,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_ascii_grid(raster, metadata, policy, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Encode a layer as ASCII grid text into any `Write` sink.
///
/// With [`NoDataPolicy::MarkEmpty`] cells without data in a floating point
/// layer are written as no-data. Integer layers (counts, classes) always
/// keep their zeros.
pub fn encode_ascii_grid<T, W>(
    raster: &Raster<T>,
    metadata: &GridMetadata,
    policy: NoDataPolicy,
    writer: &mut W,
) -> Result<()>
where
    T: RasterElement + Display,
    W: Write,
{
    let (width, height) = (raster.width(), raster.height());
    let extent = metadata.physical_width();
    let cellsize = if extent > 0.0 { extent / width as f64 } else { 1.0 };
    let mark_empty = policy == NoDataPolicy::MarkEmpty && is_float::<T>();

    writeln!(writer, "ncols {}", width)?;
    writeln!(writer, "nrows {}", height)?;
    writeln!(writer, "xllcorner {}", metadata.left)?;
    writeln!(writer, "yllcorner {}", metadata.bottom.min(metadata.top))?;
    writeln!(writer, "cellsize {}", cellsize)?;
    if mark_empty {
        writeln!(writer, "NODATA_value {}", ASCII_NODATA)?;
    }

    for row in raster.data().rows() {
        let mut first = true;
        for &value in row.iter() {
            if !first {
                write!(writer, " ")?;
            }
            first = false;
            if mark_empty && !value.has_data() {
                write!(writer, "{}", ASCII_NODATA)?;
            } else {
                write!(writer, "{}", value)?;
            }
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn is_float<T: RasterElement>() -> bool {
    // 0.5 survives a round trip only through a floating point type
    num_traits::cast::<f64, T>(0.5)
        .and_then(|v| v.to_f64())
        .map_or(false, |v| v == 0.5)
}
