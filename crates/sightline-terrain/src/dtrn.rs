//! .dtrn binary format loader and writer.
//!
//! Compact terrain format for fast loading:
//! a 64-byte little-endian header followed by big-endian i16 elevations,
//! row-major north-to-south, west-to-east.
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | magic `DTRN` |
//! | 4 | 2 | version |
//! | 6 | 2 | flags |
//! | 8 | 8 | origin latitude (SW corner, degrees) |
//! | 16 | 8 | origin longitude |
//! | 24 | 8 | cell size (arc-seconds) |
//! | 32 | 4 | width |
//! | 36 | 4 | height |
//! | 40 | 2 | min elevation |
//! | 42 | 2 | max elevation |
//! | 44 | 20 | reserved |

use std::io;
use std::path::Path;

use crate::grid::{cell_count, TerrainGrid, TerrainHeader, VOID_ELEVATION};

/// .dtrn magic bytes.
const DTRN_MAGIC: [u8; 4] = *b"DTRN";

/// Current format version.
const DTRN_VERSION: u16 = 1;

/// Header flag: elevation data contains void cells.
const FLAG_HAS_VOIDS: u16 = 0x0001;

/// Total header size in bytes.
const HEADER_SIZE: usize = 64;

/// Load a TerrainGrid from a .dtrn file.
pub fn load_dtrn(path: &Path) -> io::Result<TerrainGrid> {
    let data = std::fs::read(path)?;
    parse_dtrn(&data)
}

fn le_f64(bytes: &[u8]) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(bytes);
    f64::from_le_bytes(b)
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(bytes);
    u32::from_le_bytes(b)
}

/// Parse a .dtrn from a byte buffer.
pub fn parse_dtrn(data: &[u8]) -> io::Result<TerrainGrid> {
    if data.len() < HEADER_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "File too small for .dtrn header",
        ));
    }

    if data[0..4] != DTRN_MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Invalid .dtrn magic bytes",
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != DTRN_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unsupported .dtrn version: {version}"),
        ));
    }

    // flags (6..8) are informational only
    let origin_lat = le_f64(&data[8..16]);
    let origin_lon = le_f64(&data[16..24]);
    let cell_size = le_f64(&data[24..32]);
    let width = le_u32(&data[32..36]);
    let height = le_u32(&data[36..40]);
    let min_elevation = i16::from_le_bytes([data[40], data[41]]);
    let max_elevation = i16::from_le_bytes([data[42], data[43]]);

    if width == 0 || height == 0 || !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Degenerate .dtrn grid: {width}×{height}, cell size {cell_size}"),
        ));
    }

    let cells = cell_count(width, height);
    let elev_end = HEADER_SIZE + cells * 2;

    if data.len() < elev_end {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "File too small for elevation data",
        ));
    }

    let elevations = data[HEADER_SIZE..elev_end]
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    Ok(TerrainGrid::new(
        TerrainHeader {
            origin_lat,
            origin_lon,
            cell_size,
            width,
            height,
            min_elevation,
            max_elevation,
        },
        elevations,
    ))
}

/// Write a TerrainGrid to a .dtrn file.
pub fn write_dtrn(grid: &TerrainGrid, path: &Path) -> io::Result<()> {
    std::fs::write(path, serialize_dtrn(grid))
}

/// Serialize a TerrainGrid to .dtrn bytes.
pub fn serialize_dtrn(grid: &TerrainGrid) -> Vec<u8> {
    let h = &grid.header;

    let mut flags: u16 = 0;
    if grid.elevations.contains(&VOID_ELEVATION) {
        flags |= FLAG_HAS_VOIDS;
    }

    let mut buf = Vec::with_capacity(HEADER_SIZE + grid.elevations.len() * 2);

    buf.extend_from_slice(&DTRN_MAGIC);
    buf.extend_from_slice(&DTRN_VERSION.to_le_bytes());
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&h.origin_lat.to_le_bytes());
    buf.extend_from_slice(&h.origin_lon.to_le_bytes());
    buf.extend_from_slice(&h.cell_size.to_le_bytes());
    buf.extend_from_slice(&h.width.to_le_bytes());
    buf.extend_from_slice(&h.height.to_le_bytes());
    buf.extend_from_slice(&h.min_elevation.to_le_bytes());
    buf.extend_from_slice(&h.max_elevation.to_le_bytes());
    buf.resize(HEADER_SIZE, 0);

    for &elev in &grid.elevations {
        buf.extend_from_slice(&elev.to_be_bytes());
    }

    buf
}
