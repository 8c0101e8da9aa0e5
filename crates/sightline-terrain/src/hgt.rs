//! NASADEM HGT file parser.
//!
//! HGT files are flat arrays of big-endian i16 elevation values
//! covering 1° × 1° tiles. The filename encodes the SW corner
//! coordinates (e.g., N25E056.hgt). Void cells hold -32768.

use std::io;
use std::path::Path;

use crate::grid::{elevation_range, TerrainGrid, TerrainHeader, VOID_ELEVATION};

/// Parse an HGT filename to extract the SW corner coordinates as (lat, lon).
/// Format: `N25E056.hgt` or `S10W045.hgt`
pub fn parse_hgt_filename(filename: &str) -> Option<(f64, f64)> {
    let name = filename
        .strip_suffix(".hgt")
        .or_else(|| filename.strip_suffix(".HGT"))?;

    if name.len() < 7 || !name.is_ascii() {
        return None;
    }

    let lat_sign = match &name[0..1] {
        "N" | "n" => 1.0,
        "S" | "s" => -1.0,
        _ => return None,
    };
    let lat: f64 = name[1..3].parse().ok()?;

    let lon_sign = match &name[3..4] {
        "E" | "e" => 1.0,
        "W" | "w" => -1.0,
        _ => return None,
    };
    let lon: f64 = name[4..7].parse().ok()?;

    Some((lat * lat_sign, lon * lon_sign))
}

/// Determine the grid size from the file size.
/// 1 arc-second: 3601 × 3601 = 25,934,402 bytes
/// 3 arc-second: 1201 × 1201 = 2,884,802 bytes
fn grid_size_from_byte_count(byte_count: usize) -> Option<(u32, f64)> {
    match byte_count {
        25_934_402 => Some((3601, 1.0)),
        2_884_802 => Some((1201, 3.0)),
        _ => None,
    }
}

/// Parse raw HGT bytes into (elevations, side length, cell size in arc-seconds).
pub fn parse_hgt_bytes(data: &[u8]) -> io::Result<(Vec<i16>, u32, f64)> {
    let (grid_side, cell_size) = grid_size_from_byte_count(data.len()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Unexpected HGT file size: {} bytes (expected {} or {})",
                data.len(),
                3601 * 3601 * 2,
                1201 * 1201 * 2
            ),
        )
    })?;

    Ok((decode_be_samples(data), grid_side, cell_size))
}

fn decode_be_samples(data: &[u8]) -> Vec<i16> {
    data.chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Fill void values by averaging non-void neighbors.
pub fn fill_voids(elevations: &mut [i16], width: u32, height: u32) {
    let w = width as usize;
    let h = height as usize;

    let snapshot = elevations.to_vec();
    for r in 0..h {
        for c in 0..w {
            let idx = r * w + c;
            if snapshot[idx] != VOID_ELEVATION {
                continue;
            }

            let mut sum = 0i64;
            let mut count = 0i64;
            for nr in r.saturating_sub(1)..=(r + 1).min(h - 1) {
                for nc in c.saturating_sub(1)..=(c + 1).min(w - 1) {
                    let v = snapshot[nr * w + nc];
                    if v != VOID_ELEVATION {
                        sum += v as i64;
                        count += 1;
                    }
                }
            }

            // All-void neighborhoods stay void
            if count > 0 {
                elevations[idx] = (sum / count) as i16;
            }
        }
    }
}

/// Load a single HGT file into a TerrainGrid, optionally filling voids.
pub fn load_hgt(path: &Path, fill: bool) -> io::Result<TerrainGrid> {
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid HGT filename"))?;

    let (origin_lat, origin_lon) = parse_hgt_filename(filename).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Cannot parse HGT coordinates from filename: {filename}"),
        )
    })?;

    let data = std::fs::read(path)?;
    let (mut elevations, grid_side, cell_size) = parse_hgt_bytes(&data)?;

    if fill {
        fill_voids(&mut elevations, grid_side, grid_side);
    }

    let (min_elevation, max_elevation) = elevation_range(&elevations);

    // HGT samples include both edges: shift the origin one cell south so that
    // row 0 lands on the tile's north boundary and the last row on its south one
    Ok(TerrainGrid::new(
        TerrainHeader {
            origin_lat: origin_lat - cell_size / 3600.0,
            origin_lon,
            cell_size,
            width: grid_side,
            height: grid_side,
            min_elevation,
            max_elevation,
        },
        elevations,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hgt_filename() {
        assert_eq!(parse_hgt_filename("N25E056.hgt"), Some((25.0, 56.0)));
        assert_eq!(parse_hgt_filename("S10W045.hgt"), Some((-10.0, -45.0)));
        assert_eq!(parse_hgt_filename("N00E000.HGT"), Some((0.0, 0.0)));
        assert_eq!(parse_hgt_filename("invalid.hgt"), None);
        assert_eq!(parse_hgt_filename("N25E056.txt"), None);
    }

    #[test]
    fn test_decode_big_endian_samples() {
        let values: Vec<i16> = vec![100, -200, 300, VOID_ELEVATION, 8848];
        let mut data = Vec::with_capacity(values.len() * 2);
        for &v in &values {
            data.extend_from_slice(&v.to_be_bytes());
        }
        assert_eq!(decode_be_samples(&data), values);
    }

    #[test]
    fn test_parse_hgt_rejects_odd_size() {
        let err = parse_hgt_bytes(&[0u8; 50]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_fill_voids() {
        let mut elevations: Vec<i16> = vec![100, 200, 300, 100, VOID_ELEVATION, 300, 100, 200, 300];

        fill_voids(&mut elevations, 3, 3);

        // Center void should be average of 8 neighbors: (100+200+300+100+300+100+200+300)/8 = 200
        assert_eq!(elevations[4], 200);
    }

    #[test]
    fn test_fill_voids_corner() {
        let mut elevations: Vec<i16> = vec![VOID_ELEVATION, 100, 100, 100];

        fill_voids(&mut elevations, 2, 2);

        // Corner void has 3 neighbors all at 100
        assert_eq!(elevations[0], 100);
    }

    #[test]
    fn test_fill_voids_isolated_stays_void() {
        let mut elevations: Vec<i16> = vec![VOID_ELEVATION; 4];
        fill_voids(&mut elevations, 2, 2);
        assert!(elevations.iter().all(|&e| e == VOID_ELEVATION));
    }
}
