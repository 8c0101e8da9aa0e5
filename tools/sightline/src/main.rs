//! sightline: terrain preparation, viewshed sweeps and point inspection.
//!
//! Usage:
//!   sightline synthetic --center 46.5,8.0 --output alps_synth.dtrn
//!   sightline convert --hgt N46E008.hgt --output alps.dtrn --resample 1200
//!   sightline sweep --terrain alps.dtrn --vantage 46.55,8.02 --output viewshed.geojson
//!   sightline progressive --terrain alps.dtrn --vantage 46.55,8.02 --config sweep.json
//!   sightline inspect --terrain alps.dtrn --vantage 46.55,8.02 --target 46.6,8.1

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sightline_core::config::SweepConfig;
use sightline_core::constants::DEFAULT_OBSERVER_HEIGHT_M;
use sightline_core::types::{GeoPoint, Observer, VisibilitySet};
use sightline_sweep::{spawn_sweep_worker, ViewshedSession, VisibilityUpdate};
use sightline_terrain::dtrn::{load_dtrn, write_dtrn};
use sightline_terrain::grid::{elevation_range, TerrainGrid, TerrainHeader};
use sightline_terrain::hgt::load_hgt;
use sightline_terrain::inspect::inspect;
use sightline_terrain::viewport::Viewport;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Viewshed and line-of-sight tool")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic ridged terrain .dtrn for testing/demo
    Synthetic {
        /// Terrain center: lat,lon
        #[arg(long, value_parser = parse_lat_lon, default_value = "46.5,8.0")]
        center: GeoPoint,

        /// Output .dtrn file path
        #[arg(long, default_value = "terrain_synth.dtrn")]
        output: PathBuf,

        /// Grid size in cells per side
        #[arg(long, default_value_t = 256)]
        size: u32,
    },

    /// Convert a NASADEM .hgt tile to .dtrn
    Convert {
        /// HGT file to convert
        #[arg(long)]
        hgt: PathBuf,

        /// Output .dtrn file path
        #[arg(long)]
        output: PathBuf,

        /// Resample to NxN cells (0 keeps native resolution)
        #[arg(long, default_value_t = 0)]
        resample: u32,

        /// Keep void cells instead of filling them from neighbors
        #[arg(long)]
        keep_voids: bool,
    },

    /// Full sweep at a fixed degree step, written as GeoJSON
    Sweep(SweepArgs),

    /// Progressive sweep on the background worker, written as GeoJSON
    Progressive(SweepArgs),

    /// Distance, bearing and elevation angle from a vantage point to a target
    Inspect {
        /// Terrain .dtrn file
        #[arg(long)]
        terrain: PathBuf,

        /// Vantage point: lat,lon
        #[arg(long, value_parser = parse_lat_lon)]
        vantage: GeoPoint,

        /// Target point: lat,lon
        #[arg(long, value_parser = parse_lat_lon)]
        target: GeoPoint,

        /// Observer eye height in meters
        #[arg(long, default_value_t = DEFAULT_OBSERVER_HEIGHT_M)]
        height: f64,
    },
}

#[derive(clap::Args, Debug)]
struct SweepArgs {
    /// Terrain .dtrn file
    #[arg(long)]
    terrain: PathBuf,

    /// Vantage point: lat,lon
    #[arg(long, value_parser = parse_lat_lon)]
    vantage: GeoPoint,

    /// Visible map area: west,south,east,north (default: terrain extent)
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<Viewport>,

    /// JSON sweep configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observer eye height in meters (overrides the config)
    #[arg(long)]
    height: Option<f64>,

    /// Output GeoJSON path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let result = match args.command {
        Command::Synthetic {
            center,
            output,
            size,
        } => cmd_synthetic(center, &output, size),
        Command::Convert {
            hgt,
            output,
            resample,
            keep_voids,
        } => cmd_convert(&hgt, &output, resample, !keep_voids),
        Command::Sweep(args) => cmd_sweep(&args),
        Command::Progressive(args) => cmd_progressive(&args),
        Command::Inspect {
            terrain,
            vantage,
            target,
            height,
        } => cmd_inspect(&terrain, vantage, target, height),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

/// `"lat,lon"` in degrees.
fn parse_lat_lon(s: &str) -> Result<GeoPoint, String> {
    let values = parse_numbers(s, 2)?;
    Ok(GeoPoint::new(values[1], values[0]))
}

/// `"west,south,east,north"` in degrees.
fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let v = parse_numbers(s, 4)?;
    if v[1] > v[3] {
        return Err(format!("south {} is north of north {}", v[1], v[3]));
    }
    Ok(Viewport::new(v[0], v[1], v[2], v[3]))
}

fn parse_numbers(s: &str, count: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in {s:?}: {e}"))?;
    if values.len() != count || values.iter().any(|v| !v.is_finite()) {
        return Err(format!("expected {count} comma-separated numbers, got {s:?}"));
    }
    Ok(values)
}

// --- Terrain commands ---

fn cmd_synthetic(center: GeoPoint, output: &Path, size: u32) -> CliResult {
    if size < 2 {
        return Err("--size must be at least 2".into());
    }
    info!(size, lat = center.lat, lon = center.lon, "generating synthetic terrain");

    let grid = generate_synthetic_valley(size, center);
    info!(
        min = grid.header.min_elevation,
        max = grid.header.max_elevation,
        "elevation range"
    );
    write_grid(&grid, output)
}

fn cmd_convert(hgt: &Path, output: &Path, resample: u32, fill: bool) -> CliResult {
    let grid = load_hgt(hgt, fill)?;
    info!(
        width = grid.header.width,
        height = grid.header.height,
        cell_size = grid.header.cell_size,
        min = grid.header.min_elevation,
        max = grid.header.max_elevation,
        "loaded {}",
        hgt.display()
    );

    let grid = if resample > 1 && resample < grid.header.width {
        info!(resample, "resampling");
        resample_grid(&grid, resample)
    } else {
        grid
    };
    write_grid(&grid, output)
}

/// Square resample covering the same geographic extent.
fn resample_grid(grid: &TerrainGrid, size: u32) -> TerrainGrid {
    let h = &grid.header;
    let elevations = grid.downsample(size, size);
    let (min_elevation, max_elevation) = elevation_range(&elevations);

    let lat_span = h.height as f64 * h.cell_size;
    let lon_span = h.width as f64 * h.cell_size;
    let cell_size = (lat_span + lon_span) / 2.0 / size as f64;

    TerrainGrid::new(
        TerrainHeader {
            origin_lat: h.origin_lat,
            origin_lon: h.origin_lon,
            cell_size,
            width: size,
            height: size,
            min_elevation,
            max_elevation,
        },
        elevations,
    )
}

fn write_grid(grid: &TerrainGrid, output: &Path) -> CliResult {
    write_dtrn(grid, output)?;
    let bytes = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    info!(bytes, "wrote {}", output.display());
    Ok(())
}

// --- Sweep commands ---

/// Load terrain and config, and place the vantage marker.
fn open_session(args: &SweepArgs) -> Result<(TerrainGrid, ViewshedSession), Box<dyn Error>> {
    let grid = load_dtrn(&args.terrain)?;
    let mut config = match &args.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::default(),
    };
    if let Some(height) = args.height {
        if !height.is_finite() || height < 0.0 {
            return Err(format!("invalid observer height {height}").into());
        }
        config.observer_height = height;
    }

    if !grid.contains(args.vantage) {
        return Err(format!(
            "vantage {},{} lies outside the terrain",
            args.vantage.lat, args.vantage.lon
        )
        .into());
    }

    let viewport = args.viewport.unwrap_or_else(|| terrain_extent(&grid.header));
    let mut session = ViewshedSession::new(viewport, config);
    session.set_vantage(args.vantage);
    Ok((grid, session))
}

fn terrain_extent(header: &TerrainHeader) -> Viewport {
    Viewport::new(
        header.origin_lon,
        header.origin_lat,
        header.east_lon(),
        header.north_lat(),
    )
}

fn cmd_sweep(args: &SweepArgs) -> CliResult {
    let (grid, mut session) = open_session(args)?;
    let mut updates: Vec<VisibilityUpdate> = Vec::new();
    let update = session
        .run_full_sweep(&grid, &mut updates)
        .ok_or("no vantage point set")?;
    write_geojson(&update.visibility, args.output.as_deref())
}

fn cmd_progressive(args: &SweepArgs) -> CliResult {
    let (grid, session) = open_session(args)?;
    let plan = session.plan().ok_or("no vantage point set")?;

    let (worker, updates) = spawn_sweep_worker(grid, session.config())?;
    worker.start(plan);

    let mut last = None;
    for update in updates.iter() {
        info!(
            generation = update.generation,
            state = ?update.state,
            bearings = update.distinct_bearings,
            segments = update.visibility.len(),
            "update"
        );
        let finished = update.state.is_finished();
        last = Some(update);
        if finished {
            break;
        }
    }
    worker.shutdown();

    let update = last.ok_or("worker stopped without producing a result")?;
    write_geojson(&update.visibility, args.output.as_deref())
}

fn write_geojson(visibility: &VisibilitySet, output: Option<&Path>) -> CliResult {
    let json = serde_json::to_string_pretty(&visibility.to_feature_collection())?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(
                segments = visibility.len(),
                "wrote {}",
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_inspect(terrain: &Path, vantage: GeoPoint, target: GeoPoint, height: f64) -> CliResult {
    if !height.is_finite() || height < 0.0 {
        return Err(format!("invalid observer height {height}").into());
    }
    let grid = load_dtrn(terrain)?;
    let observer = Observer::new(vantage, height);
    let inspection = inspect(&grid, &observer, target)?;
    println!("{inspection}");
    Ok(())
}

// --- Synthetic terrain ---

/// Synthetic alpine terrain spanning 0.5° around `center`.
///
/// A north-south valley floor with ridges on both flanks, a saddle
/// crossing the eastern ridge and a few isolated summits, so sweeps
/// from the valley floor show obvious blocked sectors.
fn generate_synthetic_valley(size: u32, center: GeoPoint) -> TerrainGrid {
    let span_deg = 0.5;
    let cell_size_arcsec = (span_deg * 3600.0) / size as f64;
    let origin_lat = center.lat - span_deg / 2.0;
    let origin_lon = center.lon - span_deg / 2.0;

    TerrainGrid::generate(
        origin_lat,
        origin_lon,
        cell_size_arcsec,
        size,
        size,
        |lat, lon| {
            // Normalized coordinates: nx 0=west, 1=east; ny 0=south, 1=north
            let nx = (lon - origin_lon) / span_deg;
            let ny = (lat - origin_lat) / span_deg;
            synthetic_elevation(nx, ny)
        },
    )
}

/// Elevation (meters) at normalized coordinates.
fn synthetic_elevation(nx: f64, ny: f64) -> f64 {
    // Valley axis meanders a little around nx = 0.5
    let axis = 0.5 + 0.04 * (ny * 9.0).sin();
    let offset = (nx - axis).abs();

    let floor = 600.0 + 80.0 * ny;
    // Flanks rise from the valley floor to ridge crests about 0.3 out
    let flank = smooth_step(offset, 0.08, 0.3) * 1400.0;
    let crest_noise = 120.0 * (ny * 23.0).sin() * (nx * 17.0).cos();

    // Saddle notch in the eastern ridge
    let saddle = if nx > axis {
        600.0 * peak_elevation(nx, ny, axis + 0.28, 0.6, 0.08, 0.06, 1.0)
    } else {
        0.0
    };

    let summits = peak_elevation(nx, ny, 0.15, 0.8, 0.06, 0.06, 900.0)
        .max(peak_elevation(nx, ny, 0.85, 0.25, 0.07, 0.05, 750.0))
        .max(peak_elevation(nx, ny, 0.5, 0.1, 0.03, 0.03, 250.0));

    floor + flank + crest_noise * smooth_step(offset, 0.1, 0.25) - saddle + summits
}

/// Elliptical summit at (cx, cy) with semi-axes (rx, ry) and peak height.
fn peak_elevation(nx: f64, ny: f64, cx: f64, cy: f64, rx: f64, ry: f64, peak: f64) -> f64 {
    let dx = (nx - cx) / rx;
    let dy = (ny - cy) / ry;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq > 1.0 {
        return 0.0;
    }
    let t = 1.0 - dist_sq;
    peak * t * t
}

/// Smooth step function: 0 when x < edge0, 1 when x > edge1, smooth between.
fn smooth_step(x: f64, edge0: f64, edge1: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
