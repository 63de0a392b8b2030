//! rasterfeat CLI - feature extraction from elevation rasters

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rasterfeat_algorithms::morphology::{clean, CleanupParams, CleanupStage};
use rasterfeat_algorithms::pipeline::{run, PipelineParams, ThresholdMode};
use rasterfeat_algorithms::regions::{vectorize, AreaModel, VectorizeParams};
use rasterfeat_algorithms::segmentation::{label, threshold_above, threshold_scalar};
use rasterfeat_algorithms::statistics::{uniform_mean, window_radius};
use rasterfeat_core::io::{read_geotiff, write_geojson_file, write_geotiff, write_labels, GeoTiffOptions};
use rasterfeat_core::{FeatureCollection, LabelGrid, Mask, Raster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "rasterfeat")]
#[command(author, version, about = "Detect relief features in rasters and export them as polygons", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Run the full pipeline: threshold, clean, label, vectorize
    Detect {
        /// Input elevation raster
        input: PathBuf,
        /// Output label raster (GeoTIFF, nodata 0)
        #[arg(long)]
        labels: PathBuf,
        /// Output features (GeoJSON)
        #[arg(long)]
        features: PathBuf,
        /// JSON parameter file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: DetectOverrides,
        /// Also write the background surface
        #[arg(long)]
        background: Option<PathBuf>,
        /// Also write the cleaned candidate mask
        #[arg(long)]
        mask: Option<PathBuf>,
        /// Print the effective parameters as JSON before running
        #[arg(long)]
        print_config: bool,
    },
    /// Moving-window mean used as the background surface
    Background {
        /// Input raster
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Window half-width in map units (radius = distance / cell size)
        #[arg(short, long, default_value = "0.25", conflicts_with = "radius")]
        distance: f64,
        /// Window radius in cells
        #[arg(short, long)]
        radius: Option<usize>,
    },
    /// Mark candidate cells (value > reference + offset)
    Threshold {
        /// Input raster
        input: PathBuf,
        /// Output mask file
        output: PathBuf,
        /// Reference surface raster, e.g. from `background`
        #[arg(long, required_unless_present = "value")]
        reference: Option<PathBuf>,
        /// Offset added to the reference surface
        #[arg(short, long, default_value = "500")]
        offset: f64,
        /// Absolute threshold instead of a reference surface
        #[arg(long, conflicts_with = "reference")]
        value: Option<f64>,
    },
    /// Denoise, close and fill a candidate mask
    Clean {
        /// Input mask (nonzero = candidate)
        input: PathBuf,
        /// Output mask file
        output: PathBuf,
        /// Majority window radius (0 disables)
        #[arg(long, default_value = "7")]
        denoise_radius: usize,
        /// Closing radius (0 disables)
        #[arg(long, default_value = "0")]
        close_radius: usize,
        /// Stage order, comma separated: denoise, close, fill
        #[arg(long, default_value = "denoise,close,fill")]
        order: String,
    },
    /// Label 8-connected regions of a mask
    Label {
        /// Input mask (nonzero = candidate)
        input: PathBuf,
        /// Output label raster
        output: PathBuf,
    },
    /// Build feature polygons from a raster and its label grid
    Vectorize {
        /// Input elevation raster
        input: PathBuf,
        /// Label raster from `label` or `detect`
        labels: PathBuf,
        /// Output GeoJSON
        output: PathBuf,
        /// Simplification tolerance in map units (default: cell size)
        #[arg(short, long)]
        tolerance: Option<f64>,
        /// Cell size is in metres rather than degrees
        #[arg(long)]
        planar: bool,
    },
}

#[derive(clap::Args)]
struct DetectOverrides {
    /// Background window half-width in map units
    #[arg(long)]
    distance: Option<f64>,
    /// Height above background
    #[arg(long)]
    offset: Option<f64>,
    /// Absolute threshold instead of background-relative
    #[arg(long, conflicts_with_all = ["distance", "offset"])]
    value: Option<f64>,
    /// Majority window radius (0 disables)
    #[arg(long)]
    denoise_radius: Option<usize>,
    /// Closing radius (0 disables)
    #[arg(long)]
    close_radius: Option<usize>,
    /// Stage order, comma separated: denoise, close, fill
    #[arg(long)]
    order: Option<String>,
    /// Simplification tolerance in map units
    #[arg(short, long)]
    tolerance: Option<f64>,
    /// Cell size is in metres rather than degrees
    #[arg(long)]
    planar: bool,
}

// ─── Helpers ────────────────────────────────────────────────────────────

const DEFAULT_DISTANCE: f64 = 0.25;
const DEFAULT_OFFSET: f64 = 500.0;

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_raster(path: &PathBuf) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn read_mask(path: &PathBuf) -> Result<Mask> {
    let pb = spinner("Reading mask...");
    let raster: Raster<u8> = read_geotiff(path)
        .with_context(|| format!("Failed to read mask {}", path.display()))?;
    pb.finish_and_clear();
    let mut data = raster.data().clone();
    data.mapv_inplace(|v| (v != 0) as u8);
    Ok(raster.derive(data)?)
}

fn read_labels(path: &PathBuf) -> Result<LabelGrid> {
    let pb = spinner("Reading labels...");
    let labels: LabelGrid = read_geotiff(path)
        .with_context(|| format!("Failed to read labels {}", path.display()))?;
    pb.finish_and_clear();
    Ok(labels)
}

fn write_raster<T: rasterfeat_core::RasterElement>(raster: &Raster<T>, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path, Some(GeoTiffOptions::default()))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn write_label_grid(labels: &LabelGrid, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing labels...");
    write_labels(labels, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn write_features(features: &FeatureCollection, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing features...");
    write_geojson_file(features, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_order(s: &str) -> Result<Vec<CleanupStage>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.to_lowercase().as_str() {
            "denoise" | "majority" => Ok(CleanupStage::Denoise),
            "close" | "closing" => Ok(CleanupStage::Close),
            "fill" | "fill_holes" => Ok(CleanupStage::Fill),
            other => bail!("Unknown cleanup stage: {}. Use denoise, close or fill", other),
        })
        .collect()
}

fn area_model(planar: bool) -> AreaModel {
    if planar {
        AreaModel::Planar
    } else {
        AreaModel::Geographic
    }
}

fn detect_params(config: Option<&PathBuf>, o: DetectOverrides) -> Result<PipelineParams> {
    let mut params = match config {
        Some(path) => PipelineParams::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineParams::default(),
    };

    if let Some(value) = o.value {
        params.threshold = ThresholdMode::Absolute { value };
    } else if o.distance.is_some() || o.offset.is_some() {
        let (d0, o0) = match params.threshold {
            ThresholdMode::Background { distance, offset } => (distance, offset),
            ThresholdMode::Absolute { .. } => (DEFAULT_DISTANCE, DEFAULT_OFFSET),
        };
        params.threshold = ThresholdMode::Background {
            distance: o.distance.unwrap_or(d0),
            offset: o.offset.unwrap_or(o0),
        };
    }
    if let Some(r) = o.denoise_radius {
        params.cleanup.denoise_radius = r;
    }
    if let Some(r) = o.close_radius {
        params.cleanup.close_radius = r;
    }
    if let Some(order) = o.order {
        params.cleanup.order = parse_order(&order)?;
    }
    if o.tolerance.is_some() {
        params.vectorize.tolerance = o.tolerance;
    }
    if o.planar {
        params.vectorize.area_model = AreaModel::Planar;
    }
    Ok(params)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            if !raster.transform().is_square() {
                println!("  (cells are not square; region statistics will fail)");
            }
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        Commands::Detect {
            input,
            labels,
            features,
            config,
            overrides,
            background,
            mask,
            print_config,
        } => {
            let params = detect_params(config.as_ref(), overrides)?;
            if print_config {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&params).context("Failed to serialize parameters")?
                );
            }
            let raster = read_raster(&input)?;
            let start = Instant::now();
            let out = run(&raster, &params).context("Feature extraction failed")?;
            let elapsed = start.elapsed();

            write_label_grid(&out.labels, &labels)?;
            write_features(&out.features, &features)?;
            if let Some(path) = background {
                match &out.background {
                    Some(bg) => write_raster(bg, &path)?,
                    None => info!("Absolute threshold: no background surface to write"),
                }
            }
            if let Some(path) = mask {
                write_raster(&out.cleaned, &path)?;
            }

            println!("Regions: {}", out.count);
            done("Labels", &labels, elapsed);
            println!("Features saved to: {}", features.display());
        }

        Commands::Background {
            input,
            output,
            distance,
            radius,
        } => {
            let raster = read_raster(&input)?;
            let radius = match radius {
                Some(r) => r,
                None => window_radius(distance, raster.cell_size())
                    .context("Invalid window distance")?,
            };
            info!("Window radius: {} cells", radius);
            let start = Instant::now();
            let result = uniform_mean(&raster, radius).context("Failed to compute background")?;
            let elapsed = start.elapsed();
            write_raster(&result, &output)?;
            done("Background", &output, elapsed);
        }

        Commands::Threshold {
            input,
            output,
            reference,
            offset,
            value,
        } => {
            let raster = read_raster(&input)?;
            let start = Instant::now();
            let result = match (value, reference) {
                (Some(v), _) => threshold_scalar(&raster, v).context("Failed to threshold")?,
                (None, Some(path)) => {
                    let surface = read_raster(&path)?;
                    threshold_above(&raster, &surface, offset).context("Failed to threshold")?
                }
                (None, None) => bail!("Either --reference or --value is required"),
            };
            let elapsed = start.elapsed();
            info!("Candidate cells: {}", result.count_nonzero());
            write_raster(&result, &output)?;
            done("Mask", &output, elapsed);
        }

        Commands::Clean {
            input,
            output,
            denoise_radius,
            close_radius,
            order,
        } => {
            let params = CleanupParams {
                denoise_radius,
                close_radius,
                order: parse_order(&order)?,
            };
            let mask = read_mask(&input)?;
            let start = Instant::now();
            let result = clean(&mask, &params).context("Failed to clean mask")?;
            let elapsed = start.elapsed();
            write_raster(&result, &output)?;
            done("Cleaned mask", &output, elapsed);
        }

        Commands::Label { input, output } => {
            let mask = read_mask(&input)?;
            let start = Instant::now();
            let (labels, count) = label(&mask).context("Failed to label regions")?;
            let elapsed = start.elapsed();
            println!("Regions: {}", count);
            write_label_grid(&labels, &output)?;
            done("Labels", &output, elapsed);
        }

        Commands::Vectorize {
            input,
            labels,
            output,
            tolerance,
            planar,
        } => {
            let raster = read_raster(&input)?;
            let grid = read_labels(&labels)?;
            let count = grid.data().iter().copied().max().unwrap_or(0).max(0) as usize;
            let params = VectorizeParams {
                tolerance,
                area_model: area_model(planar),
            };
            let start = Instant::now();
            let records =
                vectorize(&raster, &grid, count, &params).context("Failed to vectorize regions")?;
            let elapsed = start.elapsed();

            let mut collection = FeatureCollection::new(raster.crs().cloned());
            for record in records {
                collection.push(record);
            }
            write_features(&collection, &output)?;
            done("Features", &output, elapsed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> DetectOverrides {
        DetectOverrides {
            distance: None,
            offset: None,
            value: None,
            denoise_radius: None,
            close_radius: None,
            order: None,
            tolerance: None,
            planar: false,
        }
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(
            parse_order("fill, denoise").unwrap(),
            vec![CleanupStage::Fill, CleanupStage::Denoise]
        );
        assert!(parse_order("denoise,open").is_err());
        assert!(parse_order("").unwrap().is_empty());
    }

    #[test]
    fn test_overrides_apply() {
        let o = DetectOverrides {
            offset: Some(300.0),
            close_radius: Some(2),
            planar: true,
            ..no_overrides()
        };
        let p = detect_params(None, o).unwrap();
        assert_eq!(
            p.threshold,
            ThresholdMode::Background {
                distance: 0.25,
                offset: 300.0
            }
        );
        assert_eq!(p.cleanup.close_radius, 2);
        assert_eq!(p.vectorize.area_model, AreaModel::Planar);
    }

    #[test]
    fn test_absolute_override() {
        let o = DetectOverrides {
            value: Some(-3500.0),
            ..no_overrides()
        };
        let p = detect_params(None, o).unwrap();
        assert_eq!(p.threshold, ThresholdMode::Absolute { value: -3500.0 });
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "rasterfeat",
            "detect",
            "in.tif",
            "--labels",
            "l.tif",
            "--features",
            "f.geojson",
            "--close-radius",
            "1",
        ]);
        assert!(cli.is_ok());
        let bad = Cli::try_parse_from(["rasterfeat", "threshold", "in.tif", "out.tif"]);
        assert!(bad.is_err());
    }
}
