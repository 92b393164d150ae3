//! cavescan CLI - cave and drainage analysis for LIDAR elevation grids

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use cavescan_algorithms::classification::trim_classifications;
use cavescan_algorithms::hydrology::{
    drainage_path, find_caves_with, map_drainage_with, CaveCandidate, CaveParams, DrainageParams,
};
use cavescan_algorithms::morphology::{morphological_filter, MorphologicalParams};
use cavescan_algorithms::pits::{
    correlation_pit_filter, level_detect_with, CorrelationParams, LevelDetectParams,
};
use cavescan_algorithms::terrain::{geometric_mean_filter, slope_angle, GeometricMeanParams};
use cavescan_core::io::{read_ascii_grid, write_ascii_grid, NoDataPolicy};
use cavescan_core::{GridMetadata, Raster, RasterElement, TerrainGrid};
use cavescan_parallel::{ProcessingMode, RowScheduler};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cavescan")]
#[command(author, version, about = "Cave and drainage analysis for LIDAR elevation grids", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads for row-parallel passes (default: 2x hardware threads)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    /// Run every pass on the calling thread
    #[arg(long, global = true, conflicts_with = "threads")]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a grid file
    Info {
        /// Input ASCII grid
        input: PathBuf,
    },
    /// Depression and drainage analysis
    Hydrology {
        #[command(subcommand)]
        algorithm: HydrologyCommands,
    },
    /// Noise and pit filters
    Filter {
        #[command(subcommand)]
        algorithm: FilterCommands,
    },
    /// Surface derivatives
    Terrain {
        #[command(subcommand)]
        algorithm: TerrainCommands,
    },
}

// ─── Hydrology subcommands ──────────────────────────────────────────────

#[derive(Subcommand)]
enum HydrologyCommands {
    /// Find enclosed depressions (caves, sinkholes) by bounded flood fill
    Caves {
        /// Input ASCII grid
        input: PathBuf,
        /// Output CSV of x,y,z seeds (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Water depth poured above each seed
        #[arg(short, long, default_value = "2.0")]
        depth: f64,
        /// Region size at which a flood is abandoned
        #[arg(long, default_value = "300")]
        max_size: usize,
        /// Regions of this many cells or fewer are ignored
        #[arg(long, default_value = "5")]
        min_size: usize,
    },
    /// Count steepest-descent drainage walks through every cell
    Drainage {
        /// Input ASCII grid
        input: PathBuf,
        /// Output ASCII grid of walk counts
        output: PathBuf,
        /// Look-window half-width in cells
        #[arg(short, long, default_value = "1")]
        look: usize,
    },
    /// Print the drainage walk starting at one cell
    Path {
        /// Input ASCII grid
        input: PathBuf,
        /// Start column
        x: usize,
        /// Start row
        y: usize,
        /// Look-window half-width in cells
        #[arg(short, long, default_value = "1")]
        look: usize,
    },
}

// ─── Filter subcommands ─────────────────────────────────────────────────

#[derive(Subcommand)]
enum FilterCommands {
    /// Iterative row-wise outlier removal
    Morph {
        /// Input ASCII grid
        input: PathBuf,
        /// Output ASCII grid
        output: PathBuf,
        /// Maximum number of passes
        #[arg(long, default_value = "200")]
        max_iterations: usize,
        /// Residual percentile used as the rejection threshold
        #[arg(long, default_value = "0.5")]
        percentile: f64,
    },
    /// Correlation pit score
    Correlation {
        /// Input ASCII grid
        input: PathBuf,
        /// Output ASCII grid of scores
        output: PathBuf,
    },
    /// Disc level detection score
    LevelDetect {
        /// Input ASCII grid
        input: PathBuf,
        /// Output ASCII grid of scores
        output: PathBuf,
        /// Disc diameter in cells
        #[arg(short, long, default_value = "60")]
        diameter: usize,
        /// Count higher neighbors instead of summing differences
        #[arg(long)]
        count: bool,
    },
    /// Geometric mean smoothing
    Geomean {
        /// Input ASCII grid
        input: PathBuf,
        /// Output ASCII grid
        output: PathBuf,
        /// Odd window side length
        #[arg(short, long, default_value = "3")]
        window: usize,
    },
    /// Keep only cells of the listed point classes
    Trim {
        /// Input ASCII grid
        input: PathBuf,
        /// Output ASCII grid
        output: PathBuf,
        /// Comma-separated class codes to keep, e.g. "2,9"
        #[arg(short, long, default_value = "2")]
        keep: String,
    },
}

// ─── Terrain subcommands ────────────────────────────────────────────────

#[derive(Subcommand)]
enum TerrainCommands {
    /// Whole-degree slope angle
    Slope {
        /// Input ASCII grid
        input: PathBuf,
        /// Output ASCII grid of angles
        output: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;
    Ok(())
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn scheduler(cli: &Cli) -> Result<RowScheduler> {
    let mode = match (cli.sequential, cli.threads) {
        (true, _) => ProcessingMode::Sequential,
        (false, Some(n)) => ProcessingMode::ParallelWith(n),
        (false, None) => ProcessingMode::Parallel,
    };
    let scheduler = RowScheduler::new(mode).context("Failed to start worker pool")?;
    debug!("Scheduler: {:?} with {} workers", mode, scheduler.workers());
    Ok(scheduler)
}

fn read_grid(path: &PathBuf) -> Result<TerrainGrid> {
    let pb = spinner("Reading grid...")?;
    let grid = read_ascii_grid(path)
        .with_context(|| format!("Failed to read grid {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", grid.width(), grid.height());
    Ok(grid)
}

fn write_layer<T: RasterElement + Display>(
    raster: &Raster<T>,
    metadata: &GridMetadata,
    policy: NoDataPolicy,
    path: &PathBuf,
) -> Result<()> {
    let pb = spinner("Writing output...")?;
    write_ascii_grid(raster, metadata, policy, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn write_caves(caves: &[CaveCandidate], output: Option<&PathBuf>) -> Result<()> {
    let mut sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    writeln!(sink, "x,y,z")?;
    for cave in caves {
        writeln!(sink, "{},{},{}", cave.x, cave.y, cave.z)?;
    }
    sink.flush()?;
    Ok(())
}

fn parse_classes(s: &str) -> Result<HashSet<u8>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>()
                .with_context(|| format!("Invalid class code: {}", part))
        })
        .collect()
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match &cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let grid = read_grid(input)?;
            let meta = grid.metadata();
            let stats = grid.elevation().statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", grid.width(), grid.height(), grid.len());
            println!(
                "Bounds: ({:.3}, {:.3}) - ({:.3}, {:.3})",
                meta.left, meta.bottom, meta.right, meta.top
            );
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
                100.0 * stats.valid_count as f64 / grid.len() as f64
            );
        }

        // ── Hydrology ────────────────────────────────────────────────
        Commands::Hydrology { algorithm } => match algorithm {
            HydrologyCommands::Caves {
                input,
                output,
                depth,
                max_size,
                min_size,
            } => {
                let grid = read_grid(input)?;
                let rows = scheduler(&cli)?;
                let params = CaveParams {
                    flood_depth: *depth,
                    max_size: *max_size,
                    min_size: *min_size,
                };
                info!("Flood depth {}, region {}..{} cells", depth, min_size, max_size);

                let pb = spinner("Flooding depressions...")?;
                let start = Instant::now();
                let caves = find_caves_with(&grid, params, &rows).context("Cave detection failed")?;
                let elapsed = start.elapsed();
                pb.finish_and_clear();

                info!("Found {} cave candidates in {:.2?}", caves.len(), elapsed);
                write_caves(&caves, output.as_ref())?;
                if let Some(path) = output {
                    done("Cave candidates", path, elapsed);
                }
            }

            HydrologyCommands::Drainage { input, output, look } => {
                let grid = read_grid(input)?;
                let rows = scheduler(&cli)?;

                let pb = spinner("Tracing drainage...")?;
                let start = Instant::now();
                let acc = map_drainage_with(&grid, DrainageParams { look_distance: *look }, &rows)
                    .context("Drainage tracing failed")?;
                let elapsed = start.elapsed();
                pb.finish_and_clear();

                if let Some(max) = acc.statistics().max {
                    debug!("Peak accumulation: {}", max);
                }
                write_layer(&acc, grid.metadata(), NoDataPolicy::MarkEmpty, output)?;
                done("Drainage accumulation", output, elapsed);
            }

            HydrologyCommands::Path { input, x, y, look } => {
                let grid = read_grid(input)?;
                let path = drainage_path(&grid, *x, *y, &DrainageParams { look_distance: *look })
                    .context("Drainage walk failed")?;
                println!("step,x,y,z");
                for (i, &(px, py)) in path.iter().enumerate() {
                    println!("{},{},{},{}", i + 1, px, py, grid.elevation().at(px, py));
                }
            }
        },

        // ── Filters ──────────────────────────────────────────────────
        Commands::Filter { algorithm } => match algorithm {
            FilterCommands::Morph {
                input,
                output,
                max_iterations,
                percentile,
            } => {
                let grid = read_grid(input)?;
                let params = MorphologicalParams {
                    max_iterations: *max_iterations,
                    percentile: *percentile,
                };

                let pb = spinner("Removing outliers...")?;
                let start = Instant::now();
                let result = morphological_filter(&grid, params).context("Morphological filter failed")?;
                let elapsed = start.elapsed();
                pb.finish_and_clear();

                info!("Threshold: {}", result.threshold);
                for (i, removed) in result.removals.iter().enumerate() {
                    debug!("#{} Removal: {}", i + 1, removed);
                }
                info!(
                    "{} cells replaced in {} iterations{}",
                    result.total_removals(),
                    result.iterations,
                    if result.converged { "" } else { " (iteration cap reached)" }
                );
                write_layer(
                    result.grid.elevation(),
                    result.grid.metadata(),
                    NoDataPolicy::MarkEmpty,
                    output,
                )?;
                done("Filtered grid", output, elapsed);
            }

            FilterCommands::Correlation { input, output } => {
                let grid = read_grid(input)?;
                let start = Instant::now();
                let scored = correlation_pit_filter(&grid, CorrelationParams::default())
                    .context("Correlation filter failed")?;
                let elapsed = start.elapsed();
                write_layer(scored.elevation(), scored.metadata(), NoDataPolicy::Verbatim, output)?;
                done("Correlation scores", output, elapsed);
            }

            FilterCommands::LevelDetect {
                input,
                output,
                diameter,
                count,
            } => {
                let grid = read_grid(input)?;
                let rows = scheduler(&cli)?;
                let params = LevelDetectParams {
                    diameter: *diameter,
                    count: *count,
                };

                let pb = spinner("Scoring levels...")?;
                let start = Instant::now();
                let scores = level_detect_with(&grid, params, &rows).context("Level detection failed")?;
                let elapsed = start.elapsed();
                pb.finish_and_clear();

                write_layer(&scores, grid.metadata(), NoDataPolicy::Verbatim, output)?;
                done("Level scores", output, elapsed);
            }

            FilterCommands::Geomean { input, output, window } => {
                let grid = read_grid(input)?;
                let start = Instant::now();
                let smoothed = geometric_mean_filter(&grid, GeometricMeanParams { window: *window })
                    .context("Geometric mean filter failed")?;
                let elapsed = start.elapsed();
                write_layer(
                    smoothed.elevation(),
                    smoothed.metadata(),
                    NoDataPolicy::MarkEmpty,
                    output,
                )?;
                done("Smoothed grid", output, elapsed);
            }

            FilterCommands::Trim { input, output, keep } => {
                let classes = parse_classes(keep)?;
                if classes.is_empty() {
                    bail!("No class codes given to keep");
                }
                let grid = read_grid(input)?;
                let start = Instant::now();
                let trimmed = trim_classifications(&grid, &classes).context("Trim failed")?;
                let elapsed = start.elapsed();
                let kept = trimmed.elevation().statistics().valid_count;
                info!("Kept {} of {} cells", kept, trimmed.len());
                write_layer(
                    trimmed.elevation(),
                    trimmed.metadata(),
                    NoDataPolicy::MarkEmpty,
                    output,
                )?;
                done("Trimmed grid", output, elapsed);
            }
        },

        // ── Terrain ──────────────────────────────────────────────────
        Commands::Terrain { algorithm } => match algorithm {
            TerrainCommands::Slope { input, output } => {
                let grid = read_grid(input)?;
                let start = Instant::now();
                let angles = slope_angle(&grid).context("Failed to calculate slope")?;
                let elapsed = start.elapsed();
                write_layer(&angles, grid.metadata(), NoDataPolicy::MarkEmpty, output)?;
                done("Slope angle", output, elapsed);
            }
        },
    }

    Ok(())
}
