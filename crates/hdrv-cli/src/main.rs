//! hdrv - HDR/WCG image inspection and rendering CLI
//!
//! Runs the viewer's color pipeline on the CPU device.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hdrv_pipeline::RenderMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod icc;
mod loader;

#[derive(Parser)]
#[command(name = "hdrv")]
#[command(author, version, about = "HDR/WCG image inspection and rendering")]
#[command(long_about = "
Classifies images as SDR, WCG or HDR, measures their content light level
and renders them through the display pipeline.

Examples:
  hdrv info photo.jpg scene.exr         # Kind and max/median CLL
  hdrv info scene.exr --json
  hdrv render scene.exr --display sdr --mode tonemap -o preview.png
  hdrv render pano.hdr --mode sphere --size 1024x512 -o sphere.png
  hdrv render base.jpg --gain-map gain.png --probe 10,10
  hdrv graph --mode heatmap --display wcg
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Pipeline config (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify images and measure content light level
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Render an image through the display pipeline
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Print the stage graph for a configuration
    Graph(GraphArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Treat integer input as BT.2100 PQ
    #[arg(long)]
    bt2100: bool,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG (8-bit sRGB, clipped to SDR range)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render mode: none, tonemap, sdr-overlay, heatmap, max-luminance, sphere
    #[arg(short, long, default_value = "none")]
    mode: RenderMode,

    /// Display: sdr, wcg, hdr, none
    #[arg(short, long, default_value = "sdr")]
    display: String,

    /// Display peak luminance in nits
    #[arg(long)]
    peak_nits: Option<f32>,

    /// Display SDR white level in nits
    #[arg(long)]
    sdr_white: Option<f32>,

    /// Tonemap target override in nits (0 = display peak)
    #[arg(long, default_value = "0")]
    target_nits: f32,

    /// Exposure adjustment in stops
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    exposure: f32,

    /// Disable the display gamut constraint
    #[arg(long)]
    no_gamut: bool,

    /// Gain map image (single channel)
    #[arg(long)]
    gain_map: Option<PathBuf>,

    /// Treat integer input as BT.2100 PQ
    #[arg(long)]
    bt2100: bool,

    /// Render target size WxH (default: image size)
    #[arg(short, long)]
    size: Option<String>,

    /// Print the rendered pixel at X,Y (repeatable)
    #[arg(short, long)]
    probe: Vec<String>,
}

#[derive(Args)]
struct GraphArgs {
    /// Render mode
    #[arg(short, long, default_value = "none")]
    mode: RenderMode,

    /// Display: sdr, wcg, hdr, none
    #[arg(short, long, default_value = "sdr")]
    display: String,

    /// Image carries a gain map
    #[arg(long)]
    gain_map: bool,

    /// Disable the display gamut constraint
    #[arg(long)]
    no_gamut: bool,

    /// Device without a luminance tonemapper
    #[arg(long)]
    no_tonemap_cap: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Info(args) => commands::info::run(args, config, cli.verbose),
        Commands::Render(args) => commands::render::run(args, config, cli.verbose),
        Commands::Graph(args) => commands::graph::run(args),
    }
}
