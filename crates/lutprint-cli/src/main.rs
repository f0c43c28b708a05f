//! lutprint - recover a 3D LUT from any color transform
//!
//! Generates a lattice pattern image, and after an external tool has graded
//! it, reads the tiles back into a `.cube` file.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use lutprint_core::Layout;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "lutprint")]
#[command(author, version, about = "Capture any color transform as a .cube LUT")]
#[command(long_about = "
Encodes a 3D color lattice as an image of solid tiles. Run that image
through any color transform (a grading app, a filter, a script), then
extract a .cube LUT that reproduces the transform.

Examples:
  lutprint generate -n 33 -m 4 -o pattern.png   # Pattern for a 33^3 LUT
  lutprint detect graded.png                    # Show recovered geometry
  lutprint extract graded.png -o look.cube      # Recover the LUT
  lutprint filter pattern.png -o warm.png -e 'R *= 1.1; B *= 0.9'
  lutprint test-pixel -e 'R = 255 - R' --rgb 10,20,30
  lutprint apply photo.png --lut look.cube -o graded_photo.png
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only print errors and results; hide progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the identity pattern image
    #[command(visible_alias = "g")]
    Generate(GenerateArgs),

    /// Detect lattice geometry from image dimensions
    #[command(visible_alias = "d")]
    Detect(DetectArgs),

    /// Sample a transformed pattern into a .cube LUT
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Run a per-pixel script over an image
    #[command(visible_alias = "f")]
    Filter(FilterArgs),

    /// Run a per-pixel script on one color
    #[command(name = "test-pixel", visible_alias = "tp")]
    TestPixel(TestPixelArgs),

    /// Apply a .cube LUT to an image
    Apply(ApplyArgs),
}

/// Script source, from a file or inline.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct ScriptSource {
    /// Script file
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Inline script source
    #[arg(short = 'e', long = "expr")]
    expr: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Lattice points per channel (N)
    #[arg(short = 'n', long = "size", default_value_t = 17)]
    size: u32,

    /// Tile edge in pixels (M)
    #[arg(short = 'm', long = "tile", default_value_t = 8)]
    tile: u32,

    /// Tile grid orientation: wide, tall
    #[arg(short, long, default_value = "wide")]
    layout: Layout,

    /// Output PNG (default: lut_pattern_N<N>_M<M>_<layout>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Largest image edge the target tool accepts
    #[arg(long = "max-dim", env = "LUTPRINT_MAX_DIM", default_value_t = lutprint_ops::DEFAULT_MAX_DIMENSION)]
    max_dim: u32,
}

#[derive(Args)]
struct DetectArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Transformed pattern image
    input: PathBuf,

    /// Output .cube (default: input name with .cube extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Lattice size; with --tile and --layout skips detection
    #[arg(short = 'n', long = "size", requires_all = ["tile", "layout"])]
    size: Option<u32>,

    /// Tile size
    #[arg(short = 'm', long = "tile", requires_all = ["size", "layout"])]
    tile: Option<u32>,

    /// Layout: wide, tall
    #[arg(short, long, requires_all = ["size", "tile"])]
    layout: Option<Layout>,

    /// Print the .cube to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
}

#[derive(Args)]
struct FilterArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    source: ScriptSource,
}

#[derive(Args)]
struct TestPixelArgs {
    #[command(flatten)]
    source: ScriptSource,

    /// Input color as R,G,B (0-255)
    #[arg(long, value_parser = parse_rgb, default_value = "128,128,128")]
    rgb: [u8; 3],
}

fn parse_rgb(s: &str) -> std::result::Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts[..] else {
        return Err(format!("expected R,G,B, got '{s}'"));
    };
    let channel = |v: &str| v.parse::<u8>().map_err(|_| format!("'{v}' is not a value in 0-255"));
    Ok([channel(r)?, channel(g)?, channel(b)?])
}

#[derive(Args)]
struct ApplyArgs {
    /// Input image
    input: PathBuf,

    /// .cube LUT file
    #[arg(short = 'l', long)]
    lut: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Nearest-neighbour lookup instead of trilinear
    #[arg(long)]
    nearest: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbose > 1))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let ui = commands::Ui {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    match cli.command {
        Commands::Generate(args) => commands::generate::run(args, ui),
        Commands::Detect(args) => commands::detect::run(args, ui),
        Commands::Extract(args) => commands::extract::run(args, ui),
        Commands::Filter(args) => commands::filter::run(args, ui),
        Commands::TestPixel(args) => commands::test_pixel::run(args, ui),
        Commands::Apply(args) => commands::apply::run(args, ui),
    }
}
