//! Polyline Preview CLI
//!
//! Usage:
//!   polyline-preview serve [--config <FILE>] [--bind <ADDR>]
//!   polyline-preview render [FILE] -o <PNG> [--scale N] [--offset-x N] [--offset-y N] [--fit] [--stroke #RRGGBB]
//!   polyline-preview polylines [FILE] [--pretty]
//!
//! `serve` requires the `SECRET_KEY` environment variable. Logging is
//! controlled with `RUST_LOG` (default `info`).

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;

use polyline_preview::parser::DEFAULT_TOLERANCE;
use polyline_preview::{
    preview_with, server, DrawRequest, PolylineSource, RasterConfig, Rgb, ServerConfig, SvgParser,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "polyline-preview")]
#[command(about = "Preview SVG drawings as polylines rendered to PNG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web front-end
    Serve {
        /// Config file (TOML format)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on, overrides the config file
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Render an SVG file to a PNG file
    Render {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        scale: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        offset_x: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        offset_y: f64,

        /// Fit the drawing into the canvas first
        #[arg(long)]
        fit: bool,

        /// Curve flattening tolerance
        #[arg(long, default_value_t = DEFAULT_TOLERANCE, value_parser = parse_tolerance)]
        tolerance: f64,

        /// Canvas background color
        #[arg(long, default_value = "#AED389")]
        background: Rgb,

        /// Stroke color
        #[arg(long, default_value = "#000000")]
        stroke: Rgb,
    },

    /// Print the polylines of an SVG file as JSON
    Polylines {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Curve flattening tolerance
        #[arg(long, default_value_t = DEFAULT_TOLERANCE, value_parser = parse_tolerance)]
        tolerance: f64,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve { config, bind } => serve(config.as_deref(), bind).await,
        Command::Render {
            input,
            output,
            scale,
            offset_x,
            offset_y,
            fit,
            tolerance,
            background,
            stroke,
        } => {
            let request = DrawRequest::new()
                .with_scale(scale)
                .with_translate(offset_x, offset_y)
                .with_fit(fit);
            let raster = RasterConfig::new()
                .with_background(background)
                .with_stroke(stroke);
            render_file(input.as_deref(), &output, tolerance, &request, &raster)
        }
        Command::Polylines {
            input,
            tolerance,
            pretty,
        } => print_polylines(input.as_deref(), tolerance, pretty),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn serve(config_path: Option<&Path>, bind: Option<String>) -> CliResult {
    let mut config = ServerConfig::from_env(config_path)?;
    if let Some(bind) = bind {
        config = config.with_bind_str(&bind)?;
    }
    server::serve(config).await?;
    Ok(())
}

fn render_file(
    input: Option<&Path>,
    output: &Path,
    tolerance: f64,
    request: &DrawRequest,
    raster: &RasterConfig,
) -> CliResult {
    let svg = read_input(input)?;
    let parser = SvgParser::new().with_tolerance(tolerance);
    let preview = preview_with(&parser, &svg, request, raster)?;
    fs::write(output, &preview.png)
        .map_err(|e| format!("Error writing file '{}': {}", output.display(), e))?;
    info!(
        "Wrote {} ({} polylines, {} segments)",
        output.display(),
        preview.polylines.len(),
        preview.segments
    );
    Ok(())
}

fn print_polylines(input: Option<&Path>, tolerance: f64, pretty: bool) -> CliResult {
    let svg = read_input(input)?;
    let polylines = SvgParser::new().with_tolerance(tolerance).parse(&svg)?;
    let json = if pretty {
        serde_json::to_string_pretty(&polylines)?
    } else {
        serde_json::to_string(&polylines)?
    };
    println!("{}", json);
    Ok(())
}

fn parse_tolerance(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(t) if t.is_finite() && t > 0.0 => Ok(t),
        _ => Err(format!("'{}' is not a positive number", value)),
    }
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>, String> {
    match input {
        Some(path) => {
            fs::read(path).map_err(|e| format!("Error reading file '{}': {}", path.display(), e))
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| format!("Error reading from stdin: {}", e))?;
            Ok(buffer)
        }
    }
}
