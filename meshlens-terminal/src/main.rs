/// meshlens - mesh statistics, format conversion and transform traces
///
/// Commands:
///   - info: vertex/edge/face counts of one or more mesh files
///   - convert: write a model in the other formats and compare the copies
///   - animate: print frames of the scripted translate/rotate/scale motion
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use meshlens_core::Config;
use meshlens_terminal::{run_animate, run_convert, run_info, ConvertOptions};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "meshlens")]
#[command(about = "Inspect, convert and transform triangle meshes", long_about = None)]
struct Cli {
    /// TOML file with [animation], [sliders] and [output] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show vertex, edge and face counts
    Info {
        /// Mesh files (.stl, .obj, .gltf, .glb)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Merge identical positions before counting
        #[arg(long)]
        weld: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a mesh to the other formats and compare the results
    Convert {
        input: PathBuf,
        /// Output directory (default from config, else "converted")
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        weld: bool,
        /// Move the bounding-box centre to the origin
        #[arg(long)]
        center: bool,
        /// Slider value for the X position
        #[arg(long, allow_hyphen_values = true)]
        position_x: Option<f32>,
        /// Slider value for the Y rotation in degrees
        #[arg(long, allow_hyphen_values = true)]
        rotation_y: Option<f32>,
        /// Slider value for the uniform scale
        #[arg(long)]
        scale: Option<f32>,
    },
    /// Trace the scripted translate/rotate/scale motion
    Animate {
        #[arg(short, long, default_value_t = 60)]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 30.0)]
        dt: f32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("failed to read config {}", path.display()))?,
        None => Config::default(),
    };

    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Info { files, weld, json } => {
            run_info(&mut stdout, &files, weld, json)?;
        }
        Commands::Convert {
            input,
            out_dir,
            weld,
            center,
            position_x,
            rotation_y,
            scale,
        } => {
            let options = ConvertOptions {
                input,
                out_dir,
                weld,
                center,
                position_x,
                rotation_y,
                scale,
            };
            run_convert(&mut stdout, &options, &config)?;
        }
        Commands::Animate { frames, dt, seed } => {
            run_animate(&mut stdout, config.animation, frames, dt, seed)?;
        }
    }

    stdout.flush()?;
    Ok(())
}
