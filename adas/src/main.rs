use anyhow::Context;
use clap::{Parser, Subcommand};
use lane_collision_adas::{render_topdown, run_replay, AdasConfig, FramePipeline};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "adas-replay")]
#[command(version)]
#[command(about = "Forward collision warning over recorded detections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a JSON Lines detection log and emit per-frame reports
    Replay {
        /// Detection records, one frame per line
        #[arg(short, long)]
        input: PathBuf,

        /// Report destination (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render the bird's-eye view of a still frame
    Topdown {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration
    DefaultConfig,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AdasConfig> {
    match path {
        Some(path) => AdasConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(AdasConfig::default()),
    }
}

fn replay(input: &Path, output: Option<&Path>, config: &AdasConfig) -> anyhow::Result<()> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );
    let mut pipeline = FramePipeline::new(config)?;

    let stats = match output {
        Some(path) => {
            let writer = BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            );
            run_replay(reader, writer, &mut pipeline)?
        }
        None => run_replay(reader, io::stdout().lock(), &mut pipeline)?,
    };

    if stats.frames_processed == 0 {
        log::warn!("No frames were processed from {}", input.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            replay(&input, output.as_deref(), &config)
        }
        Commands::Topdown {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            render_topdown(&input, &output, config.topdown)?;
            Ok(())
        }
        Commands::DefaultConfig => {
            let json = AdasConfig::default().to_json_pretty()?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
            Ok(())
        }
    }
}
