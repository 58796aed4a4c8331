use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use biome_mapper::config::MapConfig;
use biome_mapper::error::Result;
use biome_mapper::generator::AutomatonMode;
use biome_mapper::jitter::JitterMode;
use biome_mapper::session::Session;
use biome_mapper::{app, export, logging};

#[derive(Parser, Debug)]
#[command(name = "biome_mapper")]
#[command(about = "Generate noise biome maps and explore them with pan and zoom")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width of the grid in cells
    #[arg(short = 'W', long, allow_negative_numbers = true)]
    width: Option<i64>,

    /// Height of the grid in cells
    #[arg(short = 'H', long, allow_negative_numbers = true)]
    height: Option<i64>,

    /// Window width in pixels
    #[arg(long)]
    screen_width: Option<usize>,

    /// Window height in pixels
    #[arg(long)]
    screen_height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Noise frequency; higher means smaller features
    #[arg(short, long)]
    frequency: Option<f64>,

    /// How biome colours are jittered
    #[arg(long, value_enum)]
    jitter: Option<JitterMode>,

    /// How the land-growth automaton updates the grid
    #[arg(long, value_enum)]
    automaton: Option<AutomatonMode>,

    /// Directory for exported bitmaps
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Generate one biome map, export it and exit without opening a window
    #[arg(long)]
    headless: bool,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Log file path
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long)]
    no_log_file: bool,
}

impl Args {
    fn apply(&self, mut config: MapConfig) -> MapConfig {
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(w) = self.screen_width {
            config.screen_width = w;
        }
        if let Some(h) = self.screen_height {
            config.screen_height = h;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(frequency) = self.frequency {
            config.frequency = frequency;
        }
        if let Some(jitter) = self.jitter {
            config.jitter = jitter;
        }
        if let Some(mode) = self.automaton {
            config.automaton.mode = mode;
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.log_file = Some(file.clone());
        }
        if self.no_log_file {
            config.log_file = None;
        }
        config
    }
}

fn load_config(args: &Args) -> Result<MapConfig> {
    let base = match &args.config {
        Some(path) => MapConfig::load(path)?,
        None => MapConfig::default(),
    };
    Ok(args.apply(base))
}

fn run(config: MapConfig, headless: bool) -> Result<()> {
    let mut session = Session::new(config)?;

    if headless {
        export::export_maps(session.grid(), &session.config().export_dir, session.seed())?;
        return Ok(());
    }

    app::run(&mut session)?;
    info!("shutting down");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logging comes up before the config is checked so a bad config file is
    // still reported through it.
    let loaded = load_config(&args);
    let fallback = args.apply(MapConfig::default());
    let log_config = loaded.as_ref().unwrap_or(&fallback);
    logging::init_logging(&log_config.log_level, log_config.log_file.as_deref());

    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load configuration: {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    match run(config, args.headless) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
