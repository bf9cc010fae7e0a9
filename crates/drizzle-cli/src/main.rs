//! Drizzle CLI - headless driver for the Drizzle overlay engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, run};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drizzle")]
#[command(about = "Physics-driven particle overlay engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter when RUST_LOG is unset (e.g. "debug", "drizzle_particles=debug")
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the overlay headlessly and print a debug readout as JSON
    Run {
        /// Configuration file (TOML, or JSON by extension)
        #[arg(long)]
        config: Option<String>,

        /// Username -> symbol mapping file (JSON or TOML), read alongside --config
        #[arg(long, requires = "config")]
        user_symbols: Option<String>,

        /// Base URL serving /config and /user-mappings
        #[arg(long, conflicts_with = "config")]
        url: Option<String>,

        /// Number of frames to simulate
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Particles to spawn on the first frame
        #[arg(long, default_value = "0")]
        spawn: u32,

        /// Burst spawn of this base count on the first frame
        #[arg(long)]
        burst: Option<u32>,

        /// Likes to convert on the first frame
        #[arg(long)]
        likes: Option<u32>,

        /// Gift value in coins to convert on the first frame
        #[arg(long)]
        gift: Option<u32>,

        /// JSON-lines event script; an optional "frame" field schedules each event
        #[arg(long)]
        events: Option<String>,

        /// Override surface size (WIDTHxHEIGHT)
        #[arg(long, value_parser = parse_size)]
        size: Option<(f32, f32)>,

        /// Seed for spawn and wind randomness
        #[arg(long)]
        seed: Option<u32>,

        /// Pace frames against the wall clock instead of simulating time
        #[arg(long)]
        realtime: bool,

        /// Also print a readout every N frames
        #[arg(long)]
        readout_every: Option<u64>,
    },

    /// Print a configuration (defaults, or a file after parsing)
    Config {
        /// Configuration file to load instead of the defaults
        #[arg(long)]
        config: Option<String>,

        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("invalid width: {}", e))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("invalid height: {}", e))?;
    if w <= 0.0 || h <= 0.0 {
        return Err("size must be positive".to_string());
    }
    Ok((w, h))
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match cli.command {
        Commands::Run {
            config,
            user_symbols,
            url,
            frames,
            fps,
            spawn,
            burst,
            likes,
            gift,
            events,
            size,
            seed,
            realtime,
            readout_every,
        } => run::run(run::RunArgs {
            config,
            user_symbols,
            url,
            frames,
            fps,
            spawn,
            burst,
            likes,
            gift,
            events,
            size,
            seed,
            realtime,
            readout_every,
        }),
        Commands::Config { config, format } => config::run(config.as_deref(), &format),
    }
}
