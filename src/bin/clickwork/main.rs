//! clickwork - terminal metronome
//!
//! Run with: cargo run -- --bpm 96

mod app;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex, time::Duration};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::Clickwork;
use clickwork::{engine::ClickSound, SchedulerConfig, Tempo};

#[derive(Parser, Debug)]
#[command(name = "clickwork", version, about = "Sample-accurate terminal metronome")]
struct Args {
    /// Tempo in beats per minute (clamped to 40..=300)
    #[arg(long, default_value_t = Tempo::DEFAULT_BPM as u32)]
    bpm: u32,

    /// How far ahead clicks are queued, in milliseconds
    #[arg(long, default_value_t = 100)]
    lookahead_ms: u64,

    /// Delay between scheduling passes, in milliseconds
    #[arg(long, default_value_t = 25)]
    poll_ms: u64,

    /// Click pitch in Hz
    #[arg(long, default_value_t = 800.0)]
    frequency: f32,

    /// Write logs here (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let config = SchedulerConfig::new()
        .tempo(Tempo::clamped(args.bpm))
        .lookahead(Duration::from_millis(args.lookahead_ms))
        .poll_interval(Duration::from_millis(args.poll_ms))
        .click(ClickSound::default().frequency(args.frequency));

    Clickwork::new(config).run()
}

fn init_logging(path: Option<&PathBuf>) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match path {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }

    Ok(())
}
