//! Nightshade - work/rest interval timer
//!
//! CLI entry point for the timer.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use nightshade::cli::version_banner;
use nightshade::cue::CommandCue;
use nightshade::cycle::config::{Settings, SettingsLayer};
use nightshade::cycle::engine::{CycleEngine, SessionEnd};
use nightshade::log::SessionLog;
use nightshade::signal::shutdown_signal;

/// A simple pomodoro timer that logs completed work to a csv
///
/// Alternates work and rest periods until interrupted with Ctrl-C. Each
/// finished cycle, and the partial cycle running at the interrupt, is
/// appended to the log as TOPIC,COMPLETED_WORK_SECONDS,COMPLETED_REST_SECONDS,UTC_COMPLETED_AT
#[derive(Parser, Debug)]
#[command(name = "nightshade", about, disable_version_flag = true)]
struct Cli {
    /// Print program version and other metadata
    #[arg(short = 'v', long)]
    version: bool,

    /// Name of the work to be done; completed time is logged under it [default: Work]
    #[arg(short, long)]
    topic: Option<String>,

    /// Work and break lengths as work_minutes,break_minutes [default: 25,5]
    #[arg(short, long, allow_hyphen_values = true)]
    schedule: Option<String>,

    /// CSV file completed time is appended to [default: pomedoro_times.csv]
    #[arg(short, long)]
    output_path: Option<PathBuf>,

    /// Sound played when a period starts or ends (WAV, MP3 or OGG) [default: ship-bell.mp3]
    #[arg(short, long)]
    alarm_path: Option<PathBuf>,

    /// Command used to play the alarm; the sound path is appended
    #[arg(short, long)]
    player: Option<String>,

    /// TOML file with defaults for any of the options above
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// The settings given on the command line
    fn layer(&self) -> SettingsLayer {
        SettingsLayer {
            topic: self.topic.clone(),
            schedule: self.schedule.clone(),
            output_path: self.output_path.clone(),
            alarm_path: self.alarm_path.clone(),
            player: self.player.clone(),
        }
    }
}

/// Resolve settings from the command line and the optional settings file.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let file = match &cli.config {
        Some(path) => SettingsLayer::from_path(path)?,
        None => SettingsLayer::default(),
    };
    Ok(Settings::resolve(cli.layer(), file)?)
}

fn init_logging() {
    // The countdown owns the terminal line, so only warnings by default
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        print!("{}", version_banner());
        return Ok(());
    }

    init_logging();

    // Everything that can fail is checked before the log is opened
    let settings = load_settings(&cli).context("Invalid configuration")?;
    let cue = CommandCue::load(&settings.alarm_path, &settings.player)
        .context("Failed to load alarm sound")?;
    let log = SessionLog::open(&settings.output_path).context("Failed to open session log")?;

    log::debug!("Starting with {settings:?}");
    let engine = CycleEngine::new(&settings.topic, settings.schedule, cue, log);
    let mut acks = BufReader::new(tokio::io::stdin());

    match engine
        .run_until_interrupted(&mut acks, shutdown_signal())
        .await?
    {
        SessionEnd::Interrupted(record) => log::debug!("Interrupted, saved {record:?}"),
        SessionEnd::InputClosed => log::debug!("Input closed"),
    }

    // The stdin reader may still be blocked in a read; don't wait for it
    std::process::exit(0);
}
