use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use circuit_core::{Settings, GLOBAL_CONFIG};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::agent::EpisodeEnd;

mod agent;
mod events;
mod session;

#[derive(Parser)]
#[command(name = "circuit-server")]
#[command(about = "Replay recorded racing simulation events through the checkpoint tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Recorded simulation events, one JSON object per line
    events: PathBuf,

    /// Settings file to use instead of ./config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of checkpoints on the track
    #[arg(long)]
    checkpoints: Option<usize>,

    /// Number of vehicles to register
    #[arg(long)]
    vehicles: Option<u32>,

    /// Pace the replay at the configured tick length
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?,
        None => GLOBAL_CONFIG.clone(),
    };
    if let Some(checkpoints) = cli.checkpoints {
        settings.checkpoint_count = checkpoints;
    }
    if let Some(vehicles) = cli.vehicles {
        settings.vehicle_amount = vehicles;
    }
    settings.realtime |= cli.realtime;

    init_logging(&settings.log_filter);

    let file = File::open(&cli.events)
        .with_context(|| format!("failed to open event log {}", cli.events.display()))?;
    let events = events::read_events(BufReader::new(file))?;
    info!(count = events.len(), "loaded recorded events");

    let mut session = session::TrainingSession::new(&settings)
        .context("could not set up the training session")?;
    session.replay(&events)?;

    for agent in session.agents() {
        let episodes: Vec<_> = session
            .summaries()
            .iter()
            .filter(|summary| summary.vehicle == agent.vehicle())
            .collect();
        let completed = episodes
            .iter()
            .filter(|summary| summary.end == EpisodeEnd::CourseCompleted)
            .count();
        let next_checkpoint = agent.next_checkpoint(session.tracker())?.index();

        info!(
            vehicle = %agent.vehicle(),
            episode = agent.episode(),
            finished_episodes = episodes.len(),
            completed,
            next_checkpoint,
            current_episode_reward = agent.episode_reward(),
            total_reward = agent.total_reward(),
            "vehicle report"
        );
    }

    Ok(())
}

// RUST_LOG wins over the configured filter
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
