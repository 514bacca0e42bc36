//! trailguard CLI - Simulator for the tracking pipeline
//!
//! Usage:
//!   trailguard-cli simulate [--seed <n>] [--noise <m>] [--departure]
//!
//! Generates a synthetic trail and a noisy fix stream, runs a full tracking
//! session over it and prints per-band counts, helping to understand how
//! the filter and the deviation classifier behave under different noise and
//! threshold settings.

use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use trailguard::session::{
    CollectingAlertSink, ManualFixSource, MemoryBreadcrumbStore, MemoryTrailSource,
};
use trailguard::synthetic::{FixStreamConfig, SyntheticTrail};
use trailguard::{DeviationConfig, SessionConfig, SessionState, TrackingSession};

#[derive(Parser)]
#[command(name = "trailguard-cli")]
#[command(about = "Simulator for the trail tracking pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a synthetic hike through the full tracking session
    Simulate {
        /// RNG seed for trail and fix generation
        #[arg(long, default_value = "42")]
        seed: u64,

        /// GPS noise standard deviation in meters
        #[arg(long, default_value = "5.0")]
        noise: f64,

        /// Trail length in meters
        #[arg(long, default_value = "5000")]
        length: f64,

        /// Warning threshold in meters
        #[arg(long, default_value = "50.0")]
        warning: f64,

        /// Danger threshold in meters
        #[arg(long, default_value = "150.0")]
        danger: f64,

        /// Leave the trail halfway and walk perpendicular to it
        #[arg(long)]
        departure: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            seed,
            noise,
            length,
            warning,
            danger,
            departure,
        } => simulate(seed, noise, length, warning, danger, departure).await,
    }
}

async fn simulate(seed: u64, noise: f64, length: f64, warning: f64, danger: f64, departure: bool) {
    let trail = SyntheticTrail {
        length_meters: length,
        seed,
        ..Default::default()
    }
    .generate("synthetic-1", "Synthetic Ridge");

    let stream = FixStreamConfig {
        noise_sigma_meters: noise,
        seed: seed.wrapping_add(1),
        ..Default::default()
    };

    let fixes = if departure {
        let on_trail = trail.geometry.len() / 2;
        stream.departing_fixes(&trail, on_trail, 40, 10.0)
    } else {
        stream.walk_fixes(&trail)
    };

    println!(
        "trail '{}': {} points, {:.0} m",
        trail.name,
        trail.geometry.len(),
        trail.length_meters()
    );
    println!("fix stream: {} fixes, sigma {:.1} m", fixes.len(), noise);

    let trails = Arc::new(MemoryTrailSource::from_trails([trail]));
    let source = Arc::new(ManualFixSource::new());
    let store = Arc::new(MemoryBreadcrumbStore::new());
    let alerts = Arc::new(CollectingAlertSink::new());

    let config = SessionConfig {
        deviation: DeviationConfig {
            warning_threshold_meters: warning,
            danger_threshold_meters: danger,
        },
        channel_capacity: fixes.len().max(1),
        ..Default::default()
    };

    let session = TrackingSession::new(
        trails,
        Arc::clone(&source) as _,
        Arc::clone(&store) as _,
        Arc::clone(&alerts) as _,
        config,
    );

    session
        .start("synthetic-1")
        .await
        .expect("synthetic trail should resolve");

    let total = fixes.len();
    for fix in fixes {
        source.push(fix);
    }

    // Wait until every fix has been processed and persisted.
    while store.len() < total {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    session.stop();
    assert_eq!(session.state(), SessionState::Stopped);

    let breadcrumbs = store.all();
    let off_trail = breadcrumbs.iter().filter(|b| b.off_trail).count();

    println!("breadcrumbs: {}", breadcrumbs.len());
    println!("  on-trail:  {}", breadcrumbs.len() - off_trail);
    println!("  off-trail: {}", off_trail);
    println!("danger alerts: {}", alerts.len());

    if let Some(last) = store.latest() {
        println!(
            "last position: ({:.5}, {:.5}) off_trail={}",
            last.point.latitude, last.point.longitude, last.off_trail
        );
    }
}
