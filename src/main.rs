use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{BufRead, Write};
use std::sync::Arc;

use highway_planner::{
    config::PlannerConfig,
    road::RoadMap,
    session::{server, Session},
};

#[derive(Parser)]
#[command(name = "highway-planner")]
#[command(about = "Plans lane, speed and trajectory once per simulator telemetry frame")]
struct Args {
    /// Road centerline file with `x y s dx dy` records
    #[arg(short, long)]
    map: String,

    /// Planner configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Address to accept simulator connections on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// WebSocket port the simulator connects to
    #[arg(short, long, default_value_t = server::DEFAULT_PORT)]
    port: u16,

    /// Read frames line by line from stdin and answer on stdout instead of listening
    #[arg(long)]
    stdin: bool,

    /// Log cycle timing every this many planning cycles (0 disables)
    #[arg(long, default_value_t = 500)]
    stats_every: u64,

    /// Enable verbose logging of every planning decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting Highway Planner");

    // Load configuration
    let config = match &args.config {
        Some(path) => {
            info!("Loading planner configuration from: {}", path);
            PlannerConfig::load_from_file(path)?
        }
        None => PlannerConfig::default(),
    };

    let map = RoadMap::load(&args.map, config.road.max_s)
        .with_context(|| format!("Failed to load road map {}", args.map))?;
    info!(
        "Loaded road map: {} waypoints, track length {:.1}m",
        map.waypoints().len(),
        map.max_s()
    );

    if args.verbose {
        info!(
            "Limits: {:.1} max speed, {:.3} per-cycle acceleration, {:.2}s reaction time",
            config.vehicle.max_speed, config.vehicle.max_acceleration, config.vehicle.reaction_time
        );
        info!(
            "Trajectory: {} points every {:.3}s",
            config.trajectory.horizon, config.trajectory.control_period
        );
    }

    let map = Arc::new(map);

    if args.stdin {
        return run_stdin(Session::new(map, config), args.stats_every);
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        let listener = server::bind(&args.host, args.port).await?;
        server::serve(listener, map, config, args.stats_every).await;
        Ok::<(), anyhow::Error>(())
    })
}

fn run_stdin(mut session: Session, stats_every: u64) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read frame from stdin")?;

        if let Some(reply) = session.handle_message(line.trim_end()) {
            writeln!(stdout, "{}", reply)?;
            stdout.flush()?;
        }
        session.log_progress(stats_every);
    }

    info!("Input closed after {} planning cycles", session.cycles());
    Ok(())
}
