use std::path::PathBuf;
use std::time::Duration;

use hlog_client::replay::TICK_MS;
use hlog_client::{load_scenario, ClientConfig, HousingLogs, ScenarioStep, ScriptedHost};
use tracing::{error, info, warn};

const USAGE: &str = "Usage: hlog-replay <scenario.jsonl> [config.toml] [--realtime]";

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let realtime = args.iter().any(|a| a == "--realtime");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let Some(scenario_path) = positional.first().map(PathBuf::from) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let config_path = positional
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("hlog.toml"));

    let config = match ClientConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("hlog-replay v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", config.paths.data_dir);

    let steps = match load_scenario(&scenario_path) {
        Ok(steps) => steps,
        Err(e) => {
            error!("Failed to load scenario {}: {e}", scenario_path.display());
            std::process::exit(1);
        }
    };
    info!("Replaying {} step(s) from {}", steps.len(), scenario_path.display());

    let mut ctx = match HousingLogs::init(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to start: {e}");
            std::process::exit(1);
        }
    };
    let mut host = ScriptedHost::new(true);

    if realtime {
        run_realtime(&mut ctx, &mut host, &steps).await;
    } else {
        for step in &steps {
            host.apply(&mut ctx, step);
        }
    }

    if ctx.workflow().is_active() {
        warn!("Scenario ended with an automation job still running");
    }
    info!(
        "Sent {} command(s), showed {} message(s)",
        host.sent.len(),
        host.messages.len()
    );
    ctx.shutdown();
    info!("Replay finished");
}

/// Pace ticks at the client's real tick rate until done or Ctrl+C.
async fn run_realtime(ctx: &mut HousingLogs, host: &mut ScriptedHost, steps: &[ScenarioStep]) {
    let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
    for step in steps {
        let ticks = match step {
            ScenarioStep::Tick { count } => *count,
            other => {
                host.apply(ctx, other);
                continue;
            }
        };
        for _ in 0..ticks {
            tokio::select! {
                _ = interval.tick() => host.tick(ctx),
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl+C received, stopping replay");
                    return;
                }
            }
        }
    }
}
