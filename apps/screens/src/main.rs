use std::{path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use screen_core::{
    CounterController, LifeTrackerController, LifecycleRegistry, SensorController, Subscription,
    SystemClock, UniformReadings,
};
use serde::Serialize;
use shared::{domain::LifecycleSignal, error::ErrorReport};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Settings, DEFAULT_CONFIG_PATH};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "screens", about = "Drive the counter, sensor and life-tracker screens headlessly")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Print snapshots as JSON lines instead of text.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a comma separated script: inc, dec, reset, auto, interval=MS, wait=MS.
    Counter {
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "inc,inc,dec,auto,wait=3500,interval=500,wait=1600,auto"
        )]
        ops: Vec<CounterOp>,
    },
    /// Poll the simulated sensor for a while, optionally pausing midway.
    Sensor {
        #[arg(long, default_value_t = 7_000)]
        run_ms: u64,
        #[arg(long)]
        pause_after_ms: Option<u64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Feed lifecycle signals through an in-process host.
    Life {
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "create,start,resume,pause,stop,destroy"
        )]
        signals: Vec<String>,
        /// Flip the notification switch before the first signal.
        #[arg(long)]
        toggle_notify: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CounterOp {
    Increment,
    Decrement,
    Reset,
    ToggleAuto,
    Interval(String),
    Wait(Duration),
}

impl FromStr for CounterOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(raw) = s.strip_prefix("interval=") {
            return Ok(CounterOp::Interval(raw.to_string()));
        }
        if let Some(raw) = s.strip_prefix("wait=") {
            let ms = raw
                .parse::<u64>()
                .map_err(|err| format!("invalid wait {raw:?}: {err}"))?;
            return Ok(CounterOp::Wait(Duration::from_millis(ms)));
        }
        match s {
            "inc" | "+" => Ok(CounterOp::Increment),
            "dec" | "-" => Ok(CounterOp::Decrement),
            "reset" => Ok(CounterOp::Reset),
            "auto" => Ok(CounterOp::ToggleAuto),
            other => Err(format!("unknown counter op {other:?}")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Counter { ops } => run_counter(&settings, ops, cli.json).await,
        Command::Sensor {
            run_ms,
            pause_after_ms,
            seed,
        } => run_sensor(&settings, run_ms, pause_after_ms, seed, cli.json).await,
        Command::Life {
            signals,
            toggle_notify,
        } => run_life(&settings, &signals, toggle_notify, cli.json).await,
    }
}

async fn run_counter(settings: &Settings, ops: Vec<CounterOp>, json: bool) -> Result<()> {
    let mut counter = CounterController::with_interval(settings.counter_interval()?)?;
    let printer = spawn_printer(counter.subscribe(), json, |s| vec![render::counter_line(s)]);

    for op in ops {
        match op {
            CounterOp::Increment => {
                counter.increment();
            }
            CounterOp::Decrement => {
                counter.decrement();
            }
            CounterOp::Reset => {
                counter.reset();
            }
            CounterOp::ToggleAuto => {
                counter.toggle_auto();
            }
            CounterOp::Interval(raw) => {
                if let Err(err) = counter.set_interval_text(&raw) {
                    report_rejection(&ErrorReport::from(&err), json)?;
                }
            }
            CounterOp::Wait(duration) => {
                if !idle(duration).await {
                    break;
                }
            }
        }
    }

    info!(count = counter.snapshot().count, "counter session finished");
    drop(counter);
    drain(printer).await;
    Ok(())
}

async fn run_sensor(
    settings: &Settings,
    run_ms: u64,
    pause_after_ms: Option<u64>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let options = settings.sensor_options();
    let mut sensor = match seed {
        Some(seed) => SensorController::with_parts(
            options.clone(),
            UniformReadings::seeded(options.range.clone(), seed),
            Arc::new(SystemClock),
        )?,
        None => SensorController::with_options(options)?,
    };
    let printer = spawn_printer(sensor.subscribe(), json, |s| vec![render::sensor_line(s)]);

    let run = Duration::from_millis(run_ms);
    match pause_after_ms.map(Duration::from_millis) {
        Some(pause_after) if pause_after < run => {
            if idle(pause_after).await {
                sensor.pause();
                idle(run - pause_after).await;
            }
        }
        _ => {
            idle(run).await;
        }
    }

    info!(readings = sensor.snapshot().readings.len(), "sensor session finished");
    drop(sensor);
    drain(printer).await;
    Ok(())
}

async fn run_life(
    settings: &Settings,
    signals: &[String],
    toggle_notify: bool,
    json: bool,
) -> Result<()> {
    let host = Arc::new(LifecycleRegistry::new());
    let tracker = LifeTrackerController::new();
    if !settings.notify_on_transition {
        tracker.toggle_notify();
    }
    if toggle_notify {
        tracker.toggle_notify();
    }

    let mut notices = tracker.subscribe_notices();
    let notice_printer = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            println!("notice: {}", notice.message);
        }
    });
    let printer = spawn_printer(tracker.subscribe(), json, render::life_lines);

    tracker.activate(host.clone());
    for name in signals {
        match name.parse::<LifecycleSignal>() {
            Ok(signal) => host.dispatch(signal),
            Err(err) => {
                warn!(%err, "skipping lifecycle signal");
            }
        }
    }
    tracker.deactivate();

    info!(
        events = tracker.snapshot().events.len(),
        "life tracker session finished"
    );
    drop(tracker);
    drain(printer).await;
    drain(notice_printer).await;
    Ok(())
}

fn spawn_printer<S, F>(mut stream: Subscription<S>, json: bool, render: F) -> JoinHandle<()>
where
    S: Serialize + Send + Sync + 'static,
    F: Fn(&S) -> Vec<String> + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(snapshot) = stream.next().await {
            if json {
                match serde_json::to_string(&*snapshot) {
                    Ok(line) => println!("{line}"),
                    Err(err) => warn!(%err, "failed to encode snapshot"),
                }
            } else {
                for line in render(snapshot.as_ref()) {
                    println!("{line}");
                }
            }
        }
    })
}

fn report_rejection(report: &ErrorReport, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(report).context("failed to encode rejection")?;
        println!("{line}");
    } else {
        warn!(code = ?report.code, "{}", report.message);
    }
    Ok(())
}

async fn idle(duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted");
            false
        }
    }
}

async fn drain(printer: JoinHandle<()>) {
    match tokio::time::timeout(DRAIN_TIMEOUT, printer).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(%err, "printer task failed"),
        Err(_) => warn!("printer did not drain in time"),
    }
}
