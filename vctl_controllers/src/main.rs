//! # Velocity Controller Host
//!
//! Loads the host configuration and robot description, builds a simulated
//! joint interface for the described joints, instantiates the configured
//! controller and runs it in the periodic cycle loop.
//!
//! Commands are read from stdin, one per line, as whitespace-separated
//! floats (one value per controlled joint). With `-v`, published controller
//! state is logged as JSON.

use std::io::BufRead;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use clap::Parser;
use crossbeam_channel::Receiver;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use vctl_common::config::ConfigError;
use vctl_common::consts::DEFAULT_CONFIG_PATH;
use vctl_common::hardware::JointCommandInterface;
use vctl_common::kinematics::{FileKinematicSource, KinematicSource};
use vctl_controllers::command::CommandSender;
use vctl_controllers::config::{HostConfig, load_config};
use vctl_controllers::control::{
    Controller, ControllerKind, MultiJointVelocityController, SingleJointController,
};
use vctl_controllers::cycle::{CycleRunner, rt_setup};
use vctl_controllers::telemetry::{JointControllerState, StatePublisher};
use vctl_hal::SimulatedJointInterface;

/// Saturating velocity controller host
#[derive(Parser, Debug)]
#[command(name = "vctl_controllers")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Runs a saturating joint velocity controller against simulated hardware")]
struct Args {
    /// Path to the controller host configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// CPU core to pin the cycle thread to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args.config);
    setup_tracing(&args, config.as_ref().ok());

    info!("Velocity controller host v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("FATAL: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Velocity controller host shutdown complete");
}

fn run(args: &Args, config: &HostConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctrl_cfg = &config.controller;
    info!(
        "Config OK: service={}, type={}, cycle_time={}µs, publish_rate={}Hz",
        config.shared.service_name, ctrl_cfg.kind, ctrl_cfg.cycle_time_us, ctrl_cfg.state_publish_rate
    );

    let kinematics = FileKinematicSource::new(&ctrl_cfg.robot_description);
    let model = kinematics.load()?;
    info!(
        "Robot description '{}' loaded from {} ({} joints)",
        model.name,
        kinematics.path().display(),
        model.joints.len()
    );

    let mut hw = SimulatedJointInterface::from_model(&model);

    let (publisher, telemetry) = match StatePublisher::channel(ctrl_cfg.state_publish_rate) {
        Some((publisher, rx)) => (Some(publisher), Some(rx)),
        None => (None, None),
    };

    let (controller, sender): (Box<dyn Controller>, CommandSender) = match ctrl_cfg.kind {
        ControllerKind::SingleJointController => {
            let joint = ctrl_cfg
                .joints
                .first()
                .ok_or_else(|| ConfigError::ValidationError("no joint configured".to_string()))?;
            let mut ctrl = SingleJointController::init(&mut hw, joint, &model)?;
            if let Some(publisher) = publisher {
                ctrl = ctrl.with_state_publisher(publisher);
            }
            let sender = ctrl.command_sender();
            let ctrl: Box<dyn Controller> = Box::new(ctrl);
            (ctrl, sender)
        }
        ControllerKind::MultiJointVelocityController => {
            let mut ctrl = if ctrl_cfg.joints.is_empty() {
                MultiJointVelocityController::init_all(&mut hw, &model)?
            } else {
                MultiJointVelocityController::init(&mut hw, ctrl_cfg.joints.as_slice(), &model)?
            };
            if let Some(publisher) = publisher {
                ctrl = ctrl.with_state_publisher(publisher);
            }
            let sender = ctrl.command_sender();
            let ctrl: Box<dyn Controller> = Box::new(ctrl);
            (ctrl, sender)
        }
    };

    let joint_count = sender.len();
    let _reader = spawn_command_reader(sender)?;
    let telemetry_thread = telemetry.map(spawn_state_logger).transpose()?;
    info!("Reading {joint_count}-value commands from stdin");

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut runner = CycleRunner::new(controller, ctrl_cfg.cycle_time())?;
    runner.run(&running, |dt| hw.advance(dt))?;

    // Releases handles and closes the state channel.
    drop(runner);
    if let Some(handle) = telemetry_thread {
        let _ = handle.join();
    }

    for name in hw.joint_names() {
        if let Some(position) = hw.position(&name) {
            info!("Final position {name}: {position:.4}");
        }
    }
    Ok(())
}

/// Non-RT producer: one command per stdin line.
fn spawn_command_reader(sender: CommandSender) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("command-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match parse_command(line) {
                    // Rejections are logged by the sender.
                    Ok(values) => {
                        if sender.send(&values).is_ok() {
                            debug!("Command accepted: {values:?}");
                        }
                    }
                    Err(e) => warn!("Ignoring malformed command '{line}': {e}"),
                }
            }
            debug!("Command input closed");
        })
}

fn parse_command(line: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    line.split_whitespace().map(str::parse).collect()
}

/// Log every published state sample as JSON.
fn spawn_state_logger(rx: Receiver<JointControllerState>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("state-logger".to_string())
        .spawn(move || {
            for msg in rx.iter() {
                match serde_json::to_string(&msg) {
                    Ok(json) => debug!("state {json}"),
                    Err(e) => warn!("Failed to encode controller state: {e}"),
                }
            }
        })
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, config: Option<&HostConfig>) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.map_or(Level::INFO, |c| c.shared.log_level.into())
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
