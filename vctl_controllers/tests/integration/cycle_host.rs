//! CycleRunner driving a real controller against the simulated interface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use vctl_controllers::control::{Controller, MultiJointVelocityController};
use vctl_controllers::cycle::CycleRunner;
use vctl_controllers::state::LifecycleState;
use vctl_controllers::telemetry::StatePublisher;
use vctl_hal::SimulatedJointInterface;

use super::arm;

#[test]
fn runner_applies_commands_and_stops_at_zero() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);
    let probes = [hw.probe("j1").unwrap(), hw.probe("j2").unwrap()];
    let (publisher, states) = StatePublisher::channel(1_000_000.0).unwrap();
    let ctrl = MultiJointVelocityController::init(&mut hw, &["j1", "j2"], &arm())
        .unwrap()
        .with_state_publisher(publisher);
    let tx = ctrl.command_sender();

    let running = AtomicBool::new(true);
    let mut runner = CycleRunner::new(ctrl, Duration::from_micros(200)).unwrap();

    let mut cycles = 0u32;
    let mut seen_saturated = false;
    runner
        .run(&running, |dt| {
            cycles += 1;
            // Sent after `starting`, so it is picked up by the next update.
            if cycles == 2 {
                tx.send(&[4.0, -0.5]).unwrap();
            }
            if probes[0].command() == 1.0 && probes[1].command() == -0.5 {
                seen_saturated = true;
            }
            hw.advance(dt);
            if cycles == 50 {
                running.store(false, Ordering::Release);
            }
        })
        .unwrap();

    assert!(seen_saturated);
    assert_eq!(probes[0].command(), 0.0);
    assert_eq!(probes[1].command(), 0.0);

    let ctrl = runner.controller();
    assert_eq!(ctrl.lifecycle(), LifecycleState::Stopped);
    assert_eq!(ctrl.cycles(), 50);
    assert_eq!(runner.stats().cycle_count, 50);

    // j1 moved forward at 1.0, j2 backward at 0.5.
    assert!(hw.position("j1").unwrap() > 0.0);
    assert!(hw.position("j2").unwrap() < 0.0);

    let first = states.try_recv().unwrap();
    assert_eq!(first.joints.len(), 2);
    assert!(states.try_iter().any(|s| s.joints[0].error == 3.0));
}
