//! Strategy execution against a scenario.
//!
//! Each gene runs one action state machine: Move and Rotate step their
//! coordinate until the gene's condition holds or the track/platform
//! boundary is reached, Skip jumps once and probes for an object. Boundary
//! hits are recoverable per-action signals; execution continues with the
//! clamped state and the next gene.

use std::f32::consts::PI;

use log::debug;

use crate::schema::{Action, Condition, Genome, SensorConfig};

use super::scenario::Scenario;
use super::sight::verify_condition;

/// Per-action telemetry snapshot: sensor position, angle, and whether an
/// object was detected by the last line-of-sight check (1.0) or not (0.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub position: f32,
    pub angle: f32,
    pub status: f32,
}

/// Ordered per-gene snapshots from one simulation run.
pub type Telemetry = Vec<Snapshot>;

/// Simulation failures. Boundary hits are absorbed; only structural
/// problems with the strategy itself surface here.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SimError {
    #[error("strategy has no genes to execute")]
    EmptyStrategy,
}

/// Outcome of one action state machine.
enum ActionOutcome {
    /// The gene's condition was satisfied (or the skip completed).
    Satisfied,
    /// A track or platform boundary stopped the action first.
    Boundary,
}

/// Execute every gene of `genome` against `scenario` in order.
///
/// Returns one snapshot per gene; the scenario's sensor state persists
/// between genes, so each action starts where the previous one ended.
pub fn run_strategy(
    genome: &Genome,
    scenario: &mut Scenario,
    cfg: &SensorConfig,
) -> Result<Telemetry, SimError> {
    if genome.gene_count() == 0 {
        return Err(SimError::EmptyStrategy);
    }

    let mut telemetry = Telemetry::with_capacity(genome.gene_count());
    for gene in genome.genes() {
        let mut snap = Snapshot {
            position: scenario.sensor.position,
            angle: scenario.sensor.angle,
            status: 0.0,
        };

        let outcome = match gene.action {
            Action::MoveLeft => step_move(scenario, gene.condition, &mut snap, -1.0, cfg),
            Action::MoveRight => step_move(scenario, gene.condition, &mut snap, 1.0, cfg),
            Action::RotateLeft => step_rotate(scenario, gene.condition, &mut snap, 1.0, cfg),
            Action::RotateRight => step_rotate(scenario, gene.condition, &mut snap, -1.0, cfg),
            Action::SkipLeft => skip(scenario, &mut snap, -1.0, cfg),
            Action::SkipRight => skip(scenario, &mut snap, 1.0, cfg),
        };
        if let ActionOutcome::Boundary = outcome {
            debug!("action {:?} stopped at a boundary", gene.action);
        }

        scenario.sensor.position = snap.position;
        scenario.sensor.angle = snap.angle;
        telemetry.push(snap);
    }

    Ok(telemetry)
}

/// Step the position by `direction * lateral_step` until the condition holds
/// or the rail ends. The boundary check precedes each step, so the final
/// snapshot retains the clamped position.
fn step_move(
    scenario: &Scenario,
    condition: Condition,
    snap: &mut Snapshot,
    direction: f32,
    cfg: &SensorConfig,
) -> ActionOutcome {
    loop {
        if snap.position > 1.0 {
            snap.position = 1.0;
            return ActionOutcome::Boundary;
        }
        if snap.position < 0.0 {
            snap.position = 0.0;
            return ActionOutcome::Boundary;
        }
        snap.position += direction * cfg.lateral_step;
        if verify_condition(scenario, condition, snap, cfg) {
            return ActionOutcome::Satisfied;
        }
    }
}

/// Step the angle by `direction * angular_step` until the condition holds or
/// the platform's `[0, pi]` range ends. Overshoot clamps one step inside the
/// range.
fn step_rotate(
    scenario: &Scenario,
    condition: Condition,
    snap: &mut Snapshot,
    direction: f32,
    cfg: &SensorConfig,
) -> ActionOutcome {
    loop {
        if snap.angle > PI {
            snap.angle = PI - cfg.angular_step;
            return ActionOutcome::Boundary;
        }
        if snap.angle < 0.0 {
            snap.angle = cfg.angular_step;
            return ActionOutcome::Boundary;
        }
        snap.angle += direction * cfg.angular_step;
        if verify_condition(scenario, condition, snap, cfg) {
            return ActionOutcome::Satisfied;
        }
    }
}

/// Jump once by `direction * skip_step`, then probe for an object
/// unconditionally to set the detection status.
fn skip(
    scenario: &Scenario,
    snap: &mut Snapshot,
    direction: f32,
    cfg: &SensorConfig,
) -> ActionOutcome {
    if snap.position > 1.0 {
        snap.position = 1.0;
        return ActionOutcome::Boundary;
    }
    if snap.position < 0.0 {
        snap.position = 0.0;
        return ActionOutcome::Boundary;
    }
    snap.position += direction * cfg.skip_step;

    if verify_condition(scenario, Condition::Object, snap, cfg) {
        snap.status = 1.0;
    }
    ActionOutcome::Satisfied
}
