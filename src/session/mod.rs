use std::sync::Arc;

use crate::config::PlannerConfig;
use crate::planning::{plan_cycle, CycleInput, CycleTimer, PlannerState, Trajectory};
use crate::road::RoadMap;

pub mod protocol;
pub mod server;

pub use protocol::{decode, encode_control, Incoming, Telemetry, MANUAL};

const TIMING_SAMPLES: usize = 250;

/// Planner for one vehicle. Owns the state carried between cycles; the
/// road map may be shared with other sessions.
pub struct Session {
    map: Arc<RoadMap>,
    config: PlannerConfig,
    state: PlannerState,
    timer: CycleTimer,
    cycles: u64,
    reported_at: u64,
}

impl Session {
    pub fn new(map: Arc<RoadMap>, config: PlannerConfig) -> Self {
        Self {
            map,
            config,
            state: PlannerState::default(),
            timer: CycleTimer::new(TIMING_SAMPLES),
            cycles: 0,
            reported_at: 0,
        }
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn timer(&self) -> &CycleTimer {
        &self.timer
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Answers one raw simulator frame. `None` means nothing should be sent.
    pub fn handle_message(&mut self, raw: &str) -> Option<String> {
        match decode(raw) {
            Incoming::Ignored => None,
            Incoming::Manual => Some(MANUAL.to_string()),
            Incoming::Telemetry(telemetry) => {
                let input = telemetry.to_cycle_input(&self.config);
                let trajectory = self.step(&input);
                Some(encode_control(&trajectory))
            }
        }
    }

    /// Logs lane, reference speed and cycle timing once every `every`
    /// planned cycles; 0 disables.
    pub fn log_progress(&mut self, every: u64) {
        if every == 0 || self.cycles == self.reported_at || self.cycles % every != 0 {
            return;
        }
        self.reported_at = self.cycles;

        log::info!(
            "Cycle {}: lane {}, vref {:.1}, avg {:.3}ms, max {:.3}ms",
            self.cycles,
            self.state.lane,
            self.state.reference_speed,
            self.timer.average_cycle_time().as_secs_f64() * 1000.0,
            self.timer.max_cycle_time().as_secs_f64() * 1000.0
        );
    }

    /// Runs one planning cycle and commits its state. A failed cycle keeps
    /// the previous state and hands back the unconsumed path.
    pub fn step(&mut self, input: &CycleInput) -> Trajectory {
        self.timer.start_cycle();
        let result = plan_cycle(&self.map, &self.config, self.state, input);
        self.timer.end_cycle();
        self.cycles += 1;

        match result {
            Ok(outcome) => {
                self.state = outcome.state;
                outcome.trajectory
            }
            Err(e) => {
                log::warn!("Planning cycle {} failed: {}", self.cycles, e);
                Trajectory {
                    points: input.previous_path.clone(),
                }
            }
        }
    }
}
