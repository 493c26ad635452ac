use std::time::{Duration, Instant};

use crate::road::Point;

pub mod cost;
pub mod cycle;
pub mod decision;
pub mod spline;
pub mod trajectory;

pub use cost::*;
pub use cycle::*;
pub use decision::*;
pub use spline::*;
pub use trajectory::*;

/// Ego vehicle pose for the current cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoState {
    pub position: Point,
    pub s: f64,
    pub d: f64,
    pub yaw: f64,   // radians
    pub speed: f64, // speed units
}

/// The only state carried from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerState {
    pub lane: usize,
    pub reference_speed: f64,
    pub reference_acceleration: f64,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            lane: 1,
            reference_speed: 0.0,
            reference_acceleration: 0.0,
        }
    }
}

/// Another vehicle as reported by sensor fusion this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficObservation {
    pub s: f64,
    pub d: f64,
    pub vx: f64, // speed units
    pub vy: f64,
}

impl TrafficObservation {
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Everything one planning cycle consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleInput {
    pub ego: EgoState,
    pub previous_path: Vec<Point>,
    pub end_path_s: f64,
    pub end_path_d: f64,
    pub traffic: Vec<TrafficObservation>,
}

impl Default for EgoState {
    fn default() -> Self {
        Self {
            position: Point::origin(),
            s: 0.0,
            d: 0.0,
            yaw: 0.0,
            speed: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub points: Vec<Point>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// Rolling timing of planning cycles.
#[derive(Debug)]
pub struct CycleTimer {
    samples: Vec<Duration>,
    max_samples: usize,
    current_cycle_start: Option<Instant>,
}

impl CycleTimer {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            current_cycle_start: None,
        }
    }

    pub fn start_cycle(&mut self) {
        self.current_cycle_start = Some(Instant::now());
    }

    pub fn end_cycle(&mut self) {
        if let Some(start) = self.current_cycle_start.take() {
            if self.samples.len() >= self.max_samples {
                self.samples.remove(0);
            }
            self.samples.push(start.elapsed());
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn average_cycle_time(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }

        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    pub fn max_cycle_time(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or(Duration::ZERO)
    }
}
