use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrajectoryParams {
    pub horizon: usize,               // points per emitted trajectory
    pub control_period: f64,          // seconds between consecutive points
    pub min_maneuver_distance: f64,   // meters
    pub lookahead_time: f64,          // seconds of travel covered by one maneuver step
}

impl Default for TrajectoryParams {
    fn default() -> Self {
        Self {
            horizon: 50,
            control_period: 0.02,
            min_maneuver_distance: 15.0,
            lookahead_time: 1.75,
        }
    }
}

impl Validate for TrajectoryParams {
    fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(anyhow!("Trajectory horizon must be at least one point"));
        }

        if self.control_period <= 0.0 {
            return Err(anyhow!("Control period must be positive"));
        }

        if self.min_maneuver_distance <= 0.0 || self.lookahead_time < 0.0 {
            return Err(anyhow!("Maneuver distance must be positive and lookahead non-negative"));
        }

        Ok(())
    }
}
