use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

/// Number of lanes on the driving side of the highway.
pub const LANE_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoadParams {
    pub lane_width: f64,    // meters
    pub max_s: f64,         // track length before s wraps back to 0
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            lane_width: 4.0,
            max_s: 6945.554,
        }
    }
}

impl RoadParams {
    /// Lateral offset of the centre of `lane`.
    pub fn lane_center(&self, lane: usize) -> f64 {
        (lane as f64 + 0.5) * self.lane_width
    }

    /// Lane index containing lateral offset `d`, clamped to the road.
    pub fn lane_of(&self, d: f64) -> usize {
        let lane = (d / self.lane_width).floor();
        if lane <= 0.0 {
            0
        } else {
            (lane as usize).min(LANE_COUNT - 1)
        }
    }
}

impl Validate for RoadParams {
    fn validate(&self) -> Result<()> {
        if self.lane_width <= 0.0 {
            return Err(anyhow!("Lane width must be positive"));
        }

        if self.max_s <= 0.0 {
            return Err(anyhow!("Track length max_s must be positive"));
        }

        Ok(())
    }
}
