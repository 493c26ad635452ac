use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

/// Speed, acceleration and spacing limits for the ego vehicle.
///
/// Speeds are in planner speed units (mph unless `speed_unit_mps` says
/// otherwise); distances are in meters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VehicleParams {
    pub max_speed: f64,
    pub max_acceleration: f64,     // speed change per control cycle
    pub reaction_time: f64,        // seconds
    pub max_braking: f64,          // m/s^2
    pub min_gap: f64,              // meters
    pub low_speed_threshold: f64,  // below this no lane change is committed
    pub rear_speed_scale: f64,     // closing speed that saturates the rear penalty
    pub side_lane_penalty: f64,
    pub speed_unit_mps: f64,       // meters per second in one speed unit
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            max_speed: 49.5,
            max_acceleration: 0.224,
            reaction_time: 0.5,
            max_braking: 5.0,
            min_gap: 15.0,
            low_speed_threshold: 15.0,
            rear_speed_scale: 10.0,
            side_lane_penalty: 1e-5,
            speed_unit_mps: 0.44704,
        }
    }
}

impl Validate for VehicleParams {
    fn validate(&self) -> Result<()> {
        if self.max_speed <= 0.0 || self.max_acceleration <= 0.0 {
            return Err(anyhow!("Max speed and acceleration must be positive"));
        }

        if self.reaction_time < 0.0 {
            return Err(anyhow!("Reaction time must be non-negative"));
        }

        if self.max_braking <= 0.0 {
            return Err(anyhow!("Max braking deceleration must be positive"));
        }

        if self.min_gap <= 0.0 {
            return Err(anyhow!("Minimum gap must be positive"));
        }

        if self.rear_speed_scale <= 0.0 || self.speed_unit_mps <= 0.0 {
            return Err(anyhow!("Speed scales must be positive"));
        }

        if !(0.0..1.0).contains(&self.side_lane_penalty) {
            return Err(anyhow!("Side lane penalty {} must be in range [0, 1)", self.side_lane_penalty));
        }

        Ok(())
    }
}
