use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod road;
pub mod trajectory;
pub mod vehicle;

pub use road::*;
pub use trajectory::*;
pub use vehicle::*;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub road: RoadParams,
    #[serde(default)]
    pub vehicle: VehicleParams,
    #[serde(default)]
    pub trajectory: TrajectoryParams,
}

impl PlannerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read planner configuration {}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(content)?;

        // Validate configurations
        config.validate()?;

        Ok(config)
    }

    /// Converts a speed expressed in planner speed units into metres per second.
    pub fn to_mps(&self, speed: f64) -> f64 {
        speed * self.vehicle.speed_unit_mps
    }
}

impl Validate for PlannerConfig {
    fn validate(&self) -> Result<()> {
        self.road.validate()?;
        self.vehicle.validate()?;
        self.trajectory.validate()?;
        Ok(())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}
