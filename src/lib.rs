pub mod config;
pub mod road;
pub mod planning;
pub mod session;

pub use config::{PlannerConfig, RoadParams, TrajectoryParams, Validate, VehicleParams, LANE_COUNT};
pub use planning::{plan_cycle, CycleInput, CycleOutcome, EgoState, PlannerState, PlanningError, TrafficObservation, Trajectory};
pub use road::{Point, RoadMap, RoadMapError, Vec2, Waypoint};
pub use session::Session;
