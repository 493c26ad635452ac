use thiserror::Error;

use crate::config::{PlannerConfig, LANE_COUNT};
use crate::road::RoadMap;

use super::{
    decide, CycleInput, EgoProjection, LaneCosts, PlannerState, SplineError, TrafficCostModel, Trajectory,
    TrajectorySynthesizer,
};

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("planner lane {0} is outside the road")]
    LaneOutOfRange(usize),
    #[error("could not fit trajectory through anchors: {0}")]
    Curve(#[from] SplineError),
}

/// Result of one planning cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub state: PlannerState,
    pub costs: LaneCosts,
    pub target_speed: f64,
    pub trajectory: Trajectory,
}

/// One full planning cycle: score lanes, decide lane and speed, synthesize
/// the trajectory. `state` is the outcome of the previous cycle; the new
/// state is returned rather than written in place.
pub fn plan_cycle(
    map: &RoadMap,
    config: &PlannerConfig,
    state: PlannerState,
    input: &CycleInput,
) -> Result<CycleOutcome, PlanningError> {
    if state.lane >= LANE_COUNT {
        return Err(PlanningError::LaneOutOfRange(state.lane));
    }

    let ego = &input.ego;
    let unconsumed = input.previous_path.len();
    let start_s = if unconsumed > 0 { input.end_path_s } else { ego.s };
    let projection = EgoProjection { s: start_s, speed: ego.speed };

    let costs = TrafficCostModel::new(map, config).lane_costs(&projection, state.lane, unconsumed, &input.traffic);
    let decision = decide(state, &costs, ego.d, ego.speed, config);

    let trajectory = TrajectorySynthesizer::new(map, config).synthesize(
        ego,
        &input.previous_path,
        start_s,
        decision.state.lane,
        decision.state.reference_speed,
    )?;

    log::debug!(
        "s={:.1} speed={:.1} lane={} target={:.1} vref={:.2} acc={:+.3} reused={} total={}",
        start_s,
        ego.speed,
        decision.state.lane,
        decision.target_speed,
        decision.state.reference_speed,
        decision.state.reference_acceleration,
        unconsumed,
        trajectory.len()
    );

    Ok(CycleOutcome {
        state: decision.state,
        costs,
        target_speed: decision.target_speed,
        trajectory,
    })
}
