use crate::config::{PlannerConfig, VehicleParams};

use super::{LaneCosts, PlannerState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub state: PlannerState,
    pub target_speed: f64,
}

/// Picks the lane to drive in this cycle.
///
/// `actual_lane` is the lane the vehicle physically occupies, which may
/// differ from the persisted target while a lane change is in progress.
pub fn choose_lane(costs: &LaneCosts, actual_lane: usize, ego_speed: f64, params: &VehicleParams) -> usize {
    let cheapest = costs.cheapest();

    if cheapest.abs_diff(actual_lane) == 2 {
        // Never cross two lanes in one decision
        1
    } else if ego_speed < params.low_speed_threshold {
        actual_lane
    } else {
        cheapest
    }
}

/// Speed change for this cycle: brake when above `target_speed`, catch up
/// proportionally to the shortfall when below it.
pub fn target_acceleration(ego_speed: f64, target_speed: f64, params: &VehicleParams) -> f64 {
    let overspeed = (ego_speed - target_speed).clamp(0.0, 0.5);
    let catch_up = if target_speed > 0.0 {
        (1.0 - ego_speed / target_speed).max(0.0)
    } else {
        0.0
    };

    (-2.0 * overspeed + catch_up) * params.max_acceleration
}

/// Runs the lane/speed decision and integrates the reference speed once.
pub fn decide(
    state: PlannerState,
    costs: &LaneCosts,
    ego_d: f64,
    ego_speed: f64,
    config: &PlannerConfig,
) -> Decision {
    let params = &config.vehicle;
    let actual_lane = config.road.lane_of(ego_d);
    let lane = choose_lane(costs, actual_lane, ego_speed, params);
    let target_speed = costs.lane(lane).speed_cap;

    let acceleration = target_acceleration(ego_speed, target_speed, params);
    let reference_speed = (state.reference_speed + acceleration).clamp(0.0, params.max_speed);

    if lane != state.lane {
        log::info!(
            "Lane change {} -> {} (costs {:.3}/{:.3}/{:.3})",
            state.lane,
            lane,
            costs.lane(0).cost,
            costs.lane(1).cost,
            costs.lane(2).cost
        );
    }

    Decision {
        state: PlannerState {
            lane,
            reference_speed,
            reference_acceleration: acceleration,
        },
        target_speed,
    }
}
