//! Per-lane costs derived from the surrounding traffic.
//!
//! Every observed vehicle is turned into an [`Encounter`] with the ego
//! vehicle, scored by the [`InteractionCost`] strategy matching its side
//! (ahead or behind), and the worst interaction in each lane sets that
//! lane's cost and speed cap.

use crate::config::{PlannerConfig, VehicleParams, LANE_COUNT};
use crate::road::RoadMap;

use super::TrafficObservation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneCost {
    pub cost: f64,      // in [0, 1]
    pub speed_cap: f64, // speed units
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneCosts(pub [LaneCost; LANE_COUNT]);

impl LaneCosts {
    /// Clear-road costs: the outer lanes carry a small penalty so the
    /// centre lane wins ties.
    pub fn clear(params: &VehicleParams) -> Self {
        let mut lanes = [LaneCost { cost: 0.0, speed_cap: params.max_speed }; LANE_COUNT];
        lanes[0].cost = params.side_lane_penalty;
        lanes[LANE_COUNT - 1].cost = params.side_lane_penalty;
        Self(lanes)
    }

    pub fn lane(&self, lane: usize) -> &LaneCost {
        &self.0[lane]
    }

    /// Lowest-cost lane; the first minimum wins.
    pub fn cheapest(&self) -> usize {
        let mut best = 0;
        for (lane, cost) in self.0.iter().enumerate().skip(1) {
            if cost.cost < self.0[best].cost {
                best = lane;
            }
        }
        best
    }

    fn record(&mut self, lane: usize, interaction: Interaction) {
        let slot = &mut self.0[lane];
        if interaction.cost > slot.cost {
            slot.cost = interaction.cost;
            slot.speed_cap = interaction.speed_cap;
        }
    }
}

/// Ego position used for gap computation: where the vehicle will be once
/// the unconsumed trajectory has been driven.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoProjection {
    pub s: f64,
    pub speed: f64,
}

/// Relative situation of one other vehicle with respect to the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encounter {
    /// Signed longitudinal gap in meters, positive when the other vehicle is ahead.
    pub gap: f64,
    pub ego_speed: f64,
    pub other_speed: f64,
    /// Distance the ego vehicle needs to shed its speed surplus over the
    /// other vehicle at maximum braking; negative when the other is faster.
    pub braking_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub cost: f64,
    pub speed_cap: f64,
}

pub trait InteractionCost {
    fn evaluate(&self, encounter: &Encounter, params: &VehicleParams) -> Interaction;
}

/// Vehicle ahead: cost grows as the gap closes on the required following
/// distance, and a slow leader caps the lane speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontVehicleCost;

impl InteractionCost for FrontVehicleCost {
    fn evaluate(&self, encounter: &Encounter, params: &VehicleParams) -> Interaction {
        let margin = params.min_gap.max(
            encounter.ego_speed * params.speed_unit_mps * params.reaction_time
                + encounter.braking_distance.max(0.0),
        );
        let distance_cost = (1.0 - encounter.gap / margin).max(0.0).sqrt();

        let mut speed_cost = 0.0;
        let mut speed_cap = params.max_speed;
        if encounter.gap < margin {
            speed_cost = (1.0 - encounter.other_speed / params.max_speed).max(0.0);
            speed_cap = params.max_speed.min(encounter.other_speed);
        }

        Interaction {
            cost: distance_cost.max(speed_cost),
            speed_cap,
        }
    }
}

/// Vehicle behind: cost grows as it closes in, and more so the faster it
/// approaches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RearVehicleCost;

impl InteractionCost for RearVehicleCost {
    fn evaluate(&self, encounter: &Encounter, params: &VehicleParams) -> Interaction {
        let margin = params.min_gap.max(
            encounter.other_speed * params.speed_unit_mps * params.reaction_time
                + (-encounter.braking_distance).max(0.0),
        );
        let distance_cost = (1.0 + encounter.gap / margin).max(0.0).sqrt();

        let speed_cost = if encounter.gap.abs() < margin {
            ((encounter.other_speed - encounter.ego_speed) / params.rear_speed_scale).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Interaction {
            cost: distance_cost.max(speed_cost),
            speed_cap: params.max_speed,
        }
    }
}

pub struct TrafficCostModel<'a> {
    map: &'a RoadMap,
    config: &'a PlannerConfig,
    front: FrontVehicleCost,
    rear: RearVehicleCost,
}

impl<'a> TrafficCostModel<'a> {
    pub fn new(map: &'a RoadMap, config: &'a PlannerConfig) -> Self {
        Self {
            map,
            config,
            front: FrontVehicleCost,
            rear: RearVehicleCost,
        }
    }

    /// Relates `other` to the ego vehicle once `unconsumed` points of the
    /// previous trajectory have been driven.
    pub fn encounter(&self, ego: &EgoProjection, other: &TrafficObservation, unconsumed: usize) -> Encounter {
        let other_speed = other.speed();
        let horizon = unconsumed as f64 * self.config.trajectory.control_period;
        let other_s = other.s + horizon * self.config.to_mps(other_speed);

        let ego_mps = self.config.to_mps(ego.speed);
        let other_mps = self.config.to_mps(other_speed);

        Encounter {
            gap: self.map.s_gap(ego.s, other_s),
            ego_speed: ego.speed,
            other_speed,
            braking_distance: (ego_mps.powi(2) - other_mps.powi(2))
                / (2.0 * self.config.vehicle.max_braking),
        }
    }

    pub fn interaction(&self, encounter: &Encounter) -> Interaction {
        if encounter.gap > 0.0 {
            self.front.evaluate(encounter, &self.config.vehicle)
        } else {
            self.rear.evaluate(encounter, &self.config.vehicle)
        }
    }

    /// Lane whose band strictly contains lateral offset `d`, if it is on the road.
    pub fn band_of(&self, d: f64) -> Option<usize> {
        let lane_width = self.config.road.lane_width;
        let band = (d / lane_width).floor();
        if band < 0.0 || band >= LANE_COUNT as f64 || d <= band * lane_width {
            return None;
        }
        Some(band as usize)
    }

    /// Costs of the lanes around `lane` given this cycle's traffic.
    pub fn lane_costs(
        &self,
        ego: &EgoProjection,
        lane: usize,
        unconsumed: usize,
        traffic: &[TrafficObservation],
    ) -> LaneCosts {
        let mut costs = LaneCosts::clear(&self.config.vehicle);

        for other in traffic {
            let band = match self.band_of(other.d) {
                Some(band) if band.abs_diff(lane) <= 1 => band,
                _ => continue,
            };

            let encounter = self.encounter(ego, other, unconsumed);
            let interaction = self.interaction(&encounter);
            log::trace!(
                "Vehicle at s={:.1} d={:.1}: lane {} gap {:.1}m cost {:.3}",
                other.s, other.d, band, encounter.gap, interaction.cost
            );
            costs.record(band, interaction);
        }

        // Lanes two bands away are out of reach this cycle
        for (index, slot) in costs.0.iter_mut().enumerate() {
            if index.abs_diff(lane) >= 2 {
                slot.cost = 1.0;
            }
        }

        costs
    }
}
