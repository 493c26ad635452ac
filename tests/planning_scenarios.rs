use highway_planner::{
    config::PlannerConfig,
    planning::{plan_cycle, CycleInput, EgoState, PlannerState, TrafficObservation},
    road::{testing::ring_map, Point, RoadMap, Vec2},
};

fn ego_on_road(map: &RoadMap, s: f64, d: f64, speed: f64) -> EgoState {
    let position = map.to_planar_frame(s, d);
    let ahead = map.to_planar_frame(s + 1.0, d) - position;
    EgoState {
        position,
        s,
        d,
        yaw: ahead.y.atan2(ahead.x),
        speed,
    }
}

#[test]
fn clear_road_keeps_lane_and_accelerates() {
    let map = ring_map(1000.0, 360).unwrap();
    let config = PlannerConfig::default();
    let state = PlannerState { lane: 1, reference_speed: 20.0, reference_acceleration: 0.0 };
    let input = CycleInput {
        ego: ego_on_road(&map, 100.0, 6.0, 20.0),
        ..CycleInput::default()
    };

    let outcome = plan_cycle(&map, &config, state, &input).unwrap();

    let penalty = config.vehicle.side_lane_penalty;
    assert_eq!(outcome.costs.lane(0).cost, penalty);
    assert_eq!(outcome.costs.lane(1).cost, 0.0);
    assert_eq!(outcome.costs.lane(2).cost, penalty);
    assert_eq!(outcome.state.lane, 1);

    let gained = outcome.state.reference_speed - state.reference_speed;
    assert!(gained > 0.0 && gained <= config.vehicle.max_acceleration);

    assert_eq!(outcome.trajectory.len(), config.trajectory.horizon);
    let spacing = config.trajectory.control_period * config.to_mps(outcome.state.reference_speed);
    let heading = Vec2::new(input.ego.yaw.cos(), input.ego.yaw.sin());
    let mut previous = input.ego.position;
    for point in &outcome.trajectory.points {
        let step = point - previous;
        assert!(step.dot(&heading) > 0.0, "points must advance along the road");
        assert!((step.norm() - spacing).abs() < 0.01);

        let (_, d) = map.to_road_frame(point, input.ego.yaw);
        assert!((d - 6.0).abs() < 0.5);
        previous = *point;
    }
}

#[test]
fn blocked_lane_triggers_change_to_clear_neighbour() {
    let map = ring_map(1000.0, 360).unwrap();
    let config = PlannerConfig::default();
    let state = PlannerState { lane: 1, reference_speed: 20.0, reference_acceleration: 0.0 };

    let ego = ego_on_road(&map, 100.0, 6.0, 20.0);
    let input = CycleInput {
        ego,
        traffic: vec![TrafficObservation { s: 110.0, d: 6.0, vx: 20.0, vy: 0.0 }],
        ..CycleInput::default()
    };

    let outcome = plan_cycle(&map, &config, state, &input).unwrap();

    assert!(outcome.costs.lane(1).cost > outcome.costs.lane(0).cost);
    assert_eq!(outcome.state.lane, 0);

    // The sampled points start drifting towards lane 0
    let last = outcome.trajectory.points.last().unwrap();
    let (_, d) = map.to_road_frame(last, ego.yaw);
    assert!(d < 6.0);
}

#[test]
fn blocked_neighbour_keeps_current_lane() {
    let map = ring_map(1000.0, 360).unwrap();
    let config = PlannerConfig::default();
    let state = PlannerState { lane: 0, reference_speed: 20.0, reference_acceleration: 0.0 };

    let input = CycleInput {
        ego: ego_on_road(&map, 100.0, 2.0, 20.0),
        traffic: vec![
            TrafficObservation { s: 110.0, d: 2.0, vx: 20.0, vy: 0.0 },
            TrafficObservation { s: 105.0, d: 6.0, vx: 10.0, vy: 0.0 },
        ],
        ..CycleInput::default()
    };

    let outcome = plan_cycle(&map, &config, state, &input).unwrap();
    assert_eq!(outcome.costs.lane(2).cost, 1.0);
    assert!(outcome.costs.lane(1).cost > outcome.costs.lane(0).cost);
    assert_eq!(outcome.state.lane, 0);
    assert_eq!(outcome.target_speed, 20.0);
}

/// Drives the planner in closed loop: each cycle the vehicle consumes a few
/// points of the last trajectory and reports the rest back, across the
/// point where `s` wraps to zero and past a slow vehicle.
#[test]
fn closed_loop_drive_holds_invariants() {
    let map = ring_map(1000.0, 360).unwrap();
    let config = PlannerConfig::default();
    let period = config.trajectory.control_period;
    let unit = config.vehicle.speed_unit_mps;

    let start_s = map.max_s() - 100.0;
    let mut ego = ego_on_road(&map, start_s, 6.0, 0.0);
    let mut remaining: Vec<Point> = Vec::new();
    let mut state = PlannerState::default();

    let slow_speed = 20.0;
    let mut slow_s = map.wrap_s(start_s + 40.0);

    let mut changed_lane = false;
    let mut travelled = 0.0;

    for cycle in 0..1000 {
        let end_path_s = match remaining.last() {
            Some(last) => map.to_road_frame(last, ego.yaw).0,
            None => 0.0,
        };
        let input = CycleInput {
            ego,
            previous_path: remaining.clone(),
            end_path_s,
            end_path_d: 0.0,
            traffic: vec![TrafficObservation { s: slow_s, d: 6.0, vx: slow_speed, vy: 0.0 }],
        };

        let outcome = plan_cycle(&map, &config, state, &input).unwrap();

        // Continuity and horizon
        assert_eq!(&outcome.trajectory.points[..remaining.len()], &remaining[..]);
        assert_eq!(outcome.trajectory.len(), config.trajectory.horizon);

        // Lane bounds
        assert!(outcome.state.lane < 3);
        let actual_lane = config.road.lane_of(ego.d);
        assert!(outcome.state.lane.abs_diff(actual_lane) <= 1, "cycle {cycle}");

        // Speed bounds
        let delta = outcome.state.reference_speed - state.reference_speed;
        assert!(delta.abs() <= config.vehicle.max_acceleration + 1e-12, "cycle {cycle}: {delta}");
        assert!(outcome.state.reference_speed <= config.vehicle.max_speed);

        changed_lane |= outcome.state.lane != 1;
        state = outcome.state;

        // The vehicle drives 1 to 3 points before the next telemetry
        let consumed = 1 + cycle % 3;
        let driven = &outcome.trajectory.points[..consumed];
        let last = *driven.last().unwrap();
        let previous = if consumed >= 2 { driven[consumed - 2] } else { ego.position };
        let motion = last - previous;
        let step = motion.norm();
        travelled += (last - ego.position).norm();

        let yaw = if step > 1e-9 { motion.y.atan2(motion.x) } else { ego.yaw };
        let (s, d) = map.to_road_frame(&last, yaw);
        ego = EgoState {
            position: last,
            s,
            d,
            yaw,
            speed: step / period / unit,
        };
        remaining = outcome.trajectory.points[consumed..].to_vec();
        slow_s = map.wrap_s(slow_s + consumed as f64 * period * slow_speed * unit);
    }

    assert!(ego.s < start_s, "vehicle should have crossed the start of the track");
    assert!(travelled > 500.0);
    assert!(changed_lane, "slow vehicle ahead should have been overtaken");
}
