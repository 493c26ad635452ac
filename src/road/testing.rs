//! Synthetic maps for tests and benches.

use super::{Point, RoadMap, RoadMapError, Vec2, Waypoint};
use std::f64::consts::PI;

/// First records of the simulator's highway map.
pub const HIGHWAY_SAMPLE: &str = "\
784.6001 1135.571 0 -0.02359831 -0.9997216
815.2679 1134.93 30.6744785308838 -0.01099479 -0.9999396

844.6398 1134.911 60.0463714599609 -0.002048373 -0.9999979
";

/// Straight road along +x with waypoints every `spacing` meters; lanes lie
/// towards -y.
pub fn straight_map(length: f64, spacing: f64) -> Result<RoadMap, RoadMapError> {
    let count = (length / spacing).round() as usize;
    let waypoints = (0..count)
        .map(|i| Waypoint {
            position: Point::new(i as f64 * spacing, 0.0),
            s: i as f64 * spacing,
            lateral: Vec2::new(0.0, -1.0),
        })
        .collect();
    RoadMap::from_waypoints(waypoints, length)
}

/// Counter-clockwise ring; lanes (the right-hand side) lie outwards.
pub fn ring_map(radius: f64, count: usize) -> Result<RoadMap, RoadMapError> {
    let step = 2.0 * PI / count as f64;
    let chord = 2.0 * radius * (step / 2.0).sin();
    let waypoints = (0..count)
        .map(|i| {
            let theta = i as f64 * step;
            Waypoint {
                position: Point::new(radius * theta.cos(), radius * theta.sin()),
                s: i as f64 * chord,
                lateral: Vec2::new(theta.cos(), theta.sin()),
            }
        })
        .collect();
    RoadMap::from_waypoints(waypoints, chord * count as f64)
}
