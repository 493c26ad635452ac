//! Conversions between the road frame (longitudinal `s`, lateral `d`) and
//! the planar frame, by piecewise-linear interpolation of the centerline.

use super::{Point, RoadMap, Vec2};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

impl RoadMap {
    /// Index of the waypoint nearest to `point`. The first minimum wins.
    pub fn closest_waypoint(&self, point: &Point) -> usize {
        let mut closest = 0;
        let mut closest_distance = f64::INFINITY;

        for (index, waypoint) in self.waypoints.iter().enumerate() {
            let distance = (waypoint.position - point).norm();
            if distance < closest_distance {
                closest_distance = distance;
                closest = index;
            }
        }

        closest
    }

    /// Index of the first waypoint ahead of a vehicle at `point` facing
    /// `heading` (radians).
    pub fn next_waypoint(&self, point: &Point, heading: f64) -> usize {
        let closest = self.closest_waypoint(point);
        let to_waypoint = self.waypoints[closest].position - point;
        let bearing = to_waypoint.y.atan2(to_waypoint.x);

        let angle = (heading - bearing).rem_euclid(2.0 * PI);
        let angle = angle.min(2.0 * PI - angle);

        if angle > FRAC_PI_4 {
            self.following_index(closest)
        } else {
            closest
        }
    }

    /// Projects `point` onto the centerline segment ending at the next
    /// waypoint and returns `(s, d)`.
    pub fn to_road_frame(&self, point: &Point, heading: f64) -> (f64, f64) {
        let next = self.next_waypoint(point, heading);
        let prev = self.previous_index(next);
        let origin = &self.waypoints[prev];

        let segment = self.waypoints[next].position - origin.position;
        let relative = point - origin.position;

        let projection_norm = relative.dot(&segment) / segment.norm_squared();
        let projection = segment * projection_norm;
        let offset = relative - projection;

        let d = if offset.dot(&origin.lateral) < 0.0 {
            -offset.norm()
        } else {
            offset.norm()
        };
        let s = self.arc_lengths[prev] + projection_norm * segment.norm();

        (s, d)
    }

    /// Planar position of road-frame coordinates `(s, d)`. `s` is taken
    /// modulo the track length.
    pub fn to_planar_frame(&self, s: f64, d: f64) -> Point {
        let s = self.wrap_s(s);
        let prev = self
            .waypoints
            .partition_point(|waypoint| waypoint.s <= s)
            .saturating_sub(1);
        let next = self.following_index(prev);

        let origin = &self.waypoints[prev];
        let segment = self.waypoints[next].position - origin.position;
        let heading = segment.y.atan2(segment.x);
        let along = s - origin.s;

        let perpendicular = heading - FRAC_PI_2;
        origin.position
            + Vec2::new(heading.cos(), heading.sin()) * along
            + Vec2::new(perpendicular.cos(), perpendicular.sin()) * d
    }
}
