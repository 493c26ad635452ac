use crate::config::PlannerConfig;
use crate::road::{Point, RoadMap, Vec2};

use super::{EgoState, Spline, SplineError, Trajectory};

/// Previous-path points closer than this are treated as one.
const MIN_ANCHOR_SPACING: f64 = 1e-6;

/// Origin and heading of the vehicle-aligned frame the curve is fitted in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePose {
    pub position: Point,
    pub yaw: f64,
}

impl ReferencePose {
    pub fn to_local(&self, point: &Point) -> Point {
        let shift = point - self.position;
        let (sin, cos) = (-self.yaw).sin_cos();
        Point::new(shift.x * cos - shift.y * sin, shift.x * sin + shift.y * cos)
    }

    pub fn to_global(&self, local: &Point) -> Point {
        let (sin, cos) = self.yaw.sin_cos();
        self.position + Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
    }
}

pub struct TrajectorySynthesizer<'a> {
    map: &'a RoadMap,
    config: &'a PlannerConfig,
}

impl<'a> TrajectorySynthesizer<'a> {
    pub fn new(map: &'a RoadMap, config: &'a PlannerConfig) -> Self {
        Self { map, config }
    }

    /// Look-ahead between consecutive forward anchors; faster vehicles look
    /// farther.
    pub fn maneuver_distance(&self, ego_speed: f64) -> f64 {
        let params = &self.config.trajectory;
        params
            .min_maneuver_distance
            .max(self.config.to_mps(ego_speed) * params.lookahead_time)
    }

    /// Reference pose plus the two anchors at and behind it, continuing the
    /// previous path when it has a usable final segment.
    pub fn reference(&self, ego: &EgoState, previous_path: &[Point]) -> (ReferencePose, [Point; 2]) {
        if let [.., before, last] = previous_path {
            let segment = last - before;
            if segment.norm() > MIN_ANCHOR_SPACING {
                let pose = ReferencePose {
                    position: *last,
                    yaw: segment.y.atan2(segment.x),
                };
                return (pose, [*before, *last]);
            }
        }

        let pose = ReferencePose { position: ego.position, yaw: ego.yaw };
        let behind = ego.position - Vec2::new(ego.yaw.cos(), ego.yaw.sin());
        (pose, [behind, ego.position])
    }

    /// The five planar anchor points the curve passes through.
    pub fn anchors(&self, ego: &EgoState, previous_path: &[Point], start_s: f64, lane: usize) -> (ReferencePose, Vec<Point>) {
        let (pose, [behind, at]) = self.reference(ego, previous_path);
        let maneuver = self.maneuver_distance(ego.speed);
        let d = self.config.road.lane_center(lane);

        let mut anchors = vec![behind, at];
        anchors.extend((1..=3).map(|k| self.map.to_planar_frame(start_s + maneuver * k as f64, d)));

        (pose, anchors)
    }

    /// Unconsumed previous points followed by freshly sampled points, up to
    /// the configured horizon.
    pub fn synthesize(
        &self,
        ego: &EgoState,
        previous_path: &[Point],
        start_s: f64,
        lane: usize,
        reference_speed: f64,
    ) -> Result<Trajectory, SplineError> {
        let horizon = self.config.trajectory.horizon;
        let mut points = previous_path.to_vec();
        if points.len() >= horizon {
            return Ok(Trajectory { points });
        }

        let (pose, anchors) = self.anchors(ego, previous_path, start_s, lane);
        let (xs, ys): (Vec<f64>, Vec<f64>) = anchors
            .iter()
            .map(|anchor| {
                let local = pose.to_local(anchor);
                (local.x, local.y)
            })
            .unzip();
        let curve = Spline::fit(&xs, &ys)?;

        let target_x = self.maneuver_distance(ego.speed);
        let target_distance = target_x.hypot(curve.value(target_x));
        let step = target_x * self.config.trajectory.control_period * self.config.to_mps(reference_speed)
            / target_distance;

        let mut x = 0.0;
        while points.len() < horizon {
            x += step;
            points.push(pose.to_global(&Point::new(x, curve.value(x))));
        }

        Ok(Trajectory { points })
    }
}
