//! Simulator event frames: `42["<event>", <payload>]`.

use serde::Deserialize;
use serde_json::json;

use crate::config::PlannerConfig;
use crate::planning::{CycleInput, EgoState, TrafficObservation, Trajectory};
use crate::road::Point;

/// Reply telling the simulator to hand control back to the driver.
pub const MANUAL: &str = r#"42["manual",{}]"#;

const EVENT_PREFIX: &str = "42";
const TELEMETRY_EVENT: &str = "telemetry";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Telemetry {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub d: f64,
    pub yaw: f64,   // degrees
    pub speed: f64, // mph
    pub previous_path_x: Vec<f64>,
    pub previous_path_y: Vec<f64>,
    pub end_path_s: f64,
    pub end_path_d: f64,
    pub sensor_fusion: Vec<SensorRecord>,
}

/// `[id, x, y, vx, vy, s, d]`, velocities in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SensorRecord(pub f64, pub f64, pub f64, pub f64, pub f64, pub f64, pub f64);

impl Telemetry {
    pub fn to_cycle_input(&self, config: &PlannerConfig) -> CycleInput {
        let unit = config.vehicle.speed_unit_mps;

        CycleInput {
            ego: EgoState {
                position: Point::new(self.x, self.y),
                s: self.s,
                d: self.d,
                yaw: self.yaw.to_radians(),
                speed: self.speed,
            },
            previous_path: self
                .previous_path_x
                .iter()
                .zip(&self.previous_path_y)
                .map(|(&x, &y)| Point::new(x, y))
                .collect(),
            end_path_s: self.end_path_s,
            end_path_d: self.end_path_d,
            traffic: self
                .sensor_fusion
                .iter()
                .map(|record| TrafficObservation {
                    s: record.5,
                    d: record.6,
                    vx: record.3 / unit,
                    vy: record.4 / unit,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Not an event frame, or an event the planner does not answer.
    Ignored,
    /// Event frame without usable telemetry.
    Manual,
    Telemetry(Box<Telemetry>),
}

pub fn decode(raw: &str) -> Incoming {
    if raw.len() <= EVENT_PREFIX.len() || !raw.starts_with(EVENT_PREFIX) {
        return Incoming::Ignored;
    }
    if raw.contains("null") {
        return Incoming::Manual;
    }

    let body = match (raw.find('['), raw.rfind(']')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => return Incoming::Manual,
    };

    let (event, payload): (String, serde_json::Value) = match serde_json::from_str(body) {
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("Malformed event frame: {}", e);
            return Incoming::Manual;
        }
    };

    if event != TELEMETRY_EVENT {
        log::debug!("Ignoring '{}' event", event);
        return Incoming::Ignored;
    }

    match serde_json::from_value::<Telemetry>(payload) {
        Ok(telemetry) => {
            if telemetry.previous_path_x.len() != telemetry.previous_path_y.len() {
                log::warn!(
                    "Previous path has {} x and {} y values, truncating",
                    telemetry.previous_path_x.len(),
                    telemetry.previous_path_y.len()
                );
            }
            Incoming::Telemetry(Box::new(telemetry))
        }
        Err(e) => {
            log::warn!("Malformed telemetry payload: {}", e);
            Incoming::Manual
        }
    }
}

pub fn encode_control(trajectory: &Trajectory) -> String {
    let control = json!([
        "control",
        {
            "next_x": trajectory.xs(),
            "next_y": trajectory.ys(),
        }
    ]);
    format!("{}{}", EVENT_PREFIX, control)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TELEMETRY: &str = r#"42["telemetry",{"x":909.48,"y":1128.67,"yaw":0,"speed":0,"s":124.8336,"d":6.164833,"previous_path_x":[],"previous_path_y":[],"end_path_s":0,"end_path_d":0,"sensor_fusion":[[0,1092.1,1147.709,12.5,0.1,307.9412,1.999962],[1,775.8,1425.2,0,0,6719.219,-280.1494]]}]"#;

    #[test]
    fn decodes_telemetry_frame() {
        let telemetry = match decode(TELEMETRY) {
            Incoming::Telemetry(telemetry) => telemetry,
            other => panic!("unexpected frame: {other:?}"),
        };

        assert_eq!(telemetry.x, 909.48);
        assert_eq!(telemetry.d, 6.164833);
        assert!(telemetry.previous_path_x.is_empty());
        assert_eq!(telemetry.sensor_fusion.len(), 2);
        assert_eq!(telemetry.sensor_fusion[1].0, 1.0);
    }

    #[test]
    fn converts_units_for_the_planner() {
        let Incoming::Telemetry(mut telemetry) = decode(TELEMETRY) else {
            panic!("expected telemetry");
        };
        telemetry.yaw = 90.0;
        telemetry.previous_path_x = vec![1.0, 2.0, 3.0];
        telemetry.previous_path_y = vec![4.0, 5.0];

        let config = PlannerConfig::default();
        let input = telemetry.to_cycle_input(&config);

        assert!((input.ego.yaw - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(input.previous_path, vec![Point::new(1.0, 4.0), Point::new(2.0, 5.0)]);
        assert_eq!(input.traffic.len(), 2);
        assert!((input.traffic[0].vx * 0.44704 - 12.5).abs() < 1e-9);
        assert_eq!(input.traffic[0].s, 307.9412);
        assert_eq!(input.traffic[0].d, 1.999962);
    }

    #[test]
    fn null_payload_means_manual() {
        assert_eq!(decode(r#"42["telemetry",null]"#), Incoming::Manual);
    }

    #[test]
    fn broken_frames_fall_back_to_manual() {
        assert_eq!(decode("42"), Incoming::Ignored);
        assert_eq!(decode("42garbage"), Incoming::Manual);
        assert_eq!(decode(r#"42["telemetry",{"x":1.0]"#), Incoming::Manual);
        assert_eq!(decode(r#"42["telemetry",{"x":1.0}]"#), Incoming::Manual);
    }

    #[test]
    fn non_event_frames_are_ignored() {
        assert_eq!(decode("2"), Incoming::Ignored);
        assert_eq!(decode("40"), Incoming::Ignored);
        assert_eq!(decode(r#"42["reset",{}]"#), Incoming::Ignored);
    }

    #[test]
    fn control_frame_lists_coordinates() {
        let trajectory = Trajectory {
            points: vec![Point::new(1.0, 2.0), Point::new(3.5, -4.0)],
        };
        let frame = encode_control(&trajectory);
        assert!(frame.starts_with(r#"42["control","#));

        let (event, body): (String, serde_json::Value) = serde_json::from_str(&frame[2..]).unwrap();
        assert_eq!(event, "control");
        assert_eq!(body["next_x"], json!([1.0, 3.5]));
        assert_eq!(body["next_y"], json!([2.0, -4.0]));
    }
}
