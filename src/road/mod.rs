use nalgebra::{Point2, Vector2};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

pub mod frenet;
#[doc(hidden)]
pub mod testing;

pub type Vec2 = Vector2<f64>;
pub type Point = Point2<f64>;

/// One sample of the road centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub position: Point,
    /// Longitudinal distance from the start of the track.
    pub s: f64,
    /// Unit vector pointing towards increasing lateral offset.
    pub lateral: Vec2,
}

#[derive(Debug, Error)]
pub enum RoadMapError {
    #[error("failed to read road map: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected 5 numeric fields `x y s dx dy`, got {content:?}")]
    Malformed { line: usize, content: String },
    #[error("road map needs at least 2 waypoints, got {0}")]
    TooShort(usize),
    #[error("track length must be positive, got {0}")]
    InvalidLength(f64),
    #[error("waypoint {index} has s = {s}, not beyond the previous waypoint")]
    NonIncreasing { index: usize, s: f64 },
}

/// Discretized road centerline, immutable once loaded.
#[derive(Debug, Clone)]
pub struct RoadMap {
    waypoints: Vec<Waypoint>,
    arc_lengths: Vec<f64>,
    max_s: f64,
}

impl RoadMap {
    pub fn load(path: impl AsRef<Path>, max_s: f64) -> Result<Self, RoadMapError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file), max_s)
    }

    pub fn from_reader(reader: impl BufRead, max_s: f64) -> Result<Self, RoadMapError> {
        let mut waypoints = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            waypoints.push(parse_record(&line).ok_or_else(|| RoadMapError::Malformed {
                line: index + 1,
                content: line.clone(),
            })?);
        }

        Self::from_waypoints(waypoints, max_s)
    }

    pub fn from_waypoints(waypoints: Vec<Waypoint>, max_s: f64) -> Result<Self, RoadMapError> {
        if waypoints.len() < 2 {
            return Err(RoadMapError::TooShort(waypoints.len()));
        }
        if max_s <= 0.0 || !max_s.is_finite() {
            return Err(RoadMapError::InvalidLength(max_s));
        }
        for (index, pair) in waypoints.windows(2).enumerate() {
            if pair[1].s <= pair[0].s {
                return Err(RoadMapError::NonIncreasing { index: index + 1, s: pair[1].s });
            }
        }

        let mut arc_lengths = Vec::with_capacity(waypoints.len());
        let mut total = 0.0;
        arc_lengths.push(total);
        for pair in waypoints.windows(2) {
            total += (pair[1].position - pair[0].position).norm();
            arc_lengths.push(total);
        }

        log::debug!(
            "Road map: {} waypoints, {:.1}m of centerline, max_s {:.1}",
            waypoints.len(),
            total,
            max_s
        );

        Ok(Self { waypoints, arc_lengths, max_s })
    }

    pub fn waypoint(&self, index: usize) -> &Waypoint {
        &self.waypoints[index]
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn max_s(&self) -> f64 {
        self.max_s
    }

    /// Brings `s` back into `[0, max_s)`.
    pub fn wrap_s(&self, s: f64) -> f64 {
        s.rem_euclid(self.max_s)
    }

    /// Signed longitudinal distance from `from` to `to`, taking the shorter
    /// way around the track.
    pub fn s_gap(&self, from: f64, to: f64) -> f64 {
        let gap = self.wrap_s(to - from);
        if gap > self.max_s / 2.0 {
            gap - self.max_s
        } else {
            gap
        }
    }

    fn previous_index(&self, index: usize) -> usize {
        if index == 0 {
            self.waypoints.len() - 1
        } else {
            index - 1
        }
    }

    fn following_index(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }
}

fn parse_record(line: &str) -> Option<Waypoint> {
    let fields = line
        .split_whitespace()
        .map(|field| field.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match fields[..] {
        [x, y, s, dx, dy] => Some(Waypoint {
            position: Point::new(x, y),
            s,
            lateral: Vec2::new(dx, dy),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::testing::HIGHWAY_SAMPLE;

    #[test]
    fn parses_records_and_skips_blank_lines() {
        let map = RoadMap::from_reader(HIGHWAY_SAMPLE.as_bytes(), 6945.554).unwrap();
        assert_eq!(map.waypoints().len(), 3);
        assert_eq!(map.waypoint(1).position, Point::new(815.2679, 1134.93));
        assert!((map.waypoint(2).s - 60.0463714599609).abs() < 1e-9);
        assert!((map.waypoint(0).lateral.y + 0.9997216).abs() < 1e-9);
    }

    #[test]
    fn arc_lengths_accumulate_segment_lengths() {
        let map = RoadMap::from_reader(HIGHWAY_SAMPLE.as_bytes(), 6945.554).unwrap();
        let first = (map.waypoint(1).position - map.waypoint(0).position).norm();
        assert_eq!(map.arc_lengths[0], 0.0);
        assert!((map.arc_lengths[1] - first).abs() < 1e-12);
        assert!(map.arc_lengths[2] > map.arc_lengths[1]);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let err = RoadMap::from_reader("1 2 0 0 1\n3 4 five 0 1\n".as_bytes(), 100.0).unwrap_err();
        match err {
            RoadMapError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_records_are_malformed() {
        let err = RoadMap::from_reader("1 2 0 0\n".as_bytes(), 100.0).unwrap_err();
        assert!(matches!(err, RoadMapError::Malformed { line: 1, .. }));
    }

    #[test]
    fn too_few_waypoints_is_an_error() {
        let err = RoadMap::from_reader("1 2 0 0 1\n".as_bytes(), 100.0).unwrap_err();
        assert!(matches!(err, RoadMapError::TooShort(1)));
    }

    #[test]
    fn s_must_increase() {
        let err = RoadMap::from_reader("0 0 5 0 -1\n1 0 5 0 -1\n".as_bytes(), 100.0).unwrap_err();
        assert!(matches!(err, RoadMapError::NonIncreasing { index: 1, .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RoadMap::load("/nonexistent/highway_map.csv", 100.0).unwrap_err();
        assert!(matches!(err, RoadMapError::Io(_)));
    }

    #[test]
    fn s_gap_takes_shorter_way_around() {
        let map = RoadMap::from_reader(HIGHWAY_SAMPLE.as_bytes(), 1000.0).unwrap();
        assert_eq!(map.s_gap(100.0, 130.0), 30.0);
        assert_eq!(map.s_gap(130.0, 100.0), -30.0);
        assert!((map.s_gap(990.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((map.s_gap(10.0, 990.0) + 20.0).abs() < 1e-9);
    }
}
