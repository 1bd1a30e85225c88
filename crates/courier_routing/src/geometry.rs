use std::f64::consts::PI;

use geo::{Distance, Euclidean, Line, LineString, Point};

use crate::{coordinate::Coordinate, segment::Segment};

const EARTH_RADIUS: f64 = 6_371_008.8;

pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS * PI / 180.0;

/// Equirectangular projection around an origin, in meters. Accurate enough
/// for the short distances involved in matching segments to traffic data.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin: Coordinate,
    cos_lat: f64,
}

impl LocalProjection {
    pub fn new(origin: Coordinate) -> Self {
        LocalProjection {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
        }
    }

    pub fn project(&self, coordinate: &Coordinate) -> [f64; 2] {
        [
            wrap_longitude(coordinate.lng - self.origin.lng) * METERS_PER_DEGREE * self.cos_lat,
            (coordinate.lat - self.origin.lat) * METERS_PER_DEGREE,
        ]
    }

    pub fn unproject(&self, point: [f64; 2]) -> Coordinate {
        let lng = if self.cos_lat.abs() < f64::EPSILON {
            self.origin.lng
        } else {
            self.origin.lng + point[0] / (METERS_PER_DEGREE * self.cos_lat)
        };

        Coordinate {
            lat: (self.origin.lat + point[1] / METERS_PER_DEGREE).clamp(-90.0, 90.0),
            lng: wrap_longitude(lng),
        }
    }
}

/// Brings a longitude difference or sum back into `[-180, 180]`.
pub fn wrap_longitude(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}

/// Degrees that cover at least `meters` in any direction around `lat`.
pub fn meters_to_degrees(meters: f64, lat: f64) -> f64 {
    let cos_lat = lat.abs().min(89.0).to_radians().cos();
    meters / (METERS_PER_DEGREE * cos_lat)
}

/// Shortest distance in meters between a segment and a geometry (a point or a
/// line string). An empty geometry is infinitely far.
pub fn segment_distance_to_geometry(segment: &Segment, geometry: &[Coordinate]) -> f64 {
    let projection = LocalProjection::new(segment.start);
    let line = Line::new(
        projection.project(&segment.start),
        projection.project(&segment.end),
    );

    match geometry {
        [] => f64::INFINITY,
        [point] => Euclidean.distance(&Point::from(projection.project(point)), &line),
        _ => {
            let line_string: LineString = geometry
                .iter()
                .map(|coordinate| projection.project(coordinate))
                .collect();
            Euclidean.distance(&line, &line_string)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinate(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    #[test]
    fn crossing_lines_have_zero_distance() {
        let segment = Segment::new(coordinate(50.0, 4.0), coordinate(50.0, 4.01));
        let geometry = [coordinate(49.995, 4.005), coordinate(50.005, 4.005)];

        assert_eq!(segment_distance_to_geometry(&segment, &geometry), 0.0);
    }

    #[test]
    fn parallel_line_distance_is_offset() {
        let segment = Segment::new(coordinate(50.0, 4.0), coordinate(50.0, 4.01));
        // ~55m north
        let geometry = [coordinate(50.0005, 4.0), coordinate(50.0005, 4.01)];

        let distance = segment_distance_to_geometry(&segment, &geometry);
        assert!((distance - 55.6).abs() < 1.0, "got {distance}");
    }

    #[test]
    fn point_geometry_uses_closest_point_on_segment() {
        let segment = Segment::new(coordinate(0.0, 0.0), coordinate(0.0, 0.01));
        let distance = segment_distance_to_geometry(&segment, &[coordinate(0.001, 0.005)]);

        assert!((distance - 111.2).abs() < 1.0, "got {distance}");
    }

    #[test]
    fn touching_line_string_has_zero_distance() {
        let segment = Segment::new(coordinate(0.0, 0.0), coordinate(0.0, 0.01));
        let geometry = [
            coordinate(-0.01, -0.01),
            coordinate(-0.001, 0.005),
            coordinate(0.0, 0.005),
        ];

        assert!(segment_distance_to_geometry(&segment, &geometry) < 1e-6);
    }

    #[test]
    fn empty_geometry_is_infinitely_far() {
        let segment = Segment::new(coordinate(0.0, 0.0), coordinate(0.0, 0.01));
        assert_eq!(segment_distance_to_geometry(&segment, &[]), f64::INFINITY);
    }

    #[test]
    fn projection_round_trips_near_origin() {
        let projection = LocalProjection::new(coordinate(48.85, 2.35));
        let target = coordinate(48.86, 2.37);

        let back = projection.unproject(projection.project(&target));
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }
}
