use geo::{Distance, Haversine};

use crate::{coordinate::Coordinate, geometry::wrap_longitude};

/// Edge between two consecutive points of a decoded path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Coordinate,
    pub end: Coordinate,
    /// Great-circle distance on a sphere of mean earth radius
    pub distance_meters: f64,
}

impl Segment {
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Segment {
            start,
            end,
            distance_meters: Haversine.distance(
                geo::Point::from(&start),
                geo::Point::from(&end),
            ),
        }
    }

    pub fn midpoint(&self) -> Coordinate {
        Coordinate {
            lat: (self.start.lat + self.end.lat) / 2.0,
            lng: wrap_longitude(
                self.start.lng + wrap_longitude(self.end.lng - self.start.lng) / 2.0,
            ),
        }
    }
}

/// N points give N - 1 segments, fewer than 2 points give none.
pub fn to_segments(points: &[Coordinate]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect()
}
