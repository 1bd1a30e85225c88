use async_trait::async_trait;
use parking_lot::RwLock;
use rstar::{PointDistance, RTree, primitives::GeomWithData, primitives::Rectangle};
use tracing::debug;

use crate::{
    geometry::{meters_to_degrees, segment_distance_to_geometry},
    segment::Segment,
};

use super::{TrafficRecord, TrafficStore, TrafficStoreError};

/// Records indexed by the `[lng, lat]` bounding box of their geometry.
pub type TrafficIndexObject = GeomWithData<Rectangle<[f64; 2]>, TrafficRecord>;

/// Traffic store held in memory, fed through [`InMemoryTrafficStore::insert`].
#[derive(Default)]
pub struct InMemoryTrafficStore {
    tree: RwLock<RTree<TrafficIndexObject>>,
}

impl InMemoryTrafficStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<TrafficRecord>) -> Result<Self, TrafficStoreError> {
        let objects = records
            .into_iter()
            .map(index_object)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tree: RwLock::new(RTree::bulk_load(objects)),
        })
    }

    pub fn insert(&self, record: TrafficRecord) -> Result<(), TrafficStoreError> {
        let object = index_object(record)?;
        self.tree.write().insert(object);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tree.read().size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn most_recent_near_sync(
        &self,
        segment: &Segment,
        tolerance_meters: f64,
    ) -> Option<TrafficRecord> {
        let midpoint = segment.midpoint();

        // Search radius around the midpoint that covers the whole segment
        // plus the tolerance, in degrees.
        let max_lat = segment.start.lat.abs().max(segment.end.lat.abs());
        let radius = meters_to_degrees(segment.distance_meters / 2.0 + tolerance_meters, max_lat);
        let radius_2 = radius * radius;

        // Records are indexed on raw longitudes, so a search circle crossing
        // the antimeridian is also run from the mirrored point.
        let mut query_points = vec![[midpoint.lng, midpoint.lat]];
        if midpoint.lng + radius > 180.0 {
            query_points.push([midpoint.lng - 360.0, midpoint.lat]);
        } else if midpoint.lng - radius < -180.0 {
            query_points.push([midpoint.lng + 360.0, midpoint.lat]);
        }

        let tree = self.tree.read();
        query_points
            .iter()
            .flat_map(|query_point| {
                tree.nearest_neighbor_iter(query_point)
                    .take_while(move |object| object.geom().distance_2(query_point) <= radius_2)
            })
            .filter(|object| {
                segment_distance_to_geometry(segment, &object.data.geometry) <= tolerance_meters
            })
            .max_by_key(|object| object.data.last_updated)
            .map(|object| object.data.clone())
    }
}

fn index_object(record: TrafficRecord) -> Result<TrafficIndexObject, TrafficStoreError> {
    if record.geometry.is_empty() {
        return Err(TrafficStoreError::InvalidRecord(String::from(
            "geometry must contain at least one point",
        )));
    }
    if let Some(invalid) = record.geometry.iter().find(|c| !c.is_valid()) {
        return Err(TrafficStoreError::InvalidRecord(format!(
            "({}, {}) is not a valid coordinate",
            invalid.lat, invalid.lng
        )));
    }

    let (mut min, mut max) = ([f64::MAX, f64::MAX], [f64::MIN, f64::MIN]);
    for coordinate in &record.geometry {
        min = [min[0].min(coordinate.lng), min[1].min(coordinate.lat)];
        max = [max[0].max(coordinate.lng), max[1].max(coordinate.lat)];
    }

    Ok(TrafficIndexObject::new(
        Rectangle::from_corners(min, max),
        record,
    ))
}

#[async_trait]
impl TrafficStore for InMemoryTrafficStore {
    async fn most_recent_near(
        &self,
        segment: &Segment,
        tolerance_meters: f64,
    ) -> Result<Option<TrafficRecord>, TrafficStoreError> {
        let record = self.most_recent_near_sync(segment, tolerance_meters);
        if let Some(record) = &record {
            debug!(multiplier = record.multiplier(), "Matched traffic record");
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::coordinate::Coordinate;

    fn coordinate(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    fn record(geometry: Vec<Coordinate>, congestion: f64, updated_second: i64) -> TrafficRecord {
        TrafficRecord {
            geometry,
            congestion_factor: Some(congestion),
            weather_impact: None,
            last_updated: Timestamp::from_second(updated_second).unwrap(),
        }
    }

    fn segment() -> Segment {
        Segment::new(coordinate(50.0, 4.0), coordinate(50.0, 4.01))
    }

    #[tokio::test]
    async fn should_find_record_within_tolerance() {
        let store = InMemoryTrafficStore::new();
        // ~55m north of the segment
        store
            .insert(record(
                vec![coordinate(50.0005, 4.004), coordinate(50.0005, 4.006)],
                1.8,
                100,
            ))
            .unwrap();

        let found = store.most_recent_near(&segment(), 100.0).await.unwrap();
        assert_eq!(found.map(|r| r.congestion_factor), Some(Some(1.8)));
    }

    #[tokio::test]
    async fn should_ignore_records_beyond_tolerance() {
        let store = InMemoryTrafficStore::new();
        // ~222m north of the segment
        store
            .insert(record(
                vec![coordinate(50.002, 4.004), coordinate(50.002, 4.006)],
                1.8,
                100,
            ))
            .unwrap();

        assert_eq!(store.most_recent_near(&segment(), 100.0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_prefer_most_recent_record() {
        let store = InMemoryTrafficStore::from_records(vec![
            record(vec![coordinate(50.0, 4.002)], 2.5, 100),
            record(vec![coordinate(50.0001, 4.008)], 1.2, 200),
            record(vec![coordinate(50.0002, 4.005)], 1.6, 150),
        ])
        .unwrap();

        let found = store.most_recent_near(&segment(), 100.0).await.unwrap().unwrap();
        assert_eq!(found.congestion_factor, Some(1.2));
    }

    #[tokio::test]
    async fn should_match_record_near_long_segment_end() {
        // Segment of ~7km, record near its end and far from its midpoint
        let long_segment = Segment::new(coordinate(50.0, 4.0), coordinate(50.0, 4.1));
        let store = InMemoryTrafficStore::new();
        store
            .insert(record(vec![coordinate(50.0003, 4.099)], 1.4, 100))
            .unwrap();

        assert!(
            store
                .most_recent_near(&long_segment, 100.0)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn should_match_records_across_the_antimeridian() {
        // ~220m segment from 179.999 to -179.999
        let segment = Segment::new(coordinate(0.0, 179.999), coordinate(0.0, -179.999));
        let store = InMemoryTrafficStore::new();
        store
            .insert(record(vec![coordinate(0.0003, -179.9995)], 1.7, 100))
            .unwrap();

        let found = store.most_recent_near(&segment, 100.0).await.unwrap();
        assert_eq!(found.map(|r| r.congestion_factor), Some(Some(1.7)));
    }

    #[test]
    fn should_reject_empty_geometry() {
        let store = InMemoryTrafficStore::new();
        assert!(matches!(
            store.insert(record(vec![], 1.0, 0)),
            Err(TrafficStoreError::InvalidRecord(_))
        ));
        assert!(store.is_empty());
    }
}
