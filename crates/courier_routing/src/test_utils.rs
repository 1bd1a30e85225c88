use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use jiff::Timestamp;
use parking_lot::Mutex;

use crate::{
    cache::{RouteCache, RouteCacheError, RouteCacheKey},
    coordinate::Coordinate,
    error::RouteError,
    provider::{ProviderRoute, RouteProvider},
    request::RouteRequest,
    route::RouteResult,
    segment::Segment,
    traffic::{TrafficRecord, TrafficStore, TrafficStoreError},
};

pub fn provider_route(distance_meters: f64, duration_ms: u64) -> ProviderRoute {
    ProviderRoute {
        distance_meters,
        duration_ms,
        points: vec![
            Coordinate { lat: 0.0, lng: 0.0 },
            Coordinate { lat: 0.0, lng: 1.0 },
        ],
        instructions: vec![],
        bbox: None,
    }
}

pub fn route_result(distance_meters: f64, duration_ms: u64) -> RouteResult {
    RouteResult::from_provider(provider_route(distance_meters, duration_ms), 1.0)
}

fn traffic_record(multiplier: f64) -> TrafficRecord {
    TrafficRecord {
        geometry: vec![],
        congestion_factor: Some(multiplier),
        weather_impact: None,
        last_updated: Timestamp::now(),
    }
}

type RouteFn =
    dyn Fn(&Coordinate, &Coordinate, &[Coordinate]) -> Result<ProviderRoute, RouteError>
        + Send
        + Sync;

/// Provider answering through a closure, recording every call.
pub struct FakeRouteProvider {
    route_fn: Box<RouteFn>,
    calls: Mutex<Vec<Vec<Coordinate>>>,
}

impl FakeRouteProvider {
    pub fn new<F>(route_fn: F) -> Self
    where
        F: Fn(&Coordinate, &Coordinate, &[Coordinate]) -> Result<ProviderRoute, RouteError>
            + Send
            + Sync
            + 'static,
    {
        FakeRouteProvider {
            route_fn: Box::new(route_fn),
            calls: Mutex::new(vec![]),
        }
    }

    /// Same route for every request.
    pub fn fixed(distance_meters: f64, duration_ms: u64) -> Self {
        Self::new(move |_, _, _| Ok(provider_route(distance_meters, duration_ms)))
    }

    pub fn failing() -> Self {
        Self::new(|_, _, _| {
            Err(RouteError::RouteUnavailable(String::from(
                "No path found",
            )))
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Points of every call, origin, waypoints and destination in order.
    pub fn calls(&self) -> Vec<Vec<Coordinate>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RouteProvider for FakeRouteProvider {
    async fn compute_route(&self, request: &RouteRequest) -> Result<ProviderRoute, RouteError> {
        self.calls.lock().push(request.points());

        (self.route_fn)(&request.origin, &request.destination, &request.waypoints)
    }
}

enum Script {
    Constant(Option<f64>),
    /// Answers in call order, then `None`
    Sequence(Vec<Option<f64>>),
}

/// Traffic store returning predefined multipliers.
pub struct ScriptedTrafficStore {
    script: Mutex<Script>,
    calls: AtomicUsize,
}

impl ScriptedTrafficStore {
    pub fn constant(multiplier: Option<f64>) -> Self {
        ScriptedTrafficStore {
            script: Mutex::new(Script::Constant(multiplier)),
            calls: AtomicUsize::new(0),
        }
    }

    /// The n-th lookup gets the n-th multiplier. Lookups are issued in
    /// segment order.
    pub fn by_segment_index(multipliers: Vec<Option<f64>>) -> Self {
        ScriptedTrafficStore {
            script: Mutex::new(Script::Sequence(multipliers)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_constant(&self, multiplier: Option<f64>) {
        *self.script.lock() = Script::Constant(multiplier);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrafficStore for ScriptedTrafficStore {
    async fn most_recent_near(
        &self,
        _segment: &Segment,
        _tolerance_meters: f64,
    ) -> Result<Option<TrafficRecord>, TrafficStoreError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let multiplier = match &*self.script.lock() {
            Script::Constant(multiplier) => *multiplier,
            Script::Sequence(multipliers) => multipliers.get(index).copied().flatten(),
        };

        Ok(multiplier.map(traffic_record))
    }
}

pub struct FailingTrafficStore;

#[async_trait]
impl TrafficStore for FailingTrafficStore {
    async fn most_recent_near(
        &self,
        _segment: &Segment,
        _tolerance_meters: f64,
    ) -> Result<Option<TrafficRecord>, TrafficStoreError> {
        Err(TrafficStoreError::Api {
            status: 500,
            message: String::from("connection refused"),
        })
    }
}

pub struct SlowTrafficStore {
    pub delay: Duration,
    pub multiplier: f64,
}

#[async_trait]
impl TrafficStore for SlowTrafficStore {
    async fn most_recent_near(
        &self,
        _segment: &Segment,
        _tolerance_meters: f64,
    ) -> Result<Option<TrafficRecord>, TrafficStoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(traffic_record(self.multiplier)))
    }
}

/// The n-th lookup takes the n-th delay, later lookups answer at once.
pub struct StaggeredTrafficStore {
    delays: Vec<Duration>,
    calls: AtomicUsize,
}

impl StaggeredTrafficStore {
    pub fn new(delays: Vec<Duration>) -> Self {
        StaggeredTrafficStore {
            delays,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TrafficStore for StaggeredTrafficStore {
    async fn most_recent_near(
        &self,
        _segment: &Segment,
        _tolerance_meters: f64,
    ) -> Result<Option<TrafficRecord>, TrafficStoreError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(index) {
            tokio::time::sleep(*delay).await;
        }
        Ok(None)
    }
}

/// Cache whose backend is always down.
pub struct UnavailableRouteCache;

#[async_trait]
impl RouteCache for UnavailableRouteCache {
    async fn get(&self, _key: &RouteCacheKey) -> Result<Option<RouteResult>, RouteCacheError> {
        Err(RouteCacheError::Backend(String::from("connection refused")))
    }

    async fn put(
        &self,
        _key: &RouteCacheKey,
        _route: &RouteResult,
        _ttl: Duration,
    ) -> Result<(), RouteCacheError> {
        Err(RouteCacheError::Backend(String::from("connection refused")))
    }

    async fn delete(&self, _key: &RouteCacheKey) -> Result<(), RouteCacheError> {
        Err(RouteCacheError::Backend(String::from("connection refused")))
    }
}
