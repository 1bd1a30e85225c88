use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::segment::Segment;

use super::{NearestTrafficQuery, TrafficRecord, TrafficStore, TrafficStoreError};

pub const NEAREST_TRAFFIC_PATH: &str = "/traffic/nearest";

pub struct HttpTrafficStoreParams {
    pub base_url: String,
    pub timeout: Duration,
}

/// Client for a remote traffic store exposing `GET /traffic/nearest`.
pub struct HttpTrafficStore {
    url: String,
    client: reqwest::Client,
}

impl HttpTrafficStore {
    pub fn new(params: HttpTrafficStoreParams) -> Result<Self, TrafficStoreError> {
        let client = reqwest::Client::builder().timeout(params.timeout).build()?;
        let mut url = params.base_url.trim_end_matches('/').to_string();
        url.push_str(NEAREST_TRAFFIC_PATH);

        Ok(Self { url, client })
    }
}

#[async_trait]
impl TrafficStore for HttpTrafficStore {
    async fn most_recent_near(
        &self,
        segment: &Segment,
        tolerance_meters: f64,
    ) -> Result<Option<TrafficRecord>, TrafficStoreError> {
        let response = self
            .client
            .get(&self.url)
            .query(&NearestTrafficQuery::new(segment, tolerance_meters))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TrafficStoreError::Api { status, message });
        }

        Ok(response.json::<Option<TrafficRecord>>().await?)
    }
}
