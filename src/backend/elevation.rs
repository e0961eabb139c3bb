use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{ElevationError, ElevationService};
use crate::geo::GeoPoint;

#[derive(Debug, Deserialize)]
struct ElevationReply {
    status: String,
    #[serde(default)]
    results: Vec<ElevationSample>,
}

#[derive(Debug, Deserialize)]
struct ElevationSample {
    elevation: f64,
}

/// Terrain service speaking the `?locations=lat,lng` JSON protocol.
#[derive(Debug, Clone)]
pub struct HttpElevation {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpElevation {
    pub fn new(
        url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ElevationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key,
        })
    }
}

impl ElevationService for HttpElevation {
    async fn elevation(&self, point: GeoPoint) -> Result<f64, ElevationError> {
        let mut query = vec![("locations", format!("{},{}", point.lat, point.lng))];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let reply: ElevationReply = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await?
            .json()
            .await?;

        parse_reply(reply)
    }
}

fn parse_reply(reply: ElevationReply) -> Result<f64, ElevationError> {
    if reply.status != "OK" {
        return Err(ElevationError::Unavailable(reply.status));
    }
    reply
        .results
        .first()
        .map(|s| s.elevation)
        .ok_or_else(|| ElevationError::Unavailable("empty result".into()))
}

/// Elevation source chosen by configuration.
#[derive(Debug, Clone)]
pub enum ElevationProvider {
    Http(HttpElevation),
    Disabled,
}

impl ElevationService for ElevationProvider {
    async fn elevation(&self, point: GeoPoint) -> Result<f64, ElevationError> {
        match self {
            ElevationProvider::Http(service) => service.elevation(point).await,
            ElevationProvider::Disabled => Err(ElevationError::Unavailable(
                "no elevation service configured".into(),
            )),
        }
    }
}
