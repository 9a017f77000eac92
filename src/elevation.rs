//! Elevation profile assembly. Coordinates are batched into one provider
//! request; elevation is best-effort and a failed lookup degrades the
//! profile to `elevations: None` instead of failing the computation.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ProviderError;
use crate::geometry::round2;
use crate::models::{Coordinate, ElevationProfile, SampledPoint};

const SERVICE: &str = "elevation provider";

/// Capability interface over the elevation service. Results are meters, in
/// input order.
pub trait ElevationProvider: Send + Sync {
    fn fetch(
        &self,
        coordinates: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<f64>, ProviderError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    #[serde(default)]
    results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: f64,
}

/// Open Topo Data style client: one GET with a pipe-delimited `lat,lon` list.
/// No retry; failure is surfaced and the caller degrades.
pub struct OpenTopoDataClient {
    client: reqwest::Client,
    endpoint_url: String,
}

impl OpenTopoDataClient {
    /// `endpoint_url` names the dataset, e.g.
    /// `https://api.opentopodata.org/v1/srtm30m`.
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
            endpoint_url: endpoint_url.into(),
        }
    }

    fn locations_parameter(coordinates: &[Coordinate]) -> String {
        coordinates
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.lat, c.lon))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl ElevationProvider for OpenTopoDataClient {
    async fn fetch(&self, coordinates: &[Coordinate]) -> Result<Vec<f64>, ProviderError> {
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        let locations = Self::locations_parameter(coordinates);
        let response = self
            .client
            .get(&self.endpoint_url)
            .query(&[("locations", locations.as_str())])
            .send()
            .await
            .map_err(|err| ProviderError::Unavailable {
                service: SERVICE,
                reason: format!("{}: {err}", self.endpoint_url),
            })?;

        let status = response.status();
        if status.is_client_error() {
            tracing::warn!(endpoint = %self.endpoint_url, %status, "elevation query rejected");
            return Err(ProviderError::Rejected {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable {
                service: SERVICE,
                reason: format!("{}: status {status}", self.endpoint_url),
            });
        }

        let body: ElevationResponse =
            response
                .json()
                .await
                .map_err(|err| ProviderError::Unavailable {
                    service: SERVICE,
                    reason: format!("{}: invalid response body: {err}", self.endpoint_url),
                })?;
        Ok(body.results.into_iter().map(|r| r.elevation).collect())
    }
}

/// Align a provider result with the sampled points. A failed lookup or a
/// short batch yields `elevations: None`; `distances` always comes from the
/// local sample.
pub fn build_profile(
    sampled: &[SampledPoint],
    fetched: Result<Vec<f64>, ProviderError>,
) -> ElevationProfile {
    let distances = sampled.iter().map(|p| p.segment_distance_meters).collect();

    let elevations = match fetched {
        Ok(values) if values.len() >= sampled.len() => Some(
            values
                .into_iter()
                .take(sampled.len())
                .map(round2)
                .collect(),
        ),
        Ok(values) => {
            tracing::warn!(
                requested = sampled.len(),
                received = values.len(),
                "elevation provider returned a short batch, dropping elevations"
            );
            None
        }
        Err(err) => {
            tracing::warn!("elevation lookup unavailable: {err}");
            None
        }
    };

    ElevationProfile {
        elevations,
        distances,
    }
}
