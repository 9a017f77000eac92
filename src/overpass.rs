//! Geodata provider: Overpass-style query builders and an HTTP client with a
//! primary/fallback instance pair.

use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::{Coordinate, OsmElement};

const SERVICE: &str = "geodata provider";

/// Capability interface over the geodata service so tests can substitute
/// canned responses.
pub trait GeodataProvider: Send + Sync {
    fn fetch(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<OsmElement>, ProviderError>> + Send;
}

/// Named park/trail/recreation features within `radius_m` of each corridor
/// point, plus explicitly bicycle-designated ways, with `out center`.
pub fn poi_corridor_query(radius_m: f64, coordinates: &[Coordinate]) -> String {
    let mut query = String::from("[out:json];(");
    for coordinate in coordinates {
        for selector in [
            "way[\"leisure\"=\"park\"][\"name\"]",
            "way[\"leisure\"=\"nature_reserve\"][\"name\"]",
            "way[\"landuse\"=\"recreation_ground\"][\"name\"]",
            "way[\"bicycle\"=\"designated\"][\"name\"]",
        ] {
            let _ = write!(
                query,
                "{selector}(around:{radius_m:.0},{:.6},{:.6});",
                coordinate.lat, coordinate.lon
            );
        }
    }
    query.push_str(");out center;");
    query
}

/// Named POIs within a polygon (e.g. an isochrone contour). Coordinates are
/// (lat, lon) pairs of the polygon ring. Returns `None` for an empty ring.
pub fn poi_within_polygon_query(polygon: &[Coordinate]) -> Option<String> {
    if polygon.is_empty() {
        return None;
    }

    let ring = polygon
        .iter()
        .map(|c| format!("{:.6} {:.6}", c.lat, c.lon))
        .collect::<Vec<_>>()
        .join(" ");

    let mut query = String::from("[out:json];(");
    for selector in [
        "way[\"leisure\"=\"park\"][\"name\"]",
        "way[\"leisure\"=\"nature_reserve\"][\"name\"]",
        "way[\"landuse\"=\"recreation_ground\"][\"name\"]",
    ] {
        let _ = write!(query, "{selector}(poly:\"{ring}\");");
    }
    query.push_str(");out center;");
    Some(query)
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

/// Whether a primary-instance status warrants the single fallback retry.
/// Only server errors are retryable; a 4xx means the query itself is bad and
/// would fail identically on the fallback.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
}

/// Overpass HTTP client. On a 5xx from the primary instance the query is
/// retried exactly once against the fallback instance.
pub struct OverpassClient {
    client: reqwest::Client,
    primary_url: String,
    fallback_url: Option<String>,
}

impl OverpassClient {
    pub fn new(primary_url: impl Into<String>, fallback_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
            primary_url: primary_url.into(),
            fallback_url,
        }
    }

    async fn post_query(&self, url: &str, query: &str) -> Result<reqwest::Response, ProviderError> {
        self.client
            .post(url)
            .body(query.to_owned())
            .send()
            .await
            .map_err(|err| ProviderError::Unavailable {
                service: SERVICE,
                reason: format!("{url}: {err}"),
            })
    }

    async fn parse_elements(response: reqwest::Response) -> Result<Vec<OsmElement>, ProviderError> {
        let url = response.url().to_string();
        let body: OverpassResponse =
            response
                .json()
                .await
                .map_err(|err| ProviderError::Unavailable {
                    service: SERVICE,
                    reason: format!("{url}: invalid response body: {err}"),
                })?;
        Ok(body.elements)
    }
}

impl GeodataProvider for OverpassClient {
    async fn fetch(&self, query: &str) -> Result<Vec<OsmElement>, ProviderError> {
        let response = self.post_query(&self.primary_url, query).await?;
        let status = response.status();

        if status.is_success() {
            return Self::parse_elements(response).await;
        }
        if status.is_client_error() {
            tracing::warn!(endpoint = %self.primary_url, %status, "geodata query rejected");
            return Err(ProviderError::Rejected {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        if !is_retryable_status(status) {
            return Err(ProviderError::Unavailable {
                service: SERVICE,
                reason: format!("{}: unexpected status {status}", self.primary_url),
            });
        }

        let Some(fallback_url) = self.fallback_url.as_deref() else {
            return Err(ProviderError::Unavailable {
                service: SERVICE,
                reason: format!("{}: status {status}, no fallback configured", self.primary_url),
            });
        };

        tracing::warn!(
            endpoint = %self.primary_url,
            %status,
            fallback = %fallback_url,
            "primary geodata instance failed, trying fallback"
        );

        let response = self.post_query(fallback_url, query).await?;
        let fallback_status = response.status();
        if fallback_status.is_success() {
            return Self::parse_elements(response).await;
        }
        Err(ProviderError::Unavailable {
            service: SERVICE,
            reason: format!("{fallback_url}: fallback status {fallback_status}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corridor_query_covers_every_point_and_feature_type() {
        let points = [
            Coordinate { lat: 45.0, lon: 5.0 },
            Coordinate { lat: 45.01, lon: 5.01 },
        ];
        let query = poi_corridor_query(1000.0, &points);

        assert!(query.starts_with("[out:json];("));
        assert!(query.ends_with(");out center;"));
        assert_eq!(query.matches("leisure\"=\"park").count(), 2);
        assert_eq!(query.matches("nature_reserve").count(), 2);
        assert_eq!(query.matches("recreation_ground").count(), 2);
        assert_eq!(query.matches("bicycle\"=\"designated").count(), 2);
        assert!(query.contains("(around:1000,45.000000,5.000000)"));
        assert!(query.contains("(around:1000,45.010000,5.010000)"));
    }

    #[test]
    fn polygon_query_rejects_empty_ring() {
        assert_eq!(poi_within_polygon_query(&[]), None);
    }

    #[test]
    fn polygon_query_inlines_ring_coordinates() {
        let ring = [
            Coordinate { lat: 45.0, lon: 5.0 },
            Coordinate { lat: 45.1, lon: 5.0 },
            Coordinate { lat: 45.1, lon: 5.1 },
        ];
        let query = poi_within_polygon_query(&ring).unwrap();
        assert!(query.contains("poly:\"45.000000 5.000000 45.100000 5.000000 45.100000 5.100000\""));
        assert_eq!(query.matches("poly:").count(), 3);
    }

    #[test]
    fn only_server_errors_are_retryable() {
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn overpass_response_parses_elements() {
        let raw = serde_json::json!({
            "version": 0.6,
            "elements": [
                {"type": "way", "id": 1, "tags": {"name": "Parc de la Tête d'Or"},
                 "center": {"lat": 45.78, "lon": 4.85}}
            ]
        });
        let body: OverpassResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(body.elements.len(), 1);
        assert_eq!(
            body.elements[0].tags.get("name").map(String::as_str),
            Some("Parc de la Tête d'Or")
        );
    }
}
