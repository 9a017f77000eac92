//! The enrichment engine: one façade over sampling, surface classification,
//! elevation lookup and POI discovery. Stateless per invocation; provider
//! endpoints and tuning knobs are explicit configuration, so tests run
//! against mock providers.

use crate::elevation::{self, ElevationProvider};
use crate::error::EnrichError;
use crate::models::{Coordinate, RankedWaypoint, Route, RouteMetrics};
use crate::overpass::{self, GeodataProvider};
use crate::poi;
use crate::sampling::{
    self, decode_steps, sample_steps, SampleSpacing,
};
use crate::surface::{self, MatchPolicy, WayGeometry};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub overpass_primary_url: String,
    pub overpass_fallback_url: Option<String>,
    pub elevation_url: String,
    /// Search radius around each POI corridor point, in meters.
    pub poi_corridor_radius_m: f64,
    /// Maximum distance for a route coordinate to match a way.
    pub surface_match_distance_m: f64,
    pub surface_match_policy: MatchPolicy,
    pub max_optimization_waypoints: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overpass_primary_url: "https://overpass-api.de/api/interpreter".into(),
            overpass_fallback_url: Some("https://overpass.kumi.systems/api/interpreter".into()),
            elevation_url: "https://api.opentopodata.org/v1/srtm30m".into(),
            poi_corridor_radius_m: 1000.0,
            surface_match_distance_m: 25.0,
            surface_match_policy: MatchPolicy::FirstMatch,
            max_optimization_waypoints: poi::MAX_OPTIMIZATION_WAYPOINTS,
        }
    }
}

pub struct EnrichmentEngine<G, E> {
    config: EngineConfig,
    geodata: G,
    elevation: E,
}

impl<G, E> EnrichmentEngine<G, E>
where
    G: GeodataProvider,
    E: ElevationProvider,
{
    pub fn new(config: EngineConfig, geodata: G, elevation: E) -> Self {
        Self {
            config,
            geodata,
            elevation,
        }
    }

    /// Compute surface composition and an elevation profile for one route.
    ///
    /// The two provider lookups run concurrently over a shared sample.
    /// Either sub-result degrades independently when its provider fails;
    /// only a route without usable geometry aborts the computation.
    pub async fn route_metrics(&self, route: &Route) -> Result<RouteMetrics, EnrichError> {
        let steps = decode_steps(route)?;

        let threshold = sampling::spacing_threshold_m(SampleSpacing::Metrics, route.distance_meters);
        let sampled = sample_steps(&steps, threshold);
        let stride = sampling::surface_lookup_stride(route.distance_meters);
        let coordinates: Vec<Coordinate> = sampled.iter().map(|p| p.coordinate).collect();

        let corridor_query = surface::highway_corridor_query(&steps, stride);
        let (ways_result, elevations_result) = tokio::join!(
            self.geodata.fetch(&corridor_query),
            self.elevation.fetch(&coordinates),
        );

        let surface = match ways_result {
            Ok(elements) => {
                let ways: Vec<WayGeometry> = elements
                    .iter()
                    .filter_map(WayGeometry::from_element)
                    .collect();
                Some(surface::classify_steps(
                    &steps,
                    &ways,
                    stride,
                    self.config.surface_match_distance_m,
                    self.config.surface_match_policy,
                ))
            }
            Err(err) => {
                tracing::warn!("surface lookup unavailable, dropping surface metrics: {err}");
                None
            }
        };

        let elevation = elevation::build_profile(&sampled, elevations_result);

        Ok(RouteMetrics { surface, elevation })
    }

    /// Discover ranked POI waypoints along the route corridor.
    ///
    /// Returns `Ok(None)` when the route has no usable geometry or the
    /// geodata provider is down ("no POIs available", not an error) and
    /// `Ok(Some(vec![]))` when the waypoint budget is already spent — in
    /// that case no query is sent at all.
    pub async fn pois_along_route(
        &self,
        route: &Route,
        user_waypoint_count: usize,
    ) -> Result<Option<Vec<RankedWaypoint>>, EnrichError> {
        let budget = self
            .config
            .max_optimization_waypoints
            .saturating_sub(user_waypoint_count);
        if budget == 0 {
            return Ok(Some(Vec::new()));
        }

        let steps = match decode_steps(route) {
            Ok(steps) => steps,
            Err(EnrichError::InsufficientGeometry) => {
                tracing::warn!("cannot discover POIs: route has no legs or steps");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let threshold =
            sampling::spacing_threshold_m(SampleSpacing::PoiCorridor, route.distance_meters);
        let sampled = sample_steps(&steps, threshold);
        let coordinates: Vec<Coordinate> = sampled.iter().map(|p| p.coordinate).collect();

        let query = overpass::poi_corridor_query(self.config.poi_corridor_radius_m, &coordinates);
        match self.geodata.fetch(&query).await {
            Ok(elements) => Ok(Some(poi::rank_waypoints(&elements, budget))),
            Err(err) => {
                tracing::warn!("POI discovery unavailable: {err}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::models::{Leg, OsmElement, Step};
    use crate::polyline;
    use crate::sampling::GEOMETRY_PRECISION;

    struct StaticGeodata(Vec<OsmElement>);

    impl GeodataProvider for StaticGeodata {
        async fn fetch(&self, _query: &str) -> Result<Vec<OsmElement>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct DownGeodata;

    impl GeodataProvider for DownGeodata {
        async fn fetch(&self, _query: &str) -> Result<Vec<OsmElement>, ProviderError> {
            Err(ProviderError::Unavailable {
                service: "geodata provider",
                reason: "connection refused".into(),
            })
        }
    }

    struct StaticElevation(Vec<f64>);

    impl ElevationProvider for StaticElevation {
        async fn fetch(&self, coordinates: &[Coordinate]) -> Result<Vec<f64>, ProviderError> {
            Ok(self.0.iter().copied().cycle().take(coordinates.len()).collect())
        }
    }

    fn single_point_route() -> Route {
        let geometry = polyline::encode(
            &[Coordinate { lat: 45.0, lon: 5.0 }],
            GEOMETRY_PRECISION,
        );
        Route {
            distance_meters: 0.0,
            legs: vec![Leg {
                steps: vec![Step {
                    geometry,
                    distance_meters: 0.0,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn metrics_on_empty_route_is_insufficient_geometry() {
        let engine = EnrichmentEngine::new(
            EngineConfig::default(),
            StaticGeodata(Vec::new()),
            StaticElevation(vec![100.0]),
        );
        let route = Route {
            distance_meters: 0.0,
            legs: Vec::new(),
        };
        assert!(matches!(
            engine.route_metrics(&route).await,
            Err(EnrichError::InsufficientGeometry)
        ));
    }

    #[tokio::test]
    async fn surface_degrades_when_geodata_is_down() {
        let engine = EnrichmentEngine::new(
            EngineConfig::default(),
            DownGeodata,
            StaticElevation(vec![100.0]),
        );
        let metrics = engine.route_metrics(&single_point_route()).await.unwrap();
        assert!(metrics.surface.is_none());
        assert_eq!(metrics.elevation.elevations, Some(vec![100.0]));
    }

    #[tokio::test]
    async fn pois_on_empty_route_are_unavailable_not_an_error() {
        let engine = EnrichmentEngine::new(
            EngineConfig::default(),
            StaticGeodata(Vec::new()),
            StaticElevation(Vec::new()),
        );
        let route = Route {
            distance_meters: 0.0,
            legs: Vec::new(),
        };
        assert_eq!(engine.pois_along_route(&route, 0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn exhausted_waypoint_budget_short_circuits() {
        // DownGeodata would degrade to None if it were queried; a budget of
        // zero must return an empty list without any lookup.
        let engine = EnrichmentEngine::new(
            EngineConfig::default(),
            DownGeodata,
            StaticElevation(Vec::new()),
        );
        let result = engine
            .pois_along_route(&single_point_route(), 12)
            .await
            .unwrap();
        assert_eq!(result, Some(Vec::new()));
    }
}
