//! Directions-provider request shaping. One configuration-driven builder
//! replaces the original per-profile branches: each routing profile maps to
//! a declarative custom model, and the route mode decides between
//! alternative-route and round-trip parameters. The engine never calls the
//! directions provider itself; callers serialize the resolved options into
//! their request.

use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::Coordinate;

const SNAP_PREVENTIONS: &[&str] = &["motorway", "ferry", "tunnel"];
const DETAILS: &[&str] = &["road_class", "surface", "leg_distance", "leg_time"];
const DEFAULT_DISTANCE_INFLUENCE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingProfile {
    Cycling,
    GravelCycling,
    Walking,
}

impl RoutingProfile {
    /// Provider-side profile name.
    fn provider_profile(self) -> &'static str {
        match self {
            RoutingProfile::Cycling | RoutingProfile::GravelCycling => "bike_gravel",
            RoutingProfile::Walking => "foot",
        }
    }

    /// Declarative priority weights per profile. Values are multipliers in
    /// (0, 1]; lower steers the router away from that kind of way.
    fn priority_rules(self) -> Vec<WeightRule> {
        match self {
            RoutingProfile::Cycling => vec![
                WeightRule::new("surface == GRAVEL", 0.7),
                WeightRule::new("road_class == TRACK", 0.8),
            ],
            RoutingProfile::GravelCycling => vec![
                WeightRule::new("surface == ASPHALT", 0.6),
                WeightRule::new("road_class == PRIMARY", 0.5),
            ],
            RoutingProfile::Walking => vec![
                WeightRule::new("road_class == PRIMARY", 0.4),
                WeightRule::new("road_class == SECONDARY", 0.7),
            ],
        }
    }
}

/// Point-to-point requests carry an optional avoid-area and a distance
/// influence; round trips carry a target distance and a random seed.
#[derive(Debug, Clone)]
pub enum RouteMode {
    PointToPoint {
        distance_influence: Option<f64>,
        avoid_area: Option<Value>,
    },
    RoundTrip {
        distance_meters: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightRule {
    #[serde(rename = "if")]
    pub condition: String,
    pub multiply_by: f64,
}

impl WeightRule {
    fn new(condition: &str, multiply_by: f64) -> Self {
        Self {
            condition: condition.to_owned(),
            multiply_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomModel {
    pub distance_influence: f64,
    pub priority: Vec<WeightRule>,
    pub areas: Value,
}

/// Fully resolved request options, ready to serialize into the provider
/// request body.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingOptions {
    pub profile: &'static str,
    /// (lon, lat) pairs, the order the provider expects.
    pub points: Vec<[f64; 2]>,
    pub snap_preventions: Vec<&'static str>,
    pub details: Vec<&'static str>,
    pub locale: &'static str,
    pub instructions: bool,
    pub calc_points: bool,
    pub elevation: bool,
    pub optimize: bool,
    pub points_encoded: bool,
    pub algorithm: &'static str,
    #[serde(rename = "ch.disable")]
    pub ch_disable: bool,
    #[serde(rename = "alternative_route.max_paths", skip_serializing_if = "Option::is_none")]
    pub alternative_max_paths: Option<u32>,
    #[serde(
        rename = "alternative_route.max_weight_factor",
        skip_serializing_if = "Option::is_none"
    )]
    pub alternative_max_weight_factor: Option<f64>,
    #[serde(
        rename = "alternative_route.max_share_factor",
        skip_serializing_if = "Option::is_none"
    )]
    pub alternative_max_share_factor: Option<f64>,
    #[serde(rename = "round_trip.distance", skip_serializing_if = "Option::is_none")]
    pub round_trip_distance: Option<f64>,
    #[serde(rename = "round_trip.seed", skip_serializing_if = "Option::is_none")]
    pub round_trip_seed: Option<u32>,
    pub custom_model: CustomModel,
}

/// A polygon area the router should treat as off-limits, empty by default.
fn default_area() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "avoid",
            "properties": {},
            "geometry": {"type": "Polygon", "bbox": null, "coordinates": [[]]}
        }]
    })
}

pub fn resolve(
    profile: RoutingProfile,
    mode: &RouteMode,
    waypoints: &[Coordinate],
) -> RoutingOptions {
    let points = waypoints.iter().map(|c| [c.lon, c.lat]).collect();

    let (distance_influence, areas) = match mode {
        RouteMode::PointToPoint {
            distance_influence,
            avoid_area,
        } => (
            distance_influence.unwrap_or(DEFAULT_DISTANCE_INFLUENCE),
            avoid_area.clone().map_or_else(default_area, |geometry| {
                let mut area = default_area();
                area["features"][0]["geometry"] = geometry;
                area
            }),
        ),
        // Round trips keep the model defaults; the seed drives variety.
        RouteMode::RoundTrip { .. } => (DEFAULT_DISTANCE_INFLUENCE, default_area()),
    };

    let custom_model = CustomModel {
        distance_influence,
        priority: profile.priority_rules(),
        areas,
    };

    let mut options = RoutingOptions {
        profile: profile.provider_profile(),
        points,
        snap_preventions: SNAP_PREVENTIONS.to_vec(),
        details: DETAILS.to_vec(),
        locale: "en",
        instructions: true,
        calc_points: true,
        elevation: true,
        optimize: false,
        points_encoded: true,
        algorithm: "alternative_route",
        ch_disable: false,
        alternative_max_paths: Some(2),
        alternative_max_weight_factor: Some(3.5),
        alternative_max_share_factor: Some(1.4),
        round_trip_distance: None,
        round_trip_seed: None,
        custom_model,
    };

    if let RouteMode::RoundTrip { distance_meters } = mode {
        options.algorithm = "round_trip";
        options.ch_disable = true;
        options.alternative_max_paths = None;
        options.alternative_max_weight_factor = None;
        options.alternative_max_share_factor = None;
        options.round_trip_distance = Some(*distance_meters);
        options.round_trip_seed = Some(rand::rng().random_range(0..1000));
    }

    options
}
