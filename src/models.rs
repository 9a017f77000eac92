use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// One route as returned by the directions provider. Consumed read-only;
/// the engine never mutates it.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    /// Total route distance in meters.
    #[serde(rename = "distance")]
    pub distance_meters: f64,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A maneuver-level route segment carrying one encoded polyline (precision 6).
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub geometry: String,
    #[serde(rename = "distance")]
    pub distance_meters: f64,
}

/// A coordinate accepted by the sampler, with its position in the decoded
/// coordinate stream and the distance from the previously accepted point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledPoint {
    pub coordinate: Coordinate,
    pub index: usize,
    pub segment_distance_meters: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceLabel {
    Paved,
    Unpaved,
    Unknown,
}

impl std::fmt::Display for SurfaceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SurfaceLabel::Paved => "paved",
            SurfaceLabel::Unpaved => "unpaved",
            SurfaceLabel::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Distance attributed to one surface label, in meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceShare {
    pub surface: SurfaceLabel,
    pub distance_meters: f64,
}

/// Per-surface distance totals, ordered by descending distance. The shares
/// sum to the total distance of all classified steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurfaceBreakdown {
    pub shares: Vec<SurfaceShare>,
}

impl SurfaceBreakdown {
    pub fn total_distance_meters(&self) -> f64 {
        self.shares.iter().map(|s| s.distance_meters).sum()
    }
}

/// Elevation values aligned index-for-index with the sampled points.
/// `elevations` is `None` when the provider was unreachable or returned a
/// short batch; `distances` always comes from local sampling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationProfile {
    pub elevations: Option<Vec<f64>>,
    pub distances: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMetrics {
    pub surface: Option<SurfaceBreakdown>,
    pub elevation: ElevationProfile,
}

/// A named feature reduced to its best-tagged location, ranked by quality
/// (total tag count across every occurrence of the name).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWaypoint {
    pub name: String,
    pub coordinate: Coordinate,
    pub quality: u32,
}

/// One element of a geodata provider response. Ways requested with
/// `out center` carry a `center`; ways requested with `out geom` carry an
/// ordered `geometry`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsmElement {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub center: Option<OsmPoint>,
    #[serde(default)]
    pub geometry: Option<Vec<OsmPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OsmPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<OsmPoint> for Coordinate {
    fn from(p: OsmPoint) -> Self {
        Coordinate { lat: p.lat, lon: p.lon }
    }
}
