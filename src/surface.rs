//! Surface classification: infers a `paved`/`unpaved`/`unknown` label per
//! route step by nearest-matching step coordinates against highway way
//! geometries from the geodata provider, then aggregates distance per label.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::geometry::point_to_polyline_m;
use crate::models::{Coordinate, OsmElement, SurfaceBreakdown, SurfaceLabel, SurfaceShare};
use crate::sampling::DecodedStep;

/// Paved values of the OSM `surface` key, collected from
/// https://wiki.openstreetmap.org/wiki/Key:surface. Anything tagged but not
/// listed here counts as unpaved.
const PAVED_SURFACES: &[&str] = &[
    "asphalt",
    "paved",
    "concrete",
    "compacted",
    "paving_stones",
    "chipseal",
    "concrete:plates",
    "concrete:lanes",
    "sett",
    "unhewn_cobblestone",
    "cobblestone",
    "metal",
    "wood",
    "rubber",
];

/// Radius around each strided coordinate when requesting highway ways, in
/// meters. Kept tight so the response only contains ways the route runs on.
const HIGHWAY_QUERY_RADIUS_M: u32 = 2;

/// How a step's coordinates are matched against ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Stop at the first strided coordinate with a way in range. Bounds
    /// lookup cost on long routes at the price of per-coordinate precision.
    #[default]
    FirstMatch,
    /// Scan every strided coordinate and take the overall closest way.
    BestMatch,
}

/// A highway way usable for surface matching: its ordered geometry plus the
/// value of its `surface` tag, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct WayGeometry {
    pub coordinates: Vec<Coordinate>,
    pub surface: Option<String>,
}

impl WayGeometry {
    /// Ways without an ordered geometry (e.g. `out center` responses) cannot
    /// be distance-matched and are dropped.
    pub fn from_element(element: &OsmElement) -> Option<Self> {
        let geometry = element.geometry.as_ref()?;
        if geometry.is_empty() {
            return None;
        }
        Some(WayGeometry {
            coordinates: geometry.iter().map(|&p| p.into()).collect(),
            surface: element.tags.get("surface").cloned(),
        })
    }
}

pub fn classify_tag(surface: Option<&str>) -> SurfaceLabel {
    match surface {
        None => SurfaceLabel::Unknown,
        Some(tag) if PAVED_SURFACES.contains(&tag) => SurfaceLabel::Paved,
        Some(_) => SurfaceLabel::Unpaved,
    }
}

/// Overpass query for highway ways within a tight radius of each strided
/// step coordinate, with full geometries (`out geom`).
pub fn highway_corridor_query(steps: &[DecodedStep], stride: usize) -> String {
    let stride = stride.max(1);
    let mut query = String::from("[out:json];(");
    for step in steps {
        for coordinate in step.coordinates.iter().step_by(stride) {
            let _ = write!(
                query,
                "way[\"highway\"](around:{HIGHWAY_QUERY_RADIUS_M},{:.6},{:.6});",
                coordinate.lat, coordinate.lon
            );
        }
    }
    query.push_str(");out geom;");
    query
}

/// Label every step and accumulate its full distance under that label.
///
/// Per step: walk coordinates at `stride`; at the first coordinate with a way
/// within `match_distance_m`, that way's `surface` tag decides the label for
/// the entire step and the scan stops (`FirstMatch`). No way in range
/// anywhere → `unknown`. Output ordered by descending aggregated distance.
pub fn classify_steps(
    steps: &[DecodedStep],
    ways: &[WayGeometry],
    stride: usize,
    match_distance_m: f64,
    policy: MatchPolicy,
) -> SurfaceBreakdown {
    let stride = stride.max(1);
    let mut aggregates: HashMap<SurfaceLabel, f64> = HashMap::new();
    // Insertion order for deterministic output when distances tie.
    let mut label_order: Vec<SurfaceLabel> = Vec::new();

    for step in steps {
        let label = classify_step(step, ways, stride, match_distance_m, policy);
        if !aggregates.contains_key(&label) {
            label_order.push(label);
        }
        *aggregates.entry(label).or_insert(0.0) += step.distance_meters;
    }

    let mut shares: Vec<SurfaceShare> = label_order
        .into_iter()
        .map(|surface| SurfaceShare {
            surface,
            distance_meters: aggregates[&surface],
        })
        .collect();
    shares.sort_by(|a, b| {
        b.distance_meters
            .partial_cmp(&a.distance_meters)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    SurfaceBreakdown { shares }
}

fn classify_step(
    step: &DecodedStep,
    ways: &[WayGeometry],
    stride: usize,
    match_distance_m: f64,
    policy: MatchPolicy,
) -> SurfaceLabel {
    match policy {
        MatchPolicy::FirstMatch => {
            for coordinate in step.coordinates.iter().step_by(stride) {
                if let Some(way) = nearest_way_within(*coordinate, ways, match_distance_m) {
                    return classify_tag(way.surface.as_deref());
                }
            }
            SurfaceLabel::Unknown
        }
        MatchPolicy::BestMatch => {
            let mut best: Option<(f64, &WayGeometry)> = None;
            for coordinate in step.coordinates.iter().step_by(stride) {
                for way in ways {
                    let dist = point_to_polyline_m(*coordinate, &way.coordinates);
                    if dist <= match_distance_m && best.is_none_or(|(d, _)| dist < d) {
                        best = Some((dist, way));
                    }
                }
            }
            match best {
                Some((_, way)) => classify_tag(way.surface.as_deref()),
                None => SurfaceLabel::Unknown,
            }
        }
    }
}

fn nearest_way_within(
    coordinate: Coordinate,
    ways: &[WayGeometry],
    match_distance_m: f64,
) -> Option<&WayGeometry> {
    let mut nearest: Option<(f64, &WayGeometry)> = None;
    for way in ways {
        let dist = point_to_polyline_m(coordinate, &way.coordinates);
        if dist <= match_distance_m && nearest.is_none_or(|(d, _)| dist < d) {
            nearest = Some((dist, way));
        }
    }
    nearest.map(|(_, way)| way)
}
