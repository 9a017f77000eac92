//! Route sampling: decodes per-step geometries and thins the coordinate
//! stream to points spaced by a distance threshold that scales with total
//! route distance. One sample feeds both metrics assembly and POI discovery.

use crate::error::EnrichError;
use crate::geometry::{haversine_m, round2};
use crate::models::{Coordinate, Route, SampledPoint};
use crate::polyline;

/// Precision of directions-provider step geometries.
pub const GEOMETRY_PRECISION: u32 = 6;

/// Route distance covered by one scaling unit, in meters.
const SCALING_DISTANCE_M: f64 = 3000.0;

/// Spacing for metrics sampling at scaling factor 1, in meters.
const METRICS_BASE_SPACING_M: f64 = 100.0;

/// Fixed spacing for POI corridor sampling, in meters.
const POI_CORRIDOR_SPACING_M: f64 = 1000.0;

/// One step's decoded geometry paired with its reported distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStep {
    pub coordinates: Vec<Coordinate>,
    pub distance_meters: f64,
}

/// Which spacing regime a sample is taken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSpacing {
    /// Elevation/surface sampling: spacing grows with route length.
    Metrics,
    /// POI corridor sampling: one point per corridor radius.
    PoiCorridor,
}

/// `max(1, round(total / 3km))` — keeps long routes tractable by widening
/// both the sample spacing and the surface lookup stride.
pub fn scaling_factor(total_distance_meters: f64) -> u32 {
    if !total_distance_meters.is_finite() || total_distance_meters <= 0.0 {
        return 1;
    }
    ((total_distance_meters / SCALING_DISTANCE_M).round() as u32).max(1)
}

pub fn spacing_threshold_m(spacing: SampleSpacing, total_distance_meters: f64) -> f64 {
    match spacing {
        SampleSpacing::Metrics => {
            f64::from(scaling_factor(total_distance_meters)) * METRICS_BASE_SPACING_M
        }
        SampleSpacing::PoiCorridor => POI_CORRIDOR_SPACING_M,
    }
}

/// Stride at which the surface classifier walks step coordinates:
/// `max(1, round(scaling_factor / 2))`.
pub fn surface_lookup_stride(total_distance_meters: f64) -> usize {
    ((f64::from(scaling_factor(total_distance_meters)) / 2.0).round() as usize).max(1)
}

/// Decode every step geometry in leg order.
///
/// A route with zero legs or zero steps is `InsufficientGeometry`. A step
/// whose geometry fails to decode contributes no coordinates but keeps its
/// distance, so surface aggregation still accounts for it (as `unknown`).
pub fn decode_steps(route: &Route) -> Result<Vec<DecodedStep>, EnrichError> {
    let mut steps = Vec::new();

    for leg in &route.legs {
        for step in &leg.steps {
            let coordinates = match polyline::decode(&step.geometry, GEOMETRY_PRECISION) {
                Ok(coordinates) => coordinates,
                Err(err) => {
                    tracing::warn!("skipping step with undecodable geometry: {err}");
                    Vec::new()
                }
            };
            steps.push(DecodedStep {
                coordinates,
                distance_meters: step.distance_meters,
            });
        }
    }

    if steps.is_empty() {
        return Err(EnrichError::InsufficientGeometry);
    }
    Ok(steps)
}

/// Thin the decoded coordinate stream: the first coordinate is always
/// accepted (segment distance 0); every later coordinate is accepted only
/// when it is at least `threshold_m` from the last accepted one.
pub fn sample_steps(steps: &[DecodedStep], threshold_m: f64) -> Vec<SampledPoint> {
    let mut sampled: Vec<SampledPoint> = Vec::new();
    let mut last_accepted: Option<Coordinate> = None;
    let mut index = 0;

    for step in steps {
        for &coordinate in &step.coordinates {
            match last_accepted {
                None => {
                    sampled.push(SampledPoint {
                        coordinate,
                        index,
                        segment_distance_meters: 0.0,
                    });
                    last_accepted = Some(coordinate);
                }
                Some(last) => {
                    let distance = haversine_m(last, coordinate);
                    if distance >= threshold_m {
                        sampled.push(SampledPoint {
                            coordinate,
                            index,
                            segment_distance_meters: round2(distance),
                        });
                        last_accepted = Some(coordinate);
                    }
                }
            }
            index += 1;
        }
    }

    sampled
}
