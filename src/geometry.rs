//! Great-circle and point-to-polyline distances. Pure helpers shared by the
//! sampler and the surface classifier.

use crate::models::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters. Accurate to well under 1% at sub-100 km
/// scales.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    // Rounding can push h past 1.0 for near-antipodal pairs; asin would
    // then return NaN.
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Minimum distance in meters from `point` to any segment of `line`, not just
/// its vertices. A route point should match the nearest road, which may run
/// between two distant vertices.
///
/// Returns `f64::INFINITY` for an empty line.
pub fn point_to_polyline_m(point: Coordinate, line: &[Coordinate]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => haversine_m(point, *only),
        _ => line
            .windows(2)
            .map(|segment| point_to_segment_m(point, segment[0], segment[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Distance from a point to one segment, via an equirectangular projection
/// centered on the point. Exact enough at road-matching scales (meters to a
/// few kilometers).
fn point_to_segment_m(point: Coordinate, start: Coordinate, end: Coordinate) -> f64 {
    let (ax, ay) = project(point, start);
    let (bx, by) = project(point, end);

    let dx = bx - ax;
    let dy = by - ay;
    let segment_len_sq = dx * dx + dy * dy;

    if segment_len_sq <= f64::EPSILON {
        return (ax * ax + ay * ay).sqrt();
    }

    // Projection of the origin (the point) onto the segment, clamped to it.
    let t = (-(ax * dx + ay * dy) / segment_len_sq).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    (cx * cx + cy * cy).sqrt()
}

/// Round to 2 decimal places (centimeter resolution for meter values).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Local meters offset of `p` relative to `origin`.
fn project(origin: Coordinate, p: Coordinate) -> (f64, f64) {
    let x = (p.lon - origin.lon).to_radians() * origin.lat.to_radians().cos() * EARTH_RADIUS_M;
    let y = (p.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
    (x, y)
}
