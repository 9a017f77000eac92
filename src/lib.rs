//! trailmetrics — route enrichment for cycling and hiking routes.
//!
//! Consumes a directions provider's route (legs, steps, encoded geometries)
//! and derives surface composition, an elevation profile and ranked points
//! of interest along the corridor. Route computation itself stays with the
//! directions provider; this crate only enriches its output.

pub mod elevation;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod models;
pub mod options;
pub mod overpass;
pub mod poi;
pub mod polyline;
pub mod sampling;
pub mod surface;

pub use crate::elevation::{ElevationProvider, OpenTopoDataClient};
pub use crate::engine::{EngineConfig, EnrichmentEngine};
pub use crate::error::{EnrichError, ProviderError};
pub use crate::models::{
    Coordinate, ElevationProfile, Leg, RankedWaypoint, Route, RouteMetrics, Step, SurfaceBreakdown,
    SurfaceLabel,
};
pub use crate::overpass::{GeodataProvider, OverpassClient};
pub use crate::surface::MatchPolicy;
