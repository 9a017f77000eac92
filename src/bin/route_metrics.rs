//! Diagnostic CLI: load a directions-provider route from a JSON file, run
//! the enrichment engine against real providers and print the result.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trailmetrics::{EngineConfig, EnrichmentEngine, OpenTopoDataClient, OverpassClient, Route};

#[derive(Parser)]
#[command(about = "Compute surface/elevation metrics and POIs for a saved route response")]
struct Args {
    /// Path to a JSON file holding one route object (distance + legs).
    route: PathBuf,

    #[arg(long, default_value = "https://overpass-api.de/api/interpreter")]
    overpass_url: String,

    #[arg(long)]
    overpass_fallback_url: Option<String>,

    #[arg(long, default_value = "https://api.opentopodata.org/v1/srtm30m")]
    elevation_url: String,

    /// Waypoints the user already placed; reduces the POI budget.
    #[arg(long, default_value_t = 0)]
    user_waypoints: usize,

    /// Also discover POIs along the corridor.
    #[arg(long)]
    pois: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trailmetrics=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.route)?;
    let route: Route = serde_json::from_str(&raw)?;
    tracing::info!(
        distance_meters = route.distance_meters,
        legs = route.legs.len(),
        "loaded route from {}",
        args.route.display()
    );

    let config = EngineConfig {
        overpass_primary_url: args.overpass_url.clone(),
        overpass_fallback_url: args.overpass_fallback_url.clone(),
        elevation_url: args.elevation_url.clone(),
        ..EngineConfig::default()
    };
    let geodata = OverpassClient::new(&config.overpass_primary_url, config.overpass_fallback_url.clone());
    let elevation = OpenTopoDataClient::new(&config.elevation_url);
    let engine = EnrichmentEngine::new(config, geodata, elevation);

    let metrics = engine.route_metrics(&route).await?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    if args.pois {
        match engine.pois_along_route(&route, args.user_waypoints).await? {
            Some(waypoints) => println!("{}", serde_json::to_string_pretty(&waypoints)?),
            None => println!("POIs unavailable for this route"),
        }
    }

    Ok(())
}
