//! Joins a point table with a zoning layer and writes the joined table and the web map feed.
//!
//! ```text
//! cargo run --example overlay_join -- zona.geojson titik.csv ZONA [hasil_overlay.csv] [peta.json]
//! ```

use anyhow::{bail, Context};
use peta::pipeline::{load_zoning, run_overlay, OverlayConfig};
use peta::Session;

const USAGE: &str =
    "usage: overlay_join <zoning.zip|zoning.geojson> <points.csv> <attribute> [out.csv] [feed.json]";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [zoning, points, attribute, rest @ ..] = args.as_slice() else {
        bail!(USAGE);
    };
    let csv_path = rest.first().map(String::as_str).unwrap_or("hasil_overlay.csv");
    let feed_path = rest.get(1).map(String::as_str).unwrap_or("peta.json");

    let zoning_data = std::fs::read(zoning).with_context(|| format!("cannot read {zoning}"))?;
    let points_data = std::fs::read(points).with_context(|| format!("cannot read {points}"))?;

    let mut session = Session::new();
    let config = OverlayConfig {
        preferred_attribute: Some(attribute.clone()),
        ..Default::default()
    };

    let result = load_zoning(&mut session, zoning, &zoning_data, &config).and_then(|names| {
        if session.selected_attribute.is_none() {
            log::error!("Attribute '{attribute}' not found, available: {}", names.join(", "));
        }
        session.select_attribute(attribute)?;
        run_overlay(&session, &points_data, &config)
    });

    let output = match result {
        Ok(output) => output,
        Err(err) => bail!(err.user_message()),
    };

    std::fs::write(csv_path, &output.csv)?;
    if let Some(feed) = &output.feed {
        std::fs::write(feed_path, feed.to_json()?)?;
    }

    let matched = output.results.iter().filter(|r| r.value.is_some()).count();
    log::info!(
        "{matched} of {} points matched '{}', table written to {csv_path}",
        output.results.len(),
        output.attribute
    );

    Ok(())
}
