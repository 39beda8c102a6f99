//! Renders the map annex of a zipped shapefile with a route line and a planned area.
//!
//! ```text
//! cargo run --example annex_map -- zona.zip lampiran.png \
//!     [--line "106.80,-6.10;106.90,-6.00"] [--area "106.84,-6.06;106.86,-6.06;106.86,-6.04"]
//! ```
//!
//! Without `--line` and `--area` a diagonal of the dataset extent and a square at its center are used.

use anyhow::{bail, Context};
use peta::io::read_shapefile_zip;
use peta::pipeline::{render_annex, AnnexConfig, AnnexRequest};
use peta::render::ImageFormat;
use peta_types::cartesian::Point2d;
use peta_types::geo::Crs;
use peta_types::{ClosedContour, Contour, Polygon};

fn parse_points(value: &str) -> anyhow::Result<Vec<Point2d>> {
    value
        .split(';')
        .map(|pair| {
            let (lon, lat) = pair
                .split_once(',')
                .with_context(|| format!("'{pair}' is not 'lon,lat'"))?;
            Ok(Point2d::new(lon.trim().parse()?, lat.trim().parse()?))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut positional = vec![];
    let mut line = None;
    let mut area = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--line" => line = Some(parse_points(&args.next().context("--line needs a value")?)?),
            "--area" => area = Some(parse_points(&args.next().context("--area needs a value")?)?),
            _ => positional.push(arg),
        }
    }

    let Some(input) = positional.first() else {
        bail!("usage: annex_map <input.zip> [output.png] [--line ...] [--area ...]");
    };
    let output = positional
        .get(1)
        .cloned()
        .unwrap_or_else(|| "lampiran.png".into());
    let data = std::fs::read(input).with_context(|| format!("cannot read {input}"))?;

    let extent = read_shapefile_zip(&data)
        .map_err(|err| anyhow::anyhow!(err.user_message()))?
        .normalize_crs()
        .reproject(&Crs::WGS84)?
        .extent()
        .context("dataset is empty")?;
    let center = extent.center();
    let half = extent.width().max(extent.height()) * 0.1;

    let line = line.unwrap_or_else(|| {
        vec![
            Point2d::new(extent.x_min(), extent.y_min()),
            Point2d::new(extent.x_max(), extent.y_max()),
        ]
    });
    let area = area.unwrap_or_else(|| {
        vec![
            Point2d::new(center.x - half, center.y - half),
            Point2d::new(center.x - half, center.y + half),
            Point2d::new(center.x + half, center.y + half),
            Point2d::new(center.x + half, center.y - half),
        ]
    });

    let request = AnnexRequest::new(
        &data,
        Contour::open(line),
        Polygon::new(ClosedContour::new(area), vec![]),
    );
    let config = AnnexConfig {
        format: if output.ends_with(".png") {
            ImageFormat::Png
        } else {
            ImageFormat::default()
        },
        ..Default::default()
    };

    let map = render_annex(&request, &config).map_err(|err| anyhow::anyhow!(err.user_message()))?;
    std::fs::write(&output, &map.bytes)?;
    log::info!("Saved {}x{} annex to {output}", map.width, map.height);

    Ok(())
}
