//! Renders the recommendation map of a zipped shapefile or GeoJSON file.
//!
//! ```text
//! cargo run --example layout_map -- zona.zip peta_rekomendasi.jpg \
//!     [--config layout.json] [--countries countries.geojson] [--tiles tiles/] [--logo logo.png]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use peta::basemap::{Basemap, DirectoryTileSource};
use peta::countries::CountryBoundaries;
use peta::layout::LayoutConfig;
use peta::pipeline::{render_layout, LayoutRequest};

#[derive(Default)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    countries: Option<PathBuf>,
    tiles: Option<PathBuf>,
    logo: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        output: "peta_rekomendasi.jpg".into(),
        ..Default::default()
    };
    let mut positional = vec![];

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = || iter.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--config" => args.config = Some(value()?.into()),
            "--countries" => args.countries = Some(value()?.into()),
            "--tiles" => args.tiles = Some(value()?.into()),
            "--logo" => args.logo = Some(value()?.into()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(input) = positional.next() else {
        bail!("usage: layout_map <input.zip|input.geojson> [output] [options]");
    };
    args.input = input.into();
    if let Some(output) = positional.next() {
        args.output = output.into();
    }

    Ok(args)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let data = std::fs::read(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let file_name = args.input.to_string_lossy().into_owned();

    let config = match &args.config {
        Some(path) => LayoutConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };
    let countries = match &args.countries {
        Some(path) => Some(CountryBoundaries::from_geojson(&std::fs::read(path)?)?),
        None => None,
    };
    let basemap = args
        .tiles
        .as_ref()
        .map(|dir| Basemap::web(DirectoryTileSource::new(dir)));
    let logo = match &args.logo {
        Some(path) => Some(std::fs::read(path)?),
        None => None,
    };

    let mut request = LayoutRequest::new(&file_name, &data);
    if let Some(basemap) = &basemap {
        request = request.with_basemap(basemap);
    }
    if let Some(countries) = &countries {
        request = request.with_countries(countries);
    }
    if let Some(logo) = &logo {
        request = request.with_logo(logo);
    }

    match render_layout(&request, &config) {
        Ok(map) => {
            std::fs::write(&args.output, &map.bytes)?;
            log::info!(
                "Saved {}x{} {} to {}",
                map.width,
                map.height,
                map.mime_type(),
                args.output.display()
            );
            Ok(())
        }
        Err(err) => bail!(err.user_message()),
    }
}
