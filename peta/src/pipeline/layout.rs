use log::{debug, info, warn};
use peta_types::geo::Crs;

use super::{load_layer, RenderedMap};
use crate::basemap::Basemap;
use crate::countries::CountryBoundaries;
use crate::decoded_image::DecodedImage;
use crate::error::PetaError;
use crate::layer::VectorLayer;
use crate::layout::decorations::{draw_grid, draw_inset, draw_legend, draw_logo, draw_scale_bar};
use crate::layout::{draw_features, text_rasterizer, InsetConfig, LayoutConfig, MapComposition};
use crate::symbol::CategorizedPolygonSymbol;
use crate::Color;

/// Inputs of one layout run besides the configuration.
#[derive(Clone, Copy)]
pub struct LayoutRequest<'a> {
    /// Name of the uploaded file, used to detect its format.
    pub file_name: &'a str,
    /// Content of the uploaded file.
    pub data: &'a [u8],
    /// Basemap drawn under the features.
    pub basemap: Option<&'a Basemap>,
    /// Boundaries for the inset map.
    pub countries: Option<&'a CountryBoundaries>,
    /// Encoded logo image.
    pub logo: Option<&'a [u8]>,
    /// Font files used in addition to (or instead of) system fonts.
    pub fonts: &'a [Vec<u8>],
    /// Whether the fonts installed in the system are loaded.
    pub system_fonts: bool,
}

impl<'a> LayoutRequest<'a> {
    /// Request for the uploaded file with no basemap, inset data or logo, using system fonts.
    pub fn new(file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            file_name,
            data,
            basemap: None,
            countries: None,
            logo: None,
            fonts: &[],
            system_fonts: true,
        }
    }

    /// Sets the basemap.
    pub fn with_basemap(self, basemap: &'a Basemap) -> Self {
        Self {
            basemap: Some(basemap),
            ..self
        }
    }

    /// Sets the country boundaries for the inset.
    pub fn with_countries(self, countries: &'a CountryBoundaries) -> Self {
        Self {
            countries: Some(countries),
            ..self
        }
    }

    /// Sets the logo image.
    pub fn with_logo(self, logo: &'a [u8]) -> Self {
        Self {
            logo: Some(logo),
            ..self
        }
    }

    /// Sets the font files. With `system_fonts == false` only these fonts are used.
    pub fn with_fonts(self, fonts: &'a [Vec<u8>], system_fonts: bool) -> Self {
        Self {
            fonts,
            system_fonts,
            ..self
        }
    }
}

/// Renders the recommendation map of the uploaded dataset.
///
/// The dataset is read, assumed to be in WGS84 if it declares no CRS and reprojected to Web Mercator. The main panel
/// shows the basemap, the features colored by their position in the layer, the coordinate grid and the scale bar.
/// Around it go the title, the legend, the inset, the logo and the footer, and the page gets a border.
///
/// Missing inset data, a country not found in it and a logo that cannot be decoded only skip that decoration.
pub fn render_layout(
    request: &LayoutRequest,
    config: &LayoutConfig,
) -> Result<RenderedMap, PetaError> {
    let layer = load_layer(request.file_name, request.data)?;
    let projected = layer.reproject(&Crs::EPSG3857)?;
    let extent = projected
        .extent()
        .ok_or_else(|| PetaError::Geometry("dataset has no coordinates".into()))?;

    let mut composition = MapComposition::new(
        config.page,
        text_rasterizer(request.fonts, request.system_fonts),
    )?
    .with_font_family(config.font_family.clone());

    let page = *composition.page();
    let symbol = CategorizedPolygonSymbol {
        opacity: config.feature_opacity,
        stroke_color: config.feature_stroke,
        stroke_width: composition.pt(0.5),
    };
    let grid_style = config
        .grid
        .as_ref()
        .map(|grid| composition.text_style(grid.label_size_pt));
    let scale_style = config
        .scale_bar
        .as_ref()
        .map(|bar| composition.text_style(bar.label_size_pt));

    {
        let mut painter =
            composition.add_map_panel("main", config.main_panel, extent, config.padding)?;

        if let Some(basemap) = request.basemap {
            basemap.draw(&mut painter);
        }

        draw_features(&mut painter, &projected, &symbol);

        if let (Some(grid), Some(style)) = (&config.grid, &grid_style) {
            draw_grid(&mut painter, grid, &page, style, &Crs::EPSG3857);
        }

        if let (Some(bar), Some(style)) = (&config.scale_bar, &scale_style) {
            if draw_scale_bar(&mut painter, bar, &page, style).is_none() {
                warn!("Map extent is too small for a scale bar, scale bar is skipped");
            }
        }
    }

    composition.draw_text_block(&config.title);

    let legend_panel = composition.add_panel("legend", config.legend_panel);
    let legend_style = composition.text_style(config.legend.font_size_pt);
    draw_legend(
        composition.canvas(),
        legend_panel,
        &config.legend,
        &legend_style,
    );

    if let Some(inset) = &config.inset {
        add_inset(&mut composition, inset, request.countries, &projected);
    }

    if config.include_logo {
        match request.logo.map(DecodedImage::new) {
            Some(Ok(logo)) => {
                let target = composition.add_panel("logo", config.logo_panel);
                draw_logo(composition.canvas(), target, &logo);
            }
            Some(Err(err)) => warn!("Logo cannot be decoded, logo is skipped: {err}"),
            None => debug!("No logo given"),
        }
    }

    composition.draw_text_block(&config.footer);
    composition.draw_border(Color::BLACK, config.border_width_pt);

    let bytes = composition.encode(config.format)?;
    let (width, height) = page.pixel_size();
    info!(
        "Rendered layout of {} features: {width}x{height}, {} bytes",
        projected.len(),
        bytes.len()
    );

    Ok(RenderedMap {
        bytes,
        format: config.format,
        width,
        height,
    })
}

fn add_inset(
    composition: &mut MapComposition,
    config: &InsetConfig,
    countries: Option<&CountryBoundaries>,
    layer: &VectorLayer,
) {
    let Some(countries) = countries else {
        warn!("No country boundaries given, inset is skipped");
        return;
    };

    let Some(country) = countries.find(&config.country) else {
        warn!(
            "Country '{}' is not in the boundary dataset, inset is skipped",
            config.country
        );
        return;
    };

    let result = country
        .reproject(&Crs::EPSG3857)
        .and_then(|country| draw_inset(composition, config, &country, layer));
    if let Err(err) = result {
        warn!("Inset cannot be drawn, inset is skipped: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageSetup;
    use crate::render::ImageFormat;
    use assert_matches::assert_matches;
    use image::{ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"zona": "A"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[106.0, -7.0], [107.0, -7.0], [107.0, -6.0], [106.0, -6.0], [106.0, -7.0]]]
            }
        }]
    }"#;

    const COUNTRY: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "Indonesia"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[95.0, -11.0], [141.0, -11.0], [141.0, 6.0], [95.0, 6.0], [95.0, -11.0]]]
            }
        }]
    }"#;

    fn small_config() -> LayoutConfig {
        LayoutConfig {
            page: PageSetup::a4_landscape(72.0),
            format: ImageFormat::Png,
            ..Default::default()
        }
    }

    fn decode(map: &RenderedMap) -> RgbaImage {
        image::load_from_memory(&map.bytes).unwrap().to_rgba8()
    }

    #[test]
    fn renders_page_with_border() {
        let config = small_config();
        let map = render_layout(&LayoutRequest::new("zona.geojson", SQUARE.as_bytes()), &config)
            .unwrap();

        assert_eq!((map.width, map.height), (842, 598));
        let image = decode(&map);
        assert_eq!(image.dimensions(), (842, 598));
        assert_eq!(image.get_pixel(0, 300), &Rgba([0, 0, 0, 255]));

        let center = image.get_pixel(316, 254);
        assert_ne!(center, &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn optional_decorations() {
        let countries = CountryBoundaries::from_geojson(COUNTRY.as_bytes()).unwrap();

        let mut logo = Vec::new();
        RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]))
            .write_to(&mut Cursor::new(&mut logo), ImageOutputFormat::Png)
            .unwrap();

        let request = LayoutRequest::new("zona.geojson", SQUARE.as_bytes())
            .with_countries(&countries)
            .with_logo(&logo);
        let map = render_layout(&request, &small_config()).unwrap();
        let image = decode(&map);

        // logo box spans x 8..76, y 24..96
        assert_eq!(image.get_pixel(40, 50), &Rgba([0, 0, 255, 255]));

        let without_logo = LayoutConfig {
            include_logo: false,
            ..small_config()
        };
        let image = decode(&render_layout(&request, &without_logo).unwrap());
        assert_ne!(image.get_pixel(40, 50), &Rgba([0, 0, 255, 255]));

        let broken = LayoutRequest::new("zona.geojson", SQUARE.as_bytes()).with_logo(b"not png");
        assert!(render_layout(&broken, &small_config()).is_ok());
    }

    #[test]
    fn jpeg_output() {
        let config = LayoutConfig {
            page: PageSetup::a4_landscape(20.0),
            ..Default::default()
        };
        let map = render_layout(&LayoutRequest::new("zona.json", SQUARE.as_bytes()), &config)
            .unwrap();
        assert_eq!(map.mime_type(), "image/jpeg");
        assert_eq!(&map.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn input_errors() {
        assert_matches!(
            render_layout(&LayoutRequest::new("zona.kml", SQUARE.as_bytes()), &small_config()),
            Err(PetaError::Input(_))
        );
        assert!(render_layout(&LayoutRequest::new("zona.geojson", b"{"), &small_config()).is_err());
    }
}
