use log::info;
use peta_types::cartesian::{Point2d, Rect};
use peta_types::geo::Crs;
use peta_types::{Contour, Polygon};
use serde::{Deserialize, Serialize};

use super::RenderedMap;
use crate::attributes::Attributes;
use crate::basemap::Basemap;
use crate::error::PetaError;
use crate::io::read_shapefile_zip;
use crate::layer::{Feature, VectorLayer};
use crate::layout::decorations::{draw_grid, draw_legend, draw_scale_bar};
use crate::layout::{
    draw_features, text_rasterizer, GridConfig, LegendConfig, LegendItem, MapComposition,
    PageSetup, ScaleBarConfig,
};
use crate::render::text::{HorizontalAlignment, VerticalAlignment};
use crate::render::{ImageFormat, LinePaint};
use crate::symbol::{
    ArbitraryGeometrySymbol, CirclePointSymbol, SimpleContourSymbol, SimplePolygonSymbol,
};
use crate::Color;

/// Relative heights of the title, legend, notes and source sections of the text panel.
const TEXT_SECTIONS: [f64; 4] = [0.2, 0.4, 0.25, 0.15];

/// Layout of a map annex: a framed map panel on the left and a framed text panel on the right.
///
/// Panels are `[left, bottom, width, height]` figure fractions, sizes are in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnexConfig {
    /// Paper.
    pub page: PageSetup,
    /// Map panel.
    pub map_panel: [f64; 4],
    /// Text panel with title, legend, notes and source.
    pub text_panel: [f64; 4],
    /// Margin around the data in the map panel, as a fraction of the data extent.
    pub padding: f64,
    /// Fill of the uploaded features.
    pub layer_color: Color,
    /// Color of the route line.
    pub line_color: Color,
    /// Width of the route line in points.
    pub line_width_pt: f64,
    /// Fill of the planned area.
    pub area_color: Color,
    /// Coordinate grid, `None` to skip.
    pub grid: Option<GridConfig>,
    /// Scale bar, `None` to skip.
    pub scale_bar: Option<ScaleBarConfig>,
    /// Title, lines separated by `\n`.
    pub title: String,
    /// Font size of the title in points.
    pub title_size_pt: f64,
    /// Legend content.
    pub legend: LegendConfig,
    /// Heading of the notes.
    pub notes_heading: String,
    /// Notes, one per line.
    pub notes: Vec<String>,
    /// Data source text.
    pub source: String,
    /// Font size of notes and source in points.
    pub text_size_pt: f64,
    /// Width of the figure border in points.
    pub border_width_pt: f64,
    /// Preferred font families.
    pub font_family: Vec<String>,
    /// Output encoding.
    pub format: ImageFormat,
}

impl Default for AnnexConfig {
    fn default() -> Self {
        let layer_color = Color::GREEN.with_opacity(0.5);
        let line_color = Color::RED;
        let area_color = Color::ORANGE.with_opacity(0.5);

        Self {
            page: PageSetup::default(),
            map_panel: [0.03, 0.05, 0.64, 0.9],
            text_panel: [0.69, 0.05, 0.28, 0.9],
            padding: 0.1,
            layer_color,
            line_color,
            line_width_pt: 1.5,
            area_color,
            grid: Some(GridConfig::default()),
            scale_bar: Some(ScaleBarConfig::default()),
            title: "LAMPIRAN\nPETA KESESUAIAN KEGIATAN\nPEMANFAATAN RUANG LAUT".into(),
            title_size_pt: 11.0,
            legend: LegendConfig {
                title: Some("LEGENDA".into()),
                items: vec![
                    LegendItem::fill("Lokasi Kegiatan", layer_color),
                    LegendItem::line("Alur Pelayaran", line_color),
                    LegendItem::fill("Rencana Terminal Khusus", area_color),
                ],
                font_size_pt: 8.0,
            },
            notes_heading: "Keterangan:".into(),
            notes: vec![
                "Sistem Koordinat: Geografis WGS 84".into(),
                "Proyeksi Peta: Web Mercator".into(),
            ],
            source: "Sumber Data: Kementerian Kelautan dan Perikanan".into(),
            text_size_pt: 8.0,
            border_width_pt: 2.0,
            font_family: vec!["DejaVu Sans".into(), "Liberation Sans".into()],
            format: ImageFormat::default(),
        }
    }
}

/// Inputs of one annex run.
pub struct AnnexRequest<'a> {
    /// Zipped shapefile bundle.
    pub data: &'a [u8],
    /// Route line, longitude and latitude in degrees.
    pub line: Contour<Point2d>,
    /// Planned area, longitude and latitude in degrees.
    pub area: Polygon<Point2d>,
    /// Basemap drawn under the features.
    pub basemap: Option<&'a Basemap>,
    /// Font files used in addition to (or instead of) system fonts.
    pub fonts: &'a [Vec<u8>],
    /// Whether the fonts installed in the system are loaded.
    pub system_fonts: bool,
}

impl<'a> AnnexRequest<'a> {
    /// Request without basemap, using system fonts.
    pub fn new(data: &'a [u8], line: Contour<Point2d>, area: Polygon<Point2d>) -> Self {
        Self {
            data,
            line,
            area,
            basemap: None,
            fonts: &[],
            system_fonts: true,
        }
    }
}

/// Renders the map annex of a zipped shapefile together with the route line and the planned area.
///
/// The map panel is fitted to the shapefile features and both auxiliary geometries, all shown in Web Mercator.
pub fn render_annex(
    request: &AnnexRequest,
    config: &AnnexConfig,
) -> Result<RenderedMap, PetaError> {
    if request.line.len() < 2 {
        return Err(PetaError::Input(
            "route line must have at least two points".into(),
        ));
    }
    if request.area.outer_contour.len() < 3 {
        return Err(PetaError::Input(
            "planned area must have at least three points".into(),
        ));
    }

    let layer = read_shapefile_zip(request.data)?
        .normalize_crs()
        .reproject(&Crs::EPSG3857)?;
    let auxiliary = VectorLayer::new(
        vec![
            Feature::new(request.area.clone().into(), Attributes::new()),
            Feature::new(request.line.clone().into(), Attributes::new()),
        ],
        Some(Crs::WGS84),
    )
    .reproject(&Crs::EPSG3857)?;

    let extent = layer
        .extent()
        .into_iter()
        .chain(auxiliary.extent())
        .reduce(|acc, rect| acc.merge(rect))
        .ok_or_else(|| PetaError::Geometry("dataset has no coordinates".into()))?;

    let mut composition = MapComposition::new(
        config.page,
        text_rasterizer(request.fonts, request.system_fonts),
    )?
    .with_font_family(config.font_family.clone());

    let page = *composition.page();
    let frame_paint = LinePaint::solid(Color::BLACK, composition.pt(1.0));
    let layer_symbol = ArbitraryGeometrySymbol {
        polygon: SimplePolygonSymbol::new(config.layer_color)
            .with_stroke_color(Color::BLACK)
            .with_stroke_width(composition.pt(0.5)),
        contour: SimpleContourSymbol::new(config.layer_color.with_alpha(255), composition.pt(1.0)),
        point: CirclePointSymbol::new(config.layer_color.with_alpha(255), composition.pt(4.0)),
    };
    let auxiliary_symbol = ArbitraryGeometrySymbol {
        polygon: SimplePolygonSymbol::new(config.area_color)
            .with_stroke_color(config.area_color.with_alpha(255))
            .with_stroke_width(composition.pt(1.0)),
        contour: SimpleContourSymbol::new(config.line_color, composition.pt(config.line_width_pt)),
        point: CirclePointSymbol::new(config.line_color, composition.pt(4.0)),
    };
    let grid_style = config
        .grid
        .as_ref()
        .map(|grid| composition.text_style(grid.label_size_pt));
    let scale_style = config
        .scale_bar
        .as_ref()
        .map(|bar| composition.text_style(bar.label_size_pt));

    let map_rect = {
        let mut painter =
            composition.add_map_panel("map", config.map_panel, extent, config.padding)?;

        if let Some(basemap) = request.basemap {
            basemap.draw(&mut painter);
        }

        draw_features(&mut painter, &layer, &layer_symbol);
        draw_features(&mut painter, &auxiliary, &auxiliary_symbol);

        if let (Some(grid), Some(style)) = (&config.grid, &grid_style) {
            draw_grid(&mut painter, grid, &page, style, &Crs::EPSG3857);
        }
        if let (Some(bar), Some(style)) = (&config.scale_bar, &scale_style) {
            draw_scale_bar(&mut painter, bar, &page, style);
        }

        painter.panel()
    };
    composition.canvas().stroke_rect(map_rect, &frame_paint);

    draw_text_panel(&mut composition, config, &frame_paint);
    composition.draw_border(Color::BLACK, config.border_width_pt);

    let bytes = composition.encode(config.format)?;
    let (width, height) = page.pixel_size();
    info!(
        "Rendered annex of {} features: {width}x{height}, {} bytes",
        layer.len(),
        bytes.len()
    );

    Ok(RenderedMap {
        bytes,
        format: config.format,
        width,
        height,
    })
}

fn draw_text_panel(composition: &mut MapComposition, config: &AnnexConfig, frame: &LinePaint) {
    let panel = composition.add_panel("text", config.text_panel);
    let sections = split_rows(panel, TEXT_SECTIONS);
    let [title, legend, notes, source] = sections;
    for (name, rect) in [
        ("title", title),
        ("legend", legend),
        ("notes", notes),
        ("source", source),
    ] {
        composition.add_panel_rect(name, rect);
    }

    let title_style = composition
        .text_style(config.title_size_pt)
        .bold()
        .aligned(HorizontalAlignment::Center, VerticalAlignment::Middle);
    let legend_style = composition.text_style(config.legend.font_size_pt);
    let text_style = composition
        .text_style(config.text_size_pt)
        .aligned(HorizontalAlignment::Left, VerticalAlignment::Top);
    let pad = text_style.font_size as f64;

    let canvas = composition.canvas();
    canvas.stroke_rect(panel, frame);
    for rect in &sections[1..] {
        canvas.draw_line(
            &[
                Point2d::new(rect.x_min(), rect.y_min()),
                Point2d::new(rect.x_max(), rect.y_min()),
            ],
            false,
            frame,
            None,
        );
    }

    canvas.draw_text(&config.title, title.center(), &title_style);

    let legend_box = Rect::new(
        legend.x_min() + pad,
        legend.y_min() + pad,
        legend.x_max() - pad,
        legend.y_max() - pad,
    );
    draw_legend(canvas, legend_box, &config.legend, &legend_style);

    let mut notes_text = config.notes_heading.clone();
    for note in &config.notes {
        notes_text.push('\n');
        notes_text.push_str(note);
    }
    canvas.draw_text(
        &notes_text,
        Point2d::new(notes.x_min() + pad, notes.y_min() + pad),
        &text_style,
    );
    canvas.draw_text(
        &config.source,
        Point2d::new(source.x_min() + pad, source.y_min() + pad),
        &text_style,
    );
}

/// Splits a rectangle into rows from top to bottom with heights proportional to `shares`.
fn split_rows<const N: usize>(rect: Rect, shares: [f64; N]) -> [Rect; N] {
    let total: f64 = shares.iter().sum();
    let mut top = rect.y_min();
    shares.map(|share| {
        let height = if total > 0.0 {
            rect.height() * share / total
        } else {
            0.0
        };
        let row = Rect::new(rect.x_min(), top, rect.x_max(), top + height);
        top += height;
        row
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use peta_types::ClosedContour;

    fn area() -> Polygon<Point2d> {
        Polygon::new(
            ClosedContour::new(vec![
                Point2d::new(106.0, -6.0),
                Point2d::new(106.1, -6.0),
                Point2d::new(106.1, -6.1),
            ]),
            vec![],
        )
    }

    #[test]
    fn rows() {
        let rows = split_rows(Rect::new(0.0, 10.0, 50.0, 110.0), TEXT_SECTIONS);
        assert_abs_diff_eq!(rows[0].y_min(), 10.0);
        assert_abs_diff_eq!(rows[0].y_max(), 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[1].y_max(), 70.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[3].y_max(), 110.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[2].width(), 50.0);
    }

    #[test]
    fn invalid_auxiliary_geometry() {
        let request = AnnexRequest::new(
            b"",
            Contour::open(vec![Point2d::new(106.0, -6.0)]),
            area(),
        );
        assert_matches!(
            render_annex(&request, &AnnexConfig::default()),
            Err(PetaError::Input(message)) if message.contains("route line")
        );
    }

    #[test]
    fn not_a_zip() {
        let line = Contour::open(vec![Point2d::new(106.0, -6.0), Point2d::new(106.2, -6.2)]);
        let request = AnnexRequest::new(b"{}", line, area());
        assert_matches!(
            render_annex(&request, &AnnexConfig::default()),
            Err(PetaError::Zip(_))
        );
    }

    #[test]
    fn default_legend_matches_colors() {
        let config = AnnexConfig::default();
        assert_eq!(config.legend.items[0].color, config.layer_color);
        assert_eq!(config.legend.items[1].color, config.line_color);
        assert_eq!(config.legend.items[2].color, config.area_color);
    }
}
