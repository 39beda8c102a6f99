//! Map furniture: coordinate grid, scale bar, legend, inset and logo.

use log::debug;
use peta_types::cartesian::{Point2d, Rect};
use peta_types::geo::{ChainProjection, Crs, GeoPoint2d, Projection};

use super::{
    draw_features, GridConfig, InsetConfig, LegendConfig, LegendKind, MapComposition, PageSetup,
    ScaleBarConfig,
};
use crate::decoded_image::DecodedImage;
use crate::error::PetaError;
use crate::layer::VectorLayer;
use crate::render::text::{HorizontalAlignment, TextStyle, VerticalAlignment};
use crate::render::{Canvas, LinePaint, MapPainter, PolygonPaint};
use crate::scale_bar::length_label;
use crate::symbol::{
    ArbitraryGeometrySymbol, CirclePointSymbol, SimpleContourSymbol, SimplePolygonSymbol,
};
use crate::Color;

/// Draws dashed grid lines over the panel with coordinate labels outside of its bottom and left edges.
///
/// `crs` is the CRS of the panel view; labels show geographic coordinates whenever the view can be converted to
/// them.
pub fn draw_grid(
    painter: &mut MapPainter,
    config: &GridConfig,
    page: &PageSetup,
    label_style: &TextStyle,
    crs: &Crs,
) {
    if config.lines < 2 {
        return;
    }

    let bbox = painter.view().get_bbox();
    let panel = painter.panel();
    let paint = LinePaint::dashed(
        config.color,
        page.pt_to_px(config.width_pt),
        page.pt_to_px(config.dash_pt) as f32,
    );
    let labels = CoordinateLabels::new(crs);
    let gap = label_style.font_size as f64 * 0.3;

    let x_style = label_style.aligned(HorizontalAlignment::Center, VerticalAlignment::Top);
    for x in linspace(bbox.x_min(), bbox.x_max(), config.lines) {
        painter.line(
            &[Point2d::new(x, bbox.y_min()), Point2d::new(x, bbox.y_max())],
            false,
            &paint,
        );
        let label = labels.x_label(Point2d::new(x, bbox.center().y));
        let screen_x = painter.to_screen(&Point2d::new(x, bbox.y_min())).x;
        painter.canvas().draw_text(
            &label,
            Point2d::new(screen_x, panel.y_max() + gap),
            &x_style,
        );
    }

    let y_style = label_style.aligned(HorizontalAlignment::Right, VerticalAlignment::Middle);
    for y in linspace(bbox.y_min(), bbox.y_max(), config.lines) {
        painter.line(
            &[Point2d::new(bbox.x_min(), y), Point2d::new(bbox.x_max(), y)],
            false,
            &paint,
        );
        let label = labels.y_label(Point2d::new(bbox.center().x, y));
        let screen_y = painter.to_screen(&Point2d::new(bbox.x_min(), y)).y;
        painter.canvas().draw_text(
            &label,
            Point2d::new(panel.x_min() - gap, screen_y),
            &y_style,
        );
    }
}

/// Draws a horizontal scale bar starting at `config.position` of the panel with "0 m" and length labels under it.
///
/// The bar length is chosen from the visible width of the panel in map units. Returns the length, or `None` if the
/// panel has no usable width and nothing was drawn.
pub fn draw_scale_bar(
    painter: &mut MapPainter,
    config: &ScaleBarConfig,
    page: &PageSetup,
    label_style: &TextStyle,
) -> Option<f64> {
    let bbox = painter.view().get_bbox();
    let length = config.rounding.length(bbox.width())?;

    let x0 = bbox.x_min() + bbox.width() * config.position[0];
    let y0 = bbox.y_min() + bbox.height() * config.position[1];
    painter.line(
        &[Point2d::new(x0, y0), Point2d::new(x0 + length, y0)],
        false,
        &LinePaint::solid(Color::BLACK, page.pt_to_px(config.width_pt)),
    );

    let label_y = y0 - bbox.height() * config.label_offset;
    let style = label_style.aligned(HorizontalAlignment::Center, VerticalAlignment::Top);
    let start = painter.to_screen(&Point2d::new(x0, label_y));
    let end = painter.to_screen(&Point2d::new(x0 + length, label_y));
    painter.canvas().draw_text("0 m", start, &style);
    painter
        .canvas()
        .draw_text(&length_label(length), end, &style);

    debug!("Scale bar of {length} m for visible width {}", bbox.width());
    Some(length)
}

/// Draws a framed legend in the upper left corner of `panel`. Returns the frame rectangle.
pub fn draw_legend(
    canvas: &mut Canvas,
    panel: Rect,
    config: &LegendConfig,
    style: &TextStyle,
) -> Rect {
    let font = style.font_size as f64;
    let pad = font * 0.5;
    let row_height = font * 1.5;
    let key_width = font * 2.0;
    let key_height = font * 0.7;

    let left = panel.x_min() + pad;
    let mut top = panel.y_min() + pad;
    let mut right = left + key_width;
    let label_style = style.aligned(HorizontalAlignment::Left, VerticalAlignment::Middle);

    if let Some(title) = &config.title {
        let title_style = label_style.bold();
        let position = Point2d::new(left, top + row_height / 2.0);
        if let Some(rect) = canvas.draw_text(title, position, &title_style) {
            right = right.max(rect.x_max());
        }
        top += row_height;
    }

    for item in &config.items {
        let middle = top + row_height / 2.0;
        match item.kind {
            LegendKind::Fill => {
                let key = Rect::new(
                    left,
                    middle - key_height / 2.0,
                    left + key_width,
                    middle + key_height / 2.0,
                );
                canvas.fill_rect(key, item.color);
            }
            LegendKind::Line => canvas.draw_line(
                &[Point2d::new(left, middle), Point2d::new(left + key_width, middle)],
                false,
                &LinePaint::solid(item.color, (font * 0.2).max(1.0)),
                None,
            ),
            LegendKind::Point => canvas.draw_circle(
                Point2d::new(left + key_width / 2.0, middle),
                key_height / 2.0,
                item.color,
                None,
            ),
        }

        let label_position = Point2d::new(left + key_width + pad, middle);
        if let Some(rect) = canvas.draw_text(&item.label, label_position, &label_style) {
            right = right.max(rect.x_max());
        }
        top += row_height;
    }

    let frame = Rect::new(
        panel.x_min(),
        panel.y_min(),
        (right + pad).min(panel.x_max()),
        (top + pad).min(panel.y_max()),
    );
    canvas.stroke_rect(frame, &LinePaint::solid(Color::LIGHT_GRAY, 1.0));
    frame
}

/// Draws the locator map: the country outline with the data layer over it, fitted to the country extent.
///
/// Both layers must be in the same CRS.
pub fn draw_inset(
    composition: &mut MapComposition,
    config: &InsetConfig,
    country: &VectorLayer,
    layer: &VectorLayer,
) -> Result<(), PetaError> {
    let extent = country
        .extent()
        .ok_or_else(|| PetaError::Geometry(format!("country '{}' is empty", config.country)))?;
    let mut painter = composition.add_map_panel("inset", config.panel, extent, 0.05)?;

    draw_features(&mut painter, country, &SimplePolygonSymbol::new(config.country_color));
    draw_features(
        &mut painter,
        layer,
        &ArbitraryGeometrySymbol {
            polygon: SimplePolygonSymbol::new(config.layer_color),
            contour: SimpleContourSymbol::new(config.layer_color, 1.5),
            point: CirclePointSymbol::new(config.layer_color, 5.0),
        },
    );

    Ok(())
}

/// Draws the logo scaled to fit into `target`, keeping its aspect ratio, at the top left corner of the box.
pub fn draw_logo(canvas: &mut Canvas, target: Rect, logo: &DecodedImage) {
    if logo.width() == 0 || logo.height() == 0 {
        return;
    }

    let scale = (target.width() / logo.width() as f64).min(target.height() / logo.height() as f64);
    let rect = Rect::new(
        target.x_min(),
        target.y_min(),
        target.x_min() + logo.width() as f64 * scale,
        target.y_min() + logo.height() as f64 * scale,
    );
    canvas.draw_image(logo, rect, None);
}

/// Fills the panel background.
pub fn fill_panel(canvas: &mut Canvas, panel: Rect, color: Color) {
    canvas.draw_polygon(
        &[vec![
            Point2d::new(panel.x_min(), panel.y_min()),
            Point2d::new(panel.x_max(), panel.y_min()),
            Point2d::new(panel.x_max(), panel.y_max()),
            Point2d::new(panel.x_min(), panel.y_max()),
        ]],
        &PolygonPaint { color },
        None,
    );
}

fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = (end - start) / (count.max(2) - 1) as f64;
    (0..count).map(move |i| start + step * i as f64)
}

struct CoordinateLabels {
    to_geographic: Option<ChainProjection<Point2d, GeoPoint2d, Point2d>>,
    geographic: bool,
}

impl CoordinateLabels {
    fn new(crs: &Crs) -> Self {
        if crs.is_geographic() {
            return Self {
                to_geographic: None,
                geographic: true,
            };
        }

        let to_geographic = crs.reprojection_to(&Crs::WGS84).ok();
        Self {
            geographic: to_geographic.is_some(),
            to_geographic,
        }
    }

    fn geographic(&self, point: Point2d) -> Option<Point2d> {
        match &self.to_geographic {
            Some(projection) => projection.project(&point),
            None if self.geographic => Some(point),
            None => None,
        }
    }

    fn x_label(&self, point: Point2d) -> String {
        match self.geographic(point) {
            Some(geo) => format_longitude(geo.x),
            None => format!("{:.0}", point.x),
        }
    }

    fn y_label(&self, point: Point2d) -> String {
        match self.geographic(point) {
            Some(geo) => format_latitude(geo.y),
            None => format!("{:.0}", point.y),
        }
    }
}

/// Longitude label with the Indonesian hemisphere suffix: `BT` (east) or `BB` (west).
pub fn format_longitude(lon: f64) -> String {
    let suffix = if lon < 0.0 { "BB" } else { "BT" };
    format!("{:.2}° {suffix}", lon.abs())
}

/// Latitude label with the Indonesian hemisphere suffix: `LU` (north) or `LS` (south).
pub fn format_latitude(lat: f64) -> String {
    let suffix = if lat < 0.0 { "LS" } else { "LU" };
    format!("{:.2}° {suffix}", lat.abs())
}
