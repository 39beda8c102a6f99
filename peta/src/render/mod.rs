//! Raster rendering of map compositions.
//!
//! A [`Canvas`] is an in-memory RGBA surface drawn with `tiny-skia`. All coordinates given to the canvas are pixels
//! with the origin in the top left corner and `y` pointing down. Map coordinates are converted into pixels by the
//! [`MapPainter`], which also clips everything drawn to its panel.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use log::{debug, warn};
use peta_types::cartesian::{Point2d, Rect, Size};
use serde::{Deserialize, Serialize};
use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

use crate::decoded_image::DecodedImage;
use crate::error::PetaError;
use crate::Color;

mod painter;
pub mod text;

pub use painter::MapPainter;
use text::{block_offset, TextRasterizer, TextStyle};

/// Encoding of the exported image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// Lossless PNG with alpha channel.
    Png,
    /// JPEG. Transparent areas are composited on white.
    Jpeg {
        /// Encoder quality, 1..=100.
        quality: u8,
    },
}

impl Default for ImageFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 95 }
    }
}

impl ImageFormat {
    /// MIME type of the encoded data.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Paint for lines and outlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePaint {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub width: f64,
    /// Dash pattern (lengths of dashes and gaps in pixels). Solid line if empty.
    #[serde(default)]
    pub dash: Vec<f32>,
}

impl LinePaint {
    /// Solid line.
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: vec![],
        }
    }

    /// Dashed line with equal dashes and gaps of `dash_length` pixels.
    pub fn dashed(color: Color, width: f64, dash_length: f32) -> Self {
        Self {
            color,
            width,
            dash: vec![dash_length, dash_length],
        }
    }
}

/// Paint for filled areas.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonPaint {
    /// Fill color.
    pub color: Color,
}

/// Area outside of which nothing is drawn.
pub struct ClipMask(Mask);

/// In-memory raster surface.
pub struct Canvas {
    pixmap: Pixmap,
    text_rasterizer: Option<Box<dyn TextRasterizer>>,
    text_warning_shown: bool,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("has_text_rasterizer", &self.text_rasterizer.is_some())
            .field("text_warning_shown", &self.text_warning_shown)
            .finish()
    }
}

impl Canvas {
    /// Creates a transparent canvas of the given size in pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, PetaError> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            PetaError::Render(format!("cannot create canvas of size {width}x{height}"))
        })?;

        Ok(Self {
            pixmap,
            text_rasterizer: None,
            text_warning_shown: false,
        })
    }

    /// Sets the rasterizer used for [`Canvas::draw_text`]. Without one, text is not drawn.
    pub fn with_text_rasterizer(mut self, rasterizer: Box<dyn TextRasterizer>) -> Self {
        self.text_rasterizer = Some(rasterizer);
        self
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width() as f64, self.height() as f64)
    }

    /// Fills the whole canvas with the color.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(color.to_skia());
    }

    /// Color of the pixel, not premultiplied. `None` outside of the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let pixel = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(
            pixel.red(),
            pixel.green(),
            pixel.blue(),
            pixel.alpha(),
        ))
    }

    /// Creates a mask that limits drawing to the rectangle.
    pub fn clip_mask(&self, rect: Rect) -> Option<ClipMask> {
        let mut mask = Mask::new(self.width(), self.height())?;
        let path = tiny_skia::PathBuilder::from_rect(to_skia_rect(rect)?);
        mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        Some(ClipMask(mask))
    }

    /// Fills the rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(rect) = to_skia_rect(rect) {
            self.pixmap
                .fill_rect(rect, &solid_paint(color), Transform::identity(), None);
        }
    }

    /// Draws the outline of the rectangle.
    pub fn stroke_rect(&mut self, rect: Rect, paint: &LinePaint) {
        let points = [
            Point2d::new(rect.x_min(), rect.y_min()),
            Point2d::new(rect.x_max(), rect.y_min()),
            Point2d::new(rect.x_max(), rect.y_max()),
            Point2d::new(rect.x_min(), rect.y_max()),
        ];
        self.draw_line(&points, true, paint, None);
    }

    /// Fills an area bounded by one or more rings. Overlapping rings (holes) are cut out with the even-odd rule.
    pub fn draw_polygon(
        &mut self,
        rings: &[Vec<Point2d>],
        paint: &PolygonPaint,
        clip: Option<&ClipMask>,
    ) {
        if paint.color.is_transparent() {
            return;
        }

        let mut builder = PathBuilder::new();
        for ring in rings {
            add_points(&mut builder, ring, true);
        }

        if let Some(path) = builder.finish() {
            self.pixmap.fill_path(
                &path,
                &solid_paint(paint.color),
                FillRule::EvenOdd,
                Transform::identity(),
                clip.map(|c| &c.0),
            );
        }
    }

    /// Draws a polyline. A closed line also connects the last point with the first one.
    pub fn draw_line(
        &mut self,
        points: &[Point2d],
        closed: bool,
        paint: &LinePaint,
        clip: Option<&ClipMask>,
    ) {
        if paint.color.is_transparent() || paint.width <= 0.0 {
            return;
        }

        let mut builder = PathBuilder::new();
        add_points(&mut builder, points, closed);
        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width: paint.width as f32,
            dash: if paint.dash.is_empty() {
                None
            } else {
                StrokeDash::new(paint.dash.clone(), 0.0)
            },
            ..Default::default()
        };

        self.pixmap.stroke_path(
            &path,
            &solid_paint(paint.color),
            &stroke,
            Transform::identity(),
            clip.map(|c| &c.0),
        );
    }

    /// Draws a filled circle.
    pub fn draw_circle(
        &mut self,
        center: Point2d,
        radius: f64,
        color: Color,
        clip: Option<&ClipMask>,
    ) {
        let Some(path) =
            PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
        else {
            return;
        };

        self.pixmap.fill_path(
            &path,
            &solid_paint(color),
            FillRule::Winding,
            Transform::identity(),
            clip.map(|c| &c.0),
        );
    }

    /// Draws the image scaled into the target rectangle.
    pub fn draw_image(&mut self, image: &DecodedImage, target: Rect, clip: Option<&ClipMask>) {
        if image.width() == 0
            || image.height() == 0
            || target.width() <= 0.0
            || target.height() <= 0.0
        {
            return;
        }

        let transform = Transform::from_row(
            (target.width() / image.width() as f64) as f32,
            0.0,
            0.0,
            (target.height() / image.height() as f64) as f32,
            target.x_min() as f32,
            target.y_min() as f32,
        );

        self.pixmap.draw_pixmap(
            0,
            0,
            image.pixmap.as_ref(),
            &PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..Default::default()
            },
            transform,
            clip.map(|c| &c.0),
        );
    }

    /// Draws text anchored at `position` according to the style alignment. Returns the pixel rectangle the text
    /// occupies, or `None` if the text was not drawn because no font is available.
    pub fn draw_text(&mut self, text: &str, position: Point2d, style: &TextStyle) -> Option<Rect> {
        if text.trim().is_empty() {
            return None;
        }

        let shaped = match self.text_rasterizer.as_ref().map(|r| r.shape(text, style)) {
            Some(Ok(shaped)) => shaped,
            Some(Err(err)) => {
                self.warn_text_skipped(&err.to_string());
                return None;
            }
            None => {
                self.warn_text_skipped("text rendering is not configured");
                return None;
            }
        };

        let (dx, dy) = block_offset(
            shaped.width,
            shaped.height,
            style.horizontal_alignment,
            style.vertical_alignment,
        );
        let x = position.x as f32 + dx;
        let y = position.y as f32 + dy;

        if let Some(path) = &shaped.path {
            self.pixmap.fill_path(
                path,
                &solid_paint(style.font_color),
                FillRule::Winding,
                Transform::from_translate(x, y),
                None,
            );
        }

        Some(Rect::new(
            x as f64,
            y as f64,
            (x + shaped.width) as f64,
            (y + shaped.height) as f64,
        ))
    }

    fn warn_text_skipped(&mut self, reason: &str) {
        if !self.text_warning_shown {
            warn!("Text labels are skipped: {reason}");
            self.text_warning_shown = true;
        }
    }

    /// Encodes the canvas content.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, PetaError> {
        let mut buffer = Vec::new();
        let (width, height) = (self.width(), self.height());

        match format {
            ImageFormat::Png => {
                let data: Vec<u8> = self
                    .pixmap
                    .pixels()
                    .iter()
                    .flat_map(|p| {
                        let c = p.demultiply();
                        [c.red(), c.green(), c.blue(), c.alpha()]
                    })
                    .collect();
                PngEncoder::new(&mut buffer).write_image(&data, width, height, ColorType::Rgba8)?;
            }
            ImageFormat::Jpeg { quality } => {
                // premultiplied channels composited over white: c + (255 - a)
                let data: Vec<u8> = self
                    .pixmap
                    .pixels()
                    .iter()
                    .flat_map(|p| {
                        let background = 255 - p.alpha();
                        [
                            p.red().saturating_add(background),
                            p.green().saturating_add(background),
                            p.blue().saturating_add(background),
                        ]
                    })
                    .collect();
                JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).encode(
                    &data,
                    width,
                    height,
                    ColorType::Rgb8,
                )?;
            }
        }

        debug!("Encoded {width}x{height} image into {} bytes", buffer.len());
        Ok(buffer)
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(
        rect.x_min() as f32,
        rect.y_min() as f32,
        rect.x_max() as f32,
        rect.y_max() as f32,
    )
}

fn add_points(builder: &mut PathBuilder, points: &[Point2d], closed: bool) {
    let mut iter = points.iter().filter(|p| p.x.is_finite() && p.y.is_finite());
    let Some(first) = iter.next() else {
        return;
    };

    builder.move_to(first.x as f32, first.y as f32);
    for point in iter {
        builder.line_to(point.x as f32, point.y as f32);
    }

    if closed {
        builder.close();
    }
}
