use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::UnicodeBuffer;
use tiny_skia::PathBuilder;

use super::font_provider::FontProvider;
use super::{ShapedText, TextError, TextRasterizer, TextStyle};
use crate::render::text::HorizontalAlignment;

/// Text rasterizer that uses `rustybuzz` to shape text and turns glyph outlines into `tiny-skia` paths.
pub struct RustybuzzRasterizer {
    fonts: FontProvider,
}

impl RustybuzzRasterizer {
    /// Creates a rasterizer that takes faces from the given provider.
    pub fn new(fonts: FontProvider) -> Self {
        Self { fonts }
    }

    /// Creates a rasterizer with system fonts.
    pub fn system() -> Self {
        Self::new(FontProvider::system())
    }
}

impl TextRasterizer for RustybuzzRasterizer {
    fn shape(&self, text: &str, style: &TextStyle) -> Result<ShapedText, TextError> {
        let (font_data, index) = self
            .fonts
            .best_match(&style.font_family, style.weight)
            .ok_or(TextError::FontNotFound)?;
        let face = rustybuzz::Face::from_slice(font_data.as_slice(), index)
            .ok_or(TextError::InvalidFont)?;

        let scale = style.font_size / face.units_per_em() as f32;
        let ascender = face.ascender() as f32 * scale;
        let line_height = style.font_size * style.line_height;

        let lines: Vec<&str> = text.lines().collect();
        let widths: Vec<f32> = lines
            .iter()
            .map(|line| line_advance(&face, line) * scale)
            .collect();
        let width = widths.iter().copied().fold(0.0, f32::max);
        let height = if lines.is_empty() {
            0.0
        } else {
            line_height * (lines.len() - 1) as f32 + style.font_size
        };

        let mut path_builder = GlyphPathBuilder::new(scale);
        for (line_index, line) in lines.iter().enumerate() {
            let line_offset = match style.horizontal_alignment {
                HorizontalAlignment::Left => 0.0,
                HorizontalAlignment::Center => (width - widths[line_index]) / 2.0,
                HorizontalAlignment::Right => width - widths[line_index],
            };

            let mut buffer = UnicodeBuffer::new();
            buffer.push_str(line);
            buffer.guess_segment_properties();
            let glyph_buffer = rustybuzz::shape(&face, &[], buffer);

            let baseline = line_index as f32 * line_height + ascender;
            let mut advance_x = line_offset;
            for (position, info) in glyph_buffer
                .glyph_positions()
                .iter()
                .zip(glyph_buffer.glyph_infos())
            {
                path_builder.offset = (
                    advance_x + position.x_offset as f32 * scale,
                    baseline - position.y_offset as f32 * scale,
                );
                face.outline_glyph(GlyphId(info.glyph_id as u16), &mut path_builder);
                advance_x += position.x_advance as f32 * scale;
            }
        }

        Ok(ShapedText {
            path: path_builder.builder.finish(),
            width,
            height,
        })
    }
}

fn line_advance(face: &rustybuzz::Face<'_>, line: &str) -> f32 {
    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(line);
    buffer.guess_segment_properties();
    rustybuzz::shape(face, &[], buffer)
        .glyph_positions()
        .iter()
        .map(|p| p.x_advance)
        .sum::<i32>() as f32
}

/// Collects glyph outlines into one path. Font units have `y` pointing up, so the outline is flipped.
struct GlyphPathBuilder {
    builder: PathBuilder,
    scale: f32,
    offset: (f32, f32),
}

impl GlyphPathBuilder {
    fn new(scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            scale,
            offset: (0.0, 0.0),
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.offset.0 + x * self.scale, self.offset.1 - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_font() {
        let rasterizer = RustybuzzRasterizer::new(FontProvider::empty());
        assert_matches!(
            rasterizer.shape("Judul", &TextStyle::new(12.0)),
            Err(TextError::FontNotFound)
        );
    }

    #[test]
    fn glyph_path_is_flipped() {
        let mut builder = GlyphPathBuilder::new(0.5);
        builder.offset = (10.0, 20.0);
        builder.move_to(0.0, 0.0);
        builder.line_to(10.0, 10.0);
        builder.line_to(10.0, 0.0);
        builder.close();

        let path = builder.builder.finish().unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 10.0);
        assert_eq!(bounds.right(), 15.0);
        assert_eq!(bounds.top(), 15.0);
        assert_eq!(bounds.bottom(), 20.0);
    }
}
