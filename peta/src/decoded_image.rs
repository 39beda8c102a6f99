//! Raster images loaded into memory: basemap tiles and logos.

use tiny_skia::{IntSize, Pixmap};

use crate::error::PetaError;

/// An image that has been loaded into memory.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub(crate) pixmap: Pixmap,
}

impl DecodedImage {
    /// Decode an image from a byte slice.
    ///
    /// Attempts to guess the format of the image from the data. Non-RGBA images are converted to RGBA.
    pub fn new(bytes: &[u8]) -> Result<Self, PetaError> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba(decoded.into_raw(), width, height)
    }

    /// Creates an image from raw (not premultiplied) RGBA bytes.
    pub fn from_rgba(mut bytes: Vec<u8>, width: u32, height: u32) -> Result<Self, PetaError> {
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| PetaError::Render(format!("invalid image size {width}x{height}")))?;

        for pixel in bytes.chunks_exact_mut(4) {
            let alpha = pixel[3] as u16;
            for channel in &mut pixel[..3] {
                *channel = ((*channel as u16 * alpha + 127) / 255) as u8;
            }
        }

        let pixmap = Pixmap::from_vec(bytes, size).ok_or_else(|| {
            PetaError::Render(format!("image data does not match size {width}x{height}"))
        })?;

        Ok(Self { pixmap })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decode_png() {
        let mut bytes = Vec::new();
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 128]));
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .unwrap();

        let decoded = DecodedImage::new(&bytes).unwrap();
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);

        let pixel = decoded.pixmap.pixel(0, 0).unwrap();
        assert_eq!(pixel.alpha(), 128);
        assert_eq!(pixel.red(), 128);
    }

    #[test]
    fn invalid_data() {
        assert_matches!(DecodedImage::new(b"not an image"), Err(PetaError::Image(_)));
        assert_matches!(
            DecodedImage::from_rgba(vec![0; 7], 1, 2),
            Err(PetaError::Render(_))
        );
    }
}
