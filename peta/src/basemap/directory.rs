use std::path::{Path, PathBuf};

use log::debug;

use super::{TileIndex, TileSource};
use crate::decoded_image::DecodedImage;
use crate::error::PetaError;

/// Loads tiles stored as image files in a folder.
///
/// File path of a tile is built from a template relative to the root folder, where `{z}`, `{x}` and `{y}` are
/// replaced with the tile index. Default template is `{z}/{x}/{y}.png`.
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    root: PathBuf,
    template: String,
}

impl DirectoryTileSource {
    /// Creates a source with the default `{z}/{x}/{y}.png` template.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().into(),
            template: "{z}/{x}/{y}.png".into(),
        }
    }

    /// Returns the source with a different path template.
    pub fn with_template(self, template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..self
        }
    }

    /// Path of the tile file.
    pub fn tile_path(&self, index: &TileIndex) -> PathBuf {
        let relative = self
            .template
            .replace("{z}", &index.z.to_string())
            .replace("{x}", &index.x.to_string())
            .replace("{y}", &index.y.to_string());
        self.root.join(relative)
    }
}

impl TileSource for DirectoryTileSource {
    fn tile(&self, index: &TileIndex) -> Result<DecodedImage, PetaError> {
        let path = self.tile_path(index);
        let bytes = std::fs::read(&path)
            .map_err(|err| PetaError::Tile(format!("{}: {err}", path.display())))?;
        debug!("Loaded tile {index:?} from {path:?}");

        DecodedImage::new(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::{ImageOutputFormat, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn tile_path() {
        let source = DirectoryTileSource::new("/tiles").with_template("osm/{z}-{x}-{y}.jpg");
        assert_eq!(
            source.tile_path(&TileIndex::new(3, 5, 7)),
            PathBuf::from("/tiles/osm/3-5-7.jpg")
        );
    }

    #[test]
    fn loads_tile_from_folder() {
        let root = std::env::temp_dir().join(format!("peta-tiles-{}", std::process::id()));
        let folder = root.join("2").join("1");
        std::fs::create_dir_all(&folder).unwrap();

        let mut png = Cursor::new(Vec::new());
        RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]))
            .write_to(&mut png, ImageOutputFormat::Png)
            .unwrap();
        std::fs::write(folder.join("3.png"), png.into_inner()).unwrap();

        let source = DirectoryTileSource::new(&root);
        let tile = source.tile(&TileIndex::new(2, 1, 3)).unwrap();
        assert_eq!(tile.width(), 4);

        assert_matches!(
            source.tile(&TileIndex::new(2, 1, 4)),
            Err(PetaError::Tile(_))
        );

        std::fs::remove_dir_all(&root).unwrap();
    }
}
