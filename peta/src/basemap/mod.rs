//! Raster basemap drawn under the main map panel.
//!
//! Tiles are requested from a [`TileSource`] for the zoom level matching the panel resolution and composed into a
//! mosaic. The panel view must be in Web Mercator coordinates when used with [`TileSchema::web`].

use log::{debug, warn};

use crate::decoded_image::DecodedImage;
use crate::error::PetaError;
use crate::render::MapPainter;

mod directory;
mod schema;
#[cfg(feature = "http")]
mod url;

pub use directory::DirectoryTileSource;
pub use schema::{Lod, TileIndex, TileSchema};
#[cfg(feature = "http")]
pub use url::UrlTileSource;

/// Maximum number of tiles requested for one panel.
const MAX_TILES: usize = 512;

/// Provides basemap tile images.
pub trait TileSource {
    /// Loads the tile with the given index.
    fn tile(&self, index: &TileIndex) -> Result<DecodedImage, PetaError>;
}

impl<F> TileSource for F
where
    F: Fn(&TileIndex) -> Result<DecodedImage, PetaError>,
{
    fn tile(&self, index: &TileIndex) -> Result<DecodedImage, PetaError> {
        self(index)
    }
}

/// Basemap of a map panel: a tile source and the schema its tiles follow.
pub struct Basemap {
    schema: TileSchema,
    source: Box<dyn TileSource>,
}

impl Basemap {
    /// Creates a new basemap.
    pub fn new(schema: TileSchema, source: impl TileSource + 'static) -> Self {
        Self {
            schema,
            source: Box::new(source),
        }
    }

    /// Web Mercator basemap with 20 zoom levels.
    pub fn web(source: impl TileSource + 'static) -> Self {
        Self::new(TileSchema::web(20), source)
    }

    /// Tile schema of the basemap.
    pub fn schema(&self) -> &TileSchema {
        &self.schema
    }

    /// Draws the tiles covering the painter's view. Tiles that fail to load are logged and left blank.
    ///
    /// Returns the number of tiles drawn.
    pub fn draw(&self, painter: &mut MapPainter) -> usize {
        let view = *painter.view();
        let Some(tiles) = self.schema.iter_tiles(view.get_bbox(), view.resolution()) else {
            warn!(
                "Basemap has no zoom level for resolution {}, basemap is skipped",
                view.resolution()
            );
            return 0;
        };

        let tiles: Vec<TileIndex> = tiles.take(MAX_TILES + 1).collect();
        if tiles.len() > MAX_TILES {
            warn!("Basemap view requires more than {MAX_TILES} tiles, basemap is skipped");
            return 0;
        }

        let mut drawn = 0;
        for index in &tiles {
            let Some(bbox) = self.schema.tile_bbox(index) else {
                continue;
            };

            match self.source.tile(index) {
                Ok(image) => {
                    painter.image(&image, bbox);
                    drawn += 1;
                }
                Err(err) => warn!("Failed to load basemap tile {index:?}: {err}"),
            }
        }

        debug!("Drawn {drawn} of {} basemap tiles", tiles.len());
        drawn
    }
}
