use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;

use super::{TileIndex, TileSource};
use crate::decoded_image::DecodedImage;
use crate::error::PetaError;

/// Function that returns the url of the tile with the given index.
pub type UrlSource = dyn Fn(&TileIndex) -> String + Send + Sync;

/// Downloads tiles from a tile web service.
pub struct UrlTileSource {
    url_source: Box<UrlSource>,
    client: Client,
}

impl UrlTileSource {
    /// Creates a source that downloads tiles from urls given by `url_source`.
    pub fn new(
        url_source: impl Fn(&TileIndex) -> String + Send + Sync + 'static,
    ) -> Result<Self, PetaError> {
        let client = Client::builder()
            .user_agent(concat!("peta/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| PetaError::Tile(format!("cannot create http client: {err}")))?;

        Ok(Self {
            url_source: Box::new(url_source),
            client,
        })
    }

    /// OpenStreetMap standard tiles.
    pub fn osm() -> Result<Self, PetaError> {
        Self::new(|index| {
            format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                index.z, index.x, index.y
            )
        })
    }

    fn load(&self, url: &str) -> Result<Vec<u8>, PetaError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| PetaError::Tile(format!("{url}: {err}")))?;

        if !response.status().is_success() {
            info!("Failed to load {url}: {}", response.status());
            return Err(PetaError::Tile(format!("{url}: {}", response.status())));
        }

        let bytes = response
            .bytes()
            .map_err(|err| PetaError::Tile(format!("{url}: {err}")))?;
        Ok(bytes.to_vec())
    }
}

impl TileSource for UrlTileSource {
    fn tile(&self, index: &TileIndex) -> Result<DecodedImage, PetaError> {
        let url = (self.url_source)(index);
        let bytes = self.load(&url)?;
        debug!("Loaded tile {index:?} from {url}");

        DecodedImage::new(&bytes)
    }
}
