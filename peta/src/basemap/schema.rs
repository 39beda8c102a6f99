use peta_types::cartesian::{Point2d, Rect};
use serde::{Deserialize, Serialize};

const RESOLUTION_TOLERANCE: f64 = 0.01;
const INDEX_TOLERANCE: f64 = 0.001;

/// Level of detail of a tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lod {
    resolution: f64,
    z_index: u32,
}

impl Lod {
    /// Creates new level of detail.
    pub fn new(resolution: f64, z_index: u32) -> Option<Lod> {
        if resolution.is_finite() && resolution > 0.0 {
            Some(Self {
                resolution,
                z_index,
            })
        } else {
            None
        }
    }

    /// Z-index associated with this LOD.
    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    /// Resolution of the LOD.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }
}

/// Index of a tile: zoom level, column and row counted from the top left corner of the schema.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    /// Zoom level.
    pub z: u32,
    /// Column.
    pub x: i64,
    /// Row, top to bottom.
    pub y: i64,
}

impl TileIndex {
    /// Creates a new index.
    pub fn new(z: u32, x: i64, y: i64) -> Self {
        Self { z, x, y }
    }
}

/// Describes how a tile pyramid covers the map plane.
///
/// Tiles are square, rows are counted downwards from `origin` (top left corner of the tiled area).
#[derive(Debug, Clone)]
pub struct TileSchema {
    origin: Point2d,
    bounds: Rect,
    lods: Vec<Lod>,
    tile_size: u32,
    max_tile_scale: f64,
}

impl TileSchema {
    /// Creates a schema. `max_tile_scale` limits how much a tile may be stretched or shrunk to match the view.
    pub fn new(
        origin: Point2d,
        bounds: Rect,
        mut lods: Vec<Lod>,
        tile_size: u32,
        max_tile_scale: f64,
    ) -> Self {
        lods.sort_by(|a, b| a.resolution.total_cmp(&b.resolution));
        Self {
            origin,
            bounds,
            lods,
            tile_size,
            max_tile_scale,
        }
    }

    /// Standard Web Mercator (EPSG:3857) schema used by most web tile services, with `lods_count` zoom levels
    /// starting from 0.
    pub fn web(lods_count: u32) -> Self {
        const HALF_EXTENT: f64 = 20037508.342787;
        const TOP_RESOLUTION: f64 = 156543.03392800014;

        let lods = (0..lods_count)
            .filter_map(|z| Lod::new(TOP_RESOLUTION / 2f64.powi(z as i32), z))
            .collect();

        Self::new(
            Point2d::new(-HALF_EXTENT, HALF_EXTENT),
            Rect::new(-HALF_EXTENT, -HALF_EXTENT, HALF_EXTENT, HALF_EXTENT),
            lods,
            256,
            1024.0,
        )
    }

    /// Width and height of a tile in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Resolution of the zoom level `z`.
    pub fn lod_resolution(&self, z: u32) -> Option<f64> {
        self.lods
            .iter()
            .find(|lod| lod.z_index == z)
            .map(|lod| lod.resolution)
    }

    /// Selects the coarsest level whose tiles are at least as detailed as the given resolution (with 1% tolerance).
    pub fn select_lod(&self, resolution: f64) -> Option<Lod> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return None;
        }

        let mut iter = self.lods.iter();
        let mut selected = iter.next()?;
        for lod in iter {
            if lod.resolution * (1.0 - RESOLUTION_TOLERANCE) > resolution {
                break;
            }

            selected = lod;
        }

        if selected.resolution / resolution > self.max_tile_scale
            || resolution / selected.resolution > self.max_tile_scale
        {
            None
        } else {
            Some(*selected)
        }
    }

    /// Indices of all tiles of the level matching `resolution` that intersect `bbox`. `None` if no level matches.
    pub fn iter_tiles(
        &self,
        bbox: Rect,
        resolution: f64,
    ) -> Option<impl Iterator<Item = TileIndex>> {
        let lod = self.select_lod(resolution)?;
        let tile_span = lod.resolution * self.tile_size as f64;

        let column = |x: f64| (x - self.origin.x) / tile_span;
        let row = |y: f64| (self.origin.y - y) / tile_span;

        let x_min = first_index(column(bbox.x_min()))
            .max(first_index(column(self.bounds.x_min())));
        let x_max =
            last_index(column(bbox.x_max())).min(last_index(column(self.bounds.x_max())));
        let y_min = first_index(row(bbox.y_max())).max(first_index(row(self.bounds.y_max())));
        let y_max = last_index(row(bbox.y_min())).min(last_index(row(self.bounds.y_min())));

        let z = lod.z_index;
        Some(
            (y_min..=y_max)
                .flat_map(move |y| (x_min..=x_max).map(move |x| TileIndex { z, x, y })),
        )
    }

    /// Area covered by the tile.
    pub fn tile_bbox(&self, index: &TileIndex) -> Option<Rect> {
        let resolution = self.lod_resolution(index.z)?;
        let tile_span = self.tile_size as f64 * resolution;
        let x_min = self.origin.x + index.x as f64 * tile_span;
        let y_max = self.origin.y - index.y as f64 * tile_span;

        Some(Rect::new(x_min, y_max - tile_span, x_min + tile_span, y_max))
    }
}

fn first_index(position: f64) -> i64 {
    (position + INDEX_TOLERANCE).floor() as i64
}

fn last_index(position: f64) -> i64 {
    (position - INDEX_TOLERANCE).ceil() as i64 - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn simple_schema() -> TileSchema {
        TileSchema::new(
            Point2d::new(0.0, 2048.0),
            Rect::new(0.0, 0.0, 2048.0, 2048.0),
            vec![
                Lod::new(2.0, 2).unwrap(),
                Lod::new(8.0, 0).unwrap(),
                Lod::new(4.0, 1).unwrap(),
            ],
            256,
            2.0,
        )
    }

    fn tiles(schema: &TileSchema, bbox: Rect, resolution: f64) -> Vec<TileIndex> {
        schema.iter_tiles(bbox, resolution).unwrap().collect()
    }

    #[test]
    fn invalid_lod_creation() {
        assert!(Lod::new(1.0, 1).is_some());
        assert!(Lod::new(0.0, 1).is_none());
        assert!(Lod::new(-1.0, 1).is_none());
        assert!(Lod::new(f64::NAN, 1).is_none());
        assert!(Lod::new(f64::INFINITY, 1).is_none());
    }

    #[test]
    fn select_lod() {
        let schema = simple_schema();
        assert_eq!(schema.select_lod(8.0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(9.0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(16.0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(7.99).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(7.5).unwrap().z_index(), 1);
        assert_eq!(schema.select_lod(4.0).unwrap().z_index(), 1);
        assert_eq!(schema.select_lod(1.5).unwrap().z_index(), 2);
        assert_eq!(schema.select_lod(1.0).unwrap().z_index(), 2);
        assert_eq!(schema.select_lod(0.5), None);
        assert_eq!(schema.select_lod(0.0), None);
        assert_eq!(schema.select_lod(100500.0), None);
        assert_eq!(schema.select_lod(f64::NAN), None);
    }

    #[test]
    fn iter_tiles_full_bbox() {
        let schema = simple_schema();
        let bbox = Rect::new(0.0, 0.0, 2048.0, 2048.0);

        assert_eq!(tiles(&schema, bbox, 8.0), vec![TileIndex::new(0, 0, 0)]);
        assert_eq!(tiles(&schema, bbox, 4.0).len(), 4);

        let level_2 = tiles(&schema, bbox, 2.0);
        assert_eq!(level_2.len(), 16);
        assert!(level_2
            .iter()
            .all(|t| t.z == 2 && (0..4).contains(&t.x) && (0..4).contains(&t.y)));
    }

    #[test]
    fn iter_tiles_part_bbox() {
        let schema = simple_schema();
        let bbox = Rect::new(200.0, 700.0, 1200.0, 1100.0);

        assert_eq!(tiles(&schema, bbox, 8.0).len(), 1);

        let level_2 = tiles(&schema, bbox, 2.0);
        assert_eq!(level_2.len(), 6);
        assert!(level_2
            .iter()
            .all(|t| (0..=2).contains(&t.x) && (1..=2).contains(&t.y)));
    }

    #[test]
    fn iter_tiles_outside_of_bounds() {
        let schema = simple_schema();
        let bbox = Rect::new(-100.0, -100.0, -50.0, -50.0);
        assert_eq!(tiles(&schema, bbox, 8.0).len(), 0);
        assert_eq!(tiles(&schema, bbox, 2.0).len(), 0);

        let bbox = Rect::new(-2048.0, -2048.0, 4096.0, 4096.0);
        assert_eq!(tiles(&schema, bbox, 8.0).len(), 1);
        assert_eq!(tiles(&schema, bbox, 2.0).len(), 16);
    }

    #[test]
    fn web_schema() {
        let schema = TileSchema::web(18);
        assert_abs_diff_eq!(schema.lod_resolution(1).unwrap(), 78271.51696400007);
        assert_eq!(schema.lod_resolution(18), None);

        let whole_world = Rect::new(-2e7, -2e7, 2e7, 2e7);
        assert_eq!(tiles(&schema, whole_world, 78271.5).len(), 4);

        let bbox = schema.tile_bbox(&TileIndex::new(1, 1, 0)).unwrap();
        assert_abs_diff_eq!(bbox.x_min(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.y_min(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.x_max(), 20037508.342787, epsilon = 1e-3);
        assert_abs_diff_eq!(bbox.y_max(), 20037508.342787, epsilon = 1e-3);
    }
}
