//! Point-in-polygon attribute join.

use log::{debug, info};
use peta_types::geo::Crs;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use crate::attributes::AttributeValue;
use crate::error::PetaError;
use crate::io::PointRecord;
use crate::layer::VectorLayer;

/// A point record with the attribute value of the polygon containing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinResult {
    /// Input point.
    pub record: PointRecord,
    /// Value of the joined attribute. `None` if no polygon contains the point or if the containing polygon has no
    /// value for the attribute; it is never [`AttributeValue::Null`].
    pub value: Option<AttributeValue>,
}

struct FeatureBox {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for FeatureBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Assigns to every point the value of `attribute` of the polygon that contains it.
///
/// The output has one row per input point in input order. Points on a polygon edge or vertex are inside that
/// polygon. When several polygons contain a point, the one that comes first in the layer wins. Only polygons and
/// multipolygons take part; other geometries are ignored. A containing polygon that lacks the attribute, or has a null
/// value for it, gives `None` just like a point outside every polygon.
///
/// The layer must be in geographic WGS84 (a layer without CRS counts as WGS84), since the points are longitude and
/// latitude. Any other CRS, or an attribute name that no feature has, is a [`PetaError::Join`].
pub fn spatial_join(
    points: &[PointRecord],
    layer: &VectorLayer,
    attribute: &str,
) -> Result<Vec<JoinResult>, PetaError> {
    let crs = layer.effective_crs();
    if crs != Crs::WGS84 {
        return Err(PetaError::Join(format!(
            "polygon layer is in {crs}, points are in EPSG:4326"
        )));
    }

    if !layer.has_attribute(attribute) {
        return Err(PetaError::Join(format!(
            "attribute '{attribute}' is not present in the polygon layer"
        )));
    }

    let features = layer.features();
    let boxes: Vec<FeatureBox> = features
        .iter()
        .enumerate()
        .filter(|(_, feature)| feature.geometry.is_polygonal())
        .filter_map(|(index, feature)| {
            let rect = feature.geometry.bounding_rect()?;
            Some(FeatureBox {
                index,
                envelope: AABB::from_corners(
                    [rect.x_min(), rect.y_min()],
                    [rect.x_max(), rect.y_max()],
                ),
            })
        })
        .collect();
    debug!("Indexed {} polygons for join", boxes.len());
    let tree = RTree::bulk_load(boxes);

    let mut matched = 0;
    let results: Vec<JoinResult> = points
        .iter()
        .map(|record| {
            let position = record.position();
            let mut candidates: Vec<usize> = tree
                .locate_in_envelope_intersecting(&AABB::from_point([record.lon, record.lat]))
                .map(|b| b.index)
                .collect();
            candidates.sort_unstable();

            let value = candidates
                .into_iter()
                .find(|&index| features[index].geometry.contains_point(&position))
                .inspect(|_| matched += 1)
                .and_then(|index| features[index].attribute(attribute))
                .filter(|value| !value.is_null())
                .cloned();

            JoinResult {
                record: record.clone(),
                value,
            }
        })
        .collect();

    info!(
        "Joined '{attribute}': {matched} of {} points inside a polygon",
        results.len()
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::layer::Feature;
    use assert_matches::assert_matches;
    use peta_types::cartesian::Point2d;
    use peta_types::geometry::Geom;
    use peta_types::{ClosedContour, Polygon};

    fn square(x: f64, y: f64, size: f64) -> Geom<Point2d> {
        Polygon::new(
            ClosedContour::new(vec![
                Point2d::new(x, y),
                Point2d::new(x + size, y),
                Point2d::new(x + size, y + size),
                Point2d::new(x, y + size),
            ]),
            vec![],
        )
        .into()
    }

    fn zone(geometry: Geom<Point2d>, name: &str) -> Feature {
        let mut attributes = Attributes::new();
        attributes.insert("zona".into(), name.into());
        Feature::new(geometry, attributes)
    }

    fn values(results: &[JoinResult]) -> Vec<Option<String>> {
        results
            .iter()
            .map(|r| r.value.as_ref().map(|v| v.to_string()))
            .collect()
    }

    #[test]
    fn two_squares() {
        let layer = VectorLayer::new(
            vec![zone(square(0.0, 0.0, 1.0), "A"), zone(square(2.0, 0.0, 1.0), "B")],
            None,
        );
        let points = vec![
            PointRecord::new("1", 0.5, 0.5),
            PointRecord::new("2", 2.5, 0.5),
            PointRecord::new("3", 5.0, 5.0),
        ];

        let results = spatial_join(&points, &layer, "zona").unwrap();
        assert_eq!(
            values(&results),
            vec![Some("A".into()), Some("B".into()), None]
        );
        assert_eq!(results[2].record, points[2]);
    }

    #[test]
    fn shared_boundary_takes_first_feature() {
        let layer = VectorLayer::new(
            vec![zone(square(1.0, 0.0, 1.0), "B"), zone(square(0.0, 0.0, 1.0), "A")],
            Some(Crs::WGS84),
        );
        let points = vec![
            PointRecord::new("edge", 1.0, 0.5),
            PointRecord::new("corner", 1.0, 1.0),
        ];

        let results = spatial_join(&points, &layer, "zona").unwrap();
        assert_eq!(values(&results), vec![Some("B".into()), Some("B".into())]);
    }

    #[test]
    fn overlapping_polygons_take_first_feature() {
        let layer = VectorLayer::new(
            vec![zone(square(0.0, 0.0, 10.0), "outer"), zone(square(2.0, 2.0, 1.0), "inner")],
            None,
        );
        let results = spatial_join(&[PointRecord::new("p", 2.5, 2.5)], &layer, "zona").unwrap();
        assert_eq!(values(&results), vec![Some("outer".into())]);
    }

    #[test]
    fn non_polygons_and_missing_values() {
        let mut no_value = zone(square(0.0, 0.0, 1.0), "x");
        no_value.attributes.clear();
        let layer = VectorLayer::new(
            vec![
                zone(Geom::Point(Point2d::new(5.0, 5.0)), "point"),
                no_value,
                zone(square(0.0, 0.0, 1.0), "A"),
            ],
            None,
        );

        let points = vec![
            PointRecord::new("1", 5.0, 5.0),
            PointRecord::new("2", 0.5, 0.5),
        ];
        let results = spatial_join(&points, &layer, "zona").unwrap();
        assert_eq!(results[0].value, None);
        assert_eq!(results[1].value, None);
    }

    #[test]
    fn null_value_is_none() {
        let mut null_value = zone(square(0.0, 0.0, 1.0), "x");
        null_value
            .attributes
            .insert("zona".into(), AttributeValue::Null);
        let layer = VectorLayer::new(vec![null_value, zone(square(0.0, 0.0, 1.0), "A")], None);

        let results = spatial_join(&[PointRecord::new("p", 0.5, 0.5)], &layer, "zona").unwrap();
        assert_eq!(results[0].value, None);
    }

    #[test]
    fn empty_points() {
        let layer = VectorLayer::new(vec![zone(square(0.0, 0.0, 1.0), "A")], None);
        assert!(spatial_join(&[], &layer, "zona").unwrap().is_empty());
    }

    #[test]
    fn errors() {
        let layer = VectorLayer::new(vec![zone(square(0.0, 0.0, 1.0), "A")], None);
        assert_matches!(
            spatial_join(&[], &layer, "kode"),
            Err(PetaError::Join(message)) if message.contains("kode")
        );

        let projected = VectorLayer::new(layer.features().to_vec(), Some(Crs::EPSG3857));
        assert_matches!(spatial_join(&[], &projected, "zona"), Err(PetaError::Join(_)));
    }
}
