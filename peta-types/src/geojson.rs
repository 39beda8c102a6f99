//! Conversion between GeoJSON geometries and [`Geom`].
//!
//! Positions are taken as they are (`x = position[0]`, `y = position[1]`); the caller knows which CRS the document
//! is in.

use geojson::{LineStringType, PolygonType, Position, Value};

use crate::cartesian::Point2d;
use crate::contour::{ClosedContour, Contour};
use crate::error::PetaTypesError;
use crate::geometry::Geom;
use crate::multi::{MultiContour, MultiPoint, MultiPolygon};
use crate::polygon::Polygon;

impl TryFrom<&geojson::Geometry> for Geom<Point2d> {
    type Error = PetaTypesError;

    fn try_from(geometry: &geojson::Geometry) -> Result<Self, Self::Error> {
        match &geometry.value {
            Value::Point(p) => Ok(Geom::Point(convert_position(p)?)),
            Value::MultiPoint(points) => Ok(Geom::MultiPoint(MultiPoint::from(
                convert_positions(points)?,
            ))),
            Value::LineString(line) => Ok(Geom::Contour(convert_contour(line)?)),
            Value::MultiLineString(lines) => Ok(Geom::MultiContour(MultiContour::from(
                lines
                    .iter()
                    .map(convert_contour)
                    .collect::<Result<Vec<_>, _>>()?,
            ))),
            Value::Polygon(polygon) => Ok(Geom::Polygon(convert_polygon(polygon)?)),
            Value::MultiPolygon(polygons) => Ok(Geom::MultiPolygon(MultiPolygon::from(
                polygons
                    .iter()
                    .map(convert_polygon)
                    .collect::<Result<Vec<_>, _>>()?,
            ))),
            Value::GeometryCollection(_) => Err(PetaTypesError::Conversion(
                "geometry collections must be flattened first".into(),
            )),
        }
    }
}

impl From<&Geom<Point2d>> for geojson::Geometry {
    fn from(geom: &Geom<Point2d>) -> Self {
        let value = match geom {
            Geom::Point(p) => Value::Point(to_position(p)),
            Geom::MultiPoint(points) => {
                Value::MultiPoint(points.parts.iter().map(to_position).collect())
            }
            Geom::Contour(contour) => Value::LineString(to_positions(contour.iter_points_closing())),
            Geom::MultiContour(contours) => Value::MultiLineString(
                contours
                    .parts
                    .iter()
                    .map(|c| to_positions(c.iter_points_closing()))
                    .collect(),
            ),
            Geom::Polygon(polygon) => Value::Polygon(to_rings(polygon)),
            Geom::MultiPolygon(polygons) => {
                Value::MultiPolygon(polygons.parts.iter().map(to_rings).collect())
            }
        };

        geojson::Geometry::new(value)
    }
}

/// Converts a GeoJSON geometry into a list of geometries, expanding (nested) geometry collections.
pub fn flatten_geometry(
    geometry: &geojson::Geometry,
) -> Result<Vec<Geom<Point2d>>, PetaTypesError> {
    match &geometry.value {
        Value::GeometryCollection(members) => {
            let mut result = vec![];
            for member in members {
                result.extend(flatten_geometry(member)?);
            }
            Ok(result)
        }
        _ => Ok(vec![Geom::try_from(geometry)?]),
    }
}

fn to_position(point: &Point2d) -> Position {
    vec![point.x, point.y]
}

fn to_positions<'a>(points: impl Iterator<Item = &'a Point2d>) -> LineStringType {
    points.map(to_position).collect()
}

fn to_rings(polygon: &Polygon<Point2d>) -> PolygonType {
    polygon
        .iter_contours()
        .map(|ring| to_positions(ring.iter_points_closing()))
        .collect()
}

fn convert_position(position: &Position) -> Result<Point2d, PetaTypesError> {
    match position.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Point2d::new(*x, *y)),
        _ => Err(PetaTypesError::Conversion(format!(
            "invalid position {position:?}"
        ))),
    }
}

fn convert_positions(positions: &[Position]) -> Result<Vec<Point2d>, PetaTypesError> {
    positions.iter().map(convert_position).collect()
}

fn convert_contour(line: &LineStringType) -> Result<Contour<Point2d>, PetaTypesError> {
    if line.len() < 2 {
        return Err(PetaTypesError::Conversion(
            "line string must have at least two positions".into(),
        ));
    }

    Ok(Contour::from_line_string(convert_positions(line)?))
}

fn convert_ring(ring: &LineStringType) -> Result<ClosedContour<Point2d>, PetaTypesError> {
    let contour = ClosedContour::from_ring(convert_positions(ring)?);
    if contour.len() < 3 {
        return Err(PetaTypesError::Conversion(
            "polygon ring must have at least three distinct positions".into(),
        ));
    }

    Ok(contour)
}

fn convert_polygon(polygon: &PolygonType) -> Result<Polygon<Point2d>, PetaTypesError> {
    let (outer, inner) = polygon
        .split_first()
        .ok_or_else(|| PetaTypesError::Conversion("polygon without rings".into()))?;

    Ok(Polygon::new(
        convert_ring(outer)?,
        inner
            .iter()
            .map(convert_ring)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn converts_polygon_with_hole() {
        let geometry = geojson::Geometry::new(Value::Polygon(vec![
            vec![
                vec![0.0, 0.0],
                vec![10.0, 0.0],
                vec![10.0, 10.0],
                vec![0.0, 10.0],
                vec![0.0, 0.0],
            ],
            vec![
                vec![4.0, 4.0],
                vec![6.0, 4.0],
                vec![6.0, 6.0],
                vec![4.0, 4.0],
            ],
        ]));

        let geom = Geom::try_from(&geometry).unwrap();
        let Geom::Polygon(polygon) = &geom else {
            panic!("expected polygon, got {geom:?}");
        };
        assert_eq!(polygon.outer_contour.len(), 4);
        assert_eq!(polygon.inner_contours.len(), 1);
        assert!(geom.contains_point(&Point2d::new(1.0, 1.0)));
    }

    #[test]
    fn rejects_broken_positions() {
        let geometry = geojson::Geometry::new(Value::Point(vec![1.0]));
        assert_matches!(
            Geom::try_from(&geometry),
            Err(PetaTypesError::Conversion(_))
        );

        let geometry = geojson::Geometry::new(Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ]]));
        assert!(Geom::try_from(&geometry).is_err());
    }

    #[test]
    fn writes_closed_rings() {
        let polygon: Geom<Point2d> = Polygon::new(
            ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 1.0),
            ]),
            vec![],
        )
        .into();

        let geometry = geojson::Geometry::from(&polygon);
        assert_eq!(
            geometry.value,
            Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]])
        );
        assert_eq!(Geom::try_from(&geometry).unwrap(), polygon);
    }

    #[test]
    fn flattens_collections() {
        let geometry = geojson::Geometry::new(Value::GeometryCollection(vec![
            geojson::Geometry::new(Value::Point(vec![1.0, 2.0])),
            geojson::Geometry::new(Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])),
        ]));

        let geoms = flatten_geometry(&geometry).unwrap();
        assert_eq!(geoms.len(), 2);
        assert_eq!(geoms[0], Geom::Point(Point2d::new(1.0, 2.0)));
    }
}
