use std::io::{Cursor, Read};

use log::{debug, warn};
use peta_types::cartesian::Point2d;
use peta_types::geo::Crs;
use peta_types::geometry::Geom;
use peta_types::{ClosedContour, Contour, MultiContour, MultiPoint, MultiPolygon, Polygon};
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use zip::ZipArchive;

use crate::attributes::{AttributeValue, Attributes};
use crate::error::PetaError;
use crate::layer::{Feature, VectorLayer};

/// Reads a zipped shapefile bundle.
///
/// The archive is read in memory. The first `.shp` entry in archive order is used (folders are allowed,
/// `__MACOSX` resource forks are ignored); its `.dbf` sibling must be present, the `.prj` sibling is optional.
pub fn read_shapefile_zip(bytes: &[u8]) -> Result<VectorLayer, PetaError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let shp_name = names
        .iter()
        .filter(|name| !name.starts_with("__MACOSX") && !name.contains("/__MACOSX"))
        .find(|name| name.to_ascii_lowercase().ends_with(".shp"))
        .ok_or_else(|| PetaError::Input("no shapefile found in archive".into()))?
        .clone();

    let stem = &shp_name[..shp_name.len() - 4];
    let sibling = |extension: &str| {
        names
            .iter()
            .find(|name| {
                name.len() == stem.len() + 4
                    && name.starts_with(stem)
                    && name[stem.len()..].eq_ignore_ascii_case(extension)
            })
            .cloned()
    };

    let dbf_name = sibling(".dbf").ok_or_else(|| {
        PetaError::Input(format!("attribute file (.dbf) for '{shp_name}' is missing"))
    })?;
    let prj_name = sibling(".prj");

    debug!("Reading shapefile '{shp_name}' from archive");

    let shp = read_entry(&mut archive, &shp_name)?;
    let dbf = read_entry(&mut archive, &dbf_name)?;
    let prj = match prj_name {
        Some(name) => {
            let bytes = read_entry(&mut archive, &name)?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => None,
    };

    read_shapefile_parts(shp, dbf, prj.as_deref())
}

/// Reads a shapefile from the contents of its `.shp` and `.dbf` files, and the text of its `.prj` file if there is
/// one.
///
/// A `.prj` that cannot be recognized is an error; without a `.prj` the layer CRS is left unset.
pub fn read_shapefile_parts(
    shp: Vec<u8>,
    dbf: Vec<u8>,
    prj: Option<&str>,
) -> Result<VectorLayer, PetaError> {
    let crs = prj.map(Crs::from_wkt).transpose()?;

    let shape_reader = shapefile::ShapeReader::new(Cursor::new(shp))?;
    let dbase_reader = shapefile::dbase::Reader::new(Cursor::new(dbf))
        .map_err(|err| PetaError::Input(format!("invalid attribute file: {err}")))?;
    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);

    let mut features = vec![];
    for (index, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item?;
        let Some(geometry) = convert_shape(shape)
            .map_err(|message| PetaError::Geometry(format!("shape {index}: {message}")))?
        else {
            warn!("Shape {index} is empty, skipping it");
            continue;
        };

        let attributes: Attributes = record
            .into_iter()
            .map(|(name, value)| (name, convert_field(value)))
            .collect();
        features.push(Feature::new(geometry, attributes));
    }

    if features.is_empty() {
        return Err(PetaError::Geometry("shapefile contains no geometries".into()));
    }

    Ok(VectorLayer::new(features, crs))
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, PetaError> {
    let mut file = archive.by_name(name)?;
    let mut buffer = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

trait XY {
    fn xy(&self) -> Point2d;
}

impl XY for shapefile::Point {
    fn xy(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }
}

impl XY for shapefile::PointM {
    fn xy(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }
}

impl XY for shapefile::PointZ {
    fn xy(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }
}

fn to_points<P: XY>(points: &[P]) -> Vec<Point2d> {
    points.iter().map(XY::xy).collect()
}

fn convert_shape(shape: Shape) -> Result<Option<Geom<Point2d>>, String> {
    let geometry = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Geom::Point(p.xy()),
        Shape::PointM(p) => Geom::Point(p.xy()),
        Shape::PointZ(p) => Geom::Point(p.xy()),
        Shape::Multipoint(v) => Geom::MultiPoint(MultiPoint::from(to_points(v.points()))),
        Shape::MultipointM(v) => Geom::MultiPoint(MultiPoint::from(to_points(v.points()))),
        Shape::MultipointZ(v) => Geom::MultiPoint(MultiPoint::from(to_points(v.points()))),
        Shape::Polyline(v) => convert_lines(v.parts())?,
        Shape::PolylineM(v) => convert_lines(v.parts())?,
        Shape::PolylineZ(v) => convert_lines(v.parts())?,
        Shape::Polygon(v) => convert_rings(v.rings())?,
        Shape::PolygonM(v) => convert_rings(v.rings())?,
        Shape::PolygonZ(v) => convert_rings(v.rings())?,
        Shape::Multipatch(_) => return Err("multipatch shapes are not supported".into()),
    };

    Ok(Some(geometry))
}

fn convert_lines<P: XY>(parts: &[Vec<P>]) -> Result<Geom<Point2d>, String> {
    let mut lines: Vec<Contour<Point2d>> = parts
        .iter()
        .map(|part| Contour::open(to_points(part)))
        .collect();

    if lines.iter().any(|line| line.len() < 2) {
        return Err("line part has less than 2 points".into());
    }

    Ok(match lines.len() {
        0 => return Err("polyline has no parts".into()),
        1 => Geom::Contour(lines.remove(0)),
        _ => Geom::MultiContour(MultiContour::from(lines)),
    })
}

fn convert_rings<P: XY>(rings: &[PolygonRing<P>]) -> Result<Geom<Point2d>, String> {
    let mut polygons: Vec<Polygon<Point2d>> = vec![];

    for ring in rings {
        let contour = ClosedContour::from_ring(to_points(ring.points()));
        if contour.len() < 3 {
            return Err("polygon ring has less than 3 points".into());
        }

        match (ring, polygons.last_mut()) {
            (PolygonRing::Inner(_), Some(polygon)) => polygon.inner_contours.push(contour),
            _ => polygons.push(Polygon::new(contour, vec![])),
        }
    }

    Ok(match polygons.len() {
        0 => return Err("polygon has no rings".into()),
        1 => Geom::Polygon(polygons.remove(0)),
        _ => Geom::MultiPolygon(MultiPolygon::from(polygons)),
    })
}

fn convert_field(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(v)) => AttributeValue::Text(v.trim_end().to_string()),
        FieldValue::Memo(v) => AttributeValue::Text(v),
        FieldValue::Numeric(Some(v)) | FieldValue::Double(v) | FieldValue::Currency(v) => {
            number(v)
        }
        FieldValue::Float(Some(v)) => number(v as f64),
        FieldValue::Integer(v) => AttributeValue::Integer(v as i64),
        FieldValue::Logical(Some(v)) => AttributeValue::Bool(v),
        FieldValue::Date(Some(date)) => AttributeValue::Text(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        _ => AttributeValue::Null,
    }
}

/// dBase stores every numeric field as floating point; whole values are kept as integers.
fn number(v: f64) -> AttributeValue {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        AttributeValue::Integer(v as i64)
    } else {
        AttributeValue::Number(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn archive_without_shapefile() {
        let bytes = zip_with(&[("readme.txt", b"nothing here")]);
        assert_matches!(
            read_shapefile_zip(&bytes),
            Err(PetaError::Input(message)) if message == "no shapefile found in archive"
        );
    }

    #[test]
    fn macos_resource_forks_are_ignored() {
        let bytes = zip_with(&[("__MACOSX/._zona.shp", b"junk")]);
        assert_matches!(read_shapefile_zip(&bytes), Err(PetaError::Input(_)));
    }

    #[test]
    fn missing_dbf() {
        let bytes = zip_with(&[("data/zona.SHP", b"junk")]);
        assert_matches!(
            read_shapefile_zip(&bytes),
            Err(PetaError::Input(message)) if message.contains(".dbf")
        );
    }

    #[test]
    fn not_an_archive() {
        assert_matches!(read_shapefile_zip(b"plain text"), Err(PetaError::Zip(_)));
    }

    #[test]
    fn polygon_rings() {
        let ring = |points: &[(f64, f64)]| {
            points
                .iter()
                .map(|(x, y)| shapefile::Point::new(*x, *y))
                .collect::<Vec<_>>()
        };
        let rings = vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)])),
            PolygonRing::Outer(ring(&[(20.0, 0.0), (20.0, 1.0), (21.0, 1.0), (20.0, 0.0)])),
        ];

        let geom = convert_rings(&rings).unwrap();
        let Geom::MultiPolygon(multi) = geom else {
            panic!("expected multipolygon");
        };
        assert_eq!(multi.parts.len(), 2);
        assert_eq!(multi.parts[0].inner_contours.len(), 1);
        assert_eq!(multi.parts[0].outer_contour.len(), 4);
        assert!(!multi.contains_point(&Point2d::new(3.0, 3.0)));
        assert!(multi.contains_point(&Point2d::new(5.0, 5.0)));
    }

    #[test]
    fn field_values() {
        assert_eq!(
            convert_field(FieldValue::Character(Some("Zona A   ".into()))),
            AttributeValue::from("Zona A")
        );
        assert_eq!(
            convert_field(FieldValue::Numeric(Some(12.0))),
            AttributeValue::Integer(12)
        );
        assert_eq!(
            convert_field(FieldValue::Numeric(Some(1.25))),
            AttributeValue::Number(1.25)
        );
        assert!(convert_field(FieldValue::Character(None)).is_null());
    }
}
