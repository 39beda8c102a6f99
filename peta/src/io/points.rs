use std::io::Read;

use log::debug;
use peta_types::cartesian::Point2d;
use serde::{Deserialize, Serialize};

use crate::error::PetaError;

/// One row of the uploaded point table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Identifier of the point, as written in the table.
    pub id: String,
    /// Longitude, degrees.
    pub lon: f64,
    /// Latitude, degrees.
    pub lat: f64,
    /// Other columns of the row, in table order.
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

impl PointRecord {
    /// Creates a record without extra columns.
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            lon,
            lat,
            extra: vec![],
        }
    }

    /// Location of the point as `(lon, lat)`.
    pub fn position(&self) -> Point2d {
        Point2d::new(self.lon, self.lat)
    }
}

const ID_COLUMN: &str = "id";
const LON_COLUMN: &str = "bujur";
const LAT_COLUMN: &str = "lintang";

/// Reads a point table with the columns `id`, `bujur` (longitude) and `lintang` (latitude).
///
/// Column names are matched ignoring case and surrounding whitespace. Both `,` and `;` are accepted as the
/// delimiter; whichever appears more often in the header line wins. Coordinates may use a decimal comma.
/// Rows with an empty or out of range coordinate are rejected with an error naming the row (1-based, header
/// excluded).
pub fn read_points_csv(mut reader: impl Read) -> Result<Vec<PointRecord>, PetaError> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;

    let header_line = content.split(|b| *b == b'\n').next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(content.as_slice());

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| PetaError::Input(format!("required column '{name}' is missing")))
    };
    let id_index = column(ID_COLUMN)?;
    let lon_index = column(LON_COLUMN)?;
    let lat_index = column(LAT_COLUMN)?;

    let mut records = vec![];
    for (row_index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let row_number = row_index + 1;
        let field = |index: usize| row.get(index).unwrap_or_default();

        let lon = parse_coordinate(field(lon_index), 180.0).ok_or_else(|| {
            PetaError::Input(format!(
                "row {row_number}: invalid longitude '{}'",
                field(lon_index)
            ))
        })?;
        let lat = parse_coordinate(field(lat_index), 90.0).ok_or_else(|| {
            PetaError::Input(format!(
                "row {row_number}: invalid latitude '{}'",
                field(lat_index)
            ))
        })?;

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| ![id_index, lon_index, lat_index].contains(i))
            .map(|(i, name)| (name.clone(), field(i).to_string()))
            .collect();

        records.push(PointRecord {
            id: field(id_index).to_string(),
            lon,
            lat,
            extra,
        });
    }

    debug!(
        "Read {} points (delimiter '{}')",
        records.len(),
        delimiter as char
    );
    Ok(records)
}

fn detect_delimiter(header_line: &[u8]) -> u8 {
    let count = |c: u8| header_line.iter().filter(|b| **b == c).count();
    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}

fn parse_coordinate(value: &str, limit: f64) -> Option<f64> {
    let normalized = value.trim().replace(',', ".");
    let parsed: f64 = normalized.parse().ok()?;
    (parsed.is_finite() && parsed.abs() <= limit).then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn comma_separated() {
        let table = "ID, Bujur ,Lintang,keterangan\nP1,106.8,-6.2,dermaga\nP2,107,-6.5,\n";
        let points = read_points_csv(table.as_bytes()).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, "P1");
        assert_eq!(points[0].lon, 106.8);
        assert_eq!(points[0].lat, -6.2);
        assert_eq!(
            points[0].extra,
            vec![("keterangan".to_string(), "dermaga".to_string())]
        );
        assert_eq!(points[1].lon, 107.0);
    }

    #[test]
    fn semicolon_with_decimal_comma() {
        let table = "\u{feff}id;bujur;lintang\r\n1;106,8;-6,25\r\n";
        let points = read_points_csv(table.as_bytes()).unwrap();

        assert_eq!(points, vec![PointRecord::new("1", 106.8, -6.25)]);
    }

    #[test]
    fn missing_column() {
        let table = "id,lon,lintang\n1,2,3\n";
        assert_matches!(
            read_points_csv(table.as_bytes()),
            Err(PetaError::Input(message)) if message.contains("bujur")
        );
    }

    #[test]
    fn invalid_coordinates() {
        let table = "id,bujur,lintang\n1,106.8,-6.2\n2,abc,-6.2\n";
        assert_matches!(
            read_points_csv(table.as_bytes()),
            Err(PetaError::Input(message)) if message.starts_with("row 2")
        );

        let table = "id,bujur,lintang\n1,106.8,-96\n";
        assert_matches!(read_points_csv(table.as_bytes()), Err(PetaError::Input(_)));
    }

    #[test]
    fn empty_table() {
        let points = read_points_csv("id,bujur,lintang\n".as_bytes()).unwrap();
        assert!(points.is_empty());
    }
}
