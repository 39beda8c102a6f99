//! Delimited text export of join results.

use std::io::{Read, Write};

use crate::attributes::AttributeValue;
use crate::error::PetaError;
use crate::io::PointRecord;
use crate::join::JoinResult;

/// Writes join results as CSV with the header `id,bujur,lintang,<attribute>`.
///
/// Rows keep the order of `results`. Coordinates are written with the shortest representation that parses back to
/// the same value; a missing value is an empty field. Floating point attribute values always carry a fraction or an
/// exponent so that [`read_join_csv`] can tell them from integers.
pub fn write_join_csv<W: Write>(
    results: &[JoinResult],
    attribute: &str,
    writer: W,
) -> Result<(), PetaError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["id", "bujur", "lintang", attribute])?;

    for result in results {
        let value = result.value.as_ref().map(field_text).unwrap_or_default();
        csv_writer.write_record([
            result.record.id.as_str(),
            &result.record.lon.to_string(),
            &result.record.lat.to_string(),
            &value,
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes join results into a CSV string.
pub fn join_csv_string(results: &[JoinResult], attribute: &str) -> Result<String, PetaError> {
    let mut buffer = Vec::new();
    write_join_csv(results, attribute, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| PetaError::Input(err.to_string()))
}

fn field_text(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Number(v) => format!("{v:?}"),
        other => other.to_string(),
    }
}

fn parse_field(field: &str) -> Option<AttributeValue> {
    if field.is_empty() {
        return None;
    }

    let value = match field {
        "true" => AttributeValue::Bool(true),
        "false" => AttributeValue::Bool(false),
        _ => match (field.parse::<i64>(), field.parse::<f64>()) {
            (Ok(i), _) => AttributeValue::Integer(i),
            (_, Ok(n)) if n.is_finite() => AttributeValue::Number(n),
            _ => AttributeValue::Text(field.to_string()),
        },
    };

    Some(value)
}

/// Reads back a table written by [`write_join_csv`].
///
/// An empty attribute field is `None`, `true`/`false` a flag, then whole numbers and other numbers are tried. Anything
/// else is text, so a text value that looks like a number comes back as that number.
pub fn read_join_csv<R: Read>(reader: R) -> Result<Vec<JoinResult>, PetaError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    if headers.len() != 4 || &headers[0] != "id" || &headers[1] != "bujur" || &headers[2] != "lintang"
    {
        return Err(PetaError::Input(format!(
            "unexpected join table header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    csv_reader
        .records()
        .enumerate()
        .map(|(index, row)| {
            let row = row?;
            let coordinate = |i: usize| {
                row[i].parse::<f64>().map_err(|_| {
                    PetaError::Input(format!("row {}: invalid coordinate '{}'", index + 1, &row[i]))
                })
            };

            Ok(JoinResult {
                record: PointRecord::new(&row[0], coordinate(1)?, coordinate(2)?),
                value: parse_field(&row[3]),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn results() -> Vec<JoinResult> {
        vec![
            JoinResult {
                record: PointRecord::new("P1", 106.81234567891234, -6.2),
                value: Some("Zona Perikanan, Tangkap".into()),
            },
            JoinResult {
                record: PointRecord::new("P2", 0.1 + 0.2, 1e-7),
                value: None,
            },
        ]
    }

    #[test]
    fn written_table() {
        let text = join_csv_string(&results(), "zona").unwrap();
        assert_eq!(
            text,
            "id,bujur,lintang,zona\n\
             P1,106.81234567891234,-6.2,\"Zona Perikanan, Tangkap\"\n\
             P2,0.30000000000000004,0.0000001,\n"
        );
    }

    #[test]
    fn read_back() {
        let original = results();
        let text = join_csv_string(&original, "zona").unwrap();
        let parsed = read_join_csv(text.as_bytes()).unwrap();

        assert_eq!(parsed, original);
    }

    #[test]
    fn typed_values_read_back() {
        let typed = [
            AttributeValue::Integer(7),
            AttributeValue::Number(2.0),
            AttributeValue::Number(0.125),
            AttributeValue::Bool(false),
            AttributeValue::Text("Zona 7A".into()),
        ];
        let original: Vec<JoinResult> = typed
            .into_iter()
            .map(Some)
            .chain([None])
            .enumerate()
            .map(|(i, value)| JoinResult {
                record: PointRecord::new(&format!("T{i}"), 106.0 + i as f64, -6.0),
                value,
            })
            .collect();

        let text = join_csv_string(&original, "kode").unwrap();
        assert!(text.contains("T1,107,-6,2.0\n"));
        assert_eq!(read_join_csv(text.as_bytes()).unwrap(), original);
    }

    #[test]
    fn wrong_header() {
        assert_matches!(
            read_join_csv("a,b,c,d\n".as_bytes()),
            Err(PetaError::Input(_))
        );
    }
}
