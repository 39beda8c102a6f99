//! Country boundary dataset used for the inset locator map.

use log::debug;
use peta_types::geo::Crs;

use crate::attributes::AttributeValue;
use crate::error::PetaError;
use crate::io::read_geojson;
use crate::layer::{Feature, VectorLayer};

const NAME_PROPERTIES: [&str; 3] = ["name", "NAME", "ADMIN"];

/// Country outlines indexed by name.
#[derive(Debug, Clone)]
pub struct CountryBoundaries {
    countries: Vec<(String, VectorLayer)>,
}

impl CountryBoundaries {
    /// Reads a GeoJSON collection of country features. The name of a country is taken from the first present of
    /// the `name`, `NAME` and `ADMIN` properties; features without a name are ignored. Several features with the same
    /// name are merged into one country.
    pub fn from_geojson(bytes: &[u8]) -> Result<Self, PetaError> {
        let layer = read_geojson(bytes)?.normalize_crs();
        let crs = layer.effective_crs();

        let mut countries: Vec<(String, Vec<Feature>)> = vec![];
        for feature in layer.into_features() {
            let Some(name) = country_name(&feature) else {
                continue;
            };

            match countries
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
            {
                Some((_, features)) => features.push(feature),
                None => countries.push((name, vec![feature])),
            }
        }

        debug!("Read boundaries of {} countries", countries.len());

        Ok(Self {
            countries: countries
                .into_iter()
                .map(|(name, features)| (name, VectorLayer::new(features, Some(crs.clone()))))
                .collect(),
        })
    }

    /// Outline of the country with the given name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&VectorLayer> {
        let name = name.trim();
        self.countries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, layer)| layer)
    }

    /// Names of all countries in the dataset.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(|(name, _)| name.as_str())
    }

    /// CRS of the outlines.
    pub fn crs(&self) -> Option<&Crs> {
        self.countries.first().and_then(|(_, layer)| layer.crs())
    }
}

fn country_name(feature: &Feature) -> Option<String> {
    NAME_PROPERTIES
        .iter()
        .find_map(|property| match feature.attribute(property) {
            Some(AttributeValue::Text(name)) if !name.trim().is_empty() => {
                Some(name.trim().to_string())
            }
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTRIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ADMIN": "Indonesia"},
             "geometry": {"type": "Polygon", "coordinates": [[[95,-11],[141,-11],[141,6],[95,6],[95,-11]]]}},
            {"type": "Feature", "properties": {"name": "Malaysia", "ADMIN": "ignored"},
             "geometry": {"type": "Polygon", "coordinates": [[[100,1],[119,1],[119,7],[100,7],[100,1]]]}},
            {"type": "Feature", "properties": {"NAME": "indonesia"},
             "geometry": {"type": "Polygon", "coordinates": [[[120,-5],[121,-5],[121,-4],[120,-5]]]}},
            {"type": "Feature", "properties": {"code": 1},
             "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]
    }"#;

    #[test]
    fn find_is_case_insensitive() {
        let countries = CountryBoundaries::from_geojson(COUNTRIES.as_bytes()).unwrap();
        assert_eq!(countries.names().collect::<Vec<_>>(), ["Indonesia", "Malaysia"]);

        let indonesia = countries.find(" INDONESIA ").unwrap();
        assert_eq!(indonesia.len(), 2);
        assert_eq!(indonesia.crs(), Some(&Crs::WGS84));

        assert!(countries.find("Malaysia").is_some());
        assert!(countries.find("ignored").is_none());
        assert!(countries.find("Timor-Leste").is_none());
        assert_eq!(countries.crs(), Some(&Crs::WGS84));
    }
}
