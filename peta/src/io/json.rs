use geojson::{GeoJson, JsonObject};
use log::{debug, warn};
use peta_types::geo::Crs;
use peta_types::geojson::flatten_geometry;

use crate::attributes::{AttributeValue, Attributes};
use crate::error::PetaError;
use crate::layer::{Feature, VectorLayer};

/// Reads a GeoJSON document: a feature collection, a single feature or a bare geometry.
///
/// Feature properties become attributes. A legacy `crs` member (`{"type": "name", "properties": {"name": ...}}`)
/// sets the layer CRS; without it the CRS is left unset. Features without geometry are skipped. Geometry collections
/// are expanded into one feature per member, all sharing the same attributes.
pub fn read_geojson(bytes: &[u8]) -> Result<VectorLayer, PetaError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| PetaError::Input("GeoJSON file is not valid UTF-8".into()))?;
    let document: GeoJson = text.parse()?;

    let (crs, items) = match document {
        GeoJson::FeatureCollection(collection) => (
            declared_crs(collection.foreign_members.as_ref())?,
            collection
                .features
                .into_iter()
                .map(|f| (f.geometry, f.properties))
                .collect::<Vec<_>>(),
        ),
        GeoJson::Feature(feature) => (
            declared_crs(feature.foreign_members.as_ref())?,
            vec![(feature.geometry, feature.properties)],
        ),
        GeoJson::Geometry(geometry) => (
            declared_crs(geometry.foreign_members.as_ref())?,
            vec![(Some(geometry), None)],
        ),
    };

    let mut features = vec![];
    for (index, (geometry, properties)) in items.into_iter().enumerate() {
        let Some(geometry) = geometry else {
            warn!("Feature {index} has no geometry, skipping it");
            continue;
        };

        let attributes = properties
            .map(|props| convert_properties(&props))
            .unwrap_or_default();

        for geom in flatten_geometry(&geometry)
            .map_err(|err| PetaError::Geometry(format!("feature {index}: {err}")))?
        {
            features.push(Feature::new(geom, attributes.clone()));
        }
    }

    if features.is_empty() {
        return Err(PetaError::Geometry(
            "GeoJSON document contains no geometries".into(),
        ));
    }

    debug!("Read {} features from GeoJSON", features.len());
    Ok(VectorLayer::new(features, crs))
}

fn convert_properties(properties: &JsonObject) -> Attributes {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), AttributeValue::from_json(value)))
        .collect()
}

fn declared_crs(foreign_members: Option<&JsonObject>) -> Result<Option<Crs>, PetaError> {
    let Some(crs) = foreign_members.and_then(|members| members.get("crs")) else {
        return Ok(None);
    };

    match crs
        .get("properties")
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
    {
        Some(name) => Ok(Some(Crs::from_name(name)?)),
        None => {
            warn!("Ignoring GeoJSON crs member without a name: {crs}");
            Ok(None)
        }
    }
}
