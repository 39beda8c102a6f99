//! Data feed for the interactive web map of the overlay tool.
//!
//! The web map itself is drawn by the client. This module prepares what it shows: zoning polygons and joined points
//! as one GeoJSON feature collection in WGS84, each feature with a `popup` text, and a suggested initial view.

use geojson::{Feature as GeoJsonFeature, FeatureCollection, JsonObject, JsonValue};
use peta_types::cartesian::{Point2d, Rect};
use peta_types::geo::Crs;
use peta_types::geometry::Geom;
use serde::Serialize;

use crate::attributes::Attributes;
use crate::error::PetaError;
use crate::join::JoinResult;
use crate::layer::VectorLayer;

const DEFAULT_ZOOM: u8 = 15;
const MAX_ZOOM: u8 = 18;

/// Content of the web map.
#[derive(Debug, Clone, Serialize)]
pub struct WebMapFeed {
    /// Suggested center of the initial view as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Suggested zoom level of the initial view.
    pub zoom: u8,
    /// Zoning polygons (`"kind": "zone"`) followed by the joined points (`"kind": "point"`).
    pub features: FeatureCollection,
}

impl WebMapFeed {
    /// Serializes the feed into JSON.
    pub fn to_json(&self) -> Result<String, PetaError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds the web map feed from the zoning layer and the join results for `attribute`.
pub fn build_feed(
    layer: &VectorLayer,
    results: &[JoinResult],
    attribute: &str,
) -> Result<WebMapFeed, PetaError> {
    let layer = layer.reproject(&Crs::WGS84)?;

    let mut features: Vec<GeoJsonFeature> = layer
        .features()
        .iter()
        .map(|feature| {
            let mut properties = attribute_properties(&feature.attributes);
            properties.insert("kind".into(), "zone".into());
            properties.insert("popup".into(), zone_popup(&feature.attributes).into());
            to_geojson_feature(&feature.geometry, properties)
        })
        .collect();

    for result in results {
        let record = &result.record;
        let mut properties = JsonObject::new();
        properties.insert("kind".into(), "point".into());
        properties.insert("id".into(), record.id.clone().into());
        properties.insert("bujur".into(), record.lon.into());
        properties.insert("lintang".into(), record.lat.into());
        properties.insert(
            attribute.into(),
            result
                .value
                .as_ref()
                .map(|v| v.to_json())
                .unwrap_or(JsonValue::Null),
        );
        properties.insert("popup".into(), point_popup(result, attribute).into());
        features.push(to_geojson_feature(
            &Geom::Point(record.position()),
            properties,
        ));
    }

    let extent = layer
        .extent()
        .into_iter()
        .chain(results.iter().map(|r| {
            let (x, y) = (r.record.lon, r.record.lat);
            Rect::new(x, y, x, y)
        }))
        .reduce(|acc, rect| acc.merge(rect));

    let (center, zoom) = match extent {
        Some(extent) => {
            let center = extent.center();
            ([center.y, center.x], suggested_zoom(&extent))
        }
        None => ([0.0, 0.0], 1),
    };

    Ok(WebMapFeed {
        center,
        zoom,
        features: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
    })
}

/// Zoom level at which the extent (in degrees) fits into a typical map view.
pub fn suggested_zoom(extent: &Rect) -> u8 {
    let span = extent.width().max(extent.height());
    if !span.is_finite() || span <= 0.0 {
        return DEFAULT_ZOOM;
    }

    (360.0 / span).log2().floor().clamp(1.0, MAX_ZOOM as f64) as u8
}

fn attribute_properties(attributes: &Attributes) -> JsonObject {
    attributes
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

fn zone_popup(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn point_popup(result: &JoinResult, attribute: &str) -> String {
    let value = result
        .value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "id: {}\nbujur: {}\nlintang: {}\n{attribute}: {value}",
        result.record.id, result.record.lon, result.record.lat
    )
}

fn to_geojson_feature(geometry: &Geom<Point2d>, properties: JsonObject) -> GeoJsonFeature {
    GeoJsonFeature {
        bbox: None,
        geometry: Some(geometry.into()),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
