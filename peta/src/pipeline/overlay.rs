use log::{debug, info};
use peta_types::geo::Crs;
use serde::{Deserialize, Serialize};

use super::load_layer;
use crate::error::PetaError;
use crate::export::join_csv_string;
use crate::io::read_points_csv;
use crate::join::{spatial_join, JoinResult};
use crate::session::Session;
use crate::webmap::{build_feed, WebMapFeed};

/// Options of the overlay tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Attribute selected automatically after a zoning layer is loaded, if the layer has it and nothing is selected.
    pub preferred_attribute: Option<String>,
    /// Whether [`run_overlay`] builds the web map feed.
    pub web_map: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            preferred_attribute: None,
            web_map: true,
        }
    }
}

/// Result of one overlay run.
#[derive(Debug, Clone)]
pub struct OverlayOutput {
    /// Joined attribute.
    pub attribute: String,
    /// One row per input point, in input order.
    pub results: Vec<JoinResult>,
    /// The results as CSV text.
    pub csv: String,
    /// Web map content, if enabled.
    pub feed: Option<WebMapFeed>,
}

/// Loads the zoning layer into the session and returns the attributes that can be selected.
///
/// The layer is converted to WGS84 (a layer without CRS is taken as WGS84). On failure the session is unchanged.
pub fn load_zoning(
    session: &mut Session,
    file_name: &str,
    data: &[u8],
    config: &OverlayConfig,
) -> Result<Vec<String>, PetaError> {
    let layer = load_layer(file_name, data)?.reproject(&Crs::WGS84)?;
    session.set_layer(layer);

    if session.selected_attribute.is_none() {
        if let Some(preferred) = &config.preferred_attribute {
            if session.select_attribute(preferred).is_ok() {
                debug!("Selected attribute '{preferred}'");
            }
        }
    }

    Ok(session.attribute_names())
}

/// Joins the uploaded point table with the zoning layer of the session on the selected attribute.
///
/// Fails if the session has no layer or no selected attribute, or if the table cannot be read.
pub fn run_overlay(
    session: &Session,
    points_csv: &[u8],
    config: &OverlayConfig,
) -> Result<OverlayOutput, PetaError> {
    let layer = session
        .layer
        .as_ref()
        .ok_or_else(|| PetaError::Input("no zoning layer is loaded".into()))?;
    let attribute = session
        .selected_attribute
        .as_deref()
        .ok_or_else(|| PetaError::Input("no attribute is selected".into()))?;

    let points = read_points_csv(points_csv)?;
    let results = spatial_join(&points, layer, attribute)?;
    let csv = join_csv_string(&results, attribute)?;
    let feed = if config.web_map {
        Some(build_feed(layer, &results, attribute)?)
    } else {
        None
    };

    info!(
        "Overlay of {} points on '{attribute}' finished",
        results.len()
    );

    Ok(OverlayOutput {
        attribute: attribute.to_string(),
        results,
        csv,
        feed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use assert_matches::assert_matches;

    const ZONES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"ZONA": "Perikanan Tangkap", "KODE": 1},
                "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]}
            },
            {
                "type": "Feature",
                "properties": {"ZONA": "Pelabuhan", "KODE": 2},
                "geometry": {"type": "Polygon", "coordinates": [[[1, 0], [2, 0], [2, 1], [1, 1], [1, 0]]]}
            }
        ]
    }"#;

    const POINTS: &str = "id;bujur;lintang\nA;0,5;0,5\nB;1;0,5\nC;5;5\n";

    #[test]
    fn join_points_with_zones() {
        let mut session = Session::new();
        let config = OverlayConfig {
            preferred_attribute: Some("ZONA".into()),
            ..Default::default()
        };

        let attributes =
            load_zoning(&mut session, "zona.geojson", ZONES.as_bytes(), &config).unwrap();
        assert_eq!(attributes, vec!["KODE".to_string(), "ZONA".to_string()]);
        assert_eq!(session.selected_attribute.as_deref(), Some("ZONA"));

        let output = run_overlay(&session, POINTS.as_bytes(), &config).unwrap();
        assert_eq!(
            output.results.iter().map(|r| r.value.clone()).collect::<Vec<_>>(),
            vec![
                Some(AttributeValue::from("Perikanan Tangkap")),
                Some(AttributeValue::from("Perikanan Tangkap")),
                None
            ]
        );
        assert_eq!(
            output.csv,
            "id,bujur,lintang,ZONA\nA,0.5,0.5,Perikanan Tangkap\nB,1,0.5,Perikanan Tangkap\nC,5,5,\n"
        );
        assert_eq!(output.feed.unwrap().features.features.len(), 5);
    }

    #[test]
    fn requires_layer_and_attribute() {
        let mut session = Session::new();
        let config = OverlayConfig {
            web_map: false,
            ..Default::default()
        };
        assert_matches!(
            run_overlay(&session, POINTS.as_bytes(), &config),
            Err(PetaError::Input(_))
        );

        load_zoning(&mut session, "zona.json", ZONES.as_bytes(), &config).unwrap();
        assert_matches!(
            run_overlay(&session, POINTS.as_bytes(), &config),
            Err(PetaError::Input(message)) if message.contains("attribute")
        );

        session.select_attribute("KODE").unwrap();
        let output = run_overlay(&session, POINTS.as_bytes(), &config).unwrap();
        assert!(output.feed.is_none());
        assert_eq!(output.results[1].value, Some(AttributeValue::Integer(1)));
    }

    #[test]
    fn failed_load_keeps_session() {
        let mut session = Session::new();
        let config = OverlayConfig::default();
        load_zoning(&mut session, "zona.geojson", ZONES.as_bytes(), &config).unwrap();

        assert!(load_zoning(&mut session, "zona.csv", b"", &config).is_err());
        assert!(session.layer.is_some());
    }
}
