//! State of one interactive overlay session.

use crate::error::PetaError;
use crate::layer::VectorLayer;

/// What the user has uploaded and selected so far in the overlay tool.
///
/// The session is owned by the caller and passed by `&mut` into the stages that change it. Nothing is shared between
/// sessions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Attribute of the zoning layer the points are joined with.
    pub selected_attribute: Option<String>,
    /// Zoning layer, in geographic WGS84.
    pub layer: Option<VectorLayer>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the zoning layer. The attribute selection is kept only if the new layer has that attribute.
    pub fn set_layer(&mut self, layer: VectorLayer) {
        if let Some(attribute) = &self.selected_attribute {
            if !layer.has_attribute(attribute) {
                self.selected_attribute = None;
            }
        }

        self.layer = Some(layer);
    }

    /// Attributes of the zoning layer that can be selected. Empty if no layer is loaded.
    pub fn attribute_names(&self) -> Vec<String> {
        self.layer
            .as_ref()
            .map(|layer| layer.attribute_names())
            .unwrap_or_default()
    }

    /// Selects the attribute to join. Fails if no layer is loaded or the layer has no such attribute.
    pub fn select_attribute(&mut self, name: &str) -> Result<(), PetaError> {
        let layer = self
            .layer
            .as_ref()
            .ok_or_else(|| PetaError::Input("no zoning layer is loaded".into()))?;

        if !layer.has_attribute(name) {
            return Err(PetaError::Join(format!(
                "attribute '{name}' does not exist in the zoning layer"
            )));
        }

        self.selected_attribute = Some(name.to_string());
        Ok(())
    }

    /// Forgets the layer and the selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
