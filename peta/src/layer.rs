//! Vector layers: features with geometry and attributes sharing one coordinate reference system.

use log::debug;
use peta_types::cartesian::{Point2d, Rect};
use peta_types::geo::{Crs, Projection};
use peta_types::geometry::Geom;

use crate::attributes::{AttributeValue, Attributes};
use crate::error::PetaError;

/// A geometric feature with its attribute record.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Geometry in the units of the layer CRS.
    pub geometry: Geom<Point2d>,
    /// Attribute record.
    pub attributes: Attributes,
}

impl Feature {
    /// Creates a new feature.
    pub fn new(geometry: Geom<Point2d>, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// Value of the attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

/// Set of features sharing one coordinate reference system.
///
/// A layer read from a file without CRS information has `crs == None`. Such a layer is treated as geographic WGS84
/// and gets that CRS assigned explicitly by [`VectorLayer::normalize_crs`] before it is projected.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayer {
    features: Vec<Feature>,
    crs: Option<Crs>,
}

impl VectorLayer {
    /// Creates a new layer.
    pub fn new(features: Vec<Feature>, crs: Option<Crs>) -> Self {
        Self { features, crs }
    }

    /// Features of the layer in their stored order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Consumes the layer, returning its features.
    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    /// CRS of the layer, if it is known.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// CRS of the layer, with an unset CRS read as geographic WGS84.
    pub fn effective_crs(&self) -> Crs {
        self.crs.clone().unwrap_or(Crs::WGS84)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the layer has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Assigns geographic WGS84 if the layer has no CRS.
    pub fn normalize_crs(mut self) -> Self {
        if self.crs.is_none() {
            debug!("Layer has no CRS, assuming EPSG:4326");
            self.crs = Some(Crs::WGS84);
        }

        self
    }

    /// Returns the layer converted into the `target` CRS.
    ///
    /// Reprojecting a layer that is already in `target` returns an identical copy, so the operation is idempotent.
    /// Fails with [`PetaError::Geometry`] if any vertex cannot be transformed.
    pub fn reproject(&self, target: &Crs) -> Result<VectorLayer, PetaError> {
        let source = self.effective_crs();
        if &source == target {
            return Ok(VectorLayer::new(self.features.clone(), Some(source)));
        }

        let projection = source.reprojection_to(target)?;
        let features = self
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                let geometry = project_checked(&feature.geometry, &projection).ok_or_else(|| {
                    PetaError::Geometry(format!(
                        "feature {index} cannot be transformed from {source} to {target}"
                    ))
                })?;
                Ok(Feature::new(geometry, feature.attributes.clone()))
            })
            .collect::<Result<Vec<_>, PetaError>>()?;

        debug!(
            "Reprojected {} features from {source} to {target}",
            features.len()
        );

        Ok(VectorLayer::new(features, Some(target.clone())))
    }

    /// Bounding rectangle of all features, in layer CRS units.
    pub fn extent(&self) -> Option<Rect> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.bounding_rect())
            .reduce(|acc, rect| acc.merge(rect))
    }

    /// Names of all attribute fields present in any feature, sorted.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .features
            .iter()
            .flat_map(|f| f.attributes.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Returns true if at least one feature has the given attribute field.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.features
            .iter()
            .any(|f| f.attributes.contains_key(name))
    }

    /// Appends features of another layer. Both layers must be in the same CRS (unset counts as WGS84).
    pub fn extend(&mut self, other: VectorLayer) -> Result<(), PetaError> {
        if self.effective_crs() != other.effective_crs() {
            return Err(PetaError::Geometry(format!(
                "cannot merge layers in {} and {}",
                self.effective_crs(),
                other.effective_crs()
            )));
        }

        self.features.extend(other.features);
        Ok(())
    }
}

fn project_checked<P>(geometry: &Geom<Point2d>, projection: &P) -> Option<Geom<Point2d>>
where
    P: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
{
    let projected = geometry.project(projection)?;
    let rect = projected.bounding_rect()?;
    if rect.x_min().is_finite()
        && rect.y_min().is_finite()
        && rect.x_max().is_finite()
        && rect.y_max().is_finite()
    {
        Some(projected)
    } else {
        None
    }
}
