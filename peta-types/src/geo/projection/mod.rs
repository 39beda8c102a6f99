//! Projections convert geographic points into projected (cartesian) ones and back.

mod geographic;
mod web_mercator;

#[cfg(feature = "geodesy")]
mod geodesy;

#[cfg(feature = "geodesy")]
pub use self::geodesy::GeodesyProjection;
pub use geographic::GeographicProjection;
pub use web_mercator::WebMercator;

/// Conversion of points between two coordinate spaces.
pub trait Projection {
    /// Type of the points in the source space.
    type InPoint;
    /// Type of the points in the target space.
    type OutPoint;

    /// Converts a point from the source into the target space. `None` if the point has no valid image.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Converts a point from the target back into the source space.
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}

impl<T: Projection + ?Sized> Projection for Box<T> {
    type InPoint = T::InPoint;
    type OutPoint = T::OutPoint;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        (**self).project(input)
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        (**self).unproject(input)
    }
}

/// Projection with swapped source and target spaces.
pub struct InvertedProjection<P> {
    inner: P,
}

impl<P: Projection> InvertedProjection<P> {
    /// Wraps the given projection.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: Projection> Projection for InvertedProjection<P> {
    type InPoint = P::OutPoint;
    type OutPoint = P::InPoint;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        self.inner.unproject(input)
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        self.inner.project(input)
    }
}

/// Two projections applied one after another.
pub struct ChainProjection<In, Mid, Out> {
    first: Box<dyn Projection<InPoint = In, OutPoint = Mid>>,
    second: Box<dyn Projection<InPoint = Mid, OutPoint = Out>>,
}

impl<In, Mid, Out> ChainProjection<In, Mid, Out> {
    /// Creates a projection that applies `first` and then `second`.
    pub fn new(
        first: Box<dyn Projection<InPoint = In, OutPoint = Mid>>,
        second: Box<dyn Projection<InPoint = Mid, OutPoint = Out>>,
    ) -> Self {
        Self { first, second }
    }
}

impl<In, Mid, Out> Projection for ChainProjection<In, Mid, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        self.second.project(&self.first.project(input)?)
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        self.first.unproject(&self.second.unproject(input)?)
    }
}
