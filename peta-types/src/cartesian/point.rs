use nalgebra::{Point2, Scalar};
use num_traits::{Float, FromPrimitive};

/// 2d point with `f64` coordinates.
pub type Point2d = Point2<f64>;

/// A point in 2d cartesian space.
pub trait CartesianPoint2d {
    /// Numeric type of the coordinates.
    type Num: Float + Scalar + FromPrimitive;

    /// X coordinate (easting, or longitude for geographic data).
    fn x(&self) -> Self::Num;
    /// Y coordinate (northing, or latitude for geographic data).
    fn y(&self) -> Self::Num;
}

/// Point type that can be constructed from its coordinates.
pub trait NewCartesianPoint2d<Num = f64>: CartesianPoint2d<Num = Num> {
    /// Creates a new point.
    fn new(x: Num, y: Num) -> Self;
}

impl<N: Float + Scalar + FromPrimitive> CartesianPoint2d for Point2<N> {
    type Num = N;

    fn x(&self) -> N {
        self.x
    }

    fn y(&self) -> N {
        self.y
    }
}

impl<N: Float + Scalar + FromPrimitive> NewCartesianPoint2d<N> for Point2<N> {
    fn new(x: N, y: N) -> Self {
        Point2::new(x, y)
    }
}

