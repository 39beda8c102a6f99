use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::point::CartesianPoint2d;

/// Orientation of a triplet of points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Clockwise
    Clockwise,
    /// Counterclockwise
    Counterclockwise,
    /// All three points lie on one line (or the cross product is not a number).
    Collinear,
}

impl Orientation {
    /// Determines orientation of the triplet `p -> q -> r`.
    pub fn triplet<P: CartesianPoint2d>(
        p: &P,
        q: &impl CartesianPoint2d<Num = P::Num>,
        r: &impl CartesianPoint2d<Num = P::Num>,
    ) -> Self {
        let v = (q.y() - p.y()) * (r.x() - q.x()) - (q.x() - p.x()) * (r.y() - q.y());
        if v > P::Num::zero() {
            Self::Clockwise
        } else if v < P::Num::zero() {
            Self::Counterclockwise
        } else {
            Self::Collinear
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    #[test]
    fn triplet() {
        let a = Point2d::new(0.0, 0.0);
        let b = Point2d::new(1.0, 1.0);
        assert_eq!(
            Orientation::triplet(&a, &b, &Point2d::new(2.0, 0.0)),
            Orientation::Clockwise
        );
        assert_eq!(
            Orientation::triplet(&a, &b, &Point2d::new(0.0, 2.0)),
            Orientation::Counterclockwise
        );
        assert_eq!(
            Orientation::triplet(&a, &b, &Point2d::new(2.0, 2.0)),
            Orientation::Collinear
        );
    }
}
