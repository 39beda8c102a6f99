//! Points, rectangles and sizes in 2d cartesian coordinates.

mod orient;
mod point;
mod rect;
mod size;

pub use orient::Orientation;
pub use point::{CartesianPoint2d, NewCartesianPoint2d, Point2d};
pub use rect::Rect;
pub use size::Size;
