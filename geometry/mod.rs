pub mod coordinate;
pub mod rectangle;

pub use coordinate::Coordinate;
pub use rectangle::Rectangle;
