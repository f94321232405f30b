use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Planar coordinate. `x` is the longitude axis, `y` the latitude axis.
#[derive(Debug, Display, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[display(fmt = "({}, {})", x, y)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Coordinate { x, y }
    }

    pub fn longitude(&self) -> f64 {
        self.x
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(xy: [f64; 2]) -> Self {
        Coordinate::new(xy[0], xy[1])
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(coord: geo::Coord<f64>) -> Self {
        Coordinate::new(coord.x, coord.y)
    }
}
