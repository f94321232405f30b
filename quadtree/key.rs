//! Quad keys: canonical power-of-two squares enclosing a rectangle.

use super::double_bits::{DoubleBits, DoubleBitsError};
use crate::geometry::{Coordinate, Rectangle};

/// The smallest square of side `2^level`, anchored on the `2^level` grid, that contains a
/// given rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadKey {
    anchor: Coordinate,
    level: i32,
    square: Rectangle,
}

impl QuadKey {
    /// Computes the key of `rect`.
    ///
    /// Starts from [`QuadKey::compute_level`] and raises the level until the anchored
    /// square covers `rect`: flooring the anchor can leave the first estimate short of the
    /// rectangle's far edge.
    ///
    /// # Errors
    ///
    /// [`DoubleBitsError::ExponentOutOfRange`] when no representable square covers
    /// `rect`, which is also how non-finite input ends.
    pub fn compute(rect: &Rectangle) -> Result<Self, DoubleBitsError> {
        let mut level = Self::compute_level(rect);
        loop {
            let key = Self::at_level(level, rect)?;
            if key.square.contains(rect) {
                return Ok(key);
            }
            level += 1;
        }
    }

    /// First estimate of the key level: one above the exponent of the larger side.
    pub fn compute_level(rect: &Rectangle) -> i32 {
        let d_max = rect.width().max(rect.height());
        DoubleBits::exponent_of(d_max) + 1
    }

    fn at_level(level: i32, rect: &Rectangle) -> Result<Self, DoubleBitsError> {
        let size = DoubleBits::power_of_two(level)?;
        let anchor = Coordinate::new(
            (rect.min_x() / size).floor() * size,
            (rect.min_y() / size).floor() * size,
        );
        let square = Rectangle::new(anchor.x, anchor.x + size, anchor.y, anchor.y + size);
        Ok(QuadKey {
            anchor,
            level,
            square,
        })
    }

    /// Lower-left corner of the square.
    pub fn anchor(&self) -> Coordinate {
        self.anchor
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn square(&self) -> &Rectangle {
        &self.square
    }

    pub fn centre(&self) -> Coordinate {
        Coordinate::new(
            (self.square.min_x() + self.square.max_x()) / 2.0,
            (self.square.min_y() + self.square.max_y()) / 2.0,
        )
    }
}
