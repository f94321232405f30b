//! MX-CIF quadtree.
//!
//! Each item is stored in the smallest quadrant that wholly contains its rectangle.
//! Quadrants are power-of-two squares anchored on the grid of their own size (see
//! [`key::QuadKey`]).

pub mod double_bits;
pub mod index;
pub mod interval_size;
pub mod key;
pub mod node;
pub mod root;

pub use double_bits::{DoubleBits, DoubleBitsError};
pub use index::{IndexError, QuadtreeIndex, SpatialIndex};
pub use key::QuadKey;
pub use node::{Node, Quadrant};
pub use root::Root;
