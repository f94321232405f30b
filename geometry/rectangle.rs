use super::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Axis-aligned bounding box, used both as an item's extent and as a query window.
///
/// A rectangle is *empty* (the "null" box) when `max_x < min_x`. Constructors normalize
/// their corner inputs so that `min <= max` on both axes; only [`Rectangle::empty`],
/// [`Rectangle::expand_by`] and [`Rectangle::intersection`] ever produce the empty box.
///
/// Coordinates are assumed to be finite. Equality, ordering and hashing are value based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rectangle {
    min: [f64; 2], // [x_min, y_min]
    max: [f64; 2], // [x_max, y_max]
}

impl Rectangle {
    /// Creates a rectangle from two x values and two y values, in any order.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
        let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
        Rectangle {
            min: [min_x, min_y],
            max: [max_x, max_y],
        }
    }

    /// The empty rectangle.
    pub const fn empty() -> Self {
        Rectangle {
            min: [0.0, 0.0],
            max: [-1.0, -1.0],
        }
    }

    /// A zero-extent rectangle located at `point`.
    pub fn from_point(point: Coordinate) -> Self {
        Rectangle::new(point.x, point.x, point.y, point.y)
    }

    /// Rectangle spanning two corner points.
    pub fn from_corners(lower_left: Coordinate, upper_right: Coordinate) -> Self {
        Rectangle::new(lower_left.x, upper_right.x, lower_left.y, upper_right.y)
    }

    pub fn min_x(&self) -> f64 {
        self.min[0]
    }

    pub fn max_x(&self) -> f64 {
        self.max[0]
    }

    pub fn min_y(&self) -> f64 {
        self.min[1]
    }

    pub fn max_y(&self) -> f64 {
        self.max[1]
    }

    pub fn is_empty(&self) -> bool {
        self.max[0] < self.min[0]
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.max[1] - self.min[1]
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    /// Centre point, or `None` for the empty rectangle.
    pub fn centre(&self) -> Option<Coordinate> {
        if self.is_empty() {
            return None;
        }
        Some(Coordinate::new(
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ))
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    /// Whether `(x, y)` lies in the interior or on the boundary.
    pub fn covers_xy(&self, x: f64, y: f64) -> bool {
        if self.is_empty() {
            return false;
        }
        x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1]
    }

    pub fn covers_point(&self, point: Coordinate) -> bool {
        self.covers_xy(point.x, point.y)
    }

    /// Whether `other` lies wholly inside this rectangle, boundary included.
    pub fn covers(&self, other: &Rectangle) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.min[0] >= self.min[0]
            && other.max[0] <= self.max[0]
            && other.min[1] >= self.min[1]
            && other.max[1] <= self.max[1]
    }

    /// Same as [`Rectangle::covers_xy`].
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        self.covers_xy(x, y)
    }

    /// Same as [`Rectangle::covers_point`].
    pub fn contains_point(&self, point: Coordinate) -> bool {
        self.covers_point(point)
    }

    /// Same as [`Rectangle::covers`].
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.covers(other)
    }

    pub fn intersects_xy(&self, x: f64, y: f64) -> bool {
        self.covers_xy(x, y)
    }

    pub fn intersects_point(&self, point: Coordinate) -> bool {
        self.covers_xy(point.x, point.y)
    }

    /// Whether the two rectangles share at least one point. Touching edges count.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        !(other.min[0] > self.max[0]
            || other.max[0] < self.min[0]
            || other.min[1] > self.max[1]
            || other.max[1] < self.min[1])
    }

    /// Alias of [`Rectangle::intersects`].
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.intersects(other)
    }

    /// Euclidean distance between the closest points of the two rectangles.
    ///
    /// Overlapping rectangles are at distance 0. The gap is measured per axis and the
    /// axes are combined only when both are separated.
    pub fn distance(&self, other: &Rectangle) -> f64 {
        if self.is_empty() || other.is_empty() || self.intersects(other) {
            return 0.0;
        }

        let dx = if self.max[0] < other.min[0] {
            other.min[0] - self.max[0]
        } else if self.min[0] > other.max[0] {
            self.min[0] - other.max[0]
        } else {
            0.0
        };

        let dy = if self.max[1] < other.min[1] {
            other.min[1] - self.max[1]
        } else if self.min[1] > other.max[1] {
            self.min[1] - other.max[1]
        } else {
            0.0
        };

        if dx == 0.0 {
            return dy;
        }
        if dy == 0.0 {
            return dx;
        }
        (dx * dx + dy * dy).sqrt()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Inflates by `distance` on every side. Negative values shrink.
    pub fn expand_by_distance(&mut self, distance: f64) {
        self.expand_by(distance, distance);
    }

    /// Inflates by `dx` left and right and by `dy` above and below.
    ///
    /// Shrinking past zero extent on either axis turns the rectangle empty.
    pub fn expand_by(&mut self, dx: f64, dy: f64) {
        if self.is_empty() {
            return;
        }

        self.min[0] -= dx;
        self.max[0] += dx;
        self.min[1] -= dy;
        self.max[1] += dy;

        if self.min[0] > self.max[0] || self.min[1] > self.max[1] {
            self.set_to_null();
        }
    }

    pub fn expand_to_include_xy(&mut self, x: f64, y: f64) {
        if self.is_empty() {
            self.min = [x, y];
            self.max = [x, y];
            return;
        }
        self.min[0] = self.min[0].min(x);
        self.max[0] = self.max[0].max(x);
        self.min[1] = self.min[1].min(y);
        self.max[1] = self.max[1].max(y);
    }

    pub fn expand_to_include_point(&mut self, point: Coordinate) {
        self.expand_to_include_xy(point.x, point.y);
    }

    /// Grows this rectangle so that it covers `other`. An empty `other` is ignored.
    pub fn expand_to_include(&mut self, other: &Rectangle) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.min[0] = self.min[0].min(other.min[0]);
        self.max[0] = self.max[0].max(other.max[0]);
        self.min[1] = self.min[1].min(other.min[1]);
        self.max[1] = self.max[1].max(other.max[1]);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        if self.is_empty() {
            return;
        }
        self.min[0] += dx;
        self.max[0] += dx;
        self.min[1] += dy;
        self.max[1] += dy;
    }

    /// Re-centres the rectangle on `centre` with the given width and height.
    pub fn set_centre(&mut self, centre: Coordinate, width: f64, height: f64) {
        *self = Rectangle::new(
            centre.x - width / 2.0,
            centre.x + width / 2.0,
            centre.y - height / 2.0,
            centre.y + height / 2.0,
        );
    }

    /// Scales width and height by `percentage` percent around the centre.
    ///
    /// `50.0` grows the rectangle by half, `-50.0` shrinks it to half its size. A
    /// percentage of `-100.0` or below leaves the rectangle empty.
    pub fn zoom(&mut self, percentage: f64) {
        let Some(centre) = self.centre() else {
            return;
        };
        let factor = 1.0 + percentage / 100.0;
        if factor < 0.0 {
            self.set_to_null();
            return;
        }
        self.set_centre(centre, self.width() * factor, self.height() * factor);
    }

    // ========================================================================
    // Set operations
    // ========================================================================

    /// The common part of two rectangles, empty if they are disjoint.
    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        if !self.intersects(other) {
            return Rectangle::empty();
        }
        Rectangle::new(
            self.min[0].max(other.min[0]),
            self.max[0].min(other.max[0]),
            self.min[1].max(other.min[1]),
            self.max[1].min(other.max[1]),
        )
    }

    /// The smallest rectangle covering both inputs.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let mut result = *self;
        result.expand_to_include(other);
        result
    }

    pub fn union_point(&self, point: Coordinate) -> Rectangle {
        let mut result = *self;
        result.expand_to_include_point(point);
        result
    }

    fn set_to_null(&mut self) {
        *self = Rectangle::empty();
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Rectangle::empty()
    }
}

impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => true,
            (false, false) => self.min == other.min && self.max == other.max,
            _ => false,
        }
    }
}

impl Eq for Rectangle {}

impl Hash for Rectangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_empty().hash(state);
        if self.is_empty() {
            return;
        }
        for v in [self.min[0], self.max[0], self.min[1], self.max[1]] {
            canonical_bits(v).hash(state);
        }
    }
}

impl PartialOrd for Rectangle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Empty rectangles sort first, then by `min_x`, `min_y`, `max_x`, `max_y`.
impl Ord for Rectangle {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        cmp_coord(self.min[0], other.min[0])
            .then_with(|| cmp_coord(self.min[1], other.min[1]))
            .then_with(|| cmp_coord(self.max[0], other.max[0]))
            .then_with(|| cmp_coord(self.max[1], other.max[1]))
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Rectangle[Null]");
        }
        write!(
            f,
            "Rectangle[{} : {}, {} : {}]",
            self.min[0], self.max[0], self.min[1], self.max[1]
        )
    }
}

fn cmp_coord(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

// -0.0 == 0.0, so both must hash alike
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}
