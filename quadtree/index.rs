//! Spatial index facade over the quadtree.

use super::double_bits::DoubleBitsError;
use super::root::Root;
use crate::config::IndexConfig;
use crate::geometry::Rectangle;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndexError {
    #[error("cannot index an empty rectangle")]
    EmptyRectangle,

    #[error("quad key computation failed: {0}")]
    QuadKey(#[from] DoubleBitsError),
}

// ============================================================================
// SpatialIndex trait
// ============================================================================

/// Minimal contract of a rectangle index.
///
/// `query` is a primary filter: it never misses an item whose rectangle intersects the
/// window, but may return items that do not.
pub trait SpatialIndex<T> {
    fn insert(&mut self, rect: Rectangle, item: T) -> Result<(), IndexError>;

    fn query(&self, rect: &Rectangle) -> Vec<&T>;

    fn remove(&mut self, rect: &Rectangle, item: &T) -> bool;
}

// ============================================================================
// QuadtreeIndex
// ============================================================================

/// MX-CIF quadtree index over items of type `T`.
///
/// Zero-width or zero-height rectangles (points and axis-parallel segments) are padded to
/// the smallest non-zero extent seen so far before being stored, which keeps them from
/// being pushed into ever smaller quadrants.
///
/// ```
/// use netroute::{QuadtreeIndex, Rectangle};
///
/// let mut index = QuadtreeIndex::new();
/// index.insert(Rectangle::new(1.0, 2.0, 1.0, 2.0), "a").unwrap();
/// index.insert(Rectangle::new(10.0, 11.0, 10.0, 11.0), "b").unwrap();
///
/// let hits = index.query(&Rectangle::new(0.0, 3.0, 0.0, 3.0));
/// assert!(hits.contains(&&"a"));
/// ```
#[derive(Debug, Clone)]
pub struct QuadtreeIndex<T> {
    root: Root<T>,
    /// Smallest non-zero width or height inserted so far.
    min_extent: f64,
}

impl<T> Default for QuadtreeIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QuadtreeIndex<T> {
    pub const DEFAULT_MIN_EXTENT: f64 = 1.0;

    pub fn new() -> Self {
        Self::with_min_extent(Self::DEFAULT_MIN_EXTENT)
    }

    pub fn with_config(config: &IndexConfig) -> Self {
        Self::with_min_extent(config.initial_min_extent)
    }

    pub fn with_min_extent(min_extent: f64) -> Self {
        QuadtreeIndex {
            root: Root::new(),
            min_extent,
        }
    }

    /// Inserts `item` with extent `rect`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::EmptyRectangle`] for the null rectangle.
    /// - [`IndexError::QuadKey`] when `rect` is too large or not finite.
    pub fn insert(&mut self, rect: Rectangle, item: T) -> Result<(), IndexError> {
        if rect.is_empty() {
            return Err(IndexError::EmptyRectangle);
        }
        self.collect_stats(&rect);
        let padded = Self::ensure_extent(&rect, self.min_extent);
        self.root.insert(&padded, item)?;
        Ok(())
    }

    /// Removes one item equal to `item` that was inserted with `rect`.
    pub fn remove(&mut self, rect: &Rectangle, item: &T) -> bool
    where
        T: PartialEq,
    {
        let padded = Self::ensure_extent(rect, self.min_extent);
        self.root.remove(&padded, item)
    }

    /// Candidate items for `rect`. May contain items that do not intersect it.
    pub fn query(&self, rect: &Rectangle) -> Vec<&T> {
        self.root.query(rect)
    }

    /// Calls `visitor` for each candidate item for `rect`.
    pub fn visit<F: FnMut(&T)>(&self, rect: &Rectangle, mut visitor: F) {
        self.root.visit(rect, &mut visitor);
    }

    pub fn query_all(&self) -> Vec<&T> {
        self.root.query_all()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of items stored.
    pub fn count(&self) -> usize {
        self.root.count()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn min_extent(&self) -> f64 {
        self.min_extent
    }

    /// Drops every item. The running minimum extent is kept.
    pub fn clear(&mut self) {
        self.root = Root::new();
    }

    pub fn root(&self) -> &Root<T> {
        &self.root
    }

    fn collect_stats(&mut self, rect: &Rectangle) {
        let width = rect.width();
        if width < self.min_extent && width > 0.0 {
            self.min_extent = width;
        }

        let height = rect.height();
        if height < self.min_extent && height > 0.0 {
            self.min_extent = height;
        }
    }

    /// Pads a zero-width or zero-height `rect` by `min_extent / 2` on each side of the
    /// degenerate axis. Other rectangles are returned unchanged.
    pub fn ensure_extent(rect: &Rectangle, min_extent: f64) -> Rectangle {
        let (mut min_x, mut max_x) = (rect.min_x(), rect.max_x());
        let (mut min_y, mut max_y) = (rect.min_y(), rect.max_y());

        if min_x != max_x && min_y != max_y {
            return *rect;
        }

        let half = min_extent / 2.0;
        if min_x == max_x {
            min_x -= half;
            max_x += half;
        }
        if min_y == max_y {
            min_y -= half;
            max_y += half;
        }
        Rectangle::new(min_x, max_x, min_y, max_y)
    }
}

impl<T: PartialEq> SpatialIndex<T> for QuadtreeIndex<T> {
    fn insert(&mut self, rect: Rectangle, item: T) -> Result<(), IndexError> {
        QuadtreeIndex::insert(self, rect, item)
    }

    fn query(&self, rect: &Rectangle) -> Vec<&T> {
        QuadtreeIndex::query(self, rect)
    }

    fn remove(&mut self, rect: &Rectangle, item: &T) -> bool {
        QuadtreeIndex::remove(self, rect, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadtree::node::Quadrant;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_ensure_extent_point() {
        let point = Rectangle::new(0.0, 0.0, 0.0, 0.0);
        let padded = QuadtreeIndex::<u32>::ensure_extent(&point, 1.0);
        assert_eq!(padded, Rectangle::new(-0.5, 0.5, -0.5, 0.5));
        assert_eq!(padded.width(), 1.0);
        assert_eq!(padded.height(), 1.0);
    }

    #[test]
    fn test_ensure_extent_segment_and_regular() {
        let segment = Rectangle::new(2.0, 4.0, 3.0, 3.0);
        let padded = QuadtreeIndex::<u32>::ensure_extent(&segment, 0.5);
        assert_eq!(padded, Rectangle::new(2.0, 4.0, 2.75, 3.25));

        let regular = Rectangle::new(2.0, 4.0, 3.0, 5.0);
        assert_eq!(QuadtreeIndex::<u32>::ensure_extent(&regular, 0.5), regular);
    }

    #[test]
    fn test_min_extent_tracks_smallest_side() {
        let mut index = QuadtreeIndex::new();
        assert_eq!(index.min_extent(), 1.0);
        index.insert(Rectangle::new(1.0, 3.0, 1.0, 1.25), 1).unwrap();
        assert_eq!(index.min_extent(), 0.25);
        // 零宽度不会更新统计
        index.insert(Rectangle::new(5.0, 5.0, 5.0, 5.0), 2).unwrap();
        assert_eq!(index.min_extent(), 0.25);
        index.insert(Rectangle::new(5.0, 9.0, 5.0, 9.0), 3).unwrap();
        assert_eq!(index.min_extent(), 0.25);
    }

    #[test]
    fn test_point_at_origin() {
        let mut index = QuadtreeIndex::new();
        index.insert(Rectangle::new(0.0, 0.0, 0.0, 0.0), "p").unwrap();
        let found = index.query(&Rectangle::new(-1.0, 1.0, -1.0, 1.0));
        assert_eq!(found, vec![&"p"]);
        assert!(index.remove(&Rectangle::new(0.0, 0.0, 0.0, 0.0), &"p"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_empty_rectangle_rejected() {
        let mut index = QuadtreeIndex::new();
        assert_eq!(
            index.insert(Rectangle::empty(), 1),
            Err(IndexError::EmptyRectangle)
        );
        assert!(index.is_empty());
    }

    #[test]
    fn test_huge_rectangle_fails_fast() {
        let mut index = QuadtreeIndex::new();
        let result = index.insert(Rectangle::new(1.0, f64::MAX, 1.0, 2.0), 1);
        assert!(matches!(result, Err(IndexError::QuadKey(_))));
        assert!(index.is_empty());
    }

    #[test]
    fn test_visit_and_clear() {
        let mut index = QuadtreeIndex::with_min_extent(0.5);
        index.insert(Rectangle::new(1.0, 2.0, 1.0, 2.0), 1).unwrap();
        index.insert(Rectangle::new(-5.0, -4.0, 1.0, 2.0), 2).unwrap();

        let mut seen = Vec::new();
        index.visit(&Rectangle::new(0.5, 2.5, 0.5, 2.5), |item| seen.push(*item));
        assert_eq!(seen, vec![1]);

        index.clear();
        assert_eq!(index.count(), 0);
        assert_eq!(index.depth(), 1);
        assert_eq!(index.min_extent(), 0.5);
    }

    #[test]
    fn test_through_trait_object() {
        fn fill(index: &mut dyn SpatialIndex<u32>) {
            index.insert(Rectangle::new(1.0, 2.0, 1.0, 2.0), 7).unwrap();
        }
        let mut index: QuadtreeIndex<u32> = QuadtreeIndex::new();
        fill(&mut index);
        assert_eq!(SpatialIndex::query(&index, &Rectangle::new(0.0, 3.0, 0.0, 3.0)), vec![&7]);
        assert!(SpatialIndex::remove(&mut index, &Rectangle::new(1.0, 2.0, 1.0, 2.0), &7));
    }

    /// 随机矩形：约五分之一为点，其余宽高在 (0, 20) 之间，部分跨越坐标轴
    fn random_rects(count: usize, seed: u64) -> Vec<Rectangle> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                let x = rng.gen_range(-500.0..500.0);
                let y = rng.gen_range(-500.0..500.0);
                if i % 5 == 0 {
                    Rectangle::new(x, x, y, y)
                } else {
                    Rectangle::new(x, x + rng.gen_range(0.01..20.0), y, y + rng.gen_range(0.01..20.0))
                }
            })
            .collect()
    }

    #[test]
    fn test_query_has_no_false_negatives() {
        let rects = random_rects(2_000, 7);
        let mut index = QuadtreeIndex::new();
        for (id, rect) in rects.iter().enumerate() {
            index.insert(*rect, id).unwrap();
        }
        assert_eq!(index.count(), rects.len());

        let windows = random_rects(200, 8);
        for window in windows.iter().filter(|w| !w.is_empty()) {
            let found = index.query(window);
            for (id, rect) in rects.iter().enumerate() {
                if window.intersects(rect) {
                    assert!(found.contains(&&id), "{} missing for window {}", rect, window);
                }
            }
        }
    }

    #[test]
    fn test_insert_remove_round_trip() {
        let rects = random_rects(500, 11);
        let mut index = QuadtreeIndex::new();
        for (id, rect) in rects.iter().enumerate() {
            index.insert(*rect, id).unwrap();
        }

        // 删除时的填充尺寸可能小于插入时的，但仍能找到
        for (id, rect) in rects.iter().enumerate().step_by(2) {
            assert!(index.remove(rect, &id), "failed to remove {} {}", id, rect);
            assert!(!index.query(rect).contains(&&id));
        }
        assert_eq!(index.count(), rects.len() / 2);

        for (id, rect) in rects.iter().enumerate().skip(1).step_by(2) {
            assert!(index.remove(rect, &id));
        }
        assert!(index.is_empty());
        assert_eq!(index.node_count(), 1);
    }

    #[test]
    fn test_remove_absent_item() {
        let mut index = QuadtreeIndex::new();
        let rect = Rectangle::new(1.0, 2.0, 1.0, 2.0);
        index.insert(rect, "a").unwrap();
        let nodes = index.node_count();

        assert!(!index.remove(&rect, &"b"));
        assert!(!index.remove(&Rectangle::new(50.0, 60.0, 50.0, 60.0), &"a"));
        assert_eq!(index.count(), 1);
        assert_eq!(index.node_count(), nodes);
    }

    #[test]
    fn test_growth_is_monotonic() {
        let mut index = QuadtreeIndex::new();
        let mut previous: Option<Rectangle> = None;
        let rects = [
            Rectangle::new(0.5, 1.5, 0.5, 1.5),
            Rectangle::new(3.0, 4.0, 3.0, 4.0),
            Rectangle::new(30.0, 31.0, 2.0, 3.0),
            Rectangle::new(1e3, 1e3 + 1.0, 1e3, 1e3 + 1.0),
            Rectangle::new(2.0, 2.5, 2.0, 2.5),
            Rectangle::new(1e9, 1e9 + 1.0, 1e9, 1e9 + 1.0),
        ];
        for (id, rect) in rects.iter().enumerate() {
            index.insert(*rect, id).unwrap();
            let ne = index.root().node().child(Quadrant::NorthEast).unwrap();
            let square = *ne.square().unwrap();
            if let Some(previous) = previous {
                assert!(square.contains(&previous));
            }
            assert!(square.contains(rect));
            previous = Some(square);
        }
    }

    #[test]
    fn test_point_at_origin_is_padded() {
        let mut index = QuadtreeIndex::new();
        index.insert(Rectangle::new(0.0, 0.0, 0.0, 0.0), 1).unwrap();

        let padded = QuadtreeIndex::<i32>::ensure_extent(&Rectangle::new(0.0, 0.0, 0.0, 0.0), 1.0);
        assert_eq!(padded.width(), 1.0);
        assert_eq!(padded.height(), 1.0);
        assert_eq!(padded.centre(), Some(crate::geometry::Coordinate::new(0.0, 0.0)));

        assert_eq!(index.query(&Rectangle::new(-1.0, 1.0, -1.0, 1.0)), vec![&1]);
    }

    #[test]
    fn test_far_insert_grows_child_subtree() {
        let mut index = QuadtreeIndex::new();
        index.insert(Rectangle::new(1.0, 2.0, 1.0, 2.0), "near").unwrap();
        index.insert(Rectangle::new(3.0, 4.0, 0.5, 1.0), "near2").unwrap();

        let far = Rectangle::new(1e9, 1e9 + 1.0, 1e9, 1e9 + 1.0);
        index.insert(far, "far").unwrap();

        let ne = index.root().node().child(Quadrant::NorthEast).unwrap();
        assert!(ne.covers(&far));
        assert!(ne.covers(&Rectangle::new(1.0, 2.0, 1.0, 2.0)));

        let around_far = Rectangle::new(1e9 - 10.0, 1e9 + 10.0, 1e9 - 10.0, 1e9 + 10.0);
        assert_eq!(index.query(&around_far), vec![&"far"]);

        let around_near = Rectangle::new(0.0, 5.0, 0.0, 5.0);
        let found = index.query(&around_near);
        assert!(!found.contains(&&"far"));
        assert!(found.contains(&&"near"));
        assert!(found.contains(&&"near2"));
    }

    #[test]
    fn test_remove_one_of_two_overlapping() {
        let mut index = QuadtreeIndex::new();
        let a = Rectangle::new(1.0, 3.0, 1.0, 3.0);
        let b = Rectangle::new(2.0, 4.0, 2.0, 4.0);
        index.insert(a, "a").unwrap();
        index.insert(b, "b").unwrap();

        assert!(index.remove(&a, &"a"));
        assert_eq!(index.query_all(), vec![&"b"]);
    }

    #[test]
    fn test_straddling_item_found_from_far_window() {
        let mut index = QuadtreeIndex::new();
        let straddling = Rectangle::new(-1.0, 1.0, 5.0, 6.0);
        index.insert(straddling, "s").unwrap();
        index.insert(Rectangle::new(1e6, 1e6 + 1.0, 1e6, 1e6 + 1.0), "far").unwrap();

        assert_eq!(index.root().node().items(), &["s"]);

        // 根节点总会被访问：主过滤结果包含跨轴条目
        let far_window = Rectangle::new(1e6 - 1.0, 1e6 + 2.0, 1e6 - 1.0, 1e6 + 2.0);
        let found = index.query(&far_window);
        assert!(found.contains(&&"s"));
        assert!(found.contains(&&"far"));

        assert!(index.query(&Rectangle::new(0.0, 0.5, 5.5, 5.6)).contains(&&"s"));
    }

    #[test]
    fn test_is_empty_with_root_only_items() {
        let mut index = QuadtreeIndex::new();
        assert!(index.is_empty());

        let rect = Rectangle::new(-1.0, 1.0, -1.0, 1.0);
        index.insert(rect, 1).unwrap();
        assert!(!index.is_empty());
        assert_eq!(index.node_count(), 1);

        assert!(index.remove(&rect, &1));
        assert!(index.is_empty());
    }

    #[test]
    fn test_duplicates_removed_one_at_a_time() {
        let mut index = QuadtreeIndex::new();
        let rect = Rectangle::new(5.0, 6.0, 5.0, 6.0);
        index.insert(rect, 9).unwrap();
        index.insert(rect, 9).unwrap();

        assert!(index.remove(&rect, &9));
        assert_eq!(index.count(), 1);
        assert!(index.remove(&rect, &9));
        assert!(!index.remove(&rect, &9));
    }

    #[test]
    fn test_narrow_rectangle_far_from_origin() {
        let mut index = QuadtreeIndex::new();
        // 相对宽度低于 2^-50，按零宽度处理
        let base = 1e12;
        let narrow = Rectangle::new(base, base + 1e-4, base, base + 1.0);
        index.insert(Rectangle::new(base, base + 2.0, base, base + 2.0), 0).unwrap();
        index.insert(narrow, 1).unwrap();

        let found = index.query(&narrow);
        assert!(found.contains(&&1));
        assert!(index.remove(&narrow, &1));
    }

    #[test]
    fn test_smallest_subnormal_rectangle() {
        let mut index = QuadtreeIndex::new();
        let tiny = f64::from_bits(1);
        let rect = Rectangle::new(0.0, tiny, 0.0, tiny);
        index.insert(rect, 1).unwrap();
        assert_eq!(index.count(), 1);

        assert_eq!(index.query(&rect), vec![&1]);
        assert!(index.remove(&rect, &1));
        assert!(index.is_empty());
        // 空节点全部被剪除
        assert_eq!(index.node_count(), 1);
    }
}
