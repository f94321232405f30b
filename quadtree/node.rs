//! Quadtree nodes.
//!
//! A single node type serves both roles in the tree:
//!
//! - **quadrant nodes** own a power-of-two square (`square = Some(..)`) at a given level,
//!   and are only visited by searches whose rectangle intersects that square;
//! - the **root** has no square (`square = None`), is centred at the origin, always
//!   matches a search, and is never pruned.
//!
//! Every node stores the items that straddle its centre axes in its own list and owns up
//! to four children. Child slots are numbered as follows:
//!
//! ```text
//!   2 | 3
//!   --+--
//!   0 | 1
//! ```

use super::double_bits::DoubleBitsError;
use super::key::QuadKey;
use crate::geometry::{Coordinate, Rectangle};
use tracing::{debug, warn};

/// Child slot of a node, relative to its centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    SouthWest = 0,
    SouthEast = 1,
    NorthWest = 2,
    NorthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::SouthEast,
        Quadrant::NorthWest,
        Quadrant::NorthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Returns the quadrant around `(centre_x, centre_y)` that wholly contains `rect`, or
/// `None` when `rect` straddles either centre axis.
///
/// A degenerate rectangle lying exactly on the centre matches several quadrants; the last
/// check to succeed wins, which resolves a centre point to [`Quadrant::SouthWest`].
pub fn subnode_index(rect: &Rectangle, centre_x: f64, centre_y: f64) -> Option<Quadrant> {
    let mut quadrant = None;
    if rect.min_x() >= centre_x {
        if rect.min_y() >= centre_y {
            quadrant = Some(Quadrant::NorthEast);
        }
        if rect.max_y() <= centre_y {
            quadrant = Some(Quadrant::SouthEast);
        }
    }
    if rect.max_x() <= centre_x {
        if rect.min_y() >= centre_y {
            quadrant = Some(Quadrant::NorthWest);
        }
        if rect.max_y() <= centre_y {
            quadrant = Some(Quadrant::SouthWest);
        }
    }
    quadrant
}

/// A node of the quadtree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// Square covered by this node; `None` for the root.
    square: Option<Rectangle>,
    /// Side length of `square` is `2^level`. Unused by the root.
    level: i32,
    centre_x: f64,
    centre_y: f64,
    /// Items that cannot be pushed into a single child.
    items: Vec<T>,
    children: [Option<Box<Node<T>>>; 4],
}

impl<T> Node<T> {
    /// The root node: no square, centred at the origin.
    pub fn new_root() -> Self {
        Node {
            square: None,
            level: 0,
            centre_x: 0.0,
            centre_y: 0.0,
            items: Vec::new(),
            children: [None, None, None, None],
        }
    }

    /// A quadrant node covering `square`, whose side is `2^level`.
    pub fn new_quadrant(square: Rectangle, level: i32) -> Self {
        Node {
            square: Some(square),
            level,
            centre_x: (square.min_x() + square.max_x()) / 2.0,
            centre_y: (square.min_y() + square.max_y()) / 2.0,
            items: Vec::new(),
            children: [None, None, None, None],
        }
    }

    /// A quadrant node for the square of `key`.
    pub fn from_key(key: &QuadKey) -> Self {
        Self::new_quadrant(*key.square(), key.level())
    }

    pub fn is_root(&self) -> bool {
        self.square.is_none()
    }

    pub fn square(&self) -> Option<&Rectangle> {
        self.square.as_ref()
    }

    /// Level of a quadrant node, `None` for the root.
    pub fn level(&self) -> Option<i32> {
        self.square.map(|_| self.level)
    }

    pub fn centre(&self) -> Coordinate {
        Coordinate::new(self.centre_x, self.centre_y)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&Node<T>> {
        self.children[quadrant.index()].as_deref()
    }

    pub(crate) fn child_slot_mut(&mut self, quadrant: Quadrant) -> &mut Option<Box<Node<T>>> {
        &mut self.children[quadrant.index()]
    }

    /// Whether this node's square covers `rect`. The root covers nothing by this test.
    pub fn covers(&self, rect: &Rectangle) -> bool {
        self.square.is_some_and(|square| square.contains(rect))
    }

    // ========================================================================
    // Structure
    // ========================================================================

    pub fn add(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    /// A node without items and children must be detached from its parent.
    pub fn is_prunable(&self) -> bool {
        !(self.has_children() || self.has_items())
    }

    /// Levels in this subtree, this node included.
    pub fn depth(&self) -> usize {
        let max_sub_depth = self
            .children
            .iter()
            .flatten()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0);
        max_sub_depth + 1
    }

    /// Items stored in this subtree.
    pub fn count(&self) -> usize {
        let sub_count: usize = self.children.iter().flatten().map(|child| child.count()).sum();
        sub_count + self.items.len()
    }

    /// Nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        let sub_count: usize = self
            .children
            .iter()
            .flatten()
            .map(|child| child.node_count())
            .sum();
        sub_count + 1
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Whether a search for `rect` must look at this node at all.
    ///
    /// The root always matches, since straddling items live on it whatever the window.
    pub fn is_search_match(&self, rect: &Rectangle) -> bool {
        match &self.square {
            Some(square) => square.intersects(rect),
            None => true,
        }
    }

    /// Calls `visitor` for every item in nodes whose square matches `rect`.
    ///
    /// This is a primary filter: visited items may not intersect `rect` themselves.
    pub fn visit<F: FnMut(&T)>(&self, rect: &Rectangle, visitor: &mut F) {
        if !self.is_search_match(rect) {
            return;
        }

        // items here may straddle the centre, so they are all candidates
        for item in &self.items {
            visitor(item);
        }

        for child in self.children.iter().flatten() {
            child.visit(rect, visitor);
        }
    }

    /// Collects into `out` every item in nodes whose square matches `rect`.
    pub fn collect_overlapping<'a>(&'a self, rect: &Rectangle, out: &mut Vec<&'a T>) {
        if !self.is_search_match(rect) {
            return;
        }

        out.extend(self.items.iter());
        for child in self.children.iter().flatten() {
            child.collect_overlapping(rect, out);
        }
    }

    /// Collects every item of the subtree, own items first and then children in slot order.
    pub fn collect_all<'a>(&'a self, out: &mut Vec<&'a T>) {
        out.extend(self.items.iter());
        for child in self.children.iter().flatten() {
            child.collect_all(out);
        }
    }

    /// Removes one occurrence of `item` from the subtree, looking only in nodes that match
    /// `rect`. Children are tried first; a child left empty by the removal is detached.
    ///
    /// Returns `true` if an item was removed.
    pub fn remove(&mut self, rect: &Rectangle, item: &T) -> bool
    where
        T: PartialEq,
    {
        if !self.is_search_match(rect) {
            return false;
        }

        for slot in self.children.iter_mut() {
            let Some(child) = slot.as_deref_mut() else {
                continue;
            };
            if child.remove(rect, item) {
                if child.is_prunable() {
                    debug!(
                        "Pruning empty quadrant at level {} ({:?})",
                        child.level,
                        child.square
                    );
                    *slot = None;
                }
                return true;
            }
        }

        // not found lower down, try this node's own list
        match self.items.iter().position(|candidate| candidate == item) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Descent and growth
    // ========================================================================

    /// Returns the deepest node containing `rect`, creating the quadrants on the way.
    ///
    /// Must not be used for zero-extent rectangles: those fit in ever smaller quadrants
    /// and the descent would only end at the smallest representable square.
    pub fn get_or_create_node(&mut self, rect: &Rectangle) -> &mut Node<T> {
        let Some(quadrant) = subnode_index(rect, self.centre_x, self.centre_y) else {
            return self;
        };
        let Some(square) = self.square else {
            // the root has no square to split; its children come from `create_expanded`
            return self;
        };
        if !self.is_splittable(&square) {
            return self;
        }
        let level = self.level;
        let (centre_x, centre_y) = (self.centre_x, self.centre_y);

        self.children[quadrant.index()]
            .get_or_insert_with(|| {
                Box::new(Self::create_subnode(&square, centre_x, centre_y, level, quadrant))
            })
            .get_or_create_node(rect)
    }

    /// Returns the deepest *existing* node containing `rect`. Never creates nodes.
    pub fn find_existing(&self, rect: &Rectangle) -> &Node<T> {
        let Some(quadrant) = subnode_index(rect, self.centre_x, self.centre_y) else {
            return self;
        };
        match self.children[quadrant.index()].as_deref() {
            Some(child) => child.find_existing(rect),
            None => self,
        }
    }

    /// Mutable counterpart of [`Node::find_existing`].
    pub fn find_existing_mut(&mut self, rect: &Rectangle) -> &mut Node<T> {
        let Some(quadrant) = subnode_index(rect, self.centre_x, self.centre_y) else {
            return self;
        };
        match self.children[quadrant.index()] {
            Some(ref mut child) => child.find_existing_mut(rect),
            None => self,
        }
    }

    /// Attaches an existing subtree below this node.
    ///
    /// A subtree one level down becomes a direct child; a deeper one is wrapped in freshly
    /// created intermediate quadrants.
    pub fn insert_child_subtree(&mut self, node: Box<Node<T>>) {
        let (Some(square), Some(child_square)) = (self.square, node.square) else {
            warn!("Cannot attach a subtree without a square, keeping its items here");
            node.drain_into(&mut self.items);
            return;
        };

        let quadrant = match subnode_index(&child_square, self.centre_x, self.centre_y) {
            Some(quadrant) if node.level < self.level => quadrant,
            _ => {
                warn!(
                    "Subtree {} does not fit a quadrant of {}, keeping its items here",
                    child_square, square
                );
                node.drain_into(&mut self.items);
                return;
            }
        };

        if node.level == self.level - 1 {
            self.children[quadrant.index()] = Some(node);
        } else {
            let mut child = Box::new(Self::create_subnode(
                &square,
                self.centre_x,
                self.centre_y,
                self.level,
                quadrant,
            ));
            child.insert_child_subtree(node);
            self.children[quadrant.index()] = Some(child);
        }
    }

    /// Key of the smallest quadrant covering both `rect` and `existing`'s square.
    ///
    /// # Errors
    ///
    /// Fails when no representable power-of-two square covers the union.
    pub fn expansion_key(
        existing: Option<&Node<T>>,
        rect: &Rectangle,
    ) -> Result<QuadKey, DoubleBitsError> {
        let mut cover = *rect;
        if let Some(square) = existing.and_then(Node::square) {
            cover.expand_to_include(square);
        }
        QuadKey::compute(&cover)
    }

    /// Builds the quadrant for `key` and re-parents `existing` beneath it.
    ///
    /// `key` must come from [`Node::expansion_key`] for the same `existing` node.
    pub fn create_expanded(existing: Option<Box<Node<T>>>, key: &QuadKey) -> Box<Node<T>> {
        let mut larger = Box::new(Self::from_key(key));
        if let Some(node) = existing {
            larger.insert_child_subtree(node);
        }
        larger
    }

    fn create_subnode(
        square: &Rectangle,
        centre_x: f64,
        centre_y: f64,
        level: i32,
        quadrant: Quadrant,
    ) -> Node<T> {
        let (min_x, max_x, min_y, max_y) = match quadrant {
            Quadrant::SouthWest => (square.min_x(), centre_x, square.min_y(), centre_y),
            Quadrant::SouthEast => (centre_x, square.max_x(), square.min_y(), centre_y),
            Quadrant::NorthWest => (square.min_x(), centre_x, centre_y, square.max_y()),
            Quadrant::NorthEast => (centre_x, square.max_x(), centre_y, square.max_y()),
        };
        Node::new_quadrant(Rectangle::new(min_x, max_x, min_y, max_y), level - 1)
    }

    /// Whether the centre lies strictly inside `square`, so that every quadrant is smaller.
    ///
    /// Fails for the tiniest subnormal squares, where the midpoint rounds onto an edge.
    fn is_splittable(&self, square: &Rectangle) -> bool {
        square.min_x() < self.centre_x
            && self.centre_x < square.max_x()
            && square.min_y() < self.centre_y
            && self.centre_y < square.max_y()
    }

    fn drain_into(self: Box<Self>, out: &mut Vec<T>) {
        let node = *self;
        out.extend(node.items);
        for child in node.children.into_iter().flatten() {
            child.drain_into(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrant(min_x: f64, min_y: f64, level: i32) -> Node<u32> {
        let size = 2f64.powi(level);
        Node::new_quadrant(Rectangle::new(min_x, min_x + size, min_y, min_y + size), level)
    }

    #[test]
    fn test_subnode_index() {
        let q = |x1, x2, y1, y2| subnode_index(&Rectangle::new(x1, x2, y1, y2), 0.0, 0.0);
        assert_eq!(q(1.0, 2.0, 1.0, 2.0), Some(Quadrant::NorthEast));
        assert_eq!(q(1.0, 2.0, -2.0, -1.0), Some(Quadrant::SouthEast));
        assert_eq!(q(-2.0, -1.0, 1.0, 2.0), Some(Quadrant::NorthWest));
        assert_eq!(q(-2.0, -1.0, -2.0, -1.0), Some(Quadrant::SouthWest));
        // 跨越坐标轴
        assert_eq!(q(-1.0, 1.0, 5.0, 6.0), None);
        assert_eq!(q(5.0, 6.0, -1.0, 1.0), None);
        // 边界上的矩形
        assert_eq!(q(0.0, 1.0, 0.0, 1.0), Some(Quadrant::NorthEast));
        assert_eq!(q(-1.0, 0.0, -1.0, 0.0), Some(Quadrant::SouthWest));
    }

    #[test]
    fn test_subnode_index_centre_point_tie_break() {
        // 恰好位于中心的点匹配全部四个象限，最后一个判断胜出
        let point = Rectangle::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(subnode_index(&point, 0.0, 0.0), Some(Quadrant::SouthWest));

        // 位于 x 轴上、y > 0 的线段：NorthEast 被 NorthWest 覆盖
        let on_axis = Rectangle::new(0.0, 0.0, 1.0, 2.0);
        assert_eq!(subnode_index(&on_axis, 0.0, 0.0), Some(Quadrant::NorthWest));
    }

    #[test]
    fn test_quadrant_node_geometry() {
        let node = quadrant(0.0, 0.0, 3);
        assert_eq!(node.level(), Some(3));
        assert_eq!(node.centre(), Coordinate::new(4.0, 4.0));
        assert!(!node.is_root());
        assert!(node.is_prunable());

        let root: Node<u32> = Node::new_root();
        assert!(root.is_root());
        assert_eq!(root.level(), None);
        assert!(root.is_search_match(&Rectangle::new(1e9, 1e9 + 1.0, 0.0, 1.0)));
        assert!(!root.covers(&Rectangle::new(0.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_get_or_create_node_descends() {
        let mut node = quadrant(0.0, 0.0, 3);
        let rect = Rectangle::new(0.5, 1.5, 0.5, 1.5);
        let target = node.get_or_create_node(&rect);
        // [0, 2] 是包含 rect 的最小象限 (rect 跨越 1.0)
        assert_eq!(target.square(), Some(&Rectangle::new(0.0, 2.0, 0.0, 2.0)));
        assert_eq!(target.level(), Some(1));
        target.add(7);

        assert_eq!(node.depth(), 3);
        assert_eq!(node.node_count(), 3);
        assert_eq!(node.count(), 1);
        let sw = node.child(Quadrant::SouthWest).unwrap();
        assert_eq!(sw.square(), Some(&Rectangle::new(0.0, 4.0, 0.0, 4.0)));
    }

    #[test]
    fn test_get_or_create_node_straddling_stays() {
        let mut node = quadrant(0.0, 0.0, 3);
        let rect = Rectangle::new(3.0, 5.0, 1.0, 2.0);
        let target = node.get_or_create_node(&rect);
        assert_eq!(target.level(), Some(3));
        assert!(!node.has_children());
    }

    #[test]
    fn test_find_existing_never_creates() {
        let mut node = quadrant(0.0, 0.0, 3);
        node.get_or_create_node(&Rectangle::new(0.5, 1.5, 0.5, 1.5)).add(1);

        let point = Rectangle::new(0.25, 0.25, 0.25, 0.25);
        let found = node.find_existing(&point);
        assert_eq!(found.level(), Some(1));
        assert_eq!(node.node_count(), 3);

        node.find_existing_mut(&point).add(2);
        assert_eq!(node.node_count(), 3);
        assert_eq!(node.find_existing(&point).items(), &[1, 2]);

        // 不在已有子树中的点停在当前节点
        let far = Rectangle::new(7.0, 7.0, 7.0, 7.0);
        node.find_existing_mut(&far).add(3);
        assert_eq!(node.items(), &[3]);
        assert_eq!(node.node_count(), 3);
    }

    #[test]
    fn test_get_or_create_node_stops_at_smallest_square() {
        let tiny = f64::from_bits(1);
        let mut node = quadrant(0.0, 0.0, 0);
        let rect = Rectangle::new(0.0, tiny, 0.0, tiny);
        let target = node.get_or_create_node(&rect);
        assert_eq!(target.square(), Some(&rect));
        target.add(1);

        assert_eq!(node.count(), 1);
        assert!(node.depth() > 1000);
    }

    #[test]
    fn test_visit_filters_by_square() {
        let mut node = quadrant(0.0, 0.0, 3);
        node.get_or_create_node(&Rectangle::new(0.5, 1.5, 0.5, 1.5)).add(1);
        node.get_or_create_node(&Rectangle::new(6.5, 7.5, 6.5, 7.5)).add(2);
        node.add(3);

        let mut seen = Vec::new();
        node.visit(&Rectangle::new(5.0, 6.0, 5.0, 6.0), &mut |item| seen.push(*item));
        seen.sort();
        assert_eq!(seen, vec![2, 3]);

        let mut out = Vec::new();
        node.collect_overlapping(&Rectangle::new(20.0, 21.0, 20.0, 21.0), &mut out);
        assert!(out.is_empty());

        let mut all = Vec::new();
        node.collect_all(&mut all);
        assert_eq!(all.len(), 3);
        assert_eq!(*all[0], 3);
    }

    #[test]
    fn test_remove_prunes_empty_children() {
        let mut node = quadrant(0.0, 0.0, 3);
        let rect = Rectangle::new(0.5, 1.5, 0.5, 1.5);
        node.get_or_create_node(&rect).add(1);
        assert_eq!(node.node_count(), 3);

        assert!(!node.remove(&rect, &99));
        assert!(node.remove(&rect, &1));
        assert_eq!(node.node_count(), 1);
        assert!(!node.has_children());
        assert!(!node.remove(&rect, &1));
    }

    #[test]
    fn test_remove_first_duplicate_only() {
        let mut node = quadrant(0.0, 0.0, 3);
        let rect = Rectangle::new(3.0, 5.0, 3.0, 5.0);
        node.add(4);
        node.add(4);
        assert!(node.remove(&rect, &4));
        assert_eq!(node.items(), &[4]);
    }

    #[test]
    fn test_insert_child_subtree_direct_and_nested() {
        let mut parent = quadrant(0.0, 0.0, 3);
        parent.insert_child_subtree(Box::new(quadrant(4.0, 4.0, 2)));
        assert!(parent.child(Quadrant::NorthEast).is_some());
        assert_eq!(parent.node_count(), 2);

        let mut parent = quadrant(0.0, 0.0, 3);
        let mut deep = quadrant(6.0, 0.0, 1);
        deep.add(5);
        parent.insert_child_subtree(Box::new(deep));
        // 中间层 [4, 8] x [0, 4] 被创建
        let se = parent.child(Quadrant::SouthEast).unwrap();
        assert_eq!(se.square(), Some(&Rectangle::new(4.0, 8.0, 0.0, 4.0)));
        assert_eq!(se.level(), Some(2));
        assert_eq!(parent.depth(), 3);
        assert_eq!(parent.count(), 1);
    }

    #[test]
    fn test_insert_child_subtree_misfit_keeps_items() {
        let mut parent = quadrant(0.0, 0.0, 3);
        let mut same_level = quadrant(0.0, 0.0, 3);
        same_level.add(1);
        same_level.get_or_create_node(&Rectangle::new(0.5, 1.5, 0.5, 1.5)).add(2);
        parent.insert_child_subtree(Box::new(same_level));
        assert!(!parent.has_children());
        assert_eq!(parent.items(), &[1, 2]);
    }

    #[test]
    fn test_create_expanded_wraps_existing() {
        let mut existing = Box::new(quadrant(0.0, 0.0, 1));
        existing.add(1);
        let rect = Rectangle::new(10.0, 11.0, 10.0, 11.0);

        let key = Node::expansion_key(Some(&*existing), &rect).unwrap();
        let larger = Node::create_expanded(Some(existing), &key);
        assert_eq!(larger.square(), Some(&Rectangle::new(0.0, 16.0, 0.0, 16.0)));
        assert!(larger.covers(&rect));
        assert_eq!(larger.count(), 1);
        assert!(larger.covers(&Rectangle::new(0.0, 2.0, 0.0, 2.0)));

        let fresh: Box<Node<u32>> =
            Node::create_expanded(None, &Node::<u32>::expansion_key(None, &rect).unwrap());
        assert!(fresh.covers(&rect));
        assert_eq!(fresh.count(), 0);
    }
}
