//! The root of the quadtree.
//!
//! The root is centred at the origin and has no square of its own. Items straddling
//! either origin axis are kept on it; every other item goes into one of its four child
//! subtrees, which grow upwards on demand so that any finite rectangle can be indexed.

use super::double_bits::DoubleBitsError;
use super::interval_size::is_zero_width;
use super::node::{subnode_index, Node};
use crate::geometry::Rectangle;
use tracing::{debug, trace};

const ORIGIN_X: f64 = 0.0;
const ORIGIN_Y: f64 = 0.0;

#[derive(Debug, Clone)]
pub struct Root<T> {
    node: Node<T>,
}

impl<T> Default for Root<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Root<T> {
    pub fn new() -> Self {
        Root {
            node: Node::new_root(),
        }
    }

    /// The root node, for read-only traversal.
    pub fn node(&self) -> &Node<T> {
        &self.node
    }

    /// Inserts `item` with extent `rect`.
    ///
    /// # Errors
    ///
    /// Fails when the child subtree would have to grow past the largest representable
    /// quadrant. The tree is left unchanged in that case.
    pub fn insert(&mut self, rect: &Rectangle, item: T) -> Result<(), DoubleBitsError> {
        let Some(quadrant) = subnode_index(rect, ORIGIN_X, ORIGIN_Y) else {
            trace!("{} straddles an origin axis, stored on root", rect);
            self.node.add(item);
            return Ok(());
        };

        let slot = self.node.child_slot_mut(quadrant);
        if !slot.as_deref().is_some_and(|child| child.covers(rect)) {
            // key first: a failure must not detach the current subtree
            let key = Node::expansion_key(slot.as_deref(), rect)?;
            debug!(
                "Growing {:?} quadrant of root to level {} ({})",
                quadrant,
                key.level(),
                key.square()
            );
            let larger = Node::create_expanded(slot.take(), &key);
            *slot = Some(larger);
        }

        if let Some(tree) = slot.as_deref_mut() {
            Self::insert_contained(tree, rect, item);
        }
        Ok(())
    }

    /// Places `item` in a subtree whose square is known to contain `rect`.
    fn insert_contained(tree: &mut Node<T>, rect: &Rectangle, item: T) {
        let degenerate = is_zero_width(rect.min_x(), rect.max_x())
            || is_zero_width(rect.min_y(), rect.max_y());

        if degenerate {
            tree.find_existing_mut(rect).add(item);
        } else {
            let node = tree.get_or_create_node(rect);
            trace!("{} stored at level {:?}", rect, node.level());
            node.add(item);
        }
    }

    pub fn remove(&mut self, rect: &Rectangle, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.node.remove(rect, item)
    }

    pub fn visit<F: FnMut(&T)>(&self, rect: &Rectangle, visitor: &mut F) {
        self.node.visit(rect, visitor);
    }

    pub fn query(&self, rect: &Rectangle) -> Vec<&T> {
        let mut found = Vec::new();
        self.node.collect_overlapping(rect, &mut found);
        found
    }

    pub fn query_all(&self) -> Vec<&T> {
        let mut found = Vec::new();
        self.node.collect_all(&mut found);
        found
    }

    pub fn depth(&self) -> usize {
        self.node.depth()
    }

    pub fn count(&self) -> usize {
        self.node.count()
    }

    pub fn node_count(&self) -> usize {
        self.node.node_count()
    }
}
