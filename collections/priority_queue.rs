//! Binary min-heap.
//!
//! Elements live in a single slot array addressed as an implicit binary tree: the
//! children of slot `i` are `2i + 1` and `2i + 2`. Only the first `size` slots are
//! occupied; trailing slots are cleared as soon as they are vacated so popped elements
//! are not retained.

use crate::config::QueueConfig;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_INITIAL_CAPACITY: usize = 11;

/// Below this many slots the array grows by two slots at a time.
const LINEAR_GROWTH_LIMIT: usize = 64;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The item has no defined order with respect to itself (e.g. a `NaN` key).
    #[error("item cannot be ordered and was not queued")]
    InvalidItem,
}

/// Min-heap ordered by `PartialOrd`. Equal elements come out in unspecified order.
///
/// ```
/// use netroute::PriorityQueue;
///
/// let mut queue = PriorityQueue::new();
/// for item in [5, 3, 8, 1] {
///     queue.push(item).unwrap();
/// }
/// assert_eq!(queue.pop(), Some(1));
/// assert_eq!(queue.peek(), Some(&3));
/// ```
#[derive(Clone)]
pub struct PriorityQueue<T> {
    slots: Vec<Option<T>>,
    size: usize,
}

impl<T: PartialOrd> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialOrd> PriorityQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        PriorityQueue { slots, size: 0 }
    }

    pub fn with_config(config: &QueueConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Adds `item` to the queue.
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidItem`] if `item` does not compare equal to itself, in which
    /// case the queue is left untouched.
    pub fn push(&mut self, item: T) -> Result<(), QueueError> {
        if item.partial_cmp(&item) != Some(Ordering::Equal) {
            return Err(QueueError::InvalidItem);
        }

        if self.size >= self.slots.len() {
            self.grow();
        }
        self.slots[self.size] = Some(item);
        self.sift_up(self.size);
        self.size += 1;
        Ok(())
    }

    /// Removes and returns the smallest element, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }

        self.size -= 1;
        // move the last element into the root slot, leaving the tail slot cleared
        self.slots.swap(0, self.size);
        let min = self.slots[self.size].take();
        if self.size > 0 {
            self.sift_down(0);
        }
        min
    }

    /// The smallest element, or `None` when empty.
    pub fn peek(&self) -> Option<&T> {
        if self.size == 0 {
            return None;
        }
        self.slots[0].as_ref()
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.slots.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            if left >= self.size {
                break;
            }
            let right = left + 1;
            let smaller = if right < self.size && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(smaller, pos) {
                break;
            }
            self.slots.swap(pos, smaller);
            pos = smaller;
        }
    }

    /// Whether the element in slot `a` orders strictly before the one in slot `b`.
    fn less(&self, a: usize, b: usize) -> bool {
        match (&self.slots[a], &self.slots[b]) {
            (Some(x), Some(y)) => x < y,
            _ => false,
        }
    }
}

impl<T> PriorityQueue<T> {
    pub fn len(&self) -> usize {
        self.size
    }

    /// Same as [`PriorityQueue::len`].
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Removes every element, keeping the allocated slots.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.size = 0;
    }

    /// Iterates over the elements in internal heap order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots[..self.size].iter().flatten()
    }

    fn grow(&mut self) {
        let old = self.slots.len();
        let new_capacity = if old < LINEAR_GROWTH_LIMIT {
            old + 2
        } else {
            old + (old >> 1)
        };
        self.slots.resize_with(new_capacity, || None);
    }
}

impl<T: fmt::Debug> fmt::Debug for PriorityQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("size", &self.size)
            .field("capacity", &self.slots.len())
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// `[a, b, c]`, in internal heap order.
impl<T: fmt::Display> fmt::Display for PriorityQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}
