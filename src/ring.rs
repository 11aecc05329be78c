//! # Ring List
//!
//! A circular, sentinel-headed doubly-linked list whose links are indices
//! into a slot vector rather than pointers. Slot [`SENTINEL`] never holds a
//! real record: its `next` is the front of the list and its `prev` the tail.
//!
//! Slots are only ever appended. Unlinked slots are reclaimed in bulk by
//! [`RingList::rollback`], which mirrors a checkpoint rollback on the arena
//! that accounts for them.

use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

/// Index of a slot in a [`RingList`].
pub type NodeId = usize;

/// The slot reserved for the list head.
pub const SENTINEL: NodeId = 0;

/// One slot: a record plus its ring links.
#[derive(Debug, Clone)]
pub struct Node<T> {
    prev: NodeId,
    next: NodeId,
    value: T,
}

#[derive(Debug, Clone)]
pub struct RingList<T> {
    nodes: Vec<Node<T>>,
    len: usize,
}

impl<T: Default> RingList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` records besides the
    /// sentinel, so that inserting up to `capacity` never reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node {
            prev: SENTINEL,
            next: SENTINEL,
            value: T::default(),
        });

        Self { nodes, len: 0 }
    }
}

impl<T: Default> Default for RingList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RingList<T> {
    /// Points the sentinel at itself. Slots already in use stay allocated
    /// but are no longer reachable.
    pub fn init(&mut self) {
        let sentinel = &mut self.nodes[SENTINEL];
        sentinel.prev = SENTINEL;
        sentinel.next = SENTINEL;
        self.len = 0;
    }

    /// Splices `value` in between `at` and its successor and returns the new
    /// slot. Inserting after [`SENTINEL`] pushes a new front; inserting after
    /// the tail appends.
    ///
    /// # Panics
    ///
    /// If `at` is not a slot of this list.
    pub fn insert_after(&mut self, at: NodeId, value: T) -> NodeId {
        let id = self.nodes.len();
        let next = self.nodes[at].next;

        self.nodes.push(Node {
            prev: at,
            next,
            value,
        });
        self.nodes[next].prev = id;
        self.nodes[at].next = id;
        self.len += 1;

        id
    }

    /// Number of linked records, sentinel excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots handed out, sentinel included.
    #[inline]
    pub fn slots(&self) -> usize {
        self.nodes.len()
    }

    pub fn front(&self) -> Option<NodeId> {
        let id = self.nodes[SENTINEL].next;
        (id != SENTINEL).then_some(id)
    }

    pub fn tail(&self) -> Option<NodeId> {
        let id = self.nodes[SENTINEL].prev;
        (id != SENTINEL).then_some(id)
    }

    /// Successor of `id`; the tail's successor is [`SENTINEL`].
    #[inline]
    pub fn next(&self, id: NodeId) -> NodeId {
        self.nodes[id].next
    }

    /// Predecessor of `id`; the front's predecessor is [`SENTINEL`].
    #[inline]
    pub fn prev(&self, id: NodeId) -> NodeId {
        self.nodes[id].prev
    }

    /// Walks the list from the current front to the tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.nodes[SENTINEL].next,
            remaining: self.len,
        }
    }

    /// Drops every slot at index `slots` and above and empties the list.
    ///
    /// Ids of dropped slots are invalid afterwards.
    pub fn rollback(&mut self, slots: usize) {
        self.nodes.truncate(slots.max(1));
        self.init();
    }
}

impl<T> Index<NodeId> for RingList<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        &self.nodes[id].value
    }
}

impl<T> IndexMut<NodeId> for RingList<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id].value
    }
}

impl<'a, T> IntoIterator for &'a RingList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Forward iterator over a [`RingList`], front to tail.
pub struct Iter<'a, T> {
    list: &'a RingList<T>,
    cursor: NodeId,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.cursor == SENTINEL {
            return None;
        }

        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
