//! Eviction List Module
//!
//! Intrusive doubly linked list ordered by recency, with nodes stored in an
//! arena and linked by `NodeId` handle.
//!
//! - Head = most recently used
//! - Tail = least recently used
//!
//! There is no search: callers find nodes through their own key index and
//! pass the handle in.

use crate::cache::{Node, NodeId};

// == Eviction List ==
/// Recency-ordered list owning the node arena.
#[derive(Debug, Default)]
pub struct EvictionList {
    /// Node slots; `None` marks a free slot
    slots: Vec<Option<Node>>,
    /// Free slot indices available for reuse
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    /// Number of linked nodes
    len: usize,
}

impl EvictionList {
    // == Constructor ==
    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Alloc ==
    /// Stores `node` in a free slot and returns its handle. The node is not
    /// linked until passed to `add_to_head`.
    pub fn alloc(&mut self, mut node: Node) -> NodeId {
        node.prev = None;
        node.next = None;

        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                NodeId(idx)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    // == Release ==
    /// Frees the slot behind `id` and hands the node back.
    ///
    /// The node must already be unlinked.
    pub fn release(&mut self, id: NodeId) -> Option<Node> {
        debug_assert!(!self.is_linked(id), "released node is still linked");
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(node)
    }

    // == Add To Head ==
    /// Links an unlinked node in front of the current head.
    pub fn add_to_head(&mut self, id: NodeId) {
        debug_assert!(!self.is_linked(id), "node is already linked");

        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        } else {
            return;
        }

        if let Some(head_id) = old_head {
            if let Some(head) = self.node_mut(head_id) {
                head.prev = Some(id);
            }
        }

        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
        self.len += 1;
    }

    // == Remove ==
    /// Splices a linked node out of the list and clears its links.
    pub fn remove(&mut self, id: NodeId) {
        debug_assert!(self.is_linked(id), "node is not linked");

        let (prev, next) = match self.node(id) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.node_mut(prev_id) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = self.node_mut(next_id) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
        self.len -= 1;
    }

    // == Accessors ==
    /// Returns the node behind `id`, if the slot is occupied.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access to the node behind `id`.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Most recently used node.
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Least recently used node.
    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A node is linked if it has a neighbour or is the sole head.
    fn is_linked(&self, id: NodeId) -> bool {
        match self.node(id) {
            Some(node) => !node.is_unlinked() || self.head == Some(id),
            None => false,
        }
    }

    /// Walks head to tail. Used to check structural invariants in tests.
    #[cfg(test)]
    pub(crate) fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(id) = cursor {
            // A cycle would walk past the linked count.
            assert!(out.len() < self.slots.len(), "cycle detected in eviction list");
            out.push(id);
            cursor = self.node(id).and_then(|n| n.next);
        }
        out
    }

    /// Panics if any structural invariant is broken.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let ids = self.ids();
        assert_eq!(ids.len(), self.len, "linked count mismatch");

        match (self.head, self.tail) {
            (None, None) => assert!(ids.is_empty()),
            (Some(head), Some(tail)) => {
                assert_eq!(self.node(head).and_then(|n| n.prev), None, "head.prev set");
                assert_eq!(self.node(tail).and_then(|n| n.next), None, "tail.next set");
                assert_eq!(ids.last().copied(), Some(tail), "tail is not the last node");
            }
            _ => panic!("head and tail disagree on emptiness"),
        }

        for pair in ids.windows(2) {
            assert_eq!(
                self.node(pair[1]).and_then(|n| n.prev),
                Some(pair[0]),
                "broken back link"
            );
        }

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "node linked twice");
    }
}
