//! Slot-Arena FIFO Queue
//!
//! The traversal structure behind the SIEVE engine: an insertion-ordered
//! doubly linked list of keys whose nodes live in a slot arena (a `Vec` of
//! optional nodes plus a free list). Links and external references are
//! [`SlotId`] indices rather than pointers, so a `SlotId` held by the index
//! or by the sweep hand stays valid until that exact node is removed, no
//! matter how many other nodes are inserted or removed around it.
//!
//! Visiting an entry never moves it: insertion order is the only order this
//! queue knows, which is what distinguishes SIEVE traversal from LRU.

extern crate alloc;

use alloc::vec::Vec;

/// Stable index of a node in the queue's slot arena.
///
/// A `SlotId` remains valid until the node it names is removed. Slots are
/// reused, so a stale `SlotId` must never be dereferenced after its node is
/// gone; the engine upholds this by dropping every reference to a node when
/// it evicts or removes the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Insertion-ordered key sequence with stable node indices.
#[derive(Debug)]
pub(crate) struct SieveQueue<K> {
    slots: Vec<Option<Node<K>>>,
    free: Vec<usize>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl<K> SieveQueue<K> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The oldest live node, or `None` when the queue is empty.
    #[inline]
    pub(crate) fn front(&self) -> Option<SlotId> {
        self.head
    }

    fn node(&self, id: SlotId) -> Option<&Node<K>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: SlotId) -> Option<&mut Node<K>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// The key stored at `id`, if the slot is live.
    #[inline]
    pub(crate) fn key(&self, id: SlotId) -> Option<&K> {
        self.node(id).map(|node| &node.key)
    }

    /// The node after `id` in insertion order, or `None` at the tail.
    #[inline]
    pub(crate) fn next(&self, id: SlotId) -> Option<SlotId> {
        self.node(id).and_then(|node| node.next)
    }

    /// Appends `key` at the tail and returns its stable id.
    pub(crate) fn push_back(&mut self, key: K) -> SlotId {
        let node = Node {
            key,
            prev: self.tail,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        let id = SlotId(idx);
        match self.tail {
            Some(tail) => {
                if let Some(tail_node) = self.node_mut(tail) {
                    tail_node.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Unlinks the node at `id`, frees its slot, and returns its key.
    ///
    /// Panics if `id` names a vacant slot: the engine never holds an id for
    /// a node it already removed, so a vacant hit means the queue and index
    /// have diverged.
    pub(crate) fn remove(&mut self, id: SlotId) -> K {
        let node = self
            .slots
            .get_mut(id.0)
            .and_then(|slot| slot.take())
            .expect("sieve queue slot already vacant; queue and index are inconsistent");
        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.node_mut(prev) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = self.node_mut(next) {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
        self.free.push(id.0);
        self.len -= 1;
        node.key
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}

impl<K> Default for SieveQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
