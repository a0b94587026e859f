//! Cache Set with an LRU-ordered line list.
//!
//! Each set owns its resident lines in a fixed-capacity arena and links them
//! into a doubly-linked list by [`LineId`] handles, ordered from MRU (head) to
//! LRU (tail). Handles are small integers, so no line is ever aliased.
//!
//! ```text
//!   slots (Vec<Option<Node>>, capacity = associativity)
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ LineId │ Node { line, prev, next }                    │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ 0      │ { tag: 7, prev: Some(2), next: None }        │
//!   │ 1      │ (free)                                       │
//!   │ 2      │ { tag: 3, prev: None,    next: Some(0) }     │
//!   └────────┴──────────────────────────────────────────────┘
//!
//!   head ─► [2] ◄──► [0] ◄── tail
//! ```
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `insert_at_head()`, `remove()`, `promote()`, `evict_lru()`: O(1)
//!   - `find()`: O(W) where W is the associativity
//! - **Space Complexity:** O(W) per set, allocated once

use serde::Serialize;

/// Handle to a line resident in a [`CacheSet`].
///
/// Valid until the line is removed from its set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(usize);

impl LineId {
    /// Arena slot this handle refers to.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A resident cache line: tag and dirty bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheLine {
    /// Block tag.
    pub tag: u64,
    /// Set when the line holds data not yet reflected in the backing store.
    pub dirty: bool,
}

impl CacheLine {
    /// Creates a line with the given tag and dirty bit.
    pub const fn new(tag: u64, dirty: bool) -> Self {
        Self { tag, dirty }
    }
}

#[derive(Debug, Clone)]
struct Node {
    line: CacheLine,
    prev: Option<LineId>,
    next: Option<LineId>,
}

/// One set of a set-associative cache.
///
/// `occupancy()` always equals the number of linked lines and never exceeds
/// the capacity given at construction.
#[derive(Debug, Clone)]
pub struct CacheSet {
    slots: Vec<Option<Node>>,
    free: Vec<LineId>,
    head: Option<LineId>,
    tail: Option<LineId>,
    occupancy: usize,
}

impl CacheSet {
    /// Creates an empty set with room for `ways` lines.
    pub fn with_capacity(ways: usize) -> Self {
        Self {
            slots: vec![None; ways],
            free: (0..ways).rev().map(LineId).collect(),
            head: None,
            tail: None,
            occupancy: 0,
        }
    }

    /// Maximum number of resident lines.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current number of resident lines.
    pub const fn occupancy(&self) -> usize {
        self.occupancy
    }

    /// Returns `true` if no line is resident.
    pub const fn is_empty(&self) -> bool {
        self.occupancy == 0
    }

    /// Returns `true` if every way is occupied.
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Handle of the most-recently-used line.
    pub const fn mru(&self) -> Option<LineId> {
        self.head
    }

    /// Handle of the least-recently-used line.
    pub const fn lru(&self) -> Option<LineId> {
        self.tail
    }

    /// Returns the line behind `id`, if resident.
    pub fn get(&self, id: LineId) -> Option<&CacheLine> {
        self.node(id).map(|node| &node.line)
    }

    /// Returns the line behind `id` mutably, if resident.
    pub fn get_mut(&mut self, id: LineId) -> Option<&mut CacheLine> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(|node| &mut node.line)
    }

    /// Scans from MRU to LRU for a line holding `tag`.
    pub fn find(&self, tag: u64) -> Option<LineId> {
        self.iter_ids()
            .find(|&id| self.get(id).is_some_and(|line| line.tag == tag))
    }

    /// Inserts a line at the MRU end.
    ///
    /// Returns `None` without modifying the set when it is already full.
    pub fn insert_at_head(&mut self, line: CacheLine) -> Option<LineId> {
        let id = self.free.pop()?;
        self.slots[id.0] = Some(Node {
            line,
            prev: None,
            next: None,
        });
        self.attach_front(id);
        self.occupancy += 1;
        Some(id)
    }

    /// Unlinks the line behind `id` from any position and frees its slot.
    pub fn remove(&mut self, id: LineId) -> Option<CacheLine> {
        self.detach(id)?;
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id);
        self.occupancy -= 1;
        Some(node.line)
    }

    /// Moves a resident line to the MRU end.
    ///
    /// Returns `false` if `id` is not resident.
    pub fn promote(&mut self, id: LineId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        let _ = self.detach(id);
        self.attach_front(id);
        true
    }

    /// Removes and returns the LRU line.
    pub fn evict_lru(&mut self) -> Option<CacheLine> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Iterates over line handles from MRU to LRU.
    pub fn iter_ids(&self) -> LineIdIter<'_> {
        LineIdIter {
            set: self,
            current: self.head,
        }
    }

    /// Iterates over lines from MRU to LRU.
    pub fn iter(&self) -> impl Iterator<Item = &CacheLine> + '_ {
        self.iter_ids().filter_map(|id| self.get(id))
    }

    /// Iterates mutably over resident lines in slot order.
    pub fn lines_mut(&mut self) -> impl Iterator<Item = &mut CacheLine> + '_ {
        self.slots.iter_mut().flatten().map(|node| &mut node.line)
    }

    /// Checks list structure against occupancy and capacity.
    ///
    /// # Panics
    ///
    /// Panics if the links, occupancy, free list, or tag uniqueness are inconsistent.
    #[doc(hidden)]
    pub fn debug_validate_invariants(&self) {
        let mut forward = Vec::with_capacity(self.occupancy);
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.node(id);
            assert!(node.is_some(), "linked handle {id:?} has no node");
            let Some(node) = node else { break };
            assert_eq!(node.prev, prev, "broken back link at {id:?}");
            forward.push(id);
            assert!(forward.len() <= self.capacity(), "cycle in line list");
            prev = current;
            current = node.next;
        }
        assert_eq!(self.tail, prev, "tail does not match last linked line");
        assert_eq!(forward.len(), self.occupancy, "occupancy != list length");
        assert!(self.occupancy <= self.capacity(), "occupancy exceeds capacity");
        assert_eq!(
            self.free.len() + self.occupancy,
            self.capacity(),
            "free list out of step with occupancy"
        );

        let mut tags: Vec<u64> = self.iter().map(|line| line.tag).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), self.occupancy, "duplicate resident tags");
    }

    fn node(&self, id: LineId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: LineId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn attach_front(&mut self, id: LineId) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(node) = self.node_mut(head) {
                    node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn detach(&mut self, id: LineId) -> Option<()> {
        let (prev, next) = {
            let node = self.node(id)?;
            (node.prev, node.next)
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
        Some(())
    }
}

/// Iterator over line handles of a [`CacheSet`], MRU first.
#[derive(Debug)]
pub struct LineIdIter<'a> {
    set: &'a CacheSet,
    current: Option<LineId>,
}

impl Iterator for LineIdIter<'_> {
    type Item = LineId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.set.node(id).and_then(|node| node.next);
        Some(id)
    }
}
