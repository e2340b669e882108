//! Free list - LIFO stack of released slots
//!
//! Nodes live in their own boxes, independent of arena memory. The most recently released
//! slot is handed out first. A side index of `(chunk serial, offset)` keys answers
//! membership without walking the list.

use std::collections::HashSet;

use crate::allocator::ArenaHandle;

struct FreeListNode {
    slot: ArenaHandle,
    next: Option<Box<FreeListNode>>,
}

pub(crate) struct FreeList {
    head: Option<Box<FreeListNode>>,
    len: usize,
    slots: HashSet<(u64, usize)>,
}

#[inline]
fn slot_key(slot: &ArenaHandle) -> (u64, usize) {
    (slot.serial, slot.offset)
}

impl FreeList {
    pub fn new() -> Self {
        Self {
            head: None,
            len: 0,
            slots: HashSet::new(),
        }
    }

    /// New node becomes the head and points at the former head
    pub fn push(&mut self, slot: ArenaHandle) {
        self.slots.insert(slot_key(&slot));
        let next = self.head.take();
        self.head = Some(Box::new(FreeListNode { slot, next }));
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<ArenaHandle> {
        self.head.take().map(|mut node| {
            self.head = node.next.take();
            self.len -= 1;
            self.slots.remove(&slot_key(&node.slot));
            node.slot
        })
    }

    /// Whether a node holds the same slot, whatever epoch it was handed out under
    ///
    /// Only meaningful for handles of the arena the list serves.
    #[inline]
    pub fn contains(&self, slot: &ArenaHandle) -> bool {
        self.slots.contains(&slot_key(slot))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Free every node iteratively so long lists don't recurse in `Box` drop
    pub fn clear(&mut self) {
        let mut current = self.head.take();
        while let Some(mut node) = current {
            current = node.next.take();
        }
        self.len = 0;
        self.slots.clear();
    }
}

impl Drop for FreeList {
    fn drop(&mut self) {
        self.clear();
    }
}
