//! Fixed-size recycler - free list layered over one arena
//!
//! Design: deallocate never touches the arena, it only stacks the slot on the free list.
//! Allocate reuses the most recently freed slot and falls back to bump allocation.
//! Memory goes back to the arena only through `clear_free_list_and_arena`.

mod free_list;
mod typed;


pub use typed::Recycler;

use crate::allocator::{Alignment, Arena, ArenaHandle};
use crate::error::{ArenaError, Result};
use crate::logging::{log_slot_recycled, log_slot_released};
use free_list::FreeList;

/// Allocator for slots of exactly one size, backed by an owned [`Arena`]
pub struct ArenaManager {
    arena: Arena,
    slot_size: usize,
    slot_align: Alignment,
    free_list: FreeList,
}

impl ArenaManager {
    /// Wrap `arena` for slots of `slot_size` bytes
    ///
    /// Slots are aligned to `slot_size` rounded up to a power of two.
    pub fn new(arena: Arena, slot_size: usize) -> Result<Self> {
        if slot_size == 0 {
            return Err(ArenaError::ZeroSizedSlot);
        }
        if slot_size >= arena.chunk_capacity() {
            return Err(ArenaError::SizeExceedsChunk {
                size: slot_size,
                capacity: arena.chunk_capacity(),
            });
        }

        let slot_align = slot_size
            .checked_next_power_of_two()
            .ok_or(ArenaError::InvalidAlignment { align: slot_size })
            .and_then(Alignment::new)?;

        Ok(Self {
            arena,
            slot_size,
            slot_align,
            free_list: FreeList::new(),
        })
    }

    /// Hand out a zero-filled slot, preferring the most recently freed one
    pub fn allocate(&mut self) -> Result<ArenaHandle> {
        while let Some(slot) = self.free_list.pop() {
            // Slots reclaimed behind our back through `arena_mut` are dropped, not reused
            if let Ok(bytes) = self.arena.bytes_mut(&slot) {
                bytes.fill(0);
                log_slot_recycled(self.slot_size, slot.offset());
                return Ok(slot);
            }
        }

        self.arena.set_auto_align(self.slot_align.get())?;
        self.arena.push(self.slot_size)
    }

    /// Return a slot obtained from [`ArenaManager::allocate`] to the free list
    pub fn deallocate(&mut self, slot: ArenaHandle) -> Result<()> {
        if slot.arena_id != self.arena.id() {
            return Err(ArenaError::ForeignHandle);
        }
        if slot.len() != self.slot_size {
            return Err(ArenaError::SizeMismatch {
                expected: self.slot_size,
                found: slot.len(),
            });
        }
        if !self.arena.is_live(&slot) {
            return Err(ArenaError::StaleHandle);
        }
        if self.free_list.contains(&slot) {
            return Err(ArenaError::DoubleFree);
        }

        self.free_list.push(slot);
        log_slot_released(self.slot_size, slot.offset(), self.free_list.len());
        Ok(())
    }

    /// Free every free-list node; the arena keeps its memory
    pub fn clear_free_list(&mut self) {
        self.free_list.clear();
    }

    /// Free every free-list node and reset the arena
    pub fn clear_free_list_and_arena(&mut self) {
        self.clear_free_list();
        self.arena.clear();
    }

    pub fn bytes(&self, slot: &ArenaHandle) -> Result<&[u8]> {
        self.arena.bytes(slot)
    }

    pub fn bytes_mut(&mut self, slot: &ArenaHandle) -> Result<&mut [u8]> {
        self.arena.bytes_mut(slot)
    }

    #[inline]
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    #[inline]
    pub fn slot_alignment(&self) -> Alignment {
        self.slot_align
    }

    /// Number of slots waiting on the free list
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[inline]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }
}

impl core::fmt::Debug for ArenaManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArenaManager")
            .field("arena", &self.arena)
            .field("slot_size", &self.slot_size)
            .field("free_count", &self.free_list.len())
            .finish()
    }
}
