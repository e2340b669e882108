//! Typed recycler - slot size fixed by the element type

use core::marker::PhantomData;
use core::mem;

use bytemuck::Pod;

use super::ArenaManager;
use crate::allocator::{Arena, ArenaHandle};
use crate::error::Result;

/// [`ArenaManager`] whose slot size is `size_of::<T>()`
///
/// Zero-sized `T` is rejected at construction.
pub struct Recycler<T: Pod> {
    manager: ArenaManager,
    _marker: PhantomData<T>,
}

impl<T: Pod> Recycler<T> {
    pub fn new(arena: Arena) -> Result<Self> {
        Ok(Self {
            manager: ArenaManager::new(arena, mem::size_of::<T>())?,
            _marker: PhantomData,
        })
    }

    /// Allocate a slot and store `value` in it
    pub fn allocate(&mut self, value: &T) -> Result<ArenaHandle> {
        let slot = self.manager.allocate()?;
        self.manager.arena_mut().write_value(&slot, value)?;
        Ok(slot)
    }

    /// Allocate a slot holding the all-zero `T`
    pub fn allocate_zeroed(&mut self) -> Result<ArenaHandle> {
        self.manager.allocate()
    }

    pub fn deallocate(&mut self, slot: ArenaHandle) -> Result<()> {
        self.manager.deallocate(slot)
    }

    pub fn get(&self, slot: &ArenaHandle) -> Result<T> {
        self.manager.arena().read_value(slot)
    }

    pub fn set(&mut self, slot: &ArenaHandle, value: &T) -> Result<()> {
        self.manager.arena_mut().write_value(slot, value)
    }

    /// Drop the free list and reset the arena
    pub fn clear(&mut self) {
        self.manager.clear_free_list_and_arena();
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.manager.free_count()
    }

    #[inline]
    pub fn manager(&self) -> &ArenaManager {
        &self.manager
    }
}

impl<T: Pod> core::fmt::Debug for Recycler<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Recycler")
            .field("type", &core::any::type_name::<T>())
            .field("manager", &self.manager)
            .finish()
    }
}
