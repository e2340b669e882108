//! Chunk - one fixed-capacity block of raw memory
//!
//! Design: chunks are acquired zeroed from the global allocator and aligned to the platform
//! maximum, so offsets aligned relative to the chunk base are aligned in absolute terms too.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use core::ptr::NonNull;

use crate::allocator::align::Alignment;
use crate::error::{ArenaError, Result};
use crate::logging::log_allocation_failure;

/// Chunk metadata - owns one allocation of `capacity` bytes
pub struct Chunk {
    start: NonNull<u8>,
    layout: Layout,
    serial: u64,
    /// Reclaims recorded so far
    epoch: usize,
    /// `(epoch, top)` of the reclaims that still bound some older region; `top` strictly
    /// increases from bottom to top, so the stack never outgrows the chunk capacity
    reclaims: Vec<(usize, usize)>,
}

impl Chunk {
    /// Allocate a new chunk from the global allocator
    pub fn new(capacity: usize, serial: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(ArenaError::InvalidCapacity);
        }

        let layout = Layout::from_size_align(capacity, Alignment::MAX.get())
            .map_err(|_| ArenaError::AllocationFailed { size: capacity })?;

        // Zeroed so that bytes handed out by `push_no_zero` are never uninitialized.
        let start = unsafe { alloc_zeroed(layout) };
        let start = match NonNull::new(start) {
            Some(start) => start,
            None => {
                log_allocation_failure(capacity);
                return Err(ArenaError::AllocationFailed { size: capacity });
            }
        };

        Ok(Self {
            start,
            layout,
            serial,
            epoch: 0,
            reclaims: Vec::new(),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    #[inline]
    pub fn base(&self) -> *const u8 {
        self.start.as_ptr()
    }

    /// Number of reclaims recorded so far; handles store this as their epoch
    #[inline]
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Record that everything at or above `top` was given back
    ///
    /// Older entries at or above `top` are dropped: any region they would reject is rejected
    /// by this reclaim as well.
    pub fn record_reclaim(&mut self, top: usize) {
        self.epoch += 1;
        while matches!(self.reclaims.last(), Some(&(_, older)) if older >= top) {
            self.reclaims.pop();
        }
        self.reclaims.push((self.epoch, top));
    }

    /// True if `[.., end)` survived every reclaim since `epoch`
    ///
    /// The lowest `top` reclaimed after `epoch` is the first stack entry newer than it.
    pub fn survived_since(&self, epoch: usize, end: usize) -> bool {
        if epoch > self.epoch {
            return false;
        }
        let first_later = self.reclaims.partition_point(|&(at, _)| at <= epoch);
        match self.reclaims.get(first_later) {
            Some(&(_, top)) => top >= end,
            None => true,
        }
    }

    /// Reclaim entries currently kept for handle validation
    #[cfg(test)]
    pub(crate) fn reclaim_depth(&self) -> usize {
        self.reclaims.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self.start.as_ptr(), self.layout.size()) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { core::slice::from_raw_parts_mut(self.start.as_ptr(), self.layout.size()) }
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        unsafe {
            dealloc(self.start.as_ptr(), self.layout);
        }
    }
}

impl core::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Chunk")
            .field("base", &self.start)
            .field("capacity", &self.layout.size())
            .field("serial", &self.serial)
            .field("epoch", &self.epoch)
            .finish()
    }
}
