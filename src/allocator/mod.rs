//! Memory allocator - chunk-chained bump allocation
//!
//! Design: Three-layer architecture:
//! 1. Alignment arithmetic (padding computation, platform max alignment)
//! 2. Chunks (fixed-capacity blocks from the global allocator)
//! 3. Arena (bump cursor over the chunk chain, handles, checkpoints)
//!
//! Single-threaded by construction: `Arena` owns raw chunk memory and is neither `Send`
//! nor `Sync`.

mod align;
mod chunk;
mod handle;
mod arena;

#[cfg(test)]
mod tests;

pub use align::Alignment;
pub use arena::{Arena, DEFAULT_CHUNK_CAPACITY};
pub use handle::{ArenaHandle, Checkpoint};

impl Arena {
    /// Get arena statistics
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            chunk_count: self.chunk_count(),
            chunk_capacity: self.chunk_capacity(),
            total_size_accounted: self.total_size_accounted(),
            current_chunk_remaining: self.memory_remaining(),
        }
    }
}

/// Arena statistics for monitoring and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub chunk_count: usize,
    pub chunk_capacity: usize,
    pub total_size_accounted: usize,
    pub current_chunk_remaining: usize,
}
