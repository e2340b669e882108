//! Arena - chunk-chained bump allocation
//!
//! Design: the chain is append-only at the tail, so the current chunk is always the last
//! one. Requests that do not fit the current chunk start a fresh chunk at offset 0; the
//! tail of the old chunk is abandoned until `clear`.

use core::mem;
use core::sync::atomic::{AtomicU64, Ordering};

use bytemuck::Pod;

use crate::allocator::align::Alignment;
use crate::allocator::chunk::Chunk;
use crate::allocator::handle::{ArenaHandle, Checkpoint};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, Result};
use crate::logging::{log_allocation, log_arena_cleared, log_chunk_acquired, log_chunk_released};

/// Chunk capacity used when none is given
pub const DEFAULT_CHUNK_CAPACITY: usize = 1024;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Bump allocator over a chain of fixed-capacity chunks
#[derive(Debug)]
pub struct Arena {
    id: u64,
    chunk_capacity: usize,
    chunks: Vec<Chunk>,
    top: usize,
    alignment: Alignment,
    total_size: usize,
    next_serial: u64,
}

impl Arena {
    /// Create an arena with one chunk of `capacity` bytes
    pub fn new(capacity: usize) -> Result<Self> {
        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        let first = Chunk::new(capacity, 0)?;
        log_chunk_acquired(id, 0, capacity);

        Ok(Self {
            id,
            chunk_capacity: capacity,
            chunks: vec![first],
            top: 0,
            alignment: Alignment::MAX,
            total_size: capacity,
            next_serial: 1,
        })
    }

    /// Create an arena with [`DEFAULT_CHUNK_CAPACITY`]
    pub fn with_default_capacity() -> Result<Self> {
        Self::new(DEFAULT_CHUNK_CAPACITY)
    }

    /// Create an arena from configuration (capacity and initial alignment)
    pub fn with_config(config: &ArenaConfig) -> Result<Self> {
        let alignment = config.alignment()?;
        let mut arena = Self::new(config.chunk_capacity)?;
        arena.alignment = alignment;
        Ok(arena)
    }

    // ===== Alignment =====

    /// Use the platform maximum alignment for subsequent pushes
    ///
    /// For mixed or unknown contents, e.g. raw byte and string buffers.
    #[inline]
    pub fn set_max_align(&mut self) {
        self.alignment = Alignment::MAX;
    }

    /// Use `align` for subsequent pushes
    pub fn set_auto_align(&mut self, align: usize) -> Result<()> {
        self.alignment = Alignment::new(align)?;
        Ok(())
    }

    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    // ===== Allocation =====

    /// Reserve `size` zeroed bytes at the current alignment
    pub fn push(&mut self, size: usize) -> Result<ArenaHandle> {
        self.push_aligned(size, self.alignment)
    }

    /// Reserve `size` bytes at the current alignment without zeroing them
    pub fn push_no_zero(&mut self, size: usize) -> Result<ArenaHandle> {
        self.push_no_zero_aligned(size, self.alignment)
    }

    /// Reserve `size` zeroed bytes at `align`, leaving the stored alignment untouched
    pub fn push_aligned(&mut self, size: usize, align: Alignment) -> Result<ArenaHandle> {
        let handle = self.reserve(size, align)?;
        self.current_mut().as_mut_slice()[handle.offset..handle.end()].fill(0);
        Ok(handle)
    }

    /// Reserve `size` bytes at `align` without zeroing them
    pub fn push_no_zero_aligned(&mut self, size: usize, align: Alignment) -> Result<ArenaHandle> {
        self.reserve(size, align)
    }

    /// Advance `top` to the next multiple of `align` and return that position
    ///
    /// Consumes padding only. If the padding alone overruns the current chunk, a new chunk
    /// is started and the returned position is its base.
    pub fn push_aligner(&mut self, align: usize) -> Result<ArenaHandle> {
        let align = Alignment::new(align)?;

        let padding = align.padding_for(self.top);
        if self.top + padding > self.chunk_capacity {
            self.grow()?;
        } else {
            self.top += padding;
        }

        Ok(self.handle_at(self.top, 0))
    }

    fn reserve(&mut self, size: usize, align: Alignment) -> Result<ArenaHandle> {
        if size >= self.chunk_capacity {
            return Err(ArenaError::SizeExceedsChunk {
                size,
                capacity: self.chunk_capacity,
            });
        }

        let mut padding = align.padding_for(self.top);
        if self.top + padding + size > self.chunk_capacity {
            self.grow()?;
            padding = 0;
        }

        let offset = self.top + padding;
        self.top = offset + size;

        let handle = self.handle_at(offset, size);
        log_allocation(self.id, handle.chunk, offset, size);
        Ok(handle)
    }

    /// Append a fresh chunk and make it current
    fn grow(&mut self) -> Result<()> {
        let chunk = Chunk::new(self.chunk_capacity, self.next_serial)?;
        self.next_serial += 1;
        self.chunks.push(chunk);
        self.top = 0;
        self.total_size += self.chunk_capacity;

        log_chunk_acquired(self.id, self.chunks.len() - 1, self.chunk_capacity);
        Ok(())
    }

    // ===== Release =====

    /// Release the most recent `size` bytes
    ///
    /// When `size` reaches past the start of a non-first chunk, the whole chunk is dropped
    /// and the previous chunk becomes current with `top` at full capacity: the offset it had
    /// before the switch is not restored. Use [`Arena::checkpoint`] and [`Arena::rewind`]
    /// for exact restores across chunks.
    pub fn pop(&mut self, size: usize) -> Result<()> {
        if size >= self.top && self.chunks.len() > 1 {
            self.release_current();
            self.top = self.chunk_capacity;
            return Ok(());
        }

        if size > self.top {
            return Err(ArenaError::PopUnderflow { size, top: self.top });
        }

        self.top -= size;
        if size > 0 {
            let top = self.top;
            self.current_mut().record_reclaim(top);
        }
        Ok(())
    }

    /// Release every chunk but the first and reset `top` to its base
    pub fn clear(&mut self) {
        let released = self.chunks.len() - 1;
        while self.chunks.len() > 1 {
            self.release_current();
        }

        self.top = 0;
        self.current_mut().record_reclaim(0);
        log_arena_cleared(self.id, released);
    }

    fn release_current(&mut self) {
        let index = self.chunks.len() - 1;
        if let Some(chunk) = self.chunks.pop() {
            self.total_size -= chunk.capacity();
            log_chunk_released(self.id, index, chunk.capacity());
        }
    }

    /// Record the current position, including the chunk it lives in
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            arena_id: self.id,
            chunks: self.chunks.len(),
            serial: self.current().serial(),
            epoch: self.current().epoch(),
            top: self.top,
        }
    }

    /// Restore the exact position recorded by `checkpoint`
    ///
    /// Chunks appended after the checkpoint are released and the then-current chunk gets
    /// its recorded `top` back. A checkpoint whose chunk was popped, cleared or rewound
    /// below its `top` since it was taken is rejected.
    pub fn rewind(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if checkpoint.arena_id != self.id || checkpoint.chunks > self.chunks.len() {
            return Err(ArenaError::InvalidCheckpoint);
        }
        match self.chunks.get(checkpoint.chunks.wrapping_sub(1)) {
            Some(chunk)
                if chunk.serial() == checkpoint.serial
                    && chunk.survived_since(checkpoint.epoch, checkpoint.top) => {}
            _ => return Err(ArenaError::InvalidCheckpoint),
        }
        if checkpoint.chunks == self.chunks.len() && checkpoint.top > self.top {
            return Err(ArenaError::InvalidCheckpoint);
        }

        while self.chunks.len() > checkpoint.chunks {
            self.release_current();
        }

        self.top = checkpoint.top;
        self.current_mut().record_reclaim(checkpoint.top);
        Ok(())
    }

    // ===== Handle access =====

    /// Whether `handle` still refers to memory owned by this arena
    pub fn is_live(&self, handle: &ArenaHandle) -> bool {
        self.validate(handle).is_ok()
    }

    pub fn bytes(&self, handle: &ArenaHandle) -> Result<&[u8]> {
        let index = self.validate(handle)?;
        Ok(&self.chunks[index].as_slice()[handle.offset..handle.end()])
    }

    pub fn bytes_mut(&mut self, handle: &ArenaHandle) -> Result<&mut [u8]> {
        let index = self.validate(handle)?;
        Ok(&mut self.chunks[index].as_mut_slice()[handle.offset..handle.end()])
    }

    /// Absolute address of the region, for diagnostics and alignment checks
    pub fn address(&self, handle: &ArenaHandle) -> Result<usize> {
        let index = self.validate(handle)?;
        Ok(self.chunks[index].base() as usize + handle.offset)
    }

    fn validate(&self, handle: &ArenaHandle) -> Result<usize> {
        if handle.arena_id != self.id {
            return Err(ArenaError::ForeignHandle);
        }

        let chunk = self
            .chunks
            .get(handle.chunk)
            .filter(|chunk| chunk.serial() == handle.serial)
            .ok_or(ArenaError::StaleHandle)?;

        if !chunk.survived_since(handle.epoch, handle.end()) {
            return Err(ArenaError::StaleHandle);
        }

        Ok(handle.chunk)
    }

    // ===== Typed helpers =====

    /// Copy `value` into the arena at its natural alignment
    pub fn push_value<T: Pod>(&mut self, value: &T) -> Result<ArenaHandle> {
        let handle = self.push_no_zero_aligned(mem::size_of::<T>(), Alignment::of::<T>())?;
        self.bytes_mut(&handle)?.copy_from_slice(bytemuck::bytes_of(value));
        Ok(handle)
    }

    /// Copy a byte or string buffer into the arena at maximum alignment
    pub fn push_bytes(&mut self, data: &[u8]) -> Result<ArenaHandle> {
        let handle = self.push_no_zero_aligned(data.len(), Alignment::MAX)?;
        self.bytes_mut(&handle)?.copy_from_slice(data);
        Ok(handle)
    }

    pub fn read_value<T: Pod>(&self, handle: &ArenaHandle) -> Result<T> {
        let bytes = self.bytes(handle)?;
        if bytes.len() != mem::size_of::<T>() {
            return Err(ArenaError::SizeMismatch {
                expected: mem::size_of::<T>(),
                found: bytes.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn write_value<T: Pod>(&mut self, handle: &ArenaHandle, value: &T) -> Result<()> {
        let bytes = self.bytes_mut(handle)?;
        if bytes.len() != mem::size_of::<T>() {
            return Err(ArenaError::SizeMismatch {
                expected: mem::size_of::<T>(),
                found: bytes.len(),
            });
        }
        bytes.copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }

    // ===== Introspection =====

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current bump offset within the current chunk
    #[inline]
    pub fn pos(&self) -> usize {
        self.top
    }

    /// Bytes left in the current chunk only
    #[inline]
    pub fn memory_remaining(&self) -> usize {
        self.chunk_capacity - self.top
    }

    #[inline]
    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn current_chunk_index(&self) -> usize {
        self.chunks.len() - 1
    }

    /// Sum of capacities of the chunks currently in the chain
    #[inline]
    pub fn total_size_accounted(&self) -> usize {
        self.total_size
    }

    #[cfg(test)]
    pub(crate) fn reclaim_depth(&self) -> usize {
        self.current().reclaim_depth()
    }

    #[inline]
    fn current(&self) -> &Chunk {
        &self.chunks[self.chunks.len() - 1]
    }

    #[inline]
    fn current_mut(&mut self) -> &mut Chunk {
        let index = self.chunks.len() - 1;
        &mut self.chunks[index]
    }

    fn handle_at(&self, offset: usize, len: usize) -> ArenaHandle {
        let chunk = self.current();
        ArenaHandle {
            arena_id: self.id,
            chunk: self.chunks.len() - 1,
            serial: chunk.serial(),
            epoch: chunk.epoch(),
            offset,
            len,
        }
    }
}
