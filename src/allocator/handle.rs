//! Handles - validated, non-owning references into arena memory

/// Opaque reference to a region handed out by an [`Arena`](super::Arena)
///
/// Carries enough to be checked against the arena before every access: the owning arena,
/// the chunk (index and serial, so a replaced chunk is detected), the chunk's reclaim epoch
/// at creation time, and the byte range inside the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaHandle {
    pub(crate) arena_id: u64,
    pub(crate) chunk: usize,
    pub(crate) serial: u64,
    pub(crate) epoch: usize,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl ArenaHandle {
    /// Index of the chunk holding this region
    #[inline]
    pub fn chunk_index(&self) -> usize {
        self.chunk
    }

    /// Byte offset from the chunk base
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset one past the end of the region
    #[inline]
    pub(crate) fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Recorded arena position for exact rewinds across chunk boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub(crate) arena_id: u64,
    pub(crate) chunks: usize,
    pub(crate) serial: u64,
    pub(crate) epoch: usize,
    pub(crate) top: usize,
}

impl Checkpoint {
    /// Chain length at the time of the checkpoint
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Bump offset in the then-current chunk
    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }
}
