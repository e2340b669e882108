//! Error taxonomy for arena and recycler operations
//!
//! Design: one flat enum. Allocation failure is the only fatal case; everything else is a
//! caller contract breach that is reported rather than asserted.

use core::fmt;

/// Arena and recycler errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The backing allocator could not provide a chunk of `size` bytes
    AllocationFailed { size: usize },
    /// Chunk capacity must be non-zero
    InvalidCapacity,
    /// A single allocation must be strictly smaller than one chunk
    SizeExceedsChunk { size: usize, capacity: usize },
    /// Alignment must be a non-zero power of two
    InvalidAlignment { align: usize },
    /// `pop` asked for more bytes than the current chunk holds
    PopUnderflow { size: usize, top: usize },
    /// Checkpoint does not describe an earlier state of this arena
    InvalidCheckpoint,
    /// Handle was produced by a different arena
    ForeignHandle,
    /// Handle region was reclaimed by `pop`, `clear` or `rewind`
    StaleHandle,
    /// Region length does not match the requested value or slot size
    SizeMismatch { expected: usize, found: usize },
    /// Slot is already on the free list
    DoubleFree,
    /// Recycler slots must be at least one byte wide
    ZeroSizedSlot,
    /// Configuration could not be read or parsed
    Config(String),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { size } => {
                write!(f, "Failed to allocate chunk of {} bytes", size)
            }
            Self::InvalidCapacity => write!(f, "Chunk capacity must be greater than zero"),
            Self::SizeExceedsChunk { size, capacity } => {
                write!(f, "Allocation of {} bytes does not fit in a {} byte chunk", size, capacity)
            }
            Self::InvalidAlignment { align } => {
                write!(f, "Alignment {} is not a power of two", align)
            }
            Self::PopUnderflow { size, top } => {
                write!(f, "Cannot pop {} bytes, only {} allocated in current chunk", size, top)
            }
            Self::InvalidCheckpoint => write!(f, "Checkpoint is ahead of the arena state"),
            Self::ForeignHandle => write!(f, "Handle belongs to a different arena"),
            Self::StaleHandle => write!(f, "Handle refers to reclaimed memory"),
            Self::SizeMismatch { expected, found } => {
                write!(f, "Size mismatch: expected {} bytes, found {}", expected, found)
            }
            Self::DoubleFree => write!(f, "Slot was already released"),
            Self::ZeroSizedSlot => write!(f, "Recycler slot size must be greater than zero"),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ArenaError {}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, ArenaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_sizes() {
        let err = ArenaError::SizeExceedsChunk { size: 2048, capacity: 1024 };
        assert_eq!(err.to_string(), "Allocation of 2048 bytes does not fit in a 1024 byte chunk");

        let err = ArenaError::PopUnderflow { size: 8, top: 4 };
        assert!(err.to_string().contains("pop 8 bytes"));
    }
}
