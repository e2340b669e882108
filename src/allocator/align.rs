//! Alignment primitives
//!
//! Design: power-of-two check happens once, in `Alignment::new`, so the bump path only
//! does mask arithmetic.

use crate::error::{ArenaError, Result};

#[cfg(unix)]
const MAX_NATURAL_ALIGN: usize = core::mem::align_of::<libc::max_align_t>();

#[cfg(not(unix))]
const MAX_NATURAL_ALIGN: usize = 16;

/// Validated power-of-two alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alignment(usize);

impl Alignment {
    /// Platform maximum natural alignment (`max_align_t`)
    pub const MAX: Alignment = Alignment(MAX_NATURAL_ALIGN);

    /// Byte alignment
    pub const ONE: Alignment = Alignment(1);

    /// Validate `align` as a power of two
    #[inline]
    pub fn new(align: usize) -> Result<Self> {
        if align.is_power_of_two() {
            Ok(Self(align))
        } else {
            Err(ArenaError::InvalidAlignment { align })
        }
    }

    /// Alignment required by `T`
    #[inline]
    pub const fn of<T>() -> Self {
        Self(core::mem::align_of::<T>())
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Bytes needed to move `offset` up to the next multiple of this alignment
    ///
    /// `0` when `offset` is already aligned, otherwise `align - offset % align`.
    #[inline(always)]
    pub const fn padding_for(self, offset: usize) -> usize {
        align_up(offset, self) - offset
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::MAX
    }
}

/// Align offset upward to next multiple of alignment
#[inline(always)]
pub(crate) const fn align_up(offset: usize, align: Alignment) -> usize {
    (offset.wrapping_add(align.0).wrapping_sub(1)) & !align.0.wrapping_sub(1)
}
