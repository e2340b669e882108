//! chunkarena - region allocator with a fixed-size recycler
//!
//! This crate provides a bump-pointer arena that hands out aligned regions from a chain of
//! fixed-capacity chunks, and a recycler that layers a LIFO free list over one arena for
//! individual allocate/deallocate of same-sized slots.
//!
//! Regions are returned as [`ArenaHandle`]s rather than raw pointers. Every access checks
//! the handle against the arena, so use after `pop`, `clear` or `rewind` is reported as
//! [`ArenaError::StaleHandle`] instead of touching reclaimed memory.
//!
//! ```
//! use chunkarena::{Arena, ArenaManager};
//!
//! let mut arena = Arena::new(64)?;
//! arena.set_auto_align(4)?;
//! let a = arena.push_value(&5i32)?;
//! assert_eq!(arena.read_value::<i32>(&a)?, 5);
//!
//! let mut ints = ArenaManager::new(Arena::new(64)?, 4)?;
//! let slot = ints.allocate()?;
//! ints.deallocate(slot)?;
//! assert_eq!(ints.allocate()?, slot);
//! # Ok::<(), chunkarena::ArenaError>(())
//! ```

pub mod allocator;
pub mod config;
pub mod error;
pub mod logging;
pub mod recycler;

// Re-export core types
pub use allocator::{Alignment, Arena, ArenaHandle, ArenaStats, Checkpoint, DEFAULT_CHUNK_CAPACITY};
pub use config::ArenaConfig;
pub use error::{ArenaError, Result};
pub use recycler::{ArenaManager, Recycler};
