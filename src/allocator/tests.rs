//! Arena tests
//!
//! Organized by component:
//! - Construction and alignment settings
//! - Bump allocation and padding
//! - Chunk growth
//! - Pop, clear and checkpoints
//! - Handle validation
//! - Typed helpers

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::ArenaConfig;
    use crate::error::ArenaError;
    use proptest::prelude::*;

    fn align(n: usize) -> Alignment {
        Alignment::new(n).expect("power of two")
    }

    // ===== Construction =====

    #[test]
    fn arena_starts_with_one_chunk() {
        let arena = Arena::with_default_capacity().expect("arena");
        assert_eq!(arena.chunk_capacity(), DEFAULT_CHUNK_CAPACITY);
        assert_eq!(arena.chunk_count(), 1);
        assert_eq!(arena.current_chunk_index(), 0);
        assert_eq!(arena.pos(), 0);
        assert_eq!(arena.alignment(), Alignment::MAX);
        assert_eq!(arena.memory_remaining(), 1024);
        assert_eq!(arena.total_size_accounted(), 1024);
    }

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(Arena::new(0).unwrap_err(), ArenaError::InvalidCapacity);
    }

    #[test]
    fn arenas_get_distinct_ids() {
        let a = Arena::new(16).unwrap();
        let b = Arena::new(16).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn with_config_applies_alignment() {
        let config = ArenaConfig::parse("chunk_capacity = 32\nalignment = 4").unwrap();
        let arena = Arena::with_config(&config).unwrap();
        assert_eq!(arena.chunk_capacity(), 32);
        assert_eq!(arena.alignment().get(), 4);
    }

    #[test]
    fn set_auto_align_validates() {
        let mut arena = Arena::new(64).unwrap();
        arena.set_auto_align(8).unwrap();
        assert_eq!(arena.alignment().get(), 8);

        assert_eq!(arena.set_auto_align(6), Err(ArenaError::InvalidAlignment { align: 6 }));
        // Failed call leaves the previous setting in place
        assert_eq!(arena.alignment().get(), 8);

        arena.set_max_align();
        assert_eq!(arena.alignment(), Alignment::MAX);
    }

    // ===== Bump allocation =====

    #[test]
    fn sequential_pushes_are_monotonic() {
        let mut arena = Arena::new(256).unwrap();
        arena.set_auto_align(8).unwrap();

        let mut last = None;
        for _ in 0..10 {
            let handle = arena.push(8).unwrap();
            let addr = arena.address(&handle).unwrap();
            if let Some(prev) = last {
                assert!(addr > prev);
            }
            last = Some(addr);
        }
    }

    #[test]
    fn padding_applied_before_allocation() {
        let mut arena = Arena::new(64).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(5).unwrap();

        arena.set_auto_align(8).unwrap();
        let handle = arena.push(8).unwrap();
        assert_eq!(handle.offset(), 8);
        assert_eq!(arena.pos(), 16);
        assert_eq!(arena.memory_remaining(), 48);
    }

    #[test]
    fn push_aligned_leaves_setting_untouched() {
        let mut arena = Arena::new(64).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(3).unwrap();

        let handle = arena.push_aligned(4, align(16)).unwrap();
        assert_eq!(handle.offset(), 16);
        assert_eq!(arena.alignment().get(), 1);
    }

    #[test]
    fn push_zero_fills() {
        let mut arena = Arena::new(64).unwrap();
        let dirty = arena.push_no_zero(32).unwrap();
        arena.bytes_mut(&dirty).unwrap().fill(0xAB);
        arena.pop(32).unwrap();

        let clean = arena.push(32).unwrap();
        assert!(arena.bytes(&clean).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn push_no_zero_keeps_previous_contents() {
        let mut arena = Arena::new(64).unwrap();
        let dirty = arena.push_no_zero(16).unwrap();
        arena.bytes_mut(&dirty).unwrap().fill(0xCD);
        arena.pop(16).unwrap();

        let reused = arena.push_no_zero(16).unwrap();
        assert_eq!(reused.offset(), 0);
        assert!(arena.bytes(&reused).unwrap().iter().all(|&b| b == 0xCD));
    }

    #[test]
    fn size_at_or_above_capacity_rejected() {
        let mut arena = Arena::new(16).unwrap();
        assert_eq!(
            arena.push(16).unwrap_err(),
            ArenaError::SizeExceedsChunk { size: 16, capacity: 16 }
        );
        assert!(arena.push(17).is_err());
        assert!(arena.push(15).is_ok());
        assert_eq!(arena.chunk_count(), 1);
    }

    #[test]
    fn zero_size_allocation() {
        let mut arena = Arena::new(16).unwrap();
        let handle = arena.push(0).unwrap();
        assert!(handle.is_empty());
        assert_eq!(arena.bytes(&handle).unwrap().len(), 0);
    }

    #[test]
    fn push_aligner_consumes_padding_only() {
        let mut arena = Arena::new(64).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(3).unwrap();

        let mark = arena.push_aligner(16).unwrap();
        assert_eq!(mark.offset(), 16);
        assert!(mark.is_empty());
        assert_eq!(arena.pos(), 16);

        // Already aligned: no movement
        let again = arena.push_aligner(16).unwrap();
        assert_eq!(again.offset(), 16);
        assert_eq!(arena.pos(), 16);
    }

    #[test]
    fn push_aligner_rejects_bad_alignment() {
        let mut arena = Arena::new(64).unwrap();
        assert_eq!(
            arena.push_aligner(3).unwrap_err(),
            ArenaError::InvalidAlignment { align: 3 }
        );
    }

    #[test]
    fn push_aligner_grows_when_gap_overruns() {
        let mut arena = Arena::new(24).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(17).unwrap();

        // 17 -> 32 overruns a 24 byte chunk
        let mark = arena.push_aligner(16).unwrap();
        assert_eq!(arena.chunk_count(), 2);
        assert_eq!(mark.chunk_index(), 1);
        assert_eq!(mark.offset(), 0);
        assert_eq!(arena.pos(), 0);
    }

    // ===== Growth =====

    #[test]
    fn overflow_appends_exactly_one_chunk() {
        let mut arena = Arena::new(64).unwrap();
        arena.set_auto_align(8).unwrap();
        arena.push(40).unwrap();

        let handle = arena.push(32).unwrap();
        assert_eq!(arena.chunk_count(), 2);
        assert_eq!(arena.current_chunk_index(), 1);
        assert_eq!(handle.chunk_index(), 1);
        assert_eq!(handle.offset(), 0);
        assert_eq!(arena.pos(), 32);
        assert_eq!(arena.total_size_accounted(), 128);
    }

    #[test]
    fn growth_never_looks_back() {
        let mut arena = Arena::new(32).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(20).unwrap();
        arena.push(20).unwrap();

        // 12 bytes remain in chunk 0, but the current chunk is chunk 1
        let handle = arena.push(10).unwrap();
        assert_eq!(handle.chunk_index(), 1);
        assert_eq!(handle.offset(), 20);
    }

    #[test]
    fn stats_reflect_growth() {
        let mut arena = Arena::new(32).unwrap();
        arena.push(20).unwrap();
        arena.push(20).unwrap();

        let stats = arena.stats();
        assert_eq!(stats.chunk_count, 2);
        assert_eq!(stats.chunk_capacity, 32);
        assert_eq!(stats.total_size_accounted, 64);
        assert_eq!(stats.current_chunk_remaining, 12);
    }

    // ===== Pop / clear / checkpoints =====

    #[test]
    fn push_pop_round_trip() {
        let mut arena = Arena::new(128).unwrap();
        arena.set_auto_align(4).unwrap();
        arena.push(12).unwrap();

        let before = arena.pos();
        arena.push(100).unwrap();
        arena.pop(100).unwrap();
        assert_eq!(arena.pos(), before);
    }

    #[test]
    fn pop_underflow_rejected() {
        let mut arena = Arena::new(64).unwrap();
        arena.push(8).unwrap();
        assert_eq!(arena.pop(9).unwrap_err(), ArenaError::PopUnderflow { size: 9, top: 8 });
        assert_eq!(arena.pos(), 8);

        arena.pop(8).unwrap();
        assert_eq!(arena.pos(), 0);
    }

    #[test]
    fn pop_across_chunk_drops_whole_chunk() {
        let mut arena = Arena::new(32).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(10).unwrap();
        arena.push(30).unwrap();
        assert_eq!(arena.chunk_count(), 2);

        arena.pop(30).unwrap();
        assert_eq!(arena.chunk_count(), 1);
        // Previous chunk is treated as full, not restored to offset 10
        assert_eq!(arena.pos(), 32);
        assert_eq!(arena.memory_remaining(), 0);
        assert_eq!(arena.total_size_accounted(), 32);
    }

    #[test]
    fn clear_keeps_first_chunk() {
        let mut arena = Arena::new(32).unwrap();
        arena.set_auto_align(1).unwrap();
        let first = arena.push(20).unwrap();
        let base = arena.address(&first).unwrap();
        arena.push(20).unwrap();
        arena.push(20).unwrap();
        assert_eq!(arena.chunk_count(), 3);

        arena.clear();
        assert_eq!(arena.chunk_count(), 1);
        assert_eq!(arena.pos(), 0);
        assert_eq!(arena.current_chunk_index(), 0);

        let again = arena.push(4).unwrap();
        assert_eq!(arena.address(&again).unwrap(), base);
    }

    #[test]
    fn rewind_restores_exactly_across_chunks() {
        let mut arena = Arena::new(32).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(10).unwrap();

        let mark = arena.checkpoint();
        assert_eq!(mark.chunk_count(), 1);
        assert_eq!(mark.top(), 10);

        arena.push(30).unwrap();
        arena.push(30).unwrap();
        assert_eq!(arena.chunk_count(), 3);

        arena.rewind(mark).unwrap();
        assert_eq!(arena.chunk_count(), 1);
        assert_eq!(arena.pos(), 10);
    }

    #[test]
    fn rewind_rejects_future_checkpoint() {
        let mut arena = Arena::new(32).unwrap();
        arena.push(8).unwrap();
        let mark = arena.checkpoint();
        arena.pop(8).unwrap();
        assert_eq!(arena.rewind(mark).unwrap_err(), ArenaError::InvalidCheckpoint);

        let other = Arena::new(32).unwrap();
        assert_eq!(arena.rewind(other.checkpoint()).unwrap_err(), ArenaError::InvalidCheckpoint);
    }

    #[test]
    fn rewind_rejects_checkpoint_into_replaced_chunk() {
        let mut arena = Arena::new(32).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(30).unwrap();
        arena.push(30).unwrap();
        let mark = arena.checkpoint();

        arena.clear();
        arena.push(30).unwrap();
        arena.push(30).unwrap();
        assert_eq!(arena.chunk_count(), 2);
        assert_eq!(arena.rewind(mark).unwrap_err(), ArenaError::InvalidCheckpoint);
    }

    #[test]
    fn rewind_rejects_checkpoint_popped_below_after_regrowth() {
        let mut arena = Arena::new(32).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(12).unwrap();
        let mark = arena.checkpoint();

        arena.push(30).unwrap();
        arena.pop(30).unwrap();
        assert_eq!(arena.pos(), 32);
        arena.pop(32).unwrap();
        assert_eq!(arena.pos(), 0);
        arena.push(30).unwrap();
        arena.push(30).unwrap();
        assert_eq!(arena.chunk_count(), 2);

        // Chunk 0 was emptied after the checkpoint, so its 12 bytes are gone
        assert_eq!(arena.rewind(mark).unwrap_err(), ArenaError::InvalidCheckpoint);
        assert_eq!(arena.chunk_count(), 2);
    }

    #[test]
    fn rewind_accepts_checkpoint_after_pops_above_it() {
        let mut arena = Arena::new(64).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(12).unwrap();
        let mark = arena.checkpoint();

        arena.push(20).unwrap();
        arena.pop(20).unwrap();
        arena.push(40).unwrap();

        arena.rewind(mark).unwrap();
        assert_eq!(arena.pos(), 12);
        // Rewinding twice to the same mark is fine
        arena.rewind(mark).unwrap();
        assert_eq!(arena.pos(), 12);
    }

    #[test]
    fn repeated_clear_keeps_validation_state_bounded() {
        let mut arena = Arena::new(256).unwrap();
        let first = arena.push(100).unwrap();
        for _ in 0..100_000 {
            arena.push(100).unwrap();
            arena.clear();
        }
        for _ in 0..10_000 {
            arena.push(16).unwrap();
            arena.pop(16).unwrap();
        }

        assert!(arena.reclaim_depth() <= 2);
        assert!(!arena.is_live(&first));
        let fresh = arena.push(100).unwrap();
        assert!(arena.is_live(&fresh));
    }

    // ===== Handle validation =====

    #[test]
    fn popped_handle_is_stale() {
        let mut arena = Arena::new(64).unwrap();
        let keep = arena.push(8).unwrap();
        let gone = arena.push(8).unwrap();
        arena.pop(8).unwrap();

        assert!(arena.is_live(&keep));
        assert_eq!(arena.bytes(&gone).unwrap_err(), ArenaError::StaleHandle);

        // Reallocating the same bytes does not revive the old handle
        let fresh = arena.push(8).unwrap();
        assert_eq!(fresh.offset(), gone.offset());
        assert!(!arena.is_live(&gone));
        assert!(arena.is_live(&fresh));
    }

    #[test]
    fn cleared_handles_are_stale() {
        let mut arena = Arena::new(32).unwrap();
        let a = arena.push(8).unwrap();
        let b = arena.push(30).unwrap();
        arena.clear();

        assert_eq!(arena.bytes(&a).unwrap_err(), ArenaError::StaleHandle);
        assert_eq!(arena.bytes(&b).unwrap_err(), ArenaError::StaleHandle);
    }

    #[test]
    fn handle_in_dropped_chunk_stays_stale_after_regrowth() {
        let mut arena = Arena::new(32).unwrap();
        arena.push(16).unwrap();
        let second = arena.push(30).unwrap();
        arena.pop(30).unwrap();

        let replacement = arena.push(30).unwrap();
        assert_eq!(replacement.chunk_index(), second.chunk_index());
        assert_eq!(arena.bytes(&second).unwrap_err(), ArenaError::StaleHandle);
    }

    #[test]
    fn foreign_handle_rejected() {
        let mut a = Arena::new(32).unwrap();
        let b = Arena::new(32).unwrap();
        let handle = a.push(4).unwrap();
        assert_eq!(b.bytes(&handle).unwrap_err(), ArenaError::ForeignHandle);
    }

    // ===== Typed helpers =====

    #[test]
    fn values_round_trip_through_arena() {
        let mut arena = Arena::new(128).unwrap();
        let int = arena.push_value(&42i32).unwrap();
        let double = arena.push_value(&1.5f64).unwrap();

        assert_eq!(arena.read_value::<i32>(&int).unwrap(), 42);
        assert_eq!(arena.read_value::<f64>(&double).unwrap(), 1.5);
        assert_eq!(arena.address(&double).unwrap() % core::mem::align_of::<f64>(), 0);

        arena.write_value(&int, &7i32).unwrap();
        assert_eq!(arena.read_value::<i32>(&int).unwrap(), 7);
    }

    #[test]
    fn read_value_checks_size() {
        let mut arena = Arena::new(64).unwrap();
        let int = arena.push_value(&1i32).unwrap();
        assert_eq!(
            arena.read_value::<u64>(&int).unwrap_err(),
            ArenaError::SizeMismatch { expected: 8, found: 4 }
        );
    }

    #[test]
    fn push_bytes_uses_max_alignment() {
        let mut arena = Arena::new(128).unwrap();
        arena.set_auto_align(1).unwrap();
        arena.push(1).unwrap();

        let text = b"Hello world! Welcome to the memory arena!";
        let handle = arena.push_bytes(text).unwrap();
        assert_eq!(handle.offset() % Alignment::MAX.get(), 0);
        assert_eq!(arena.bytes(&handle).unwrap(), &text[..]);
    }

    // ===== Properties =====

    proptest! {
        #[test]
        fn every_push_respects_alignment(
            ops in prop::collection::vec((1usize..48, 0u32..7), 1..64)
        ) {
            let mut arena = Arena::new(64).unwrap();
            for (size, shift) in ops {
                let alignment = align(1 << shift);
                let handle = arena.push_aligned(size, alignment).unwrap();
                prop_assert_eq!(handle.offset() % alignment.get(), 0);
                if alignment <= Alignment::MAX {
                    prop_assert_eq!(arena.address(&handle).unwrap() % alignment.get(), 0);
                }
                prop_assert!(arena.pos() <= arena.chunk_capacity());
                prop_assert!(arena.bytes(&handle).unwrap().iter().all(|&b| b == 0));
            }
        }

        #[test]
        fn push_then_pop_restores_top(prefix in 0usize..64, k in 1usize..64) {
            let mut arena = Arena::new(128).unwrap();
            arena.set_auto_align(1).unwrap();
            arena.push(prefix).unwrap();

            let before = arena.pos();
            let size = 128 - k - before;
            arena.push(size).unwrap();
            prop_assert_eq!(arena.chunk_count(), 1);
            arena.pop(size).unwrap();
            prop_assert_eq!(arena.pos(), before);
        }
    }
}
