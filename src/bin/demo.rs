//! Walk-through of the arena and recycler APIs
//!
//! Run with `ARENA_LOG_LEVEL=trace` to see every chunk and allocation event.

use chunkarena::{logging, Arena, ArenaConfig, ArenaError, ArenaManager};
use tracing::{error, info};

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!(error = %e, "arena demo failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), ArenaError> {
    let config = ArenaConfig::from_env()?;

    // Fixed-size recycler of i32
    let mut ints = ArenaManager::new(Arena::with_config(&config)?, std::mem::size_of::<i32>())?;
    let p1 = ints.allocate()?;
    let p2 = ints.allocate()?;
    let p3 = ints.allocate()?;
    ints.arena_mut().write_value(&p1, &5i32)?;
    ints.arena_mut().write_value(&p2, &10i32)?;
    ints.arena_mut().write_value(&p3, &15i32)?;

    ints.deallocate(p2)?;
    let p4 = ints.allocate()?;
    ints.arena_mut().write_value(&p4, &20i32)?;
    info!(
        reused = p4 == p2,
        offset = p4.offset(),
        value = ints.arena().read_value::<i32>(&p4)?,
        "recycled slot"
    );

    // Raw bump allocation with mixed types
    let mut scratch = Arena::with_config(&config)?;
    scratch.set_auto_align(std::mem::size_of::<i32>())?;
    for value in [5i32, 10, 20] {
        scratch.push_value(&value)?;
    }

    let text = "Hello world! Welcome to the memory arena!";
    scratch.set_max_align();
    let text_slot = scratch.push(text.len())?;
    scratch.bytes_mut(&text_slot)?.copy_from_slice(text.as_bytes());

    scratch.set_auto_align(std::mem::size_of::<f64>())?;
    let double = scratch.push(std::mem::size_of::<f64>())?;
    scratch.write_value(&double, &1.5f64)?;
    info!(
        text = %String::from_utf8_lossy(scratch.bytes(&text_slot)?),
        double = scratch.read_value::<f64>(&double)?,
        pos = scratch.pos(),
        "scratch arena filled"
    );

    // Reset and reuse from chunk 0
    scratch.clear();
    scratch.set_auto_align(std::mem::size_of::<i32>())?;
    for value in [5i32, 10, 20] {
        scratch.push_value(&value)?;
    }
    info!(stats = ?scratch.stats(), "scratch arena after clear");

    // Release in reverse order
    for _ in 0..3 {
        scratch.pop(std::mem::size_of::<i32>())?;
    }
    info!(pos = scratch.pos(), remaining = scratch.memory_remaining(), "scratch arena emptied");

    Ok(())
}
