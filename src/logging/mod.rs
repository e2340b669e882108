//! Logging infrastructure - structured tracing for arena events
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log level, overridable by `RUST_LOG`
//! - Zero-cost when disabled
//! - Console or file output, human-readable or JSON

use once_cell::sync::OnceCell;
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Keeps the non-blocking file writer flushing for the life of the process
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Enable file logging
    pub file_output: bool,
    /// Log file path (if file_output enabled)
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_output: false,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // ARENA_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("ARENA_LOG_LEVEL") {
            config.level = match level_str.to_lowercase().as_str() {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => Level::INFO,
            };
        }

        // ARENA_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("ARENA_LOG_FILE") {
            config.file_output = true;
            config.log_path = Some(path);
        }

        config.json_format = std::env::var("ARENA_LOG_JSON").is_ok();
        config.show_spans = std::env::var("ARENA_LOG_SPANS").is_ok();

        config
    }

    /// Verbose config: every chunk and allocation event
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            show_spans: true,
            ..Self::default()
        }
    }
}

/// Initialize logging with configuration from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "chunkarena={}",
                config.level.as_str().to_lowercase()
            ))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let writer = match config.log_path.as_deref().filter(|_| config.file_output) {
            Some(path) => file_writer(Path::new(path)),
            None => BoxMakeWriter::new(io::stdout),
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_target(true)
            .with_line_number(cfg!(debug_assertions));

        // Ignore error if another subscriber is already installed
        let _ = if config.json_format {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer.compact()).try_init()
        };
    });
}

fn file_writer(path: &Path) -> BoxMakeWriter {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "chunkarena.log".into());

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);
    BoxMakeWriter::new(writer)
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

// ============================================================================
// Arena-specific logging functions
// ============================================================================

/// Log a bump allocation
#[inline]
pub fn log_allocation(arena: u64, chunk: usize, offset: usize, size: usize) {
    use tracing::trace;
    trace!(
        event = "allocation",
        arena,
        chunk,
        offset,
        size_bytes = size,
        "Arena memory reserved"
    );
}

/// Log a chunk joining the chain
#[inline]
pub fn log_chunk_acquired(arena: u64, chunk: usize, capacity: usize) {
    use tracing::debug;
    debug!(
        event = "chunk_acquired",
        arena,
        chunk,
        capacity,
        "Chunk acquired"
    );
}

/// Log a chunk leaving the chain
#[inline]
pub fn log_chunk_released(arena: u64, chunk: usize, capacity: usize) {
    use tracing::debug;
    debug!(
        event = "chunk_released",
        arena,
        chunk,
        capacity,
        "Chunk released"
    );
}

/// Log a full arena reset
pub fn log_arena_cleared(arena: u64, chunks_released: usize) {
    use tracing::debug;
    debug!(
        event = "arena_cleared",
        arena,
        chunks_released,
        "Arena cleared"
    );
}

/// Log a slot handed out again from the free list
#[inline]
pub fn log_slot_recycled(slot_size: usize, offset: usize) {
    use tracing::trace;
    trace!(
        event = "slot_recycled",
        slot_size,
        offset,
        "Slot reused from free list"
    );
}

/// Log a slot pushed onto the free list
#[inline]
pub fn log_slot_released(slot_size: usize, offset: usize, free_count: usize) {
    use tracing::trace;
    trace!(
        event = "slot_released",
        slot_size,
        offset,
        free_count,
        "Slot returned to free list"
    );
}

/// Log a failed chunk allocation
pub fn log_allocation_failure(size: usize) {
    use tracing::error;
    error!(
        event = "allocation_failure",
        size_bytes = size,
        "Chunk allocation failed"
    );
}
