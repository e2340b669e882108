//! Arena configuration - TOML file with environment overrides

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::allocator::{Alignment, DEFAULT_CHUNK_CAPACITY};
use crate::error::{ArenaError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Bytes per chunk
    #[serde(default = "default_chunk_capacity")]
    pub chunk_capacity: usize,

    /// Initial alignment; absent means platform maximum
    #[serde(default)]
    pub alignment: Option<usize>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            alignment: None,
        }
    }
}

fn default_chunk_capacity() -> usize { DEFAULT_CHUNK_CAPACITY }

impl ArenaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ArenaError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ArenaError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // ARENA_CHUNK_CAPACITY: bytes per chunk
        if let Ok(value) = std::env::var("ARENA_CHUNK_CAPACITY") {
            config.chunk_capacity = value.trim().parse().map_err(|_| {
                ArenaError::Config(format!("ARENA_CHUNK_CAPACITY is not a number: {}", value))
            })?;
        }

        // ARENA_ALIGNMENT: power of two, or "max"
        if let Ok(value) = std::env::var("ARENA_ALIGNMENT") {
            config.alignment = match value.trim().to_lowercase().as_str() {
                "max" => None,
                other => Some(other.parse().map_err(|_| {
                    ArenaError::Config(format!("ARENA_ALIGNMENT is not a number: {}", value))
                })?),
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check capacity and alignment without allocating anything
    pub fn validate(&self) -> Result<()> {
        if self.chunk_capacity == 0 {
            return Err(ArenaError::InvalidCapacity);
        }
        self.alignment()?;
        Ok(())
    }

    /// Initial alignment for arenas built from this config
    pub fn alignment(&self) -> Result<Alignment> {
        match self.alignment {
            Some(align) => Alignment::new(align),
            None => Ok(Alignment::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.chunk_capacity, 1024);
        assert_eq!(config.alignment().unwrap(), Alignment::MAX);
    }

    #[test]
    fn test_parse_partial() {
        let config = ArenaConfig::parse("alignment = 8").unwrap();
        assert_eq!(config.chunk_capacity, 1024);
        assert_eq!(config.alignment().unwrap().get(), 8);

        let config = ArenaConfig::parse("chunk_capacity = 4096").unwrap();
        assert_eq!(config.chunk_capacity, 4096);
        assert_eq!(config.alignment, None);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert_eq!(
            ArenaConfig::parse("alignment = 6").unwrap_err(),
            ArenaError::InvalidAlignment { align: 6 }
        );
        assert_eq!(
            ArenaConfig::parse("chunk_capacity = 0").unwrap_err(),
            ArenaError::InvalidCapacity
        );
        assert!(matches!(
            ArenaConfig::parse("chunk_capacity = \"big\""),
            Err(ArenaError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_capacity = 256\nalignment = 16").unwrap();

        let config = ArenaConfig::load(file.path()).unwrap();
        assert_eq!(config.chunk_capacity, 256);
        assert_eq!(config.alignment, Some(16));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ArenaConfig::load(Path::new("/nonexistent/arena.toml")).unwrap_err();
        assert!(matches!(err, ArenaError::Config(msg) if msg.starts_with("Failed to read")));
    }
}
