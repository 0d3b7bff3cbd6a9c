//! Simulator configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default memory capacity: 1 MiB.
pub const DEFAULT_MEMORY_SIZE: u32 = 0x10_0000;

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid configuration.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The values are inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Memory layout and run limits for one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Memory capacity in bytes.
    pub memory_size: u32,
    /// Address of the first byte of memory.
    pub memory_base: u32,
    /// Initial stack pointer; the end of memory when unset.
    pub stack_pointer: Option<u32>,
    /// Instruction budget for a run; unlimited when unset.
    pub max_steps: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            memory_base: 0,
            stack_pointer: None,
            max_steps: None,
        }
    }
}

impl SimConfig {
    /// Read and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or fails
    /// [`validate`](Self::validate).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the memory region is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero or unaligned size, or a
    /// region that runs past the end of the 32-bit address space.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size == 0 || self.memory_size % 4 != 0 {
            return Err(ConfigError::Invalid(format!(
                "memory_size {:#x} must be a non-zero multiple of 4",
                self.memory_size
            )));
        }

        if u64::from(self.memory_base) + u64::from(self.memory_size) > 1 << 32 {
            return Err(ConfigError::Invalid(format!(
                "memory at {:#x} with size {:#x} exceeds the address space",
                self.memory_base, self.memory_size
            )));
        }

        Ok(())
    }

    /// First address past the end of memory.
    #[must_use]
    pub fn memory_end(&self) -> u32 {
        self.memory_base.wrapping_add(self.memory_size)
    }

    /// Initial value for the stack pointer.
    #[must_use]
    pub fn initial_sp(&self) -> u32 {
        self.stack_pointer.unwrap_or_else(|| self.memory_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.memory_size, 0x10_0000);
        assert_eq!(config.memory_base, 0);
        assert_eq!(config.initial_sp(), 0x10_0000);
        assert!(config.max_steps.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{"max_steps": 500}"#).unwrap();
        assert_eq!(config.max_steps, Some(500));
        assert_eq!(config.memory_size, DEFAULT_MEMORY_SIZE);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<SimConfig, _> = serde_json::from_str(r#"{"memsize": 4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        for size in [0, 6] {
            let config = SimConfig {
                memory_size: size,
                ..SimConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn test_validate_rejects_overflow() {
        let config = SimConfig {
            memory_base: 0xFFFF_0000,
            memory_size: 0x2_0000,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        let top = SimConfig {
            memory_base: 0xFFFF_0000,
            memory_size: 0x1_0000,
            ..SimConfig::default()
        };
        assert!(top.validate().is_ok());
        assert_eq!(top.initial_sp(), 0);
    }

    #[test]
    fn test_explicit_stack_pointer() {
        let config = SimConfig {
            stack_pointer: Some(0x8000),
            ..SimConfig::default()
        };
        assert_eq!(config.initial_sp(), 0x8000);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"memory_size": 4096, "memory_base": 8192}}"#).unwrap();

        let config = SimConfig::from_file(file.path()).unwrap();

        assert_eq!(config.memory_size, 4096);
        assert_eq!(config.memory_end(), 0x3000);
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"memory_size": 3}}"#).unwrap();

        assert!(matches!(
            SimConfig::from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
