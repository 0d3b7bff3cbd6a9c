//! CLI command implementations for rv32sim.

pub(crate) mod decode;
pub(crate) mod disasm;
pub(crate) mod run;

mod output;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rv32sim::config::ConfigError;
use rv32sim::{LoadError, SimConfig, TrapCause};

/// Format of the report printed after `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    /// No report.
    None,
    /// Human-readable register dump.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Memory layout options shared by commands that load a program.
#[derive(Debug, Args)]
pub(crate) struct MemoryArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Memory size in bytes (overrides the config file)
    #[arg(long, value_parser = parse_u32)]
    memory_size: Option<u32>,

    /// Memory base address (overrides the config file)
    #[arg(long, value_parser = parse_u32)]
    memory_base: Option<u32>,
}

impl MemoryArgs {
    /// Build the simulator configuration from the file and flag overrides.
    pub(crate) fn resolve(&self, max_steps: Option<u64>) -> Result<SimConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::default(),
        };

        if let Some(size) = self.memory_size {
            config.memory_size = size;
        }
        if let Some(base) = self.memory_base {
            config.memory_base = base;
        }
        if max_steps.is_some() {
            config.max_steps = max_steps;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse a decimal or `0x`-prefixed hex number.
pub(crate) fn parse_u32(text: &str) -> Result<u32, String> {
    let text = text.trim().replace('_', "");
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid number {text:?}: {e}"))
}

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The program image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The simulated program hit a fatal error.
    #[error("{cause} (pc {pc:#010x})")]
    Trap {
        /// What went wrong.
        cause: TrapCause,
        /// Address of the faulting instruction.
        pc: u32,
    },

    /// The program did not exit within its step budget.
    #[error("step limit of {0} instructions reached")]
    StepLimit(u64),

    /// JSON report serialization failed.
    #[error("failed to write report: {0}")]
    Report(#[from] serde_json::Error),

    /// A command-line value was malformed.
    #[error("{0}")]
    Usage(String),
}
