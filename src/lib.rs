// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! rv32sim: an instruction-set simulator for a small RV32IM subset.
//!
//! The core is two entry points, [`isa::decode`] and [`isa::execute`],
//! operating on an explicit [`Cpu`] and [`Memory`]. [`Vm`] bundles them
//! with a [`SyscallHandler`] and drives the fetch/decode/execute loop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / loader (ELF, bin, hex)      │
//! ├─────────────────────────────────────┤
//! │   Vm: fetch, step, run              │
//! ├─────────────────────────────────────┤
//! │   isa: decode, execute, syscalls    │
//! ├─────────────────────────────────────┤
//! │   Cpu (x0-x31, pc) + Memory         │
//! └─────────────────────────────────────┘
//! ```

pub mod bits;
pub mod config;
pub mod error;
pub mod isa;
pub mod loader;
pub mod syscall;
pub mod vm;

pub use config::SimConfig;
pub use error::{AccessType, TrapCause, VmResult};
pub use isa::{Instruction, decode, execute};
pub use loader::{ImageFormat, LoadError, Program};
pub use syscall::{ConsoleSyscalls, SyscallHandler};
pub use vm::{Cpu, Memory, RunExit, RunSummary, Vm};

/// Result of executing one instruction that did not trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Execution proceeds at the (already updated) PC.
    Continue,
    /// The program asked to stop with the given exit code.
    Halted(i32),
}
