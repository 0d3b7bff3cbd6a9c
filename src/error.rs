//! Error types for the simulator core.

use std::io;

/// Memory access type for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    /// Read access (load instructions, syscall string reads).
    Read,
    /// Write access (store instructions).
    Write,
    /// Execute access (instruction fetch).
    Execute,
}

/// Fatal conditions that end a simulated run.
///
/// None of these are recoverable: the faulting instruction has no effect,
/// and it is up to the embedding host to report and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrapCause {
    /// The low seven bits of the word are not a supported opcode.
    #[error("Invalid Instruction: {0:#010x}")]
    InvalidOpcode(u32),
    /// Supported opcode with an unknown funct3/funct7 combination.
    #[error("Invalid Instruction: {0:#010x}")]
    InvalidInstruction(u32),
    /// ECALL with an unknown service number in a0.
    #[error("Illegal ecall number {}", signed(.0))]
    IllegalSyscall(u32),
    /// Memory access outside the configured address range.
    #[error("{} Address: {addr:#010x}", access_label(.access))]
    OutOfBounds {
        /// The first address of the offending access.
        addr: u32,
        /// The type of access attempted.
        access: AccessType,
    },
    /// The console sink failed while servicing a syscall.
    #[error("console write failed: {0}")]
    HostIo(io::ErrorKind),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn access_label(access: &AccessType) -> &'static str {
    match access {
        AccessType::Read => "Bad Read.",
        AccessType::Write => "Bad Write.",
        AccessType::Execute => "Bad Fetch.",
    }
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::cast_possible_wrap)]
fn signed(number: &u32) -> i32 {
    *number as i32
}

impl From<io::Error> for TrapCause {
    fn from(e: io::Error) -> Self {
        TrapCause::HostIo(e.kind())
    }
}

/// Result type for simulator operations.
pub type VmResult<T> = Result<T, TrapCause>;
