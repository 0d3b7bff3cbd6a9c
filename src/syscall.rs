//! Environment-call handling.
//!
//! Programs put a service number in a0 (x10) and its argument in a1 (x11),
//! then execute `ecall`. The handler decides what the call does; the
//! executor only advances the PC when the handler asks to continue.

use std::io::{self, Write};

use crate::Outcome;
use crate::error::{TrapCause, VmResult};
use crate::vm::cpu::reg;
use crate::vm::{Cpu, Memory};

/// Syscall numbers understood by [`ConsoleSyscalls`].
pub mod syscall {
    /// Print a1 as a signed decimal integer.
    pub const PRINT_INT: u32 = 1;
    /// Print the NUL-terminated string at address a1.
    pub const PRINT_STRING: u32 = 4;
    /// Terminate the program with exit code 0.
    pub const EXIT: u32 = 10;
    /// Print the low byte of a1 as a character.
    pub const PRINT_CHAR: u32 = 11;
}

/// Line written to the console when a program exits through syscall 10.
pub const EXIT_MESSAGE: &str = "exiting the simulator\n";

/// Services `ecall` instructions.
pub trait SyscallHandler {
    /// Handle one environment call against the current state.
    ///
    /// Returning [`Outcome::Continue`] lets execution move past the
    /// `ecall`; [`Outcome::Halted`] ends the run.
    ///
    /// # Errors
    ///
    /// Returns a [`TrapCause`] if the call is unknown or cannot be serviced.
    fn handle(&mut self, cpu: &mut Cpu, memory: &mut Memory) -> VmResult<Outcome>;
}

/// Console syscalls writing to any [`Write`] sink.
#[derive(Debug)]
pub struct ConsoleSyscalls<W> {
    out: W,
}

impl ConsoleSyscalls<io::Stdout> {
    /// Console bound to the process's standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSyscalls<W> {
    /// Create a console that writes to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Borrow the underlying sink.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consume the handler and return the sink.
    #[must_use]
    pub fn into_output(self) -> W {
        self.out
    }
}

impl<W: Write> SyscallHandler for ConsoleSyscalls<W> {
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    fn handle(&mut self, cpu: &mut Cpu, memory: &mut Memory) -> VmResult<Outcome> {
        let number = cpu.read_reg(reg::A0);
        let arg = cpu.read_reg(reg::A1);

        match number {
            syscall::PRINT_INT => {
                write!(self.out, "{}", arg as i32)?;
            }
            syscall::PRINT_STRING => {
                let text = memory.c_string(arg);
                self.out.write_all(text)?;
            }
            syscall::EXIT => {
                self.out.write_all(EXIT_MESSAGE.as_bytes())?;
                self.out.flush()?;
                return Ok(Outcome::Halted(0));
            }
            syscall::PRINT_CHAR => {
                self.out.write_all(&[arg as u8])?;
            }
            _ => return Err(TrapCause::IllegalSyscall(number)),
        }

        Ok(Outcome::Continue)
    }
}
