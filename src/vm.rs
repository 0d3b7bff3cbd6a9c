//! Virtual machine: architectural state plus the fetch/decode/execute loop.

pub mod cpu;
pub mod memory;

pub use cpu::Cpu;
pub use memory::{Memory, Width};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::Outcome;
use crate::error::VmResult;
use crate::isa::{self, decode};
use crate::syscall::SyscallHandler;

/// Why [`Vm::run`] stopped without a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunExit {
    /// The program asked to stop.
    Halted {
        /// Exit code reported by the syscall handler.
        code: i32,
    },
    /// The step budget ran out first.
    StepLimit,
}

/// Result of a successful [`Vm::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// How the run ended.
    pub exit: RunExit,
    /// Instructions retired during this call.
    pub steps: u64,
}

/// A single simulated hart with its memory and syscall handler.
#[derive(Debug)]
pub struct Vm<H> {
    /// Registers and program counter.
    pub cpu: Cpu,
    /// Flat memory region.
    pub memory: Memory,
    /// Handler invoked on `ecall`.
    pub syscalls: H,
    /// Instructions retired since construction.
    steps: u64,
}

impl<H: SyscallHandler> Vm<H> {
    /// Create a VM with `memory_size` bytes of zeroed memory at `base`.
    ///
    /// The PC starts at `base` and the stack pointer at the first address
    /// past the end of memory.
    #[must_use]
    pub fn new(memory_size: u32, base: u32, syscalls: H) -> Self {
        let mut cpu = Cpu::with_pc(base);
        cpu.write_reg(cpu::reg::SP, base.wrapping_add(memory_size));
        Self::from_parts(cpu, Memory::new(memory_size, base), syscalls)
    }

    /// Assemble a VM from prepared state.
    #[must_use]
    pub fn from_parts(cpu: Cpu, memory: Memory, syscalls: H) -> Self {
        Vm {
            cpu,
            memory,
            syscalls,
            steps: 0,
        }
    }

    /// Instructions retired so far, including an exit `ecall`.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Fetch, decode and execute the instruction at the PC.
    ///
    /// # Errors
    ///
    /// Returns the [`TrapCause`](crate::TrapCause) raised by the fetch,
    /// the decoder or the instruction itself. State is left as it was
    /// before the faulting instruction.
    pub fn step(&mut self) -> VmResult<Outcome> {
        let pc = self.cpu.pc;
        let word = self.memory.fetch(pc)?;
        let inst = decode(word)?;
        trace!("{pc:#010x}: {word:#010x}  {inst}");

        let outcome = isa::execute(&inst, &mut self.cpu, &mut self.memory, &mut self.syscalls)?;
        self.steps += 1;
        Ok(outcome)
    }

    /// Run until the program halts, traps, or `max_steps` instructions
    /// have retired.
    ///
    /// # Errors
    ///
    /// Returns the first [`TrapCause`](crate::TrapCause) raised.
    pub fn run(&mut self, max_steps: Option<u64>) -> VmResult<RunSummary> {
        let start = self.steps;

        loop {
            let steps = self.steps - start;
            if max_steps.is_some_and(|limit| steps >= limit) {
                debug!(steps, pc = self.cpu.pc, "step limit reached");
                return Ok(RunSummary {
                    exit: RunExit::StepLimit,
                    steps,
                });
            }

            match self.step() {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Halted(code)) => {
                    let steps = self.steps - start;
                    info!(code, steps, "program exited");
                    return Ok(RunSummary {
                        exit: RunExit::Halted { code },
                        steps,
                    });
                }
                Err(cause) => {
                    debug!(pc = self.cpu.pc, %cause, "fatal trap");
                    return Err(cause);
                }
            }
        }
    }
}
