//! Architectural state: registers and program counter.

/// ABI names for the registers the simulator itself touches.
pub mod reg {
    /// Hard-wired zero.
    pub const ZERO: u8 = 0;
    /// Return address.
    pub const RA: u8 = 1;
    /// Stack pointer.
    pub const SP: u8 = 2;
    /// Global pointer.
    pub const GP: u8 = 3;
    /// Syscall number / first argument.
    pub const A0: u8 = 10;
    /// Syscall argument.
    pub const A1: u8 = 11;
}

/// Register file and program counter of one simulated hart.
///
/// Register x0 is hardwired to zero: writes to it are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cpu {
    /// General-purpose registers x0-x31.
    x: [u32; 32],

    /// Program counter: byte address of the instruction about to execute.
    pub pc: u32,
}

impl Cpu {
    /// Create a new CPU with all registers and the PC zeroed.
    #[must_use]
    pub fn new() -> Self {
        Cpu {
            x: [0u32; 32],
            pc: 0,
        }
    }

    /// Create a new CPU with a specific entry point.
    #[must_use]
    pub fn with_pc(pc: u32) -> Self {
        Cpu { x: [0u32; 32], pc }
    }

    /// Read a register value. x0 always returns 0.
    ///
    /// Only the low five bits of `reg` select the register.
    #[inline]
    #[must_use]
    pub fn read_reg(&self, reg: u8) -> u32 {
        let index = usize::from(reg & 0x1F);
        if index == 0 { 0 } else { self.x[index] }
    }

    /// Write a register value. Writes to x0 are ignored.
    #[inline]
    pub fn write_reg(&mut self, reg: u8, value: u32) {
        let index = usize::from(reg & 0x1F);
        if index != 0 {
            self.x[index] = value;
        }
    }

    /// Get a reference to the register file.
    #[must_use]
    pub fn registers(&self) -> &[u32; 32] {
        &self.x
    }

    /// Replace the whole register file. x0 is forced back to zero.
    pub fn set_registers(&mut self, regs: [u32; 32]) {
        self.x = regs;
        self.x[0] = 0;
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
