#![no_main]

use std::io;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rv32sim::isa::{decode, execute};
use rv32sim::{ConsoleSyscalls, Cpu, Memory};

/// One instruction against an arbitrary register file.
#[derive(Arbitrary, Debug)]
struct ExecuteInput {
    /// Instruction word.
    word: u32,
    /// Initial registers; x0 is forced to zero.
    regs: [u32; 32],
    /// Initial program counter.
    pc: u32,
    /// Memory contents, at most 4 KiB.
    memory: Vec<u8>,
}

fuzz_target!(|input: ExecuteInput| {
    let Ok(inst) = decode(input.word) else {
        return;
    };

    let mut cpu = Cpu::with_pc(input.pc);
    cpu.set_registers(input.regs);

    let mut memory = Memory::new(4096, 0);
    let len = input.memory.len().min(4096);
    let _ = memory.store_bytes(0, &input.memory[..len]);

    let before = cpu;
    let result = execute(&inst, &mut cpu, &mut memory, &mut ConsoleSyscalls::new(io::sink()));

    assert_eq!(cpu.read_reg(0), 0, "x0 changed by {inst}");
    assert_eq!(cpu.registers()[0], 0, "x0 storage changed by {inst}");
    if result.is_err() {
        assert_eq!(cpu, before, "trap on {inst} modified state");
    }
});
