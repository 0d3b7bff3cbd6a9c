//! Instruction set: decoding, immediates, encoding and execution.

mod disasm;
pub mod encode;
mod immediate;
mod instruction;
mod rv32i;
mod rv32m;

pub use immediate::{branch_offset, jump_offset, store_offset};
pub use instruction::{BType, IType, Instruction, JType, RType, SType, UType, opcode};

use crate::Outcome;
use crate::error::{TrapCause, VmResult};
use crate::syscall::SyscallHandler;
use crate::vm::{Cpu, Memory};

/// Decode a 32-bit instruction word into an [`Instruction`].
///
/// # Errors
///
/// Returns [`TrapCause::InvalidOpcode`] carrying the raw word if the
/// opcode is not supported.
pub fn decode(word: u32) -> VmResult<Instruction> {
    instruction::decode(word)
}

/// Execute one decoded instruction against the given state.
///
/// On [`Outcome::Continue`] the PC has been advanced: to `pc + 4`, or to
/// `pc + offset` for a taken branch or a jump. On [`Outcome::Halted`] the
/// PC still points at the `ecall` that stopped the program.
///
/// # Errors
///
/// Returns a [`TrapCause`] for unknown funct3/funct7 combinations, out of
/// bounds memory accesses and failed syscalls. The faulting instruction
/// leaves registers, memory and the PC untouched.
pub fn execute<H>(
    inst: &Instruction,
    cpu: &mut Cpu,
    memory: &mut Memory,
    syscalls: &mut H,
) -> VmResult<Outcome>
where
    H: SyscallHandler + ?Sized,
{
    let pc = cpu.pc;

    let next_pc = match *inst {
        Instruction::R(r) => rv32i::execute_op(r, cpu, pc)?,
        Instruction::I(i) => match i.opcode {
            opcode::OP_IMM => rv32i::execute_op_imm(i, cpu, pc)?,
            opcode::LOAD => rv32i::execute_load(i, cpu, memory, pc)?,
            opcode::SYSTEM => return execute_ecall(i, cpu, memory, syscalls),
            _ => return Err(TrapCause::InvalidInstruction(i.raw)),
        },
        Instruction::S(s) => rv32i::execute_store(s, cpu, memory, pc)?,
        Instruction::B(b) => rv32i::execute_branch(b, cpu, pc)?,
        Instruction::U(u) => rv32i::execute_lui(u, cpu, pc),
        Instruction::J(j) => rv32i::execute_jal(j, cpu, pc),
    };

    cpu.pc = next_pc;
    Ok(Outcome::Continue)
}

/// Hand an `ecall` to the syscall handler.
///
/// Only the exact `ecall` word is accepted. Any other SYSTEM encoding, with
/// a nonzero funct3 or immediate (`ebreak` is `0x0010_0073`), is rejected
/// as an invalid instruction rather than treated as a syscall.
fn execute_ecall<H>(
    inst: IType,
    cpu: &mut Cpu,
    memory: &mut Memory,
    syscalls: &mut H,
) -> VmResult<Outcome>
where
    H: SyscallHandler + ?Sized,
{
    if inst.funct3 != 0 || inst.imm != 0 {
        return Err(TrapCause::InvalidInstruction(inst.raw));
    }

    let outcome = syscalls.handle(cpu, memory)?;
    if outcome == Outcome::Continue {
        cpu.pc = cpu.pc.wrapping_add(4);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syscall::{ConsoleSyscalls, syscall};
    use crate::vm::cpu::reg;

    fn step(word: u32, cpu: &mut Cpu, memory: &mut Memory) -> VmResult<Outcome> {
        let inst = decode(word)?;
        let mut console = ConsoleSyscalls::new(Vec::new());
        execute(&inst, cpu, memory, &mut console)
    }

    #[test]
    fn test_execute_advances_pc() {
        let mut cpu = Cpu::with_pc(0x100);
        let mut mem = Memory::new(64, 0);
        cpu.write_reg(1, 0x7FFF_FFFF);
        cpu.write_reg(2, 1);

        assert_eq!(step(encode::add(3, 1, 2), &mut cpu, &mut mem), Ok(Outcome::Continue));

        assert_eq!(cpu.read_reg(3), 0x8000_0000);
        assert_eq!(cpu.pc, 0x104);
    }

    #[test]
    fn test_branch_sets_pc_relative_to_itself() {
        let mut cpu = Cpu::with_pc(0x1000);
        let mut mem = Memory::new(64, 0);

        step(encode::beq(0, 0, -4096), &mut cpu, &mut mem).unwrap();
        assert_eq!(cpu.pc, 0);

        step(encode::bne(0, 0, 4094), &mut cpu, &mut mem).unwrap();
        assert_eq!(cpu.pc, 4);
    }

    #[test]
    fn test_jal_links_and_jumps() {
        let mut cpu = Cpu::with_pc(0x200);
        let mut mem = Memory::new(64, 0);

        step(encode::jal(reg::RA, -0x100), &mut cpu, &mut mem).unwrap();

        assert_eq!(cpu.read_reg(reg::RA), 0x204);
        assert_eq!(cpu.pc, 0x100);
    }

    #[test]
    fn test_writes_to_x0_are_discarded() {
        let mut cpu = Cpu::new();
        let mut mem = Memory::new(64, 0);

        step(encode::addi(0, 0, 5), &mut cpu, &mut mem).unwrap();
        step(encode::lui(0, 0xFFFFF), &mut cpu, &mut mem).unwrap();

        assert_eq!(cpu.read_reg(0), 0);
        assert_eq!(cpu.pc, 8);
    }

    #[test]
    fn test_exit_halts_without_advancing() {
        let mut cpu = Cpu::with_pc(0x10);
        let mut mem = Memory::new(64, 0);
        cpu.write_reg(reg::A0, syscall::EXIT);
        cpu.write_reg(5, 1234);

        assert_eq!(step(encode::ecall(), &mut cpu, &mut mem), Ok(Outcome::Halted(0)));
        assert_eq!(cpu.pc, 0x10);
    }

    #[test]
    fn test_print_syscall_continues() {
        let mut cpu = Cpu::with_pc(0x10);
        let mut mem = Memory::new(64, 0);
        cpu.write_reg(reg::A0, syscall::PRINT_INT);
        cpu.write_reg(reg::A1, 7);
        let mut console = ConsoleSyscalls::new(Vec::new());

        let inst = decode(encode::ecall()).unwrap();
        assert_eq!(execute(&inst, &mut cpu, &mut mem, &mut console), Ok(Outcome::Continue));

        assert_eq!(cpu.pc, 0x14);
        assert_eq!(console.output().as_slice(), b"7");
    }

    #[test]
    fn test_print_string_past_end_of_memory_continues() {
        let mut cpu = Cpu::new();
        let mut mem = Memory::new(64, 0);
        cpu.write_reg(reg::A0, syscall::PRINT_STRING);
        cpu.write_reg(reg::A1, 64);
        let mut console = ConsoleSyscalls::new(Vec::new());

        let inst = decode(encode::ecall()).unwrap();
        assert_eq!(execute(&inst, &mut cpu, &mut mem, &mut console), Ok(Outcome::Continue));

        assert_eq!(cpu.pc, 4);
        assert!(console.output().is_empty());
    }

    #[test]
    fn test_illegal_syscall_is_fatal() {
        let mut cpu = Cpu::with_pc(0x10);
        let mut mem = Memory::new(64, 0);
        cpu.write_reg(reg::A0, 99);

        assert_eq!(
            step(encode::ecall(), &mut cpu, &mut mem),
            Err(TrapCause::IllegalSyscall(99))
        );
        assert_eq!(cpu.pc, 0x10);
    }

    #[test]
    fn test_ebreak_encoding_is_invalid() {
        let mut cpu = Cpu::new();
        let mut mem = Memory::new(64, 0);

        assert_eq!(
            step(0x0010_0073, &mut cpu, &mut mem),
            Err(TrapCause::InvalidInstruction(0x0010_0073))
        );
    }

    #[test]
    fn test_store_fault_keeps_pc() {
        let mut cpu = Cpu::with_pc(0x20);
        let mut mem = Memory::new(64, 0);
        cpu.write_reg(1, 62);

        let result = step(encode::sw(2, 1, 0), &mut cpu, &mut mem);

        assert!(matches!(result, Err(TrapCause::OutOfBounds { addr: 62, .. })));
        assert_eq!(cpu.pc, 0x20);
    }

    #[test]
    fn test_invalid_opcode_from_decode() {
        let mut cpu = Cpu::new();
        let mut mem = Memory::new(64, 0);
        let before = cpu;

        assert_eq!(
            step(0x0000_005B, &mut cpu, &mut mem),
            Err(TrapCause::InvalidOpcode(0x0000_005B))
        );
        assert_eq!(cpu, before);
    }
}
