//! Base integer instruction execution.
//!
//! Every function returns the next PC and leaves writing it to the caller.
//! Registers and memory are only touched once the instruction is known to
//! succeed, so a fatal error leaves the state as it was.
//!
//! The cast warnings below are intentionally allowed because the semantics
//! require deliberate signed/unsigned reinterpretation of 32-bit values.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::if_not_else)]

use crate::error::{TrapCause, VmResult};
use crate::isa::instruction::{BType, IType, JType, RType, SType, UType};
use crate::isa::rv32m::execute_rv32m;
use crate::vm::cpu::Cpu;
use crate::vm::memory::{Memory, Width};

/// funct7 of the multiply/divide group.
const FUNCT7_MULDIV: u8 = 0b000_0001;

/// Execute a register-register operation.
///
/// # Errors
///
/// Returns [`TrapCause::InvalidInstruction`] for an unknown funct3/funct7.
#[inline]
pub(crate) fn execute_op(inst: RType, cpu: &mut Cpu, pc: u32) -> VmResult<u32> {
    let RType {
        rd,
        rs1,
        rs2,
        funct3,
        funct7,
        ..
    } = inst;

    if funct7 == FUNCT7_MULDIV {
        return execute_rv32m(inst, cpu, pc);
    }

    let a = cpu.read_reg(rs1);
    let b = cpu.read_reg(rs2);
    let shamt = b & 0x1F;

    let result = match (funct7, funct3) {
        // ADD / SUB
        (0b000_0000, 0b000) => a.wrapping_add(b),
        (0b010_0000, 0b000) => a.wrapping_sub(b),
        // SLL
        (0b000_0000, 0b001) => a << shamt,
        // SLT
        (0b000_0000, 0b010) => {
            if (a as i32) < (b as i32) {
                1
            } else {
                0
            }
        }
        // XOR
        (0b000_0000, 0b100) => a ^ b,
        // SRL / SRA
        (0b000_0000, 0b101) => a >> shamt,
        (0b010_0000, 0b101) => ((a as i32) >> shamt) as u32,
        // OR
        (0b000_0000, 0b110) => a | b,
        // AND
        (0b000_0000, 0b111) => a & b,
        _ => return Err(TrapCause::InvalidInstruction(inst.raw)),
    };

    cpu.write_reg(rd, result);
    Ok(pc.wrapping_add(4))
}

/// Execute a register-immediate operation.
///
/// The 12-bit immediate is sign-extended for ADDI, SLTI, XORI, ORI and
/// ANDI. Shifts use only its low five bits; bit 10 picks SRAI over SRLI.
///
/// # Errors
///
/// Returns [`TrapCause::InvalidInstruction`] for an unknown funct3.
#[inline]
pub(crate) fn execute_op_imm(inst: IType, cpu: &mut Cpu, pc: u32) -> VmResult<u32> {
    let a = cpu.read_reg(inst.rs1);
    let imm = inst.signed_imm();
    let shamt = inst.shamt();

    let result = match inst.funct3 {
        // ADDI
        0b000 => a.wrapping_add(imm as u32),
        // SLLI
        0b001 => a << shamt,
        // SLTI
        0b010 => {
            if (a as i32) < imm {
                1
            } else {
                0
            }
        }
        // XORI
        0b100 => a ^ (imm as u32),
        // SRLI / SRAI
        0b101 => {
            if inst.is_arithmetic_shift() {
                ((a as i32) >> shamt) as u32
            } else {
                a >> shamt
            }
        }
        // ORI
        0b110 => a | (imm as u32),
        // ANDI
        0b111 => a & (imm as u32),
        _ => return Err(TrapCause::InvalidInstruction(inst.raw)),
    };

    cpu.write_reg(inst.rd, result);
    Ok(pc.wrapping_add(4))
}

/// Execute a load. Sub-word loads are zero-extended.
///
/// # Errors
///
/// Returns [`TrapCause::InvalidInstruction`] for an unknown funct3 and
/// [`TrapCause::OutOfBounds`] if the access leaves memory.
#[inline]
pub(crate) fn execute_load(
    inst: IType,
    cpu: &mut Cpu,
    memory: &Memory,
    pc: u32,
) -> VmResult<u32> {
    let width = match inst.funct3 {
        0b000 => Width::Byte,
        0b001 => Width::Half,
        0b010 => Width::Word,
        _ => return Err(TrapCause::InvalidInstruction(inst.raw)),
    };

    let addr = cpu.read_reg(inst.rs1).wrapping_add(inst.signed_imm() as u32);
    let value = memory.load(addr, width)?;
    cpu.write_reg(inst.rd, value);
    Ok(pc.wrapping_add(4))
}

/// Execute a store of the low 1/2/4 bytes of rs2.
///
/// # Errors
///
/// Returns [`TrapCause::InvalidInstruction`] for an unknown funct3 and
/// [`TrapCause::OutOfBounds`] if the access leaves memory.
#[inline]
pub(crate) fn execute_store(
    inst: SType,
    cpu: &Cpu,
    memory: &mut Memory,
    pc: u32,
) -> VmResult<u32> {
    let width = match inst.funct3 {
        0b000 => Width::Byte,
        0b001 => Width::Half,
        0b010 => Width::Word,
        _ => return Err(TrapCause::InvalidInstruction(inst.raw)),
    };

    let addr = cpu.read_reg(inst.rs1).wrapping_add(inst.offset() as u32);
    memory.store(addr, width, cpu.read_reg(inst.rs2))?;
    Ok(pc.wrapping_add(4))
}

/// Execute a conditional branch.
///
/// A taken branch targets `pc + offset`; otherwise execution falls through
/// to `pc + 4`.
///
/// # Errors
///
/// Returns [`TrapCause::InvalidInstruction`] for an unknown funct3.
#[inline]
pub(crate) fn execute_branch(inst: BType, cpu: &Cpu, pc: u32) -> VmResult<u32> {
    let a = cpu.read_reg(inst.rs1);
    let b = cpu.read_reg(inst.rs2);

    let taken = match inst.funct3 {
        // BEQ
        0b000 => a == b,
        // BNE
        0b001 => a != b,
        _ => return Err(TrapCause::InvalidInstruction(inst.raw)),
    };

    if taken {
        Ok(pc.wrapping_add(inst.offset() as u32))
    } else {
        Ok(pc.wrapping_add(4))
    }
}

/// Execute JAL: link `pc + 4` into rd, jump to `pc + offset`.
#[inline]
pub(crate) fn execute_jal(inst: JType, cpu: &mut Cpu, pc: u32) -> u32 {
    cpu.write_reg(inst.rd, pc.wrapping_add(4));
    pc.wrapping_add(inst.offset() as u32)
}

/// Execute LUI: place the 20-bit immediate in the upper bits of rd.
#[inline]
pub(crate) fn execute_lui(inst: UType, cpu: &mut Cpu, pc: u32) -> u32 {
    cpu.write_reg(inst.rd, inst.upper());
    pc.wrapping_add(4)
}
