//! Textual disassembly.

use std::fmt;

use crate::isa::instruction::{Instruction, opcode};

impl Instruction {
    /// Assembly mnemonic, or `None` if the sub-fields name no supported
    /// operation.
    #[must_use]
    pub fn mnemonic(&self) -> Option<&'static str> {
        let name = match self {
            Instruction::R(r) => match (r.funct7, r.funct3) {
                (0x00, 0b000) => "add",
                (0x20, 0b000) => "sub",
                (0x00, 0b001) => "sll",
                (0x00, 0b010) => "slt",
                (0x00, 0b100) => "xor",
                (0x00, 0b101) => "srl",
                (0x20, 0b101) => "sra",
                (0x00, 0b110) => "or",
                (0x00, 0b111) => "and",
                (0x01, 0b000) => "mul",
                (0x01, 0b001) => "mulh",
                (0x01, 0b100) => "div",
                (0x01, 0b110) => "rem",
                _ => return None,
            },
            Instruction::I(i) => match (i.opcode, i.funct3) {
                (opcode::OP_IMM, 0b000) => "addi",
                (opcode::OP_IMM, 0b001) => "slli",
                (opcode::OP_IMM, 0b010) => "slti",
                (opcode::OP_IMM, 0b100) => "xori",
                (opcode::OP_IMM, 0b101) if i.is_arithmetic_shift() => "srai",
                (opcode::OP_IMM, 0b101) => "srli",
                (opcode::OP_IMM, 0b110) => "ori",
                (opcode::OP_IMM, 0b111) => "andi",
                (opcode::LOAD, 0b000) => "lb",
                (opcode::LOAD, 0b001) => "lh",
                (opcode::LOAD, 0b010) => "lw",
                (opcode::SYSTEM, 0b000) if i.imm == 0 => "ecall",
                _ => return None,
            },
            Instruction::S(s) => match s.funct3 {
                0b000 => "sb",
                0b001 => "sh",
                0b010 => "sw",
                _ => return None,
            },
            Instruction::B(b) => match b.funct3 {
                0b000 => "beq",
                0b001 => "bne",
                _ => return None,
            },
            Instruction::U(_) => "lui",
            Instruction::J(_) => "jal",
        };
        Some(name)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(name) = self.mnemonic() else {
            return write!(f, "unknown ({:#010x})", self.raw());
        };

        match self {
            Instruction::R(r) => write!(f, "{name} x{}, x{}, x{}", r.rd, r.rs1, r.rs2),
            Instruction::I(i) => match i.opcode {
                opcode::SYSTEM => f.write_str(name),
                opcode::LOAD => write!(f, "{name} x{}, {}(x{})", i.rd, i.signed_imm(), i.rs1),
                _ if i.funct3 == 0b001 || i.funct3 == 0b101 => {
                    write!(f, "{name} x{}, x{}, {}", i.rd, i.rs1, i.shamt())
                }
                _ => write!(f, "{name} x{}, x{}, {}", i.rd, i.rs1, i.signed_imm()),
            },
            Instruction::S(s) => write!(f, "{name} x{}, {}(x{})", s.rs2, s.offset(), s.rs1),
            Instruction::B(b) => write!(f, "{name} x{}, x{}, {}", b.rs1, b.rs2, b.offset()),
            Instruction::U(u) => write!(f, "{name} x{}, {:#x}", u.rd, u.imm),
            Instruction::J(j) => write!(f, "{name} x{}, {}", j.rd, j.offset()),
        }
    }
}
