//! Instruction encoders.
//!
//! The inverse of decoding: builds machine words from operands. Offsets are
//! byte offsets; immediates are truncated to their field width, so callers
//! are responsible for passing values that fit.

#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]

use crate::isa::instruction::opcode;

/// Build an R-type word.
#[must_use]
pub const fn r_type(op: u8, rd: u8, funct3: u8, rs1: u8, rs2: u8, funct7: u8) -> u32 {
    ((funct7 as u32 & 0x7F) << 25)
        | ((rs2 as u32 & 0x1F) << 20)
        | ((rs1 as u32 & 0x1F) << 15)
        | ((funct3 as u32 & 0x7) << 12)
        | ((rd as u32 & 0x1F) << 7)
        | (op as u32 & 0x7F)
}

/// Build an I-type word from a signed 12-bit immediate.
#[must_use]
pub const fn i_type(op: u8, rd: u8, funct3: u8, rs1: u8, imm: i32) -> u32 {
    (((imm as u32) & 0xFFF) << 20)
        | ((rs1 as u32 & 0x1F) << 15)
        | ((funct3 as u32 & 0x7) << 12)
        | ((rd as u32 & 0x1F) << 7)
        | (op as u32 & 0x7F)
}

/// Build an S-type word from a signed 12-bit offset.
#[must_use]
pub const fn s_type(op: u8, funct3: u8, rs1: u8, rs2: u8, offset: i32) -> u32 {
    let imm = offset as u32 & 0xFFF;
    ((imm >> 5) << 25)
        | ((rs2 as u32 & 0x1F) << 20)
        | ((rs1 as u32 & 0x1F) << 15)
        | ((funct3 as u32 & 0x7) << 12)
        | ((imm & 0x1F) << 7)
        | (op as u32 & 0x7F)
}

/// Build a B-type word from a signed, even, 13-bit byte offset.
#[must_use]
pub const fn b_type(op: u8, funct3: u8, rs1: u8, rs2: u8, offset: i32) -> u32 {
    let imm = offset as u32;
    (((imm >> 12) & 0x1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | ((rs2 as u32 & 0x1F) << 20)
        | ((rs1 as u32 & 0x1F) << 15)
        | ((funct3 as u32 & 0x7) << 12)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 0x1) << 7)
        | (op as u32 & 0x7F)
}

/// Build a U-type word; `imm20` lands in bits 31:12.
#[must_use]
pub const fn u_type(op: u8, rd: u8, imm20: u32) -> u32 {
    ((imm20 & 0xF_FFFF) << 12) | ((rd as u32 & 0x1F) << 7) | (op as u32 & 0x7F)
}

/// Build a J-type word from a signed, even, 21-bit byte offset.
#[must_use]
pub const fn j_type(op: u8, rd: u8, offset: i32) -> u32 {
    let imm = offset as u32;
    (((imm >> 20) & 0x1) << 31)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 11) & 0x1) << 20)
        | (((imm >> 12) & 0xFF) << 12)
        | ((rd as u32 & 0x1F) << 7)
        | (op as u32 & 0x7F)
}

macro_rules! r_ops {
    ($($(#[$doc:meta])* $name:ident = ($funct3:expr, $funct7:expr);)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub const fn $name(rd: u8, rs1: u8, rs2: u8) -> u32 {
                r_type(opcode::OP, rd, $funct3, rs1, rs2, $funct7)
            }
        )*
    };
}

macro_rules! i_ops {
    ($op:expr; $($(#[$doc:meta])* $name:ident = $funct3:expr;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub const fn $name(rd: u8, rs1: u8, imm: i32) -> u32 {
                i_type($op, rd, $funct3, rs1, imm)
            }
        )*
    };
}

r_ops! {
    /// `add rd, rs1, rs2`
    add = (0x0, 0x00);
    /// `sub rd, rs1, rs2`
    sub = (0x0, 0x20);
    /// `sll rd, rs1, rs2`
    sll = (0x1, 0x00);
    /// `slt rd, rs1, rs2`
    slt = (0x2, 0x00);
    /// `xor rd, rs1, rs2`
    xor = (0x4, 0x00);
    /// `srl rd, rs1, rs2`
    srl = (0x5, 0x00);
    /// `sra rd, rs1, rs2`
    sra = (0x5, 0x20);
    /// `or rd, rs1, rs2`
    or = (0x6, 0x00);
    /// `and rd, rs1, rs2`
    and = (0x7, 0x00);
    /// `mul rd, rs1, rs2`
    mul = (0x0, 0x01);
    /// `mulh rd, rs1, rs2`
    mulh = (0x1, 0x01);
    /// `div rd, rs1, rs2`
    div = (0x4, 0x01);
    /// `rem rd, rs1, rs2`
    rem = (0x6, 0x01);
}

i_ops! { opcode::OP_IMM;
    /// `addi rd, rs1, imm`
    addi = 0x0;
    /// `slti rd, rs1, imm`
    slti = 0x2;
    /// `xori rd, rs1, imm`
    xori = 0x4;
    /// `ori rd, rs1, imm`
    ori = 0x6;
    /// `andi rd, rs1, imm`
    andi = 0x7;
}

i_ops! { opcode::LOAD;
    /// `lb rd, imm(rs1)`
    lb = 0x0;
    /// `lh rd, imm(rs1)`
    lh = 0x1;
    /// `lw rd, imm(rs1)`
    lw = 0x2;
}

/// `slli rd, rs1, shamt`
#[must_use]
pub const fn slli(rd: u8, rs1: u8, shamt: u32) -> u32 {
    i_type(opcode::OP_IMM, rd, 0x1, rs1, (shamt & 0x1F) as i32)
}

/// `srli rd, rs1, shamt`
#[must_use]
pub const fn srli(rd: u8, rs1: u8, shamt: u32) -> u32 {
    i_type(opcode::OP_IMM, rd, 0x5, rs1, (shamt & 0x1F) as i32)
}

/// `srai rd, rs1, shamt`
#[must_use]
pub const fn srai(rd: u8, rs1: u8, shamt: u32) -> u32 {
    i_type(opcode::OP_IMM, rd, 0x5, rs1, 0x400 | (shamt & 0x1F) as i32)
}

/// `sb rs2, offset(rs1)`
#[must_use]
pub const fn sb(rs2: u8, rs1: u8, offset: i32) -> u32 {
    s_type(opcode::STORE, 0x0, rs1, rs2, offset)
}

/// `sh rs2, offset(rs1)`
#[must_use]
pub const fn sh(rs2: u8, rs1: u8, offset: i32) -> u32 {
    s_type(opcode::STORE, 0x1, rs1, rs2, offset)
}

/// `sw rs2, offset(rs1)`
#[must_use]
pub const fn sw(rs2: u8, rs1: u8, offset: i32) -> u32 {
    s_type(opcode::STORE, 0x2, rs1, rs2, offset)
}

/// `beq rs1, rs2, offset`
#[must_use]
pub const fn beq(rs1: u8, rs2: u8, offset: i32) -> u32 {
    b_type(opcode::BRANCH, 0x0, rs1, rs2, offset)
}

/// `bne rs1, rs2, offset`
#[must_use]
pub const fn bne(rs1: u8, rs2: u8, offset: i32) -> u32 {
    b_type(opcode::BRANCH, 0x1, rs1, rs2, offset)
}

/// `jal rd, offset`
#[must_use]
pub const fn jal(rd: u8, offset: i32) -> u32 {
    j_type(opcode::JAL, rd, offset)
}

/// `lui rd, imm20`
#[must_use]
pub const fn lui(rd: u8, imm20: u32) -> u32 {
    u_type(opcode::LUI, rd, imm20)
}

/// `ecall`
#[must_use]
pub const fn ecall() -> u32 {
    opcode::SYSTEM as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(add(1, 1, 2), 0x0020_80B3);
        assert_eq!(sub(3, 1, 2), 0x4020_81B3);
        assert_eq!(mul(3, 1, 2), 0x0220_81B3);
        assert_eq!(div(3, 1, 2), 0x0220_C1B3);
        assert_eq!(addi(1, 0, 42), 0x02A0_0093);
        assert_eq!(addi(1, 0, -1), 0xFFF0_0093);
        assert_eq!(srai(1, 1, 3), 0x4030_D093);
        assert_eq!(lw(5, 2, 8), 0x0081_2283);
        assert_eq!(sw(5, 2, 36), 0x0251_2223);
        assert_eq!(beq(1, 2, 8), 0x0020_8463);
        assert_eq!(bne(1, 0, -4), 0xFE00_9EE3);
        assert_eq!(jal(1, 0), 0x0000_00EF);
        assert_eq!(jal(0, -8), 0xFF9F_F06F);
        assert_eq!(lui(1, 0x12345), 0x1234_50B7);
        assert_eq!(ecall(), 0x0000_0073);
    }
}
