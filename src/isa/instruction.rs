//! Instruction representation and decoding.
//!
//! Every format keeps the raw word and the opcode so diagnostics can always
//! point at the exact bits that were fetched. Immediates are stored exactly
//! as encoded; the `immediate` module reassembles them into offsets.

#![allow(clippy::cast_possible_truncation)]

use crate::bits::field;
use crate::error::{TrapCause, VmResult};

/// Supported opcode values (low seven bits of an instruction word).
pub mod opcode {
    /// Register-register operations (R-type).
    pub const OP: u8 = 0x33;
    /// Register-immediate arithmetic and logic (I-type).
    pub const OP_IMM: u8 = 0x13;
    /// Loads (I-type).
    pub const LOAD: u8 = 0x03;
    /// Environment call (I-type).
    pub const SYSTEM: u8 = 0x73;
    /// Stores (S-type).
    pub const STORE: u8 = 0x23;
    /// Conditional branches (B-type).
    pub const BRANCH: u8 = 0x63;
    /// Jump and link (J-type).
    pub const JAL: u8 = 0x6F;
    /// Load upper immediate (U-type).
    pub const LUI: u8 = 0x37;
}

/// R-type fields: register-register operations.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RType {
    pub raw: u32,
    pub opcode: u8,
    pub rd: u8,
    pub funct3: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub funct7: u8,
}

/// I-type fields: immediate arithmetic, loads and ecall.
///
/// `imm` is the raw 12-bit field, not sign-extended.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IType {
    pub raw: u32,
    pub opcode: u8,
    pub rd: u8,
    pub funct3: u8,
    pub rs1: u8,
    pub imm: u16,
}

/// S-type fields: stores.
///
/// The 12-bit offset is split into `imm5` (bits 4:0) and `imm7` (bits 11:5).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SType {
    pub raw: u32,
    pub opcode: u8,
    pub funct3: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub imm5: u8,
    pub imm7: u8,
}

/// B-type fields: conditional branches.
///
/// Same layout as [`SType`], but the immediate bits are scrambled; see
/// [`BType::offset`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BType {
    pub raw: u32,
    pub opcode: u8,
    pub funct3: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub imm5: u8,
    pub imm7: u8,
}

/// U-type fields: `imm` holds instruction bits 31:12.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UType {
    pub raw: u32,
    pub opcode: u8,
    pub rd: u8,
    pub imm: u32,
}

/// J-type fields: `imm` holds instruction bits 31:12, still scrambled.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JType {
    pub raw: u32,
    pub opcode: u8,
    pub rd: u8,
    pub imm: u32,
}

/// A decoded instruction, tagged by encoding format.
///
/// The opcode alone decides the variant. Sub-fields (funct3/funct7) are
/// not validated here; unknown combinations are rejected at execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Register-register operation.
    R(RType),
    /// Register-immediate operation, load or ecall.
    I(IType),
    /// Store.
    S(SType),
    /// Conditional branch.
    B(BType),
    /// Load upper immediate.
    U(UType),
    /// Jump and link.
    J(JType),
}

impl Instruction {
    /// The raw 32-bit word this instruction was decoded from.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        match self {
            Instruction::R(r) => r.raw,
            Instruction::I(i) => i.raw,
            Instruction::S(s) => s.raw,
            Instruction::B(b) => b.raw,
            Instruction::U(u) => u.raw,
            Instruction::J(j) => j.raw,
        }
    }

    /// The 7-bit opcode.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        match self {
            Instruction::R(r) => r.opcode,
            Instruction::I(i) => i.opcode,
            Instruction::S(s) => s.opcode,
            Instruction::B(b) => b.opcode,
            Instruction::U(u) => u.opcode,
            Instruction::J(j) => j.opcode,
        }
    }

    /// Single-letter name of the encoding format.
    #[must_use]
    pub const fn format(&self) -> char {
        match self {
            Instruction::R(_) => 'R',
            Instruction::I(_) => 'I',
            Instruction::S(_) => 'S',
            Instruction::B(_) => 'B',
            Instruction::U(_) => 'U',
            Instruction::J(_) => 'J',
        }
    }
}

/// Decode a 32-bit instruction word.
///
/// Field offsets below are relative to the word shifted right past the
/// opcode: rd/imm5 at 0..5, funct3 at 5..8, rs1 at 8..13, rs2 at 13..18,
/// funct7/imm7 at 18..25, the I-type immediate at 13..25 and the U/J
/// immediate at 5..25.
///
/// # Errors
///
/// Returns [`TrapCause::InvalidOpcode`] with the raw word if the opcode is
/// not supported.
pub(super) fn decode(word: u32) -> VmResult<Instruction> {
    let op = (word & 0x7F) as u8;
    let bits = word >> 7;

    let rd = field(bits, 0, 5) as u8;
    let funct3 = field(bits, 5, 3) as u8;
    let rs1 = field(bits, 8, 5) as u8;
    let rs2 = field(bits, 13, 5) as u8;
    let funct7 = field(bits, 18, 7) as u8;

    match op {
        opcode::OP => Ok(Instruction::R(RType {
            raw: word,
            opcode: op,
            rd,
            funct3,
            rs1,
            rs2,
            funct7,
        })),
        opcode::OP_IMM | opcode::LOAD | opcode::SYSTEM => Ok(Instruction::I(IType {
            raw: word,
            opcode: op,
            rd,
            funct3,
            rs1,
            imm: field(bits, 13, 12) as u16,
        })),
        opcode::STORE => Ok(Instruction::S(SType {
            raw: word,
            opcode: op,
            funct3,
            rs1,
            rs2,
            imm5: rd,
            imm7: funct7,
        })),
        opcode::BRANCH => Ok(Instruction::B(BType {
            raw: word,
            opcode: op,
            funct3,
            rs1,
            rs2,
            imm5: rd,
            imm7: funct7,
        })),
        opcode::LUI => Ok(Instruction::U(UType {
            raw: word,
            opcode: op,
            rd,
            imm: field(bits, 5, 20),
        })),
        opcode::JAL => Ok(Instruction::J(JType {
            raw: word,
            opcode: op,
            rd,
            imm: field(bits, 5, 20),
        })),
        _ => Err(TrapCause::InvalidOpcode(word)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_add() {
        // add x8, x0, x0
        let inst = decode(0x0000_0433).unwrap();
        assert_eq!(
            inst,
            Instruction::R(RType {
                raw: 0x0000_0433,
                opcode: 0x33,
                rd: 8,
                funct3: 0,
                rs1: 0,
                rs2: 0,
                funct7: 0,
            })
        );
    }

    #[test]
    fn test_decode_sub_fields() {
        // sub x3, x1, x2
        let Instruction::R(r) = decode(0x4020_81B3).unwrap() else {
            panic!("expected R-type");
        };
        assert_eq!((r.rd, r.rs1, r.rs2), (3, 1, 2));
        assert_eq!(r.funct3, 0);
        assert_eq!(r.funct7, 0x20);
    }

    #[test]
    fn test_decode_addi_keeps_raw_immediate() {
        // addi x1, x0, -1
        let Instruction::I(i) = decode(0xFFF0_0093).unwrap() else {
            panic!("expected I-type");
        };
        assert_eq!(i.rd, 1);
        assert_eq!(i.rs1, 0);
        assert_eq!(i.imm, 0xFFF);
    }

    #[test]
    fn test_decode_load_and_ecall_are_i_type() {
        // lw x5, 8(x2)
        assert_eq!(decode(0x0081_2283).unwrap().format(), 'I');
        assert_eq!(decode(0x0000_0073).unwrap().format(), 'I');
    }

    #[test]
    fn test_decode_store_splits_immediate() {
        // sw x5, 36(x2): imm = 0b0000001_00100
        let Instruction::S(s) = decode(0x0251_2223).unwrap() else {
            panic!("expected S-type");
        };
        assert_eq!((s.rs1, s.rs2, s.funct3), (2, 5, 2));
        assert_eq!(s.imm5, 0b00100);
        assert_eq!(s.imm7, 0b000_0001);
    }

    #[test]
    fn test_decode_lui() {
        // lui x1, 0x12345
        let Instruction::U(u) = decode(0x1234_50B7).unwrap() else {
            panic!("expected U-type");
        };
        assert_eq!(u.rd, 1);
        assert_eq!(u.imm, 0x12345);
    }

    #[test]
    fn test_decode_jal() {
        // jal x1, 0
        let inst = decode(0x0000_00EF).unwrap();
        assert_eq!(inst.format(), 'J');
        assert_eq!(inst.opcode(), opcode::JAL);
    }

    #[test]
    fn test_decode_invalid_opcode() {
        assert_eq!(
            decode(0x0000_005B),
            Err(TrapCause::InvalidOpcode(0x0000_005B))
        );
        // auipc is not part of the supported set
        assert!(decode(0x0000_0017).is_err());
    }

    #[test]
    fn test_raw_is_preserved() {
        for word in [0x0020_80B3u32, 0xFFF0_0093, 0x0000_0073, 0x0020_8463] {
            assert_eq!(decode(word).unwrap().raw(), word);
        }
    }
}
