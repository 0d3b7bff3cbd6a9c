//! Immediate reconstruction.
//!
//! RV32 keeps rs1/rs2/funct3 at fixed positions in every format and
//! scatters the immediate bits around them instead. These routines put the
//! pieces back together and sign-extend the result.

#![allow(clippy::cast_lossless)]

use crate::bits::sign_extend;
use crate::isa::instruction::{BType, IType, JType, SType, UType};

/// Branch offset from the split B-type immediate.
///
/// `imm5` carries imm\[4:1|11\], `imm7` carries imm\[12|10:5\]. The result is
/// a 13-bit signed, always even, byte offset.
#[must_use]
pub const fn branch_offset(imm5: u8, imm7: u8) -> i32 {
    let lo = imm5 as u32;
    let hi = imm7 as u32;
    let imm11 = (lo & 0x1) << 11;
    let imm4_1 = lo & 0x1E;
    let imm10_5 = (hi & 0x3F) << 5;
    let imm12 = ((hi >> 6) & 0x1) << 12;
    sign_extend(imm12 | imm11 | imm10_5 | imm4_1, 13)
}

/// Jump offset from the 20-bit J-type immediate.
///
/// The encoded field is imm\[20|10:1|11|19:12\]; the result is a 21-bit
/// signed, always even, byte offset.
#[must_use]
pub const fn jump_offset(imm: u32) -> i32 {
    let imm19_12 = (imm & 0xFF) << 12;
    let imm11 = ((imm >> 8) & 0x1) << 11;
    let imm10_1 = ((imm >> 9) & 0x3FF) << 1;
    let imm20 = ((imm >> 19) & 0x1) << 20;
    sign_extend(imm20 | imm19_12 | imm11 | imm10_1, 21)
}

/// Store offset: `imm7` on top of `imm5`, sign-extended from 12 bits.
#[must_use]
pub const fn store_offset(imm5: u8, imm7: u8) -> i32 {
    let imm = ((imm7 as u32 & 0x7F) << 5) | (imm5 as u32 & 0x1F);
    sign_extend(imm, 12)
}

impl BType {
    /// Signed byte offset from this instruction's address to the target.
    #[must_use]
    pub const fn offset(&self) -> i32 {
        branch_offset(self.imm5, self.imm7)
    }
}

impl JType {
    /// Signed byte offset from this instruction's address to the target.
    #[must_use]
    pub const fn offset(&self) -> i32 {
        jump_offset(self.imm)
    }
}

impl SType {
    /// Signed byte offset added to rs1 to form the store address.
    #[must_use]
    pub const fn offset(&self) -> i32 {
        store_offset(self.imm5, self.imm7)
    }
}

impl IType {
    /// The 12-bit immediate, sign-extended.
    #[must_use]
    pub const fn signed_imm(&self) -> i32 {
        sign_extend(self.imm as u32, 12)
    }

    /// Shift amount for immediate shifts: the low five bits, unsigned.
    #[must_use]
    pub const fn shamt(&self) -> u32 {
        self.imm as u32 & 0x1F
    }

    /// Bit 10 of the immediate; selects arithmetic over logical right shift.
    #[must_use]
    pub const fn is_arithmetic_shift(&self) -> bool {
        self.imm & 0x400 != 0
    }
}

impl UType {
    /// The value LUI places in rd: the 20-bit field moved to bits 31:12.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn upper(&self) -> u32 {
        (sign_extend(self.imm, 20) << 12) as u32
    }
}
