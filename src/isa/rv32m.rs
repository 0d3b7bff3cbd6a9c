//! Multiply and divide instructions.
//!
//! The cast warnings below are intentionally allowed because the semantics
//! require deliberate signed/unsigned reinterpretation of 32-bit values.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]

use crate::error::{TrapCause, VmResult};
use crate::isa::instruction::RType;
use crate::vm::cpu::Cpu;

/// Execute an R-type instruction from the multiply/divide group.
///
/// Returns the next PC value on success. Division by zero and signed
/// overflow do not trap:
/// - `x / 0 = -1`, `x % 0 = x`
/// - `i32::MIN / -1 = i32::MIN`, `i32::MIN % -1 = 0`
///
/// # Errors
///
/// Returns [`TrapCause::InvalidInstruction`] for funct3 values outside
/// MUL, MULH, DIV and REM.
#[inline]
pub(crate) fn execute_rv32m(inst: RType, cpu: &mut Cpu, pc: u32) -> VmResult<u32> {
    let a = cpu.read_reg(inst.rs1);
    let b = cpu.read_reg(inst.rs2);

    let result = match inst.funct3 {
        // MUL: low 32 bits of the product
        0b000 => a.wrapping_mul(b),

        // MULH: high 32 bits of signed x signed
        0b001 => {
            let product = i64::from(a as i32) * i64::from(b as i32);
            (product >> 32) as u32
        }

        // DIV: signed, truncating toward zero
        0b100 => {
            let dividend = a as i32;
            let divisor = b as i32;
            if divisor == 0 {
                u32::MAX
            } else {
                dividend.wrapping_div(divisor) as u32
            }
        }

        // REM: sign follows the dividend
        0b110 => {
            let dividend = a as i32;
            let divisor = b as i32;
            if divisor == 0 {
                a
            } else {
                dividend.wrapping_rem(divisor) as u32
            }
        }

        _ => return Err(TrapCause::InvalidInstruction(inst.raw)),
    };

    cpu.write_reg(inst.rd, result);
    Ok(pc.wrapping_add(4))
}
