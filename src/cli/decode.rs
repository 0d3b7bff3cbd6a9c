//! Decode command implementation.

use rv32sim::Instruction;

use super::{CliError, parse_u32};

/// Execute the decode command.
///
/// # Errors
///
/// Returns an error if any argument is not a 32-bit number. Words that do
/// not decode are reported inline.
pub(crate) fn execute(words: &[String]) -> Result<(), CliError> {
    for text in words {
        let digits = text.trim();
        let hex = if digits.starts_with("0x") || digits.starts_with("0X") {
            digits.to_string()
        } else {
            format!("0x{digits}")
        };
        let word = parse_u32(&hex).map_err(CliError::Usage)?;
        println!("{}", describe(word));
    }
    Ok(())
}

/// One-line description: word, format, fields and disassembly.
pub(super) fn describe(word: u32) -> String {
    match rv32sim::decode(word) {
        Ok(inst) => format!("{word:#010x}  {}  {:<40} {inst}", inst.format(), fields(&inst)),
        Err(cause) => format!("{word:#010x}  {cause}"),
    }
}

fn fields(inst: &Instruction) -> String {
    match inst {
        Instruction::R(r) => format!(
            "rd={} funct3={} rs1={} rs2={} funct7={:#04x}",
            r.rd, r.funct3, r.rs1, r.rs2, r.funct7
        ),
        Instruction::I(i) => format!(
            "rd={} funct3={} rs1={} imm={}",
            i.rd,
            i.funct3,
            i.rs1,
            i.signed_imm()
        ),
        Instruction::S(s) => format!(
            "funct3={} rs1={} rs2={} offset={}",
            s.funct3,
            s.rs1,
            s.rs2,
            s.offset()
        ),
        Instruction::B(b) => format!(
            "funct3={} rs1={} rs2={} offset={}",
            b.funct3,
            b.rs1,
            b.rs2,
            b.offset()
        ),
        Instruction::U(u) => format!("rd={} imm={:#07x}", u.rd, u.imm),
        Instruction::J(j) => format!("rd={} offset={}", j.rd, j.offset()),
    }
}
