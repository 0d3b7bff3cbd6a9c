//! Disasm command implementation.

use std::path::Path;

use rv32sim::{ImageFormat, decode, loader};

use super::{CliError, MemoryArgs};

/// Execute the disasm command.
///
/// Prints one `address: word  asm` line per word of every executable
/// segment.
///
/// # Errors
///
/// Returns an error if the program cannot be loaded.
pub(crate) fn execute(
    program: &Path,
    image: Option<ImageFormat>,
    memory: &MemoryArgs,
) -> Result<(), CliError> {
    let config = memory.resolve(None)?;
    let loaded = loader::load_file(program, image, &config)?;
    let words = loaded
        .code_words()
        .map_err(|cause| CliError::Trap { cause, pc: loaded.cpu.pc })?;

    for (addr, word) in words {
        println!("{}", format_line(addr, word));
    }

    Ok(())
}

/// Format one disassembly line.
pub(super) fn format_line(addr: u32, word: u32) -> String {
    match decode(word) {
        Ok(inst) => format!("{addr:08x}: {word:08x}  {inst}"),
        Err(_) => format!("{addr:08x}: {word:08x}  .word {word:#010x}"),
    }
}
