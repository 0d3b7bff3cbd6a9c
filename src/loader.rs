//! Program image loading: ELF executables, flat binaries and hex text.

use std::fs;
use std::path::Path;

use goblin::elf::Elf;
use goblin::elf::program_header::{PF_X, PT_LOAD};
use tracing::debug;

use crate::config::SimConfig;
use crate::error::TrapCause;
use crate::syscall::SyscallHandler;
use crate::vm::cpu::reg;
use crate::vm::{Cpu, Memory, Vm};

/// Symbol whose value seeds the global pointer.
const GLOBAL_POINTER_SYMBOL: &str = "__global_pointer$";

/// Error type for program loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),

    /// goblin rejected the ELF file.
    #[error("failed to parse ELF: {0}")]
    Parse(#[from] goblin::error::Error),

    /// The ELF is well formed but not something this simulator runs.
    #[error("unsupported ELF: {0}")]
    Unsupported(String),

    /// A segment does not fit in the configured memory.
    #[error("segment error: {0}")]
    Segment(String),

    /// A line of a hex image is not a 32-bit hex word.
    #[error("hex image line {line}: invalid word {text:?}")]
    Hex {
        /// One-based line number.
        line: usize,
        /// Offending text after comment stripping.
        text: String,
    },

    /// Copying the image into memory faulted.
    #[error("image does not fit in memory: {0}")]
    Memory(#[from] TrapCause),
}

/// On-disk program image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageFormat {
    /// 32-bit little-endian RISC-V ELF executable.
    Elf,
    /// Raw bytes copied to the memory base.
    Bin,
    /// One hex word per line, copied to the memory base.
    Hex,
}

impl ImageFormat {
    /// Guess the format from file contents.
    ///
    /// ELF magic wins; otherwise UTF-8 text in which every non-comment line
    /// is a hex word is treated as a hex image, and anything else as raw
    /// binary.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"\x7fELF") {
            return ImageFormat::Elf;
        }

        match std::str::from_utf8(bytes) {
            Ok(text) if !text.trim().is_empty() && parse_hex(text).is_ok() => ImageFormat::Hex,
            _ => ImageFormat::Bin,
        }
    }
}

/// A contiguous range of loaded memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// First address.
    pub addr: u32,
    /// Length in bytes of initialized data.
    pub len: u32,
    /// Whether the segment holds code.
    pub executable: bool,
}

/// A loaded program, ready to run.
#[derive(Debug, Clone)]
pub struct Program {
    /// Initial CPU state: entry PC, stack pointer and global pointer.
    pub cpu: Cpu,
    /// Memory with the image copied in.
    pub memory: Memory,
    /// Format the image was read as.
    pub format: ImageFormat,
    /// Regions written by the loader.
    pub segments: Vec<Segment>,
}

impl Program {
    /// Wrap the loaded state in a [`Vm`].
    #[must_use]
    pub fn into_vm<H: SyscallHandler>(self, syscalls: H) -> Vm<H> {
        Vm::from_parts(self.cpu, self.memory, syscalls)
    }

    /// Words of every executable segment, paired with their addresses.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if a segment lies outside memory,
    /// which the loader never produces.
    pub fn code_words(&self) -> Result<Vec<(u32, u32)>, TrapCause> {
        let mut words = Vec::new();
        for seg in self.segments.iter().filter(|s| s.executable) {
            let bytes = self.memory.load_bytes(seg.addr, seg.len)?;
            for (addr, chunk) in (seg.addr..).step_by(4).zip(bytes.chunks(4)) {
                let mut word = [0u8; 4];
                word[..chunk.len()].copy_from_slice(chunk);
                words.push((addr, u32::from_le_bytes(word)));
            }
        }
        Ok(words)
    }
}

/// Read a program image from disk, detecting the format if not given.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or loaded.
pub fn load_file(
    path: impl AsRef<Path>,
    format: Option<ImageFormat>,
    config: &SimConfig,
) -> Result<Program, LoadError> {
    let bytes = fs::read(path)?;
    let format = format.unwrap_or_else(|| ImageFormat::detect(&bytes));
    load(&bytes, format, config)
}

/// Load an image held in memory.
///
/// # Errors
///
/// Returns [`LoadError`] if the image is malformed or does not fit in the
/// memory described by `config`.
pub fn load(bytes: &[u8], format: ImageFormat, config: &SimConfig) -> Result<Program, LoadError> {
    match format {
        ImageFormat::Elf => load_elf(bytes, config),
        ImageFormat::Bin => load_flat(bytes, ImageFormat::Bin, config),
        ImageFormat::Hex => {
            let text = std::str::from_utf8(bytes).map_err(|_| LoadError::Hex {
                line: 0,
                text: "<not utf-8>".to_string(),
            })?;
            let image: Vec<u8> = parse_hex(text)?
                .into_iter()
                .flat_map(u32::to_le_bytes)
                .collect();
            load_flat(&image, ImageFormat::Hex, config)
        }
    }
}

/// Copy raw bytes to the memory base; the entry point is the base.
fn load_flat(image: &[u8], format: ImageFormat, config: &SimConfig) -> Result<Program, LoadError> {
    let len = u32::try_from(image.len())
        .ok()
        .filter(|len| *len <= config.memory_size)
        .ok_or_else(|| {
            LoadError::Segment(format!(
                "image of {} bytes exceeds memory size {:#x}",
                image.len(),
                config.memory_size
            ))
        })?;

    let mut memory = Memory::new(config.memory_size, config.memory_base);
    memory.store_bytes(config.memory_base, image)?;
    debug!(addr = config.memory_base, len, "loaded flat image");

    Ok(Program {
        cpu: initial_cpu(config.memory_base, config),
        memory,
        format,
        segments: vec![Segment {
            addr: config.memory_base,
            len,
            executable: true,
        }],
    })
}

/// Load the PT_LOAD segments of an ELF executable.
fn load_elf(bytes: &[u8], config: &SimConfig) -> Result<Program, LoadError> {
    let elf = Elf::parse(bytes)?;
    validate_elf_header(&elf)?;

    let mut memory = Memory::new(config.memory_size, config.memory_base);
    let mut segments = Vec::new();

    for phdr in elf.program_headers.iter().filter(|p| p.p_type == PT_LOAD) {
        segments.push(load_segment(&mut memory, bytes, phdr, config)?);
    }

    let entry = u32::try_from(elf.entry)
        .map_err(|_| LoadError::Unsupported(format!("entry point {:#x} exceeds 32 bits", elf.entry)))?;

    let mut cpu = initial_cpu(entry, config);
    if let Some(gp) = find_global_pointer(&elf) {
        cpu.write_reg(reg::GP, gp);
    }

    Ok(Program {
        cpu,
        memory,
        format: ImageFormat::Elf,
        segments,
    })
}

/// Accept only 32-bit little-endian RISC-V executables.
fn validate_elf_header(elf: &Elf) -> Result<(), LoadError> {
    if elf.header.e_machine != goblin::elf::header::EM_RISCV {
        return Err(LoadError::Unsupported(format!(
            "expected RISC-V (machine {}), got machine type {}",
            goblin::elf::header::EM_RISCV,
            elf.header.e_machine
        )));
    }

    if elf.is_64 {
        return Err(LoadError::Unsupported("expected 32-bit ELF, got 64-bit".to_string()));
    }

    if !elf.little_endian {
        return Err(LoadError::Unsupported("expected little-endian ELF".to_string()));
    }

    Ok(())
}

/// Copy one segment's file data; the BSS tail is already zero.
fn load_segment(
    memory: &mut Memory,
    bytes: &[u8],
    phdr: &goblin::elf::ProgramHeader,
    config: &SimConfig,
) -> Result<Segment, LoadError> {
    let too_large = |what: &str, value: u64| LoadError::Segment(format!("{what} {value:#x} exceeds 32 bits"));

    let vaddr = u32::try_from(phdr.p_vaddr).map_err(|_| too_large("vaddr", phdr.p_vaddr))?;
    let memsz = u32::try_from(phdr.p_memsz).map_err(|_| too_large("memsz", phdr.p_memsz))?;
    let filesz = u32::try_from(phdr.p_filesz).map_err(|_| too_large("filesz", phdr.p_filesz))?;
    let offset = usize::try_from(phdr.p_offset).map_err(|_| too_large("offset", phdr.p_offset))?;

    if vaddr < config.memory_base {
        return Err(LoadError::Segment(format!(
            "segment at {vaddr:#x} below memory base {:#x}",
            config.memory_base
        )));
    }

    let end = u64::from(vaddr) + u64::from(memsz.max(filesz));
    let memory_end = u64::from(config.memory_base) + u64::from(config.memory_size);
    if end > memory_end {
        return Err(LoadError::Segment(format!(
            "segment at {vaddr:#x} size {memsz:#x} exceeds memory end {memory_end:#x}"
        )));
    }

    let data = offset
        .checked_add(filesz as usize)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| {
            LoadError::Segment(format!(
                "segment data at offset {offset:#x} size {filesz:#x} exceeds file size {:#x}",
                bytes.len()
            ))
        })?;
    memory.store_bytes(vaddr, data)?;

    let executable = phdr.p_flags & PF_X != 0;
    debug!(addr = vaddr, filesz, memsz, executable, "loaded segment");

    Ok(Segment {
        addr: vaddr,
        len: filesz,
        executable,
    })
}

/// Find the global pointer symbol value if present.
fn find_global_pointer(elf: &Elf) -> Option<u32> {
    elf.syms
        .iter()
        .find(|sym| elf.strtab.get_at(sym.st_name) == Some(GLOBAL_POINTER_SYMBOL))
        .and_then(|sym| u32::try_from(sym.st_value).ok())
}

fn initial_cpu(entry: u32, config: &SimConfig) -> Cpu {
    let mut cpu = Cpu::with_pc(entry);
    cpu.write_reg(reg::SP, config.initial_sp());
    cpu
}

/// Parse a hex image: one word per line, `#` starts a comment.
fn parse_hex(text: &str) -> Result<Vec<u32>, LoadError> {
    let mut words = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let digits = line
            .strip_prefix("0x")
            .or_else(|| line.strip_prefix("0X"))
            .unwrap_or(line)
            .replace('_', "");
        let bad_line = || LoadError::Hex {
            line: index + 1,
            text: line.to_string(),
        };
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad_line());
        }
        let word = u32::from_str_radix(&digits, 16).map_err(|_| bad_line())?;
        words.push(word);
    }

    Ok(words)
}
