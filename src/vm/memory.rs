//! Memory subsystem with load/store operations.
//!
//! The truncation warnings are allowed because this is a 32-bit VM that
//! enforces memory size limits at construction time.

#![allow(clippy::cast_possible_truncation)]

use crate::error::{AccessType, TrapCause, VmResult};

/// Width of a single memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// One byte.
    Byte,
    /// Two bytes.
    Half,
    /// Four bytes.
    Word,
}

/// Byte-addressable memory for a VM instance.
///
/// A flat, zero-initialized region `[base, base + size)` that is never
/// resized. All multi-byte accesses are little-endian; alignment is not
/// enforced, bounds are.
#[derive(Debug, Clone)]
pub struct Memory {
    /// Backing storage.
    data: Vec<u8>,

    /// Base address of this memory region.
    base: u32,
}

impl Memory {
    /// Create a new memory region of the given size.
    ///
    /// Memory is zero-initialized and starts at the given base address.
    #[must_use]
    pub fn new(size: u32, base: u32) -> Self {
        Memory {
            data: vec![0u8; size as usize],
            base,
        }
    }

    /// Get the size of this memory region in bytes.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    /// Get the base address of this memory region.
    #[must_use]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Check if an address range is valid for the given access type.
    #[inline]
    fn check_bounds(&self, addr: u32, len: u32, access: AccessType) -> VmResult<usize> {
        if addr < self.base {
            return Err(TrapCause::OutOfBounds { addr, access });
        }

        let offset = addr.wrapping_sub(self.base);
        let end = offset.saturating_add(len);

        if end > self.data.len() as u32 {
            return Err(TrapCause::OutOfBounds { addr, access });
        }

        Ok(offset as usize)
    }

    /// Load `width` bytes at `addr`, zero-extended to 32 bits.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if any byte of the access falls
    /// outside memory.
    #[inline]
    pub fn load(&self, addr: u32, width: Width) -> VmResult<u32> {
        match width {
            Width::Byte => self.load_u8(addr).map(u32::from),
            Width::Half => self.load_u16(addr).map(u32::from),
            Width::Word => self.load_u32(addr),
        }
    }

    /// Store the low `width` bytes of `value` at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if any byte of the access falls
    /// outside memory. Nothing is written in that case.
    #[inline]
    pub fn store(&mut self, addr: u32, width: Width, value: u32) -> VmResult<()> {
        match width {
            Width::Byte => self.store_u8(addr, value as u8),
            Width::Half => self.store_u16(addr, value as u16),
            Width::Word => self.store_u32(addr, value),
        }
    }

    /// Load a byte (8-bit) from memory.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address is out of bounds.
    #[inline]
    pub fn load_u8(&self, addr: u32) -> VmResult<u8> {
        let offset = self.check_bounds(addr, 1, AccessType::Read)?;
        Ok(self.data[offset])
    }

    /// Load a halfword (16-bit) from memory, little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address is out of bounds.
    #[inline]
    pub fn load_u16(&self, addr: u32) -> VmResult<u16> {
        let offset = self.check_bounds(addr, 2, AccessType::Read)?;
        Ok(u16::from_le_bytes([
            self.data[offset],
            self.data[offset + 1],
        ]))
    }

    /// Load a word (32-bit) from memory, little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address is out of bounds.
    #[inline]
    pub fn load_u32(&self, addr: u32) -> VmResult<u32> {
        let offset = self.check_bounds(addr, 4, AccessType::Read)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[offset..offset + 4]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Store a byte (8-bit) to memory.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address is out of bounds.
    #[inline]
    pub fn store_u8(&mut self, addr: u32, value: u8) -> VmResult<()> {
        let offset = self.check_bounds(addr, 1, AccessType::Write)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Store a halfword (16-bit) to memory, little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address is out of bounds.
    #[inline]
    pub fn store_u16(&mut self, addr: u32, value: u16) -> VmResult<()> {
        let offset = self.check_bounds(addr, 2, AccessType::Write)?;
        self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Store a word (32-bit) to memory, little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address is out of bounds.
    #[inline]
    pub fn store_u32(&mut self, addr: u32, value: u32) -> VmResult<()> {
        let offset = self.check_bounds(addr, 4, AccessType::Write)?;
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Fetch an instruction word from memory.
    ///
    /// Identical to `load_u32` but reports faults as [`AccessType::Execute`].
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address is out of bounds.
    #[inline]
    pub fn fetch(&self, addr: u32) -> VmResult<u32> {
        let offset = self.check_bounds(addr, 4, AccessType::Execute)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[offset..offset + 4]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Load a slice of bytes from memory.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address range is out of bounds.
    #[inline]
    pub fn load_bytes(&self, addr: u32, len: u32) -> VmResult<&[u8]> {
        let offset = self.check_bounds(addr, len, AccessType::Read)?;
        Ok(&self.data[offset..offset + len as usize])
    }

    /// Store a slice of bytes to memory.
    ///
    /// # Errors
    ///
    /// Returns [`TrapCause::OutOfBounds`] if the address range is out of bounds.
    #[inline]
    pub fn store_bytes(&mut self, addr: u32, bytes: &[u8]) -> VmResult<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| TrapCause::OutOfBounds {
            addr,
            access: AccessType::Write,
        })?;
        let offset = self.check_bounds(addr, len, AccessType::Write)?;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Bytes of the NUL-terminated string starting at `addr`.
    ///
    /// Stops at the first zero byte or at the end of memory, whichever
    /// comes first; the terminator is not included. A start address
    /// outside memory yields an empty string.
    #[must_use]
    pub fn c_string(&self, addr: u32) -> &[u8] {
        let Some(offset) = addr.checked_sub(self.base) else {
            return &[];
        };
        let tail = self.data.get(offset as usize..).unwrap_or_default();
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_store_byte() {
        let mut mem = Memory::new(256, 0);

        mem.store_u8(0, 0x42).unwrap();
        assert_eq!(mem.load_u8(0).unwrap(), 0x42);

        mem.store_u8(255, 0xFF).unwrap();
        assert_eq!(mem.load_u8(255).unwrap(), 0xFF);
    }

    #[test]
    fn test_load_store_word_little_endian() {
        let mut mem = Memory::new(256, 0);

        mem.store_u32(0, 0x1234_5678).unwrap();

        assert_eq!(mem.load_u8(0).unwrap(), 0x78);
        assert_eq!(mem.load_u8(1).unwrap(), 0x56);
        assert_eq!(mem.load_u8(2).unwrap(), 0x34);
        assert_eq!(mem.load_u8(3).unwrap(), 0x12);

        assert_eq!(mem.load_u32(0).unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_width_store_truncates_value() {
        let mut mem = Memory::new(16, 0);

        mem.store(0, Width::Word, 0xFFFF_FFFF).unwrap();
        mem.store(0, Width::Half, 0xDEAD_BEEF).unwrap();

        assert_eq!(mem.load(0, Width::Word).unwrap(), 0xFFFF_BEEF);

        mem.store(3, Width::Byte, 0x1234).unwrap();
        assert_eq!(mem.load(0, Width::Word).unwrap(), 0x34FF_BEEF);
    }

    #[test]
    fn test_width_load_zero_extends() {
        let mut mem = Memory::new(16, 0);
        mem.store(4, Width::Word, 0xDEAD_BEEF).unwrap();

        assert_eq!(mem.load(4, Width::Byte).unwrap(), 0xEF);
        assert_eq!(mem.load(4, Width::Half).unwrap(), 0xBEEF);
        assert_eq!(mem.load(4, Width::Word).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_base_address() {
        let mut mem = Memory::new(256, 0x1000);

        mem.store_u32(0x1000, 0xDEAD_BEEF).unwrap();
        assert_eq!(mem.load_u32(0x1000).unwrap(), 0xDEAD_BEEF);

        assert!(mem.load_u8(0x0FFF).is_err());
    }

    #[test]
    fn test_bounds_checking() {
        let mut mem = Memory::new(256, 0);

        assert!(mem.load_u8(255).is_ok());
        assert!(mem.load_u32(252).is_ok());

        assert_eq!(
            mem.load_u32(253),
            Err(TrapCause::OutOfBounds {
                addr: 253,
                access: AccessType::Read
            })
        );
        assert_eq!(
            mem.store(u32::MAX, Width::Half, 0),
            Err(TrapCause::OutOfBounds {
                addr: u32::MAX,
                access: AccessType::Write
            })
        );
        assert_eq!(
            mem.fetch(256),
            Err(TrapCause::OutOfBounds {
                addr: 256,
                access: AccessType::Execute
            })
        );
    }

    #[test]
    fn test_failed_store_writes_nothing() {
        let mut mem = Memory::new(8, 0);
        assert!(mem.store(6, Width::Word, 0xFFFF_FFFF).is_err());
        assert_eq!(mem.load_bytes(0, 8).unwrap(), &[0u8; 8]);
    }

    #[test]
    fn test_c_string() {
        let mut mem = Memory::new(16, 0);
        mem.store_bytes(2, b"hi\0there").unwrap();

        assert_eq!(mem.c_string(2), b"hi");
        assert_eq!(mem.c_string(5), b"there");
        // runs into the end of memory without a terminator
        mem.store_bytes(12, b"abcd").unwrap();
        assert_eq!(mem.c_string(12), b"abcd");
    }

    #[test]
    fn test_c_string_outside_memory_is_empty() {
        let mut mem = Memory::new(16, 0x100);
        mem.store_bytes(0x100, b"abc\0").unwrap();

        assert!(mem.c_string(0x110).is_empty());
        assert!(mem.c_string(0xFF).is_empty());
        assert!(mem.c_string(u32::MAX).is_empty());
        assert_eq!(mem.c_string(0x100), b"abc");
    }
}
