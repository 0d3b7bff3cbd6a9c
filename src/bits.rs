//! Bit-field helpers shared by the decoder and the immediate reconstructors.

/// Sign-extend the low `bits` bits of `field` to a full 32-bit integer.
///
/// Bits above position `bits - 1` are discarded. `bits` must be in `1..=32`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn sign_extend(field: u32, bits: u32) -> i32 {
    debug_assert!(bits.wrapping_sub(1) < 32);
    let shift = 32 - bits;
    ((field << shift) as i32) >> shift
}

/// Extract `len` bits of `word` starting at bit `lo`.
#[inline]
#[must_use]
pub(crate) const fn field(word: u32, lo: u32, len: u32) -> u32 {
    (word >> lo) & ((1 << len) - 1)
}
