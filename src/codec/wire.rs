//! Little-endian wire format utilities for packet encoding/decoding.

/// Read a 16-bit unsigned integer from a little-endian byte slice.
#[inline]
pub fn read_u16_le(buf: &[u8]) -> u16 {
    u16::from_le_bytes([buf[0], buf[1]])
}

/// Read a 32-bit unsigned integer from a little-endian byte slice.
#[inline]
pub fn read_u32_le(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

/// Read a 64-bit unsigned integer from a little-endian byte slice.
#[inline]
pub fn read_u64_le(buf: &[u8]) -> u64 {
    u64::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]])
}

/// Write a 16-bit unsigned integer in little-endian.
#[inline]
pub fn write_u16_le(buf: &mut [u8], val: u16) {
    buf[..2].copy_from_slice(&val.to_le_bytes());
}

/// Append a 16-bit unsigned integer in little-endian.
#[inline]
pub fn put_u16_le(out: &mut Vec<u8>, val: u16) {
    out.extend_from_slice(&val.to_le_bytes());
}

/// Append a 32-bit unsigned integer in little-endian.
#[inline]
pub fn put_u32_le(out: &mut Vec<u8>, val: u32) {
    out.extend_from_slice(&val.to_le_bytes());
}

/// Append a 64-bit unsigned integer in little-endian.
#[inline]
pub fn put_u64_le(out: &mut Vec<u8>, val: u64) {
    out.extend_from_slice(&val.to_le_bytes());
}

/// Size of the text length prefix.
pub const SIZEOF_TEXT_LENGTH: usize = 4;
/// Size of the sequence element count prefix.
pub const SIZEOF_SEQUENCE_COUNT: usize = 2;
/// Size of an encoded timestamp (signed epoch seconds).
pub const SIZEOF_TIMESTAMP: usize = 8;
/// Size of a native (`isize`/`usize`) integer on the wire, independent of the host.
pub const SIZEOF_NATIVE_INT: usize = 4;
/// Largest element count a sequence prefix can carry.
pub const MAX_SEQUENCE_LEN: usize = u16::MAX as usize;
