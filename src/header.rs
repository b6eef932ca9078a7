//! The fixed 6-byte packet header.
//!
//! ```text
//! offset  bytes  field
//! 0..2    2      total packet size, header included (LE)
//! 2       1      is_encrypted (0/1)
//! 3       1      is_compressed (0/1)
//! 4..6    2      packet type tag (LE)
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::wire::{read_u16_le, write_u16_le};
use crate::error::HeaderError;

/// Length of the header in bytes.
pub const HEADER_SIZE: usize = 6;

pub(crate) const SIZE_OFFSET: usize = 0;
pub(crate) const ENCRYPTED_OFFSET: usize = 2;
pub(crate) const COMPRESSED_OFFSET: usize = 3;
pub(crate) const TYPE_OFFSET: usize = 4;

/// Decoded view of the header fields. The flags and the type tag are opaque
/// to the codec: stored and returned, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PacketHeader {
    pub size: u16,
    pub is_encrypted: bool,
    pub is_compressed: bool,
    pub packet_type: u16,
}

impl PacketHeader {
    /// Header of a packet with an empty payload.
    pub fn new(packet_type: u16, is_encrypted: bool, is_compressed: bool) -> Self {
        PacketHeader {
            size: HEADER_SIZE as u16,
            is_encrypted,
            is_compressed,
            packet_type,
        }
    }

    /// Parse the header from the front of `buf`.
    pub fn read(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < HEADER_SIZE {
            return Err(HeaderError::TooShort {
                need: HEADER_SIZE,
                have: buf.len(),
            });
        }
        Ok(PacketHeader {
            size: read_u16_le(&buf[SIZE_OFFSET..]),
            is_encrypted: buf[ENCRYPTED_OFFSET] != 0,
            is_compressed: buf[COMPRESSED_OFFSET] != 0,
            packet_type: read_u16_le(&buf[TYPE_OFFSET..]),
        })
    }

    /// Serialize into the 6-byte wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        write_u16_le(&mut buf[SIZE_OFFSET..], self.size);
        buf[ENCRYPTED_OFFSET] = self.is_encrypted as u8;
        buf[COMPRESSED_OFFSET] = self.is_compressed as u8;
        write_u16_le(&mut buf[TYPE_OFFSET..], self.packet_type);
        buf
    }

    /// Payload length the size field declares, zero if it claims less than a header.
    pub fn payload_len(&self) -> usize {
        (self.size as usize).saturating_sub(HEADER_SIZE)
    }
}
