//! The packet buffer: a 6-byte header followed by the payload.
//!
//! Encoding appends to the end of the payload; decoding consumes from the
//! front. Both keep the header's size field equal to the header length plus
//! the payload length.

use std::borrow::Cow;

use crate::codec::wire::{read_u16_le, write_u16_le};
use crate::codec::{self, Decoder};
use crate::config::{CodecConfig, OverflowPolicy};
use crate::derive_traits::{PacketDecode, PacketEncode};
use crate::error::{DecodeError, EncodeError, HeaderError};
use crate::header::{
    PacketHeader, COMPRESSED_OFFSET, ENCRYPTED_OFFSET, HEADER_SIZE, SIZE_OFFSET, TYPE_OFFSET,
};
use crate::shape::Shape;
use crate::value::Value;

/// Largest size the 16-bit header field can hold.
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// One framed packet.
///
/// # Example
///
/// ```rust
/// use rawpkt::{Packet, Value};
///
/// let mut packet = Packet::new(1, false, false);
/// packet.encode_value(&Value::Text("Hello world".into())).unwrap();
/// assert_eq!(packet.size(), 6 + 4 + 11);
///
/// let text: String = packet.read().unwrap();
/// assert_eq!(text, "Hello world");
/// assert_eq!(packet.size(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    data: Vec<u8>,
    config: CodecConfig,
}

impl Packet {
    /// An empty packet: header only, `size() == 6`.
    pub fn new(packet_type: u16, is_encrypted: bool, is_compressed: bool) -> Self {
        let header = PacketHeader::new(packet_type, is_encrypted, is_compressed);
        Packet {
            data: header.to_bytes().to_vec(),
            config: CodecConfig::default(),
        }
    }

    /// Wrap received bytes. The header fields are taken as they are; the
    /// size field is not checked against the buffer length.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, HeaderError> {
        let data = bytes.into();
        let header = PacketHeader::read(&data)?;
        log::debug!(
            "packet type {} declares {} bytes, {} buffered",
            header.packet_type,
            header.size,
            data.len()
        );
        Ok(Packet {
            data,
            config: CodecConfig::default(),
        })
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    pub fn size(&self) -> u16 {
        read_u16_le(&self.data[SIZE_OFFSET..])
    }

    pub fn packet_type(&self) -> u16 {
        read_u16_le(&self.data[TYPE_OFFSET..])
    }

    pub fn set_type(&mut self, packet_type: u16) {
        write_u16_le(&mut self.data[TYPE_OFFSET..], packet_type);
    }

    pub fn is_encrypted(&self) -> bool {
        self.data[ENCRYPTED_OFFSET] != 0
    }

    pub fn is_compressed(&self) -> bool {
        self.data[COMPRESSED_OFFSET] != 0
    }

    pub fn header(&self) -> PacketHeader {
        PacketHeader {
            size: self.size(),
            is_encrypted: self.is_encrypted(),
            is_compressed: self.is_compressed(),
            packet_type: self.packet_type(),
        }
    }

    /// The whole buffer, header included.
    pub fn buffer(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The undecoded payload: bytes after the header, up to the declared
    /// size or the end of the buffer, whichever comes first.
    pub fn payload(&self) -> &[u8] {
        let end = (self.size() as usize).min(self.data.len());
        self.data.get(HEADER_SIZE..end).unwrap_or(&[])
    }

    /// The payload as text, invalid UTF-8 replaced.
    pub fn payload_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.payload())
    }

    /// Length of the undecoded payload.
    pub fn remaining(&self) -> usize {
        self.payload().len()
    }

    /// Append bytes to the payload verbatim.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.add_size(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Encode a typed value at the end of the payload.
    pub fn encode<T: PacketEncode>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.encode_as(&T::shape(), &value.to_value())
    }

    /// Encode a dynamic value under its own shape.
    pub fn encode_value(&mut self, value: &Value) -> Result<(), EncodeError> {
        self.encode_as(&value.shape(), value)
    }

    /// Encode `value` under an explicit `shape`. On error the packet is left
    /// exactly as it was.
    pub fn encode_as(&mut self, shape: &Shape, value: &Value) -> Result<(), EncodeError> {
        let start = self.data.len();
        let result = codec::encode(&mut self.data, shape, value, self.config)
            .and_then(|()| self.add_size(self.data.len() - start));
        if let Err(e) = result {
            self.data.truncate(start);
            return Err(e);
        }
        log::debug!("encoded {} ({} bytes)", shape, self.data.len() - start);
        Ok(())
    }

    /// Decode into an existing typed target, consuming the bytes read.
    pub fn decode<T: PacketEncode + PacketDecode>(
        &mut self,
        target: &mut T,
    ) -> Result<(), DecodeError> {
        self.consume(|decoder| decoder.decode(target))
    }

    /// Decode into a dynamic target using the target's own shape.
    pub fn decode_value(&mut self, target: &mut Value) -> Result<(), DecodeError> {
        self.consume(|decoder| decoder.decode_value(target))
    }

    /// Decode a new `T`, starting from the zero value of its shape.
    pub fn read<T: PacketEncode + PacketDecode>(&mut self) -> Result<T, DecodeError> {
        self.consume(|decoder| decoder.read())
    }

    /// Decode a value of `shape` with no typed target.
    pub fn read_value(&mut self, shape: &Shape) -> Result<Value, DecodeError> {
        self.consume(|decoder| decoder.read_value(shape))
    }

    /// A decoder over the current payload that leaves the packet untouched.
    pub fn reader(&self) -> Decoder<'_> {
        Decoder::new(self.payload(), self.config)
    }

    /// Run one decode over the payload, then drop what it consumed. Nothing
    /// is dropped when the decode fails.
    fn consume<R>(
        &mut self,
        f: impl FnOnce(&mut Decoder<'_>) -> Result<R, DecodeError>,
    ) -> Result<R, DecodeError> {
        let mut decoder = Decoder::new(self.payload(), self.config);
        let result = f(&mut decoder)?;
        let consumed = decoder.position();
        self.remove_size(consumed);
        log::debug!(
            "decoded {} bytes from packet type {}, {} left",
            consumed,
            self.packet_type(),
            self.remaining()
        );
        Ok(result)
    }

    fn add_size(&mut self, n: usize) -> Result<(), EncodeError> {
        let size = self.size() as usize + n;
        if size > MAX_PACKET_SIZE && self.config.overflow == OverflowPolicy::Reject {
            return Err(EncodeError::PacketTooLarge {
                size,
                max: MAX_PACKET_SIZE,
            });
        }
        write_u16_le(&mut self.data[SIZE_OFFSET..], size as u16);
        Ok(())
    }

    /// Drop `n` payload bytes from the front. `n` never exceeds the readable
    /// payload, so neither the size nor the range can underflow.
    fn remove_size(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let size = self.size() - n as u16;
        write_u16_le(&mut self.data[SIZE_OFFSET..], size);
        self.data.drain(HEADER_SIZE..HEADER_SIZE + n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::IntWidth;
    use crate::value::Record;

    #[test]
    fn test_new() {
        let packet = Packet::new(0x0203, false, true);
        assert_eq!(packet.buffer(), &[0x06, 0x00, 0x00, 0x01, 0x03, 0x02]);
        assert_eq!(packet.size(), 6);
        assert_eq!(packet.packet_type(), 0x0203);
        assert!(!packet.is_encrypted());
        assert!(packet.is_compressed());
        assert_eq!(packet.remaining(), 0);
    }

    #[test]
    fn test_set_type_leaves_size() {
        let mut packet = Packet::new(1, false, false);
        packet.set_type(9);
        assert_eq!(packet.packet_type(), 9);
        assert_eq!(packet.size(), 6);
    }

    #[test]
    fn test_from_bytes_too_short() {
        assert!(matches!(
            Packet::from_bytes(vec![0x06, 0x00]),
            Err(HeaderError::TooShort { need: 6, have: 2 })
        ));
    }

    #[test]
    fn test_write_raw_updates_size() {
        let mut packet = Packet::new(1, false, false);
        packet.write_raw(b"abc").unwrap();
        assert_eq!(packet.size(), 9);
        assert_eq!(packet.payload(), b"abc");
        assert_eq!(packet.payload_text(), "abc");
    }

    #[test]
    fn test_encode_rolls_back_on_error() {
        let mut packet = Packet::new(1, false, false);
        packet.encode(&7u8).unwrap();
        let before = packet.clone();

        let shape = Shape::record("R", vec![("a", Shape::Bool), ("b", Shape::Bool)]);
        let value = Value::Record(Record::new("R").with_field("a", true).with_field("b", 1u8));
        assert!(packet.encode_as(&shape, &value).is_err());
        assert_eq!(packet, before);
    }

    #[test]
    fn test_packet_too_large() {
        let mut packet = Packet::new(1, false, false);
        let big = vec![0u8; MAX_PACKET_SIZE - HEADER_SIZE - 1];
        assert!(matches!(
            packet.encode(&big),
            Err(EncodeError::PacketTooLarge { size: 65536, .. })
        ));
        assert_eq!(packet.size(), 6);
        assert_eq!(packet.buffer().len(), 6);

        let mut packet = Packet::new(1, false, false).with_config(CodecConfig::compat());
        packet.encode(&big).unwrap();
        assert_eq!(packet.size(), 0);
    }

    #[test]
    fn test_decode_consumes_prefix() {
        let mut packet = Packet::new(1, false, false);
        packet.encode(&0x0102u16).unwrap();
        packet.encode(&0x03u8).unwrap();
        assert_eq!(packet.size(), 9);

        let a: u16 = packet.read().unwrap();
        assert_eq!(a, 0x0102);
        assert_eq!(packet.size(), 7);
        assert_eq!(packet.buffer(), &[0x07, 0x00, 0x00, 0x00, 0x01, 0x00, 0x03]);
    }

    #[test]
    fn test_strict_error_leaves_packet() {
        let mut packet = Packet::new(1, false, false);
        packet.encode(&1u16).unwrap();
        let before = packet.clone();
        assert!(matches!(
            packet.read::<u32>(),
            Err(DecodeError::Truncated { need: 4, have: 2 })
        ));
        assert_eq!(packet, before);
    }

    #[test]
    fn test_declared_size_bounds_reads() {
        // Declared size 8 with 4 payload bytes buffered.
        let mut packet =
            Packet::from_bytes(vec![0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0xAA, 0xBB, 0xCC, 0xDD])
                .unwrap();
        assert_eq!(packet.remaining(), 2);
        assert!(packet.read::<u32>().is_err());

        let mut packet = packet.with_config(CodecConfig::compat());
        let mut target = 5u32;
        packet.decode(&mut target).unwrap();
        assert_eq!(target, 5);
        assert_eq!(packet.remaining(), 2);
    }

    #[test]
    fn test_declared_size_past_buffer() {
        let mut packet = Packet::from_bytes(vec![0xFF, 0x00, 0x00, 0x00, 0x01, 0x00, 0x2A]).unwrap();
        assert_eq!(packet.remaining(), 1);
        assert_eq!(packet.read::<u8>().unwrap(), 42);
        assert!(packet.read::<u8>().is_err());
    }

    #[test]
    fn test_reader_does_not_consume() {
        let mut packet = Packet::new(1, false, false);
        packet.encode(&0x11223344u32).unwrap();

        let mut reader = packet.reader();
        let low: u16 = reader.read().unwrap();
        assert_eq!(low, 0x3344);
        assert_eq!(reader.position(), 2);

        let whole = packet
            .reader()
            .read_value(&Shape::Uint(IntWidth::W32))
            .unwrap();
        assert_eq!(whole, Value::U32(0x11223344));
        assert_eq!(packet.size(), 10);
    }
}
