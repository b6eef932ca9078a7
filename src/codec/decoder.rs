use crate::config::{CodecConfig, DecodeMode};
use crate::derive_traits::{PacketDecode, PacketEncode};
use crate::error::DecodeError;
use crate::shape::{IntWidth, RecordShape, Shape};
use crate::value::{Record, Value};

use super::wire::*;

/// Shape-driven reader over a payload slice.
///
/// Reads advance an explicit offset; the slice itself is never modified, so
/// the same bytes can be decoded any number of times. `Packet::decode`
/// uses a `Decoder` and then drops the consumed prefix from its buffer.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    config: CodecConfig,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8], config: CodecConfig) -> Self {
        Decoder {
            buf,
            pos: 0,
            config,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Decode into `target`, using the target's own shape.
    ///
    /// On error the target and the read position are left unchanged.
    pub fn decode_value(&mut self, target: &mut Value) -> Result<(), DecodeError> {
        let shape = target.shape();
        let start = self.pos;
        let mut scratch = target.clone();
        match self.decode_shape(&shape, &mut scratch) {
            Ok(()) => {
                *target = scratch;
                Ok(())
            }
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Decode into an existing typed target. Fields a lenient decode skips
    /// keep their current value.
    pub fn decode<T: PacketEncode + PacketDecode>(
        &mut self,
        target: &mut T,
    ) -> Result<(), DecodeError> {
        let start = self.pos;
        let mut value = target.to_value();
        self.decode_value(&mut value)?;
        match T::from_value(value) {
            Ok(decoded) => {
                *target = decoded;
                Ok(())
            }
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Decode a new `T`, starting from the zero value of its shape.
    pub fn read<T: PacketEncode + PacketDecode>(&mut self) -> Result<T, DecodeError> {
        let start = self.pos;
        let mut value = Value::zero(&T::shape());
        self.decode_value(&mut value)?;
        T::from_value(value).map_err(|e| {
            self.pos = start;
            e
        })
    }

    /// Decode a value of `shape` without a typed target, e.g. one parsed
    /// from a descriptor string.
    pub fn read_value(&mut self, shape: &Shape) -> Result<Value, DecodeError> {
        let mut value = Value::zero(shape);
        self.decode_value(&mut value)?;
        Ok(value)
    }

    /// Take the next `n` bytes. `Ok(None)` means a lenient short read: nothing
    /// is consumed and the caller leaves its field untouched.
    fn take(&mut self, n: usize, what: &Shape) -> Result<Option<&'a [u8]>, DecodeError> {
        let have = self.remaining();
        if have < n {
            return match self.config.decode_mode {
                DecodeMode::Strict => Err(DecodeError::Truncated { need: n, have }),
                DecodeMode::Lenient => {
                    log::warn!(
                        "skipping {}: need {} bytes at offset {}, have {}",
                        what.kind_name(),
                        n,
                        self.pos,
                        have
                    );
                    Ok(None)
                }
            };
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(Some(bytes))
    }

    fn decode_shape(&mut self, shape: &Shape, target: &mut Value) -> Result<(), DecodeError> {
        match shape {
            Shape::Bool => {
                let Value::Bool(v) = target else {
                    return Err(mismatch(shape, target));
                };
                if let Some(b) = self.take(1, shape)? {
                    *v = match b[0] {
                        0 => false,
                        1 => true,
                        other if self.config.decode_mode == DecodeMode::Strict => {
                            return Err(DecodeError::InvalidBool(other));
                        }
                        _ => false,
                    };
                }
            }
            Shape::Int(width) => self.decode_signed(shape, *width, target)?,
            Shape::Uint(width) => self.decode_unsigned(shape, *width, target)?,
            Shape::F32 => {
                let Value::F32(v) = target else {
                    return Err(mismatch(shape, target));
                };
                if let Some(b) = self.take(4, shape)? {
                    *v = f32::from_bits(read_u32_le(b));
                }
            }
            Shape::F64 => {
                let Value::F64(v) = target else {
                    return Err(mismatch(shape, target));
                };
                if let Some(b) = self.take(8, shape)? {
                    *v = f64::from_bits(read_u64_le(b));
                }
            }
            Shape::Text => {
                let Value::Text(s) = target else {
                    return Err(mismatch(shape, target));
                };
                self.decode_text(s)?;
            }
            Shape::Timestamp => {
                let Value::Timestamp(secs) = target else {
                    return Err(mismatch(shape, target));
                };
                if let Some(b) = self.take(SIZEOF_TIMESTAMP, shape)? {
                    *secs = read_u64_le(b) as i64;
                }
            }
            Shape::Array { len, elem } => {
                let items = match target {
                    Value::Array { items, .. } if items.len() == *len => items,
                    _ => return Err(mismatch(shape, target)),
                };
                for item in items.iter_mut() {
                    self.decode_shape(elem, item)?;
                }
            }
            Shape::Sequence(elem) => {
                let Value::Sequence {
                    elem: target_elem,
                    items,
                } = target
                else {
                    return Err(mismatch(shape, target));
                };
                self.decode_sequence(shape, elem, target_elem, items)?;
            }
            Shape::Record(record_shape) => {
                let Value::Record(record) = target else {
                    return Err(mismatch(shape, target));
                };
                self.decode_record(shape, record_shape, record)?;
            }
            Shape::Optional(target_shape) => {
                let Value::Optional { value, .. } = target else {
                    return Err(mismatch(shape, target));
                };
                // Always present on the wire: materialize an absent target first.
                let inner = value.get_or_insert_with(|| Box::new(Value::zero(target_shape)));
                self.decode_shape(target_shape, inner)?;
            }
        }
        Ok(())
    }

    fn decode_signed(
        &mut self,
        shape: &Shape,
        width: IntWidth,
        target: &mut Value,
    ) -> Result<(), DecodeError> {
        let Some(b) = self.take_scalar(shape, width, target)? else {
            return Ok(());
        };
        match target {
            Value::I8(v) => *v = b[0] as i8,
            Value::I16(v) => *v = read_u16_le(b) as i16,
            Value::I32(v) => *v = read_u32_le(b) as i32,
            Value::I64(v) => *v = read_u64_le(b) as i64,
            // Sign-extend the 32-bit wire value.
            Value::Isize(v) => *v = read_u32_le(b) as i32 as isize,
            _ => return Err(mismatch(shape, target)),
        }
        Ok(())
    }

    fn decode_unsigned(
        &mut self,
        shape: &Shape,
        width: IntWidth,
        target: &mut Value,
    ) -> Result<(), DecodeError> {
        let Some(b) = self.take_scalar(shape, width, target)? else {
            return Ok(());
        };
        match target {
            Value::U8(v) => *v = b[0],
            Value::U16(v) => *v = read_u16_le(b),
            Value::U32(v) => *v = read_u32_le(b),
            Value::U64(v) => *v = read_u64_le(b),
            Value::Usize(v) => *v = read_u32_le(b) as usize,
            _ => return Err(mismatch(shape, target)),
        }
        Ok(())
    }

    /// Check the integer target matches `shape` before consuming anything.
    fn take_scalar(
        &mut self,
        shape: &Shape,
        width: IntWidth,
        target: &Value,
    ) -> Result<Option<&'a [u8]>, DecodeError> {
        if target.shape() != *shape {
            return Err(mismatch(shape, target));
        }
        self.take(width.wire_size(), shape)
    }

    fn decode_text(&mut self, s: &mut String) -> Result<(), DecodeError> {
        let Some(prefix) = self.take(SIZEOF_TEXT_LENGTH, &Shape::Text)? else {
            return Ok(());
        };
        let len = read_u32_le(prefix) as usize;
        let have = self.remaining();

        if len == 0 {
            if self.config.decode_mode == DecodeMode::Strict {
                s.clear();
            }
            return Ok(());
        }
        if len > have {
            return match self.config.decode_mode {
                DecodeMode::Strict => Err(DecodeError::Truncated { need: len, have }),
                DecodeMode::Lenient => {
                    // The length prefix stays consumed; the text bytes do not.
                    log::warn!("skipping text of {} bytes, have {}", len, have);
                    Ok(())
                }
            };
        }

        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        *s = match self.config.decode_mode {
            DecodeMode::Strict => String::from_utf8(bytes.to_vec())?,
            DecodeMode::Lenient => String::from_utf8_lossy(bytes).into_owned(),
        };
        Ok(())
    }

    fn decode_sequence(
        &mut self,
        shape: &Shape,
        elem: &Shape,
        target_elem: &mut Shape,
        items: &mut Vec<Value>,
    ) -> Result<(), DecodeError> {
        let Some(prefix) = self.take(SIZEOF_SEQUENCE_COUNT, shape)? else {
            return Ok(());
        };
        let count = read_u16_le(prefix) as usize;

        // Refuse counts the remaining bytes cannot possibly hold before
        // allocating zero elements for them.
        if self.config.decode_mode == DecodeMode::Strict {
            if let Some(elem_size) = elem.fixed_size() {
                let need = elem_size.saturating_mul(count);
                if need > self.remaining() {
                    return Err(DecodeError::Truncated {
                        need,
                        have: self.remaining(),
                    });
                }
            }
        }

        log::trace!("decode sequence of {} {}", count, elem);
        *target_elem = elem.clone();
        *items = (0..count).map(|_| Value::zero(elem)).collect();
        for item in items.iter_mut() {
            self.decode_shape(elem, item)?;
        }
        Ok(())
    }

    fn decode_record(
        &mut self,
        shape: &Shape,
        record_shape: &RecordShape,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        if record_shape.fields.len() != record.fields.len() {
            return Err(DecodeError::InvalidTarget {
                expected: shape.to_string(),
                actual: format!("record with {} fields", record.fields.len()),
            });
        }
        for (field, (name, value)) in record_shape.fields.iter().zip(record.fields.iter_mut()) {
            if field.name != *name {
                return Err(DecodeError::InvalidTarget {
                    expected: format!("field '{}'", field.name),
                    actual: format!("field '{}'", name),
                });
            }
            log::trace!("decode field {}.{} at offset {}", record_shape.name, name, self.pos);
            self.decode_shape(&field.shape, value)?;
        }
        Ok(())
    }
}

fn mismatch(shape: &Shape, target: &Value) -> DecodeError {
    DecodeError::InvalidTarget {
        expected: shape.to_string(),
        actual: target.type_name().to_string(),
    }
}
