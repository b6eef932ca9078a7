use crate::config::{CodecConfig, OverflowPolicy};
use crate::error::EncodeError;
use crate::shape::{IntWidth, RecordShape, Shape};
use crate::value::{Record, Value};

use super::wire::*;

/// Append the encoding of `value`, read as `shape`, to `out`.
///
/// Depth-first, pre-order: scalars as fixed-width little-endian bytes, text
/// with a 4-byte length, sequences with a 2-byte count, fixed arrays and
/// records with no framing at all. On error `out` may hold a partial
/// encoding; callers roll it back.
pub fn encode(
    out: &mut Vec<u8>,
    shape: &Shape,
    value: &Value,
    config: CodecConfig,
) -> Result<(), EncodeError> {
    Encoder { out, config }.encode(shape, value)
}

struct Encoder<'a> {
    out: &'a mut Vec<u8>,
    config: CodecConfig,
}

impl Encoder<'_> {
    fn encode(&mut self, shape: &Shape, value: &Value) -> Result<(), EncodeError> {
        match shape {
            Shape::Bool => {
                let Value::Bool(v) = value else {
                    return Err(mismatch(shape, value));
                };
                self.out.push(*v as u8);
            }
            Shape::Int(width) => self.encode_signed(shape, *width, value)?,
            Shape::Uint(width) => self.encode_unsigned(shape, *width, value)?,
            Shape::F32 => {
                let Value::F32(v) = value else {
                    return Err(mismatch(shape, value));
                };
                put_u32_le(self.out, v.to_bits());
            }
            Shape::F64 => {
                let Value::F64(v) = value else {
                    return Err(mismatch(shape, value));
                };
                put_u64_le(self.out, v.to_bits());
            }
            Shape::Text => {
                let Value::Text(s) = value else {
                    return Err(mismatch(shape, value));
                };
                // Byte length, not character count.
                put_u32_le(self.out, s.len() as u32);
                self.out.extend_from_slice(s.as_bytes());
            }
            Shape::Timestamp => {
                let Value::Timestamp(secs) = value else {
                    return Err(mismatch(shape, value));
                };
                put_u64_le(self.out, *secs as u64);
            }
            Shape::Array { len, elem } => {
                let items = match value {
                    Value::Array { items, .. } if items.len() == *len => items,
                    _ => return Err(mismatch(shape, value)),
                };
                for item in items {
                    self.encode(elem, item)?;
                }
            }
            Shape::Sequence(elem) => {
                let Value::Sequence { items, .. } = value else {
                    return Err(mismatch(shape, value));
                };
                if items.len() > MAX_SEQUENCE_LEN && self.config.overflow == OverflowPolicy::Reject
                {
                    return Err(EncodeError::SequenceTooLong {
                        len: items.len(),
                        max: MAX_SEQUENCE_LEN,
                    });
                }
                log::trace!("encode sequence of {} {}", items.len(), elem);
                put_u16_le(self.out, items.len() as u16);
                for item in items {
                    self.encode(elem, item)?;
                }
            }
            Shape::Record(record_shape) => {
                let Value::Record(record) = value else {
                    return Err(mismatch(shape, value));
                };
                self.encode_record(shape, record_shape, record)?;
            }
            Shape::Optional(target) => {
                let Value::Optional { value: inner, .. } = value else {
                    return Err(mismatch(shape, value));
                };
                match inner {
                    Some(v) => self.encode(target, v)?,
                    // Absence has no wire form: write the target's zero value.
                    None => self.encode(target, &Value::zero(target))?,
                }
            }
        }
        Ok(())
    }

    fn encode_signed(
        &mut self,
        shape: &Shape,
        width: IntWidth,
        value: &Value,
    ) -> Result<(), EncodeError> {
        match (width, value) {
            (IntWidth::W8, Value::I8(v)) => self.out.push(*v as u8),
            (IntWidth::W16, Value::I16(v)) => put_u16_le(self.out, *v as u16),
            (IntWidth::W32, Value::I32(v)) => put_u32_le(self.out, *v as u32),
            (IntWidth::W64, Value::I64(v)) => put_u64_le(self.out, *v as u64),
            (IntWidth::Native, Value::Isize(v)) => {
                let narrowed = match i32::try_from(*v) {
                    Ok(n) => n,
                    Err(_) if self.config.overflow == OverflowPolicy::Wrap => *v as i32,
                    Err(_) => {
                        return Err(EncodeError::NativeIntOverflow { value: *v as i128 });
                    }
                };
                put_u32_le(self.out, narrowed as u32);
            }
            _ => return Err(mismatch(shape, value)),
        }
        Ok(())
    }

    fn encode_unsigned(
        &mut self,
        shape: &Shape,
        width: IntWidth,
        value: &Value,
    ) -> Result<(), EncodeError> {
        match (width, value) {
            (IntWidth::W8, Value::U8(v)) => self.out.push(*v),
            (IntWidth::W16, Value::U16(v)) => put_u16_le(self.out, *v),
            (IntWidth::W32, Value::U32(v)) => put_u32_le(self.out, *v),
            (IntWidth::W64, Value::U64(v)) => put_u64_le(self.out, *v),
            (IntWidth::Native, Value::Usize(v)) => {
                let narrowed = match u32::try_from(*v) {
                    Ok(n) => n,
                    Err(_) if self.config.overflow == OverflowPolicy::Wrap => *v as u32,
                    Err(_) => {
                        return Err(EncodeError::NativeIntOverflow { value: *v as i128 });
                    }
                };
                put_u32_le(self.out, narrowed);
            }
            _ => return Err(mismatch(shape, value)),
        }
        Ok(())
    }

    fn encode_record(
        &mut self,
        shape: &Shape,
        record_shape: &RecordShape,
        record: &Record,
    ) -> Result<(), EncodeError> {
        if record_shape.fields.len() != record.fields.len() {
            return Err(EncodeError::InvalidTarget {
                expected: shape.to_string(),
                actual: format!("record with {} fields", record.fields.len()),
            });
        }
        // Declaration order, no count and no tags.
        for (field, (name, value)) in record_shape.fields.iter().zip(&record.fields) {
            if field.name != *name {
                return Err(EncodeError::InvalidTarget {
                    expected: format!("field '{}'", field.name),
                    actual: format!("field '{}'", name),
                });
            }
            log::trace!("encode field {}.{}", record_shape.name, name);
            self.encode(&field.shape, value)?;
        }
        Ok(())
    }
}

fn mismatch(shape: &Shape, value: &Value) -> EncodeError {
    EncodeError::InvalidTarget {
        expected: shape.to_string(),
        actual: value.type_name().to_string(),
    }
}
