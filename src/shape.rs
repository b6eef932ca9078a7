use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::wire::{SIZEOF_NATIVE_INT, SIZEOF_TIMESTAMP};
use crate::error::ShapeError;

/// Wire width of an integer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    /// Platform-sized integer (`isize`/`usize`). Always 32 bits on the wire,
    /// whatever the host pointer width.
    Native,
}

impl IntWidth {
    /// Number of bytes this width occupies on the wire.
    pub fn wire_size(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
            IntWidth::W64 => 8,
            IntWidth::Native => SIZEOF_NATIVE_INT,
        }
    }
}

/// A named field within a record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
}

/// The shape of a record: fields in declaration order, which is also wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordShape {
    /// Record name. Empty for anonymous records.
    pub name: String,
    pub fields: Vec<FieldShape>,
}

impl RecordShape {
    pub fn new(name: impl Into<String>, fields: Vec<(&str, Shape)>) -> Self {
        RecordShape {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, shape)| FieldShape {
                    name: name.to_string(),
                    shape,
                })
                .collect(),
        }
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The structure of a value, selecting the rule used to encode and decode it.
///
/// The set is closed: anything not expressible here (maps, enums, unions)
/// has no wire representation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    F32,
    F64,
    /// UTF-8 text with a 4-byte length prefix.
    Text,
    /// Whole seconds since the Unix epoch, 8 bytes signed.
    Timestamp,
    /// Exactly `len` elements, no prefix.
    Array { len: usize, elem: Box<Shape> },
    /// Variable number of elements with a 2-byte count prefix.
    Sequence(Box<Shape>),
    Record(RecordShape),
    /// A reference that may be absent in memory but is always present on the
    /// wire; absence is written as the zero value of the target.
    Optional(Box<Shape>),
}

impl Shape {
    pub fn array(elem: Shape, len: usize) -> Self {
        Shape::Array {
            len,
            elem: Box::new(elem),
        }
    }

    pub fn sequence(elem: Shape) -> Self {
        Shape::Sequence(Box::new(elem))
    }

    pub fn optional(target: Shape) -> Self {
        Shape::Optional(Box::new(target))
    }

    pub fn record(name: impl Into<String>, fields: Vec<(&str, Shape)>) -> Self {
        Shape::Record(RecordShape::new(name, fields))
    }

    /// Wire width of a scalar shape, `None` for composite and variable shapes.
    pub fn scalar_width(&self) -> Option<usize> {
        match self {
            Shape::Bool => Some(1),
            Shape::Int(w) | Shape::Uint(w) => Some(w.wire_size()),
            Shape::F32 => Some(4),
            Shape::F64 => Some(8),
            Shape::Timestamp => Some(SIZEOF_TIMESTAMP),
            Shape::Text
            | Shape::Array { .. }
            | Shape::Sequence(_)
            | Shape::Record(_)
            | Shape::Optional(_) => None,
        }
    }

    /// Encoded size of every value of this shape, if it does not depend on
    /// the value (no text or sequence anywhere inside).
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Shape::Text | Shape::Sequence(_) => None,
            Shape::Array { len, elem } => elem.fixed_size().map(|sz| sz * len),
            Shape::Record(record) => record
                .fields
                .iter()
                .map(|f| f.shape.fixed_size())
                .sum(),
            Shape::Optional(target) => target.fixed_size(),
            scalar => scalar.scalar_width(),
        }
    }

    /// Short description used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Bool => "bool",
            Shape::Int(_) => "signed integer",
            Shape::Uint(_) => "unsigned integer",
            Shape::F32 => "f32",
            Shape::F64 => "f64",
            Shape::Text => "text",
            Shape::Timestamp => "timestamp",
            Shape::Array { .. } => "fixed array",
            Shape::Sequence(_) => "sequence",
            Shape::Record(_) => "record",
            Shape::Optional(_) => "optional",
        }
    }
}

fn int_name(signed: bool, width: IntWidth) -> &'static str {
    match (signed, width) {
        (true, IntWidth::W8) => "i8",
        (true, IntWidth::W16) => "i16",
        (true, IntWidth::W32) => "i32",
        (true, IntWidth::W64) => "i64",
        (true, IntWidth::Native) => "int",
        (false, IntWidth::W8) => "u8",
        (false, IntWidth::W16) => "u16",
        (false, IntWidth::W32) => "u32",
        (false, IntWidth::W64) => "u64",
        (false, IntWidth::Native) => "uint",
    }
}

/// Formats the shape in descriptor syntax, which `FromStr` parses back.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Bool => f.write_str("bool"),
            Shape::Int(w) => f.write_str(int_name(true, *w)),
            Shape::Uint(w) => f.write_str(int_name(false, *w)),
            Shape::F32 => f.write_str("f32"),
            Shape::F64 => f.write_str("f64"),
            Shape::Text => f.write_str("text"),
            Shape::Timestamp => f.write_str("timestamp"),
            Shape::Array { len, elem } => write!(f, "[{}; {}]", elem, len),
            Shape::Sequence(elem) => write!(f, "[{}]", elem),
            Shape::Optional(target) => write!(f, "?{}", target),
            Shape::Record(record) => {
                if !record.name.is_empty() {
                    write!(f, "{} ", record.name)?;
                }
                if record.fields.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, field) in record.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.shape)?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl FromStr for Shape {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s)
    }
}
