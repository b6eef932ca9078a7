use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::shape::{FieldShape, IntWidth, RecordShape, Shape};

/// Dynamic value tree, one variant per shape.
///
/// Containers that may be empty carry their element (or target) shape so a
/// zero-valued target always knows how to decode itself.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Native signed integer, 32 bits on the wire.
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    /// Native unsigned integer, 32 bits on the wire.
    Usize(usize),
    F32(f32),
    F64(f64),
    Text(String),
    /// Whole seconds since the Unix epoch.
    Timestamp(i64),
    /// Fixed array; the length is part of the shape.
    Array { elem: Shape, items: Vec<Value> },
    Sequence { elem: Shape, items: Vec<Value> },
    Record(Record),
    Optional {
        target: Shape,
        value: Option<Box<Value>>,
    },
}

/// A record value: named fields in declaration order.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn shape(&self) -> RecordShape {
        RecordShape {
            name: self.name.clone(),
            fields: self
                .fields
                .iter()
                .map(|(name, value)| FieldShape {
                    name: name.clone(),
                    shape: value.shape(),
                })
                .collect(),
        }
    }
}

impl Value {
    /// The zero value of a shape: numbers 0, `false`, empty text, the Unix
    /// epoch, empty sequences, absent optionals, and arrays/records of zeros.
    pub fn zero(shape: &Shape) -> Value {
        match shape {
            Shape::Bool => Value::Bool(false),
            Shape::Int(IntWidth::W8) => Value::I8(0),
            Shape::Int(IntWidth::W16) => Value::I16(0),
            Shape::Int(IntWidth::W32) => Value::I32(0),
            Shape::Int(IntWidth::W64) => Value::I64(0),
            Shape::Int(IntWidth::Native) => Value::Isize(0),
            Shape::Uint(IntWidth::W8) => Value::U8(0),
            Shape::Uint(IntWidth::W16) => Value::U16(0),
            Shape::Uint(IntWidth::W32) => Value::U32(0),
            Shape::Uint(IntWidth::W64) => Value::U64(0),
            Shape::Uint(IntWidth::Native) => Value::Usize(0),
            Shape::F32 => Value::F32(0.0),
            Shape::F64 => Value::F64(0.0),
            Shape::Text => Value::Text(String::new()),
            Shape::Timestamp => Value::Timestamp(0),
            Shape::Array { len, elem } => Value::Array {
                elem: (**elem).clone(),
                items: (0..*len).map(|_| Value::zero(elem)).collect(),
            },
            Shape::Sequence(elem) => Value::Sequence {
                elem: (**elem).clone(),
                items: Vec::new(),
            },
            Shape::Record(record) => Value::Record(Record {
                name: record.name.clone(),
                fields: record
                    .fields
                    .iter()
                    .map(|f| (f.name.clone(), Value::zero(&f.shape)))
                    .collect(),
            }),
            Shape::Optional(target) => Value::Optional {
                target: (**target).clone(),
                value: None,
            },
        }
    }

    /// Classify this value.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Bool(_) => Shape::Bool,
            Value::I8(_) => Shape::Int(IntWidth::W8),
            Value::I16(_) => Shape::Int(IntWidth::W16),
            Value::I32(_) => Shape::Int(IntWidth::W32),
            Value::I64(_) => Shape::Int(IntWidth::W64),
            Value::Isize(_) => Shape::Int(IntWidth::Native),
            Value::U8(_) => Shape::Uint(IntWidth::W8),
            Value::U16(_) => Shape::Uint(IntWidth::W16),
            Value::U32(_) => Shape::Uint(IntWidth::W32),
            Value::U64(_) => Shape::Uint(IntWidth::W64),
            Value::Usize(_) => Shape::Uint(IntWidth::Native),
            Value::F32(_) => Shape::F32,
            Value::F64(_) => Shape::F64,
            Value::Text(_) => Shape::Text,
            Value::Timestamp(_) => Shape::Timestamp,
            Value::Array { elem, items } => Shape::array(elem.clone(), items.len()),
            Value::Sequence { elem, .. } => Shape::sequence(elem.clone()),
            Value::Record(record) => Shape::Record(record.shape()),
            Value::Optional { target, .. } => Shape::optional(target.clone()),
        }
    }

    pub fn sequence(elem: Shape, items: Vec<Value>) -> Self {
        Value::Sequence { elem, items }
    }

    pub fn array(elem: Shape, items: Vec<Value>) -> Self {
        Value::Array { elem, items }
    }

    pub fn optional(target: Shape, value: Option<Value>) -> Self {
        Value::Optional {
            target,
            value: value.map(Box::new),
        }
    }

    /// Timestamp value from a `SystemTime`, dropping sub-second precision.
    pub fn timestamp(time: SystemTime) -> Self {
        Value::Timestamp(epoch_seconds(time))
    }

    /// Get a field from a record value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Record(record) => record.get(field),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any signed integer, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            Value::Isize(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Any unsigned integer, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(v) => Some(*v as u64),
            Value::U16(v) => Some(*v as u64),
            Value::U32(v) => Some(*v as u64),
            Value::U64(v) => Some(*v),
            Value::Usize(v) => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Items of a fixed array or sequence.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::Array { items, .. } | Value::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// The referenced value of an optional; `None` when absent or not an optional.
    pub fn as_present(&self) -> Option<&Value> {
        match self {
            Value::Optional { value, .. } => value.as_deref(),
            _ => None,
        }
    }

    /// Returns a short type description string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Isize(_) => "int",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Usize(_) => "uint",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Array { .. } => "fixed array",
            Value::Sequence { .. } => "sequence",
            Value::Record(_) => "record",
            Value::Optional { .. } => "optional",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::Isize(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::Usize(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{:?}", v),
            Value::Timestamp(v) => write!(f, "@{}", v),
            Value::Array { items, .. } | Value::Sequence { items, .. } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Record(record) => {
                write!(f, "{} {{", record.name)?;
                for (i, (name, value)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", name, value)?;
                }
                write!(f, " }}")
            }
            Value::Optional { value: None, .. } => write!(f, "nil"),
            Value::Optional { value: Some(v), .. } => write!(f, "{}", v),
        }
    }
}

/// Whole seconds since the Unix epoch, rounding toward negative infinity for
/// times before it.
pub fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => {
            let d = e.duration();
            let secs = d.as_secs() as i64;
            if d.subsec_nanos() > 0 {
                -secs - 1
            } else {
                -secs
            }
        }
    }
}

/// The `SystemTime` for whole epoch seconds, `None` if the platform cannot
/// represent it.
pub fn system_time(secs: i64) -> Option<SystemTime> {
    let offset = Duration::from_secs(secs.unsigned_abs());
    if secs >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => Text,
    Record => Record,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
