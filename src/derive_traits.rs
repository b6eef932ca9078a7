//! Traits mapping Rust types onto packet shapes.
//!
//! Implemented here for the standard types with a wire form and generated
//! for user structs by `#[derive(PacketEncode, PacketDecode)]` from the
//! `rawpkt-derive` crate. Types without a shape (maps, enums) have no impl,
//! so using them in a derived struct is a compile error.

use std::time::SystemTime;

use crate::error::DecodeError;
use crate::shape::{IntWidth, Shape};
use crate::value::{self, Value};

/// Types that can be encoded into a packet.
///
/// # Example
///
/// ```rust,ignore
/// use rawpkt::PacketEncode;
///
/// #[derive(PacketEncode)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// let shape = Position::shape();
/// let value = Position { x: 1.0, y: 2.0 }.to_value();
/// ```
pub trait PacketEncode {
    /// The shape every value of this type has.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Convert to the dynamic value tree.
    fn to_value(&self) -> Value;
}

/// Types that can be rebuilt from a decoded value.
pub trait PacketDecode: Sized {
    /// Convert back from the dynamic value tree. Fails with
    /// `DecodeError::InvalidTarget` when the value has another shape.
    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

/// Error for a value that does not have the expected shape.
pub fn invalid_target(expected: &Shape, actual: &Value) -> DecodeError {
    DecodeError::InvalidTarget {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident, $shape:expr;)*) => {
        $(
            impl PacketEncode for $ty {
                fn shape() -> Shape {
                    $shape
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }
            }

            impl PacketDecode for $ty {
                fn from_value(value: Value) -> Result<Self, DecodeError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(invalid_target(&<$ty as PacketEncode>::shape(), &other)),
                    }
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool, Shape::Bool;
    i8 => I8, Shape::Int(IntWidth::W8);
    i16 => I16, Shape::Int(IntWidth::W16);
    i32 => I32, Shape::Int(IntWidth::W32);
    i64 => I64, Shape::Int(IntWidth::W64);
    isize => Isize, Shape::Int(IntWidth::Native);
    u8 => U8, Shape::Uint(IntWidth::W8);
    u16 => U16, Shape::Uint(IntWidth::W16);
    u32 => U32, Shape::Uint(IntWidth::W32);
    u64 => U64, Shape::Uint(IntWidth::W64);
    usize => Usize, Shape::Uint(IntWidth::Native);
    f32 => F32, Shape::F32;
    f64 => F64, Shape::F64;
    String => Text, Shape::Text;
}

impl PacketEncode for SystemTime {
    fn shape() -> Shape {
        Shape::Timestamp
    }

    fn to_value(&self) -> Value {
        Value::timestamp(*self)
    }
}

impl PacketDecode for SystemTime {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Timestamp(secs) => value::system_time(secs).ok_or_else(|| {
                DecodeError::InvalidData(format!("timestamp {} out of range", secs))
            }),
            other => Err(invalid_target(&Shape::Timestamp, &other)),
        }
    }
}

impl<T: PacketEncode, const N: usize> PacketEncode for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape(), N)
    }

    fn to_value(&self) -> Value {
        Value::Array {
            elem: T::shape(),
            items: self.iter().map(PacketEncode::to_value).collect(),
        }
    }
}

impl<T: PacketEncode + PacketDecode, const N: usize> PacketDecode for [T; N] {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array { items, .. } if items.len() == N => {
                let decoded = items
                    .into_iter()
                    .map(T::from_value)
                    .collect::<Result<Vec<T>, _>>()?;
                // Length checked above.
                decoded
                    .try_into()
                    .map_err(|_| DecodeError::InvalidData("fixed array length changed".into()))
            }
            other => Err(invalid_target(&Self::shape(), &other)),
        }
    }
}

impl<T: PacketEncode> PacketEncode for Vec<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Sequence {
            elem: T::shape(),
            items: self.iter().map(PacketEncode::to_value).collect(),
        }
    }
}

impl<T: PacketEncode + PacketDecode> PacketDecode for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Sequence { items, .. } => items.into_iter().map(T::from_value).collect(),
            other => Err(invalid_target(&Self::shape(), &other)),
        }
    }
}

/// An optional reference. `None` is written as the zero value of `T` and
/// always decodes as `Some`.
impl<T: PacketEncode> PacketEncode for Option<T> {
    fn shape() -> Shape {
        Shape::optional(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Optional {
            target: T::shape(),
            value: self.as_ref().map(|v| Box::new(v.to_value())),
        }
    }
}

impl<T: PacketEncode + PacketDecode> PacketDecode for Option<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Optional { value, .. } => value.map(|v| T::from_value(*v)).transpose(),
            other => Err(invalid_target(&Self::shape(), &other)),
        }
    }
}

/// Boxing is transparent: `Box<T>` has the shape of `T`.
impl<T: PacketEncode> PacketEncode for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: PacketDecode> PacketDecode for Box<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        T::from_value(value).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(u16::shape(), Shape::Uint(IntWidth::W16));
        assert_eq!(isize::shape(), Shape::Int(IntWidth::Native));
        assert_eq!(String::shape(), Shape::Text);
        assert_eq!(SystemTime::shape(), Shape::Timestamp);
    }

    #[test]
    fn test_container_shapes() {
        assert_eq!(<[u8; 5]>::shape().to_string(), "[u8; 5]");
        assert_eq!(<Vec<Option<Box<i32>>>>::shape().to_string(), "[?i32]");
    }

    #[test]
    fn test_scalar_conversion() {
        assert_eq!(42u32.to_value(), Value::U32(42));
        assert_eq!(u32::from_value(Value::U32(42)).unwrap(), 42);
        assert!(matches!(
            u32::from_value(Value::I32(42)),
            Err(DecodeError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_array_conversion() {
        let arr = [1u8, 2, 3];
        let value = arr.to_value();
        assert_eq!(value.shape(), <[u8; 3]>::shape());
        assert_eq!(<[u8; 3]>::from_value(value).unwrap(), arr);

        let short = Value::array(Shape::Uint(IntWidth::W8), vec![Value::U8(1)]);
        assert!(<[u8; 3]>::from_value(short).is_err());
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<Box<u8>> = None;
        let value = none.to_value();
        assert_eq!(value.shape(), Shape::optional(Shape::Uint(IntWidth::W8)));
        assert_eq!(Option::<Box<u8>>::from_value(value).unwrap(), None);

        let some = Some(Box::new(7u8));
        assert_eq!(
            Option::<Box<u8>>::from_value(some.to_value()).unwrap(),
            Some(Box::new(7))
        );
    }

    #[test]
    fn test_system_time_conversion() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 250_000_000);
        assert_eq!(t.to_value(), Value::Timestamp(1_700_000_000));
        assert_eq!(
            SystemTime::from_value(Value::Timestamp(1_700_000_000)).unwrap(),
            UNIX_EPOCH + Duration::from_secs(1_700_000_000)
        );
    }
}
