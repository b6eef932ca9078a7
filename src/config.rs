//! Codec behavior switches carried by each packet.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the decoder reacts when the payload runs out before a field is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DecodeMode {
    /// Report `DecodeError::Truncated` and leave the packet unconsumed.
    #[default]
    Strict,
    /// Leave the field at its current value without advancing, as legacy
    /// producers expect. Every following field of the same record is read
    /// from the unadvanced position.
    Lenient,
}

/// How the encoder treats values that do not fit their wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OverflowPolicy {
    /// Fail with an `EncodeError`.
    #[default]
    Reject,
    /// Keep the low bits: sequence counts above 65535, native integers
    /// outside 32 bits and packet sizes above 65535 wrap silently.
    Wrap,
}

/// Configuration for encoding and decoding a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    pub decode_mode: DecodeMode,
    pub overflow: OverflowPolicy,
}

impl CodecConfig {
    /// Strict decoding, overflow rejected. Same as `Default`.
    pub fn strict() -> Self {
        CodecConfig::default()
    }

    /// Byte-for-byte behavior of the legacy codec: lenient decoding and
    /// wrapping overflow.
    pub fn compat() -> Self {
        CodecConfig {
            decode_mode: DecodeMode::Lenient,
            overflow: OverflowPolicy::Wrap,
        }
    }

    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn is_lenient(&self) -> bool {
        self.decode_mode == DecodeMode::Lenient
    }
}
