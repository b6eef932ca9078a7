/// Errors from parsing the fixed packet header.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("header too short: need {need} bytes, have {have}")]
    TooShort { need: usize, have: usize },
}

/// Errors from the shape descriptor parser.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unsupported shape '{0}'")]
    Unsupported(String),

    #[error("duplicate field '{field_name}' in record '{record}'")]
    DuplicateField { record: String, field_name: String },
}

/// Errors from the packet encoder.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("invalid target: expected {expected}, got {actual}")]
    InvalidTarget { expected: String, actual: String },

    #[error("sequence of {len} elements exceeds the maximum of {max}")]
    SequenceTooLong { len: usize, max: usize },

    #[error("native integer {value} does not fit in 32 bits")]
    NativeIntOverflow { value: i128 },

    #[error("packet of {size} bytes exceeds the maximum of {max}")]
    PacketTooLarge { size: usize, max: usize },
}

/// Errors from the packet decoder.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated data: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("invalid target: expected {expected}, got {actual}")]
    InvalidTarget { expected: String, actual: String },

    #[error("invalid utf-8 text: {source}")]
    InvalidUtf8 {
        #[from]
        source: std::string::FromUtf8Error,
    },

    #[error("illegal boolean representation: {0:#04X}")]
    InvalidBool(u8),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Top-level error type that wraps all sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result type alias for rawpkt operations.
pub type Result<T> = std::result::Result<T, Error>;
