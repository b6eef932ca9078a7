//! Shape-driven encoder and decoder over the packet payload.

pub mod wire;
pub mod encoder;
pub mod decoder;

pub use encoder::encode;
pub use decoder::Decoder;
