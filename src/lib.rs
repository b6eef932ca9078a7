//! rawpkt: a binary codec for small framed packets.
//!
//! A packet is a 6-byte header (size, encrypted flag, compressed flag, type
//! tag) followed by a payload. Values are written into the payload by a
//! shape-driven traversal: scalars as little-endian fixed-width bytes, text
//! with a 4-byte length, sequences with a 2-byte count, fixed arrays and
//! records with no framing. There are no tags and no field numbers, so both
//! ends must agree on the shape.
//!
//! # Quick Start
//!
//! ```rust
//! use rawpkt::{Packet, Record, Shape, Value};
//!
//! let shape: Shape = "Item { id: int, name: text, tags: [u8] }".parse().unwrap();
//! let item = Value::Record(
//!     Record::new("Item")
//!         .with_field("id", 7isize)
//!         .with_field("name", "sword")
//!         .with_field("tags", Value::sequence("u8".parse().unwrap(), vec![Value::U8(3)])),
//! );
//! assert_eq!(item.shape(), shape);
//!
//! let mut packet = Packet::new(0x10, false, false);
//! packet.encode_value(&item).unwrap();
//! assert_eq!(packet.size() as usize, 6 + 4 + (4 + 5) + (2 + 1));
//!
//! let decoded = packet.read_value(&shape).unwrap();
//! assert_eq!(decoded, item);
//! assert_eq!(packet.size(), 6);
//! ```

pub mod error;
pub mod config;
pub mod header;
pub mod shape;
pub mod value;
pub mod parser;
pub mod codec;
pub mod packet;
pub mod derive_traits;

pub use config::{CodecConfig, DecodeMode, OverflowPolicy};
pub use derive_traits::{PacketDecode, PacketEncode};
pub use error::{Error, Result};
pub use header::{PacketHeader, HEADER_SIZE};
pub use packet::Packet;
pub use shape::{IntWidth, RecordShape, Shape};
pub use value::{Record, Value};

// Re-export derive macros when the feature is enabled
#[cfg(feature = "derive")]
pub use rawpkt_derive::{PacketDecode, PacketEncode};
