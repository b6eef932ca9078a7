//! Derive macros for rawpkt packet encoding.
//!
//! This crate provides `#[derive(PacketEncode)]` and `#[derive(PacketDecode)]`
//! for structs. A struct maps to a record shape: its fields in declaration
//! order, each with the shape of its type.
//!
//! # Example
//!
//! ```rust,ignore
//! use rawpkt::{Packet, PacketDecode, PacketEncode};
//!
//! #[derive(PacketEncode, PacketDecode)]
//! struct Person {
//!     name: String,
//!     age: u8,
//! }
//!
//! let mut packet = Packet::new(1, false, false);
//! packet.encode(&Person { name: "Alice".into(), age: 30 }).unwrap();
//! let decoded: Person = packet.read().unwrap();
//! ```

mod attr;
mod decode;
mod encode;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for generating `PacketEncode` implementation.
///
/// # Attributes
///
/// - `#[packet(name = "...")]` - Optional on the struct, overrides the record name.
/// - `#[packet(skip)]` - Optional on a field, keeps it off the wire.
///
/// Every other field type must implement `PacketEncode`; maps, enums and
/// other types with no packet shape fail to compile.
#[proc_macro_derive(PacketEncode, attributes(packet))]
pub fn derive_packet_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    encode::derive_encode(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive macro for generating `PacketDecode` implementation.
///
/// # Attributes
///
/// - `#[packet(name = "...")]` - Optional on the struct, overrides the record name.
/// - `#[packet(skip)]` - Optional on a field, filled with `Default::default()`.
#[proc_macro_derive(PacketDecode, attributes(packet))]
pub fn derive_packet_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    decode::derive_decode(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
