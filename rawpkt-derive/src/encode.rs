//! Code generation for PacketEncode derive macro.

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{parse_quote, DeriveInput, GenericParam, Result};

use crate::attr::{collect_fields, record_name};

/// Generate the PacketEncode implementation for a struct.
pub fn derive_encode(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let record_name = record_name(input)?;
    let fields = collect_fields(input, "PacketEncode")?;

    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::rawpkt::PacketEncode));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Skipped fields are not part of the shape.
    let wire_fields: Vec<_> = fields.iter().filter(|f| !f.skip).collect();

    let shape_fields = wire_fields.iter().map(|field| {
        let wire_name = &field.wire_name;
        let ty = &field.ty;
        quote_spanned! {field.span=>
            (#wire_name, <#ty as ::rawpkt::PacketEncode>::shape())
        }
    });

    let value_fields = wire_fields.iter().map(|field| {
        let wire_name = &field.wire_name;
        let member = &field.member;
        quote_spanned! {field.span=>
            .with_field(#wire_name, ::rawpkt::PacketEncode::to_value(&self.#member))
        }
    });

    Ok(quote! {
        impl #impl_generics ::rawpkt::PacketEncode for #name #ty_generics #where_clause {
            fn shape() -> ::rawpkt::Shape {
                ::rawpkt::Shape::record(#record_name, ::std::vec![#(#shape_fields),*])
            }

            fn to_value(&self) -> ::rawpkt::Value {
                ::rawpkt::Value::Record(
                    ::rawpkt::Record::new(#record_name)
                        #(#value_fields)*
                )
            }
        }
    })
}
