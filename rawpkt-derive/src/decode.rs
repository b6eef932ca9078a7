//! Code generation for PacketDecode derive macro.

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{parse_quote, DeriveInput, GenericParam, Result};

use crate::attr::{collect_fields, record_name};

/// Generate the PacketDecode implementation for a struct.
pub fn derive_decode(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let record_name = record_name(input)?;
    let fields = collect_fields(input, "PacketDecode")?;

    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::rawpkt::PacketDecode));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let vars: Vec<_> = (0..fields.len())
        .map(|i| format_ident!("__field{}", i))
        .collect();

    // Record fields arrive in declaration order, skipped fields excluded.
    let extractions = fields.iter().zip(&vars).map(|(field, var)| {
        if field.skip {
            return quote_spanned! {field.span=>
                let #var = ::std::default::Default::default();
            };
        }
        let wire_name = &field.wire_name;
        let ty = &field.ty;
        quote_spanned! {field.span=>
            let #var = match fields.next() {
                ::std::option::Option::Some((name, value)) if name == #wire_name => {
                    <#ty as ::rawpkt::PacketDecode>::from_value(value)?
                }
                ::std::option::Option::Some((name, _)) => {
                    return ::std::result::Result::Err(::rawpkt::error::DecodeError::InvalidTarget {
                        expected: ::std::format!("field '{}'", #wire_name),
                        actual: ::std::format!("field '{}'", name),
                    });
                }
                ::std::option::Option::None => {
                    return ::std::result::Result::Err(::rawpkt::error::DecodeError::InvalidTarget {
                        expected: ::std::format!("field '{}'", #wire_name),
                        actual: ::std::string::String::from("end of record"),
                    });
                }
            };
        }
    });

    let members = fields.iter().map(|f| &f.member);

    Ok(quote! {
        impl #impl_generics ::rawpkt::PacketDecode for #name #ty_generics #where_clause {
            fn from_value(
                value: ::rawpkt::Value,
            ) -> ::std::result::Result<Self, ::rawpkt::error::DecodeError> {
                let record = match value {
                    ::rawpkt::Value::Record(record) => record,
                    other => {
                        return ::std::result::Result::Err(::rawpkt::error::DecodeError::InvalidTarget {
                            expected: ::std::format!("record {}", #record_name),
                            actual: ::std::string::ToString::to_string(other.type_name()),
                        });
                    }
                };
                let mut fields = record.fields.into_iter();

                #(#extractions)*

                if let ::std::option::Option::Some((name, _)) = fields.next() {
                    return ::std::result::Result::Err(::rawpkt::error::DecodeError::InvalidTarget {
                        expected: ::std::format!("end of record {}", #record_name),
                        actual: ::std::format!("field '{}'", name),
                    });
                }

                ::std::result::Result::Ok(Self {
                    #(#members: #vars),*
                })
            }
        }
    })
}
