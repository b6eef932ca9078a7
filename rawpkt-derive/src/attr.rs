//! Attribute parsing for packet derive macros.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, Member, Result, Type};

/// Parsed field attributes from #[packet(...)]
#[derive(Default)]
pub struct FieldAttrs {
    /// Keep this field off the wire; decoding fills it with `Default::default()`.
    pub skip: bool,
}

impl FieldAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut result = FieldAttrs::default();

        for attr in attrs {
            if attr.path().is_ident("packet") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        result.skip = true;
                        Ok(())
                    } else {
                        Err(syn::Error::new_spanned(meta.path, "unknown packet attribute"))
                    }
                })?;
            }
        }

        Ok(result)
    }
}

/// Parsed struct-level attributes.
#[derive(Default)]
pub struct StructAttrs {
    /// Record name (defaults to the struct name).
    pub name: Option<String>,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut result = StructAttrs::default();

        for attr in attrs {
            if attr.path().is_ident("packet") {
                result.parse_packet_attr(attr)?;
            }
        }

        Ok(result)
    }

    fn parse_packet_attr(&mut self, attr: &Attribute) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: Expr = meta.value()?.parse()?;
                if let Expr::Lit(ExprLit {
                    lit: Lit::Str(lit), ..
                }) = value
                {
                    self.name = Some(lit.value());
                } else {
                    return Err(syn::Error::new_spanned(value, "expected string literal"));
                }
            } else {
                return Err(syn::Error::new_spanned(
                    meta.path,
                    "unknown packet attribute",
                ));
            }
            Ok(())
        })
    }
}

/// Field information collected from the struct definition.
pub struct FieldInfo {
    /// `self.<member>`: an identifier or a tuple index.
    pub member: Member,
    /// Field name on the record value.
    pub wire_name: String,
    pub ty: Type,
    pub skip: bool,
    pub span: Span,
}

/// Collect the fields of a struct in declaration order. Enums and unions
/// have no packet shape and are rejected.
pub fn collect_fields(input: &DeriveInput, derive: &str) -> Result<Vec<FieldInfo>> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                format!("{}: unsupported shape, enums have no packet representation", derive),
            ))
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                format!("{}: unsupported shape, unions have no packet representation", derive),
            ))
        }
    };

    let iter: Box<dyn Iterator<Item = &syn::Field>> = match fields {
        Fields::Named(named) => Box::new(named.named.iter()),
        Fields::Unnamed(unnamed) => Box::new(unnamed.unnamed.iter()),
        Fields::Unit => Box::new(std::iter::empty()),
    };

    iter.enumerate()
        .map(|(index, field)| {
            let attrs = FieldAttrs::from_attrs(&field.attrs)?;
            let (member, wire_name) = match &field.ident {
                Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
                None => (Member::Unnamed(index.into()), index.to_string()),
            };
            Ok(FieldInfo {
                member,
                wire_name,
                ty: field.ty.clone(),
                skip: attrs.skip,
                span: field.span(),
            })
        })
        .collect()
}

/// Record name for the struct, honoring #[packet(name = "...")].
pub fn record_name(input: &DeriveInput) -> Result<String> {
    let attrs = StructAttrs::from_attrs(&input.attrs)?;
    Ok(attrs.name.unwrap_or_else(|| input.ident.to_string()))
}
