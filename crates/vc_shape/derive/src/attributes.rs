//! Parsing of `#[shape(...)]` attributes.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, LitStr, Token, parenthesized};

use crate::SHAPE_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Type Attributes

/// Attributes on the deriving type.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `#[shape(serde)]`
    pub serde: Option<Span>,
    /// `#[shape(copy_to)]`
    pub copy_to: Option<Span>,
    /// `#[shape(transparent)]`
    pub transparent: Option<Span>,
    /// `#[shape(closed_enum("a", "b"))]`
    pub closed_enum: Option<Vec<LitStr>>,
    /// `#[repr(transparent)]`, not ours but required by `transparent`.
    pub repr_transparent: bool,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if attr.path().is_ident("repr") {
                // Other repr hints are not our concern.
                let _ = attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("transparent") {
                        this.repr_transparent = true;
                    }
                    Ok(())
                });
            } else if attr.path().is_ident(SHAPE_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| this.parse_meta(meta))?;
            }
        }
        Ok(this)
    }

    fn parse_meta(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        let span = meta.path.get_ident().map(syn::Ident::span);
        if meta.path.is_ident("serde") {
            self.serde = span;
        } else if meta.path.is_ident("copy_to") {
            self.copy_to = span;
        } else if meta.path.is_ident("transparent") {
            self.transparent = span;
        } else if meta.path.is_ident("closed_enum") {
            let content;
            parenthesized!(content in meta.input);
            let members = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
            if members.is_empty() {
                return Err(meta.error("a closed enumeration needs at least one member"));
            }
            self.closed_enum = Some(members.into_iter().collect());
        } else {
            return Err(meta.error(
                "unknown type attribute, expected `serde`, `copy_to`, `transparent` or `closed_enum`",
            ));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Field Attributes

/// Attributes on a record field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    /// `#[shape(skip)]`
    pub skip: bool,
    /// `#[shape(key = "...")]`
    pub key: Option<LitStr>,
    /// `#[shape(tag(namespace = "..."))]`
    pub tags: Vec<(String, LitStr)>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if attr.path().is_ident(SHAPE_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| this.parse_meta(meta))?;
            }
        }
        Ok(this)
    }

    fn parse_meta(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("skip") {
            self.skip = true;
        } else if meta.path.is_ident("key") {
            self.key = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("tag") {
            meta.parse_nested_meta(|tag| {
                let Some(namespace) = tag.path.get_ident() else {
                    return Err(tag.error("expected a tag namespace"));
                };
                let namespace = namespace.to_string();
                if self.tags.iter().any(|(ns, _)| *ns == namespace) {
                    return Err(tag.error("duplicate tag namespace"));
                }
                let name: LitStr = tag.value()?.parse()?;
                self.tags.push((namespace, name));
                Ok(())
            })?;
        } else {
            return Err(meta.error("unknown field attribute, expected `skip`, `key` or `tag`"));
        }
        Ok(())
    }
}
