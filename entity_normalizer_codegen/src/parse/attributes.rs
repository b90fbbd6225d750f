//! Attribute parsing for spec declarations.
//!
//! ```text
//! #[entity_spec(name = "message", class_name = "Message")]
//! #[derive(Eq, Hash)]
//! struct MessageSpec {
//!     #[entity_id]
//!     message_id: i64,
//! }
//! ```

use syn::{Attribute, LitStr, Path, Token, punctuated::Punctuated, spanned::Spanned};

use crate::error::SpecError;

pub const ENTITY_SPEC: &str = "entity_spec";
pub const ENTITY_ID: &str = "entity_id";

/// Parsed `#[entity_spec(..)]` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAttribute {
    /// Logical entity name
    pub name: String,

    /// Generated type name override
    pub class_name: Option<String>,
}

pub fn is_entity_spec(attr: &Attribute) -> bool {
    attr.path().is_ident(ENTITY_SPEC)
}

pub fn is_entity_id(attr: &Attribute) -> bool {
    attr.path().is_ident(ENTITY_ID)
}

pub fn has_entity_spec(attrs: &[Attribute]) -> bool {
    attrs.iter().any(is_entity_spec)
}

impl SpecAttribute {
    /// Parse the first `#[entity_spec]` on an item.
    ///
    /// `fallback_name` identifies the spec in errors raised before `name` is known.
    pub fn from_attrs(attrs: &[Attribute], fallback_name: &str) -> Result<Self, SpecError> {
        let mut specs = attrs.iter().filter(|attr| is_entity_spec(attr));
        let Some(attr) = specs.next() else {
            return Err(SpecError::invalid(
                fallback_name,
                proc_macro2::Span::call_site(),
                "missing #[entity_spec] attribute",
            ));
        };
        if let Some(extra) = specs.next() {
            return Err(SpecError::invalid(
                fallback_name,
                extra.span(),
                "#[entity_spec] may only appear once",
            ));
        }

        let mut name: Option<LitStr> = None;
        let mut class_name: Option<LitStr> = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("class_name") {
                class_name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown entity_spec argument, expected `name` or `class_name`"))
            }
        })
        .map_err(|e| SpecError::invalid(fallback_name, e.span(), e.to_string()))?;

        let name = match name {
            Some(lit) if !lit.value().is_empty() => lit.value(),
            Some(lit) => {
                return Err(SpecError::invalid(fallback_name, lit.span(), "`name` must not be empty"));
            }
            None => {
                return Err(SpecError::invalid(
                    fallback_name,
                    attr.span(),
                    "#[entity_spec] requires `name = \"...\"`",
                ));
            }
        };

        Ok(Self {
            name,
            class_name: class_name.map(|lit| lit.value()),
        })
    }
}

/// Paths listed in every `#[derive(..)]` on the spec, in order
pub fn derive_paths(attrs: &[Attribute], spec_name: &str) -> Result<Vec<Path>, SpecError> {
    let mut paths = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let listed = attr
            .parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
            .map_err(|e| SpecError::invalid(spec_name, e.span(), e.to_string()))?;
        paths.extend(listed);
    }
    Ok(paths)
}

/// Attributes carried over to the generated item: everything except the
/// spec markers and derives.
pub fn carried_attrs(attrs: &[Attribute]) -> Vec<Attribute> {
    attrs
        .iter()
        .filter(|attr| !is_entity_spec(attr) && !is_entity_id(attr) && !attr.path().is_ident("derive"))
        .cloned()
        .collect()
}
