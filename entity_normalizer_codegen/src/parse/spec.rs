//! The spec model produced by intake.

use std::fmt;

use derive_more::{Deref, From};
use proc_macro2::{Ident, Span};
use syn::{Attribute, Fields, ItemStruct, Meta, Path, Type, Visibility, spanned::Spanned, visit::Visit};

use crate::{
    error::SpecError,
    parse::attributes::{self, SpecAttribute},
    utils::naming,
};

/// Module path of a spec, relative to the annotated root module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, From, Deref)]
pub struct ModulePath(Vec<Ident>);

impl ModulePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: &Ident) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.clone());
        Self(segments)
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                f.write_str("::")?;
            }
            first = false;
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// One declared property, in declaration order
#[derive(Debug, Clone)]
pub struct SpecField {
    pub name: Ident,
    pub ty: Type,
    /// Doc comments and other attributes carried to the generated field
    pub attrs: Vec<Attribute>,
    pub is_id: bool,
}

/// An entity declaration, immutable once intake has produced it
#[derive(Debug, Clone)]
pub struct EntitySpec {
    pub module: ModulePath,
    /// Ident of the declaring struct, replaced by the generated entity
    pub spec_ident: Ident,
    pub spec_name: String,
    pub generated_name: Ident,
    pub vis: Visibility,
    pub fields: Vec<SpecField>,
    /// Index of the `#[entity_id]` field in `fields`
    pub id_index: usize,
    pub derives: Vec<Path>,
    pub attrs: Vec<Attribute>,
    pub span: Span,
}

impl EntitySpec {
    pub fn from_item(item: &ItemStruct, module: &ModulePath) -> Result<Self, SpecError> {
        let fallback = item.ident.to_string();
        let attr = SpecAttribute::from_attrs(&item.attrs, &fallback)?;
        let spec_name = attr.name.clone();
        let span = item.ident.span();

        if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
            return Err(SpecError::invalid(
                &spec_name,
                item.generics.span(),
                "generic parameters are not supported on entity specs",
            ));
        }

        let Fields::Named(named) = &item.fields else {
            return Err(SpecError::invalid(
                &spec_name,
                span,
                "expected a struct with named fields",
            ));
        };

        let mut fields = Vec::with_capacity(named.named.len());
        for field in &named.named {
            let Some(name) = field.ident.clone() else {
                continue;
            };
            if name == "new" {
                return Err(SpecError::invalid(
                    &spec_name,
                    name.span(),
                    "field name `new` collides with the generated constructor",
                ));
            }
            if let Some(what) = unsupported_type(&field.ty) {
                return Err(SpecError::invalid(
                    &spec_name,
                    field.ty.span(),
                    format!("field `{name}` uses {what}, which cannot be analyzed"),
                ));
            }

            let mut is_id = false;
            for id_attr in field.attrs.iter().filter(|attr| attributes::is_entity_id(attr)) {
                if !matches!(id_attr.meta, Meta::Path(_)) {
                    return Err(SpecError::invalid(
                        &spec_name,
                        id_attr.span(),
                        "#[entity_id] takes no arguments",
                    ));
                }
                is_id = true;
            }

            fields.push(SpecField {
                name,
                ty: field.ty.clone(),
                attrs: attributes::carried_attrs(&field.attrs),
                is_id,
            });
        }

        let id_index = match fields.iter().filter(|field| field.is_id).count() {
            0 => return Err(SpecError::MissingId { spec_name, span }),
            1 => fields.iter().position(|field| field.is_id).unwrap_or_default(),
            count => return Err(SpecError::MultipleIds { spec_name, count, span }),
        };

        let type_name = naming::effective_type_name(&attr.name, attr.class_name.as_deref());
        let mut generated_name = syn::parse_str::<Ident>(&type_name).map_err(|_| {
            SpecError::invalid(&spec_name, span, format!("`{type_name}` is not a valid type name"))
        })?;
        generated_name.set_span(span);

        Ok(Self {
            module: module.clone(),
            spec_ident: item.ident.clone(),
            derives: attributes::derive_paths(&item.attrs, &spec_name)?,
            attrs: attributes::carried_attrs(&item.attrs),
            spec_name,
            generated_name,
            vis: item.vis.clone(),
            fields,
            id_index,
            span,
        })
    }

    pub fn id_field(&self) -> &SpecField {
        &self.fields[self.id_index]
    }
}

/// Describes the first type form that hides its structure from analysis.
fn unsupported_type(ty: &Type) -> Option<&'static str> {
    #[derive(Default)]
    struct Finder(Option<&'static str>);

    impl<'ast> Visit<'ast> for Finder {
        fn visit_type(&mut self, ty: &'ast Type) {
            if self.0.is_some() {
                return;
            }
            match ty {
                Type::Macro(_) => self.0 = Some("a macro in type position"),
                Type::ImplTrait(_) => self.0 = Some("`impl Trait`"),
                Type::Infer(_) => self.0 = Some("an inferred type `_`"),
                _ => syn::visit::visit_type(self, ty),
            }
        }
    }

    let mut finder = Finder::default();
    finder.visit_type(ty);
    finder.0
}
