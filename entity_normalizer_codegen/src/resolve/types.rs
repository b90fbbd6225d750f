//! Resolved types and the container table.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};
use syn::{GenericArgument, Path, PathArguments, Type};

use crate::resolve::table::{EntityTypeTable, QualifiedEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFamily {
    List,
    Map,
}

/// Standard containers the planners know how to walk and rebuild.
///
/// Every entry is concrete, so a rebuilt copy always uses the declared
/// container; the table supplies its qualified path and grow method so
/// generated store code does not depend on the user's imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
pub enum ContainerKind {
    Vec,
    VecDeque,
    LinkedList,
    HashMap,
    BTreeMap,
}

impl ContainerKind {
    pub fn family(self) -> ContainerFamily {
        match self {
            Self::Vec | Self::VecDeque | Self::LinkedList => ContainerFamily::List,
            Self::HashMap | Self::BTreeMap => ContainerFamily::Map,
        }
    }

    pub fn qualified_path(self) -> TokenStream {
        match self {
            Self::Vec => quote!(::std::vec::Vec),
            Self::VecDeque => quote!(::std::collections::VecDeque),
            Self::LinkedList => quote!(::std::collections::LinkedList),
            Self::HashMap => quote!(::std::collections::HashMap),
            Self::BTreeMap => quote!(::std::collections::BTreeMap),
        }
    }

    pub fn insert_method(self) -> Ident {
        match self {
            Self::Vec => format_ident!("push"),
            Self::VecDeque | Self::LinkedList => format_ident!("push_back"),
            Self::HashMap | Self::BTreeMap => format_ident!("insert"),
        }
    }

    /// Raw type identity: the bare name, or a path rooted at `std`, `alloc` or `core`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let last = path.segments.last()?;
        let kind = Self::iter().find(|kind| last.ident == kind.as_ref())?;

        let prefix = path.segments.len() - 1;
        let rooted = match path.segments.first() {
            Some(first) if prefix > 0 => {
                first.ident == "std" || first.ident == "alloc" || first.ident == "core"
            }
            _ => path.leading_colon.is_none(),
        };
        rooted.then_some(kind)
    }

    /// Number of type arguments the planners rely on
    fn arity(self) -> usize {
        match self.family() {
            ContainerFamily::List => 1,
            ContainerFamily::Map => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    /// Leaf value, copied with `Clone`
    Opaque(Type),
    Entity(QualifiedEntity),
    List {
        container: ContainerKind,
        elem: Box<ResolvedType>,
    },
    Map {
        container: ContainerKind,
        key: Box<ResolvedType>,
        value: Box<ResolvedType>,
    },
    /// Parameterized type outside the container table; arguments are resolved
    /// but never walked
    OtherParameterized { raw: Path, args: Vec<ResolvedType> },
}

impl ResolvedType {
    /// Whether put and get must walk this position.
    pub fn holds_entities(&self) -> bool {
        match self {
            Self::Entity(_) => true,
            Self::List { elem, .. } => elem.holds_entities(),
            Self::Map { key, value, .. } => key.holds_entities() || value.holds_entities(),
            Self::Opaque(_) | Self::OtherParameterized { .. } => false,
        }
    }

    /// Whether any entity appears anywhere, including unwalked positions.
    pub fn mentions_entity(&self) -> bool {
        match self {
            Self::Entity(_) => true,
            Self::List { elem, .. } => elem.mentions_entity(),
            Self::Map { key, value, .. } => key.mentions_entity() || value.mentions_entity(),
            Self::OtherParameterized { args, .. } => args.iter().any(Self::mentions_entity),
            Self::Opaque(_) => false,
        }
    }
}

/// Rewrites declared types against an [`EntityTypeTable`].
///
/// syn types are owned trees, so recursion always terminates; an entity
/// position resolves to its table entry and is never expanded further, which
/// keeps mutually referencing specs to a single pass.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    table: &'a EntityTypeTable,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a EntityTypeTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, ty: &Type) -> ResolvedType {
        match ty {
            Type::Paren(inner) => self.resolve(&inner.elem),
            Type::Group(inner) => self.resolve(&inner.elem),
            Type::Path(type_path) if type_path.qself.is_none() => self.resolve_path(ty, &type_path.path),
            _ => ResolvedType::Opaque(ty.clone()),
        }
    }

    fn resolve_path(&self, ty: &Type, path: &Path) -> ResolvedType {
        if let Some(entity) = self.lookup_bare(path) {
            return ResolvedType::Entity(entity.clone());
        }

        let Some(last) = path.segments.last() else {
            return ResolvedType::Opaque(ty.clone());
        };
        let args: Vec<&Type> = match &last.arguments {
            PathArguments::AngleBracketed(bracketed) => bracketed
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        if args.is_empty() {
            return ResolvedType::Opaque(ty.clone());
        }

        match ContainerKind::from_path(path) {
            Some(container) if args.len() == container.arity() => match container.family() {
                ContainerFamily::List => ResolvedType::List {
                    container,
                    elem: Box::new(self.resolve(args[0])),
                },
                ContainerFamily::Map => ResolvedType::Map {
                    container,
                    key: Box::new(self.resolve(args[0])),
                    value: Box::new(self.resolve(args[1])),
                },
            },
            _ => {
                let mut raw = path.clone();
                if let Some(last) = raw.segments.last_mut() {
                    last.arguments = PathArguments::None;
                }
                ResolvedType::OtherParameterized {
                    raw,
                    args: args.into_iter().map(|arg| self.resolve(arg)).collect(),
                }
            }
        }
    }

    /// Only a bare, unparameterized single-segment name can match the table.
    fn lookup_bare(&self, path: &Path) -> Option<&'a QualifiedEntity> {
        if path.leading_colon.is_some() || path.segments.len() != 1 {
            return None;
        }
        let segment = path.segments.first()?;
        if !segment.arguments.is_none() {
            return None;
        }
        self.table.lookup(&segment.ident.to_string())
    }
}
