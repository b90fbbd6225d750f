//! Entity type table: simple generated name to qualified generated type.

use std::{collections::BTreeMap, fmt};

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::Path;

use crate::parse::ModulePath;

/// A generated entity type and the module it lives in, relative to the root module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedEntity {
    pub module: ModulePath,
    pub name: Ident,
}

impl QualifiedEntity {
    pub fn new(module: ModulePath, name: Ident) -> Self {
        Self { module, name }
    }

    /// Path to the entity from the generated store module, a direct child of the root.
    pub fn from_store(&self) -> TokenStream {
        let segments = self.module.iter();
        let name = &self.name;
        quote!(super #(:: #segments)* :: #name)
    }

    /// `<Entity as runtime::Entity>::Id`, seen from the store module.
    pub fn id_type(&self, runtime: &Path) -> TokenStream {
        let path = self.from_store();
        quote!(<#path as #runtime::Entity>::Id)
    }
}

impl fmt::Display for QualifiedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.module, self.name)
        }
    }
}

/// Populated once per round, before any planning; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct EntityTypeTable {
    entries: BTreeMap<String, QualifiedEntity>,
}

impl EntityTypeTable {
    /// Insert an entry, returning the existing one when the simple name is taken.
    pub fn insert(&mut self, entity: QualifiedEntity) -> Result<(), &QualifiedEntity> {
        let key = entity.name.to_string();
        if self.entries.contains_key(&key) {
            return Err(&self.entries[&key]);
        }
        self.entries.insert(key, entity);
        Ok(())
    }

    pub fn lookup(&self, simple_name: &str) -> Option<&QualifiedEntity> {
        self.entries.get(simple_name)
    }

    pub fn contains(&self, simple_name: &str) -> bool {
        self.entries.contains_key(simple_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QualifiedEntity> {
        self.entries.values()
    }
}
