//! Code planning.
//!
//! Every planner turns the resolved round into [`TypePlan`]s: abstract
//! declarations (fields, signatures, IR bodies) that the emitter lowers
//! without any semantic knowledge.
//!
//! Planners run in [`PlannerKind`] declaration order:
//!
//! 1. `Entity`: one entity type per spec, in the spec's own module
//! 2. `Store`: `InMemoryEntityStore`
//! 3. `Repository`: `NormalizedEntityRepository` and its builder, with the
//!    put and get plans from [`put`] and [`get`]
//! 4. `StoreInterfaces`: `EntityStoreReader` / `EntityStoreWriter`
//! 5. `RepositoryInterfaces`: `EntityRef` and the repository reader/writer traits

pub mod entity;
pub mod get;
pub mod interfaces;
pub mod put;
pub mod repository;
pub mod store;

use std::collections::HashMap;

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use strum::{Display, EnumIter};
use syn::Path;
use typed_builder::TypedBuilder;

use crate::{
    config::CodegenConfig,
    error::PlanError,
    ir::Block,
    parse::ModulePath,
    resolve::{EntityTypeTable, ResolvedEntity},
    utils::naming,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PlannerKind {
    Entity,
    Store,
    Repository,
    StoreInterfaces,
    RepositoryInterfaces,
}

impl PlannerKind {
    pub fn planner(self) -> Box<dyn Planner> {
        match self {
            Self::Entity => Box::new(entity::EntityPlanner),
            Self::Store => Box::new(store::StorePlanner),
            Self::Repository => Box::new(repository::RepositoryPlanner),
            Self::StoreInterfaces => Box::new(interfaces::StoreInterfacesPlanner),
            Self::RepositoryInterfaces => Box::new(interfaces::RepositoryInterfacesPlanner),
        }
    }

    /// Whether this planner's output lands in the generated store module.
    pub fn targets_store(self) -> bool {
        !matches!(self, Self::Entity)
    }
}

pub trait Planner {
    fn kind(&self) -> PlannerKind;

    fn plan(&self, ctx: &PlanContext<'_>) -> Result<Vec<TypePlan>, PlanError>;
}

/// Read-only state shared by all planners of a round
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    pub entities: &'a [ResolvedEntity],
    pub table: &'a EntityTypeTable,
    pub config: &'a CodegenConfig,
}

impl<'a> PlanContext<'a> {
    pub fn new(entities: &'a [ResolvedEntity], table: &'a EntityTypeTable, config: &'a CodegenConfig) -> Self {
        Self {
            entities,
            table,
            config,
        }
    }

    pub fn runtime(&self) -> &Path {
        &self.config.runtime_path
    }

    /// Per-entity accessors share one namespace on every store-side type.
    pub fn check_accessors(&self, planner: PlannerKind) -> Result<(), PlanError> {
        let mut seen: HashMap<String, &ResolvedEntity> = HashMap::new();
        for entity in self.entities {
            let method = naming::get_method(entity.name()).to_string();
            if let Some(first) = seen.get(&method) {
                return Err(PlanError::AccessorCollision {
                    planner,
                    method,
                    first: first.qualified.to_string(),
                    second: entity.qualified.to_string(),
                    span: entity.spec.span,
                });
            }
            seen.insert(method, entity);
        }
        Ok(())
    }
}

/// Where an emitted declaration lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Replaces spec struct `spec` inside `module`
    Entity { module: ModulePath, spec: Ident },
    /// Inside the generated store module
    Store,
}

/// Abstract declaration of one generated type
#[derive(Debug, Clone)]
pub struct TypePlan {
    pub kind: PlannerKind,
    pub placement: Placement,
    pub name: Ident,
    pub vis: TokenStream,
    pub attrs: Vec<TokenStream>,
    pub shape: Shape,
    pub inherent: Vec<FnPlan>,
    pub impls: Vec<ImplPlan>,
}

#[derive(Debug, Clone)]
pub enum Shape {
    Struct(Vec<FieldPlan>),
    Enum(Vec<VariantPlan>),
    /// Method signatures only
    Trait(Vec<FnPlan>),
}

#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub attrs: Vec<TokenStream>,
    pub name: Ident,
    pub ty: TokenStream,
}

#[derive(Debug, Clone)]
pub struct VariantPlan {
    pub attrs: Vec<TokenStream>,
    pub name: Ident,
    pub payload: TokenStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    None,
    Ref,
    RefMut,
    Value,
    MutValue,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct FnPlan {
    #[builder(default)]
    pub attrs: Vec<TokenStream>,
    #[builder(default = false)]
    pub public: bool,
    pub name: Ident,
    /// `<H: Hasher>` and the like
    #[builder(default, setter(strip_option))]
    pub generics: Option<TokenStream>,
    #[builder(default = Receiver::Ref)]
    pub receiver: Receiver,
    #[builder(default)]
    pub params: Vec<(Ident, TokenStream)>,
    #[builder(default, setter(strip_option))]
    pub ret: Option<TokenStream>,
    /// `None` for trait method declarations
    #[builder(default, setter(strip_option))]
    pub body: Option<Block>,
}

impl FnPlan {
    /// Same signature without a body, as declared in a trait.
    pub fn signature(&self) -> Self {
        Self {
            attrs: Vec::new(),
            public: false,
            body: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImplPlan {
    pub attrs: Vec<TokenStream>,
    pub trait_path: TokenStream,
    /// Associated types and constants, already rendered
    pub items: Vec<TokenStream>,
    pub methods: Vec<FnPlan>,
}

impl ImplPlan {
    pub fn new(trait_path: TokenStream, methods: Vec<FnPlan>) -> Self {
        Self {
            attrs: Vec::new(),
            trait_path,
            items: Vec::new(),
            methods,
        }
    }
}

/// `#[doc = "..."]` for generated items.
pub fn doc(text: &str) -> TokenStream {
    quote!(#[doc = #text])
}

/// Fully qualified std paths used in generated store code
pub mod paths {
    use proc_macro2::TokenStream;
    use quote::quote;

    pub fn rc() -> TokenStream {
        quote!(::std::rc::Rc)
    }

    pub fn ref_cell() -> TokenStream {
        quote!(::std::cell::RefCell)
    }

    pub fn hash_map() -> TokenStream {
        quote!(::std::collections::HashMap)
    }

    pub fn hash_set() -> TokenStream {
        quote!(::std::collections::HashSet)
    }

    pub fn vec() -> TokenStream {
        quote!(::std::vec::Vec)
    }

    pub fn option() -> TokenStream {
        quote!(::std::option::Option)
    }

    pub fn some() -> TokenStream {
        quote!(::std::option::Option::Some)
    }

    pub fn clone() -> TokenStream {
        quote!(::std::clone::Clone::clone)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use test_support::*;

    #[test]
    fn test_entity_planner_runs_first() {
        let kinds: Vec<PlannerKind> = PlannerKind::iter().collect();
        assert_eq!(kinds[0], PlannerKind::Entity);
        assert!(kinds[1..].iter().all(|kind| kind.targets_store()));
        assert_eq!(PlannerKind::StoreInterfaces.to_string(), "store_interfaces");
    }

    #[test]
    fn test_accessor_collision() {
        let resolution = resolve(syn::parse_quote! {
            mod model {
                #[entity_spec(name = "httpServer")]
                struct A { #[entity_id] id: u8 }
                #[entity_spec(name = "HTTPServer")]
                struct B { #[entity_id] id: u8 }
            }
        });
        let config = config();
        let ctx = PlanContext::new(&resolution.entities, &resolution.table, &config);
        let err = ctx.check_accessors(PlannerKind::Store).unwrap_err();
        assert!(err.to_string().contains("get_http_server"));
        assert_eq!(err.planner(), PlannerKind::Store);
    }

    #[test]
    fn test_messaging_accessors_unique() {
        let resolution = messaging();
        let config = config();
        let ctx = PlanContext::new(&resolution.entities, &resolution.table, &config);
        assert!(ctx.check_accessors(PlannerKind::Repository).is_ok());
    }
}
