//! Entity type plans.
//!
//! For each spec: a struct with private fields in declaration order, a
//! constructor taking every property in that order, one getter per property
//! and the runtime `Entity` implementation.

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::Path;

use crate::{
    error::PlanError,
    ir::{Expr, Stmt},
    plan::{
        FieldPlan, FnPlan, ImplPlan, PlanContext, Placement, Planner, PlannerKind, Receiver, Shape,
        TypePlan, doc, paths,
    },
    resolve::ResolvedEntity,
    utils::naming,
};

/// Derives every generated entity carries; value equality is required by reads.
const BASE_DERIVES: [&str; 3] = ["Debug", "Clone", "PartialEq"];

/// Constructors above this arity trip `clippy::too_many_arguments`.
const CLIPPY_ARGUMENT_LIMIT: usize = 7;

pub struct EntityPlanner;

impl Planner for EntityPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Entity
    }

    fn plan(&self, ctx: &PlanContext<'_>) -> Result<Vec<TypePlan>, PlanError> {
        Ok(ctx
            .entities
            .iter()
            .map(|entity| EntityGenerator::new(entity, ctx.runtime()).plan())
            .collect())
    }
}

pub struct EntityGenerator<'a> {
    entity: &'a ResolvedEntity,
    runtime: &'a Path,
}

impl<'a> EntityGenerator<'a> {
    pub fn new(entity: &'a ResolvedEntity, runtime: &'a Path) -> Self {
        Self { entity, runtime }
    }

    pub fn plan(&self) -> TypePlan {
        let spec = &self.entity.spec;
        let mut attrs: Vec<TokenStream> = spec.attrs.iter().map(ToTokens::to_token_stream).collect();
        if !spec.attrs.iter().any(|attr| attr.path().is_ident("doc")) {
            attrs.push(doc(&format!("Entity `{}`.", spec.spec_name)));
        }
        attrs.push(self.derives());

        let fields = self
            .entity
            .properties
            .iter()
            .map(|property| FieldPlan {
                attrs: property.attrs.iter().map(ToTokens::to_token_stream).collect(),
                name: property.name.clone(),
                ty: property.declared.to_token_stream(),
            })
            .collect();

        let mut inherent = vec![self.constructor()];
        inherent.extend(self.getters());

        TypePlan {
            kind: PlannerKind::Entity,
            placement: Placement::Entity {
                module: spec.module.clone(),
                spec: spec.spec_ident.clone(),
            },
            name: self.entity.name().clone(),
            vis: spec.vis.to_token_stream(),
            attrs,
            shape: Shape::Struct(fields),
            inherent,
            impls: vec![self.entity_impl()],
        }
    }

    /// Base derives followed by the spec's own, without repeats.
    fn derives(&self) -> TokenStream {
        let mut derives: Vec<TokenStream> = BASE_DERIVES
            .iter()
            .map(|name| format_ident!("{}", name).to_token_stream())
            .collect();
        for path in &self.entity.spec.derives {
            let repeated = path
                .segments
                .last()
                .is_some_and(|last| BASE_DERIVES.iter().any(|base| last.ident == base));
            if !repeated {
                derives.push(path.to_token_stream());
            }
        }
        quote!(#[derive(#(#derives),*)])
    }

    fn constructor(&self) -> FnPlan {
        let properties = &self.entity.properties;
        let params = properties
            .iter()
            .map(|property| (property.name.clone(), property.declared.to_token_stream()))
            .collect();
        let fields = properties.iter().map(|property| property.name.clone()).collect();
        let attrs = if properties.len() > CLIPPY_ARGUMENT_LIMIT {
            vec![quote!(#[allow(clippy::too_many_arguments)])]
        } else {
            Vec::new()
        };

        FnPlan::builder()
            .attrs(attrs)
            .public(true)
            .name(format_ident!("new"))
            .receiver(Receiver::None)
            .params(params)
            .ret(quote!(Self))
            .body(vec![Stmt::ret(Expr::Construct { path: quote!(Self), fields })].into())
            .build()
    }

    fn getters(&self) -> impl Iterator<Item = FnPlan> + '_ {
        self.entity.properties.iter().map(|property| {
            let ty = &property.declared;
            FnPlan::builder()
                .public(true)
                .name(naming::getter_name(&property.name))
                .ret(quote!(&#ty))
                .body(vec![Stmt::ret(Expr::lit(quote!(self)).field(property.name.clone()).by_ref())].into())
                .build()
        })
    }

    fn entity_impl(&self) -> ImplPlan {
        let runtime = self.runtime;
        let id = self.entity.id_property();
        let id_ty = &id.declared;
        let entity_type = format!("::{}", self.entity.name());
        let clone = paths::clone();

        let id_fn = FnPlan::builder()
            .name(format_ident!("id"))
            .ret(quote!(Self::Id))
            .body(
                vec![Stmt::ret(Expr::invoke(
                    clone,
                    vec![Expr::lit(quote!(self)).field(id.name.clone()).by_ref()],
                ))]
                .into(),
            )
            .build();

        let mut plan = ImplPlan::new(quote!(#runtime::Entity), vec![id_fn]);
        plan.items = vec![
            quote!(type Id = #id_ty;),
            quote!(const ENTITY_TYPE: &'static str = concat!(module_path!(), #entity_type);),
        ];
        plan
    }
}
