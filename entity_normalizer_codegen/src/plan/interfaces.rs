//! Store and repository traits, plus the `EntityRef` dirty-set element.
//!
//! Trait methods are the signatures of the methods the store and repository
//! planners generate, so both sides always agree.

use quote::{format_ident, quote};

use crate::{
    error::PlanError,
    ir::{Arm, BinOp, Expr, Stmt},
    plan::{
        FnPlan, ImplPlan, PlanContext, Placement, Planner, PlannerKind, Receiver, Shape, TypePlan,
        VariantPlan, doc, get::plan_get, paths, put::plan_put,
        store::{plan_store_get, plan_store_put},
    },
    utils::naming,
};

pub struct StoreInterfacesPlanner;

impl Planner for StoreInterfacesPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::StoreInterfaces
    }

    fn plan(&self, ctx: &PlanContext<'_>) -> Result<Vec<TypePlan>, PlanError> {
        ctx.check_accessors(self.kind())?;
        let runtime = ctx.runtime();

        let reader = trait_plan(
            self.kind(),
            naming::store_reader_trait(),
            " Read side of an entity store.",
            ctx.entities.iter().map(|e| plan_store_get(runtime, e).signature()).collect(),
        );
        let writer = trait_plan(
            self.kind(),
            naming::store_writer_trait(),
            " Write side of an entity store. `put_*` reports whether the entity was stored.",
            ctx.entities.iter().map(|e| plan_store_put(runtime, e).signature()).collect(),
        );
        Ok(vec![reader, writer])
    }
}

pub struct RepositoryInterfacesPlanner;

impl Planner for RepositoryInterfacesPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::RepositoryInterfaces
    }

    fn plan(&self, ctx: &PlanContext<'_>) -> Result<Vec<TypePlan>, PlanError> {
        ctx.check_accessors(self.kind())?;

        let reader = trait_plan(
            self.kind(),
            naming::repository_reader_trait(),
            " Reads entities with every nested reference brought up to date.",
            ctx.entities.iter().map(|e| plan_get(ctx, e).signature()).collect(),
        );
        let writer = trait_plan(
            self.kind(),
            naming::repository_writer_trait(),
            " Stores entities transitively and reports the touched ones.",
            ctx.entities.iter().map(|e| plan_put(e).signature()).collect(),
        );
        Ok(vec![self.entity_ref(ctx), reader, writer])
    }
}

fn trait_plan(kind: PlannerKind, name: proc_macro2::Ident, summary: &str, methods: Vec<FnPlan>) -> TypePlan {
    TypePlan {
        kind,
        placement: Placement::Store,
        name,
        vis: quote!(pub),
        attrs: vec![doc(summary)],
        shape: Shape::Trait(methods),
        inherent: Vec::new(),
        impls: Vec::new(),
    }
}

impl RepositoryInterfacesPlanner {
    /// `EntityRef`: one variant per entity holding an `Rc` to it.
    ///
    /// Equality is entity value equality within the same variant; hashing
    /// covers the entity type name and id only, which agrees with it.
    fn entity_ref(&self, ctx: &PlanContext<'_>) -> TypePlan {
        let runtime = ctx.runtime();
        let rc = paths::rc();
        let (entity, first, second, state) = (
            format_ident!("entity"),
            format_ident!("first"),
            format_ident!("second"),
            format_ident!("state"),
        );

        let mut variants = Vec::new();
        let mut type_arms = Vec::new();
        let mut eq_arms = Vec::new();
        let mut hash_arms = Vec::new();
        let mut from_impls = Vec::new();
        for resolved in ctx.entities {
            let name = resolved.name();
            let path = resolved.qualified.from_store();
            let entity_type = quote!(<#path as #runtime::Entity>::ENTITY_TYPE);

            variants.push(VariantPlan {
                attrs: Vec::new(),
                name: name.clone(),
                payload: quote!(#rc<#path>),
            });
            type_arms.push(Arm::value(quote!(Self::#name(_)), Expr::lit(entity_type.clone())));
            eq_arms.push(Arm::value(
                quote!((Self::#name(#first), Self::#name(#second))),
                Expr::name(&first).binary(BinOp::Eq, Expr::name(&second)),
            ));
            hash_arms.push(Arm::new(
                quote!(Self::#name(#entity)),
                vec![
                    Stmt::expr(Expr::invoke(
                        quote!(::std::hash::Hash::hash),
                        vec![Expr::lit(entity_type), Expr::name(&state)],
                    )),
                    Stmt::expr(Expr::invoke(
                        quote!(::std::hash::Hash::hash),
                        vec![
                            Expr::invoke(quote!(#runtime::Entity::id), vec![Expr::lit(quote!(**#entity)).by_ref()])
                                .by_ref(),
                            Expr::name(&state),
                        ],
                    )),
                ],
            ));

            from_impls.push(ImplPlan::new(
                quote!(::std::convert::From<#path>),
                vec![from_fn(&entity, path.clone(), Expr::invoke(quote!(#rc::new), vec![Expr::name(&entity)]), name)],
            ));
            from_impls.push(ImplPlan::new(
                quote!(::std::convert::From<#rc<#path>>),
                vec![from_fn(&entity, quote!(#rc<#path>), Expr::name(&entity), name)],
            ));
        }
        eq_arms.push(Arm::value(quote!(_), Expr::lit(quote!(false))));

        let entity_type = FnPlan::builder()
            .attrs(vec![doc(" Fully qualified type name of the referenced entity.")])
            .public(true)
            .name(format_ident!("entity_type"))
            .ret(quote!(&'static str))
            .body(vec![Stmt::ret(Expr::lit(quote!(self)).matching(type_arms))].into())
            .build();
        let eq = FnPlan::builder()
            .attrs(vec![quote!(#[allow(unreachable_patterns)])])
            .name(format_ident!("eq"))
            .params(vec![(format_ident!("other"), quote!(&Self))])
            .ret(quote!(bool))
            .body(vec![Stmt::ret(Expr::lit(quote!((self, other))).matching(eq_arms))].into())
            .build();
        let hash = FnPlan::builder()
            .name(format_ident!("hash"))
            .generics(quote!(<H: ::std::hash::Hasher>))
            .params(vec![(state, quote!(&mut H))])
            .body(vec![Stmt::ret(Expr::lit(quote!(self)).matching(hash_arms))].into())
            .build();

        let mut impls = vec![
            ImplPlan::new(quote!(::std::cmp::PartialEq), vec![eq]),
            ImplPlan::new(quote!(::std::cmp::Eq), Vec::new()),
            ImplPlan::new(quote!(::std::hash::Hash), vec![hash]),
        ];
        impls.extend(from_impls);

        TypePlan {
            kind: self.kind(),
            placement: Placement::Store,
            name: naming::entity_ref_enum(),
            vis: quote!(pub),
            attrs: vec![
                doc(" A stored entity, as reported in the dirty set of `put_*`."),
                quote!(#[derive(Debug, Clone)]),
            ],
            shape: Shape::Enum(variants),
            inherent: vec![entity_type],
            impls,
        }
    }
}

fn from_fn(
    param: &proc_macro2::Ident,
    param_ty: proc_macro2::TokenStream,
    payload: Expr,
    variant: &proc_macro2::Ident,
) -> FnPlan {
    FnPlan::builder()
        .name(format_ident!("from"))
        .receiver(Receiver::None)
        .params(vec![(param.clone(), param_ty)])
        .ret(quote!(Self))
        .body(vec![Stmt::ret(Expr::invoke(quote!(Self::#variant), vec![payload]))].into())
        .build()
}
