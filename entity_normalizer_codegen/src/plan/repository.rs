//! `NormalizedEntityRepository` and its builder.
//!
//! The repository owns no maps. Reads probe the configured readers in order
//! and take the first hit; writes are broadcast to every writer. Both lists
//! default to one shared `InMemoryEntityStore`.

use proc_macro2::{Ident, TokenStream};
use quote::{ToTokens, format_ident, quote};

use crate::{
    error::PlanError,
    ir::{BinOp, Binding, Block, Cond, Expr, Stmt},
    plan::{
        FieldPlan, FnPlan, ImplPlan, PlanContext, Placement, Planner, PlannerKind, Receiver, Shape,
        TypePlan, doc, get::plan_get, paths, put::plan_put,
    },
    resolve::ResolvedEntity,
    utils::naming,
};

pub struct RepositoryPlanner;

impl Planner for RepositoryPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Repository
    }

    fn plan(&self, ctx: &PlanContext<'_>) -> Result<Vec<TypePlan>, PlanError> {
        ctx.check_accessors(self.kind())?;
        Ok(vec![self.repository(ctx), self.builder()])
    }
}

struct Lists {
    readers: Ident,
    writers: Ident,
    reader_ty: TokenStream,
    writer_ty: TokenStream,
}

impl Lists {
    fn new() -> Self {
        let rc = paths::rc();
        let vec = paths::vec();
        let reader = naming::store_reader_trait();
        let writer = naming::store_writer_trait();
        Self {
            readers: format_ident!("readers"),
            writers: format_ident!("writers"),
            reader_ty: quote!(#vec<#rc<dyn #reader>>),
            writer_ty: quote!(#vec<#rc<dyn #writer>>),
        }
    }

    fn fields(&self) -> Vec<FieldPlan> {
        vec![
            FieldPlan {
                attrs: Vec::new(),
                name: self.readers.clone(),
                ty: self.reader_ty.clone(),
            },
            FieldPlan {
                attrs: Vec::new(),
                name: self.writers.clone(),
                ty: self.writer_ty.clone(),
            },
        ]
    }
}

impl RepositoryPlanner {
    fn repository(&self, ctx: &PlanContext<'_>) -> TypePlan {
        let lists = Lists::new();
        let builder = naming::repository_builder();

        let constructor = FnPlan::builder()
            .name(format_ident!("new"))
            .receiver(Receiver::None)
            .params(vec![
                (lists.readers.clone(), lists.reader_ty.clone()),
                (lists.writers.clone(), lists.writer_ty.clone()),
            ])
            .ret(quote!(Self))
            .body(
                vec![Stmt::ret(Expr::Construct {
                    path: quote!(Self),
                    fields: vec![lists.readers.clone(), lists.writers.clone()],
                })]
                .into(),
            )
            .build();
        let builder_fn = FnPlan::builder()
            .public(true)
            .name(format_ident!("builder"))
            .receiver(Receiver::None)
            .ret(quote!(#builder))
            .body(vec![Stmt::ret(Expr::invoke(quote!(::std::default::Default::default), Vec::new()))].into())
            .build();

        let mut inherent = vec![constructor, builder_fn];
        for entity in ctx.entities {
            inherent.push(plan_read(ctx, entity, &lists.readers));
            inherent.push(plan_write(entity, &lists.writers));
        }

        let default = FnPlan::builder()
            .name(format_ident!("default"))
            .receiver(Receiver::None)
            .ret(quote!(Self))
            .body(
                vec![Stmt::ret(
                    Expr::invoke(quote!(Self::builder), Vec::new()).call(format_ident!("build"), Vec::new()),
                )]
                .into(),
            )
            .build();
        let reader = naming::repository_reader_trait();
        let writer = naming::repository_writer_trait();
        let getters = ctx.entities.iter().map(|e| plan_get(ctx, e)).collect();
        let putters = ctx.entities.iter().map(plan_put).collect();

        TypePlan {
            kind: self.kind(),
            placement: Placement::Store,
            name: naming::repository(),
            vis: quote!(pub),
            attrs: vec![
                doc(" Normalizing repository over a chain of entity stores."),
                doc(""),
                doc(" `put_*` stores an entity together with every entity reachable from it and"),
                doc(" reports all of them as dirty. `get_*` rebuilds stale nested references from"),
                doc(" the latest stored versions."),
            ],
            shape: Shape::Struct(lists.fields()),
            inherent,
            impls: vec![
                ImplPlan::new(quote!(::std::default::Default), vec![default]),
                ImplPlan::new(quote!(#reader), getters),
                ImplPlan::new(quote!(#writer), putters),
            ],
        }
    }

    fn builder(&self) -> TypePlan {
        let lists = Lists::new();
        let (readers, writers) = (&lists.readers, &lists.writers);
        let rc = paths::rc();
        let store_ty = naming::in_memory_store();
        let repository = naming::repository();
        let store = format_ident!("store");

        let setter = |name: &str, list: &Ident, item: TokenStream| {
            let rc = paths::rc();
            FnPlan::builder()
                .public(true)
                .name(format_ident!("{name}"))
                .receiver(Receiver::MutValue)
                .params(vec![(
                    list.clone(),
                    quote!(impl ::std::iter::IntoIterator<Item = #rc<dyn #item>>),
                )])
                .ret(quote!(Self))
                .body(
                    vec![
                        Stmt::Assign {
                            target: Expr::lit(quote!(self)).field(list.clone()),
                            value: Expr::name(list)
                                .call(format_ident!("into_iter"), Vec::new())
                                .call(format_ident!("collect"), Vec::new()),
                        },
                        Stmt::ret(Expr::lit(quote!(self))),
                    ]
                    .into(),
                )
                .build()
        };
        let set_readers = setter("set_readers", readers, naming::store_reader_trait().into_token_stream());
        let set_writers = setter("set_writers", writers, naming::store_writer_trait().into_token_stream());

        let is_empty = |list: &Ident| Expr::name(list).call(format_ident!("is_empty"), Vec::new());
        let push_store = |list: &Ident, value: Expr| Stmt::If {
            cond: Cond::Expr(is_empty(list)),
            then: vec![Stmt::expr(Expr::name(list).call(format_ident!("push"), vec![value]))].into(),
            otherwise: None,
        };
        let fallback: Block = vec![
            Stmt::Decl {
                name: store.clone(),
                mutable: false,
                ty: Some(quote!(#rc<#store_ty>)),
                init: Some(Expr::invoke(
                    quote!(#rc::new),
                    vec![Expr::invoke(quote!(#store_ty::new), Vec::new())],
                )),
            },
            push_store(readers, Expr::name(&store).call(format_ident!("clone"), Vec::new())),
            push_store(writers, Expr::name(&store)),
        ]
        .into();
        let build = FnPlan::builder()
            .public(true)
            .name(format_ident!("build"))
            .receiver(Receiver::Value)
            .ret(quote!(#repository))
            .body(
                vec![
                    Stmt::decl_mut(readers.clone(), Expr::lit(quote!(self)).field(readers.clone())),
                    Stmt::decl_mut(writers.clone(), Expr::lit(quote!(self)).field(writers.clone())),
                    Stmt::If {
                        cond: Cond::Expr(is_empty(readers).binary(BinOp::Or, is_empty(writers))),
                        then: fallback,
                        otherwise: None,
                    },
                    Stmt::ret(Expr::invoke(
                        quote!(#repository::new),
                        vec![Expr::name(readers), Expr::name(writers)],
                    )),
                ]
                .into(),
            )
            .build();

        TypePlan {
            kind: self.kind(),
            placement: Placement::Store,
            name: naming::repository_builder(),
            vis: quote!(pub),
            attrs: vec![
                doc(" Configures the store chain of a repository."),
                doc(""),
                doc(" An empty reader or writer list falls back to one fresh `InMemoryEntityStore`,"),
                doc(" shared by both lists when both are empty."),
                quote!(#[derive(Default)]),
            ],
            shape: Shape::Struct(lists.fields()),
            inherent: vec![set_readers, set_writers, build],
            impls: Vec::new(),
        }
    }
}

/// `read_<e>`: first hit among the readers
fn plan_read(ctx: &PlanContext<'_>, entity: &ResolvedEntity, readers: &Ident) -> FnPlan {
    let (rc, option, some) = (paths::rc(), paths::option(), paths::some());
    let path = entity.qualified.from_store();
    let id_ty = entity.qualified.id_type(ctx.runtime());
    let (id, reader, found) = (format_ident!("id"), format_ident!("reader"), format_ident!("found"));

    let probe = Stmt::If {
        cond: Cond::Let {
            binding: Binding::Some(found.clone()),
            value: Expr::name(&reader).call(naming::get_method(entity.name()), vec![Expr::name(&id)]),
        },
        then: vec![Stmt::ret(Expr::invoke(some, vec![Expr::name(&found)]))].into(),
        otherwise: None,
    };
    FnPlan::builder()
        .name(naming::read_helper(entity.name()))
        .params(vec![(id, quote!(&#id_ty))])
        .ret(quote!(#option<#rc<#path>>))
        .body(
            vec![
                Stmt::for_each(
                    Binding::Name(reader),
                    Expr::lit(quote!(self)).field(readers.clone()).call(format_ident!("iter"), Vec::new()),
                    vec![probe].into(),
                ),
                Stmt::ret(Expr::lit(quote!(::std::option::Option::None))),
            ]
            .into(),
        )
        .build()
}

/// `write_<e>`: broadcast to every writer
fn plan_write(entity: &ResolvedEntity, writers: &Ident) -> FnPlan {
    let rc = paths::rc();
    let path = entity.qualified.from_store();
    let (entity_var, writer) = (format_ident!("entity"), format_ident!("writer"));

    let put = Expr::name(&writer).call(
        naming::put_method(entity.name()),
        vec![Expr::invoke(quote!(#rc::clone), vec![Expr::name(&entity_var).by_ref()])],
    );
    FnPlan::builder()
        .name(naming::write_helper(entity.name()))
        .params(vec![(entity_var, quote!(#rc<#path>))])
        .body(
            vec![Stmt::for_each(
                Binding::Name(writer),
                Expr::lit(quote!(self)).field(writers.clone()).call(format_ident!("iter"), Vec::new()),
                vec![Stmt::expr(put)].into(),
            )]
            .into(),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        emit::Emitter,
        plan::test_support::{config, messaging, render},
    };

    fn rendered() -> Vec<String> {
        let resolution = messaging();
        let config = config();
        let ctx = PlanContext::new(&resolution.entities, &resolution.table, &config);
        RepositoryPlanner
            .plan(&ctx)
            .unwrap()
            .iter()
            .map(|plan| render(Emitter::new().lower(plan)))
            .collect()
    }

    #[test]
    fn test_repository_probes_and_broadcasts() {
        let text = &rendered()[0];
        assert!(text.contains("pub struct NormalizedEntityRepository {"));
        assert!(text.contains("readers: ::std::vec::Vec<::std::rc::Rc<dyn EntityStoreReader>>"));
        assert!(text.contains("for reader in self.readers.iter() {"));
        assert!(text.contains("if let ::std::option::Option::Some(found) = reader.get_user(id) {"));
        assert!(text.contains("return ::std::option::Option::Some(found);"));
        assert!(text.contains("for writer in self.writers.iter() {"));
        assert!(text.contains("writer.put_device(::std::rc::Rc::clone(&entity));"));
        assert!(text.contains("impl ::std::default::Default for NormalizedEntityRepository {"));
        assert!(text.contains("Self::builder().build()"));
        assert!(text.contains("impl NormalizedEntityRepositoryReader for NormalizedEntityRepository {"));
        assert!(text.contains("impl NormalizedEntityRepositoryWriter for NormalizedEntityRepository {"));
        assert!(text.contains("fn put_message("));
        assert!(text.contains("entity: super::message::Message"));
    }

    #[test]
    fn test_builder_shares_default_store() {
        let text = &rendered()[1];
        assert!(text.contains("#[derive(Default)]\npub struct NormalizedEntityRepositoryBuilder {"));
        assert!(text.contains("pub fn set_readers("));
        assert!(text.contains("::std::iter::IntoIterator<"));
        assert!(text.contains("if readers.is_empty() || writers.is_empty() {"));
        assert!(text.contains("let store: ::std::rc::Rc<InMemoryEntityStore>"));
        assert!(text.contains("InMemoryEntityStore::new()"));
        assert!(text.contains("readers.push(store.clone());"));
        assert!(text.contains("writers.push(store);"));
        assert!(text.contains("NormalizedEntityRepository::new(readers, writers)"));
    }
}
