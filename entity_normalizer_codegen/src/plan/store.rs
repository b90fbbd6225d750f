//! `InMemoryEntityStore`: by-id maps behind `RefCell`, implementing both store traits.

use quote::{format_ident, quote};
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

pub struct StorePlanner;

impl Planner for StorePlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Store
    }

    fn plan(&self, ctx: &PlanContext<'_>) -> Result<Vec<TypePlan>, PlanError> {
        ctx.check_accessors(self.kind())?;

        let runtime = ctx.runtime();
        let (rc, ref_cell, hash_map) = (paths::rc(), paths::ref_cell(), paths::hash_map());

        let fields = ctx
            .entities
            .iter()
            .map(|entity| {
                let path = entity.qualified.from_store();
                let id_ty = entity.qualified.id_type(runtime);
                FieldPlan {
                    attrs: Vec::new(),
                    name: naming::by_id_field(entity.name()),
                    ty: quote!(#ref_cell<#hash_map<#id_ty, #rc<#path>>>),
                }
            })
            .collect();
        let getters = ctx.entities.iter().map(|e| plan_store_get(runtime, e)).collect();
        let putters = ctx.entities.iter().map(|e| plan_store_put(runtime, e)).collect();

        let constructor = FnPlan::builder()
            .public(true)
            .name(format_ident!("new"))
            .receiver(Receiver::None)
            .ret(quote!(Self))
            .body(vec![Stmt::ret(Expr::invoke(quote!(::std::default::Default::default), Vec::new()))].into())
            .build();

        let reader = naming::store_reader_trait();
        let writer = naming::store_writer_trait();
        Ok(vec![TypePlan {
            kind: self.kind(),
            placement: Placement::Store,
            name: naming::in_memory_store(),
            vis: quote!(pub),
            attrs: vec![
                doc(" Single-owner store keeping one `Rc` per entity id."),
                doc(""),
                doc(" Writes always succeed and replace any entity stored under the same id."),
                quote!(#[derive(Debug, Default)]),
            ],
            shape: Shape::Struct(fields),
            inherent: vec![constructor],
            impls: vec![ImplPlan::new(quote!(#reader), getters), ImplPlan::new(quote!(#writer), putters)],
        }])
    }
}

/// `fn get_<e>(&self, id: &Id) -> Option<Rc<E>>` reading the by-id map
pub fn plan_store_get(runtime: &Path, entity: &ResolvedEntity) -> FnPlan {
    let (rc, option) = (paths::rc(), paths::option());
    let path = entity.qualified.from_store();
    let id_ty = entity.qualified.id_type(runtime);
    let id = format_ident!("id");

    let lookup = Expr::lit(quote!(self))
        .field(naming::by_id_field(entity.name()))
        .call(format_ident!("borrow"), Vec::new())
        .call(format_ident!("get"), vec![Expr::name(&id)])
        .call(format_ident!("cloned"), Vec::new());

    FnPlan::builder()
        .name(naming::get_method(entity.name()))
        .params(vec![(id, quote!(&#id_ty))])
        .ret(quote!(#option<#rc<#path>>))
        .body(vec![Stmt::ret(lookup)].into())
        .build()
}

/// `fn put_<e>(&self, entity: Rc<E>) -> bool` replacing the by-id entry
pub fn plan_store_put(runtime: &Path, entity: &ResolvedEntity) -> FnPlan {
    let rc = paths::rc();
    let path = entity.qualified.from_store();
    let id = format_ident!("id");
    let entity_var = format_ident!("entity");

    let key = Expr::invoke(
        quote!(#runtime::Entity::id),
        vec![Expr::lit(quote!(*#entity_var)).by_ref()],
    );
    let insert = Expr::lit(quote!(self))
        .field(naming::by_id_field(entity.name()))
        .call(format_ident!("borrow_mut"), Vec::new())
        .call(format_ident!("insert"), vec![Expr::name(&id), Expr::name(&entity_var)]);

    FnPlan::builder()
        .name(naming::put_method(entity.name()))
        .params(vec![(entity_var, quote!(#rc<#path>))])
        .ret(quote!(bool))
        .body(
            vec![
                Stmt::decl(id, key),
                Stmt::expr(insert),
                Stmt::ret(Expr::lit(quote!(true))),
            ]
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

    #[test]
    fn test_store_layout() {
        let resolution = messaging();
        let config = config();
        let ctx = PlanContext::new(&resolution.entities, &resolution.table, &config);
        let plans = StorePlanner.plan(&ctx).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].placement, Placement::Store);

        let text = render(Emitter::new().lower(&plans[0]));
        assert!(text.contains("#[derive(Debug, Default)]\npub struct InMemoryEntityStore {"));
        assert!(text.contains("user_by_id: ::std::cell::RefCell<"));
        assert!(text.contains("device_by_id: ::std::cell::RefCell<"));
        assert!(text.contains("impl EntityStoreReader for InMemoryEntityStore {"));
        assert!(text.contains("self.message_by_id.borrow().get(id).cloned()"));
        assert!(text.contains("impl EntityStoreWriter for InMemoryEntityStore {"));
        assert!(text.contains("let id = ::entity_normalizer::Entity::id(&*entity);"));
        assert!(text.contains("self.user_by_id.borrow_mut().insert(id, entity);\n        true"));
        assert!(text.contains("pub fn new() -> Self {\n        ::std::default::Default::default()\n    }"));
    }
}
