//! `get_<entity>`: read with staleness detection.
//!
//! The cached entity comes from the first reader that has it. Each property is
//! then reconstructed in declaration order:
//!
//! - direct entity property: re-fetched through the repository's own
//!   `get_<target>`, so its own references are refreshed as well
//! - container holding entities: copied into a fresh container of the same
//!   kind, each entity element re-fetched from the readers
//! - anything else: cloned from the cached entity
//!
//! `runtime::reconcile` keeps the cached element unless the stored one differs,
//! raising `dirty` when it does. Nothing dirty means the cached `Rc` is
//! returned as is.

use proc_macro2::Ident;
use quote::{format_ident, quote};
use syn::Path;

use crate::{
    ir::{Binding, Block, Cond, Expr, Stmt},
    plan::{FnPlan, PlanContext, paths},
    resolve::{ResolvedEntity, ResolvedType},
    utils::naming,
};

pub fn plan_get(ctx: &PlanContext<'_>, entity: &ResolvedEntity) -> FnPlan {
    let id = format_ident!("id");
    let rc = paths::rc();
    let option = paths::option();
    let path = entity.qualified.from_store();
    let read = Expr::lit(quote!(self)).call(naming::read_helper(entity.name()), vec![Expr::name(&id)]);

    let holds_entities = entity.properties.iter().any(|p| p.resolved.holds_entities());
    let body = if holds_entities {
        Reconstruction::new(ctx.runtime()).body(entity, read)
    } else {
        vec![Stmt::ret(read)].into()
    };

    let id_ty = entity.qualified.id_type(ctx.runtime());
    FnPlan::builder()
        .name(naming::get_method(entity.name()))
        .params(vec![(id, quote!(&#id_ty))])
        .ret(quote!(#option<#rc<#path>>))
        .body(body)
        .build()
}

struct Reconstruction<'a> {
    runtime: &'a Path,
    cached: Ident,
    dirty: Ident,
    loops: usize,
    copies: usize,
}

impl<'a> Reconstruction<'a> {
    fn new(runtime: &'a Path) -> Self {
        Self {
            runtime,
            cached: format_ident!("cached"),
            dirty: format_ident!("dirty"),
            loops: 0,
            copies: 0,
        }
    }

    fn body(mut self, entity: &ResolvedEntity, read: Expr) -> Block {
        let mut body = Block::new();
        body.push(Stmt::decl(self.cached.clone(), read.try_()));
        body.push(Stmt::decl_mut(self.dirty.clone(), Expr::lit(quote!(false))));

        let mut args = Vec::with_capacity(entity.properties.len());
        for property in &entity.properties {
            let accessor = Expr::name(&self.cached).call(naming::getter_name(&property.name), Vec::new());
            let arg = match &property.resolved {
                ResolvedType::Entity(target) => {
                    let latest = naming::property_latest(&property.name);
                    let fetch = Expr::lit(quote!(self))
                        .call(naming::get_method(&target.name), vec![self.id_of(accessor.clone())]);
                    body.push(Stmt::decl(latest.clone(), self.reconcile(accessor, fetch)));
                    Expr::name(&latest)
                }
                container if container.holds_entities() => {
                    let copy = naming::property_copy(&property.name);
                    self.rebuild_container(container, accessor, &copy, &mut body);
                    Expr::name(&copy)
                }
                _ => Expr::invoke(paths::clone(), vec![accessor]),
            };
            args.push(arg);
        }

        let some = paths::some();
        let rc = paths::rc();
        let path = entity.qualified.from_store();
        body.push(Stmt::If {
            cond: Cond::Expr(Expr::name(&self.dirty).not()),
            then: vec![Stmt::ret(Expr::invoke(some.clone(), vec![Expr::name(&self.cached)]))].into(),
            otherwise: None,
        });
        body.push(Stmt::ret(Expr::invoke(
            some,
            vec![Expr::invoke(
                quote!(#rc::new),
                vec![Expr::invoke(quote!(#path::new), args)],
            )],
        )));
        body
    }

    /// `&runtime::Entity::id(source)`
    fn id_of(&self, source: Expr) -> Expr {
        let runtime = self.runtime;
        Expr::invoke(quote!(#runtime::Entity::id), vec![source]).by_ref()
    }

    /// `runtime::reconcile(cached, latest, &mut dirty)`
    fn reconcile(&self, cached: Expr, latest: Expr) -> Expr {
        let runtime = self.runtime;
        Expr::invoke(
            quote!(#runtime::reconcile),
            vec![cached, latest, Expr::name(&self.dirty).by_mut()],
        )
    }

    /// Owned reconstruction of the value `source` refers to, pushing any
    /// statements it needs into `out`.
    fn rebuild_value(&mut self, ty: &ResolvedType, source: Expr, out: &mut Block) -> Expr {
        match ty {
            ResolvedType::Entity(target) => {
                let fetch = Expr::lit(quote!(self))
                    .call(naming::read_helper(&target.name), vec![self.id_of(source.clone())]);
                self.reconcile(source, fetch)
            }
            container if container.holds_entities() => {
                let copy = naming::nested_copy(self.copies);
                self.copies += 1;
                self.rebuild_container(container, source, &copy, out);
                Expr::name(&copy)
            }
            _ => Expr::invoke(paths::clone(), vec![source]),
        }
    }

    /// `let mut copy = Container::new(); for .. in source.iter() { copy.insert(..) }`
    fn rebuild_container(&mut self, ty: &ResolvedType, source: Expr, copy: &Ident, out: &mut Block) {
        let (container, binding, elements) = match ty {
            ResolvedType::List { container, elem } => {
                let item = naming::item_var(self.next_depth());
                (*container, Binding::Name(item.clone()), vec![(elem.as_ref(), item)])
            }
            ResolvedType::Map {
                container,
                key,
                value,
            } => {
                let depth = self.next_depth();
                let (key_var, value_var) = (naming::key_var(depth), naming::value_var(depth));
                (
                    *container,
                    Binding::Pair(key_var.clone(), value_var.clone()),
                    vec![(key.as_ref(), key_var), (value.as_ref(), value_var)],
                )
            }
            _ => return,
        };

        let qualified = container.qualified_path();
        out.push(Stmt::decl_mut(copy.clone(), Expr::invoke(quote!(#qualified::new), Vec::new())));

        let mut body = Block::new();
        let values = elements
            .into_iter()
            .map(|(elem, var)| self.rebuild_value(elem, Expr::name(&var), &mut body))
            .collect();
        body.push(Stmt::expr(Expr::name(copy).call(container.insert_method(), values)));
        out.push(Stmt::for_each(
            binding,
            source.call(format_ident!("iter"), Vec::new()),
            body,
        ));
    }

    fn next_depth(&mut self) -> usize {
        let depth = self.loops;
        self.loops += 1;
        depth
    }
}
