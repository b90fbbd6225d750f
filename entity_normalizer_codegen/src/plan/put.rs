//! `put_<entity>`: write-through with transitive extraction.
//!
//! ```text
//! let entity = Rc::new(entity);
//! let mut dirty = HashSet::new();
//! dirty.insert(EntityRef::from(Rc::clone(&entity)));
//! self.write_message(Rc::clone(&entity));
//! dirty.extend(self.put_user(Clone::clone(entity.sender())));
//! for item0 in entity.recipients().iter() {
//!     dirty.extend(self.put_user(Clone::clone(item0)));
//! }
//! dirty
//! ```
//!
//! Every entity position re-enters `put_<target>`, so nested entities are
//! extracted transitively and their own dirty sets merged in.

use proc_macro2::Ident;
use quote::{format_ident, quote};

use crate::{
    ir::{Binding, Block, Expr, Stmt},
    plan::{FnPlan, Receiver, paths},
    resolve::{ResolvedEntity, ResolvedType},
    utils::naming,
};

pub fn plan_put(entity: &ResolvedEntity) -> FnPlan {
    let entity_var = format_ident!("entity");
    let dirty = format_ident!("dirty");
    let rc = paths::rc();
    let hash_set = paths::hash_set();
    let entity_ref = naming::entity_ref_enum();
    let path = entity.qualified.from_store();

    let rc_clone = || Expr::invoke(quote!(#rc::clone), vec![Expr::name(&entity_var).by_ref()]);

    let mut body = Block::new();
    body.push(Stmt::decl(
        entity_var.clone(),
        Expr::invoke(quote!(#rc::new), vec![Expr::name(&entity_var)]),
    ));
    body.push(Stmt::decl_mut(dirty.clone(), Expr::invoke(quote!(#hash_set::new), Vec::new())));
    body.push(Stmt::expr(Expr::name(&dirty).call(
        format_ident!("insert"),
        vec![Expr::invoke(quote!(#entity_ref::from), vec![rc_clone()])],
    )));
    body.push(Stmt::expr(
        Expr::lit(quote!(self)).call(naming::write_helper(entity.name()), vec![rc_clone()]),
    ));

    let mut walker = ExtractionWalker::new(dirty.clone());
    for property in entity.properties.iter().filter(|p| p.resolved.holds_entities()) {
        let source = Expr::name(&entity_var).call(naming::getter_name(&property.name), Vec::new());
        walker.walk(&property.resolved, source, &mut body);
    }
    body.push(Stmt::ret(Expr::name(&dirty)));

    FnPlan::builder()
        .name(naming::put_method(entity.name()))
        .receiver(Receiver::RefMut)
        .params(vec![(entity_var, path)])
        .ret(quote!(#hash_set<#entity_ref>))
        .body(body)
        .build()
}

/// Generates the loops reaching every entity position of a property.
///
/// Loop variables are numbered from a counter shared by the whole method, so
/// names stay unique even across sibling properties.
struct ExtractionWalker {
    dirty: Ident,
    loops: usize,
}

impl ExtractionWalker {
    fn new(dirty: Ident) -> Self {
        Self { dirty, loops: 0 }
    }

    fn next_depth(&mut self) -> usize {
        let depth = self.loops;
        self.loops += 1;
        depth
    }

    /// `source` evaluates to a reference to a value of type `ty`.
    fn walk(&mut self, ty: &ResolvedType, source: Expr, out: &mut Block) {
        match ty {
            ResolvedType::Entity(target) => {
                let put = Expr::lit(quote!(self)).call(
                    naming::put_method(&target.name),
                    vec![Expr::invoke(paths::clone(), vec![source])],
                );
                out.push(Stmt::expr(
                    Expr::name(&self.dirty).call(format_ident!("extend"), vec![put]),
                ));
            }
            ResolvedType::List { elem, .. } if elem.holds_entities() => {
                let item = naming::item_var(self.next_depth());
                let mut body = Block::new();
                self.walk(elem, Expr::name(&item), &mut body);
                out.push(Stmt::for_each(
                    Binding::Name(item),
                    source.call(format_ident!("iter"), Vec::new()),
                    body,
                ));
            }
            ResolvedType::Map { key, value, .. } if ty.holds_entities() => {
                let depth = self.next_depth();
                let (key_var, value_var) = (naming::key_var(depth), naming::value_var(depth));
                let mut body = Block::new();
                let (binding, iter) = match (key.holds_entities(), value.holds_entities()) {
                    (true, true) => {
                        self.walk(key, Expr::name(&key_var), &mut body);
                        self.walk(value, Expr::name(&value_var), &mut body);
                        (Binding::Pair(key_var, value_var), "iter")
                    }
                    (true, false) => {
                        self.walk(key, Expr::name(&key_var), &mut body);
                        (Binding::Name(key_var), "keys")
                    }
                    _ => {
                        self.walk(value, Expr::name(&value_var), &mut body);
                        (Binding::Name(value_var), "values")
                    }
                };
                out.push(Stmt::for_each(
                    binding,
                    source.call(format_ident!("{}", iter), Vec::new()),
                    body,
                ));
            }
            _ => {}
        }
    }
}
