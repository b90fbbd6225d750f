//! Attribute-macro expansion: splice generated code back into the module.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Block, Item, ItemMod, parse_quote, visit_mut::VisitMut};

use crate::{
    config::CodegenConfig,
    driver::Driver,
    emit::TokenSink,
    parse::{ModulePath, attributes::has_entity_spec},
};

/// Expand `#[entity_module]` on `module`.
///
/// Every spec struct is replaced by its generated entity, or removed when it
/// was rejected. The store module is appended to the root module and every
/// diagnostic becomes a spanned `compile_error!` next to it.
pub fn expand_module(config: &CodegenConfig, mut module: ItemMod) -> TokenStream {
    let name = module.ident.clone();
    let Some((_, items)) = module.content.as_mut() else {
        return syn::Error::new_spanned(&module, "#[entity_module] needs an inline module body")
            .to_compile_error();
    };

    let mut sink = TokenSink::new();
    let report = Driver::new(config).run(items, &mut sink);
    log::debug!(
        "`{name}`: {} entit(ies), {} unit(s), {} diagnostic(s)",
        report.entities,
        report.units,
        report.diagnostics.len()
    );

    Splicer::new(&mut sink).splice(items);
    let store_items = sink.take_store();
    if !store_items.is_empty() {
        let store = &config.store_module;
        items.push(parse_quote! {
            pub mod #store {
                #(#store_items)*
            }
        });
    }

    let errors = report.diagnostics.iter().map(|d| d.to_compile_error());
    quote! {
        #module
        #(#errors)*
    }
}

/// Replaces spec declarations with the entities buffered in a [`TokenSink`].
struct Splicer<'a> {
    path: ModulePath,
    sink: &'a mut TokenSink,
}

impl<'a> Splicer<'a> {
    fn new(sink: &'a mut TokenSink) -> Self {
        Self {
            path: ModulePath::root(),
            sink,
        }
    }

    fn splice(&mut self, items: &mut Vec<Item>) {
        for mut item in std::mem::take(items) {
            match &item {
                Item::Struct(spec) if has_entity_spec(&spec.attrs) => {
                    if let Some(entity) = self.sink.take_entity(&self.path, &spec.ident) {
                        items.push(Item::Verbatim(entity));
                    }
                }
                Item::Enum(spec) if has_entity_spec(&spec.attrs) => {}
                _ => {
                    self.visit_item_mut(&mut item);
                    items.push(item);
                }
            }
        }
    }
}

impl VisitMut for Splicer<'_> {
    fn visit_item_mod_mut(&mut self, module: &mut ItemMod) {
        let Some((_, items)) = module.content.as_mut() else {
            return;
        };
        let child = self.path.child(&module.ident);
        let parent = std::mem::replace(&mut self.path, child);
        self.splice(items);
        self.path = parent;
    }

    fn visit_block_mut(&mut self, _: &mut Block) {}
}
