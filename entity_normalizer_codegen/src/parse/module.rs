//! Module traversal for spec intake.

use syn::{Block, Item, ItemEnum, ItemMod, ItemStruct, spanned::Spanned, visit::Visit};

use crate::{
    error::SpecError,
    parse::{
        attributes::has_entity_spec,
        spec::{EntitySpec, ModulePath},
    },
};

/// Specs and errors collected from one root module
#[derive(Debug, Default)]
pub struct Intake {
    pub specs: Vec<EntitySpec>,
    pub errors: Vec<SpecError>,
}

/// Collect every spec declared in `items` or in inline modules nested below them.
pub fn collect_specs(items: &[Item]) -> Intake {
    let mut collector = SpecCollector::default();
    for item in items {
        collector.visit_item(item);
    }
    log::debug!(
        "intake found {} spec(s), {} rejected",
        collector.intake.specs.len(),
        collector.intake.errors.len()
    );
    collector.intake
}

/// Visitor that walks inline modules and records spec structs with their module path.
///
/// Function bodies and other blocks are not entered: items declared there are
/// unreachable by path from the store module.
#[derive(Debug, Default)]
pub struct SpecCollector {
    path: ModulePath,
    intake: Intake,
}

impl<'ast> Visit<'ast> for SpecCollector {
    fn visit_item_mod(&mut self, module: &'ast ItemMod) {
        let Some((_, items)) = &module.content else {
            log::warn!(
                "skipping `mod {};` in `{}`: only inline modules are scanned for entity specs",
                module.ident,
                self.path
            );
            return;
        };
        let parent = std::mem::replace(&mut self.path, ModulePath::root());
        self.path = parent.child(&module.ident);
        for item in items {
            self.visit_item(item);
        }
        self.path = parent;
    }

    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        if !has_entity_spec(&item.attrs) {
            return;
        }
        match EntitySpec::from_item(item, &self.path) {
            Ok(spec) => {
                log::debug!(
                    "spec `{}` -> `{}` in `{}`",
                    spec.spec_name,
                    spec.generated_name,
                    spec.module
                );
                self.intake.specs.push(spec);
            }
            Err(error) => self.intake.errors.push(error),
        }
    }

    fn visit_item_enum(&mut self, item: &'ast ItemEnum) {
        if has_entity_spec(&item.attrs) {
            self.intake.errors.push(SpecError::invalid(
                item.ident.to_string(),
                item.span(),
                "#[entity_spec] must be placed on a struct with named fields",
            ));
        }
    }

    fn visit_block(&mut self, _block: &'ast Block) {}
}
