//! One generation round: intake, resolution, planning and emission.

use proc_macro2::Ident;
use strum::IntoEnumIterator;
use syn::Item;

use crate::{
    config::CodegenConfig,
    emit::{Emitter, Sink},
    error::{Diagnostic, DiagnosticCollector, PlanError},
    parse::collect_specs,
    plan::{PlanContext, Placement, PlannerKind},
    resolve::{Resolution, resolve_round},
};

/// Outcome of one round
#[derive(Debug, Default)]
pub struct RoundReport {
    /// Entities that passed intake and resolution
    pub entities: usize,
    /// Units accepted by the sink
    pub units: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl RoundReport {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Runs every planner over the specs of one root module.
///
/// Invalid specs, planner failures and sink failures are recorded as
/// diagnostics; the round always runs to completion so that every problem is
/// reported at once.
#[derive(Debug, Clone, Copy)]
pub struct Driver<'a> {
    config: &'a CodegenConfig,
    emitter: Emitter,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self {
            config,
            emitter: Emitter::new(),
        }
    }

    /// `items` are the root module's items.
    pub fn run(&self, items: &[Item], sink: &mut dyn Sink) -> RoundReport {
        let mut diagnostics = DiagnosticCollector::new();

        let intake = collect_specs(items);
        for error in &intake.errors {
            diagnostics.add_spec(error);
        }
        let resolution = resolve_round(intake.specs);
        for error in &resolution.errors {
            diagnostics.add_spec(error);
        }

        let collision = self.store_module_collision(items);
        if let Some(error) = &collision {
            diagnostics.add_plan(error);
        }

        let ctx = PlanContext::new(&resolution.entities, &resolution.table, self.config);
        let mut units = 0;
        for kind in PlannerKind::iter() {
            if kind.targets_store() && (resolution.entities.is_empty() || collision.is_some()) {
                log::debug!("skipping planner {kind}");
                continue;
            }
            let plans = match kind.planner().plan(&ctx) {
                Ok(plans) => plans,
                Err(error) => {
                    diagnostics.add_plan(&error);
                    continue;
                }
            };
            log::debug!("planner {kind} produced {} type(s)", plans.len());

            for plan in &plans {
                match sink.accept(self.emitter.emit(plan)) {
                    Ok(()) => units += 1,
                    Err(error) => {
                        let spec_name = spec_name_of(&resolution, &plan.placement);
                        diagnostics.add(Diagnostic::from_emit(&error, spec_name));
                    }
                }
            }
        }

        RoundReport {
            entities: resolution.entities.len(),
            units,
            diagnostics: diagnostics.into_vec(),
        }
    }

    fn store_module_collision(&self, items: &[Item]) -> Option<PlanError> {
        let store = &self.config.store_module;
        let existing = items.iter().filter_map(declared_ident).find(|ident| *ident == store)?;
        Some(PlanError::StoreModuleCollision {
            planner: PlannerKind::Store,
            name: store.to_string(),
            span: existing.span(),
        })
    }
}

fn declared_ident(item: &Item) -> Option<&Ident> {
    match item {
        Item::Const(item) => Some(&item.ident),
        Item::Enum(item) => Some(&item.ident),
        Item::Fn(item) => Some(&item.sig.ident),
        Item::Mod(item) => Some(&item.ident),
        Item::Static(item) => Some(&item.ident),
        Item::Struct(item) => Some(&item.ident),
        Item::Trait(item) => Some(&item.ident),
        Item::Type(item) => Some(&item.ident),
        Item::Union(item) => Some(&item.ident),
        _ => None,
    }
}

fn spec_name_of(resolution: &Resolution, placement: &Placement) -> Option<String> {
    let Placement::Entity { module, spec } = placement else {
        return None;
    };
    resolution
        .entities
        .iter()
        .find(|entity| entity.spec.module == *module && entity.spec.spec_ident == *spec)
        .map(|entity| entity.spec.spec_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        emit::{EmittedUnit, TokenSink},
        error::{DiagnosticKind, EmitError},
    };
    use syn::{File, parse_quote};

    fn run(file: File) -> (RoundReport, TokenSink) {
        let config = CodegenConfig::default();
        let mut sink = TokenSink::new();
        let report = Driver::new(&config).run(&file.items, &mut sink);
        (report, sink)
    }

    #[test]
    fn test_full_round() {
        let (report, mut sink) = run(parse_quote! {
            pub mod user {
                #[entity_spec(name = "user")]
                pub struct UserSpec { #[entity_id] id: i64, name: String }
            }
            #[entity_spec(name = "post")]
            pub struct PostSpec { #[entity_id] id: i64, author: User }
        });
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
        assert_eq!(report.entities, 2);
        // two entities, store, repository + builder, two store traits, EntityRef + two repository traits
        assert_eq!(report.units, 10);
        assert_eq!(sink.entity_count(), 2);
        assert_eq!(sink.take_store().len(), 8);
    }

    #[test]
    fn test_invalid_specs_do_not_stop_the_round() {
        let (report, mut sink) = run(parse_quote! {
            #[entity_spec(name = "user")]
            pub struct UserSpec { #[entity_id] id: i64 }
            #[entity_spec(name = "broken")]
            pub struct BrokenSpec { name: String }
            #[entity_spec(name = "twice")]
            pub struct TwiceSpec { #[entity_id] a: i64, #[entity_id] b: i64 }
        });
        let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::MissingId, DiagnosticKind::MultipleIds]);
        assert_eq!(report.entities, 1);
        assert_eq!(sink.entity_count(), 1);
        assert!(!sink.take_store().is_empty());
    }

    #[test]
    fn test_no_entities_no_store() {
        let (report, mut sink) = run(parse_quote! {
            pub struct Plain { id: i64 }
        });
        assert!(!report.has_errors());
        assert_eq!(report.units, 0);
        assert!(sink.take_store().is_empty());
    }

    #[test]
    fn test_store_module_collision() {
        let (report, mut sink) = run(parse_quote! {
            #[entity_spec(name = "user")]
            pub struct UserSpec { #[entity_id] id: i64 }
            pub mod store {}
        });
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Plan);
        assert!(report.diagnostics[0].message.contains("`store`"));
        assert_eq!(sink.entity_count(), 1);
        assert!(sink.take_store().is_empty());
    }

    #[test]
    fn test_accessor_collision_reported_once() {
        let (report, _) = run(parse_quote! {
            #[entity_spec(name = "httpServer")]
            pub struct A { #[entity_id] id: u8 }
            #[entity_spec(name = "HTTPServer")]
            pub struct B { #[entity_id] id: u8 }
        });
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].message.contains("get_http_server"));
        assert_eq!(report.units, 2);
    }

    struct FailingSink;

    impl Sink for FailingSink {
        fn accept(&mut self, unit: EmittedUnit) -> Result<(), EmitError> {
            Err(EmitError::Io {
                path: format!("{}.rs", unit.name).into(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    #[test]
    fn test_sink_failures_become_diagnostics() {
        let config = CodegenConfig::default();
        let file: File = parse_quote! {
            #[entity_spec(name = "user")]
            pub struct UserSpec { #[entity_id] id: i64 }
        };
        let report = Driver::new(&config).run(&file.items, &mut FailingSink);
        assert_eq!(report.units, 0);
        assert!(report.diagnostics.iter().all(|d| d.kind == DiagnosticKind::Emit));
        assert_eq!(report.diagnostics[0].spec_name.as_deref(), Some("user"));
        assert!(report.diagnostics[0].message.contains("disk full"));
    }
}
