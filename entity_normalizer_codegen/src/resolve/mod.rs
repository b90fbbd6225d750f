//! Type resolution.
//!
//! Populates the [`EntityTypeTable`] for the round, then resolves every declared
//! property type against it. The table is passed around explicitly; nothing
//! outlives the round.

pub mod table;
pub mod types;

use proc_macro2::Ident;
use syn::{Attribute, Type};

pub use table::{EntityTypeTable, QualifiedEntity};
pub use types::{ContainerFamily, ContainerKind, ResolvedType, Resolver};

use crate::{error::SpecError, parse::EntitySpec};

/// A property with its resolved type; `declared` keeps the user's tokens for
/// signatures in the entity's own module.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: Ident,
    pub resolved: ResolvedType,
    pub declared: Type,
    pub attrs: Vec<Attribute>,
    pub is_id: bool,
}

/// Entity plan input: a spec with every property resolved
#[derive(Debug, Clone)]
pub struct ResolvedEntity {
    pub spec: EntitySpec,
    pub qualified: QualifiedEntity,
    pub properties: Vec<Property>,
}

impl ResolvedEntity {
    pub fn name(&self) -> &Ident {
        &self.qualified.name
    }

    pub fn id_property(&self) -> &Property {
        &self.properties[self.spec.id_index]
    }
}

/// Outcome of resolving one round of specs
#[derive(Debug, Default)]
pub struct Resolution {
    pub table: EntityTypeTable,
    pub entities: Vec<ResolvedEntity>,
    pub errors: Vec<SpecError>,
}

/// Build the table and resolve every accepted spec.
///
/// A spec is rejected when its generated name is already taken by an earlier
/// spec, or when its id type refers to an entity.
pub fn resolve_round(specs: Vec<EntitySpec>) -> Resolution {
    let mut candidates = EntityTypeTable::default();
    for spec in &specs {
        candidates
            .insert(QualifiedEntity::new(spec.module.clone(), spec.generated_name.clone()))
            .ok();
    }

    let mut resolution = Resolution::default();
    let mut accepted = Vec::with_capacity(specs.len());
    for spec in specs {
        let qualified = QualifiedEntity::new(spec.module.clone(), spec.generated_name.clone());
        let id = spec.id_field();
        if Resolver::new(&candidates).resolve(&id.ty).mentions_entity() {
            resolution.errors.push(SpecError::invalid(
                &spec.spec_name,
                spec.span,
                format!("id field `{}` must not refer to an entity type", id.name),
            ));
            continue;
        }
        if let Err(existing) = resolution.table.insert(qualified.clone()) {
            resolution.errors.push(SpecError::invalid(
                &spec.spec_name,
                spec.span,
                format!("generated name `{}` is already used by `{existing}`", qualified.name),
            ));
            continue;
        }
        accepted.push((spec, qualified));
    }

    let resolver = Resolver::new(&resolution.table);
    resolution.entities = accepted
        .into_iter()
        .map(|(spec, qualified)| {
            let properties = spec
                .fields
                .iter()
                .map(|field| Property {
                    name: field.name.clone(),
                    resolved: resolver.resolve(&field.ty),
                    declared: field.ty.clone(),
                    attrs: field.attrs.clone(),
                    is_id: field.is_id,
                })
                .collect::<Vec<_>>();
            log::debug!(
                "resolved `{qualified}`: {} propert(ies), {} holding entities",
                properties.len(),
                properties.iter().filter(|p| p.resolved.holds_entities()).count()
            );
            ResolvedEntity {
                spec,
                qualified,
                properties,
            }
        })
        .collect();
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::collect_specs;
    use syn::{ItemMod, parse_quote};

    fn resolve(module: ItemMod) -> Resolution {
        let (_, items) = module.content.unwrap();
        let intake = collect_specs(&items);
        assert!(intake.errors.is_empty(), "{:?}", intake.errors);
        resolve_round(intake.specs)
    }

    #[test]
    fn test_cross_module_references() {
        let resolution = resolve(parse_quote! {
            mod model {
                pub mod user {
                    #[entity_spec(name = "user")]
                    pub struct UserSpec { #[entity_id] user_id: i64, best_friend_id: Option<i64> }
                }
                pub mod message {
                    #[entity_spec(name = "message")]
                    pub struct MessageSpec { #[entity_id] message_id: i64, sender: User, recipients: Vec<User> }
                }
            }
        });
        assert!(resolution.errors.is_empty());
        assert_eq!(resolution.table.len(), 2);

        let message = &resolution.entities[1];
        assert_eq!(message.qualified.to_string(), "message::Message");
        assert_eq!(message.id_property().name, "message_id");
        match &message.properties[1].resolved {
            ResolvedType::Entity(entity) => assert_eq!(entity.to_string(), "user::User"),
            other => panic!("expected entity, got {other:?}"),
        }
        assert!(message.properties[2].resolved.holds_entities());
    }

    #[test]
    fn test_mutual_references_resolve() {
        let resolution = resolve(parse_quote! {
            mod model {
                #[entity_spec(name = "author")]
                struct AuthorSpec { #[entity_id] id: u32, books: Vec<Book> }

                #[entity_spec(name = "book")]
                struct BookSpec { #[entity_id] id: u32, authors: Vec<Author> }
            }
        });
        assert!(resolution.errors.is_empty());
        assert!(resolution.entities.iter().all(|e| e.properties[1].resolved.holds_entities()));
    }

    #[test]
    fn test_duplicate_generated_name() {
        let resolution = resolve(parse_quote! {
            mod model {
                #[entity_spec(name = "user")]
                struct UserSpec { #[entity_id] id: i64 }

                pub mod legacy {
                    #[entity_spec(name = "legacy_user", class_name = "user")]
                    pub struct LegacyUserSpec { #[entity_id] id: i64 }
                }
            }
        });
        assert_eq!(resolution.entities.len(), 1);
        assert_eq!(resolution.errors.len(), 1);
        assert_eq!(resolution.errors[0].spec_name(), "legacy_user");
        assert!(resolution.errors[0].to_string().contains("already used by `User`"));
    }

    #[test]
    fn test_entity_id_rejected() {
        let resolution = resolve(parse_quote! {
            mod model {
                #[entity_spec(name = "user")]
                struct UserSpec { #[entity_id] id: i64 }

                #[entity_spec(name = "profile")]
                struct ProfileSpec { #[entity_id] owner: Option<User> }
            }
        });
        assert_eq!(resolution.entities.len(), 1);
        assert!(!resolution.table.contains("Profile"));
        assert!(resolution.errors[0].to_string().contains("must not refer to an entity"));
    }
}
