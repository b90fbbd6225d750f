use heck::ToSnakeCase;
use proc_macro2::Ident;
use quote::format_ident;

/// Utilities for generating consistent names for entities, accessors and locals

/// Effective generated type name: `class_name` when non-empty, else `spec_name`,
/// with the first character upper-cased (e.g. "user" -> "User").
pub fn effective_type_name(spec_name: &str, class_name: Option<&str>) -> String {
    let base = match class_name {
        Some(name) if !name.is_empty() => name,
        _ => spec_name,
    };
    upper_first(base)
}

/// Upper-case the first character only, leaving the rest untouched.
pub fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Snake-case stem shared by every per-entity accessor (e.g. DeviceType -> device_type)
pub fn entity_stem(entity: &Ident) -> String {
    entity.to_string().to_snake_case()
}

/// Per-entity getter on stores and repositories (e.g. User -> get_user)
pub fn get_method(entity: &Ident) -> Ident {
    format_ident!("get_{}", entity_stem(entity))
}

/// Per-entity putter on stores and repositories (e.g. User -> put_user)
pub fn put_method(entity: &Ident) -> Ident {
    format_ident!("put_{}", entity_stem(entity))
}

/// Reader probe on the repository (e.g. User -> read_user)
pub fn read_helper(entity: &Ident) -> Ident {
    format_ident!("read_{}", entity_stem(entity))
}

/// Writer broadcast on the repository (e.g. User -> write_user)
pub fn write_helper(entity: &Ident) -> Ident {
    format_ident!("write_{}", entity_stem(entity))
}

/// By-id storage field in the in-memory store (e.g. User -> user_by_id)
pub fn by_id_field(entity: &Ident) -> Ident {
    format_ident!("{}_by_id", entity_stem(entity))
}

/// Getter on a generated entity. Named after the field itself.
pub fn getter_name(field: &Ident) -> Ident {
    field.clone()
}

/// File stem for one emitted unit (e.g. NormalizedEntityRepository -> normalized_entity_repository)
pub fn unit_file_stem(name: &Ident) -> String {
    name.to_string().trim_start_matches("r#").to_snake_case()
}

/// Store-side type names, fixed for every generated store module
pub fn entity_ref_enum() -> Ident {
    format_ident!("EntityRef")
}

pub fn in_memory_store() -> Ident {
    format_ident!("InMemoryEntityStore")
}

pub fn repository() -> Ident {
    format_ident!("NormalizedEntityRepository")
}

pub fn repository_builder() -> Ident {
    format_ident!("NormalizedEntityRepositoryBuilder")
}

pub fn store_reader_trait() -> Ident {
    format_ident!("EntityStoreReader")
}

pub fn store_writer_trait() -> Ident {
    format_ident!("EntityStoreWriter")
}

pub fn repository_reader_trait() -> Ident {
    format_ident!("NormalizedEntityRepositoryReader")
}

pub fn repository_writer_trait() -> Ident {
    format_ident!("NormalizedEntityRepositoryWriter")
}

/// Loop variable over list elements at a given depth
pub fn item_var(depth: usize) -> Ident {
    format_ident!("item{}", depth)
}

/// Loop variable over map keys at a given depth
pub fn key_var(depth: usize) -> Ident {
    format_ident!("key{}", depth)
}

/// Loop variable over map values at a given depth
pub fn value_var(depth: usize) -> Ident {
    format_ident!("value{}", depth)
}

/// Rebuilt copy of a top-level container property
pub fn property_copy(property: &Ident) -> Ident {
    format_ident!("{}_copy", property)
}

/// Rebuilt copy of a nested container at a given depth
pub fn nested_copy(depth: usize) -> Ident {
    format_ident!("copy{}", depth)
}

/// Re-fetched value of a direct entity property
pub fn property_latest(property: &Ident) -> Ident {
    format_ident!("{}_latest", property)
}
