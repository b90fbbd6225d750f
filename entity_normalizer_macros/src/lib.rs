use proc_macro::TokenStream;
use syn::{ItemMod, parse_macro_input};

use entity_normalizer_codegen::{CodegenConfig, expand_module};

/// Generates normalized entities and their repository from spec structs.
///
/// Applied to an inline module (the root module). Every struct marked
/// `#[entity_spec]` anywhere in the root module or its inline child modules
/// is replaced by a generated entity type, and a child module (`store` by
/// default) is appended holding:
///
/// - `EntityStoreReader` / `EntityStoreWriter` and `InMemoryEntityStore`
/// - `NormalizedEntityRepositoryReader` / `NormalizedEntityRepositoryWriter`
/// - `NormalizedEntityRepository` and its builder
/// - `EntityRef`, the element type of the dirty set returned by `put_*`
///
/// # Attributes
///
/// - `#[entity_spec(name = "...")]` - **Required** on a spec. `name` is the
///   logical entity name; the generated type is its upper-camel form unless
///   `class_name = "..."` overrides it
/// - `#[entity_id]` - **Required** on exactly one field
///
/// Other derives on a spec (`Eq`, `Hash`, ...) are carried to the entity on top
/// of `Debug`, `Clone` and `PartialEq`.
///
/// # Arguments
///
/// - `store = "name"` - name of the generated store module
/// - `runtime = "path"` - path to the `entity_normalizer` runtime crate
///
/// # Example
///
/// ```ignore
/// #[entity_normalizer::entity_module]
/// pub mod model {
///     pub mod user {
///         #[entity_spec(name = "user")]
///         pub struct UserSpec {
///             #[entity_id]
///             id: i64,
///             name: String,
///         }
///     }
///
///     pub mod message {
///         use super::user::User;
///
///         #[entity_spec(name = "message")]
///         pub struct MessageSpec {
///             #[entity_id]
///             id: i64,
///             sender: User,
///             recipients: Vec<User>,
///         }
///     }
/// }
/// // Generates: model::user::User, model::message::Message
/// // Generates: model::store::{NormalizedEntityRepository, ...}
/// ```
///
/// Invalid specs are dropped and reported as compile errors at the spec; the
/// remaining specs are still generated.
#[proc_macro_attribute]
pub fn entity_module(args: TokenStream, input: TokenStream) -> TokenStream {
    let config = match CodegenConfig::from_attribute_args(args.into()) {
        Ok(config) => config,
        Err(error) => return error.to_compile_error().into(),
    };
    let module = parse_macro_input!(input as ItemMod);
    expand_module(&config, module).into()
}
