//! # entity_normalizer
//!
//! Normalized, in-memory entity repositories generated at build time.
//!
//! Entity *specs* are plain structs marked with `#[entity_spec]` inside a module
//! annotated with [`entity_module`]. For every spec the macro generates an
//! entity type, and for the module as a whole it generates a `store` child module
//! holding a repository that keeps exactly one canonical copy of each entity:
//!
//! - `put_<entity>` writes the entity and, transitively, every entity it holds
//!   (directly, or inside nested `Vec`/`VecDeque`/`LinkedList`/`HashMap`/`BTreeMap`
//!   containers) and returns the set of everything written;
//! - `get_<entity>` returns the cached entity, or a rebuilt copy when one of the
//!   entities it references has been overwritten since.
//!
//! ```
//! #[entity_normalizer::entity_module]
//! pub mod model {
//!     pub mod user {
//!         #[entity_spec(name = "user")]
//!         #[derive(Eq, Hash)]
//!         pub struct UserSpec {
//!             #[entity_id]
//!             user_id: i64,
//!             name: String,
//!         }
//!     }
//!
//!     pub mod post {
//!         use super::user::User;
//!
//!         #[entity_spec(name = "post")]
//!         pub struct PostSpec {
//!             #[entity_id]
//!             post_id: u32,
//!             author: User,
//!             likes: Vec<User>,
//!         }
//!     }
//! }
//!
//! use model::post::Post;
//! use model::store::{
//!     NormalizedEntityRepository, NormalizedEntityRepositoryReader,
//!     NormalizedEntityRepositoryWriter,
//! };
//! use model::user::User;
//!
//! let mut repository = NormalizedEntityRepository::default();
//! let alice = User::new(1, "Alice".to_string());
//! let dirty = repository.put_post(Post::new(7, alice.clone(), vec![alice.clone()]));
//! assert_eq!(dirty.len(), 2);
//!
//! repository.put_user(User::new(1, "Alice Liddell".to_string()));
//! let post = repository.get_post(&7).unwrap();
//! assert_eq!(post.author().name(), "Alice Liddell");
//! ```

extern crate self as entity_normalizer;

use std::{fmt::Debug, hash::Hash, rc::Rc};

pub use entity_normalizer_macros::entity_module;

/// Identity contract implemented by every generated entity.
///
/// `ENTITY_TYPE` is the fully qualified name of the generated type; together with
/// [`Entity::id`] it identifies one canonical slot in a repository.
pub trait Entity: Clone + PartialEq + Debug + 'static {
    /// Identifier type, taken from the field marked `#[entity_id]`.
    type Id: Clone + Eq + Hash + Debug;

    const ENTITY_TYPE: &'static str;

    /// Owned copy of the identifier.
    fn id(&self) -> Self::Id;

    fn entity_type(&self) -> &'static str {
        Self::ENTITY_TYPE
    }
}

/// Pick the value a rebuilt entity should hold for one referenced entity.
///
/// When the store holds a version that differs from `cached`, the stored version
/// wins and `dirty` is raised. A missing stored version keeps `cached`.
pub fn reconcile<E: Entity>(cached: &E, latest: Option<Rc<E>>, dirty: &mut bool) -> E {
    match latest {
        Some(latest) if *latest != *cached => {
            log::trace!("{} {:?} is stale, using stored version", E::ENTITY_TYPE, cached.id());
            *dirty = true;
            E::clone(&latest)
        }
        _ => cached.clone(),
    }
}
