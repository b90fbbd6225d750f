//! Code generation engine behind `entity_normalizer`.
//!
//! A round runs over the items of one root module:
//!
//! 1. [`parse`]: collect `#[entity_spec]` structs from the module tree
//! 2. [`resolve`]: build the entity type table and resolve every field type
//! 3. [`plan`]: one planner per generated kind turns the round into type plans
//! 4. [`emit`]: lower plans to tokens and hand them to a [`Sink`]
//!
//! [`driver::Driver`] runs the phases; [`expand_module`] is the attribute
//! macro front end and [`generate_file`] writes the same output to a
//! directory, for build scripts.

pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod expand;
pub mod ir;
pub mod parse;
pub mod plan;
pub mod resolve;
pub mod utils;

use std::{
    fs,
    path::{Path, PathBuf},
};

pub use config::CodegenConfig;
pub use driver::{Driver, RoundReport};
pub use emit::{DirectorySink, Sink, TokenSink};
pub use error::{CodegenError, CodegenResult, Diagnostic};
pub use expand::expand_module;

/// Files written by [`generate_file`], and the problems found on the way
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    /// The written files, or every diagnostic if there was any.
    pub fn into_result(self) -> CodegenResult<Vec<PathBuf>> {
        if self.diagnostics.is_empty() {
            Ok(self.written)
        } else {
            Err(CodegenError::Diagnostics(self.diagnostics))
        }
    }
}

/// Treat the Rust source at `input` as a root module and write one file per
/// generated type under `out_dir`.
///
/// Entities land under their module path (`out_dir/user/user.rs`), the store
/// side under the store module (`out_dir/store/in_memory_entity_store.rs`).
///
/// ```no_run
/// use entity_normalizer_codegen::{CodegenConfig, generate_file};
///
/// let out_dir = std::env::var("OUT_DIR").unwrap();
/// let report = generate_file("src/model.rs".as_ref(), out_dir.as_ref(), &CodegenConfig::default())?;
/// let written = report.into_result()?;
/// assert!(!written.is_empty());
/// # Ok::<(), entity_normalizer_codegen::CodegenError>(())
/// ```
pub fn generate_file(input: &Path, out_dir: &Path, config: &CodegenConfig) -> CodegenResult<GenerationReport> {
    let source = fs::read_to_string(input).map_err(|source| CodegenError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let file = syn::parse_file(&source).map_err(|source| CodegenError::Parse {
        path: input.to_path_buf(),
        source,
    })?;

    let mut sink = DirectorySink::new(out_dir, config);
    let report = Driver::new(config).run(&file.items, &mut sink);
    log::debug!(
        "generated {} file(s) from {} into {}",
        report.units,
        input.display(),
        out_dir.display()
    );
    Ok(GenerationReport {
        written: sink.into_written(),
        diagnostics: report.diagnostics,
    })
}
