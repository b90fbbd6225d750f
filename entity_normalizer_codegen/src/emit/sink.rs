//! Sinks receiving emitted units.
//!
//! - [`TokenSink`] buffers units so the attribute macro can splice them back
//!   into the annotated module
//! - [`DirectorySink`] writes one pretty-printed `.rs` file per unit, mirroring
//!   the module layout under a root directory

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use proc_macro2::{Ident, TokenStream};
use tempfile::NamedTempFile;

use crate::{
    config::CodegenConfig,
    error::EmitError,
    parse::ModulePath,
    plan::{Placement, PlannerKind},
    utils::naming,
};

const HEADER: &str = "// Generated by entity_normalizer. Do not edit.\n\n";

/// One generated type, ready for a sink
#[derive(Debug, Clone)]
pub struct EmittedUnit {
    pub kind: PlannerKind,
    pub placement: Placement,
    pub name: Ident,
    pub tokens: TokenStream,
}

pub trait Sink {
    fn accept(&mut self, unit: EmittedUnit) -> Result<(), EmitError>;
}

#[derive(Debug, Default)]
pub struct TokenSink {
    entities: HashMap<(ModulePath, Ident), TokenStream>,
    store: Vec<TokenStream>,
}

impl TokenSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generated entity replacing spec `spec` in `module`, if one was emitted.
    pub fn take_entity(&mut self, module: &ModulePath, spec: &Ident) -> Option<TokenStream> {
        self.entities.remove(&(module.clone(), spec.clone()))
    }

    pub fn take_store(&mut self) -> Vec<TokenStream> {
        std::mem::take(&mut self.store)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl Sink for TokenSink {
    fn accept(&mut self, unit: EmittedUnit) -> Result<(), EmitError> {
        match unit.placement {
            Placement::Entity { module, spec } => {
                self.entities.insert((module, spec), unit.tokens);
            }
            Placement::Store => self.store.push(unit.tokens),
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
    store_module: Ident,
    format: bool,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, config: &CodegenConfig) -> Self {
        Self {
            root: root.into(),
            store_module: config.store_module.clone(),
            format: config.format_output,
            written: Vec::new(),
        }
    }

    /// `<root>/<module dirs>/<unit>.rs`
    pub fn path_for(&self, unit: &EmittedUnit) -> PathBuf {
        let mut path = self.root.clone();
        match &unit.placement {
            Placement::Entity { module, .. } => {
                for segment in module.iter() {
                    path.push(naming::unit_file_stem(segment));
                }
            }
            Placement::Store => path.push(naming::unit_file_stem(&self.store_module)),
        }
        path.push(format!("{}.rs", naming::unit_file_stem(&unit.name)));
        path
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }

    fn render(&self, unit: &EmittedUnit, path: &Path) -> Result<String, EmitError> {
        if !self.format {
            return Ok(format!("{HEADER}{}\n", unit.tokens));
        }
        let file: syn::File = syn::parse2(unit.tokens.clone()).map_err(|source| EmitError::Render {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(format!("{HEADER}{}", prettyplease::unparse(&file)))
    }
}

impl Sink for DirectorySink {
    fn accept(&mut self, unit: EmittedUnit) -> Result<(), EmitError> {
        let path = self.path_for(&unit);
        let text = self.render(&unit, &path)?;
        write_atomically(&path, &text)?;
        log::debug!("wrote {} `{}` to {}", unit.kind, unit.name, path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Write through a temporary sibling so a failed write never leaves a partial file.
fn write_atomically(path: &Path, text: &str) -> Result<(), EmitError> {
    let io = |source: std::io::Error| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io)?;
    let mut file = NamedTempFile::new_in(parent).map_err(io)?;
    file.write_all(text.as_bytes()).map_err(io)?;
    file.persist(path).map_err(|error| io(error.error))?;
    Ok(())
}
