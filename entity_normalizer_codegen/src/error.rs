//! Error types and diagnostics for the code generation engine.
//!
//! Errors are grouped by the phase that raises them:
//!
//! - [`SpecError`]: a spec declaration is malformed (intake and resolution)
//! - [`PlanError`]: a planner could not produce its declarations
//! - [`EmitError`]: a rendered unit could not be written by a sink
//! - [`ConfigError`]: the `#[entity_module(..)]` arguments are malformed
//!
//! None of them abort a round. The driver turns each one into a [`Diagnostic`]
//! and keeps going with everything that is unaffected.

use std::path::PathBuf;

use proc_macro2::{Span, TokenStream};
use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::plan::PlannerKind;

#[derive(Debug, Clone, Error)]
pub enum SpecError {
    #[error("entity spec `{spec_name}` has no field marked #[entity_id]")]
    MissingId { spec_name: String, span: Span },

    #[error("entity spec `{spec_name}` marks {count} fields with #[entity_id], exactly one is allowed")]
    MultipleIds {
        spec_name: String,
        count: usize,
        span: Span,
    },

    #[error("invalid entity spec `{spec_name}`: {detail}")]
    InvalidSpec {
        spec_name: String,
        detail: String,
        span: Span,
    },
}

impl SpecError {
    pub fn invalid(spec_name: impl Into<String>, span: Span, detail: impl Into<String>) -> Self {
        Self::InvalidSpec {
            spec_name: spec_name.into(),
            detail: detail.into(),
            span,
        }
    }

    pub fn spec_name(&self) -> &str {
        match self {
            Self::MissingId { spec_name, .. }
            | Self::MultipleIds { spec_name, .. }
            | Self::InvalidSpec { spec_name, .. } => spec_name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::MissingId { span, .. }
            | Self::MultipleIds { span, .. }
            | Self::InvalidSpec { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PlanError {
    /// Two entities map to the same generated accessor, e.g. `HttpServer` and `HTTPServer`.
    #[error("entities `{first}` and `{second}` both generate `{method}`")]
    AccessorCollision {
        planner: PlannerKind,
        method: String,
        first: String,
        second: String,
        span: Span,
    },

    #[error("cannot generate module `{name}`: an item with that name already exists in the annotated module")]
    StoreModuleCollision {
        planner: PlannerKind,
        name: String,
        span: Span,
    },
}

impl PlanError {
    pub fn span(&self) -> Span {
        match self {
            Self::AccessorCollision { span, .. } | Self::StoreModuleCollision { span, .. } => *span,
        }
    }

    pub fn planner(&self) -> PlannerKind {
        match self {
            Self::AccessorCollision { planner, .. } | Self::StoreModuleCollision { planner, .. } => {
                *planner
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("generated code for `{}` is not valid Rust: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },
}

impl EmitError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Render { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("unknown entity_module option `{key}`, expected `store`, `runtime` or `format`")]
    UnknownOption { key: String, span: Span },

    #[error("invalid value for entity_module option `{key}`: {detail}")]
    InvalidValue {
        key: String,
        detail: String,
        span: Span,
    },

    #[error("malformed entity_module arguments: {0}")]
    Malformed(syn::Error),
}

impl ConfigError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnknownOption { span, .. } | Self::InvalidValue { span, .. } => *span,
            Self::Malformed(error) => error.span(),
        }
    }

    pub fn to_compile_error(&self) -> TokenStream {
        syn::Error::new(self.span(), self).to_compile_error()
    }
}

/// Umbrella error for the file-generating front end.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error("code generation reported {} diagnostic(s), first: {}", .0.len(), .0.first().map(|d| d.message.as_str()).unwrap_or(""))]
    Diagnostics(Vec<Diagnostic>),
}

pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DiagnosticKind {
    MissingId,
    MultipleIds,
    InvalidSpec,
    Plan,
    Emit,
}

/// A structured problem report, keyed by the offending source element.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Spec the problem belongs to, when it belongs to one.
    pub spec_name: Option<String>,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn to_compile_error(&self) -> TokenStream {
        syn::Error::new(self.span, &self.message).to_compile_error()
    }
}

impl From<&SpecError> for Diagnostic {
    fn from(error: &SpecError) -> Self {
        let kind = match error {
            SpecError::MissingId { .. } => DiagnosticKind::MissingId,
            SpecError::MultipleIds { .. } => DiagnosticKind::MultipleIds,
            SpecError::InvalidSpec { .. } => DiagnosticKind::InvalidSpec,
        };
        Self {
            kind,
            spec_name: Some(error.spec_name().to_string()),
            span: error.span(),
            message: error.to_string(),
        }
    }
}

impl From<&PlanError> for Diagnostic {
    fn from(error: &PlanError) -> Self {
        Self {
            kind: DiagnosticKind::Plan,
            spec_name: None,
            span: error.span(),
            message: error.to_string(),
        }
    }
}

impl Diagnostic {
    pub fn from_emit(error: &EmitError, spec_name: Option<String>) -> Self {
        Self {
            kind: DiagnosticKind::Emit,
            spec_name,
            span: Span::call_site(),
            message: error.to_string(),
        }
    }
}

/// Accumulates diagnostics for one round.
///
/// Identical messages at the same kind are reported once, since every
/// store-side planner checks the same accessor names.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        let duplicate = self
            .diagnostics
            .iter()
            .any(|d| d.kind == diagnostic.kind && d.message == diagnostic.message);
        if !duplicate {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn add_spec(&mut self, error: &SpecError) {
        log::debug!("spec error: {error}");
        self.add(error.into());
    }

    pub fn add_plan(&mut self, error: &PlanError) {
        log::warn!("planner {} failed: {error}", error.planner());
        self.add(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
