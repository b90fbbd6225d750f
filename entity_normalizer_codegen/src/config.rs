//! Configuration for one code generation round.
//!
//! Built with `typed-builder`, or parsed from the `#[entity_module(..)]`
//! attribute arguments:
//!
//! ```
//! use entity_normalizer_codegen::config::CodegenConfig;
//! use quote::quote;
//!
//! let config = CodegenConfig::from_attribute_args(quote!(store = "persistence")).unwrap();
//! assert_eq!(config.store_module, "persistence");
//!
//! let config = CodegenConfig::builder().format_output(false).build();
//! assert_eq!(config.store_module, "store");
//! ```

use proc_macro2::{Ident, TokenStream};
use quote::{ToTokens, format_ident};
use syn::{
    Expr, ExprLit, Lit, LitStr, MetaNameValue, Path, Token, parse::Parser, parse_quote,
    punctuated::Punctuated, spanned::Spanned,
};
use typed_builder::TypedBuilder;

use crate::error::ConfigError;

#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct CodegenConfig {
    /// Name of the generated child module holding the store, repository and interfaces
    #[builder(default = format_ident!("store"))]
    pub store_module: Ident,

    /// Path under which generated code reaches the runtime crate
    #[builder(default = parse_quote!(::entity_normalizer))]
    pub runtime_path: Path,

    /// Pretty-print units written by the directory sink
    #[builder(default = true)]
    pub format_output: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CodegenConfig {
    /// Parse `store = "..."`, `runtime = "..."` and `format = "true"|"false"`.
    pub fn from_attribute_args(args: TokenStream) -> Result<Self, ConfigError> {
        let options = Punctuated::<MetaNameValue, Token![,]>::parse_terminated
            .parse2(args)
            .map_err(ConfigError::Malformed)?;

        let mut config = Self::default();
        for option in options {
            let key = option.path.to_token_stream().to_string().replace(' ', "");
            let value = string_value(&key, &option.value)?;
            match key.as_str() {
                "store" => {
                    config.store_module = value.parse::<Ident>().map_err(|e| invalid(&key, &value, e))?;
                }
                "runtime" => {
                    config.runtime_path = value.parse::<Path>().map_err(|e| invalid(&key, &value, e))?;
                }
                "format" => {
                    config.format_output = value.value().parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                        key: key.clone(),
                        detail: e.to_string(),
                        span: value.span(),
                    })?;
                }
                _ => {
                    return Err(ConfigError::UnknownOption {
                        key,
                        span: option.path.span(),
                    });
                }
            }
        }
        Ok(config)
    }
}

fn string_value(key: &str, value: &Expr) -> Result<LitStr, ConfigError> {
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit.clone()),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            detail: "expected a string literal".to_string(),
            span: other.span(),
        }),
    }
}

fn invalid(key: &str, value: &LitStr, error: syn::Error) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        detail: format!("`{}`: {error}", value.value()),
        span: value.span(),
    }
}
