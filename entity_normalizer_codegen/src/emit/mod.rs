//! Emission: plans to tokens, tokens to sinks.
//!
//! The emitter is mechanical. It lowers a [`TypePlan`] into one token stream
//! (declaration, inherent impl, trait impls) and wraps it in an
//! [`EmittedUnit`]; a [`Sink`] decides where the unit goes.

pub mod lower;
pub mod sink;

use proc_macro2::TokenStream;
use quote::quote;

pub use lower::{BlockRole, lower_block};
pub use sink::{DirectorySink, EmittedUnit, Sink, TokenSink};

use crate::plan::{FieldPlan, FnPlan, ImplPlan, Receiver, Shape, TypePlan, VariantPlan};

#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter;

impl Emitter {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(&self, plan: &TypePlan) -> EmittedUnit {
        log::trace!("emitting {} `{}`", plan.kind, plan.name);
        EmittedUnit {
            kind: plan.kind,
            placement: plan.placement.clone(),
            name: plan.name.clone(),
            tokens: self.lower(plan),
        }
    }

    pub fn lower(&self, plan: &TypePlan) -> TokenStream {
        let TypePlan {
            name,
            vis,
            attrs,
            shape,
            inherent,
            impls,
            ..
        } = plan;

        let declaration = match shape {
            Shape::Struct(fields) => {
                let fields = fields.iter().map(lower_field);
                quote! {
                    #(#attrs)*
                    #vis struct #name {
                        #(#fields),*
                    }
                }
            }
            Shape::Enum(variants) => {
                let variants = variants.iter().map(lower_variant);
                quote! {
                    #(#attrs)*
                    #vis enum #name {
                        #(#variants),*
                    }
                }
            }
            Shape::Trait(methods) => {
                let methods = methods.iter().map(lower_fn);
                quote! {
                    #(#attrs)*
                    #vis trait #name {
                        #(#methods)*
                    }
                }
            }
        };

        let inherent = (!inherent.is_empty()).then(|| {
            let methods = inherent.iter().map(lower_fn);
            quote! {
                impl #name {
                    #(#methods)*
                }
            }
        });

        let impls = impls.iter().map(|plan| lower_impl(plan, name));

        quote! {
            #declaration
            #inherent
            #(#impls)*
        }
    }
}

fn lower_field(field: &FieldPlan) -> TokenStream {
    let FieldPlan { attrs, name, ty } = field;
    quote!(#(#attrs)* #name: #ty)
}

fn lower_variant(variant: &VariantPlan) -> TokenStream {
    let VariantPlan {
        attrs,
        name,
        payload,
    } = variant;
    quote!(#(#attrs)* #name(#payload))
}

fn lower_impl(plan: &ImplPlan, self_ty: &proc_macro2::Ident) -> TokenStream {
    let ImplPlan {
        attrs,
        trait_path,
        items,
        methods,
    } = plan;
    let methods = methods.iter().map(lower_fn);
    quote! {
        #(#attrs)*
        impl #trait_path for #self_ty {
            #(#items)*
            #(#methods)*
        }
    }
}

pub fn lower_fn(plan: &FnPlan) -> TokenStream {
    let FnPlan {
        attrs,
        public,
        name,
        generics,
        receiver,
        params,
        ret,
        body,
    } = plan;
    let vis = public.then(|| quote!(pub));
    let receiver = match receiver {
        Receiver::None => None,
        Receiver::Ref => Some(quote!(&self)),
        Receiver::RefMut => Some(quote!(&mut self)),
        Receiver::Value => Some(quote!(self)),
        Receiver::MutValue => Some(quote!(mut self)),
    };
    let params = receiver
        .into_iter()
        .chain(params.iter().map(|(name, ty)| quote!(#name: #ty)));
    let ret = ret.as_ref().map(|ty| quote!(-> #ty));

    match body {
        Some(body) => {
            let body = lower_block(body, BlockRole::Fn);
            quote! {
                #(#attrs)*
                #vis fn #name #generics(#(#params),*) #ret {
                    #body
                }
            }
        }
        None => quote! {
            #(#attrs)*
            fn #name #generics(#(#params),*) #ret;
        },
    }
}
