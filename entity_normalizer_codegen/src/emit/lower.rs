//! Structural lowering of the generator IR to tokens.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

use crate::ir::{Arm, BinOp, Binding, Block, Cond, Expr, Stmt};

/// How the final statement of a block is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    /// Function body: a final `Return` becomes the tail expression
    Fn,
    /// Value block (match arm): a final `Stmt::Expr` becomes the block's value
    Value,
    /// Statement block: every statement is terminated
    Plain,
}

pub fn lower_block(block: &Block, role: BlockRole) -> TokenStream {
    let stmts = block.stmts();
    let mut tokens = TokenStream::new();
    for (index, stmt) in stmts.iter().enumerate() {
        let last = index + 1 == stmts.len();
        match (stmt, role, last) {
            (Stmt::Return(expr), BlockRole::Fn, true) | (Stmt::Expr(expr), BlockRole::Value, true) => {
                expr.to_tokens(&mut tokens);
            }
            _ => lower_stmt(stmt, &mut tokens),
        }
    }
    tokens
}

fn lower_stmt(stmt: &Stmt, tokens: &mut TokenStream) {
    let lowered = match stmt {
        Stmt::Decl {
            name,
            mutable,
            ty,
            init,
        } => {
            let mutability = mutable.then(|| quote!(mut));
            let ty = ty.as_ref().map(|ty| quote!(: #ty));
            let init = init.as_ref().map(|init| quote!(= #init));
            quote!(let #mutability #name #ty #init;)
        }
        Stmt::Assign { target, value } => quote!(#target = #value;),
        Stmt::Expr(expr) => quote!(#expr;),
        Stmt::For {
            binding,
            iter,
            body,
        } => {
            let body = lower_block(body, BlockRole::Plain);
            quote!(for #binding in #iter { #body })
        }
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            let then = lower_block(then, BlockRole::Plain);
            let otherwise = otherwise.as_ref().map(|block| {
                let block = lower_block(block, BlockRole::Plain);
                quote!(else { #block })
            });
            quote!(if #cond { #then } #otherwise)
        }
        Stmt::Return(expr) => quote!(return #expr;),
    };
    tokens.extend(lowered);
}

impl Expr {
    /// Needs parentheses when used as a method receiver or operand.
    fn is_compound(&self) -> bool {
        matches!(self, Expr::Ref { .. } | Expr::Not(_) | Expr::Binary { .. } | Expr::Match { .. })
    }

    fn operand(&self) -> TokenStream {
        if self.is_compound() {
            quote!((#self))
        } else {
            self.to_token_stream()
        }
    }
}

impl ToTokens for Expr {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let lowered = match self {
            Expr::Literal(literal) => literal.clone(),
            Expr::Name(name) => name.to_token_stream(),
            Expr::Field { base, name } => {
                let base = base.operand();
                quote!(#base.#name)
            }
            Expr::Call { recv, method, args } => {
                let recv = recv.operand();
                quote!(#recv.#method(#(#args),*))
            }
            Expr::Invoke { func, args } => quote!(#func(#(#args),*)),
            Expr::Construct { path, fields } => quote!(#path { #(#fields),* }),
            Expr::Ref { mutable, expr } => {
                let mutability = mutable.then(|| quote!(mut));
                let expr = expr.operand();
                quote!(&#mutability #expr)
            }
            Expr::Not(expr) => {
                let expr = expr.operand();
                quote!(!#expr)
            }
            Expr::Try(expr) => {
                let expr = expr.operand();
                quote!(#expr?)
            }
            Expr::Binary { lhs, op, rhs } => {
                let lhs = lhs.operand();
                let rhs = rhs.operand();
                match op {
                    BinOp::Eq => quote!(#lhs == #rhs),
                    BinOp::Or => quote!(#lhs || #rhs),
                }
            }
            Expr::Match { scrutinee, arms } => {
                let scrutinee = scrutinee.operand();
                quote!(match #scrutinee { #(#arms)* })
            }
        };
        tokens.extend(lowered);
    }
}

impl ToTokens for Arm {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let pattern = &self.pattern;
        if let [Stmt::Expr(value)] = self.body.stmts() {
            tokens.extend(quote!(#pattern => #value,));
            return;
        }
        let body = lower_block(&self.body, BlockRole::Value);
        tokens.extend(quote!(#pattern => { #body }));
    }
}

impl ToTokens for Cond {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Cond::Expr(expr) => expr.to_token_stream(),
            Cond::Let { binding, value } => quote!(let #binding = #value),
        });
    }
}

impl ToTokens for Binding {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Binding::Name(name) => quote!(#name),
            Binding::Pair(first, second) => quote!((#first, #second)),
            Binding::Some(name) => quote!(::std::option::Option::Some(#name)),
        });
    }
}
