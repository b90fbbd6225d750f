//! Generator IR.
//!
//! Method bodies are planned as trees of [`Stmt`] and [`Expr`], pure data
//! lowered to tokens by [`crate::emit`]. Names, paths and types that need no
//! structure are carried as [`TokenStream`] literals.
//!
//! ```text
//! Block
//! ├── Decl   let [mut] name [: ty] [= init];
//! ├── Assign target = value;
//! ├── Expr   expr;
//! ├── For    for binding in iter { .. }
//! ├── If     if cond { .. } [else { .. }]
//! └── Return tail expression in a fn body, `return expr;` elsewhere
//! ```

use proc_macro2::{Ident, TokenStream};

#[derive(Debug, Clone, Default)]
pub struct Block(pub Vec<Stmt>);

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.0.push(stmt);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.0
    }
}

impl From<Vec<Stmt>> for Block {
    fn from(stmts: Vec<Stmt>) -> Self {
        Self(stmts)
    }
}

impl Extend<Stmt> for Block {
    fn extend<I: IntoIterator<Item = Stmt>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Decl {
        name: Ident,
        mutable: bool,
        ty: Option<TokenStream>,
        init: Option<Expr>,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    Expr(Expr),
    For {
        binding: Binding,
        iter: Expr,
        body: Block,
    },
    If {
        cond: Cond,
        then: Block,
        otherwise: Option<Block>,
    },
    Return(Expr),
}

impl Stmt {
    pub fn decl(name: Ident, init: Expr) -> Self {
        Self::Decl {
            name,
            mutable: false,
            ty: None,
            init: Some(init),
        }
    }

    pub fn decl_mut(name: Ident, init: Expr) -> Self {
        Self::Decl {
            name,
            mutable: true,
            ty: None,
            init: Some(init),
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Self::Expr(expr)
    }

    pub fn ret(expr: Expr) -> Self {
        Self::Return(expr)
    }

    pub fn for_each(binding: Binding, iter: Expr, body: Block) -> Self {
        Self::For {
            binding,
            iter,
            body,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    Or,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(TokenStream),
    Name(Ident),
    Field {
        base: Box<Expr>,
        name: Ident,
    },
    /// Method call `recv.method(args)`
    Call {
        recv: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
    },
    /// Path call `func(args)`
    Invoke {
        func: TokenStream,
        args: Vec<Expr>,
    },
    /// Struct literal with shorthand fields
    Construct {
        path: TokenStream,
        fields: Vec<Ident>,
    },
    Ref {
        mutable: bool,
        expr: Box<Expr>,
    },
    Not(Box<Expr>),
    Try(Box<Expr>),
    Binary {
        lhs: Box<Expr>,
        op: BinOp,
        rhs: Box<Expr>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<Arm>,
    },
}

impl Expr {
    pub fn lit(tokens: TokenStream) -> Self {
        Self::Literal(tokens)
    }

    pub fn name(ident: &Ident) -> Self {
        Self::Name(ident.clone())
    }

    pub fn invoke(func: TokenStream, args: Vec<Expr>) -> Self {
        Self::Invoke { func, args }
    }

    pub fn call(self, method: Ident, args: Vec<Expr>) -> Self {
        Self::Call {
            recv: Box::new(self),
            method,
            args,
        }
    }

    pub fn field(self, name: Ident) -> Self {
        Self::Field {
            base: Box::new(self),
            name,
        }
    }

    pub fn by_ref(self) -> Self {
        Self::Ref {
            mutable: false,
            expr: Box::new(self),
        }
    }

    pub fn by_mut(self) -> Self {
        Self::Ref {
            mutable: true,
            expr: Box::new(self),
        }
    }

    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn try_(self) -> Self {
        Self::Try(Box::new(self))
    }

    pub fn binary(self, op: BinOp, rhs: Expr) -> Self {
        Self::Binary {
            lhs: Box::new(self),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn matching(self, arms: Vec<Arm>) -> Self {
        Self::Match {
            scrutinee: Box::new(self),
            arms,
        }
    }
}

/// One match arm; the last `Stmt::Expr` of `body` is the arm's value.
#[derive(Debug, Clone)]
pub struct Arm {
    pub pattern: TokenStream,
    pub body: Block,
}

impl Arm {
    pub fn new(pattern: TokenStream, body: impl Into<Block>) -> Self {
        Self {
            pattern,
            body: body.into(),
        }
    }

    /// Arm whose whole body is a single value.
    pub fn value(pattern: TokenStream, value: Expr) -> Self {
        Self::new(pattern, vec![Stmt::Expr(value)])
    }
}

#[derive(Debug, Clone)]
pub enum Cond {
    Expr(Expr),
    /// `let binding = value`
    Let { binding: Binding, value: Expr },
}

#[derive(Debug, Clone)]
pub enum Binding {
    Name(Ident),
    Pair(Ident, Ident),
    Some(Ident),
}
