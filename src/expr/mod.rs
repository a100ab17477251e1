//! Restricted arithmetic for derived parameters.
//!
//! ```text
//!  "log10(vrot) - bt / 2"
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  parser   │  tokens → Expr tree; names resolved against the bound
//!   └──────────┘  columns, the function whitelist and pi / e
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   eval    │  Expr + per-row bindings → finite f64 or ExprError
//!   └──────────┘
//! ```
//!
//! Nothing outside the tree can be reached: an identifier that is not a bound
//! column, a whitelisted function or a constant is a parse error.

pub mod eval;
pub mod parser;

use std::fmt;

use thiserror::Error;

pub use eval::{evaluate, Bindings};
pub use parser::parse;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Column(String),
    Constant(Constant),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Column names referenced anywhere in the tree, first occurrence order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Negate(inner) => inner.collect_columns(out),
            Expr::Binary { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Call { args, .. } => args.iter().for_each(|a| a.collect_columns(out)),
            Expr::Literal(_) | Expr::Constant(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// The complete function whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Min,
    Max,
    Sum,
    Count,
    Ln,
    Log10,
    Exp,
    Sqrt,
    Sin,
    Cos,
    Tan,
}

impl Function {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "abs" => Some(Function::Abs),
            "min" => Some(Function::Min),
            "max" => Some(Function::Max),
            "sum" => Some(Function::Sum),
            "count" | "len" => Some(Function::Count),
            "log" => Some(Function::Ln),
            "log10" => Some(Function::Log10),
            "exp" => Some(Function::Exp),
            "sqrt" => Some(Function::Sqrt),
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
            Function::Sum => "sum",
            Function::Count => "count",
            Function::Ln => "log",
            Function::Log10 => "log10",
            Function::Exp => "exp",
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
        }
    }

    /// Accepted argument counts as `(min, max)`; `None` is unbounded.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Function::Min | Function::Max => (1, None),
            Function::Sum | Function::Count => (0, None),
            _ => (1, Some(1)),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function} does not accept {got} argument(s)")]
    Arity { function: Function, got: usize },

    #[error("no value bound for column '{0}'")]
    UnboundColumn(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("{function} is undefined for {value}")]
    Domain { function: Function, value: f64 },

    #[error("result is not finite")]
    NonFinite,
}
