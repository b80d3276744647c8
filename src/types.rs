use crate::{evaluator::EvalResult, source::Span};
use std::fmt; // For custom display formatting

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: Sexpr, // The actual expression data
    pub span: Span,  // The source span it covers
}

impl Node {
    pub fn new(kind: Sexpr, span: Span) -> Self {
        Node { kind, span }
    }

    pub fn new_symbol(name: impl Into<String>, span: Span) -> Self {
        Node::new(Sexpr::Symbol(name.into()), span)
    }

    pub fn new_number(value: f64, span: Span) -> Self {
        Node::new(Sexpr::Number(value), span)
    }

    pub fn new_list(items: Vec<Node>, span: Span) -> Self {
        Node::new(Sexpr::List(items), span)
    }

    pub fn new_procedure(procedure: Procedure, span: Span) -> Self {
        Node::new(Sexpr::Procedure(procedure), span)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to Sexpr's Display implementation
        write!(f, "{}", self.kind)
    }
}

/// An expression, as produced by the reader and consumed by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    Symbol(String),  // e.g., *, begin, r
    Number(f64),     // Always finite
    List(Vec<Node>), // e.g., (* 2 3), (define r 10), ()
    Procedure(Procedure),
}

impl Sexpr {
    pub fn type_name(&self) -> &'static str {
        match self {
            Sexpr::Symbol(_) => "symbol",
            Sexpr::Number(_) => "number",
            Sexpr::List(_) => "list",
            Sexpr::Procedure(_) => "procedure",
        }
    }
}

/// Classifies a single atom token.
///
/// Anything that parses as a finite `f64` is a number; every other token,
/// including `inf`, `nan` and out-of-range literals such as `1e400`, is a symbol.
pub fn classify(token: &str) -> Sexpr {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Sexpr::Number(value),
        _ => Sexpr::Symbol(token.to_string()),
    }
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexpr::Symbol(s) => write!(f, "{}", s),
            Sexpr::Number(n) => write!(f, "{}", n),
            Sexpr::List(list) => {
                write!(f, "(")?;
                for (i, node) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", node)?;
                }
                write!(f, ")")
            }
            Sexpr::Procedure(procedure) => write!(f, "#<primitive:{}>", procedure.name()),
        }
    }
}

/// Fixed-arity numeric built-in, e.g. `*`.
pub type BinaryFunc = fn(f64, f64) -> f64;

/// Built-in taking any number of already-evaluated arguments, e.g. `begin`.
/// The span is that of the whole call, for results and errors.
pub type VariadicFunc = fn(Vec<Node>, Span) -> EvalResult;

#[derive(Clone)]
pub enum Procedure {
    Binary(BinaryFunc, String), // The function pointer and its name (for display/debug)
    Variadic(VariadicFunc, String),
}

impl Procedure {
    pub fn name(&self) -> &str {
        match self {
            Procedure::Binary(_, name) | Procedure::Variadic(_, name) => name,
        }
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Binary(_, name) => write!(f, "Binary({})", name),
            Procedure::Variadic(_, name) => write!(f, "Variadic({})", name),
        }
    }
}

// Function pointers don't compare reliably, so procedures compare by kind and name.
impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Procedure::Binary(_, n1), Procedure::Binary(_, n2)) => n1 == n2,
            (Procedure::Variadic(_, n1), Procedure::Variadic(_, n2)) => n1 == n2,
            _ => false,
        }
    }
}
