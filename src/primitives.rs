use crate::{EvalError, EvalResult, Node, Span};

fn arity_error(name: &str, expected: &str, actual: usize, span: Span) -> EvalResult {
    Err(EvalError::WrongArity {
        procedure: name.to_string(),
        expected: expected.to_string(),
        found: actual,
        span,
    })
}

pub fn prim_mul(x: f64, y: f64) -> f64 {
    // (* 2 3) -> 6
    x * y
}

pub fn prim_begin(args: Vec<Node>, span: Span) -> EvalResult {
    // (begin a b c) -> c
    // Arguments arrive already evaluated, so any side effects have happened.
    match args.into_iter().last() {
        Some(last) => Ok(last),
        None => arity_error("begin", "at least 1", 0, span),
    }
}
