use crate::environment::Environment;
use crate::source::Span;
use crate::types::{Node, Procedure, Sexpr};
use std::collections::HashSet;
use thiserror::Error;

/// Keywords with their own evaluation rule.
const SPECIAL_FORMS: &[&str] = &["define"];

// --- Evaluation Error ---
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unbound symbol: '{0}'")]
    UnboundSymbol(String, Span), // Symbol name, span where lookup happened
    #[error("Evaluation Error: Expected a procedure, but got: {0}")]
    NotAProcedure(Sexpr, Span), // Tried to call something that isn't a procedure
    #[error("Evaluation Error: Invalid form - {0}")]
    InvalidForm(String, Span), // Malformed special form, or an empty list
    #[error("Evaluation Error: Procedure '{procedure}' expects {expected} arguments, got {found}")]
    WrongArity {
        procedure: String,
        expected: String,
        found: usize,
        span: Span,
    },
    #[error("Evaluation Error: Expected {expected}, but got {}: {found}", .found.type_name())]
    TypeMismatch {
        expected: String,
        found: Sexpr,
        span: Span,
    },
}

impl EvalError {
    /// Source location the error refers to.
    pub fn span(&self) -> Span {
        match self {
            EvalError::UnboundSymbol(_, span)
            | EvalError::NotAProcedure(_, span)
            | EvalError::InvalidForm(_, span)
            | EvalError::WrongArity { span, .. }
            | EvalError::TypeMismatch { span, .. } => *span,
        }
    }
}

// Result type alias for convenience
pub type EvalResult<T = Node> = Result<T, EvalError>;

/// Names the evaluator treats specially, for completion and the like.
pub fn special_form_identifiers() -> HashSet<String> {
    SPECIAL_FORMS.iter().map(|s| s.to_string()).collect()
}

// --- Evaluate Function ---

/// Evaluates a given AST Node within the specified environment.
///
/// Recursion depth follows the nesting depth of `node`; there is no tail-call
/// elimination.
pub fn evaluate(node: &Node, env: &mut Environment) -> EvalResult {
    match &node.kind {
        // 1. Self-evaluating atoms
        Sexpr::Number(_) | Sexpr::Procedure(_) => Ok(node.clone()),

        // 2. Symbols: Look up in the environment
        Sexpr::Symbol(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnboundSymbol(name.clone(), node.span)),

        // 3. Lists: special forms or procedure calls
        Sexpr::List(elements) => match elements.split_first() {
            None => Err(EvalError::InvalidForm(
                "cannot evaluate an empty list".to_string(),
                node.span,
            )),
            Some((first, rest)) => match &first.kind {
                Sexpr::Symbol(sym_name) if sym_name == "define" => {
                    evaluate_define(rest, env, node.span) // Pass span of the whole (define ...) form
                }
                _ => evaluate_procedure(first, rest, env, node.span),
            },
        },
    }
}

fn evaluate_define(operands: &[Node], env: &mut Environment, span: Span) -> EvalResult {
    if let [name_node, value_node] = operands {
        let name = match &name_node.kind {
            Sexpr::Symbol(name) => name.clone(),
            other => {
                return Err(EvalError::InvalidForm(
                    format!("define expects a symbol to bind, got {}", other.type_name()),
                    name_node.span,
                ));
            }
        };
        let value = evaluate(value_node, env)?;
        tracing::debug!(%name, %value, "define");
        env.define(name, value.clone());
        Ok(value)
    } else {
        Err(EvalError::InvalidForm(
            format!(
                "define expects a symbol and an expression, got {} operands",
                operands.len()
            ),
            span, // Use the span of the whole (define ...) form
        ))
    }
}

fn evaluate_procedure(
    operator: &Node,
    operands: &[Node],
    env: &mut Environment,
    span: Span,
) -> EvalResult {
    // 1. Resolve the operator. Only a symbol is looked up; any other head
    //    that is not already a procedure cannot be called.
    let procedure = match &operator.kind {
        Sexpr::Symbol(_) => match evaluate(operator, env)?.kind {
            Sexpr::Procedure(proc) => proc,
            other => return Err(EvalError::NotAProcedure(other, operator.span)),
        },
        Sexpr::Procedure(proc) => proc.clone(),
        other => return Err(EvalError::NotAProcedure(other.clone(), operator.span)),
    };

    // 2. Evaluate the operands strictly left to right, so a define in one
    //    argument is visible to the arguments after it.
    let mut evaluated_args: Vec<Node> = Vec::with_capacity(operands.len());
    for operand_node in operands {
        let mut value = evaluate(operand_node, env)?;
        value.span = operand_node.span; // Report argument errors at the argument
        evaluated_args.push(value);
    }

    // 3. Apply the procedure
    apply(&procedure, evaluated_args, span)
}

/// Applies a procedure to already-evaluated arguments. `span` is the call site.
pub fn apply(procedure: &Procedure, args: Vec<Node>, span: Span) -> EvalResult {
    tracing::trace!(procedure = procedure.name(), argc = args.len(), "apply");
    match procedure {
        Procedure::Binary(func, name) => {
            if let [x, y] = &args[..] {
                let x = expect_number(x)?;
                let y = expect_number(y)?;
                Ok(Node::new_number(func(x, y), span))
            } else {
                Err(EvalError::WrongArity {
                    procedure: name.clone(),
                    expected: "exactly 2".to_string(),
                    found: args.len(),
                    span,
                })
            }
        }
        Procedure::Variadic(func, _) => func(args, span),
    }
}

// Extracts a number from a Node or returns TypeMismatch
fn expect_number(node: &Node) -> EvalResult<f64> {
    match node.kind {
        Sexpr::Number(n) => Ok(n),
        _ => Err(EvalError::TypeMismatch {
            expected: "number".to_string(),
            found: node.kind.clone(),
            span: node.span,
        }),
    }
}
