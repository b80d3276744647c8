use crate::environment::Environment;
use crate::evaluator::{EvalError, EvalResult, evaluate};
use crate::lexer::{LexerError, tokenize};
use crate::parser::{ParseError, Parser};
use crate::types::Node;
use thiserror::Error;

/// Any failure along the text → tokens → tree → value pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// One evaluation session: an exclusively owned environment that lives as long
/// as the interpreter. Run concurrent sessions with one interpreter each.
#[derive(Debug, Clone)]
pub struct Interpreter {
    env: Environment,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Starts a session with a fresh standard environment.
    pub fn new() -> Self {
        Interpreter {
            env: Environment::new_global_populated(),
        }
    }

    /// Starts a session over an environment prepared by the caller.
    pub fn with_environment(env: Environment) -> Self {
        Interpreter { env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Evaluates one expression. `define` forms update this session's bindings.
    pub fn eval(&mut self, node: &Node) -> EvalResult {
        evaluate(node, &mut self.env)
    }

    /// Tokenizes, reads and evaluates the first expression in `input`.
    pub fn run(&mut self, input: &str) -> Result<Node, Error> {
        let node = crate::parser::read(tokenize(input)?)?;
        Ok(self.eval(&node)?)
    }

    /// Evaluates every top-level expression in `input` in order and returns the
    /// value of the last one. Stops at the first error; earlier defines stay.
    pub fn run_all(&mut self, input: &str) -> Result<Option<Node>, Error> {
        let forms = Parser::new(tokenize(input)?).parse_all()?;
        let mut last = None;
        for form in &forms {
            last = Some(self.eval(form)?);
        }
        Ok(last)
    }
}
