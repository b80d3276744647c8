// Declare modules publicly so they are part of the library interface
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod primitives;
pub mod source;
pub mod types;

pub use environment::Environment;
pub use evaluator::{EvalError, EvalResult, evaluate};
pub use interpreter::{Error, Interpreter};
pub use lexer::{LexerError, Token, TokenKind, tokenize};
pub use parser::{ParseError, Parser, parse_str, read};
pub use source::Span;
pub use types::{Node, Procedure, Sexpr};
