use logos::Logos;
use std::fmt;
use thiserror::Error;

use crate::Span;

/// Lexical tokens: the two parentheses and everything in between them.
///
/// An atom is any maximal run of characters that are neither ASCII whitespace
/// nor a parenthesis. Whether it denotes a number or a symbol is decided by the
/// reader, not here.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")] // Skip whitespace
#[logos(error = LexerErrorKind)]
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[regex(r"[^ \t\n\r\f()]+", |lex| lex.slice().to_string())]
    Atom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// The lexeme this token was read from.
    pub fn text(&self) -> &str {
        match &self.kind {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Atom(atom) => atom,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Atom(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Error, Default, Debug, Clone, PartialEq)]
pub enum LexerErrorKind {
    #[default]
    #[error("Invalid Token")]
    InvalidToken,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct LexerError {
    pub error: LexerErrorKind,
    pub span: Span,
}

// Result type alias for convenience
type LexerRangedResult<T> = Result<T, LexerError>;

/// Splits `input` into parenthesis and atom tokens, each tagged with its byte span.
pub fn tokenize(input: &str) -> LexerRangedResult<Vec<Token>> {
    let tokens = TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| match result {
            Ok(kind) => Ok(Token {
                kind,
                span: range.into(),
            }),
            Err(error) => Err(LexerError {
                error,
                span: range.into(),
            }),
        })
        .collect::<LexerRangedResult<Vec<Token>>>()?;
    tracing::trace!(count = tokens.len(), "tokenized input");
    Ok(tokens)
}
