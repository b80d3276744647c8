use crate::Span;
use crate::lexer::{LexerError, Token, TokenKind};
use crate::types::{Node, classify};
use std::iter::Peekable;
use std::vec::IntoIter; // To iterate over Vec<Token>
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse Error [at {0}]: Unexpected close paren")]
    UnexpectedCloseParen(Span),
    #[error("Parse Error: Unexpected end of input during parsing. Expected {0}")]
    UnexpectedEof(String), // What was expected when input ran out
    #[error("Lexer Error during parse: {0}")]
    LexerError(#[from] LexerError), // Propagate lexer errors when parsing directly from a string
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent reader over a token sequence.
pub struct Parser {
    // We iterate over owned Tokens, consuming them.
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    // Consumes the next token if available.
    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    /// True once every token has been consumed.
    pub fn is_at_end(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Parses a single expression from the token stream.
    pub fn parse_expr(&mut self) -> ParseResult<Node> {
        let token = self.next_token();
        self.parse_expr_with_token(token)
    }

    fn parse_expr_with_token(&mut self, token: Option<Token>) -> ParseResult<Node> {
        match token {
            Some(Token {
                kind: TokenKind::LParen,
                span,
            }) => self.parse_list(span),
            Some(Token {
                kind: TokenKind::RParen,
                span,
            }) => Err(ParseError::UnexpectedCloseParen(span)),
            Some(Token {
                kind: TokenKind::Atom(text),
                span,
            }) => Ok(Node::new(classify(&text), span)),
            None => Err(ParseError::UnexpectedEof("an expression".to_string())), // No tokens left
        }
    }

    /// Parses the rest of a list whose `(` has already been consumed.
    fn parse_list(&mut self, open_span: Span) -> ParseResult<Node> {
        let mut items = Vec::new();
        loop {
            match self.next_token() {
                Some(Token {
                    kind: TokenKind::RParen,
                    span,
                }) => return Ok(Node::new_list(items, open_span.merge(span))),
                Some(token) => items.push(self.parse_expr_with_token(Some(token))?),
                // Reached EOF before finding ')'
                None => return Err(ParseError::UnexpectedEof("')'".to_string())),
            }
        }
    }

    /// Parses every top-level expression until the tokens run out.
    pub fn parse_all(mut self) -> ParseResult<Vec<Node>> {
        let mut expressions = Vec::new();
        while !self.is_at_end() {
            expressions.push(self.parse_expr()?);
        }
        Ok(expressions)
    }
}

/// Reads the first complete expression from `tokens`. Tokens after it are ignored.
pub fn read(tokens: Vec<Token>) -> ParseResult<Node> {
    Parser::new(tokens).parse_expr()
}

// Helper function to lex and read a string directly (useful for tests and REPL)
pub fn parse_str(input: &str) -> ParseResult<Node> {
    let tokens = crate::lexer::tokenize(input)?;
    read(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::types::Sexpr;

    // Helper for asserting successful parsing
    fn assert_parse(input: &str, expected: Node) {
        match parse_str(input) {
            Ok(result) => assert_eq!(result, expected, "Input: '{}'", input),
            Err(e) => panic!("Parsing failed for input '{}': {}", input, e),
        }
    }

    // Helper for asserting parse errors
    fn assert_parse_error(input: &str, expected_error_variant: ParseError) {
        match parse_str(input) {
            Ok(result) => panic!(
                "Expected parsing to fail for input '{}', but got: {:?}",
                input, result
            ),
            Err(e) => {
                // Compare enum variants, ignoring specific content for simplicity
                assert_eq!(
                    std::mem::discriminant(&e),
                    std::mem::discriminant(&expected_error_variant),
                    "Input: '{}', Expected error variant like {:?}, got: {:?}",
                    input,
                    expected_error_variant,
                    e
                );
            }
        }
    }

    // Structural comparison that ignores spans.
    fn assert_parsed_sexpr_string(input: &str, expected_output: &str) {
        let node = match parse_str(input) {
            Ok(result) => result,
            Err(e) => panic!("Parsing failed for input '{}': {}", input, e),
        };
        assert_eq!(node.to_string(), expected_output, "Input: '{}'", input);
    }

    fn node_number(n: f64, start: usize, end: usize) -> Node {
        Node::new_number(n, Span::new(start, end))
    }

    fn node_symbol(s: &str, start: usize, end: usize) -> Node {
        Node::new_symbol(s, Span::new(start, end))
    }

    fn node_list(nodes: &[Node], start: usize, end: usize) -> Node {
        Node::new_list(nodes.to_vec(), Span::new(start, end))
    }

    fn kinds(node: &Node) -> Vec<Sexpr> {
        match &node.kind {
            Sexpr::List(items) => items.iter().map(|n| n.kind.clone()).collect(),
            other => panic!("Expected a list, got {:?}", other),
        }
    }

    fn sym(s: &str) -> Sexpr {
        Sexpr::Symbol(s.to_string())
    }

    #[test]
    fn test_parse_atoms() {
        assert_parse("123", node_number(123.0, 0, 3));
        assert_parse("-4.5", node_number(-4.5, 0, 4));
        assert_parse("symbol", node_symbol("symbol", 0, 6));
        assert_parse("*", node_symbol("*", 0, 1));
        assert_parse("1e400", node_symbol("1e400", 0, 5));
    }

    #[test]
    fn test_parse_empty_list() {
        assert_parse("()", node_list(&[], 0, 2));
        assert_parse("( )", node_list(&[], 0, 3)); // With space
    }

    #[test]
    fn test_parse_simple_list() {
        assert_parse(
            "(* 10 20)",
            node_list(
                &[
                    node_symbol("*", 1, 2),
                    node_number(10.0, 3, 5),
                    node_number(20.0, 6, 8),
                ],
                0,
                9,
            ),
        );
    }

    #[test]
    fn test_parse_nested_list() {
        assert_parse(
            "(a (b c) d)",
            node_list(
                &[
                    node_symbol("a", 1, 2),
                    node_list(&[node_symbol("b", 4, 5), node_symbol("c", 6, 7)], 3, 8),
                    node_symbol("d", 9, 10),
                ],
                0,
                11,
            ),
        );
        assert_parse(
            "(()())",
            node_list(&[node_list(&[], 1, 3), node_list(&[], 3, 5)], 0, 6),
        );
    }

    #[test]
    fn test_parse_program_structure() {
        let tokens = tokenize("(begin (define r 10) (* pi (* r r)))").unwrap();
        let program = read(tokens).unwrap();
        let items = kinds(&program);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], sym("begin"));

        let define = match &program.kind {
            Sexpr::List(items) => items[1].clone(),
            _ => unreachable!(),
        };
        assert_eq!(
            kinds(&define),
            vec![sym("define"), sym("r"), Sexpr::Number(10.0)]
        );

        let area = match &program.kind {
            Sexpr::List(items) => items[2].clone(),
            _ => unreachable!(),
        };
        assert_eq!(area.to_string(), "(* pi (* r r))");
        let area_items = kinds(&area);
        assert_eq!(area_items[0], sym("*"));
        assert_eq!(area_items[1], sym("pi"));
        assert_eq!(
            match &area_items[2] {
                Sexpr::List(inner) => inner.iter().map(|n| n.kind.clone()).collect::<Vec<_>>(),
                other => panic!("Expected a list, got {:?}", other),
            },
            vec![sym("*"), sym("r"), sym("r")]
        );
    }

    #[test]
    fn test_parse_ignores_trailing_tokens() {
        assert_parsed_sexpr_string("(a b) c )", "(a b)");
        assert_parsed_sexpr_string("x (y", "x");
    }

    #[test]
    fn test_parse_all_reads_every_form() {
        let tokens = tokenize("(define r 3) (* r r) pi").unwrap();
        let forms = Parser::new(tokens).parse_all().unwrap();
        let rendered: Vec<String> = forms.iter().map(|f| f.to_string()).collect();
        assert_eq!(rendered, vec!["(define r 3)", "(* r r)", "pi"]);

        let tokens = tokenize("(a) (b").unwrap();
        assert_eq!(
            Parser::new(tokens).parse_all(),
            Err(ParseError::UnexpectedEof("')'".to_string()))
        );
    }

    #[test]
    fn test_is_at_end() {
        let mut parser = Parser::new(tokenize("(a) b").unwrap());
        assert!(!parser.is_at_end());
        parser.parse_expr().unwrap();
        assert!(!parser.is_at_end());
        parser.parse_expr().unwrap();
        assert!(parser.is_at_end());
    }

    #[test]
    fn test_parse_errors_unexpected_close() {
        assert_parse_error(")", ParseError::UnexpectedCloseParen(Span::default()));
        assert_parse_error(") (a)", ParseError::UnexpectedCloseParen(Span::default()));
        assert_eq!(
            parse_str(")"),
            Err(ParseError::UnexpectedCloseParen(Span::new(0, 1)))
        );
    }

    #[test]
    fn test_parse_errors_eof() {
        assert_parse_error("", ParseError::UnexpectedEof("".to_string()));
        assert_parse_error("(", ParseError::UnexpectedEof("".to_string())); // EOF inside list
        assert_parse_error("(define r", ParseError::UnexpectedEof("".to_string()));
        assert_parse_error("(a (b c)", ParseError::UnexpectedEof("".to_string()));
    }

    #[test]
    fn test_read_empty_token_stream() {
        assert_eq!(
            read(vec![]),
            Err(ParseError::UnexpectedEof("an expression".to_string()))
        );
    }
}
