use crate::{Error, EvalError, LexerError, ParseError};
use ariadne::{Label, Report, ReportKind, Source};
use std::ops::Range;

// Name shown in reports for the text being evaluated
const SOURCE_ID: &str = "input";

type SourceReport<'a> = Report<'a, (&'static str, Range<usize>)>;

impl EvalError {
    pub fn report(&self) -> SourceReport<'static> {
        let span = self.span().to_range();
        let builder = Report::build(ReportKind::Error, (SOURCE_ID, span.clone()));
        let builder = match self {
            EvalError::UnboundSymbol(symbol, _) => builder
                .with_message(format!("Unbound symbol `{}`", symbol))
                .with_label(
                    Label::new((SOURCE_ID, span))
                        .with_message("This symbol has not been defined"),
                ),
            EvalError::NotAProcedure(sexpr, _) => builder
                .with_message(format!("Not a procedure: {}", sexpr))
                .with_label(
                    Label::new((SOURCE_ID, span))
                        .with_message("This expression cannot be called as a procedure"),
                ),
            EvalError::InvalidForm(message, _) => builder
                .with_message("Invalid form")
                .with_label(Label::new((SOURCE_ID, span)).with_message(message)),
            EvalError::WrongArity {
                procedure,
                expected,
                found,
                ..
            } => builder
                .with_message(format!("Wrong number of arguments to `{}`", procedure))
                .with_label(
                    Label::new((SOURCE_ID, span))
                        .with_message(format!("Expected {} arguments, got {}", expected, found)),
                ),
            EvalError::TypeMismatch {
                expected, found, ..
            } => builder
                .with_message(format!("Type mismatch: {}", found))
                .with_label(Label::new((SOURCE_ID, span)).with_message(format!(
                    "Expected {}, found {}",
                    expected,
                    found.type_name()
                ))),
        };
        builder.finish()
    }

    pub fn pretty_print(&self, input: &str) -> std::io::Result<()> {
        self.report().eprint((SOURCE_ID, Source::from(input)))
    }
}

impl LexerError {
    pub fn report(&self) -> SourceReport<'static> {
        let span = self.span.to_range();
        Report::build(ReportKind::Error, (SOURCE_ID, span.clone()))
            .with_message("Lexer Error")
            .with_label(Label::new((SOURCE_ID, span)).with_message(self.error.to_string()))
            .finish()
    }
}

impl ParseError {
    pub fn report(&self, input: &str) -> SourceReport<'static> {
        match self {
            ParseError::UnexpectedCloseParen(span) => {
                Report::build(ReportKind::Error, (SOURCE_ID, span.to_range()))
                    .with_message("Unexpected token: )")
                    .with_label(
                        Label::new((SOURCE_ID, span.to_range()))
                            .with_message("This parenthesis closes nothing"),
                    )
                    .finish()
            }
            ParseError::UnexpectedEof(expected) => {
                let idx = input.len();
                Report::build(ReportKind::Error, (SOURCE_ID, idx..idx))
                    .with_message("Unexpected end of input")
                    .with_label(
                        Label::new((SOURCE_ID, idx..idx))
                            .with_message(format!("Expected {}", expected)),
                    )
                    .finish()
            }
            ParseError::LexerError(lex_err) => lex_err.report(),
        }
    }

    pub fn pretty_print(&self, input: &str) -> std::io::Result<()> {
        self.report(input).eprint((SOURCE_ID, Source::from(input)))
    }
}

impl Error {
    pub fn pretty_print(&self, input: &str) -> std::io::Result<()> {
        match self {
            Error::Lexer(err) => err.report().eprint((SOURCE_ID, Source::from(input))),
            Error::Parse(err) => err.pretty_print(input),
            Error::Eval(err) => err.pretty_print(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpreter;

    fn render(report: SourceReport<'static>, input: &str) -> String {
        let mut out = Vec::new();
        report
            .write((SOURCE_ID, Source::from(input)), &mut out)
            .expect("Report should render");
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_eval_report_mentions_symbol() {
        let input = "(* r 2)";
        let err = match Interpreter::new().run(input) {
            Err(Error::Eval(err)) => err,
            other => panic!("Expected an evaluation error, got {:?}", other),
        };
        let text = render(err.report(), input);
        assert!(text.contains("Unbound symbol `r`"), "Report: {}", text);
    }

    #[test]
    fn test_parse_report_for_eof() {
        let input = "(define r";
        let err = crate::parse_str(input).unwrap_err();
        let text = render(err.report(input), input);
        assert!(text.contains("Unexpected end of input"), "Report: {}", text);
    }

    #[test]
    fn test_parse_report_for_close_paren() {
        let input = ")";
        let err = crate::parse_str(input).unwrap_err();
        let text = render(err.report(input), input);
        assert!(text.contains("closes nothing"), "Report: {}", text);
    }
}
