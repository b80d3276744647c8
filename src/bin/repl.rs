use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use lispy::evaluator::special_form_identifiers;
use lispy::{Interpreter, TokenKind, tokenize};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{EditMode, Helper, Highlighter, Hinter, Validator};
use tracing_subscriber::EnvFilter;

const HISTORY_FILE: &str = "lispy_history.txt";
const EDIT_MODE_VAR: &str = "LISPY_EDIT_MODE";

struct LispyCompleter {
    interpreter: Rc<RefCell<Interpreter>>,
}

impl LispyCompleter {
    fn new(interpreter: Rc<RefCell<Interpreter>>) -> Self {
        LispyCompleter { interpreter }
    }
}

impl rustyline::completion::Completer for LispyCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        // Only complete when the cursor sits right after an atom
        let prefix = match tokenize(&line[..pos]) {
            Ok(tokens) => match tokens.last() {
                Some(token) if token.span.end == pos => match &token.kind {
                    TokenKind::Atom(prefix) => prefix.clone(),
                    _ => return Ok((pos, vec![])),
                },
                _ => return Ok((pos, vec![])),
            },
            Err(_) => return Ok((pos, vec![])),
        };
        let mut candidates: Vec<String> = self
            .interpreter
            .borrow()
            .env()
            .get_identifiers()
            .union(&special_form_identifiers())
            .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
            .collect();
        candidates.sort();
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: ParenValidator,
    #[rustyline(Highlighter)]
    highlighter: ParenHighlighter,
    #[rustyline(Completer)]
    completer: LispyCompleter,
}

/// Keeps reading lines until every `(` is closed.
struct ParenValidator;

impl Validator for ParenValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let mut depth = 0usize;
        for (i, c) in ctx.input().char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    if depth == 0 {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched ')' at position {}",
                            i
                        ))));
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }

        if depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Colours the parenthesis pair around the cursor, and any unmatched `)`.
struct ParenHighlighter;

impl Highlighter for ParenHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        // (byte offset in `line`, byte offset in `highlighted`) of each open paren
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut highlighted = String::with_capacity(line.len());
        let cursor = pos.checked_sub(1);

        for (i, c) in line.char_indices() {
            match c {
                '(' => {
                    stack.push((i, highlighted.len()));
                    highlighted.push(c);
                }
                ')' => match stack.pop() {
                    Some((open_at, matching_pos)) => {
                        if cursor == Some(i) || cursor == Some(open_at) {
                            highlighted.push_str("\x1b[34m)\x1b[0m"); // Blue for matching brackets
                            highlighted.replace_range(matching_pos..=matching_pos, "\x1b[1;34m(\x1b[0m");
                        } else {
                            highlighted.push(c);
                        }
                    }
                    None => highlighted.push_str("\x1b[31m)\x1b[0m"), // Red for unmatched closing brackets
                },
                _ => highlighted.push(c),
            }
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn edit_mode() -> EditMode {
    match std::env::var(EDIT_MODE_VAR) {
        Ok(mode) if mode.eq_ignore_ascii_case("vi") => EditMode::Vi,
        _ => EditMode::Emacs,
    }
}

fn main() -> rustyline::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("lispy REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl-D to quit.");

    let interpreter = Rc::new(RefCell::new(Interpreter::new()));
    let h = InputHelper {
        highlighter: ParenHighlighter,
        validator: ParenValidator,
        completer: LispyCompleter::new(interpreter.clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(edit_mode())
        .auto_add_history(true)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(HISTORY_FILE).is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline("lispy> ") {
            Ok(line) => {
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                let outcome = interpreter.borrow_mut().run_all(trimmed_input);
                match outcome {
                    Ok(Some(result_node)) => println!("{}", result_node),
                    Ok(None) => {}
                    Err(e) => {
                        if e.pretty_print(trimmed_input).is_err() {
                            eprintln!("Error: {}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(HISTORY_FILE)
}
