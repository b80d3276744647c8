// Use the library crate (whose name is defined in Cargo.toml)
use lispy::Interpreter;
use std::io::Read;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// Usage: lispy "(begin (define r 10) (* pi (* r r)))"
// With no arguments the program text is read from stdin.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = if args.is_empty() {
        let mut buffer = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
            eprintln!("Failed to read stdin: {}", e);
            return ExitCode::FAILURE;
        }
        buffer
    } else {
        args.join(" ")
    };

    let mut interpreter = Interpreter::new();
    match interpreter.run_all(&input) {
        Ok(Some(result)) => {
            println!("{}", result);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            if e.pretty_print(&input).is_err() {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
