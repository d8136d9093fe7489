mod ast_printer;
mod class;
mod environment;
mod error;
mod function;
mod interpreter;
mod native;
mod object;
mod parser;
mod resolver;
mod scanner;
mod syntax;
mod token;

use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser as _;

use error::{Diagnostics, LoxError};
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;
use syntax::ExprId;

/// A tree-walking interpreter for the Lox language.
#[derive(clap::Parser)]
#[command(name = "lox-interpreter-rs", about, version)]
struct Cli {
    /// Script files to run. With none given, starts an interactive prompt.
    scripts: Vec<String>,

    /// Raise the log level (-v for info, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Lox {
    interpreter: Interpreter,
    // Carried across every `run` call so that a second file (or a second
    // REPL line) never hands out `ExprId`s that collide with an earlier
    // one's — the resolver's locals tables for both share one interpreter.
    next_expr_id: ExprId,
}

enum RunOutcome {
    Ok,
    StaticError,
    RuntimeError,
}

impl Lox {
    fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            next_expr_id: 0,
        }
    }

    fn run_file(&mut self, path: &str) -> Result<RunOutcome, LoxError> {
        let contents = fs::read_to_string(path)?;
        Ok(self.run(&contents))
    }

    fn run_prompt(&mut self) -> Result<(), LoxError> {
        let stdin = io::stdin();
        let mut line = String::new();

        loop {
            print!("> ");
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line_into(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches('\n');
            if trimmed == "exit" {
                break;
            }

            let source = if trimmed.trim_end().ends_with(';') || trimmed.trim_end().ends_with('}') {
                trimmed.to_string()
            } else {
                format!("{trimmed};")
            };

            // A bad line doesn't end the session — only `run_file` propagates exit codes.
            self.run(&source);
        }

        Ok(())
    }

    fn run(&mut self, source: &str) -> RunOutcome {
        let mut diagnostics = Diagnostics::new();

        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        let mut parser = Parser::with_start_id(tokens, self.next_expr_id);
        let statements = parser.parse(&mut diagnostics);
        self.next_expr_id = parser.next_id_counter();

        if diagnostics.had_error() {
            return RunOutcome::StaticError;
        }

        let locals = Resolver::new(&mut diagnostics).resolve(&statements);

        if diagnostics.had_error() {
            return RunOutcome::StaticError;
        }

        self.interpreter.resolve(locals);

        match self.interpreter.interpret(&statements) {
            Ok(()) => RunOutcome::Ok,
            Err(err) => {
                diagnostics.runtime_error(&err);
                RunOutcome::RuntimeError
            }
        }
    }
}

// `io::Stdin::lines()` consumes the handle and hides the "0 bytes read" EOF
// signal `read_line` exposes; the REPL needs that signal to stop cleanly.
trait ReadLineInto {
    fn read_line_into(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl ReadLineInto for io::StdinLock<'_> {
    fn read_line_into(&mut self, buf: &mut String) -> io::Result<usize> {
        io::BufRead::read_line(self, buf)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .expect("logger can only be initialised once");

    let mut lox = Lox::new();

    if cli.scripts.is_empty() {
        if let Err(err) = lox.run_prompt() {
            eprintln!("{err}");
            return ExitCode::from(70);
        }
        return ExitCode::SUCCESS;
    }

    for script in &cli.scripts {
        match lox.run_file(script) {
            Ok(RunOutcome::Ok) => {}
            Ok(RunOutcome::StaticError) => return ExitCode::from(65),
            Ok(RunOutcome::RuntimeError) => return ExitCode::from(70),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::from(64);
            }
        }
    }

    ExitCode::SUCCESS
}
