use crate::token::{Token, TokenType};

/// Threaded diagnostics sink. The book's Java/Python ancestors keep `hadError`
/// as a class-level static; we keep it as a plain owned value so two
/// interpreters (e.g. two `#[test]` functions) never share error state.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: bool,
    had_runtime_error: bool,
    log: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    /// Lexer/resolver errors: no specific token context.
    pub fn error(&mut self, line: i32, message: &str) {
        self.report(line, "", message);
    }

    /// Parser errors: anchored to the offending token.
    pub fn error_at(&mut self, token: &Token, message: &str) {
        if token.token_type == TokenType::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    pub fn runtime_error(&mut self, err: &RuntimeError) {
        self.had_runtime_error = true;
        let line = format!("{}\n[line {}]", err.message, err.token.line);
        log::error!("{line}");
        self.log.push(line);
    }

    fn report(&mut self, line: i32, where_: &str, message: &str) {
        let formatted = format!("[line {line}] Error{where_}: {message}");
        log::error!("{formatted}");
        self.log.push(formatted);
        self.had_error = true;
    }
}

/// A runtime fault: a type mismatch, an undefined variable, a bad call, and
/// so on. Always carries the token whose line number should be reported.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

/// Top-level error type. `Parse` is not a "real" error: by the time it is
/// returned, the diagnostic has already been pushed onto `Diagnostics` and
/// `Parse` is just the signal that tells the parser to synchronise and move
/// on to the next declaration. `Return`/`Break` are deliberately absent here —
/// they are not faults, they are ordinary control flow, modelled instead as
/// `crate::interpreter::Signal` (see DESIGN.md).
#[derive(Debug, thiserror::Error)]
pub enum LoxError {
    #[error("parse error")]
    Parse,
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
