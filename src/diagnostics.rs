// ABOUTME: Accumulates compile- and runtime-error flags and prints diagnostic records

use crate::token::{Token, TokenKind};
use std::cell::Cell;

/// Single sink for both compile-time and runtime diagnostics.
///
/// Unlike the teacher's `thread_local!` sandbox storage, this is a plain
/// struct so tests can run the pipeline repeatedly without touching global
/// state.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    /// Clears both flags; used between REPL lines.
    pub fn reset(&self) {
        self.had_error.set(false);
        self.had_runtime_error.set(false);
    }

    /// Reports a compile error tied only to a line number.
    pub fn error(&self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Reports a compile error tied to a specific token (parser/resolver use).
    pub fn token_error(&self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    fn report(&self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] error{location}: {message}");
        self.had_error.set(true);
    }

    /// Reports an uncaught runtime error.
    pub fn runtime_error(&self, token: &Token, message: &str) {
        eprintln!("[line {}] {}", token.line, message);
        self.had_runtime_error.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        let d = Diagnostics::new();
        assert!(!d.had_error());
        assert!(!d.had_runtime_error());
    }

    #[test]
    fn error_sets_flag() {
        let d = Diagnostics::new();
        d.error(3, "bad token");
        assert!(d.had_error());
        assert!(!d.had_runtime_error());
    }

    #[test]
    fn reset_clears_both_flags() {
        let d = Diagnostics::new();
        d.error(1, "x");
        let tok = Token::new(TokenKind::Eof, String::new(), None, 1);
        d.runtime_error(&tok, "y");
        d.reset();
        assert!(!d.had_error());
        assert!(!d.had_runtime_error());
    }
}
