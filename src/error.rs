// ABOUTME: Error types for parsing and evaluation failures

use crate::token::Token;
use thiserror::Error;

/// Internal stack-unwinding signal raised by the parser on a syntax error.
///
/// It carries no data: by the time `Parser::parse` returns, every error it
/// stands for has already been reported through [`crate::diagnostics::Diagnostics`].
/// Callers outside the parser never see this type.
#[derive(Debug, Error, Clone, Copy)]
#[error("parse error")]
pub(crate) struct ParseError;

/// A runtime fault raised while walking the AST: type errors, undefined
/// names, arity mismatches, and the handful of other conditions §4.5
/// enumerates all route through this one variant, carrying the offending
/// token so the diagnostic can report a line number.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError {
            token,
            message: message.into(),
        }
    }
}
