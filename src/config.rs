// ABOUTME: Configuration and constants for the Lox interpreter
// This module contains version info and REPL banner/prompt strings

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "Lox Interpreter";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for Lox";
pub const PROMPT: &str = "> ";
