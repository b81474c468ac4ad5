mod ast;
mod config;
mod diagnostics;
mod env;
mod error;
mod eval;
mod natives;
mod parser;
mod resolver;
mod scanner;
mod token;
mod value;

use clap::Parser as ClapParser;
use config::{PROMPT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use diagnostics::Diagnostics;
use eval::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Tree-walking interpreter for Lox
#[derive(ClapParser, Debug)]
#[command(name = "lox")]
#[command(version = VERSION)]
#[command(about = "A tree-walking interpreter for Lox")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => run_prompt(),
    }
}

/// Reads a file, runs it, and maps diagnostic state to an exit code: 65 if
/// the file can't be read, 64 on a compile error, 70 on a runtime error, 0
/// otherwise.
fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("cannot read file {}: {err}", path.display());
            return ExitCode::from(65);
        }
    };

    let diagnostics = Diagnostics::new();
    let mut stdout = io::stdout();
    run_pipeline(&source, &diagnostics, &mut stdout, false);

    if diagnostics.had_error() {
        ExitCode::from(64)
    } else if diagnostics.had_runtime_error() {
        ExitCode::from(70)
    } else {
        ExitCode::from(0)
    }
}

/// Interactive REPL: reads one line at a time from stdin, clearing the
/// diagnostic flags between lines so an earlier error doesn't poison later
/// input. Per §1, this deliberately reads raw lines rather than pulling in
/// a line-editing crate — history/completion are out of scope.
fn run_prompt() -> ExitCode {
    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let diagnostics = Diagnostics::new();
    let mut stdout = io::stdout();
    let stdin = io::stdin();

    print!("{PROMPT}");
    let _ = stdout.flush();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        run_pipeline(&line, &diagnostics, &mut stdout, true);
        diagnostics.reset();

        print!("{PROMPT}");
        let _ = stdout.flush();
    }

    println!();
    ExitCode::from(0)
}

fn run_pipeline(source: &str, diagnostics: &Diagnostics, out: &mut dyn Write, repl: bool) {
    let tokens = Scanner::new(source, diagnostics).scan_tokens();
    let statements = Parser::new(tokens, diagnostics).parse();
    if diagnostics.had_error() {
        return;
    }

    let locals = Resolver::new(diagnostics).resolve(&statements);
    if diagnostics.had_error() {
        return;
    }

    let mut interpreter = Interpreter::new(diagnostics, out);
    interpreter.interpret(&statements, locals, repl);
}
