//! The Moonlet scripting language: a small Lua-like language compiled to a
//! flat bytecode stream and run on a stack-based virtual machine.
//!
//! Pipeline:
//!
//! 1. **Lexer** (`frontend::lexer`) turns source text into `Spanned` tokens.
//! 2. **Parser** (`frontend::parser`) builds the statement list of `Node`s.
//! 3. **Compiler** (`bytecode::compile`) lowers the AST into a `ProgramBc`,
//!    one `CodeObject` per function plus the top-level script.
//! 4. **VM** (`runtime::vm`) executes the program; builtins live in
//!    `runtime::builtins`.
//!
//! ```rust,ignore
//! use moonlet::run_source;
//! run_source("print(\"hi\")", std::io::stdout())?;
//! ```

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod runtime;

use std::io::Write;

use crate::bytecode::ProgramBc;
use crate::bytecode::compile::Compiler;
use crate::bytecode::compile_error::CompileError;
use crate::frontend::lexer::{Lexer, LexerError};
use crate::frontend::parser::Parser;
use crate::frontend::parser_error::ParserError;
use crate::lang::node::Node;
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::vm::Vm;

/// Errors from every pipeline stage, prefixed by stage when displayed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexerError),

    #[error("syntax error: {0}")]
    Syntax(#[from] ParserError),

    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A `.mbc` image that postcard could not encode or decode.
    #[error("bytecode image error: {0}")]
    Image(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse_source(source: &str) -> Result<Vec<Node>> {
    let tokens = Lexer::new(source).tokenize()?;
    log::debug!("lexed {} tokens", tokens.len());
    let program = Parser::new(tokens).parse()?;
    Ok(program)
}

pub fn compile_source(source: &str) -> Result<ProgramBc> {
    let program = parse_source(source)?;
    Ok(Compiler::new().compile_program(&program)?)
}

/// Runs a compiled program to completion, writing `print` output to
/// `output`. Returns the finished VM so callers can inspect its state.
pub fn run_program(program: ProgramBc, output: impl Write + 'static) -> Result<Vm> {
    let mut vm = Vm::with_output(program, Box::new(output));
    vm.run()?;
    Ok(vm)
}

/// Parses, compiles and runs `source`.
pub fn run_source(source: &str, output: impl Write + 'static) -> Result<Vm> {
    run_program(compile_source(source)?, output)
}
