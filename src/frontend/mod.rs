//! Source text to AST: lexing, parsing, and the diagnostic dumps built on
//! top of them.

pub mod dot;
pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod token;
pub mod token_dumper;
