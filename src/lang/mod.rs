//! # Moonlet language data
//!
//! The AST produced by the parser and the runtime values manipulated by the
//! virtual machine.
//!
//! ## Documentation conventions
//!
//! - Stack effects are written as `( before -- after )`, top of stack at right.
//! - `{}` denotes a table value.

pub mod node;
pub mod table;
pub mod value;
