use crate::bytecode::Op;
use serde::{Deserialize, Serialize};

/// One cell of an instruction stream.
///
/// Opcodes and their inline operands share the stream. An operand slot is
/// never decoded as an opcode; the VM treats landing on one as an unknown
/// opcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    /// Opcode tag, see `Op`.
    Op(u8),
    Number(i64),
    Str(String),
    /// Identifier operand of `PushId`.
    Name(String),
    /// Absolute jump target within the same stream.
    Target(usize),
    /// Index into `ProgramBc::code`.
    Code(usize),
}

impl From<Op> for Slot {
    fn from(op: Op) -> Self {
        Slot::Op(op.into())
    }
}

/// A compiled bytecode program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramBc {
    /// Collection of code objects (instruction streams).
    /// Convention: `code[0]` is always the top-level script, every compiled
    /// function owns one further entry.
    pub code: Vec<CodeObject>,
}

impl ProgramBc {
    pub fn new() -> Self {
        Self {
            code: vec![CodeObject::new()],
        }
    }

    /// Encodes the program as a postcard image (`.mbc`).
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Decodes a postcard image produced by `to_bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

impl Default for ProgramBc {
    fn default() -> Self {
        Self::new()
    }
}

/// A single compiled instruction stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeObject {
    pub ops: Vec<Slot>,
}

impl CodeObject {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }
}
