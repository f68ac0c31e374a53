/// Fatal errors raised while executing bytecode.
///
/// Execution stops at the first error; the VM state is left as it was at the
/// failing instruction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// The slot at `ip` is not a known opcode. Also raised when control lands
    /// on an operand slot.
    #[error("runtime error: unknown opcode at code[{code}] ip {ip}: {found}")]
    UnknownOpcode {
        code: usize,
        ip: usize,
        found: String,
    },

    /// An operand-carrying opcode whose next slot is missing or of the wrong
    /// kind.
    #[error("runtime error: bad operand for {op} at code[{code}] ip {ip}")]
    BadOperand {
        op: &'static str,
        code: usize,
        ip: usize,
    },

    #[error("runtime error: no code object {0}")]
    MissingCode(usize),

    #[error("runtime error: stack underflow")]
    StackUnderflow,

    #[error("runtime error: leave-scope would drop the global frame")]
    ScopeUnderflow,

    #[error("runtime error: type error: expected {expected}, got {found}")]
    Type {
        expected: &'static str,
        found: &'static str,
    },

    #[error("runtime error: integer overflow")]
    Overflow,

    #[error("runtime error: attempt to call a {found} value")]
    NotCallable { found: &'static str },

    #[error("runtime error: attempt to index a {found} value")]
    NotIndexable { found: &'static str },

    #[error("runtime error: invalid table key of type {found}")]
    InvalidKey { found: &'static str },

    #[error("runtime error: cannot compare {left} with {right}")]
    Uncomparable {
        left: &'static str,
        right: &'static str,
    },

    /// Writing to the output sink failed.
    #[error("runtime error: output: {0}")]
    Output(String),
}

impl RuntimeError {
    pub fn type_error(expected: &'static str, found: &'static str) -> Self {
        RuntimeError::Type { expected, found }
    }
}
