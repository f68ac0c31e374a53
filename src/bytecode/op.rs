// =============================================================================
// OP - Bytecode instructions
// =============================================================================

/// Opcode tags. Stored in an instruction stream as `Slot::Op(op as u8)`.
///
/// Opcodes marked "operand" are followed by exactly one operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    // literals
    PushFalse = 0,
    PushTrue,
    PushNil,
    /// operand: `Slot::Number`
    PushNumber,
    /// operand: `Slot::Str`
    PushString,
    /// operand: `Slot::Name`. Pushes the name as a string value.
    PushId,
    /// operand: `Slot::Code`
    PushFunction,
    NewTable,

    // operators
    NotEqual,
    Increment,

    // stack ops
    Swap,
    Pop,

    // environment
    GetEnv,
    SetEnv,
    SetEnvGlobal,
    EnterScope,
    LeaveScope,

    // tables
    GetTable,
    SetTable,

    // control flow
    /// operand: `Slot::Target`
    Jump,
    /// operand: `Slot::Target`
    JumpIfFalse,
    Call,
    Return,
    NoOp,
}

impl Op {
    /// Every opcode, indexed by its tag.
    pub const ALL: [Op; 24] = [
        Op::PushFalse,
        Op::PushTrue,
        Op::PushNil,
        Op::PushNumber,
        Op::PushString,
        Op::PushId,
        Op::PushFunction,
        Op::NewTable,
        Op::NotEqual,
        Op::Increment,
        Op::Swap,
        Op::Pop,
        Op::GetEnv,
        Op::SetEnv,
        Op::SetEnvGlobal,
        Op::EnterScope,
        Op::LeaveScope,
        Op::GetTable,
        Op::SetTable,
        Op::Jump,
        Op::JumpIfFalse,
        Op::Call,
        Op::Return,
        Op::NoOp,
    ];

    /// True if the next slot in the stream belongs to this instruction.
    pub fn has_operand(self) -> bool {
        matches!(
            self,
            Op::PushNumber
                | Op::PushString
                | Op::PushId
                | Op::PushFunction
                | Op::Jump
                | Op::JumpIfFalse
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::PushFalse => "PUSH_FALSE",
            Op::PushTrue => "PUSH_TRUE",
            Op::PushNil => "PUSH_NIL",
            Op::PushNumber => "PUSH_NUMBER",
            Op::PushString => "PUSH_STRING",
            Op::PushId => "PUSH_ID",
            Op::PushFunction => "PUSH_FUNCTION",
            Op::NewTable => "NEW_TABLE",
            Op::NotEqual => "NOT_EQUAL",
            Op::Increment => "INCREMENT",
            Op::Swap => "SWAP",
            Op::Pop => "POP",
            Op::GetEnv => "GET_ENV",
            Op::SetEnv => "SET_ENV",
            Op::SetEnvGlobal => "SET_ENV_GLOBAL",
            Op::EnterScope => "ENTER_SCOPE",
            Op::LeaveScope => "LEAVE_SCOPE",
            Op::GetTable => "GET_TABLE",
            Op::SetTable => "SET_TABLE",
            Op::Jump => "JUMP",
            Op::JumpIfFalse => "JUMP_IF_FALSE",
            Op::Call => "CALL",
            Op::Return => "RETURN",
            Op::NoOp => "NO_OP",
        }
    }
}

impl From<Op> for u8 {
    fn from(op: Op) -> u8 {
        op as u8
    }
}

/// Decodes a tag; the unknown byte is handed back as the error.
impl TryFrom<u8> for Op {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Op::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for (i, op) in Op::ALL.iter().enumerate() {
            assert_eq!(u8::from(*op) as usize, i, "{:?} is out of place", op);
            assert_eq!(Op::try_from(i as u8), Ok(*op));
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(Op::try_from(Op::ALL.len() as u8), Err(24));
        assert_eq!(Op::try_from(255), Err(255));
    }

    #[test]
    fn test_operand_opcodes() {
        let with_operand: Vec<Op> = Op::ALL.into_iter().filter(|op| op.has_operand()).collect();
        assert_eq!(
            with_operand,
            vec![
                Op::PushNumber,
                Op::PushString,
                Op::PushId,
                Op::PushFunction,
                Op::Jump,
                Op::JumpIfFalse
            ]
        );
    }
}
