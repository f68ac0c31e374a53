use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use super::table::Table;
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::vm::Vm;

/// Index of a code object inside a compiled program.
pub type CodeId = usize;

/// Shared, mutable table handle. Tables have reference semantics.
pub type TableRef = Rc<RefCell<Table>>;

/// Host function signature. A builtin pops its own arguments from the
/// operand stack and pushes exactly one result.
pub type NativeFn = fn(&mut Vm) -> Result<(), RuntimeError>;

/// A native function registered by the host.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: NativeFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Anything the `call` instruction can invoke.
#[derive(Debug, Clone, Copy)]
pub enum Callable {
    /// A function compiled from source; control transfers to its stream.
    Compiled(CodeId),

    /// A host function that runs directly against the operand stack.
    Native(Builtin),
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Compiled(a), Callable::Compiled(b)) => a == b,
            (Callable::Native(a), Callable::Native(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// Runtime value in the Moonlet language.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value. Produced by lookups that find nothing.
    Nil,

    Bool(bool),

    Number(i64),

    String(String),

    Table(TableRef),

    Function(Callable),
}

impl Value {
    pub fn new_table() -> Value {
        Value::Table(Rc::new(RefCell::new(Table::new())))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Function(_) => "function",
        }
    }

    /// Only `false` and `nil` are false.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Ordering used by `table.sort`. Only numbers with numbers and strings
    /// with strings are comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Strict equality: no coercion between types, tables by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Table(t) => write!(f, "table: {:p}", Rc::as_ptr(t)),
            Value::Function(Callable::Compiled(id)) => write!(f, "function: <code {}>", id),
            Value::Function(Callable::Native(b)) => write!(f, "function: builtin: {}", b.name),
        }
    }
}
