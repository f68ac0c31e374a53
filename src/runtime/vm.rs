use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::bytecode::{Op, ProgramBc, Slot};
use crate::lang::table::Key;
use crate::lang::value::{Callable, TableRef, Value};
use crate::runtime::builtins;
use crate::runtime::runtime_error::RuntimeError;

/// One lexical environment frame.
pub type Frame = HashMap<String, Value>;

/// Where a compiled call resumes once it returns.
#[derive(Debug, Clone, Copy)]
struct CallFrame {
    return_ip: usize,
    return_code: usize,
    /// Env frame count before the callee's frame was pushed.
    env_depth: usize,
}

/// Stack-based bytecode interpreter.
///
/// Owns the program for its whole lifetime. Frame 0 of the environment stack
/// is the global frame; it holds the builtins and is never popped.
pub struct Vm {
    stack: Vec<Value>,
    frames: Vec<Frame>,
    call_stack: Vec<CallFrame>,
    program: ProgramBc,
    /// Index of the active code object.
    code: usize,
    ip: usize,
    output: Box<dyn Write>,
}

impl Vm {
    /// A VM writing `print` output to stdout.
    pub fn new(program: ProgramBc) -> Self {
        Self::with_output(program, Box::new(io::stdout()))
    }

    pub fn with_output(program: ProgramBc, output: Box<dyn Write>) -> Self {
        let mut vm = Self {
            stack: Vec::new(),
            frames: vec![Frame::new()],
            call_stack: Vec::new(),
            program,
            code: 0,
            ip: 0,
            output,
        };
        builtins::register(&mut vm);
        vm
    }

    /// Runs from the start of `code[0]` until it halts or fails.
    ///
    /// Halts when control runs off the end of the top-level stream or a
    /// `RETURN` executes with no active call.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        log::debug!("vm: running {} code objects", self.program.code.len());
        while self.step()? {}
        self.output
            .flush()
            .map_err(|e| RuntimeError::Output(e.to_string()))?;
        Ok(())
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Value bound in the global frame, nil if absent.
    pub fn global(&self, name: &str) -> Value {
        self.frames
            .first()
            .and_then(|frame| frame.get(name))
            .cloned()
            .unwrap_or(Value::Nil)
    }

    pub fn define_global(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.first_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    /// Sink used by `print`.
    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    // Execution

    /// Executes one instruction. Returns `false` once the program halts.
    fn step(&mut self) -> Result<bool, RuntimeError> {
        if self.ip >= self.ops()?.len() {
            if self.call_stack.is_empty() {
                return Ok(false);
            }
            // Compiled functions always end in RETURN; hand-built images may not.
            self.push(Value::Nil);
            return self.do_return();
        }

        let op = self.decode()?;
        let next = self.ip + if op.has_operand() { 2 } else { 1 };

        match op {
            // Literals
            Op::PushFalse => self.push(Value::Bool(false)),
            Op::PushTrue => self.push(Value::Bool(true)),
            Op::PushNil => self.push(Value::Nil),
            Op::PushNumber => match self.operand(op)? {
                Slot::Number(n) => self.push(Value::Number(n)),
                _ => return Err(self.bad_operand(op)),
            },
            Op::PushString => match self.operand(op)? {
                Slot::Str(s) => self.push(Value::String(s)),
                _ => return Err(self.bad_operand(op)),
            },
            Op::PushId => match self.operand(op)? {
                Slot::Name(name) => self.push(Value::String(name)),
                _ => return Err(self.bad_operand(op)),
            },
            Op::PushFunction => match self.operand(op)? {
                Slot::Code(code) => self.push(Value::Function(Callable::Compiled(code))),
                _ => return Err(self.bad_operand(op)),
            },
            Op::NewTable => self.push(Value::new_table()),

            // ( a b -- a~=b )
            Op::NotEqual => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(Value::Bool(a != b));
            }
            Op::Increment => {
                let n = self.pop_number()?;
                let n = n.checked_add(1).ok_or(RuntimeError::Overflow)?;
                self.push(Value::Number(n));
            }

            // Stack operations
            Op::Swap => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(b);
                self.push(a);
            }
            Op::Pop => {
                self.pop()?;
            }

            // Environment
            Op::GetEnv => {
                let name = self.pop_string()?;
                let value = self
                    .frames
                    .iter()
                    .rev()
                    .find_map(|frame| frame.get(&name))
                    .cloned()
                    .unwrap_or(Value::Nil);
                self.push(value);
            }
            Op::SetEnv => {
                let value = self.pop()?;
                let name = self.pop_string()?;
                let frame = self.frames.last_mut().ok_or(RuntimeError::ScopeUnderflow)?;
                frame.insert(name, value);
            }
            Op::SetEnvGlobal => {
                let value = self.pop()?;
                let name = self.pop_string()?;
                let frame = self.frames.first_mut().ok_or(RuntimeError::ScopeUnderflow)?;
                frame.insert(name, value);
            }
            Op::EnterScope => self.frames.push(Frame::new()),
            Op::LeaveScope => {
                if self.frames.len() <= 1 {
                    return Err(RuntimeError::ScopeUnderflow);
                }
                self.frames.pop();
            }

            // Tables
            Op::GetTable => {
                let key = self.pop()?;
                let table = self.pop_indexable()?;
                let value = match Key::from_value(&key) {
                    Some(key) => table.borrow().get(&key),
                    None => Value::Nil,
                };
                self.push(value);
            }
            Op::SetTable => {
                let value = self.pop()?;
                let key = self.pop()?;
                let table = self.pop_indexable()?;
                let key = Key::from_value(&key).ok_or(RuntimeError::InvalidKey {
                    found: key.type_name(),
                })?;
                table.borrow_mut().set(key, value);
            }

            // Control flow
            Op::Jump => {
                self.ip = self.target(op)?;
                return Ok(true);
            }
            Op::JumpIfFalse => {
                let target = self.target(op)?;
                if !self.pop()?.is_truthy() {
                    self.ip = target;
                    return Ok(true);
                }
            }
            Op::Call => return self.call(next),
            Op::Return => return self.do_return(),
            Op::NoOp => {}
        }

        self.ip = next;
        Ok(true)
    }

    fn call(&mut self, next: usize) -> Result<bool, RuntimeError> {
        match self.pop()? {
            Value::Function(Callable::Compiled(code)) => {
                if code >= self.program.code.len() {
                    return Err(RuntimeError::MissingCode(code));
                }
                log::trace!(
                    "call code[{}] from code[{}] ip {} (depth {})",
                    code,
                    self.code,
                    self.ip,
                    self.call_stack.len() + 1
                );
                self.call_stack.push(CallFrame {
                    return_ip: next,
                    return_code: self.code,
                    env_depth: self.frames.len(),
                });
                self.frames.push(Frame::new());
                self.code = code;
                // The callee stream starts with NO_OP, so no advance here.
                self.ip = 0;
            }
            Value::Function(Callable::Native(builtin)) => {
                log::trace!("call builtin {}", builtin.name);
                (builtin.func)(self)?;
                self.ip = next;
            }
            other => {
                return Err(RuntimeError::NotCallable {
                    found: other.type_name(),
                });
            }
        }
        Ok(true)
    }

    fn do_return(&mut self) -> Result<bool, RuntimeError> {
        let value = self.pop()?;
        let Some(frame) = self.call_stack.pop() else {
            log::trace!("return at top level, halting");
            return Ok(false);
        };
        log::trace!(
            "return from code[{}] to code[{}] ip {}",
            self.code,
            frame.return_code,
            frame.return_ip
        );
        self.frames.truncate(frame.env_depth);
        self.code = frame.return_code;
        self.ip = frame.return_ip;
        self.push(value);
        Ok(true)
    }

    // Decoding

    fn ops(&self) -> Result<&[Slot], RuntimeError> {
        self.program
            .code
            .get(self.code)
            .map(|c| c.ops.as_slice())
            .ok_or(RuntimeError::MissingCode(self.code))
    }

    fn decode(&self) -> Result<Op, RuntimeError> {
        let unknown = |found: String| RuntimeError::UnknownOpcode {
            code: self.code,
            ip: self.ip,
            found,
        };
        match self.ops()?.get(self.ip) {
            Some(Slot::Op(tag)) => Op::try_from(*tag).map_err(|byte| unknown(format!("tag {}", byte))),
            Some(other) => Err(unknown(format!("operand slot {:?}", other))),
            None => Err(unknown("end of stream".to_string())),
        }
    }

    fn operand(&self, op: Op) -> Result<Slot, RuntimeError> {
        self.ops()?
            .get(self.ip + 1)
            .cloned()
            .ok_or_else(|| self.bad_operand(op))
    }

    fn target(&self, op: Op) -> Result<usize, RuntimeError> {
        match self.operand(op)? {
            Slot::Target(target) => Ok(target),
            _ => Err(self.bad_operand(op)),
        }
    }

    fn bad_operand(&self, op: Op) -> RuntimeError {
        RuntimeError::BadOperand {
            op: op.mnemonic(),
            code: self.code,
            ip: self.ip,
        }
    }

    // Stack operations

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn pop_number(&mut self) -> Result<i64, RuntimeError> {
        match self.pop()? {
            Value::Number(n) => Ok(n),
            other => Err(RuntimeError::type_error("number", other.type_name())),
        }
    }

    pub fn pop_string(&mut self) -> Result<String, RuntimeError> {
        match self.pop()? {
            Value::String(s) => Ok(s),
            other => Err(RuntimeError::type_error("string", other.type_name())),
        }
    }

    pub fn pop_table(&mut self) -> Result<TableRef, RuntimeError> {
        match self.pop()? {
            Value::Table(t) => Ok(t),
            other => Err(RuntimeError::type_error("table", other.type_name())),
        }
    }

    fn pop_indexable(&mut self) -> Result<TableRef, RuntimeError> {
        match self.pop()? {
            Value::Table(t) => Ok(t),
            other => Err(RuntimeError::NotIndexable {
                found: other.type_name(),
            }),
        }
    }
}

/// Cloneable in-memory sink. Every clone appends to the same buffer, so a
/// caller can keep one handle and give the other to `Vm::with_output`.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::CodeObject;

    // ============================================================
    // Test Helpers
    // ============================================================

    fn op(op: Op) -> Slot {
        Slot::from(op)
    }

    fn num(n: i64) -> Vec<Slot> {
        vec![op(Op::PushNumber), Slot::Number(n)]
    }

    fn id(name: &str) -> Vec<Slot> {
        vec![op(Op::PushId), Slot::Name(name.into())]
    }

    /// Create a program from main ops plus function bodies (`code[1..]`)
    fn program(main: Vec<Slot>, functions: Vec<Vec<Slot>>) -> ProgramBc {
        let mut code = vec![CodeObject { ops: main }];
        code.extend(functions.into_iter().map(|ops| CodeObject { ops }));
        ProgramBc { code }
    }

    fn run_vm(main: Vec<Slot>, functions: Vec<Vec<Slot>>) -> Result<Vm, RuntimeError> {
        let mut vm = Vm::with_output(program(main, functions), Box::new(SharedBuffer::new()));
        vm.run()?;
        Ok(vm)
    }

    /// Run ops and return the resulting stack
    fn run_ops(ops: Vec<Slot>) -> Result<Vec<Value>, RuntimeError> {
        Ok(run_vm(ops, vec![])?.stack().to_vec())
    }

    /// Assert stack contains expected values
    fn assert_stack(ops: Vec<Slot>, expected: Vec<Value>) {
        let stack = run_ops(ops).expect("execution should succeed");
        assert_eq!(stack, expected, "stack mismatch");
    }

    /// Assert execution produces an error containing the given substring
    fn assert_error(ops: Vec<Slot>, error_contains: &str) {
        match run_ops(ops) {
            Ok(stack) => panic!(
                "expected error containing '{}', got stack: {:?}",
                error_contains, stack
            ),
            Err(e) => assert!(
                e.to_string().contains(error_contains),
                "expected error containing '{}', got: {}",
                error_contains,
                e
            ),
        }
    }

    fn concat(parts: Vec<Vec<Slot>>) -> Vec<Slot> {
        parts.into_iter().flatten().collect()
    }

    // ============================================================
    // Literals and stack
    // ============================================================

    #[test]
    fn test_push_literals() {
        assert_stack(
            concat(vec![
                vec![op(Op::PushTrue), op(Op::PushFalse), op(Op::PushNil)],
                num(42),
                vec![op(Op::PushString), Slot::Str("hi".into())],
            ]),
            vec![
                Value::Bool(true),
                Value::Bool(false),
                Value::Nil,
                Value::Number(42),
                Value::from("hi"),
            ],
        );
    }

    #[test]
    fn test_push_id_pushes_name_as_string() {
        assert_stack(id("x"), vec![Value::from("x")]);
    }

    #[test]
    fn test_swap_and_pop() {
        assert_stack(
            concat(vec![num(1), num(2), vec![op(Op::Swap)]]),
            vec![Value::Number(2), Value::Number(1)],
        );
        assert_stack(concat(vec![num(1), num(2), vec![op(Op::Pop)]]), vec![Value::Number(1)]);
    }

    #[test]
    fn test_underflow() {
        assert_error(vec![op(Op::Pop)], "stack underflow");
        assert_error(concat(vec![num(1), vec![op(Op::Swap)]]), "stack underflow");
    }

    #[test]
    fn test_no_op() {
        assert_stack(vec![op(Op::NoOp), op(Op::NoOp)], vec![]);
    }

    // ============================================================
    // Operators
    // ============================================================

    #[test]
    fn test_not_equal_is_strict() {
        assert_stack(
            concat(vec![num(1), vec![op(Op::PushString), Slot::Str("1".into())], vec![op(Op::NotEqual)]]),
            vec![Value::Bool(true)],
        );
        assert_stack(
            concat(vec![num(3), num(3), vec![op(Op::NotEqual)]]),
            vec![Value::Bool(false)],
        );
        assert_stack(
            vec![op(Op::PushNil), op(Op::PushFalse), op(Op::NotEqual)],
            vec![Value::Bool(true)],
        );
    }

    #[test]
    fn test_not_equal_tables_by_identity() {
        assert_stack(
            vec![op(Op::NewTable), op(Op::NewTable), op(Op::NotEqual)],
            vec![Value::Bool(true)],
        );
        // t ~= t
        assert_stack(
            concat(vec![
                id("t"),
                vec![op(Op::NewTable), op(Op::SetEnvGlobal)],
                id("t"),
                vec![op(Op::GetEnv)],
                id("t"),
                vec![op(Op::GetEnv), op(Op::NotEqual)],
            ]),
            vec![Value::Bool(false)],
        );
    }

    #[test]
    fn test_increment() {
        assert_stack(concat(vec![num(41), vec![op(Op::Increment)]]), vec![Value::Number(42)]);
    }

    #[test]
    fn test_increment_type_error() {
        assert_error(
            vec![op(Op::PushTrue), op(Op::Increment)],
            "expected number, got boolean",
        );
    }

    #[test]
    fn test_increment_overflow() {
        assert_error(concat(vec![num(i64::MAX), vec![op(Op::Increment)]]), "overflow");
    }

    // ============================================================
    // Environment
    // ============================================================

    #[test]
    fn test_get_env_absent_is_nil() {
        assert_stack(concat(vec![id("nope"), vec![op(Op::GetEnv)]]), vec![Value::Nil]);
    }

    #[test]
    fn test_set_then_get_env() {
        assert_stack(
            concat(vec![id("x"), num(7), vec![op(Op::SetEnv)], id("x"), vec![op(Op::GetEnv)]]),
            vec![Value::Number(7)],
        );
    }

    #[test]
    fn test_set_env_requires_string_name() {
        assert_error(
            concat(vec![num(1), num(2), vec![op(Op::SetEnv)]]),
            "expected string, got number",
        );
    }

    #[test]
    fn test_scope_frame_is_discarded() {
        let vm = run_vm(
            concat(vec![
                vec![op(Op::EnterScope)],
                id("a"),
                num(1),
                vec![op(Op::SetEnv)],
                id("b"),
                num(2),
                vec![op(Op::SetEnvGlobal)],
                id("a"),
                vec![op(Op::GetEnv)],
                vec![op(Op::LeaveScope)],
            ]),
            vec![],
        )
        .unwrap();
        assert_eq!(vm.stack(), &[Value::Number(1)]);
        assert_eq!(vm.global("a"), Value::Nil);
        assert_eq!(vm.global("b"), Value::Number(2));
    }

    #[test]
    fn test_inner_frame_shadows_outer() {
        assert_stack(
            concat(vec![
                id("x"),
                num(1),
                vec![op(Op::SetEnv), op(Op::EnterScope)],
                id("x"),
                num(2),
                vec![op(Op::SetEnv)],
                id("x"),
                vec![op(Op::GetEnv), op(Op::LeaveScope)],
                id("x"),
                vec![op(Op::GetEnv)],
            ]),
            vec![Value::Number(2), Value::Number(1)],
        );
    }

    #[test]
    fn test_leave_global_scope_is_error() {
        assert_error(vec![op(Op::LeaveScope)], "global frame");
    }

    #[test]
    fn test_builtins_are_globals() {
        let vm = run_vm(vec![], vec![]).unwrap();
        assert!(matches!(vm.global("print"), Value::Function(Callable::Native(_))));
        assert!(matches!(vm.global("string"), Value::Table(_)));
        assert!(matches!(vm.global("table"), Value::Table(_)));
    }

    // ============================================================
    // Tables
    // ============================================================

    fn with_table(rest: Vec<Vec<Slot>>) -> Vec<Slot> {
        let mut parts = vec![id("t"), vec![op(Op::NewTable), op(Op::SetEnvGlobal)]];
        parts.extend(rest);
        concat(parts)
    }

    fn get_t() -> Vec<Slot> {
        concat(vec![id("t"), vec![op(Op::GetEnv)]])
    }

    #[test]
    fn test_set_and_get_table() {
        assert_stack(
            with_table(vec![
                get_t(),
                num(1),
                vec![op(Op::PushString), Slot::Str("a".into()), op(Op::SetTable)],
                get_t(),
                num(1),
                vec![op(Op::GetTable)],
            ]),
            vec![Value::from("a")],
        );
    }

    #[test]
    fn test_get_table_miss_is_nil() {
        assert_stack(
            with_table(vec![get_t(), id("missing"), vec![op(Op::GetTable)]]),
            vec![Value::Nil],
        );
    }

    #[test]
    fn test_get_table_invalid_key_is_nil() {
        assert_stack(
            with_table(vec![get_t(), vec![op(Op::PushTrue), op(Op::GetTable)]]),
            vec![Value::Nil],
        );
    }

    #[test]
    fn test_set_table_invalid_key() {
        assert_error(
            with_table(vec![get_t(), vec![op(Op::PushNil), op(Op::PushTrue), op(Op::SetTable)]]),
            "invalid table key of type nil",
        );
    }

    #[test]
    fn test_index_non_table() {
        assert_error(
            concat(vec![num(1), num(1), vec![op(Op::GetTable)]]),
            "attempt to index a number value",
        );
    }

    // ============================================================
    // Control flow
    // ============================================================

    #[test]
    fn test_jump_skips_code() {
        assert_stack(
            concat(vec![
                vec![op(Op::Jump), Slot::Target(4)],
                num(1),
                num(2),
            ]),
            vec![Value::Number(2)],
        );
    }

    #[test]
    fn test_jump_if_false_truthiness() {
        // nil and false jump, everything else falls through
        for (cond, jumps) in [
            (vec![op(Op::PushNil)], true),
            (vec![op(Op::PushFalse)], true),
            (vec![op(Op::PushTrue)], false),
            (num(0), false),
            (vec![op(Op::PushString), Slot::Str(String::new())], false),
        ] {
            let len = cond.len();
            let ops = concat(vec![
                cond,
                vec![op(Op::JumpIfFalse), Slot::Target(len + 4)],
                num(1),
            ]);
            let expected = if jumps { vec![] } else { vec![Value::Number(1)] };
            assert_stack(ops, expected);
        }
    }

    #[test]
    fn test_unknown_opcode() {
        assert_error(vec![Slot::Op(99)], "unknown opcode at code[0] ip 0: tag 99");
    }

    #[test]
    fn test_landing_on_operand_is_unknown_opcode() {
        assert_error(
            concat(vec![vec![op(Op::Jump), Slot::Target(3)], num(5)]),
            "unknown opcode at code[0] ip 3: operand slot Number(5)",
        );
    }

    #[test]
    fn test_bad_operand() {
        assert_error(vec![op(Op::PushNumber), Slot::Str("x".into())], "bad operand for PUSH_NUMBER");
        assert_error(vec![op(Op::Jump)], "bad operand for JUMP");
    }

    // ============================================================
    // Calls
    // ============================================================

    #[test]
    fn test_call_compiled_function() {
        let f = concat(vec![vec![op(Op::NoOp)], num(7), vec![op(Op::Return)]]);
        let main = vec![op(Op::PushFunction), Slot::Code(1), op(Op::Call)];
        let vm = run_vm(main, vec![f]).unwrap();
        assert_eq!(vm.stack(), &[Value::Number(7)]);
    }

    #[test]
    fn test_call_binds_params_and_drops_frame() {
        // function f(a) return a end; f(9)
        let f = concat(vec![
            vec![op(Op::NoOp)],
            id("a"),
            vec![op(Op::Swap), op(Op::SetEnv)],
            id("a"),
            vec![op(Op::GetEnv), op(Op::Return)],
        ]);
        let main = concat(vec![num(9), vec![op(Op::PushFunction), Slot::Code(1), op(Op::Call)]]);
        let vm = run_vm(main, vec![f]).unwrap();
        assert_eq!(vm.stack(), &[Value::Number(9)]);
        assert_eq!(vm.global("a"), Value::Nil);
    }

    #[test]
    fn test_return_drops_loop_frames_inside_function() {
        let f = concat(vec![
            vec![op(Op::NoOp), op(Op::EnterScope), op(Op::EnterScope)],
            num(1),
            vec![op(Op::Return)],
        ]);
        let main = concat(vec![
            vec![op(Op::PushFunction), Slot::Code(1), op(Op::Call), op(Op::Pop)],
            // leaving here would fail if the callee's frames leaked
            vec![op(Op::EnterScope), op(Op::LeaveScope)],
        ]);
        let vm = run_vm(main, vec![f]).unwrap();
        assert!(vm.stack().is_empty());
        assert_eq!(vm.frames.len(), 1);
    }

    #[test]
    fn test_running_off_function_end_returns_nil() {
        let main = vec![op(Op::PushFunction), Slot::Code(1), op(Op::Call)];
        let vm = run_vm(main, vec![vec![op(Op::NoOp)]]).unwrap();
        assert_eq!(vm.stack(), &[Value::Nil]);
    }

    #[test]
    fn test_top_level_return_halts() {
        let vm = run_vm(
            concat(vec![num(1), vec![op(Op::Return)], id("x"), num(2), vec![op(Op::SetEnvGlobal)]]),
            vec![],
        )
        .unwrap();
        assert!(vm.stack().is_empty());
        assert_eq!(vm.global("x"), Value::Nil);
    }

    #[test]
    fn test_call_non_callable() {
        assert_error(concat(vec![num(3), vec![op(Op::Call)]]), "attempt to call a number value");
    }

    #[test]
    fn test_call_missing_code() {
        assert_error(vec![op(Op::PushFunction), Slot::Code(4), op(Op::Call)], "no code object 4");
    }

    #[test]
    fn test_call_native_print() {
        let out = SharedBuffer::new();
        let main = concat(vec![num(5), id("print"), vec![op(Op::GetEnv), op(Op::Call)]]);
        let mut vm = Vm::with_output(program(main, vec![]), Box::new(out.clone()));
        vm.run().unwrap();
        assert_eq!(out.contents(), "5\n");
        assert_eq!(vm.stack(), &[Value::Nil]);
    }
}
