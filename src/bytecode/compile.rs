use std::collections::HashSet;

use crate::{
    bytecode::{CodeObject, Op, ProgramBc, Slot, compile_error::CompileError},
    lang::node::{Literal, Node},
};

/// Single-pass AST to bytecode compiler.
///
/// Each function body is lowered into its own `CodeObject`; the top-level
/// script always lands in `code[0]`. Jumps use absolute targets that are
/// patched once the jumped-over code has been emitted.
pub struct Compiler {
    /// Output bytecode program
    program_bc: ProgramBc,

    /// Names declared `local`, one set per open function or loop scope.
    /// Index 0 is the top level and is never popped.
    scopes: Vec<HashSet<String>>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            program_bc: ProgramBc::new(),
            scopes: vec![HashSet::new()],
        }
    }

    pub fn compile_program(mut self, program: &[Node]) -> Result<ProgramBc, CompileError> {
        let main_ops = self.compile_nodes(program)?;
        log::debug!(
            "compiled main: {} slots, {} code objects",
            main_ops.len(),
            self.program_bc.code.len()
        );
        self.program_bc.code[0].ops = main_ops;
        Ok(self.program_bc)
    }

    /// Compiles a statement list into a fresh stream.
    pub fn compile_nodes(&mut self, nodes: &[Node]) -> Result<Vec<Slot>, CompileError> {
        let mut ops = Vec::new();
        self.compile_block(nodes, &mut ops)?;
        Ok(ops)
    }

    fn compile_block(&mut self, nodes: &[Node], ops: &mut Vec<Slot>) -> Result<(), CompileError> {
        for node in nodes {
            self.compile_node(node, ops)?;
            // Expression statements leave one value behind.
            if node.is_expression() {
                emit(ops, Op::Pop);
            }
        }
        Ok(())
    }

    fn compile_node(&mut self, node: &Node, ops: &mut Vec<Slot>) -> Result<(), CompileError> {
        match node {
            Node::Value(literal) => match literal {
                Literal::Number(n) => {
                    emit(ops, Op::PushNumber);
                    ops.push(Slot::Number(*n));
                }
                Literal::String(s) => {
                    emit(ops, Op::PushString);
                    ops.push(Slot::Str(s.clone()));
                }
                Literal::Boolean(true) => emit(ops, Op::PushTrue),
                Literal::Boolean(false) => emit(ops, Op::PushFalse),
                Literal::VariableRef(name) => {
                    emit_id(ops, name);
                    emit(ops, Op::GetEnv);
                }
                Literal::Table => emit(ops, Op::NewTable),
            },

            Node::BinaryOperation { lhs, rhs, .. } => {
                self.compile_node(lhs, ops)?;
                self.compile_node(rhs, ops)?;
                emit(ops, Op::NotEqual);
            }

            // ( args... -- result )
            Node::Call {
                receiver,
                function,
                args,
            } => {
                for arg in args {
                    self.compile_node(arg, ops)?;
                }
                match receiver {
                    Some(receiver) => {
                        emit_id(ops, receiver);
                        emit(ops, Op::GetEnv);
                        emit_id(ops, function);
                        emit(ops, Op::GetTable);
                    }
                    None => {
                        emit_id(ops, function);
                        emit(ops, Op::GetEnv);
                    }
                }
                emit(ops, Op::Call);
            }

            Node::Index { base, index } => {
                emit_id(ops, base);
                emit(ops, Op::GetEnv);
                self.compile_node(index, ops)?;
                emit(ops, Op::GetTable);
            }

            Node::Assignment {
                local,
                target,
                value,
            } => match target.as_ref() {
                Node::Value(Literal::VariableRef(name)) => {
                    if *local {
                        self.declare(name)?;
                    }
                    emit_id(ops, name);
                    self.compile_node(value, ops)?;
                    emit(ops, self.set_op(name));
                }
                Node::Index { base, index } if !*local => {
                    emit_id(ops, base);
                    emit(ops, Op::GetEnv);
                    self.compile_node(index, ops)?;
                    self.compile_node(value, ops)?;
                    emit(ops, Op::SetTable);
                }
                other => return Err(CompileError::invalid_target(other)),
            },

            Node::IfThen { condition, body } => {
                self.compile_node(condition, ops)?;
                let exit = emit_jump(ops, Op::JumpIfFalse);
                self.compile_block(body, ops)?;
                patch_jump(ops, exit);
            }

            Node::ForLoop {
                initializer,
                range,
                body,
            } => self.compile_for(initializer, range, body, ops)?,

            Node::Function { name, params, body } => {
                let code_id = self.compile_function(name, params, body)?;
                emit_id(ops, name);
                emit(ops, Op::PushFunction);
                ops.push(Slot::Code(code_id));
                emit(ops, self.set_op(name));
            }

            Node::Return(value) => {
                self.compile_node(value, ops)?;
                emit(ops, Op::Return);
            }
        }
        Ok(())
    }

    /// ```text
    ///       ENTER_SCOPE
    ///       <initializer>
    /// head: PUSH_ID v; GET_ENV; <range>; NOT_EQUAL; JUMP_IF_FALSE exit
    ///       <body>
    ///       PUSH_ID v; GET_ENV; INCREMENT; PUSH_ID v; SWAP; SET_ENV
    ///       JUMP head
    /// exit: LEAVE_SCOPE
    /// ```
    ///
    /// The loop runs while `v ~= bound`, so the bound itself is excluded.
    fn compile_for(
        &mut self,
        initializer: &Node,
        range: &Node,
        body: &[Node],
        ops: &mut Vec<Slot>,
    ) -> Result<(), CompileError> {
        let var = match initializer {
            Node::Assignment {
                local: true,
                target,
                ..
            } => match target.as_ref() {
                Node::Value(Literal::VariableRef(name)) => name,
                _ => return Err(CompileError::invalid_loop_initializer(initializer)),
            },
            _ => return Err(CompileError::invalid_loop_initializer(initializer)),
        };

        self.scopes.push(HashSet::new());
        emit(ops, Op::EnterScope);
        self.compile_node(initializer, ops)?;

        let head = ops.len();
        emit_id(ops, var);
        emit(ops, Op::GetEnv);
        self.compile_node(range, ops)?;
        emit(ops, Op::NotEqual);
        let exit = emit_jump(ops, Op::JumpIfFalse);

        self.compile_block(body, ops)?;

        emit_id(ops, var);
        emit(ops, Op::GetEnv);
        emit(ops, Op::Increment);
        emit_id(ops, var);
        emit(ops, Op::Swap);
        emit(ops, Op::SetEnv);

        emit(ops, Op::Jump);
        ops.push(Slot::Target(head));

        patch_jump(ops, exit);
        emit(ops, Op::LeaveScope);
        self.scopes.pop();
        Ok(())
    }

    /// Lowers a function body into a new code object and returns its index.
    ///
    /// The stream starts with `NO_OP` so a call can jump to ip 0 without
    /// skipping real work, then binds parameters from the operand stack (last
    /// argument on top).
    fn compile_function(
        &mut self,
        name: &str,
        params: &[String],
        body: &[Node],
    ) -> Result<usize, CompileError> {
        // Reserve the slot first so nested functions get later indices.
        let code_id = self.program_bc.code.len();
        self.program_bc.code.push(CodeObject::new());
        self.scopes.push(params.iter().cloned().collect());

        let mut ops = Vec::new();
        emit(&mut ops, Op::NoOp);
        for param in params.iter().rev() {
            emit_id(&mut ops, param);
            emit(&mut ops, Op::Swap);
            emit(&mut ops, Op::SetEnv);
        }

        self.compile_block(body, &mut ops)?;
        if !matches!(body.last(), Some(Node::Return(_))) {
            emit(&mut ops, Op::PushNil);
            emit(&mut ops, Op::Return);
        }

        self.scopes.pop();
        log::debug!(
            "compiled function '{}' as code[{}]: {} slots",
            name,
            code_id,
            ops.len()
        );
        self.program_bc.code[code_id].ops = ops;
        Ok(code_id)
    }

    fn declare(&mut self, name: &str) -> Result<(), CompileError> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| CompileError::internal("no open scope"))?;
        scope.insert(name.to_string());
        Ok(())
    }

    /// `SET_ENV` if `name` was declared local in any open scope, else
    /// `SET_ENV_GLOBAL`.
    fn set_op(&self, name: &str) -> Op {
        if self.scopes.iter().rev().any(|scope| scope.contains(name)) {
            Op::SetEnv
        } else {
            Op::SetEnvGlobal
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn emit(ops: &mut Vec<Slot>, op: Op) {
    ops.push(Slot::from(op));
}

fn emit_id(ops: &mut Vec<Slot>, name: &str) {
    emit(ops, Op::PushId);
    ops.push(Slot::Name(name.to_string()));
}

/// Emits `op` with a placeholder target and returns the operand position.
fn emit_jump(ops: &mut Vec<Slot>, op: Op) -> usize {
    emit(ops, op);
    ops.push(Slot::Target(0));
    ops.len() - 1
}

/// Points the jump operand at `at` to the next slot to be emitted.
fn patch_jump(ops: &mut [Slot], at: usize) {
    let target = ops.len();
    ops[at] = Slot::Target(target);
}
