use crate::bytecode::{Op, ProgramBc, Slot};

/// Print disassembly of a bytecode program
pub fn print_bc(bc: &ProgramBc) {
    print!("{}", disassemble_program(bc));
}

/// Disassembly of every code object, `main` first.
pub fn disassemble_program(bc: &ProgramBc) -> String {
    let mut out = String::from("=== BYTECODE PROGRAM ===\n\n");

    for (ci, code) in bc.code.iter().enumerate() {
        let label = if ci == 0 {
            "main".to_string()
        } else {
            format!("code[{}]", ci)
        };
        out.push_str("════════════════════════════════════════\n");
        out.push_str(&format!(" {}\n", label));
        out.push_str(&format!(" {} slots\n", code.ops.len()));
        out.push_str("════════════════════════════════════════\n");
        out.push_str(&disassemble_to_string(&code.ops));
        out.push('\n');
    }
    out
}

/// Return disassembly of one stream as a String
pub fn disassemble_to_string(ops: &[Slot]) -> String {
    let mut output = String::new();
    let jump_targets = collect_jump_targets(ops);

    let mut ip = 0;
    while ip < ops.len() {
        if jump_targets.contains(&ip) {
            output.push_str("      ┌──────────────────────────────────\n");
        }

        output.push_str(&format!("{:04} ", ip));

        if jump_targets.contains(&ip) {
            output.push_str("► ");
        } else {
            output.push_str("  ");
        }

        let width = match &ops[ip] {
            Slot::Op(tag) => match Op::try_from(*tag) {
                Ok(op) if op.has_operand() => {
                    output.push_str(&format_op(op, ops.get(ip + 1), ip));
                    2
                }
                Ok(op) => {
                    output.push_str(&format_op(op, None, ip));
                    1
                }
                Err(byte) => {
                    output.push_str(&format!("??          ; unknown opcode {}", byte));
                    1
                }
            },
            operand => {
                output.push_str(&format!("??          ; stray operand {:?}", operand));
                1
            }
        };
        output.push('\n');
        ip += width;
    }

    if jump_targets.contains(&ops.len()) {
        output.push_str("      ┌──────────────────────────────────\n");
        output.push_str(&format!("{:04} ► <end>\n", ops.len()));
    }

    output
}

fn collect_jump_targets(ops: &[Slot]) -> Vec<usize> {
    let mut targets = Vec::new();

    for pair in ops.windows(2) {
        let is_jump = matches!(
            pair[0],
            Slot::Op(tag) if tag == u8::from(Op::Jump) || tag == u8::from(Op::JumpIfFalse)
        );
        if let (true, Slot::Target(target)) = (is_jump, &pair[1]) {
            if !targets.contains(target) {
                targets.push(*target);
            }
        }
    }

    targets
}

fn format_op(op: Op, operand: Option<&Slot>, ip: usize) -> String {
    let name = op.mnemonic();
    match (op, operand) {
        (Op::Jump | Op::JumpIfFalse, Some(Slot::Target(target))) => {
            let direction = if *target <= ip { "↑" } else { "↓" };
            format!("{:<14} {} (→ {:04})", name, direction, target)
        }
        (_, Some(Slot::Number(n))) => format!("{:<14} {}", name, n),
        (_, Some(Slot::Str(s))) => format!("{:<14} {:?}", name, s),
        (_, Some(Slot::Name(n))) => format!("{:<14} {}", name, n),
        (_, Some(Slot::Code(c))) => format!("{:<14} code[{}]", name, c),
        (_, Some(other)) => format!("{:<14} ; bad operand {:?}", name, other),
        (_, None) if op.has_operand() => format!("{:<14} ; missing operand", name),
        (_, None) => match op {
            Op::NotEqual => format!("{:<14} ; ( a b -- bool )", name),
            Op::GetEnv => format!("{:<14} ; ( id -- value )", name),
            Op::SetEnv | Op::SetEnvGlobal => format!("{:<14} ; ( id value -- )", name),
            Op::GetTable => format!("{:<14} ; ( table key -- value )", name),
            Op::SetTable => format!("{:<14} ; ( table key value -- )", name),
            Op::Call => format!("{:<14} ; ( args... f -- result )", name),
            _ => name.to_string(),
        },
    }
}
