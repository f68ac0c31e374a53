use crate::lang::node::{Literal, Node};

/// Renders a parsed program as a GraphViz `digraph`.
///
/// Every AST node becomes `nodeN[label="..."]`. Parents point at their
/// children, and consecutive statements in one list are chained left to right
/// and kept on one rank.
pub fn render(program: &[Node]) -> String {
    let mut w = DotWriter::default();
    w.lines.push("digraph Ast {".to_string());
    let statements: Vec<String> = program.iter().map(|n| w.visit(n)).collect();
    w.chain(&statements);
    w.lines.push("}".to_string());
    let mut out = w.lines.join("\n");
    out.push('\n');
    out
}

#[derive(Default)]
struct DotWriter {
    lines: Vec<String>,
    count: usize,
}

impl DotWriter {
    fn new_name(&mut self) -> String {
        self.count += 1;
        format!("node{}", self.count)
    }

    fn label(&mut self, name: &str, text: &str) {
        self.lines
            .push(format!("{}[label=\"{}\"]", name, escape(text)));
    }

    fn edge(&mut self, from: &str, to: &str) {
        self.lines.push(format!("{} -> {}", from, to));
    }

    /// Same rank plus a left-to-right edge between neighbours.
    fn chain(&mut self, names: &[String]) {
        if names.len() > 1 {
            self.lines
                .push(format!("{{ rank=same; {} }}", names.join(";")));
        }
        for pair in names.windows(2) {
            self.edge(&pair[0], &pair[1]);
        }
    }

    /// Links `parent` to the first statement of a body and chains the rest.
    fn body(&mut self, parent: &str, body: &[Node]) {
        let names: Vec<String> = body.iter().map(|n| self.visit(n)).collect();
        self.chain(&names);
        if let Some(first) = names.first() {
            self.edge(parent, first);
        }
    }

    fn visit(&mut self, node: &Node) -> String {
        let name = self.new_name();
        match node {
            Node::Value(literal) => {
                let text = match literal {
                    Literal::Number(n) => n.to_string(),
                    Literal::String(s) => s.clone(),
                    Literal::Boolean(b) => b.to_string(),
                    Literal::VariableRef(v) => v.clone(),
                    Literal::Table => "{}".to_string(),
                };
                self.label(&name, &text);
            }

            Node::BinaryOperation { op, lhs, rhs } => {
                let l = self.visit(lhs);
                let r = self.visit(rhs);
                self.label(&name, &op.to_string());
                self.edge(&name, &l);
                self.edge(&name, &r);
            }

            Node::Call {
                receiver,
                function,
                args,
            } => {
                let args: Vec<String> = args.iter().map(|a| self.visit(a)).collect();
                let text = match receiver {
                    Some(r) => format!("{}.{}()", r, function),
                    None => format!("{}()", function),
                };
                self.label(&name, &text);
                for arg in &args {
                    self.edge(&name, arg);
                }
            }

            Node::Index { base, index } => {
                let i = self.visit(index);
                self.label(&name, &format!("{}[]", base));
                self.edge(&name, &i);
            }

            Node::Assignment { target, value, .. } => {
                let t = self.visit(target);
                let v = self.visit(value);
                self.label(&name, "=");
                self.edge(&name, &t);
                self.edge(&name, &v);
            }

            Node::IfThen { condition, body } => {
                let c = self.visit(condition);
                self.label(&name, "if");
                self.edge(&name, &c);
                self.body(&name, body);
            }

            Node::ForLoop {
                initializer,
                range,
                body,
            } => {
                let i = self.visit(initializer);
                let r = self.visit(range);
                self.label(&name, "for");
                self.edge(&name, &i);
                self.edge(&name, &r);
                self.body(&name, body);
            }

            Node::Function { name: f, params, body } => {
                self.label(&name, &format!("function {}({})", f, params.join(",")));
                self.body(&name, body);
            }

            Node::Return(value) => {
                let v = self.visit(value);
                self.label(&name, "return");
                self.edge(&name, &v);
            }
        }
        name
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
