/// A literal or variable reference appearing in expression position.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal: `42`.
    Number(i64),

    /// String literal: `"hello"`.
    String(String),

    /// `true` / `false`.
    Boolean(bool),

    /// A bare identifier read from the environment.
    VariableRef(String),

    /// The empty table constructor `{}`.
    Table,
}

/// Binary operators. The language only has inequality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `~=`
    NotEq,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::NotEq => write!(f, "~="),
        }
    }
}

/// Abstract Syntax Tree node.
///
/// Statements and expressions share one type; the parser decides which
/// variants may appear where, the compiler lowers each variant in exactly one
/// `match` arm.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // ───────────────────────────── Expressions ─────────────────────────────
    /// Literal value or variable read.
    ///
    /// Stack effect: `( -- x )`
    Value(Literal),

    /// `lhs ~= rhs`
    ///
    /// Stack effect: `( -- bool )`
    BinaryOperation {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },

    /// `function(args)` or `receiver.function(args)` / `receiver:function(args)`.
    ///
    /// Stack effect: `( -- result )`
    Call {
        /// Table the function is looked up in, for method-style calls.
        receiver: Option<String>,
        function: String,
        args: Vec<Node>,
    },

    /// `base[index]`
    ///
    /// Stack effect: `( -- value )`
    Index { base: String, index: Box<Node> },

    // ───────────────────────────── Statements ──────────────────────────────
    /// `[local] target = value`
    ///
    /// `target` is a `Node::Value(Literal::VariableRef(_))` or a `Node::Index`.
    Assignment {
        local: bool,
        target: Box<Node>,
        value: Box<Node>,
    },

    /// `if condition then body... end`
    IfThen {
        condition: Box<Node>,
        body: Vec<Node>,
    },

    /// `for v = start, bound do body... end`
    ///
    /// `initializer` is always a local `Assignment` to the loop variable.
    ForLoop {
        initializer: Box<Node>,
        range: Box<Node>,
        body: Vec<Node>,
    },

    /// `function name(params...) body... end`
    Function {
        name: String,
        params: Vec<String>,
        body: Vec<Node>,
    },

    /// `return value`
    Return(Box<Node>),
}

impl Node {
    /// Shorthand for a variable reference node.
    pub fn var(name: impl Into<String>) -> Node {
        Node::Value(Literal::VariableRef(name.into()))
    }

    /// Shorthand for a number literal node.
    pub fn number(n: i64) -> Node {
        Node::Value(Literal::Number(n))
    }

    /// Shorthand for a string literal node.
    pub fn string(s: impl Into<String>) -> Node {
        Node::Value(Literal::String(s.into()))
    }

    /// Short, human-readable kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Value(Literal::VariableRef(_)) => "variable",
            Node::Value(Literal::Table) => "table literal",
            Node::Value(_) => "literal",
            Node::BinaryOperation { .. } => "binary operation",
            Node::Call { .. } => "call",
            Node::Index { .. } => "index",
            Node::Assignment { .. } => "assignment",
            Node::IfThen { .. } => "if",
            Node::ForLoop { .. } => "for",
            Node::Function { .. } => "function",
            Node::Return(_) => "return",
        }
    }

    /// True for nodes that leave exactly one value on the operand stack.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::Value(_) | Node::BinaryOperation { .. } | Node::Call { .. } | Node::Index { .. }
        )
    }
}
