use crate::lang::node::Node;

/// Errors for AST shapes the parser never produces but the compiler cannot
/// lower. Distinct from `ParserError`: these signal a broken AST contract.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    /// Left-hand side of an assignment is not a variable or index.
    #[error("compile error: cannot assign to '{node_type}'")]
    InvalidTarget { node_type: String },

    /// A `for` loop whose initializer is not `local <name> = <expr>`.
    #[error("compile error: for-loop initializer must be a local variable assignment, found '{node_type}'")]
    InvalidLoopInitializer { node_type: String },

    /// Internal compiler error (shouldn't happen in normal use)
    #[error("compile error: internal error: {0}")]
    Internal(String),
}

impl CompileError {
    pub fn invalid_target(node: &Node) -> Self {
        CompileError::InvalidTarget {
            node_type: node.kind_name().to_string(),
        }
    }

    pub fn invalid_loop_initializer(node: &Node) -> Self {
        CompileError::InvalidLoopInitializer {
            node_type: node.kind_name().to_string(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CompileError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_target_display() {
        let node = Node::Call {
            receiver: None,
            function: "f".into(),
            args: vec![],
        };
        let msg = CompileError::invalid_target(&node).to_string();
        assert!(msg.contains("cannot assign"));
        assert!(msg.contains("'call'"));
    }

    #[test]
    fn test_invalid_loop_initializer_display() {
        let msg = CompileError::invalid_loop_initializer(&Node::number(1)).to_string();
        assert!(msg.contains("for-loop initializer"));
        assert!(msg.contains("literal"));
    }

    #[test]
    fn test_internal_error_display() {
        let err = CompileError::internal("something went wrong");

        let msg = err.to_string();
        assert!(msg.contains("internal"));
        assert!(msg.contains("something went wrong"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CompileError::internal("test");
        let _: &dyn std::error::Error = &err;
    }
}
