pub mod builtins;
pub mod runtime_error;
pub mod vm;
