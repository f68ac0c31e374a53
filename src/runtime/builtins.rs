//! Host functions available to every program.
//!
//! Each builtin pops its own arguments (last argument on top) and pushes
//! exactly one result, so a call always leaves one value behind.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::lang::table::{Key, Table};
use crate::lang::value::{Builtin, Callable, NativeFn, Value};
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::vm::Vm;

/// Binds `print`, `string` and `table` in the global frame.
pub fn register(vm: &mut Vm) {
    vm.define_global("print", native("print", print));
    vm.define_global(
        "string",
        library(&[("len", string_len as NativeFn), ("byte", string_byte as NativeFn)]),
    );
    vm.define_global(
        "table",
        library(&[("len", table_len as NativeFn), ("sort", table_sort as NativeFn)]),
    );
}

fn native(name: &'static str, func: NativeFn) -> Value {
    Value::Function(Callable::Native(Builtin { name, func }))
}

/// A table of builtins keyed by name, used for method-style calls.
fn library(entries: &[(&'static str, NativeFn)]) -> Value {
    let mut table = Table::new();
    for (name, func) in entries {
        table.set(Key::from(*name), native(*name, *func));
    }
    Value::Table(Rc::new(RefCell::new(table)))
}

// print(v): writes v and a newline to the output sink
fn print(vm: &mut Vm) -> Result<(), RuntimeError> {
    let value = vm.pop()?;
    writeln!(vm.output(), "{}", value).map_err(|e| RuntimeError::Output(e.to_string()))?;
    vm.push(Value::Nil);
    Ok(())
}

// string.len(s): length in bytes
fn string_len(vm: &mut Vm) -> Result<(), RuntimeError> {
    let s = vm.pop_string()?;
    vm.push(Value::Number(s.len() as i64));
    Ok(())
}

// string.byte(s, i): the character at 1-based index i, as a string; nil when
// out of range
fn string_byte(vm: &mut Vm) -> Result<(), RuntimeError> {
    let index = vm.pop_number()?;
    let s = vm.pop_string()?;
    let ch = usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| s.chars().nth(i));
    vm.push(match ch {
        Some(ch) => Value::String(ch.to_string()),
        None => Value::Nil,
    });
    Ok(())
}

// table.len(t): smallest border
fn table_len(vm: &mut Vm) -> Result<(), RuntimeError> {
    let table = vm.pop_table()?;
    let border = table.borrow().border();
    vm.push(Value::Number(border));
    Ok(())
}

// table.sort(t): sorts t[1..=border] in place
fn table_sort(vm: &mut Vm) -> Result<(), RuntimeError> {
    let table = vm.pop_table()?;
    table
        .borrow_mut()
        .sort_sequence()
        .map_err(|(left, right)| RuntimeError::Uncomparable { left, right })?;
    vm.push(Value::Nil);
    Ok(())
}
