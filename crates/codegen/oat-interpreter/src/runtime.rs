//! Native Oat runtime

use crate::memory::{Allocation, Memory};
use crate::value::Value;
use crate::InterpreterError;
use std::fmt::Write as _;

/// Run the runtime function `name`, appending anything it prints to `output`
///
/// Returns `None` if `name` is not a runtime function.
pub(crate) fn call(
    name: &str,
    args: &[Value],
    memory: &mut Memory,
    output: &mut String,
) -> Option<Result<Value, InterpreterError>> {
    let result = match name {
        "print_string" => string(name, args, 0, memory).map(|text| {
            output.push_str(&String::from_utf8_lossy(text));
            Value::Void
        }),
        "print_int" => int(name, args, 0).map(|value| {
            let _ = write!(output, "{value}");
            Value::Void
        }),
        "print_bool" => int(name, args, 0).map(|value| {
            output.push_str(if value == 0 { "false" } else { "true" });
            Value::Void
        }),
        "string_of_int" => int(name, args, 0).map(|value| {
            Value::Ptr(memory.allocate_c_string(value.to_string().as_bytes()))
        }),
        "length_of_string" => string(name, args, 0, memory).map(|text| {
            Value::Int(i64::try_from(text.len()).unwrap_or(i64::MAX))
        }),
        "string_cat" => concat(name, args, memory),
        "array_of_string" => array_of_string(name, args, memory),
        "string_of_array" => string_of_array(name, args, memory),
        _ => return None,
    };
    Some(result)
}

fn arg(function: &str, args: &[Value], index: usize) -> Result<Value, InterpreterError> {
    args.get(index)
        .copied()
        .ok_or_else(|| InterpreterError::ArityMismatch {
            function: function.to_owned(),
            expected: index + 1,
            found: args.len(),
        })
}

fn int(function: &str, args: &[Value], index: usize) -> Result<i64, InterpreterError> {
    let value = arg(function, args, index)?;
    value.as_int().ok_or(InterpreterError::TypeMismatch {
        expected: "i32".to_owned(),
        found: value.describe(),
    })
}

fn string<'m>(
    function: &str,
    args: &[Value],
    index: usize,
    memory: &'m Memory,
) -> Result<&'m [u8], InterpreterError> {
    let value = arg(function, args, index)?;
    let ptr = value.as_ptr().ok_or(InterpreterError::TypeMismatch {
        expected: "ptr".to_owned(),
        found: value.describe(),
    })?;
    memory.c_string(ptr)
}

fn concat(function: &str, args: &[Value], memory: &mut Memory) -> Result<Value, InterpreterError> {
    let mut joined = string(function, args, 0, memory)?.to_vec();
    joined.extend_from_slice(string(function, args, 1, memory)?);
    Ok(Value::Ptr(memory.allocate_c_string(&joined)))
}

/// Cell 0 holds the length, then one byte per cell
fn array_of_string(
    function: &str,
    args: &[Value],
    memory: &mut Memory,
) -> Result<Value, InterpreterError> {
    let text = string(function, args, 0, memory)?;
    let mut cells = Vec::with_capacity(text.len() + 1);
    cells.push(Value::Int(i64::try_from(text.len()).unwrap_or(i64::MAX)));
    cells.extend(text.iter().map(|&byte| Value::Int(i64::from(byte))));
    Ok(Value::Ptr(memory.allocate(Allocation::Cells(cells))))
}

/// Inverse of [`array_of_string`]
fn string_of_array(
    function: &str,
    args: &[Value],
    memory: &mut Memory,
) -> Result<Value, InterpreterError> {
    let value = arg(function, args, 0)?;
    let ptr = value.as_ptr().ok_or(InterpreterError::TypeMismatch {
        expected: "ptr".to_owned(),
        found: value.describe(),
    })?;
    let Allocation::Cells(cells) = memory.allocation(ptr)? else {
        return Err(InterpreterError::TypeMismatch {
            expected: "an int array".to_owned(),
            found: "bytes",
        });
    };
    let cells = cells.get(ptr.offset..).unwrap_or_default();
    let len = cells
        .first()
        .and_then(|cell| cell.as_int())
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    let text: Vec<u8> = cells
        .iter()
        .skip(1)
        .take(len)
        .map(|cell| cell.as_int().unwrap_or(0) as u8)
        .collect();
    Ok(Value::Ptr(memory.allocate_c_string(&text)))
}
