//! Block-by-block execution of IR functions

use crate::memory::{Memory, to_usize};
use crate::runtime;
use crate::value::{Pointer, Value, wrap};
use oat_llir::{BasicBlock, Function, Instruction, Module, Terminator, Type, ValueKind};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Blocks a run may enter before it is cut off
pub const DEFAULT_FUEL: u64 = 1_000_000;

/// Nested calls allowed before a run is cut off
pub const MAX_CALL_DEPTH: usize = 512;

/// Interpreter error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpreterError {
    /// Call to a function the module does not contain
    #[error("unknown function `@{0}`")]
    UnknownFunction(String),
    /// External declaration with no native implementation
    #[error("`@{0}` is declared but has no runtime implementation")]
    MissingRuntimeFunction(String),
    /// Reference to a global the module does not contain
    #[error("unknown global `@{0}`")]
    UnknownGlobal(String),
    /// Use of a local before its defining instruction ran
    #[error("undefined local `%{name}` in `@{function}`")]
    UndefinedLocal {
        /// Enclosing function
        function: String,
        /// Local name
        name: String,
    },
    /// Wrong number of arguments
    #[error("`@{function}` takes {expected} argument(s), got {found}")]
    ArityMismatch {
        /// Callee
        function: String,
        /// Parameters declared
        expected: usize,
        /// Arguments passed
        found: usize,
    },
    /// Operand of the wrong kind
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// What was found
        found: &'static str,
    },
    /// Storage requested for `void`
    #[error("cannot allocate storage for `{0}`")]
    UnsizedType(Type),
    /// Pointer to an allocation that does not exist
    #[error("dangling pointer {0:?}")]
    DanglingPointer(Pointer),
    /// Access past the end of an allocation
    #[error("access at {pointer:?} is outside an allocation of {len}")]
    OutOfBounds {
        /// Offending pointer
        pointer: Pointer,
        /// Allocation length
        len: usize,
    },
    /// String with no NUL after the pointer
    #[error("string at {0:?} has no terminator")]
    UnterminatedString(Pointer),
    /// A function with no blocks was called
    #[error("`@{0}` has no entry block")]
    EmptyFunction(String),
    /// Control reached a block with no terminator
    #[error("reached unreachable code at `{block}` in `@{function}`")]
    Unreachable {
        /// Enclosing function
        function: String,
        /// Block label
        block: String,
    },
    /// The run entered more blocks than its fuel allows
    #[error("ran out of fuel after {0} blocks")]
    OutOfFuel(u64),
    /// Calls nested deeper than [`MAX_CALL_DEPTH`]
    #[error("call depth exceeded {MAX_CALL_DEPTH}")]
    CallDepthExceeded,
}

type Frame<'m> = FxHashMap<&'m str, Value>;

/// Interpreter state for one module
///
/// Globals are materialized once in [`Interpreter::new`]; memory, captured
/// output and visit counts accumulate across calls.
pub struct Interpreter<'m> {
    module: &'m Module,
    memory: Memory,
    globals: FxHashMap<&'m str, Pointer>,
    output: String,
    visits: FxHashMap<(&'m str, &'m str), u64>,
    fuel: u64,
    fuel_limit: u64,
    depth: usize,
}

impl<'m> Interpreter<'m> {
    /// Prepare to run `module`, allocating and initializing its globals
    ///
    /// # Errors
    ///
    /// Fails if a global initializer has no storage representation.
    pub fn new(module: &'m Module) -> Result<Self, InterpreterError> {
        let mut memory = Memory::new();
        let mut globals = FxHashMap::default();
        for global in &module.globals {
            let ptr = memory.allocate_type(&global.ty)?;
            match &global.init.kind {
                ValueKind::ConstBytes(bytes) => memory.store_bytes(bytes, ptr)?,
                ValueKind::ConstInt(value) => memory.store(Value::Int(*value), ptr)?,
                ValueKind::Local(_) | ValueKind::Global(_) => {
                    return Err(InterpreterError::TypeMismatch {
                        expected: "a constant initializer".to_owned(),
                        found: "a symbol",
                    });
                }
            }
            globals.insert(global.name.as_str(), ptr);
        }
        Ok(Self {
            module,
            memory,
            globals,
            output: String::new(),
            visits: FxHashMap::default(),
            fuel: DEFAULT_FUEL,
            fuel_limit: DEFAULT_FUEL,
            depth: 0,
        })
    }

    /// Limit the number of block entries per call to [`Interpreter::call`]
    #[must_use]
    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = fuel;
        self.fuel_limit = fuel;
        self
    }

    /// Call the function `name` with `args`
    ///
    /// # Errors
    ///
    /// Returns the first [`InterpreterError`] raised during execution.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, InterpreterError> {
        self.fuel = self.fuel_limit;
        let (_, function) = self
            .module
            .function_by_name(name)
            .ok_or_else(|| InterpreterError::UnknownFunction(name.to_owned()))?;
        self.invoke(function, args)
    }

    /// Call a parameterless function
    ///
    /// # Errors
    ///
    /// Returns the first [`InterpreterError`] raised during execution.
    pub fn run(&mut self, name: &str) -> Result<Value, InterpreterError> {
        self.call(name, Vec::new())
    }

    /// Everything the runtime printed so far
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Take the captured output, leaving it empty
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// How many times `block` of `function` was entered
    #[must_use]
    pub fn visits(&self, function: &str, block: &str) -> u64 {
        self.visits.get(&(function, block)).copied().unwrap_or(0)
    }

    /// Interpreter memory
    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Address of the global `name`
    #[must_use]
    pub fn global(&self, name: &str) -> Option<Pointer> {
        self.globals.get(name).copied()
    }

    fn invoke(
        &mut self,
        function: &'m Function,
        args: Vec<Value>,
    ) -> Result<Value, InterpreterError> {
        if args.len() != function.params.len() {
            return Err(InterpreterError::ArityMismatch {
                function: function.name.clone(),
                expected: function.params.len(),
                found: args.len(),
            });
        }
        if function.is_declaration() {
            return runtime::call(&function.name, &args, &mut self.memory, &mut self.output)
                .unwrap_or_else(|| {
                    Err(InterpreterError::MissingRuntimeFunction(function.name.clone()))
                });
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(InterpreterError::CallDepthExceeded);
        }

        debug!(function = %function.name, "call");
        self.depth += 1;
        let result = self.execute(function);
        self.depth -= 1;
        result
    }

    fn execute(&mut self, function: &'m Function) -> Result<Value, InterpreterError> {
        let mut frame = Frame::default();
        let mut block = function
            .blocks
            .first()
            .ok_or_else(|| InterpreterError::EmptyFunction(function.name.clone()))?;

        loop {
            self.enter(function, block)?;
            for instruction in &block.instructions {
                self.instruction(function, &mut frame, instruction)?;
            }

            let next = match &block.terminator {
                Some(Terminator::Br(target)) => *target,
                Some(Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                }) => {
                    let cond = self.int(function, &frame, cond)?;
                    if cond == 0 { *else_block } else { *then_block }
                }
                Some(Terminator::Ret(value)) => return self.operand(function, &frame, value),
                Some(Terminator::RetVoid) => return Ok(Value::Void),
                None => {
                    return Err(InterpreterError::Unreachable {
                        function: function.name.clone(),
                        block: block.name.clone(),
                    });
                }
            };
            block = function.block(next);
        }
    }

    fn enter(
        &mut self,
        function: &'m Function,
        block: &'m BasicBlock,
    ) -> Result<(), InterpreterError> {
        if self.fuel == 0 {
            return Err(InterpreterError::OutOfFuel(self.fuel_limit));
        }
        self.fuel -= 1;
        trace!(function = %function.name, block = %block.name, "enter block");
        *self
            .visits
            .entry((function.name.as_str(), block.name.as_str()))
            .or_insert(0) += 1;
        Ok(())
    }

    fn instruction(
        &mut self,
        function: &'m Function,
        frame: &mut Frame<'m>,
        instruction: &'m Instruction,
    ) -> Result<(), InterpreterError> {
        match instruction {
            Instruction::Alloca { result, ty } => {
                let ptr = self.memory.allocate_type(ty)?;
                frame.insert(result.as_str(), Value::Ptr(ptr));
            }
            Instruction::Load {
                result,
                ty,
                address,
            } => {
                let ptr = self.pointer(function, frame, address)?;
                let value = self.memory.load(ty, ptr)?;
                frame.insert(result.as_str(), value);
            }
            Instruction::Store { value, address } => {
                let ptr = self.pointer(function, frame, address)?;
                match &value.kind {
                    ValueKind::ConstBytes(bytes) => self.memory.store_bytes(bytes, ptr)?,
                    _ => {
                        let value = self.operand(function, frame, value)?;
                        self.memory.store(value, ptr)?;
                    }
                }
            }
            Instruction::Add { result, lhs, rhs } => {
                let sum = self
                    .int(function, frame, lhs)?
                    .wrapping_add(self.int(function, frame, rhs)?);
                frame.insert(result.as_str(), Value::Int(wrap(bits(&lhs.ty), sum)));
            }
            Instruction::Sub { result, lhs, rhs } => {
                let difference = self
                    .int(function, frame, lhs)?
                    .wrapping_sub(self.int(function, frame, rhs)?);
                frame.insert(result.as_str(), Value::Int(wrap(bits(&lhs.ty), difference)));
            }
            Instruction::ICmp {
                result,
                predicate,
                lhs,
                rhs,
            } => {
                let holds = predicate.holds(
                    self.int(function, frame, lhs)?,
                    self.int(function, frame, rhs)?,
                );
                frame.insert(result.as_str(), Value::Int(i64::from(holds)));
            }
            Instruction::GetElementPtr {
                result,
                source,
                base,
                indices,
            } => {
                let base = self.pointer(function, frame, base)?;
                let mut offset = 0;
                let mut ty = source;
                for (position, index) in indices.iter().enumerate() {
                    let index = self.int(function, frame, index)?;
                    if position > 0 {
                        let Type::Array { element, .. } = ty else {
                            return Err(InterpreterError::TypeMismatch {
                                expected: "an array to index into".to_owned(),
                                found: "a scalar",
                            });
                        };
                        ty = &**element;
                    }
                    let index = usize::try_from(index).map_err(|_| InterpreterError::OutOfBounds {
                        pointer: base,
                        len: 0,
                    })?;
                    offset += index * units(ty);
                }
                frame.insert(result.as_str(), Value::Ptr(base.offset_by(offset)));
            }
            Instruction::Call {
                result,
                callee,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|arg| self.operand(function, &*frame, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let (_, target) = self
                    .module
                    .function_by_name(&callee.name)
                    .ok_or_else(|| InterpreterError::UnknownFunction(callee.name.clone()))?;
                let value = self.invoke(target, args)?;
                if let Some(result) = result {
                    frame.insert(result.as_str(), value);
                }
            }
        }
        Ok(())
    }

    fn operand(
        &self,
        function: &Function,
        frame: &Frame<'m>,
        value: &oat_llir::Value,
    ) -> Result<Value, InterpreterError> {
        match &value.kind {
            ValueKind::ConstInt(v) => Ok(Value::Int(*v)),
            ValueKind::ConstBytes(_) => Err(InterpreterError::TypeMismatch {
                expected: "a scalar operand".to_owned(),
                found: "a byte array",
            }),
            ValueKind::Local(name) => {
                frame
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| InterpreterError::UndefinedLocal {
                        function: function.name.clone(),
                        name: name.clone(),
                    })
            }
            ValueKind::Global(name) => self
                .global(name)
                .map(Value::Ptr)
                .ok_or_else(|| InterpreterError::UnknownGlobal(name.clone())),
        }
    }

    fn int(
        &self,
        function: &Function,
        frame: &Frame<'m>,
        value: &oat_llir::Value,
    ) -> Result<i64, InterpreterError> {
        let operand = self.operand(function, frame, value)?;
        operand.as_int().ok_or(InterpreterError::TypeMismatch {
            expected: value.ty.to_string(),
            found: operand.describe(),
        })
    }

    fn pointer(
        &self,
        function: &Function,
        frame: &Frame<'m>,
        value: &oat_llir::Value,
    ) -> Result<Pointer, InterpreterError> {
        let operand = self.operand(function, frame, value)?;
        operand.as_ptr().ok_or(InterpreterError::TypeMismatch {
            expected: "ptr".to_owned(),
            found: operand.describe(),
        })
    }
}

fn bits(ty: &Type) -> u32 {
    match ty {
        Type::Int(bits) => *bits,
        _ => 64,
    }
}

/// Size of `ty` in memory units: scalars take one byte or cell
fn units(ty: &Type) -> usize {
    match ty {
        Type::Array { len, element } => to_usize(*len).saturating_mul(units(element)),
        _ => 1,
    }
}
