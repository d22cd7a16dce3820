//! Module, function and basic-block structure

use crate::{NameScope, Type, Value};

/// Index of a function within its [`Module`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

/// Index of a basic block within its [`Function`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

/// Translation unit
#[derive(Debug, Clone)]
pub struct Module {
    /// Module identifier printed in the header
    pub name: String,
    /// Constant globals, in creation order
    pub globals: Vec<Global>,
    /// Declarations and definitions, in creation order
    pub functions: Vec<Function>,
    pub(crate) symbols: NameScope,
}

impl Module {
    /// Create an empty module
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            globals: Vec::new(),
            functions: Vec::new(),
            symbols: NameScope::new(),
        }
    }

    /// Function by id
    #[must_use]
    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.0]
    }

    /// Look up a function by symbol name
    #[must_use]
    pub fn function_by_name(&self, name: &str) -> Option<(FunctionId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, function)| function.name == name)
            .map(|(idx, function)| (FunctionId(idx), function))
    }

    /// Look up a global by symbol name
    #[must_use]
    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|global| global.name == name)
    }

    /// External declarations (functions without a body)
    pub fn declarations(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|function| function.is_declaration())
    }

    /// Function definitions
    pub fn definitions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|function| !function.is_declaration())
    }
}

/// Module-level constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// Symbol name, without `@`
    pub name: String,
    /// Value type
    pub ty: Type,
    /// Constant initializer
    pub init: Value,
}

/// Callable signature plus symbol, as held by callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    /// Symbol name, without `@`
    pub name: String,
    /// Return type
    pub ret: Type,
    /// Parameter types
    pub params: Vec<Type>,
}

/// Function declaration or definition
#[derive(Debug, Clone)]
pub struct Function {
    /// Symbol name, without `@`
    pub name: String,
    /// Return type
    pub ret: Type,
    /// Parameter types
    pub params: Vec<Type>,
    /// Body; empty for an external declaration
    pub blocks: Vec<BasicBlock>,
    pub(crate) defined: bool,
    pub(crate) locals: NameScope,
}

impl Function {
    /// Whether the function is an external declaration
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        !self.defined
    }

    /// Block by id
    #[must_use]
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    /// Look up a block by label
    #[must_use]
    pub fn block_by_name(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|block| block.name == name)
            .map(BlockId)
    }

    /// Signature and symbol of this function
    #[must_use]
    pub fn reference(&self) -> FunctionRef {
        FunctionRef {
            name: self.name.clone(),
            ret: self.ret.clone(),
            params: self.params.clone(),
        }
    }
}

/// Straight-line code closed by one terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Label
    pub name: String,
    /// Instructions, in order
    pub instructions: Vec<Instruction>,
    /// Control transfer out of the block; `None` while under construction
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    /// Whether the block has its terminator
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }

    /// Blocks this one can jump to
    #[must_use]
    pub fn successors(&self) -> Vec<BlockId> {
        match &self.terminator {
            Some(Terminator::Br(target)) => vec![*target],
            Some(Terminator::CondBr {
                then_block,
                else_block,
                ..
            }) => vec![*then_block, *else_block],
            Some(Terminator::Ret(_) | Terminator::RetVoid) | None => Vec::new(),
        }
    }
}

/// Signed integer comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntPredicate {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Slt,
    /// `<=`
    Sle,
    /// `>`
    Sgt,
    /// `>=`
    Sge,
}

impl IntPredicate {
    /// Mnemonic after `icmp`
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Slt => "slt",
            Self::Sle => "sle",
            Self::Sgt => "sgt",
            Self::Sge => "sge",
        }
    }

    /// Evaluate on two integers
    #[must_use]
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Slt => lhs < rhs,
            Self::Sle => lhs <= rhs,
            Self::Sgt => lhs > rhs,
            Self::Sge => lhs >= rhs,
        }
    }
}

/// Non-terminating instruction
///
/// `result` names are local names without the `%` sigil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Stack slot of `ty`; the result is a pointer
    Alloca {
        /// Result name
        result: String,
        /// Allocated type
        ty: Type,
    },
    /// Read a `ty` through `address`
    Load {
        /// Result name
        result: String,
        /// Loaded type
        ty: Type,
        /// Pointer operand
        address: Value,
    },
    /// Write `value` through `address`
    Store {
        /// Stored value
        value: Value,
        /// Pointer operand
        address: Value,
    },
    /// Wrapping integer addition
    Add {
        /// Result name
        result: String,
        /// Left operand
        lhs: Value,
        /// Right operand
        rhs: Value,
    },
    /// Wrapping integer subtraction
    Sub {
        /// Result name
        result: String,
        /// Left operand
        lhs: Value,
        /// Right operand
        rhs: Value,
    },
    /// Integer comparison yielding `i1`
    ICmp {
        /// Result name
        result: String,
        /// Comparison
        predicate: IntPredicate,
        /// Left operand
        lhs: Value,
        /// Right operand
        rhs: Value,
    },
    /// Address arithmetic over `source`
    GetElementPtr {
        /// Result name
        result: String,
        /// Type the base pointer points to
        source: Type,
        /// Base pointer
        base: Value,
        /// Constant indices
        indices: Vec<Value>,
    },
    /// Direct call
    Call {
        /// Result name; `None` for `void` callees
        result: Option<String>,
        /// Callee
        callee: FunctionRef,
        /// Arguments, one per parameter
        args: Vec<Value>,
    },
}

/// Control transfer closing a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// `br label %target`
    Br(BlockId),
    /// `br i1 %cond, label %then, label %else`
    CondBr {
        /// `i1` condition
        cond: Value,
        /// Taken when true
        then_block: BlockId,
        /// Taken when false
        else_block: BlockId,
    },
    /// `ret <ty> <value>`
    Ret(Value),
    /// `ret void`
    RetVoid,
}
