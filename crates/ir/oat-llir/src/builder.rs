//! Module construction with an insertion cursor

use crate::{
    BasicBlock, BlockId, Function, FunctionId, FunctionRef, Global, Instruction, IntPredicate,
    LlirError, Module, NameScope, Terminator, Type, Value,
};

/// Builds a [`Module`], appending instructions at a movable cursor
///
/// The cursor names a function and one of its blocks. Every instruction
/// method appends at the end of that block and fails if there is no cursor
/// or if the block already has its terminator.
#[derive(Debug)]
pub struct Builder {
    module: Module,
    cursor: Option<(FunctionId, BlockId)>,
}

impl Builder {
    /// Start building `module`
    #[must_use]
    pub fn new(module: Module) -> Self {
        Self {
            module,
            cursor: None,
        }
    }

    /// Module built so far
    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Finish building and hand back the module
    #[must_use]
    pub fn finish(self) -> Module {
        self.module
    }

    /// Add a constant global; returns a pointer to it
    pub fn add_global(&mut self, name: &str, init: Value) -> Value {
        let name = self.module.symbols.deduplicate(name);
        self.module.globals.push(Global {
            name: name.clone(),
            ty: init.ty.clone(),
            init,
        });
        Value::global(name)
    }

    /// Declare an external function
    pub fn declare_function(&mut self, name: &str, ret: Type, params: Vec<Type>) -> FunctionRef {
        let id = self.add_function(name, ret, params, false);
        self.module.function(id).reference()
    }

    /// Add a function definition with no blocks yet
    pub fn define_function(&mut self, name: &str, ret: Type, params: Vec<Type>) -> FunctionId {
        self.add_function(name, ret, params, true)
    }

    fn add_function(
        &mut self,
        name: &str,
        ret: Type,
        params: Vec<Type>,
        defined: bool,
    ) -> FunctionId {
        let name = self.module.symbols.deduplicate(name);
        let id = FunctionId(self.module.functions.len());
        self.module.functions.push(Function {
            name,
            ret,
            params,
            blocks: Vec::new(),
            defined,
            locals: NameScope::new(),
        });
        id
    }

    /// Append an empty block to `function`; a taken label gets a `.N` suffix
    ///
    /// # Errors
    ///
    /// Returns [`LlirError::NotADefinition`] if `function` is a declaration.
    pub fn append_block(&mut self, function: FunctionId, name: &str) -> Result<BlockId, LlirError> {
        let function = &mut self.module.functions[function.0];
        if !function.defined {
            return Err(LlirError::NotADefinition(function.name.clone()));
        }
        let name = function.locals.deduplicate(name);
        let id = BlockId(function.blocks.len());
        function.blocks.push(BasicBlock {
            name,
            instructions: Vec::new(),
            terminator: None,
        });
        Ok(id)
    }

    /// Append a block to the function under the cursor
    ///
    /// # Errors
    ///
    /// Returns [`LlirError::NoInsertionPoint`] if there is no cursor.
    pub fn append_block_here(&mut self, name: &str) -> Result<BlockId, LlirError> {
        let (function, _) = self.cursor.ok_or(LlirError::NoInsertionPoint)?;
        self.append_block(function, name)
    }

    /// Move the cursor to the end of `block`
    pub fn position_at_end(&mut self, function: FunctionId, block: BlockId) {
        self.cursor = Some((function, block));
    }

    /// Move the cursor to another block of the current function
    ///
    /// # Errors
    ///
    /// Returns [`LlirError::NoInsertionPoint`] if there is no cursor.
    pub fn switch_to(&mut self, block: BlockId) -> Result<(), LlirError> {
        let (function, _) = self.cursor.ok_or(LlirError::NoInsertionPoint)?;
        self.cursor = Some((function, block));
        Ok(())
    }

    /// Drop the cursor
    pub fn clear_position(&mut self) {
        self.cursor = None;
    }

    /// Function and block under the cursor
    #[must_use]
    pub fn position(&self) -> Option<(FunctionId, BlockId)> {
        self.cursor
    }

    /// Block under the cursor
    #[must_use]
    pub fn current_block(&self) -> Option<&BasicBlock> {
        let (function, block) = self.cursor?;
        Some(self.module.function(function).block(block))
    }

    /// Whether the block under the cursor already has its terminator
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.current_block().is_some_and(BasicBlock::is_terminated)
    }

    fn open_block(&mut self) -> Result<(&mut Function, BlockId), LlirError> {
        let (function, block) = self.cursor.ok_or(LlirError::NoInsertionPoint)?;
        let function = &mut self.module.functions[function.0];
        if function.blocks[block.0].is_terminated() {
            return Err(LlirError::BlockTerminated {
                function: function.name.clone(),
                block: function.blocks[block.0].name.clone(),
            });
        }
        Ok((function, block))
    }

    fn push(
        &mut self,
        name: &str,
        build: impl FnOnce(String) -> Instruction,
    ) -> Result<String, LlirError> {
        let (function, block) = self.open_block()?;
        let result = function.locals.deduplicate(name);
        function.blocks[block.0]
            .instructions
            .push(build(result.clone()));
        Ok(result)
    }

    fn terminate(&mut self, terminator: Terminator) -> Result<(), LlirError> {
        let (function, block) = self.open_block()?;
        function.blocks[block.0].terminator = Some(terminator);
        Ok(())
    }

    /// `%name = alloca ty`; returns the slot pointer
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn alloca(&mut self, ty: Type, name: &str) -> Result<Value, LlirError> {
        let result = self.push(name, |result| Instruction::Alloca { result, ty })?;
        Ok(Value::local(Type::Ptr, result))
    }

    /// `%name = load ty, ptr address`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn load(&mut self, ty: Type, address: Value, name: &str) -> Result<Value, LlirError> {
        let loaded = ty.clone();
        let result = self.push(name, |result| Instruction::Load {
            result,
            ty,
            address,
        })?;
        Ok(Value::local(loaded, result))
    }

    /// `store value, ptr address`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn store(&mut self, value: Value, address: Value) -> Result<(), LlirError> {
        let (function, block) = self.open_block()?;
        function.blocks[block.0]
            .instructions
            .push(Instruction::Store { value, address });
        Ok(())
    }

    /// `%tmp = add lhs, rhs`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn add(&mut self, lhs: Value, rhs: Value) -> Result<Value, LlirError> {
        let ty = lhs.ty.clone();
        let result = self.push("", |result| Instruction::Add { result, lhs, rhs })?;
        Ok(Value::local(ty, result))
    }

    /// `%tmp = sub lhs, rhs`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn sub(&mut self, lhs: Value, rhs: Value) -> Result<Value, LlirError> {
        let ty = lhs.ty.clone();
        let result = self.push("", |result| Instruction::Sub { result, lhs, rhs })?;
        Ok(Value::local(ty, result))
    }

    /// `%tmp = icmp <predicate> lhs, rhs`, an `i1`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn icmp_signed(
        &mut self,
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value, LlirError> {
        let result = self.push("", |result| Instruction::ICmp {
            result,
            predicate,
            lhs,
            rhs,
        })?;
        Ok(Value::local(Type::i1(), result))
    }

    /// `%tmp = getelementptr source, ptr base, indices...`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn gep(
        &mut self,
        source: Type,
        base: Value,
        indices: Vec<Value>,
    ) -> Result<Value, LlirError> {
        let result = self.push("", |result| Instruction::GetElementPtr {
            result,
            source,
            base,
            indices,
        })?;
        Ok(Value::local(Type::Ptr, result))
    }

    /// Call `callee`; returns its result unless it returns `void`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn call(
        &mut self,
        callee: &FunctionRef,
        args: Vec<Value>,
    ) -> Result<Option<Value>, LlirError> {
        if callee.ret == Type::Void {
            let (function, block) = self.open_block()?;
            function.blocks[block.0].instructions.push(Instruction::Call {
                result: None,
                callee: callee.clone(),
                args,
            });
            return Ok(None);
        }
        let result = self.push("", |result| Instruction::Call {
            result: Some(result),
            callee: callee.clone(),
            args,
        })?;
        Ok(Some(Value::local(callee.ret.clone(), result)))
    }

    /// `br label %target`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn br(&mut self, target: BlockId) -> Result<(), LlirError> {
        self.terminate(Terminator::Br(target))
    }

    /// `br i1 cond, label %then_block, label %else_block`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn cond_br(
        &mut self,
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    ) -> Result<(), LlirError> {
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        })
    }

    /// `ret ty value`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn ret(&mut self, value: Value) -> Result<(), LlirError> {
        self.terminate(Terminator::Ret(value))
    }

    /// `ret void`
    ///
    /// # Errors
    ///
    /// Fails if there is no open block under the cursor.
    pub fn ret_void(&mut self) -> Result<(), LlirError> {
        self.terminate(Terminator::RetVoid)
    }
}
