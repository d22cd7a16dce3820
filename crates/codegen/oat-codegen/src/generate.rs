//! Entry point and per-node dispatch

use crate::CodegenError;
use crate::context::{Binding, GenContext};
use crate::runtime::declare_runtime_functions;
use oat_llir::{Module, Type, Value};
use oat_syntax::{Ast, NodeId, NodeKind, ValueType};
use tracing::{debug, info, trace};

/// Lower an analyzed tree into an IR module named `module_name`
///
/// The runtime functions are declared first; the tree is then walked once,
/// depth first. `ast` must have been through semantic analysis: identifiers
/// are looked up by their unique names.
///
/// # Errors
///
/// Returns a [`CodegenError`] for the first construct with no lowering rule
/// or for a malformed tree.
pub fn generate(ast: &Ast, module_name: &str) -> Result<Module, CodegenError> {
    let mut ctx = GenContext::new(module_name);
    declare_runtime_functions(&mut ctx);
    Generator {
        ast,
        ctx: &mut ctx,
    }
    .generate(ast.root())?;

    let module = ctx.finish();
    info!(
        functions = module.definitions().count(),
        globals = module.globals.len(),
        "code generation finished"
    );
    Ok(module)
}

pub(crate) struct Generator<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) ctx: &'a mut GenContext,
}

impl Generator<'_> {
    /// Lower one node in statement position
    pub(crate) fn generate(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let kind = self.ast.kind(id);
        trace!(node = self.ast.node(id).index, %kind, "generate");
        if is_statement(kind) {
            self.reopen_after_terminator()?;
        }

        match kind {
            NodeKind::GlobalDecl => self.global(id),
            NodeKind::FuncDecl => self.function(id),
            NodeKind::VarDecl => self.local(id),
            NodeKind::FuncCall => self.call(id).map(drop),
            NodeKind::Return => self.return_statement(id),
            NodeKind::Assign => self.assign(id),
            NodeKind::If => self.if_statement(id),
            NodeKind::For => self.for_loop(id),
            NodeKind::While => self.while_loop(id),
            _ => self.children(id),
        }
    }

    /// Code after a `return` goes into a fresh block with no predecessors
    fn reopen_after_terminator(&mut self) -> Result<(), CodegenError> {
        if self.ctx.builder.is_terminated() {
            let block = self.ctx.builder.append_block_here("after_return")?;
            self.ctx.builder.switch_to(block)?;
        }
        Ok(())
    }

    pub(crate) fn children(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let ast = self.ast;
        for &child in ast.children(id) {
            self.generate(child)?;
        }
        Ok(())
    }

    pub(crate) fn index(&self, id: NodeId) -> u32 {
        self.ast.node(id).index
    }

    /// `[identifier, literal]` → `@unique = private constant <ty> <literal>`
    fn global(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let name = self.ast.child(id, 0, "declared identifier")?;
        let init = self.ast.child(id, 1, "initializer")?;

        let init_kind = self.ast.kind(init);
        if !init_kind.is_literal() {
            return Err(CodegenError::NonConstantInitializer {
                kind: init_kind,
                node: self.index(init),
            });
        }
        let unique = &self.ast.node(name).unique_name;
        if self.ctx.has_storage(unique) {
            return Err(CodegenError::DuplicateGlobal {
                name: unique.clone(),
                node: self.index(name),
            });
        }
        let value = self.literal(init)?;
        let ty = value.ty.clone();

        let address = self.ctx.builder.add_global(unique, value);
        debug!(name = %unique, %ty, "global");
        self.ctx.bind(unique.clone(), Binding::Slot { address, ty });
        Ok(())
    }

    /// `[return type, name, body...]` → `define <ret> @name()` with an `entry` block
    ///
    /// Returns are never synthesized, with one exception: a `void` function
    /// whose last block is still open is closed with `ret void`.
    fn function(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let ret_node = self.ast.child(id, 0, "return type")?;
        let name_node = self.ast.child(id, 1, "function name")?;

        // strings are stack arrays sized by their literal; none can be returned
        let ret = match self.ast.node(ret_node).ty {
            ValueType::Int | ValueType::Bool => Type::i32(),
            ValueType::Void => Type::Void,
            ty => {
                return Err(CodegenError::UnsupportedValueType {
                    ty,
                    node: self.index(ret_node),
                    context: "as a function return type",
                });
            }
        };
        let name = self.ast.node(name_node);
        debug!(name = %name.lexeme, %ret, "define function");

        let function = self
            .ctx
            .builder
            .define_function(&name.lexeme, ret.clone(), Vec::new());
        // bound before the body so the function can call itself
        let reference = self.ctx.module().function(function).reference();
        self.ctx.bind(name.unique_name.clone(), Binding::Function(reference));

        let entry = self.ctx.builder.append_block(function, "entry")?;
        self.ctx.builder.position_at_end(function, entry);
        self.children(id)?;

        if ret == Type::Void && !self.ctx.builder.is_terminated() {
            self.ctx.builder.ret_void()?;
        }
        self.ctx.builder.clear_position();
        Ok(())
    }

    /// `[identifier, initializer]` → stack slot named by the unique name
    fn local(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let name = self.ast.child(id, 0, "declared identifier")?;
        let init = self.ast.child(id, 1, "initializer")?;

        let value = self.value(init)?;
        let ty = value.ty.clone();
        let unique = &self.ast.node(name).unique_name;
        let address = self.ctx.builder.alloca(ty.clone(), unique)?;
        self.ctx.builder.store(value, address.clone())?;
        self.ctx.bind(unique.clone(), Binding::Slot { address, ty });
        Ok(())
    }

    /// `[identifier, value]` → `store`
    fn assign(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let target = self.ast.child(id, 0, "assigned identifier")?;
        let source = self.ast.child(id, 1, "assigned value")?;

        let address = self.address_of(target)?;
        let value = self.value(source)?;
        self.ctx.builder.store(value, address)?;
        Ok(())
    }

    /// `[value]` → `ret <ty> <value>`; no child → `ret void`
    fn return_statement(&mut self, id: NodeId) -> Result<(), CodegenError> {
        match self.ast.children(id).first().copied() {
            Some(child) => {
                let value = self.value(child)?;
                self.ctx.builder.ret(value)?;
            }
            None => self.ctx.builder.ret_void()?,
        }
        Ok(())
    }

    /// Pointer to the storage behind an identifier; strings point at their first byte
    pub(crate) fn address_of(&mut self, id: NodeId) -> Result<Value, CodegenError> {
        let id = self.ungroup(id)?;
        if self.ast.kind(id) != NodeKind::Id {
            return Err(CodegenError::UnsupportedExpression {
                kind: self.ast.kind(id),
                node: self.index(id),
                context: "as an assignment target",
            });
        }

        let (address, ty) = self.slot(id)?;
        if matches!(ty, Type::Array { .. }) {
            let zero = Value::i32(0);
            Ok(self.ctx.builder.gep(ty, address, vec![zero.clone(), zero])?)
        } else {
            Ok(address)
        }
    }

    /// Storage pointer and stored type of an identifier
    pub(crate) fn slot(&self, id: NodeId) -> Result<(Value, Type), CodegenError> {
        let node = self.ast.node(id);
        match self.ctx.lookup(&node.unique_name)? {
            Binding::Slot { address, ty } => Ok((address.clone(), ty.clone())),
            Binding::Function(_) => Err(CodegenError::UnsupportedExpression {
                kind: node.kind,
                node: node.index,
                context: "as a value (it names a function)",
            }),
        }
    }
}

fn is_statement(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::VarDecl
            | NodeKind::FuncCall
            | NodeKind::Return
            | NodeKind::Assign
            | NodeKind::If
            | NodeKind::For
            | NodeKind::While
    )
}

/// Bytes of a string literal with escapes processed and a NUL appended
pub(crate) fn string_bytes(lexeme: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(lexeme.len() + 1);
    let mut chars = lexeme.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('0') => bytes.push(0),
            Some('\\') => bytes.push(b'\\'),
            Some('"') => bytes.push(b'"'),
            Some(other) => {
                bytes.push(b'\\');
                let mut buf = [0; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    bytes.push(0);
    bytes
}
