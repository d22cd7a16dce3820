//! Semantic analysis pass
//!
//! A single depth-first, left-to-right walk over the tree. Declarations bind a
//! lexeme in the innermost scope, identifiers are resolved against the scope
//! stack, and every resolved node is stamped with its unique name and type.
//! Because the walk is ordered, a name is only visible to nodes visited after
//! the declaration that introduced it.

use crate::ResolutionError;
use crate::scope::ScopeTable;
use oat_syntax::{Ast, NodeId, NodeKind, RUNTIME_FUNCTIONS, ValueType};
use tracing::{info, trace};

/// Summary of a successful analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    /// Scopes opened during the walk
    pub scopes_opened: u32,
    /// Bindings created, runtime functions included
    pub bindings: usize,
    /// Scope depth after the walk; zero for a well-formed tree
    pub final_depth: usize,
}

/// Resolve every identifier in `ast`, annotating nodes in place
///
/// # Errors
///
/// Returns [`ResolutionError::UndefinedSymbol`] for the first identifier that
/// is not bound in a visible scope, or [`ResolutionError::Malformed`] if a
/// declaration lacks a positional child.
pub fn analyze(ast: &mut Ast) -> Result<Analysis, ResolutionError> {
    let mut scopes = ScopeTable::new();
    let root = ast.root();
    Analyzer { ast }.analyze(&mut scopes, root)?;

    let analysis = Analysis {
        scopes_opened: scopes.scopes_opened(),
        bindings: scopes.bindings_created(),
        final_depth: scopes.depth(),
    };
    info!(
        scopes = analysis.scopes_opened,
        bindings = analysis.bindings,
        "semantic analysis finished"
    );
    Ok(analysis)
}

struct Analyzer<'ast> {
    ast: &'ast mut Ast,
}

impl Analyzer<'_> {
    /// Dispatch on the node kind and return the node's resolved type
    fn analyze(
        &mut self,
        scopes: &mut ScopeTable,
        id: NodeId,
    ) -> Result<ValueType, ResolutionError> {
        let kind = self.ast.kind(id);
        trace!(node = self.ast.node(id).index, %kind, "analyze");

        match kind {
            NodeKind::Program => self.program(scopes, id)?,
            NodeKind::Id => self.identifier(scopes, id)?,
            NodeKind::TInt | NodeKind::IntLiteral => self.set_type(id, ValueType::Int),
            NodeKind::TString | NodeKind::StringLiteral => self.set_type(id, ValueType::String),
            NodeKind::TBool | NodeKind::True | NodeKind::False => {
                self.set_type(id, ValueType::Bool);
            }
            NodeKind::TVoid => self.set_type(id, ValueType::Void),
            NodeKind::GlobalDecl | NodeKind::VarDecl => self.declaration(scopes, id)?,
            NodeKind::FuncDecl => self.function(scopes, id)?,
            NodeKind::Return => self.return_statement(scopes, id)?,
            NodeKind::Args => {
                self.set_type(id, ValueType::Void);
                self.children(scopes, id, 0)?;
            }
            NodeKind::Stmts => {
                self.set_type(id, ValueType::Int);
                self.children(scopes, id, 0)?;
            }
            NodeKind::If | NodeKind::Else | NodeKind::For | NodeKind::While => {
                let mut scope = scopes.enter();
                self.children(&mut scope, id, 0)?;
            }
            _ => self.children(scopes, id, 0)?,
        }

        Ok(self.ast.node(id).ty)
    }

    /// Analyze children from position `from` onwards, in order
    fn children(
        &mut self,
        scopes: &mut ScopeTable,
        id: NodeId,
        from: usize,
    ) -> Result<(), ResolutionError> {
        // children are fixed during analysis; index to avoid holding a borrow of the tree
        for position in from..self.ast.children(id).len() {
            let child = self.ast.children(id)[position];
            self.analyze(scopes, child)?;
        }
        Ok(())
    }

    fn set_type(&mut self, id: NodeId, ty: ValueType) {
        self.ast.node_mut(id).ty = ty;
    }

    fn program(&mut self, scopes: &mut ScopeTable, id: NodeId) -> Result<(), ResolutionError> {
        let mut scope = scopes.enter();
        for function in &RUNTIME_FUNCTIONS {
            scope.insert(function.name, function.binding)?;
        }
        self.children(&mut scope, id, 0)
    }

    fn identifier(&mut self, scopes: &mut ScopeTable, id: NodeId) -> Result<(), ResolutionError> {
        let node = self.ast.node(id);
        let Some(binding) = scopes.lookup_global(&node.lexeme)? else {
            let suggestions =
                ResolutionError::compute_suggestions(&node.lexeme, scopes.visible_names());
            return Err(ResolutionError::UndefinedSymbol {
                name: node.lexeme.clone(),
                node: node.index,
                suggestions,
            });
        };

        let node = self.ast.node_mut(id);
        node.unique_name = binding.unique_name;
        node.ty = binding.ty;
        Ok(())
    }

    /// `[identifier, initializer]`: the initializer is analyzed before the
    /// name is bound, so `int x = x;` does not see the new `x`
    fn declaration(&mut self, scopes: &mut ScopeTable, id: NodeId) -> Result<(), ResolutionError> {
        let name = self.ast.child(id, 0, "declared identifier")?;
        let init = self.ast.child(id, 1, "initializer")?;

        let ty = self.analyze(scopes, init)?;
        scopes.insert(&self.ast.node(name).lexeme, ty)?;
        self.analyze(scopes, name)?;
        Ok(())
    }

    /// `[return type, name, parameters and body...]`
    fn function(&mut self, scopes: &mut ScopeTable, id: NodeId) -> Result<(), ResolutionError> {
        let ret = self.ast.child(id, 0, "return type")?;
        let name = self.ast.child(id, 1, "function name")?;

        let ty = self.analyze(scopes, ret)?;
        // bound in the enclosing scope, so later siblings can call it
        scopes.insert(&self.ast.node(name).lexeme, ty)?;

        let mut scope = scopes.enter();
        self.children(&mut scope, id, 1)
    }

    fn return_statement(
        &mut self,
        scopes: &mut ScopeTable,
        id: NodeId,
    ) -> Result<(), ResolutionError> {
        let ty = match self.ast.children(id).first().copied() {
            Some(value) => self.analyze(scopes, value)?,
            None => ValueType::Void,
        };
        self.set_type(id, ty);
        Ok(())
    }
}
