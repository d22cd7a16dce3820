//! Values, conditions and calls

use crate::CodegenError;
use crate::context::Binding;
use crate::generate::{Generator, string_bytes};
use oat_llir::{IntPredicate, Type, Value};
use oat_syntax::{NodeId, NodeKind, ValueType};

impl Generator<'_> {
    /// Skip single-child `<exp>` groups
    pub(crate) fn ungroup(&self, mut id: NodeId) -> Result<NodeId, CodegenError> {
        while self.ast.kind(id) == NodeKind::Exp {
            match self.ast.children(id) {
                [inner] => id = *inner,
                children => {
                    return Err(CodegenError::UnsupportedArity {
                        kind: NodeKind::Exp,
                        node: self.index(id),
                        expected: 1,
                        found: children.len(),
                    });
                }
            }
        }
        Ok(id)
    }

    /// Lower a node in value position
    pub(crate) fn value(&mut self, id: NodeId) -> Result<Value, CodegenError> {
        let id = self.ungroup(id)?;
        match self.ast.kind(id) {
            NodeKind::Id => {
                let (address, ty) = self.slot(id)?;
                Ok(self.ctx.builder.load(ty, address, "")?)
            }
            NodeKind::IntLiteral | NodeKind::StringLiteral | NodeKind::True | NodeKind::False => {
                self.literal(id)
            }
            NodeKind::Plus => self.sum(id),
            NodeKind::Minus => self.difference(id),
            kind => Err(CodegenError::UnsupportedExpression {
                kind,
                node: self.index(id),
                context: "as a value",
            }),
        }
    }

    /// Constant for a literal leaf: `i32` for integers and booleans,
    /// a NUL-terminated byte array for strings
    pub(crate) fn literal(&self, id: NodeId) -> Result<Value, CodegenError> {
        let node = self.ast.node(id);
        match node.kind {
            NodeKind::IntLiteral => node
                .lexeme
                .trim()
                .parse::<i32>()
                .map(|value| Value::i32(i64::from(value)))
                .map_err(|_| CodegenError::InvalidIntLiteral {
                    lexeme: node.lexeme.clone(),
                    node: node.index,
                }),
            NodeKind::StringLiteral => Ok(Value::bytes(string_bytes(&node.lexeme))),
            NodeKind::True => Ok(Value::i32(1)),
            NodeKind::False => Ok(Value::i32(0)),
            kind => Err(CodegenError::NonConstantInitializer {
                kind,
                node: node.index,
            }),
        }
    }

    /// `0 + a + b + ...`, left to right
    fn sum(&mut self, id: NodeId) -> Result<Value, CodegenError> {
        let ast = self.ast;
        let mut total = Value::i32(0);
        for &child in ast.children(id) {
            let operand = self.integer(child)?;
            total = self.ctx.builder.add(total, operand)?;
        }
        Ok(total)
    }

    /// `a - b`
    fn difference(&mut self, id: NodeId) -> Result<Value, CodegenError> {
        let [lhs, rhs] = *self.ast.children(id) else {
            return Err(CodegenError::UnsupportedArity {
                kind: NodeKind::Minus,
                node: self.index(id),
                expected: 2,
                found: self.ast.children(id).len(),
            });
        };
        let lhs = self.integer(lhs)?;
        let rhs = self.integer(rhs)?;
        Ok(self.ctx.builder.sub(lhs, rhs)?)
    }

    /// A value that must be an `i32`
    fn integer(&mut self, id: NodeId) -> Result<Value, CodegenError> {
        let value = self.value(id)?;
        if value.ty == Type::i32() {
            Ok(value)
        } else {
            Err(CodegenError::UnsupportedValueType {
                ty: self.ast.node(id).ty,
                node: self.index(id),
                context: "in integer arithmetic or comparison",
            })
        }
    }

    /// Lower a comparison node to an `i1`
    pub(crate) fn condition(&mut self, id: NodeId) -> Result<Value, CodegenError> {
        let id = self.ungroup(id)?;
        let kind = self.ast.kind(id);
        let predicate = match kind {
            NodeKind::Less => IntPredicate::Slt,
            NodeKind::LessEq => IntPredicate::Sle,
            NodeKind::Great => IntPredicate::Sgt,
            NodeKind::GreatEq => IntPredicate::Sge,
            NodeKind::Eq => IntPredicate::Eq,
            NodeKind::NotEq => IntPredicate::Ne,
            _ => {
                return Err(CodegenError::UnsupportedExpression {
                    kind,
                    node: self.index(id),
                    context: "as a condition (expected a comparison)",
                });
            }
        };
        let [lhs, rhs] = *self.ast.children(id) else {
            return Err(CodegenError::UnsupportedArity {
                kind,
                node: self.index(id),
                expected: 2,
                found: self.ast.children(id).len(),
            });
        };
        let lhs = self.integer(lhs)?;
        let rhs = self.integer(rhs)?;
        Ok(self.ctx.builder.icmp_signed(predicate, lhs, rhs)?)
    }

    /// `[callee, <exps>]` → `call`; returns the result of non-void callees
    pub(crate) fn call(&mut self, id: NodeId) -> Result<Option<Value>, CodegenError> {
        let callee_node = self.ast.child(id, 0, "callee")?;
        let exps = self.ast.child(id, 1, "argument list")?;

        let callee = match self.ctx.lookup(&self.ast.node(callee_node).unique_name)? {
            Binding::Function(callee) => callee.clone(),
            Binding::Slot { .. } => {
                return Err(CodegenError::UnsupportedExpression {
                    kind: NodeKind::Id,
                    node: self.index(callee_node),
                    context: "as a callee (it names a variable)",
                });
            }
        };

        let ast = self.ast;
        let arg_nodes = ast.children(exps);
        if arg_nodes.len() != callee.params.len() {
            return Err(CodegenError::UnsupportedArity {
                kind: NodeKind::FuncCall,
                node: self.index(id),
                expected: callee.params.len(),
                found: arg_nodes.len(),
            });
        }

        let mut args = Vec::with_capacity(arg_nodes.len());
        for (&arg, param) in arg_nodes.iter().zip(&callee.params) {
            let value = self.argument(arg)?;
            if &value.ty != param {
                return Err(CodegenError::UnsupportedValueType {
                    ty: self.ast.node(arg).ty,
                    node: self.index(arg),
                    context: "as this argument",
                });
            }
            args.push(value);
        }
        Ok(self.ctx.builder.call(&callee, args)?)
    }

    /// Strings are passed as a pointer to their first byte, everything else by value
    fn argument(&mut self, id: NodeId) -> Result<Value, CodegenError> {
        let id = self.ungroup(id)?;
        if self.ast.node(id).ty != ValueType::String {
            return self.value(id);
        }

        let zero = Value::i32(0);
        match self.ast.kind(id) {
            NodeKind::Id => {
                let (address, ty) = self.slot(id)?;
                Ok(self.ctx.builder.gep(ty, address, vec![zero.clone(), zero])?)
            }
            NodeKind::StringLiteral => {
                let text = self.literal(id)?;
                let ty = text.ty.clone();
                let address = self.ctx.builder.alloca(ty.clone(), "")?;
                self.ctx.builder.store(text, address.clone())?;
                Ok(self.ctx.builder.gep(ty, address, vec![zero.clone(), zero])?)
            }
            kind => Err(CodegenError::UnsupportedExpression {
                kind,
                node: self.index(id),
                context: "as a string argument",
            }),
        }
    }
}
