//! Arena-backed syntax tree

use crate::{NodeKind, SyntaxError, ValueType};
use la_arena::{Arena, Idx};
use std::fmt::Write as _;

/// Identifier of a node inside its [`Ast`]
pub type NodeId = Idx<AstNode>;

/// A node of the syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    /// Diagnostic identity (the node number assigned upstream)
    pub index: u32,
    /// Raw source text; not unique
    pub lexeme: String,
    /// Kind tag
    pub kind: NodeKind,
    /// Unique name, filled in by semantic analysis
    pub unique_name: String,
    /// Resolved type, filled in by semantic analysis
    pub ty: ValueType,
    /// Ordered children
    pub children: Vec<NodeId>,
}

impl AstNode {
    /// Create an unresolved node without children
    #[must_use]
    pub fn new(index: u32, kind: NodeKind, lexeme: impl Into<String>) -> Self {
        Self {
            index,
            lexeme: lexeme.into(),
            kind,
            unique_name: String::new(),
            ty: ValueType::Unknown,
            children: Vec::new(),
        }
    }

    /// Name shown in dumps: the unique name once resolved, the lexeme before
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.unique_name.is_empty() {
            &self.lexeme
        } else {
            &self.unique_name
        }
    }
}

/// Syntax tree with a single root
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Arena<AstNode>,
    root: NodeId,
}

impl Ast {
    /// Root node
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id]
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id]
    }

    /// Kind of a node
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id].kind
    }

    /// Children of a node, in order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Positional child
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::MalformedNode`] if the node has fewer than
    /// `position + 1` children.
    pub fn child(
        &self,
        id: NodeId,
        position: usize,
        expected: &'static str,
    ) -> Result<NodeId, SyntaxError> {
        let node = &self.nodes[id];
        node.children
            .get(position)
            .copied()
            .ok_or(SyntaxError::MalformedNode {
                index: node.index,
                kind: node.kind,
                position,
                expected,
            })
    }

    /// Depth-first, left-to-right traversal starting at the root
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            ast: self,
            stack: vec![self.root],
        }
    }

    /// Find the first node (in traversal order) with the given kind and lexeme
    #[must_use]
    pub fn find(&self, kind: NodeKind, lexeme: &str) -> Option<NodeId> {
        self.preorder()
            .find(|&id| self.nodes[id].kind == kind && self.nodes[id].lexeme == lexeme)
    }

    /// Indented one-line-per-node rendering, for debugging
    #[must_use]
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0_usize)];
        while let Some((id, level)) = stack.pop() {
            let node = &self.nodes[id];
            let _ = writeln!(
                out,
                "{}|{}, {}",
                "  ".repeat(level),
                node.lexeme.replace('\n', "\\n"),
                node.kind.name()
            );
            stack.extend(node.children.iter().rev().map(|&child| (child, level + 1)));
        }
        out
    }
}

/// Iterator returned by [`Ast::preorder`]
pub struct Preorder<'ast> {
    ast: &'ast Ast,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.ast.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}

/// Incremental tree construction
///
/// Nodes can be created leaves-first with [`AstBuilder::leaf`] and
/// [`AstBuilder::node`], or registered up front and wired afterwards with
/// [`AstBuilder::push`] and [`AstBuilder::attach`] (the order a graph file
/// declares them in).
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Arena<AstNode>,
}

impl AstBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with an explicit diagnostic index
    pub fn push(&mut self, index: u32, kind: NodeKind, lexeme: impl Into<String>) -> NodeId {
        self.nodes.alloc(AstNode::new(index, kind, lexeme))
    }

    /// Append `child` to the children of `parent`
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
    }

    /// Create a childless node; its index is its allocation order
    pub fn leaf(&mut self, kind: NodeKind, lexeme: impl Into<String>) -> NodeId {
        let index = self.next_index();
        self.push(index, kind, lexeme)
    }

    /// Create a node owning `children`; its index is its allocation order
    pub fn node(
        &mut self,
        kind: NodeKind,
        lexeme: impl Into<String>,
        children: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let id = self.leaf(kind, lexeme);
        self.nodes[id].children.extend(children);
        id
    }

    /// Number of registered nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Freeze the tree with `root` as its root
    #[must_use]
    pub fn finish(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
        }
    }

    fn next_index(&self) -> u32 {
        self.nodes.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ast {
        let mut builder = AstBuilder::new();
        let id = builder.leaf(NodeKind::Id, "x");
        let five = builder.leaf(NodeKind::IntLiteral, "5");
        let decl = builder.node(NodeKind::GlobalDecl, "", [id, five]);
        let program = builder.node(NodeKind::Program, "", [decl]);
        builder.finish(program)
    }

    #[test]
    fn preorder_visits_parents_before_children_left_to_right() {
        let ast = sample();
        let kinds: Vec<_> = ast.preorder().map(|id| ast.kind(id)).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Program,
                NodeKind::GlobalDecl,
                NodeKind::Id,
                NodeKind::IntLiteral
            ]
        );
    }

    #[test]
    fn missing_positional_child_is_malformed() {
        let ast = sample();
        let decl = ast.children(ast.root())[0];
        assert!(ast.child(decl, 1, "initializer").is_ok());
        let err = ast.child(decl, 2, "extra").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::MalformedNode {
                index: 2,
                kind: NodeKind::GlobalDecl,
                position: 2,
                expected: "extra",
            }
        );
    }

    #[test]
    fn pretty_prints_indented_lexemes() {
        let ast = sample();
        assert_eq!(
            ast.pretty(),
            "|, PROGRAM\n  |, GLOBAL_DECL\n    |x, ID\n    |5, INTLITERAL\n"
        );
    }

    #[test]
    fn display_name_prefers_unique_name() {
        let mut ast = sample();
        let id = ast.find(NodeKind::Id, "x").unwrap();
        assert_eq!(ast.node(id).display_name(), "x");
        ast.node_mut(id).unique_name = "x-1".to_owned();
        assert_eq!(ast.node(id).display_name(), "x-1");
    }
}
