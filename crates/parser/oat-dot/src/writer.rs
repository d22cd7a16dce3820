//! Syntax tree → DOT graph for debug rendering

use oat_syntax::{Ast, AstNode};
use std::fmt::Write as _;

/// Render a tree as an undirected DOT graph
///
/// Each node is labelled `KIND`, then its unique name (or lexeme, before
/// analysis), then `type: TYPE`. Nodes also keep their `lexeme` attribute, so
/// the output can be read back with [`crate::read_ast`].
#[must_use]
pub fn write_ast(ast: &Ast) -> String {
    let mut out = String::from("graph AST {\n");

    for id in ast.preorder() {
        let node = ast.node(id);
        let _ = writeln!(
            out,
            "    node{} [label=\"{}\", lexeme=\"{}\"];",
            node.index,
            label(node),
            escape(&node.lexeme)
        );
    }
    for id in ast.preorder() {
        let parent = ast.node(id).index;
        for &child in ast.children(id) {
            let _ = writeln!(out, "    node{parent} -- node{};", ast.node(child).index);
        }
    }

    out.push_str("}\n");
    out
}

fn label(node: &AstNode) -> String {
    let mut label = escape(node.kind.name());
    let name = node.display_name();
    if !name.is_empty() {
        label.push_str("\\n");
        label.push_str(&escape(name));
    }
    label.push_str("\\ntype: ");
    label.push_str(node.ty.name());
    label
}

/// Backslashes first, so escaped quotes are not doubled again
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
