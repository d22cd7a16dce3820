//! DOT graph → syntax tree

use crate::DotError;
use crate::lexer::{Spanned, Token, tokenize};
use indexmap::IndexMap;
use oat_syntax::{Ast, AstBuilder, NodeId, NodeKind};
use tracing::{debug, warn};

/// Build a syntax tree from DOT source text
///
/// # Errors
///
/// Returns a [`DotError`] if the text is not a DOT graph, if a node statement
/// lacks `label`/`lexeme`, if an edge names an undeclared node, or if the graph
/// declares no nodes.
pub fn read_ast(source: &str) -> Result<Ast, DotError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        builder: AstBuilder::new(),
        nodes: IndexMap::new(),
        edges: Vec::new(),
    };
    parser.graph()?;
    parser.finish()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    builder: AstBuilder,
    /// Declared node name → tree node, in declaration order
    nodes: IndexMap<String, NodeId>,
    /// Edges in declaration order, resolved once every node is known
    edges: Vec<(String, String)>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |spanned| spanned.line)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|spanned| spanned.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &'static str) -> DotError {
        DotError::UnexpectedToken {
            line: self.line(),
            expected,
            found: self
                .peek()
                .map_or_else(|| "end of input".to_owned(), ToString::to_string),
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), DotError> {
        if self.peek() == Some(token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// `ID` or quoted string
    fn id(&mut self, expected: &'static str) -> Result<String, DotError> {
        match self.peek() {
            Some(Token::Ident(_) | Token::Quoted(_)) => match self.bump() {
                Some(Token::Ident(text) | Token::Quoted(text)) => Ok(text),
                _ => Err(self.unexpected(expected)),
            },
            _ => Err(self.unexpected(expected)),
        }
    }

    fn keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(text)) if text.eq_ignore_ascii_case(word))
    }

    /// `[strict] (graph | digraph) [ID] '{' stmt_list '}'`
    fn graph(&mut self) -> Result<(), DotError> {
        if self.keyword("strict") {
            self.pos += 1;
        }
        if self.keyword("graph") || self.keyword("digraph") {
            self.pos += 1;
        } else {
            return Err(self.unexpected("`graph` or `digraph`"));
        }
        if !matches!(self.peek(), Some(Token::LBrace)) {
            self.id("graph name")?;
        }
        self.expect(&Token::LBrace, "`{`")?;
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Semi) => self.pos += 1,
                Some(_) => self.statement()?,
                None => return Err(self.unexpected("`}`")),
            }
        }
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    fn statement(&mut self) -> Result<(), DotError> {
        if self.keyword("graph") || self.keyword("node") || self.keyword("edge") {
            // default attribute statement
            self.pos += 1;
            self.attributes()?;
            return Ok(());
        }
        if self.keyword("subgraph") || matches!(self.peek(), Some(Token::LBrace)) {
            return Err(self.unexpected("node or edge statement"));
        }

        let first = self.id("node name")?;

        if matches!(self.peek(), Some(Token::Equals)) {
            // graph attribute `ID = ID`
            self.pos += 1;
            self.id("attribute value")?;
            return Ok(());
        }

        if matches!(self.peek(), Some(Token::Edge)) {
            let mut from = first;
            while matches!(self.peek(), Some(Token::Edge)) {
                self.pos += 1;
                let to = self.id("node name")?;
                self.edges.push((from, to.clone()));
                from = to;
            }
            self.attributes()?;
            return Ok(());
        }

        let attributes = self.attributes()?;
        self.declare(first, attributes)
    }

    /// Zero or more `[a=b, c=d; ...]` lists
    fn attributes(&mut self) -> Result<Vec<(String, String)>, DotError> {
        let mut attributes = Vec::new();
        while matches!(self.peek(), Some(Token::LBracket)) {
            self.pos += 1;
            loop {
                match self.peek() {
                    Some(Token::RBracket) => {
                        self.pos += 1;
                        break;
                    }
                    Some(Token::Comma | Token::Semi) => self.pos += 1,
                    Some(_) => {
                        let key = self.id("attribute name")?;
                        self.expect(&Token::Equals, "`=`")?;
                        let value = self.id("attribute value")?;
                        attributes.push((key, value));
                    }
                    None => return Err(self.unexpected("`]`")),
                }
            }
        }
        Ok(attributes)
    }

    fn declare(&mut self, name: String, attributes: Vec<(String, String)>) -> Result<(), DotError> {
        if attributes.is_empty() {
            return Ok(());
        }
        if self.nodes.contains_key(&name) {
            warn!(node = %name, "node declared twice; keeping the first declaration");
            return Ok(());
        }

        let find = |key: &'static str| {
            attributes
                .iter()
                .find(|(attr, _)| attr == key)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| DotError::MissingAttribute {
                    node: name.clone(),
                    attribute: key,
                })
        };
        let label = find("label")?;
        let lexeme = find("lexeme")?;
        let index = node_number(&name)?;

        let kind = NodeKind::from_label(&label);
        if kind == NodeKind::Unknown {
            debug!(node = %name, label = %label, "unrecognised node label");
        }
        let id = self.builder.push(index, kind, lexeme);
        self.nodes.insert(name, id);
        Ok(())
    }

    fn finish(mut self) -> Result<Ast, DotError> {
        let root = *self.nodes.first().ok_or(DotError::EmptyGraph)?.1;
        for (from, to) in std::mem::take(&mut self.edges) {
            let parent = *self
                .nodes
                .get(&from)
                .ok_or_else(|| DotError::UnknownNode(from.clone()))?;
            let child = *self
                .nodes
                .get(&to)
                .ok_or_else(|| DotError::UnknownNode(to.clone()))?;
            self.builder.attach(parent, child);
        }
        debug!(nodes = self.builder.len(), "read syntax tree");
        Ok(self.builder.finish(root))
    }
}

/// Trailing decimal digits of a node name (`node17` → 17)
fn node_number(name: &str) -> Result<u32, DotError> {
    let digits = name.trim_start_matches(|ch: char| !ch.is_ascii_digit());
    digits
        .parse()
        .map_err(|_| DotError::BadNodeName(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oat_syntax::ValueType;

    const GLOBAL_INT: &str = r#"
        graph "" {
            node0 [label="<program>", lexeme=""];
            node1 [label="<global_decl>", lexeme=""];
            node2 [label="ID", lexeme="x"];
            node3 [label="INTLITERAL", lexeme="5"];
            node0 -- node1;
            node1 -- node2;
            node1 -- node3;
        }
    "#;

    #[test]
    fn reads_nodes_and_edges_in_order() {
        let ast = read_ast(GLOBAL_INT).unwrap();
        assert_eq!(ast.len(), 4);
        let root = ast.root();
        assert_eq!(ast.kind(root), NodeKind::Program);
        let decl = ast.children(root)[0];
        let kinds: Vec<_> = ast.children(decl).iter().map(|&id| ast.kind(id)).collect();
        assert_eq!(kinds, vec![NodeKind::Id, NodeKind::IntLiteral]);
        let id = ast.children(decl)[0];
        assert_eq!(ast.node(id).lexeme, "x");
        assert_eq!(ast.node(id).index, 2);
        assert_eq!(ast.node(id).ty, ValueType::Unknown);
    }

    #[test]
    fn edge_chains_and_default_attributes() {
        let source = r#"digraph AST {
            node [shape=box]
            rankdir = TB
            node5 [label="<program>" lexeme=""]
            node6 [label="<stmts>" lexeme=""]
            node7 [label="RETURN" lexeme="return"]
            node5 -> node6 -> node7
        }"#;
        let ast = read_ast(source).unwrap();
        let stmts = ast.children(ast.root())[0];
        assert_eq!(ast.node(stmts).index, 6);
        assert_eq!(ast.kind(ast.children(stmts)[0]), NodeKind::Return);
    }

    #[test]
    fn backslash_escapes_in_lexemes() {
        let source = r#"graph {
            node0 [label="<program>", lexeme=""];
            node1 [label="STRINGLITERAL", lexeme="a\\\\b\n"];
            node2 [label="STRINGLITERAL", lexeme="C:\\"];
            node0 -- node1;
            node0 -- node2;
        }"#;
        let ast = read_ast(source).unwrap();
        let [pair, path] = ast.children(ast.root()) else {
            panic!("expected two literals");
        };
        assert_eq!(ast.node(*pair).lexeme, r"a\\b\n");
        assert_eq!(ast.node(*path).lexeme, r"C:\");
    }

    #[test]
    fn nodes_without_attributes_are_ignored() {
        let source = r#"graph { node0; node1 [label="<program>", lexeme=""]; }"#;
        let ast = read_ast(source).unwrap();
        assert_eq!(ast.len(), 1);
        assert_eq!(ast.node(ast.root()).index, 1);
    }

    #[test]
    fn undeclared_edge_endpoint() {
        let source = r#"graph { node0 [label="<program>", lexeme=""]; node0 -- node9; }"#;
        assert_eq!(
            read_ast(source).unwrap_err(),
            DotError::UnknownNode("node9".into())
        );
    }

    #[test]
    fn missing_lexeme() {
        let source = r#"graph { node0 [label="<program>"]; }"#;
        assert_eq!(
            read_ast(source).unwrap_err(),
            DotError::MissingAttribute {
                node: "node0".into(),
                attribute: "lexeme"
            }
        );
    }

    #[test]
    fn empty_graph() {
        assert_eq!(read_ast("graph {}").unwrap_err(), DotError::EmptyGraph);
    }

    #[test]
    fn node_names_need_a_number() {
        assert_eq!(node_number("node42").unwrap(), 42);
        assert_eq!(node_number("n7").unwrap(), 7);
        assert!(node_number("root").is_err());
    }
}
