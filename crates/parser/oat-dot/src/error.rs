//! Errors raised while reading a DOT graph

/// Failure to turn a DOT graph into a syntax tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DotError {
    /// A character that cannot start any token
    #[error("line {line}: unexpected character {found:?}")]
    UnexpectedChar {
        /// Line of the character
        line: u32,
        /// The character
        found: char,
    },

    /// A quoted string or block comment runs to the end of input
    #[error("line {line}: unterminated {what}")]
    Unterminated {
        /// Line where it started
        line: u32,
        /// "string" or "comment"
        what: &'static str,
    },

    /// Token does not fit the grammar at this point
    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        /// Line of the token
        line: u32,
        /// What the grammar wanted
        expected: &'static str,
        /// What was there
        found: String,
    },

    /// An edge names a node that was never declared with attributes
    #[error("edge refers to undeclared node `{0}`")]
    UnknownNode(String),

    /// A node name without a trailing number
    #[error("node name `{0}` does not end in a node number")]
    BadNodeName(String),

    /// A node statement lacks a required attribute
    #[error("node `{node}` has no `{attribute}` attribute")]
    MissingAttribute {
        /// Node name
        node: String,
        /// Attribute name
        attribute: &'static str,
    },

    /// The graph declares no node with attributes
    #[error("graph declares no nodes")]
    EmptyGraph,
}
