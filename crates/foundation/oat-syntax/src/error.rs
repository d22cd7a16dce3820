//! Structural errors in the syntax tree

use crate::NodeKind;

/// The tree does not have the shape its node kind requires
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// A positional child is missing
    #[error("{kind} node #{index} has no child at position {position} ({expected})")]
    MalformedNode {
        /// Diagnostic index of the node
        index: u32,
        /// Kind of the node
        kind: NodeKind,
        /// Position that was requested
        position: usize,
        /// What the child at that position should be
        expected: &'static str,
    },
}
