//! IR construction errors

/// Misuse of the [`crate::Builder`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlirError {
    /// An instruction was emitted with no block selected
    #[error("no insertion point: position the builder in a block first")]
    NoInsertionPoint,

    /// An instruction was emitted into a block that already has a terminator
    #[error("block `{block}` in `@{function}` is already terminated")]
    BlockTerminated {
        /// Function name
        function: String,
        /// Block name
        block: String,
    },

    /// A block was added to an external declaration
    #[error("`@{0}` is a declaration and cannot hold blocks")]
    NotADefinition(String),
}
