//! Node kinds

use std::fmt;

macro_rules! node_kinds {
    ($($(#[$doc:meta])* $variant:ident => $label:literal, $name:literal;)*) => {
        /// Kind tag of an AST node
        ///
        /// The label is the token class emitted by the upstream parser; the name
        /// is what tree dumps print.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($(#[$doc])* $variant,)*
        }

        impl NodeKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Parser label of this kind
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }

            /// Upper-case name used in tree dumps
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Map a parser label to a kind; unrecognised labels become [`NodeKind::Unknown`]
            #[must_use]
            pub fn from_label(label: &str) -> Self {
                match label {
                    $($label => Self::$variant,)*
                    _ => Self::Unknown,
                }
            }
        }
    };
}

node_kinds! {
    /// Whole program
    Program => "<program>", "PROGRAM";
    /// Global variable declaration
    GlobalDecl => "<global_decl>", "GLOBAL_DECL";
    /// Function declaration
    FuncDecl => "<function_decl>", "FUNC_DECL";
    /// List of local declarations
    VarDecls => "<var_decls>", "VAR_DECLS";
    /// Local variable declaration
    VarDecl => "<var_decl>", "VAR_DECL";
    /// Formal parameter list
    Args => "<args>", "ARGS";
    /// Single formal parameter
    Arg => "<arg>", "ARG";
    /// Reference type
    Ref => "<ref>", "REF";
    /// Global initializer list
    GlobalExps => "<global_exps>", "GLOBAL_EXPS";
    /// Statement list
    Stmts => "<stmts>", "STMTS";
    /// Expression list (call arguments)
    Exps => "<exps>", "EXPS";
    /// Function call
    FuncCall => "<func call>", "FUNC_CALL";
    /// Array element access
    ArrayIndex => "<array index>", "ARRAY_INDEX";
    /// `if` statement
    If => "IF", "IF_STMT";
    /// `else` branch
    Else => "ELSE", "ELSE_STMT";
    /// `for` loop
    For => "FOR", "FOR_LOOP";
    /// `while` loop
    While => "WHILE", "WHILE_LOOP";
    /// `return` statement
    Return => "RETURN", "RETURN";
    /// `new` with initializer
    New => "NEW", "NEW";
    /// Assignment
    Assign => "ASSIGN", "ASSIGN";
    /// Generic expression group
    Exp => "<exp>", "EXP";
    /// `void` keyword
    TVoid => "void", "TVOID";
    /// `int` keyword
    TInt => "int", "TINT";
    /// `string` keyword
    TString => "string", "TSTRING";
    /// `bool` keyword
    TBool => "bool", "TBOOL";
    /// `null` literal
    Null => "NULL", "NULL";
    /// `true` literal
    True => "TRUE", "TRUE";
    /// `false` literal
    False => "FALSE", "FALSE";
    /// `*`
    Star => "STAR", "STAR";
    /// `+`
    Plus => "PLUS", "PLUS";
    /// `-`
    Minus => "MINUS", "MINUS";
    /// `<<`
    LShift => "LSHIFT", "LSHIFT";
    /// `>>`
    RLShift => "RLSHIFT", "RLSHIFT";
    /// `>>>`
    RAShift => "RASHIFT", "RASHIFT";
    /// `<`
    Less => "LESS", "LESS";
    /// `<=`
    LessEq => "LESSEQ", "LESSEQ";
    /// `>`
    Great => "GREAT", "GREAT";
    /// `>=`
    GreatEq => "GREATEQ", "GREATEQ";
    /// `==`
    Eq => "EQ", "EQ";
    /// `!=`
    NotEq => "NEQ", "NEQ";
    /// `&`
    LAnd => "LAND", "LAND";
    /// `|`
    LOr => "LOR", "LOR";
    /// `[&]`
    BAnd => "BAND", "BAND";
    /// `[|]`
    BOr => "BOR", "BOR";
    /// `!`
    Not => "NOT", "NOT";
    /// `~`
    Tilde => "TILDE", "TILDE";
    /// Integer literal
    IntLiteral => "INTLITERAL", "INTLITERAL";
    /// String literal
    StringLiteral => "STRINGLITERAL", "STRINGLITERAL";
    /// Identifier reference
    Id => "ID", "ID";
    /// Unrecognised label
    Unknown => "unknown", "NONE";
}

impl NodeKind {
    /// One of the six ordering/equality comparisons
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Less | Self::LessEq | Self::Great | Self::GreatEq | Self::Eq | Self::NotEq
        )
    }

    /// Literal leaf that can initialise a global
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntLiteral | Self::StringLiteral | Self::True | Self::False
        )
    }

    /// Addition or subtraction, the only arithmetic with a lowering rule
    #[must_use]
    pub const fn is_additive(self) -> bool {
        matches!(self, Self::Plus | Self::Minus)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_for_every_kind() {
        for kind in NodeKind::ALL {
            if *kind == NodeKind::Unknown {
                continue;
            }
            assert_eq!(NodeKind::from_label(kind.label()), *kind, "{kind:?}");
        }
    }

    #[test]
    fn unrecognised_label_is_unknown() {
        assert_eq!(NodeKind::from_label("<lambda>"), NodeKind::Unknown);
        assert_eq!(NodeKind::from_label(""), NodeKind::Unknown);
    }

    #[test]
    fn comparison_family() {
        let comparisons: Vec<_> = NodeKind::ALL
            .iter()
            .filter(|kind| kind.is_comparison())
            .collect();
        assert_eq!(comparisons.len(), 6);
        assert!(!NodeKind::LAnd.is_comparison());
    }
}
