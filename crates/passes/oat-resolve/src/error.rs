//! Error types for semantic analysis

use oat_syntax::SyntaxError;

/// Errors that abort semantic analysis
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Identifier is not bound in any visible scope
    #[error("undefined symbol `{name}` (node #{node}){}", did_you_mean(.suggestions))]
    UndefinedSymbol {
        /// Lexeme that was not found
        name: String,
        /// Diagnostic index of the identifier node
        node: u32,
        /// Similar visible names (for "did you mean?" messages)
        suggestions: Vec<String>,
    },

    /// Scope table used with no open scope
    #[error("scope stack imbalance: `{operation}` with no open scope")]
    ScopeStackImbalance {
        /// Operation that found the stack empty
        operation: &'static str,
    },

    /// Tree is missing a positional child
    #[error(transparent)]
    Malformed(#[from] SyntaxError),
}

impl ResolutionError {
    /// Compute suggestions for undefined names using Levenshtein distance
    #[must_use]
    pub fn compute_suggestions<'a>(
        name: &str,
        available_names: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let mut suggestions: Vec<(&str, usize)> = available_names
            .into_iter()
            .map(|candidate| (candidate, levenshtein_distance(name, candidate)))
            .filter(|(_, distance)| *distance <= 3)
            .collect();

        // stable order among equal distances
        suggestions.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));
        suggestions
            .into_iter()
            .take(3)
            .map(|(candidate, _)| candidate.to_owned())
            .collect()
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!("; did you mean `{only}`?"),
        many => format!(
            "; did you mean one of {}?",
            many.iter()
                .map(|name| format!("`{name}`"))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Compute Levenshtein distance between two strings
fn levenshtein_distance(source: &str, target: &str) -> usize {
    let source: Vec<char> = source.chars().collect();
    let target: Vec<char> = target.chars().collect();

    if source.is_empty() {
        return target.len();
    }
    if target.is_empty() {
        return source.len();
    }

    let mut matrix = vec![vec![0; target.len() + 1]; source.len() + 1];

    for (idx, row) in matrix.iter_mut().enumerate() {
        row[0] = idx;
    }
    for (jdx, cell) in matrix[0].iter_mut().enumerate() {
        *cell = jdx;
    }

    for (idx, source_char) in source.iter().enumerate() {
        for (jdx, target_char) in target.iter().enumerate() {
            let cost = usize::from(source_char != target_char);
            matrix[idx + 1][jdx + 1] = (matrix[idx][jdx + 1] + 1)
                .min(matrix[idx + 1][jdx] + 1)
                .min(matrix[idx][jdx] + cost);
        }
    }

    matrix[source.len()][target.len()]
}
