//! Lexical scope stack
//!
//! Each open scope maps a lexeme to its type and carries an id allocated when
//! the scope is pushed. Ids increase monotonically and are never reused, so a
//! binding's unique name `lexeme-id` stays distinct from every binding of the
//! same lexeme in a sibling or enclosing scope.

use crate::ResolutionError;
use oat_syntax::ValueType;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Unique name of `lexeme` bound in the scope with id `scope_id`
#[must_use]
pub fn unique_name(lexeme: &str, scope_id: u32) -> String {
    format!("{lexeme}-{scope_id}")
}

/// A resolved binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// `lexeme-scopeid`
    pub unique_name: String,
    /// Type the lexeme was bound under
    pub ty: ValueType,
}

/// One lexical scope
#[derive(Debug, Clone)]
pub struct Scope {
    id: u32,
    bindings: FxHashMap<String, ValueType>,
}

impl Scope {
    /// Id allocated when the scope was pushed
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    fn binding(&self, lexeme: &str) -> Option<Binding> {
        self.bindings.get(lexeme).map(|&ty| Binding {
            unique_name: unique_name(lexeme, self.id),
            ty,
        })
    }
}

/// Stack of open scopes, innermost last
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
    last_id: u32,
    inserted: usize,
}

impl ScopeTable {
    /// Create a table with no open scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new innermost scope and return its id
    pub fn push_scope(&mut self) -> u32 {
        self.last_id += 1;
        self.scopes.push(Scope {
            id: self.last_id,
            bindings: FxHashMap::default(),
        });
        debug!(scope = self.last_id, depth = self.scopes.len(), "push scope");
        self.last_id
    }

    /// Close the innermost scope
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ScopeStackImbalance`] if no scope is open.
    pub fn pop_scope(&mut self) -> Result<u32, ResolutionError> {
        let scope = self
            .scopes
            .pop()
            .ok_or(ResolutionError::ScopeStackImbalance { operation: "pop" })?;
        debug!(scope = scope.id, depth = self.scopes.len(), "pop scope");
        Ok(scope.id)
    }

    /// Open a scope that is closed again when the returned guard drops
    pub fn enter(&mut self) -> ScopeGuard<'_> {
        let id = self.push_scope();
        ScopeGuard { table: self, id }
    }

    /// Bind `lexeme` in the innermost scope and return its unique name
    ///
    /// An existing binding of the same lexeme in that scope is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ScopeStackImbalance`] if no scope is open.
    pub fn insert(&mut self, lexeme: &str, ty: ValueType) -> Result<String, ResolutionError> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or(ResolutionError::ScopeStackImbalance { operation: "insert" })?;
        scope.bindings.insert(lexeme.to_owned(), ty);
        self.inserted += 1;
        let name = unique_name(lexeme, scope.id);
        debug!(unique_name = %name, %ty, "bind");
        Ok(name)
    }

    /// Look `lexeme` up in the innermost scope only
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ScopeStackImbalance`] if no scope is open.
    pub fn lookup_local(&self, lexeme: &str) -> Result<Option<Binding>, ResolutionError> {
        let scope = self
            .scopes
            .last()
            .ok_or(ResolutionError::ScopeStackImbalance {
                operation: "lookup_local",
            })?;
        Ok(scope.binding(lexeme))
    }

    /// Look `lexeme` up from the innermost scope outwards; the first match wins
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ScopeStackImbalance`] if no scope is open.
    pub fn lookup_global(&self, lexeme: &str) -> Result<Option<Binding>, ResolutionError> {
        if self.scopes.is_empty() {
            return Err(ResolutionError::ScopeStackImbalance {
                operation: "lookup_global",
            });
        }
        Ok(self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.binding(lexeme)))
    }

    /// Every lexeme visible from the innermost scope, sorted
    #[must_use]
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.bindings.keys().map(String::as_str))
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of open scopes
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope is open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Innermost open scope
    #[must_use]
    pub fn current(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Scopes pushed over the table's lifetime
    #[must_use]
    pub fn scopes_opened(&self) -> u32 {
        self.last_id
    }

    /// Insertions over the table's lifetime
    #[must_use]
    pub fn bindings_created(&self) -> usize {
        self.inserted
    }
}

/// Open scope; pops it on drop
///
/// Dereferences to the [`ScopeTable`], so the scope's contents are built
/// through the guard.
#[derive(Debug)]
pub struct ScopeGuard<'table> {
    table: &'table mut ScopeTable,
    id: u32,
}

impl ScopeGuard<'_> {
    /// Id of the scope this guard keeps open
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = ScopeTable;

    fn deref(&self) -> &ScopeTable {
        self.table
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut ScopeTable {
        self.table
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        // nested guards borrow this one, so the innermost scope is ours
        debug_assert_eq!(self.table.current().map(Scope::id), Some(self.id));
        let _ = self.table.pop_scope();
    }
}
