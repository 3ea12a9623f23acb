//! Nested-name set derivation from dotted qualified names.
//!
//! A qualified name encodes the lexical scopes enclosing an entity:
//! `Outer.Inner.m` for a method of nested classes, `outer.<locals>.inner`
//! for a closure. The set of those unqualified scope names (including the
//! entity's own) is what the resolver consults to recognize
//! self-referential forward references before any evaluation runs.

use std::collections::HashSet;

use crate::entity::DecoratedEntity;

/// The synthetic component separating a function's body scope from the
/// names defined inside it.
const LOCALS_MARKER: &str = "<locals>";

/// Split a dotted qualified name into its scope components, dropping the
/// `<locals>` markers (they separate scopes but name none).
pub(crate) fn scope_components(qualname: &str) -> Vec<&str> {
    qualname
        .split('.')
        .filter(|component| !component.is_empty() && *component != LOCALS_MARKER)
        .collect()
}

/// Derive the set of unqualified names of every lexical scope enclosing
/// and including the entity.
///
/// Returns the empty set for non-nested entities. Pure; the caller caches
/// the result onto the entity's metadata.
pub fn nested_scope_names(entity: &DecoratedEntity) -> HashSet<String> {
    if !entity.is_nested() {
        return HashSet::new();
    }
    scope_components(entity.target().qualname())
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
