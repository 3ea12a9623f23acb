//! Scope maps and the layered forward scope.
//!
//! A [`ScopeMap`] is a flat name-to-value mapping: one lexical layer
//! (builtins, a module's globals, a frame's locals). A [`ForwardScope`] is
//! the composite the resolver evaluates hints against: primed with the
//! builtin namespace, then layered so that later merges overwrite earlier
//! ones. The layering order is the engine's central invariant:
//!
//! ```text
//! builtins < module globals < enclosing locals < type parameters
//! ```
//!
//! where `<` means "overridden by".

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::builtins::builtin_scope;
use crate::object::Value;

/// One flat lexical layer: names bound to values.
pub type ScopeMap = HashMap<String, Value>;

// ============================================================================
// ForwardScope
// ============================================================================

/// The composite scope a stringified hint is evaluated against.
///
/// Lookups that miss the composite mapping fall back to the builtin
/// namespace. Priming makes that fallback nearly unreachable, but it keeps
/// lookup total and mirrors the name resolution the interpreter itself
/// would have performed.
#[derive(Debug, Clone, Default)]
pub struct ForwardScope {
    names: ScopeMap,
}

impl ForwardScope {
    /// An empty scope with no layers merged. Lookups still reach builtins
    /// through the fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A scope primed with every builtin binding (layering step one).
    pub fn primed() -> Self {
        Self {
            names: builtin_scope().clone(),
        }
    }

    /// Merge a layer into the scope. Names in the layer overwrite existing
    /// bindings: the caller's merge order is the precedence order.
    pub fn merge(&mut self, layer: impl IntoIterator<Item = (String, Value)>) {
        self.names.extend(layer);
    }

    /// Bind a single name, overwriting any existing binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.names.insert(name.into(), value);
    }

    /// Look up a name, falling back to the builtin namespace on a miss.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.names.get(name).or_else(|| builtin_scope().get(name))
    }

    /// Whether the composite mapping itself binds the name (the builtin
    /// fallback is not consulted).
    pub fn binds(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Number of bindings in the composite mapping.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the composite mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Snapshot the scope for diagnostics.
    pub fn dump(&self) -> ScopeDump {
        ScopeDump {
            names: self
                .names
                .iter()
                .map(|(name, value)| (name.clone(), value.kind_name().to_string()))
                .collect(),
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A serializable snapshot of a forward scope: each bound name mapped to
/// the kind of value it is bound to. Attached to resolution failures when
/// the resolver is configured to dump scopes.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeDump {
    /// Bound names, sorted, each mapped to its value's kind.
    pub names: BTreeMap<String, String>,
}

impl ScopeDump {
    /// Render the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| "<scope dump unavailable>".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
