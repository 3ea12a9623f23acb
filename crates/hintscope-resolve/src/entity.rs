//! Decorated entities and their per-entity resolution metadata.
//!
//! A [`DecoratedEntity`] is one callable or class whose annotations are
//! being resolved, together with the decoration context the engine needs:
//! whether it is lexically nested, the stack of classes currently being
//! decorated around it, its owning module, and whether its annotations were
//! stringified by deferred evaluation.
//!
//! [`ResolutionMetadata`] caches the expensive derived state. The cache is
//! keyed by entity *identity*, never by hint value: the same hint string
//! legitimately resolves to different objects depending on which entity it
//! annotates, so a global memoization table would be unsound. Callers who
//! need fresh resolution against a different scope construct a new entity.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;

use hintscope_core::object::{ClassObject, FunctionObject};
use hintscope_core::scope::{ForwardScope, ScopeMap};

use crate::nested::scope_components;

// ============================================================================
// Hint Target
// ============================================================================

/// The innermost, unwrapped object actually carrying annotations.
#[derive(Debug, Clone)]
pub enum HintTarget {
    /// A callable object.
    Function(Arc<FunctionObject>),
    /// A class object (annotated class attributes).
    Class(Arc<ClassObject>),
}

impl HintTarget {
    /// The unqualified name.
    pub fn name(&self) -> &str {
        match self {
            HintTarget::Function(f) => f.name(),
            HintTarget::Class(c) => c.name(),
        }
    }

    /// The dotted qualified name.
    pub fn qualname(&self) -> &str {
        match self {
            HintTarget::Function(f) => f.qualname(),
            HintTarget::Class(c) => c.qualname(),
        }
    }

    /// The owning module's dotted name, if known.
    pub fn module(&self) -> Option<&str> {
        match self {
            HintTarget::Function(f) => f.module(),
            HintTarget::Class(c) => c.module(),
        }
    }

    /// The underlying callable, when the target is one.
    pub fn as_function(&self) -> Option<&Arc<FunctionObject>> {
        match self {
            HintTarget::Function(f) => Some(f),
            HintTarget::Class(_) => None,
        }
    }

    /// A noun for this target's kind, used in diagnostics.
    pub fn kind_noun(&self) -> &'static str {
        match self {
            HintTarget::Function(_) => "callable",
            HintTarget::Class(_) => "class",
        }
    }
}

impl From<Arc<FunctionObject>> for HintTarget {
    fn from(func: Arc<FunctionObject>) -> Self {
        HintTarget::Function(func)
    }
}

impl From<Arc<ClassObject>> for HintTarget {
    fn from(class: Arc<ClassObject>) -> Self {
        HintTarget::Class(class)
    }
}

// ============================================================================
// Resolution Metadata
// ============================================================================

/// Per-entity caches, each computed at most once and frozen afterwards.
///
/// Fields transition `unset -> computed -> frozen` independently:
/// `local_scope` may stay unset forever for a non-nested entity, and
/// `forward_scope` is only built when a hint actually needs evaluation.
#[derive(Debug, Default)]
pub struct ResolutionMetadata {
    nested_names: OnceCell<HashSet<String>>,
    local_scope: OnceCell<ScopeMap>,
    forward_scope: OnceCell<ForwardScope>,
}

impl ResolutionMetadata {
    /// The nested-name set, computing it on first access.
    pub fn nested_names_or_compute(
        &self,
        compute: impl FnOnce() -> HashSet<String>,
    ) -> &HashSet<String> {
        self.nested_names.get_or_init(compute)
    }

    /// The enclosing-function local scope, computing it on first access.
    /// A failed computation leaves the cell unset.
    pub fn local_scope_or_compute<E>(
        &self,
        compute: impl FnOnce() -> Result<ScopeMap, E>,
    ) -> Result<&ScopeMap, E> {
        if let Some(cached) = self.local_scope.get() {
            return Ok(cached);
        }
        let computed = compute()?;
        Ok(self.local_scope.get_or_init(|| computed))
    }

    /// The composite forward scope, computing it on first access.
    /// A failed computation leaves the cell unset.
    pub fn forward_scope_or_compute<E>(
        &self,
        compute: impl FnOnce() -> Result<ForwardScope, E>,
    ) -> Result<&ForwardScope, E> {
        if let Some(cached) = self.forward_scope.get() {
            return Ok(cached);
        }
        let computed = compute()?;
        Ok(self.forward_scope.get_or_init(|| computed))
    }

    /// Whether the nested-name set has been computed.
    pub fn has_nested_names(&self) -> bool {
        self.nested_names.get().is_some()
    }

    /// Whether the composite forward scope has been computed.
    pub fn has_forward_scope(&self) -> bool {
        self.forward_scope.get().is_some()
    }
}

// ============================================================================
// Decorated Entity
// ============================================================================

/// One callable or class undergoing hint resolution.
///
/// Owns its [`ResolutionMetadata`] one-to-one; the metadata lives exactly
/// as long as the entity and is never invalidated.
#[derive(Debug)]
pub struct DecoratedEntity {
    target: HintTarget,
    is_nested: bool,
    class_stack: Vec<Arc<ClassObject>>,
    module: Option<String>,
    deferred_annotations: bool,
    metadata: ResolutionMetadata,
}

impl DecoratedEntity {
    /// Create an entity for the given target.
    ///
    /// The owning module defaults to the target's own, and nesting is
    /// inferred from the qualified name (more than one scope component).
    /// Both can be overridden.
    pub fn new(target: impl Into<HintTarget>) -> Self {
        let target = target.into();
        let is_nested = scope_components(target.qualname()).len() > 1;
        let module = target.module().map(str::to_string);
        Self {
            target,
            is_nested,
            class_stack: Vec::new(),
            module,
            deferred_annotations: false,
            metadata: ResolutionMetadata::default(),
        }
    }

    /// Set the stack of classes currently being decorated around this
    /// entity, outermost first.
    #[must_use]
    pub fn with_class_stack(mut self, stack: Vec<Arc<ClassObject>>) -> Self {
        self.class_stack = stack;
        self
    }

    /// Override the inferred nesting flag.
    #[must_use]
    pub fn with_nested(mut self, is_nested: bool) -> Self {
        self.is_nested = is_nested;
        self
    }

    /// Override the owning module.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Mark the owning module as undeterminable.
    #[must_use]
    pub fn without_module(mut self) -> Self {
        self.module = None;
        self
    }

    /// Mark this entity's annotations as stringified by deferred
    /// evaluation semantics.
    #[must_use]
    pub fn with_deferred_annotations(mut self, deferred: bool) -> Self {
        self.deferred_annotations = deferred;
        self
    }

    /// The annotated object.
    pub fn target(&self) -> &HintTarget {
        &self.target
    }

    /// Whether this entity is lexically declared inside another function
    /// or class body.
    pub fn is_nested(&self) -> bool {
        self.is_nested
    }

    /// Classes currently being decorated around this entity, outermost
    /// first. Empty when the entity is not a method of classes currently
    /// under decoration.
    pub fn class_stack(&self) -> &[Arc<ClassObject>] {
        &self.class_stack
    }

    /// The owning module's dotted name, if determinable.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Whether annotations were stringified by deferred evaluation.
    pub fn deferred_annotations(&self) -> bool {
        self.deferred_annotations
    }

    /// The per-entity caches.
    pub fn metadata(&self) -> &ResolutionMetadata {
        &self.metadata
    }

    /// Identify this entity for diagnostics, e.g.
    /// `callable 'pkg.mod.Outer.Inner.m'`.
    pub fn describe(&self) -> String {
        match &self.module {
            Some(module) => format!(
                "{} '{}.{}'",
                self.target.kind_noun(),
                module,
                self.target.qualname()
            ),
            None => format!("{} '{}'", self.target.kind_noun(), self.target.qualname()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_inferred_from_qualname() {
        let top = DecoratedEntity::new(FunctionObject::new("f").shared());
        assert!(!top.is_nested());

        let nested = DecoratedEntity::new(
            FunctionObject::new("g")
                .with_qualname("outer.<locals>.g")
                .shared(),
        );
        assert!(nested.is_nested());

        let method = DecoratedEntity::new(
            FunctionObject::new("m").with_qualname("Outer.m").shared(),
        );
        assert!(method.is_nested());
    }

    #[test]
    fn test_module_defaults_from_target() {
        let entity = DecoratedEntity::new(
            FunctionObject::new("f").with_module("pkg.mod").shared(),
        );
        assert_eq!(entity.module(), Some("pkg.mod"));

        let orphan = DecoratedEntity::new(FunctionObject::new("f").shared());
        assert_eq!(orphan.module(), None);
    }

    #[test]
    fn test_describe_includes_module_and_qualname() {
        let entity = DecoratedEntity::new(
            FunctionObject::new("m")
                .with_qualname("Outer.m")
                .with_module("pkg.mod")
                .shared(),
        );
        assert_eq!(entity.describe(), "callable 'pkg.mod.Outer.m'");

        let orphan = DecoratedEntity::new(ClassObject::new("C").shared());
        assert_eq!(orphan.describe(), "class 'C'");
    }

    #[test]
    fn test_metadata_computes_once() {
        let metadata = ResolutionMetadata::default();
        let mut calls = 0;
        for _ in 0..3 {
            metadata.nested_names_or_compute(|| {
                calls += 1;
                HashSet::from(["f".to_string()])
            });
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_metadata_failed_compute_leaves_cell_unset() {
        let metadata = ResolutionMetadata::default();
        let failed: Result<&ForwardScope, &str> =
            metadata.forward_scope_or_compute(|| Err("no module"));
        assert!(failed.is_err());
        assert!(!metadata.has_forward_scope());

        let ok: Result<&ForwardScope, &str> =
            metadata.forward_scope_or_compute(|| Ok(ForwardScope::empty()));
        assert!(ok.is_ok());
        assert!(metadata.has_forward_scope());
    }
}
