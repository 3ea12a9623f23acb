//! The reference resolver: stringified hint in, concrete hint object out.
//!
//! [`HintResolver::resolve`] is the engine's sole public entry point,
//! called once per stringified annotation by a decoration pipeline. Each
//! call either short-circuits a self-referential hint (leaving it for lazy
//! downstream resolution), or evaluates the hint against the entity's
//! composite forward scope, converting any evaluation failure into a
//! typed, contextualized error.
//!
//! Resolution failure is never transient; nothing here retries.

use tracing::{debug, trace};

use hintscope_core::error::{ResolutionErrorKind, ResolveError};
use hintscope_core::object::{ObjectError, Value};
use hintscope_core::scope::ForwardScope;
use hintscope_core::version::PythonVersion;

use crate::entity::DecoratedEntity;
use crate::expr::{evaluate_hint, EvalError};
use crate::forward_scope::build_forward_scope;
use crate::nested::nested_scope_names;
use crate::oracle::ScopeOracle;

// ============================================================================
// Resolution Outcome
// ============================================================================

/// The outcome of resolving one stringified hint.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The hint names an enclosing scope of its own entity and is left
    /// unresolved, to be bound lazily at first actual use.
    Deferred(String),
    /// The concrete hint object the string denotes.
    Hint(Value),
}

impl Resolved {
    /// Whether resolution was deliberately deferred.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Resolved::Deferred(_))
    }

    /// The resolved hint value, if resolution produced one.
    pub fn as_hint(&self) -> Option<&Value> {
        match self {
            Resolved::Hint(value) => Some(value),
            Resolved::Deferred(_) => None,
        }
    }

    /// Consume the outcome, yielding the resolved hint value if any.
    pub fn into_hint(self) -> Option<Value> {
        match self {
            Resolved::Hint(value) => Some(value),
            Resolved::Deferred(_) => None,
        }
    }
}

// ============================================================================
// Hint Resolver
// ============================================================================

/// Resolves forward-reference hints against per-entity forward scopes.
///
/// Holds the scope oracle, the modeled interpreter version, and the
/// dump-scope-on-error flag. All per-entity state lives on the entity's
/// own metadata, so one resolver serves any number of entities.
#[derive(Debug)]
pub struct HintResolver<O> {
    oracle: O,
    version: PythonVersion,
    dump_scope_on_error: bool,
}

impl<O: ScopeOracle> HintResolver<O> {
    /// Create a resolver over the given oracle, modeling the permissive
    /// (newest) interpreter version.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            version: PythonVersion::default(),
            dump_scope_on_error: false,
        }
    }

    /// Model a specific interpreter version.
    #[must_use]
    pub fn with_version(mut self, version: PythonVersion) -> Self {
        self.version = version;
        self
    }

    /// Attach a JSON snapshot of the composite scope to resolution
    /// failures. Off by default; the dumps are large.
    #[must_use]
    pub fn with_scope_dump(mut self, dump: bool) -> Self {
        self.dump_scope_on_error = dump;
        self
    }

    /// The modeled interpreter version.
    pub fn version(&self) -> PythonVersion {
        self.version
    }

    /// The underlying scope oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Resolve one stringified hint for one decorated entity.
    ///
    /// `error_kind` tags which annotation pathway requested resolution and
    /// `error_prefix` prefixes every produced message, so failures read in
    /// the caller's voice.
    ///
    /// A bare hint equal to the name of a scope enclosing the entity is
    /// returned as [`Resolved::Deferred`] without evaluation: the named
    /// scope is mid-construction, and a same-named global is either absent
    /// or a stale leftover, so eager evaluation would bind the wrong
    /// object. This protection applies to bare single identifiers only.
    /// The same name *inside* a larger hint (say, the argument of
    /// `list[Outer]`) is evaluated ordinarily: it resolves to the live
    /// class when one is on the decoration stack, and otherwise fails with
    /// the ordinary resolution error. That narrower protection is a known
    /// limitation, kept deliberately.
    pub fn resolve(
        &self,
        hint: &str,
        entity: &DecoratedEntity,
        error_kind: ResolutionErrorKind,
        error_prefix: &str,
    ) -> Result<Resolved, ResolveError> {
        if hint.trim().is_empty() {
            return Err(ResolveError::EmptyHint {
                prefix: error_prefix.to_string(),
                entity: entity.describe(),
            });
        }

        // Self-reference short-circuit, before any scope work.
        let nested = entity
            .metadata()
            .nested_names_or_compute(|| nested_scope_names(entity));
        if nested.contains(hint) {
            debug!(
                hint,
                entity = %entity.describe(),
                "self-referential forward reference left deferred"
            );
            return Ok(Resolved::Deferred(hint.to_string()));
        }

        // Without an owning module there are no globals to resolve
        // against: fatal, before any scope construction.
        if entity.module().is_none() {
            return Err(ResolveError::scope_unresolvable(
                error_prefix,
                entity.describe(),
                "the object declares no owning module, so no global namespace exists \
                 to resolve against",
            ));
        }

        let scope = entity.metadata().forward_scope_or_compute(|| {
            build_forward_scope(entity, &self.oracle, self.version, error_prefix)
        })?;

        match evaluate_hint(hint, scope, self.version) {
            Ok(value) => {
                trace!(hint, resolved = %value, "forward reference resolved");
                Ok(Resolved::Hint(value))
            }
            Err(failure) => {
                Err(self.evaluation_failure(hint, entity, error_kind, error_prefix, failure, scope))
            }
        }
    }

    /// Convert an evaluation failure into the surfaced error.
    fn evaluation_failure(
        &self,
        hint: &str,
        entity: &DecoratedEntity,
        error_kind: ResolutionErrorKind,
        error_prefix: &str,
        failure: EvalError,
        scope: &ForwardScope,
    ) -> ResolveError {
        // A union-operand failure on a pre-3.10 interpreter, for an entity
        // whose annotations were silently stringified by deferred
        // evaluation, gets the refined error with remediation guidance.
        if let EvalError::Object(ObjectError::UnsupportedUnionOperands { .. }) = &failure {
            if !self.version.has_native_unions() && entity.deferred_annotations() {
                return ResolveError::UnsupportedUnionSyntax {
                    prefix: error_prefix.to_string(),
                    kind: error_kind,
                    hint: hint.to_string(),
                    entity: entity.describe(),
                    version: self.version,
                };
            }
        }

        ResolveError::UnresolvableHint {
            prefix: error_prefix.to_string(),
            kind: error_kind,
            hint: hint.to_string(),
            entity: entity.describe(),
            cause: failure.to_string(),
            scope_dump: self
                .dump_scope_on_error
                .then(|| scope.dump().to_json()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hintscope_core::error::ErrorCode;
    use hintscope_core::object::FunctionObject;
    use hintscope_core::scope::ScopeMap;

    use crate::oracle::FrameStackOracle;

    fn simple_entity() -> DecoratedEntity {
        DecoratedEntity::new(FunctionObject::new("f").with_module("m").shared())
    }

    fn simple_resolver() -> HintResolver<FrameStackOracle> {
        HintResolver::new(FrameStackOracle::new().with_module("m", ScopeMap::new()))
    }

    #[test]
    fn test_empty_hint_is_invalid() {
        let resolver = simple_resolver();
        let entity = simple_entity();
        let err = resolver
            .resolve("", &entity, ResolutionErrorKind::ForwardReference, "")
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidHint);
    }

    #[test]
    fn test_error_carries_kind_and_prefix() {
        let resolver = simple_resolver();
        let entity = simple_entity();
        let err = resolver
            .resolve(
                "Ghost",
                &entity,
                ResolutionErrorKind::PostponedAnnotation,
                "check_annotations() ",
            )
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("check_annotations() "));
        assert!(msg.contains("postponed annotation"));
        assert!(msg.contains("\"Ghost\""));
    }

    #[test]
    fn test_scope_dump_attached_when_enabled() {
        let resolver = simple_resolver().with_scope_dump(true);
        let entity = simple_entity();
        let err = resolver
            .resolve("Ghost", &entity, ResolutionErrorKind::ForwardReference, "")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("forward scope:"));
        assert!(msg.contains("\"str\""));
    }

    #[test]
    fn test_resolved_accessors() {
        let deferred = Resolved::Deferred("Node".to_string());
        assert!(deferred.is_deferred());
        assert!(deferred.as_hint().is_none());
        assert!(deferred.into_hint().is_none());

        let hint = Resolved::Hint(Value::Int(3));
        assert!(!hint.is_deferred());
        assert_eq!(hint.into_hint(), Some(Value::Int(3)));
    }
}
