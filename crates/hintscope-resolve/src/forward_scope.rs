//! Composite forward scope assembly.
//!
//! Builds the one scope a decorated entity's stringified hints evaluate
//! against. Layers merge in a strict order, later layers overwriting
//! earlier ones:
//!
//! 1. the builtin namespace;
//! 2. the defining module's globals;
//! 3. for nested entities, the enclosing function's locals, with the
//!    outermost and immediately enclosing class names synthesized in and
//!    the innermost class's own attributes merged over them;
//! 4. implicit type parameters, collected into a pooled scratch map and
//!    merged last so they shadow everything.
//!
//! Step 3 exists because the interpreter being modeled does not treat
//! nested classes as enclosing lexical scopes: a method's annotations can
//! name the classes wrapping it, yet those names are neither globals nor
//! frame locals while the classes are mid-construction. They are injected
//! here, as an explicit side table, rather than coaxed out of the frame
//! walk.

use tracing::{debug, trace};

use hintscope_core::error::ResolveError;
use hintscope_core::object::Value;
use hintscope_core::pool::acquire_scratch_map;
use hintscope_core::scope::{ForwardScope, ScopeMap};
use hintscope_core::version::PythonVersion;

use crate::entity::{DecoratedEntity, HintTarget};
use crate::oracle::{OracleError, ScopeOracle};
use crate::typeparams::{collect_type_params, Declaration};

/// Frames the resolution machinery itself interposes above the enclosing
/// function: exactly one, for the resolver's own call.
const RESOLVER_FRAMES_TO_SKIP: usize = 1;

/// Assemble the composite forward scope for `entity`.
///
/// The caller has already established that the entity has an owning
/// module; a missing or unregistered module namespace is still surfaced
/// as the fatal scope-unresolvable error.
pub fn build_forward_scope(
    entity: &DecoratedEntity,
    oracle: &dyn ScopeOracle,
    version: PythonVersion,
    prefix: &str,
) -> Result<ForwardScope, ResolveError> {
    // Layer 1: builtins.
    let mut scope = ForwardScope::primed();

    // Layer 2: module globals. Without these, nothing is resolvable.
    let globals = oracle
        .get_globals(entity.target())
        .map_err(|err| ResolveError::scope_unresolvable(prefix, entity.describe(), err.to_string()))?;
    trace!(globals = globals.len(), "merged module globals");
    scope.merge(globals);

    // Layer 3: enclosing locals, nested entities only. Skipping the layer
    // entirely for top-level entities avoids a pointless oracle call.
    if entity.is_nested() {
        let locals = entity.metadata().local_scope_or_compute(|| {
            match oracle.get_locals(
                entity.target(),
                entity.class_stack().len(),
                RESOLVER_FRAMES_TO_SKIP,
            ) {
                Ok(locals) => Ok(locals),
                Err(OracleError::ScopeNotFound { .. }) => {
                    // Declaration-time frames are gone (late resolution by
                    // an external caller). Recover with the empty mapping.
                    debug!(
                        entity = %entity.describe(),
                        "enclosing local scope not found; substituting empty mapping"
                    );
                    Ok(ScopeMap::new())
                }
                Err(err) => Err(ResolveError::internal(err.to_string())),
            }
        })?;

        let mut local_layer = locals.clone();
        if let (Some(outermost), Some(innermost)) =
            (entity.class_stack().first(), entity.class_stack().last())
        {
            // Mid-construction classes are invisible to the frame walk;
            // bind the two names annotations actually use, then let the
            // innermost class's own attributes win over captured locals.
            local_layer.insert(
                outermost.name().to_string(),
                Value::Class(outermost.clone()),
            );
            local_layer.insert(
                innermost.name().to_string(),
                Value::Class(innermost.clone()),
            );
            for (name, value) in innermost.own_attrs() {
                local_layer.insert(name.clone(), value.clone());
            }
        }
        trace!(locals = local_layer.len(), "merged enclosing locals");
        scope.merge(local_layer);
    }

    // Layer 4: implicit type parameters, merged last so they shadow
    // same-named classes, locals, and globals alike.
    if version.has_type_parameter_syntax() {
        let mut scratch = acquire_scratch_map();
        for class in entity.class_stack() {
            collect_type_params(Declaration::Class(class), version, &mut scratch);
        }
        if let HintTarget::Function(func) = entity.target() {
            collect_type_params(Declaration::Callable(func), version, &mut scratch);
        }
        trace!(type_params = scratch.len(), "merged type parameters");
        scope.merge(scratch.drain());
        // Guard drop returns the scratch map to the pool.
    }

    debug!(
        entity = %entity.describe(),
        bindings = scope.len(),
        "composite forward scope assembled"
    );
    Ok(scope)
}

// ============================================================================
// Tests
// ============================================================================
