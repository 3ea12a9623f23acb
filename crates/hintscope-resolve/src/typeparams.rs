//! Implicit type-parameter collection for generic declarations.
//!
//! On interpreters with type-parameter syntax, `class C[T]:` and
//! `def f[T]()` bind `T` into an implicit scope that shadows every other
//! binding of the same name inside the declaration. This module extracts
//! those bindings into a caller-provided mapping; the composite scope
//! builder merges that mapping last so the shadowing holds.
//!
//! Shadowing between nested declarations is silent: collecting outermost
//! to innermost makes inner parameters overwrite outer ones of the same
//! name. Sibling-level clash detection is out of scope.

use std::sync::Arc;

use hintscope_core::object::{ClassObject, FunctionObject, Value};
use hintscope_core::scope::ScopeMap;
use hintscope_core::version::PythonVersion;

/// A declaration that may implicitly bind type parameters.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    /// A class declaration.
    Class(&'a Arc<ClassObject>),
    /// A callable declaration.
    Callable(&'a Arc<FunctionObject>),
}

/// Append every type parameter implicitly bound by `decl` into `into`.
///
/// No-ops on versions without type-parameter syntax, and for callables
/// whose kind does not contribute parameters (only plain functions carry
/// their own declaration).
pub fn collect_type_params(decl: Declaration<'_>, version: PythonVersion, into: &mut ScopeMap) {
    if !version.has_type_parameter_syntax() {
        return;
    }
    let params = match decl {
        Declaration::Class(class) => class.type_params(),
        Declaration::Callable(func) => {
            if !func.kind().contributes_type_params() {
                return;
            }
            func.type_params()
        }
    };
    for param in params {
        into.insert(param.name().to_string(), Value::TypeParam(param.clone()));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hintscope_core::object::{CallableKind, TypeParamObject};

    #[test]
    fn test_collects_class_parameters() {
        let t = TypeParamObject::type_var("T");
        let p = TypeParamObject::param_spec("P");
        let class = ClassObject::new("C")
            .with_type_param(t.clone())
            .with_type_param(p.clone())
            .shared();

        let mut scope = ScopeMap::new();
        collect_type_params(
            Declaration::Class(&class),
            PythonVersion::V3_12,
            &mut scope,
        );
        assert_eq!(scope.get("T"), Some(&Value::TypeParam(t)));
        assert_eq!(scope.get("P"), Some(&Value::TypeParam(p)));
    }

    #[test]
    fn test_noop_without_type_parameter_syntax() {
        let class = ClassObject::new("C")
            .with_type_param(TypeParamObject::type_var("T"))
            .shared();

        let mut scope = ScopeMap::new();
        collect_type_params(
            Declaration::Class(&class),
            PythonVersion::V3_11,
            &mut scope,
        );
        assert!(scope.is_empty());
    }

    #[test]
    fn test_non_plain_callable_contributes_nothing() {
        let func = FunctionObject::new("m")
            .with_kind(CallableKind::BoundMethod)
            .with_type_param(TypeParamObject::type_var("T"))
            .shared();

        let mut scope = ScopeMap::new();
        collect_type_params(
            Declaration::Callable(&func),
            PythonVersion::V3_12,
            &mut scope,
        );
        assert!(scope.is_empty());
    }

    #[test]
    fn test_inner_declaration_shadows_outer() {
        let outer_t = TypeParamObject::type_var("T");
        let inner_t = TypeParamObject::type_var("T");
        let outer = ClassObject::new("Outer")
            .with_type_param(outer_t.clone())
            .shared();
        let inner = ClassObject::new("Inner")
            .with_type_param(inner_t.clone())
            .shared();

        let mut scope = ScopeMap::new();
        collect_type_params(
            Declaration::Class(&outer),
            PythonVersion::V3_12,
            &mut scope,
        );
        collect_type_params(
            Declaration::Class(&inner),
            PythonVersion::V3_12,
            &mut scope,
        );
        assert_eq!(scope.get("T"), Some(&Value::TypeParam(inner_t)));
        assert_ne!(scope.get("T"), Some(&Value::TypeParam(outer_t)));
    }
}
