//! Runtime object model for hint evaluation.
//!
//! Type hints evaluate to runtime objects: classes, callables, modules,
//! type parameters, subscripted generic aliases, unions, and literal atoms.
//! This module models those objects as [`Value`] handles so that a
//! stringified annotation can be evaluated against a scope without a live
//! interpreter.
//!
//! Identity matters here: resolution must distinguish the class object
//! currently being constructed from a stale global of the same name, so
//! equality for `Arc`-backed variants is pointer equality, not structural.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::version::PythonVersion;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by operations on runtime objects.
///
/// Messages mirror the wording of the interpreter exceptions they model, so
/// the rendered cause in a resolution failure reads like the error a user
/// would have seen evaluating the annotation eagerly.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// Attribute lookup failed on an object's own namespace.
    #[error("{object} has no attribute '{attribute}'")]
    MissingAttribute { object: String, attribute: String },

    /// The object does not support subscription.
    #[error("{object} is not subscriptable")]
    NotSubscriptable { object: String },

    /// `X | Y` used on an interpreter without native union syntax.
    #[error("unsupported operand type(s) for |: '{left}' and '{right}'")]
    UnsupportedUnionOperands { left: String, right: String },
}

// ============================================================================
// Type Parameters
// ============================================================================

/// The kind of an implicitly bound type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeParamKind {
    /// An ordinary type variable (`T`).
    TypeVar,
    /// A variadic type-parameter pack (`*Ts`).
    TypeVarTuple,
    /// A parameter-specification parameter (`**P`).
    ParamSpec,
}

impl TypeParamKind {
    /// Returns the string representation used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeParamKind::TypeVar => "type variable",
            TypeParamKind::TypeVarTuple => "type variable tuple",
            TypeParamKind::ParamSpec => "parameter specification",
        }
    }
}

impl fmt::Display for TypeParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A type parameter implicitly bound by a generic declaration.
#[derive(Debug)]
pub struct TypeParamObject {
    name: String,
    kind: TypeParamKind,
}

impl TypeParamObject {
    /// Create a type parameter of the given kind.
    pub fn new(name: impl Into<String>, kind: TypeParamKind) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            kind,
        })
    }

    /// Create an ordinary type variable.
    pub fn type_var(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, TypeParamKind::TypeVar)
    }

    /// Create a variadic type-parameter pack.
    pub fn type_var_tuple(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, TypeParamKind::TypeVarTuple)
    }

    /// Create a parameter-specification parameter.
    pub fn param_spec(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, TypeParamKind::ParamSpec)
    }

    /// The parameter's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter's kind.
    pub fn kind(&self) -> TypeParamKind {
        self.kind
    }
}

// ============================================================================
// Classes
// ============================================================================

/// A class object.
///
/// Carries only what resolution needs: identifying names, the owning
/// module, the attributes the class itself declares (inherited attributes
/// are deliberately absent), and any implicitly declared type parameters.
#[derive(Debug, Default)]
pub struct ClassObject {
    name: String,
    qualname: String,
    module: Option<String>,
    attrs: HashMap<String, Value>,
    type_params: Vec<Arc<TypeParamObject>>,
}

impl ClassObject {
    /// Create a class whose qualified name equals its unqualified name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualname: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Set the dotted qualified name (e.g., `Outer.Inner`).
    #[must_use]
    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = qualname.into();
        self
    }

    /// Set the owning module's dotted name.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Declare an attribute directly in this class's namespace.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Declare an implicit type parameter on this class.
    #[must_use]
    pub fn with_type_param(mut self, param: Arc<TypeParamObject>) -> Self {
        self.type_params.push(param);
        self
    }

    /// Finish construction, producing a shared handle.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The unqualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dotted qualified name.
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// The owning module's dotted name, if known.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Look up an attribute declared directly in this class's namespace.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Iterate over the attributes this class itself declares.
    pub fn own_attrs(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attrs.iter()
    }

    /// The type parameters this class implicitly binds.
    pub fn type_params(&self) -> &[Arc<TypeParamObject>] {
        &self.type_params
    }
}

// ============================================================================
// Callables
// ============================================================================

/// How a callable was produced, as far as type-parameter scoping cares.
///
/// Only plain functions contribute their own implicit type parameters to
/// the forward scope; wrapper objects and callable instances do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallableKind {
    /// An ordinary function declared with `def`.
    #[default]
    Plain,
    /// A bound method or other descriptor-produced wrapper.
    BoundMethod,
    /// An instance of a class defining `__call__`.
    CallableInstance,
}

impl CallableKind {
    /// Whether this callable's own declaration binds type parameters.
    pub fn contributes_type_params(self) -> bool {
        matches!(self, CallableKind::Plain)
    }
}

/// A callable object.
#[derive(Debug, Default)]
pub struct FunctionObject {
    name: String,
    qualname: String,
    module: Option<String>,
    kind: CallableKind,
    type_params: Vec<Arc<TypeParamObject>>,
}

impl FunctionObject {
    /// Create a plain function whose qualified name equals its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualname: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Set the dotted qualified name (e.g., `Outer.Inner.m` or
    /// `outer.<locals>.inner`).
    #[must_use]
    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = qualname.into();
        self
    }

    /// Set the owning module's dotted name.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Set the callable kind.
    #[must_use]
    pub fn with_kind(mut self, kind: CallableKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declare an implicit type parameter on this callable.
    #[must_use]
    pub fn with_type_param(mut self, param: Arc<TypeParamObject>) -> Self {
        self.type_params.push(param);
        self
    }

    /// Finish construction, producing a shared handle.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The unqualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dotted qualified name.
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// The owning module's dotted name, if known.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// The callable kind.
    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    /// The type parameters this callable implicitly binds.
    pub fn type_params(&self) -> &[Arc<TypeParamObject>] {
        &self.type_params
    }
}

// ============================================================================
// Modules and Opaque Objects
// ============================================================================

/// A module object, supporting dotted-attribute hints such as
/// `collections.abc.Sequence`.
#[derive(Debug, Default)]
pub struct ModuleObject {
    name: String,
    attrs: HashMap<String, Value>,
}

impl ModuleObject {
    /// Create a module with the given dotted name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: HashMap::new(),
        }
    }

    /// Bind an attribute in the module's namespace.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Finish construction, producing a shared handle.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The module's dotted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a module attribute.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }
}

/// An arbitrary object with identity but no hint-relevant structure.
///
/// Stands in for builtin functions, constants, and placeholder bindings
/// such as the stale leftovers a reloaded module leaves behind.
#[derive(Debug)]
pub struct OpaqueObject {
    name: String,
}

impl OpaqueObject {
    /// Create an opaque object with the given display name.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into() })
    }

    /// The object's display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Values
// ============================================================================

/// A handle to a runtime object bound in a scope.
///
/// Cloning is cheap (shared handles for structured objects, owned data for
/// literal atoms). Equality is identity for `Arc`-backed variants and
/// structural for composites, so two distinct classes that merely share a
/// name never compare equal.
#[derive(Debug, Clone)]
pub enum Value {
    /// A class object.
    Class(Arc<ClassObject>),
    /// A callable object.
    Function(Arc<FunctionObject>),
    /// A module object.
    Module(Arc<ModuleObject>),
    /// An implicitly bound type parameter.
    TypeParam(Arc<TypeParamObject>),
    /// A subscripted generic alias (`origin[args]`).
    Generic {
        origin: Box<Value>,
        args: Vec<Value>,
    },
    /// A union of hint values (`X | Y`).
    Union(Vec<Value>),
    /// A bracketed argument list (`Callable[[int, str], bool]`).
    Sequence(Vec<Value>),
    /// A string literal (a nested, still-unresolved forward reference).
    Str(String),
    /// An integer literal (`Literal[3]`).
    Int(i64),
    /// A boolean literal.
    Bool(bool),
    /// The `None` singleton.
    None,
    /// The `...` singleton.
    Ellipsis,
    /// An arbitrary object with identity only.
    Opaque(Arc<OpaqueObject>),
}

impl Value {
    /// Create an opaque placeholder value with the given display name.
    pub fn opaque(name: impl Into<String>) -> Self {
        Value::Opaque(OpaqueObject::new(name))
    }

    /// A short noun for this value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Class(_) => "class",
            Value::Function(_) => "function",
            Value::Module(_) => "module",
            Value::TypeParam(_) => "type parameter",
            Value::Generic { .. } => "generic alias",
            Value::Union(_) => "union",
            Value::Sequence(_) => "sequence",
            Value::Str(_) => "str",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::None => "NoneType",
            Value::Ellipsis => "ellipsis",
            Value::Opaque(_) => "object",
        }
    }

    /// A rendering of this value for diagnostics, in the shape of the
    /// interpreter's own reprs (`<class 'Outer.Inner'>`, `list[int]`).
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Look up an attribute on this value.
    ///
    /// Only classes (own namespace) and modules support attribute access;
    /// every other kind fails typed.
    pub fn attr(&self, name: &str) -> Result<Value, ObjectError> {
        let found = match self {
            Value::Class(class) => class.attr(name).cloned(),
            Value::Module(module) => module.attr(name).cloned(),
            _ => None,
        };
        found.ok_or_else(|| ObjectError::MissingAttribute {
            object: self.describe(),
            attribute: name.to_string(),
        })
    }

    /// Subscript this value, producing a generic alias.
    ///
    /// Classes are the only subscriptable kind: builtin generic types,
    /// typing factories, and user generics are all modeled as classes.
    pub fn subscript(&self, args: Vec<Value>) -> Result<Value, ObjectError> {
        match self {
            Value::Class(_) => Ok(Value::Generic {
                origin: Box::new(self.clone()),
                args,
            }),
            _ => Err(ObjectError::NotSubscriptable {
                object: self.describe(),
            }),
        }
    }

    /// Combine this value with another under the `|` union operator.
    ///
    /// Fails with the unsupported-operand failure on interpreter versions
    /// without native union syntax. Members are flattened and deduplicated
    /// the way the interpreter's union type does.
    pub fn union_with(&self, other: &Value, version: PythonVersion) -> Result<Value, ObjectError> {
        if !version.has_native_unions() {
            return Err(ObjectError::UnsupportedUnionOperands {
                left: self.kind_name().to_string(),
                right: other.kind_name().to_string(),
            });
        }

        let mut members: Vec<Value> = Vec::new();
        for operand in [self, other] {
            match operand {
                Value::Union(existing) => {
                    for member in existing {
                        push_member(&mut members, member);
                    }
                }
                value => push_member(&mut members, value),
            }
        }

        if members.len() == 1 {
            // X | X collapses to X, matching the interpreter.
            return Ok(members.remove(0));
        }
        Ok(Value::Union(members))
    }
}

/// Append a union member unless an equal member is already present.
fn push_member(members: &mut Vec<Value>, value: &Value) {
    if !members.contains(value) {
        members.push(value.clone());
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Arc::ptr_eq(a, b),
            (Value::TypeParam(a), Value::TypeParam(b)) => Arc::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            (
                Value::Generic {
                    origin: ao,
                    args: aa,
                },
                Value::Generic {
                    origin: bo,
                    args: ba,
                },
            ) => ao == bo && aa == ba,
            (Value::Union(a), Value::Union(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::Ellipsis, Value::Ellipsis) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Class(class) => write!(f, "<class '{}'>", class.qualname()),
            Value::Function(func) => write!(f, "<function '{}'>", func.qualname()),
            Value::Module(module) => write!(f, "<module '{}'>", module.name()),
            Value::TypeParam(param) => write!(f, "{}", param.name()),
            Value::Generic { origin, args } => {
                match origin.as_ref() {
                    Value::Class(class) => write!(f, "{}", class.qualname())?,
                    other => write!(f, "{other}")?,
                }
                write!(f, "[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
            Value::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::None => write!(f, "None"),
            Value::Ellipsis => write!(f, "..."),
            Value::Opaque(obj) => write!(f, "<object '{}'>", obj.name()),
        }
    }
}

impl From<Arc<ClassObject>> for Value {
    fn from(class: Arc<ClassObject>) -> Self {
        Value::Class(class)
    }
}

impl From<Arc<FunctionObject>> for Value {
    fn from(func: Arc<FunctionObject>) -> Self {
        Value::Function(func)
    }
}

impl From<Arc<ModuleObject>> for Value {
    fn from(module: Arc<ModuleObject>) -> Self {
        Value::Module(module)
    }
}

impl From<Arc<TypeParamObject>> for Value {
    fn from(param: Arc<TypeParamObject>) -> Self {
        Value::TypeParam(param)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_identity_equality() {
        let a = ClassObject::new("Node").shared();
        let b = ClassObject::new("Node").shared();

        // Same name, distinct objects: never equal.
        assert_ne!(Value::Class(a.clone()), Value::Class(b));
        // Same handle: equal.
        assert_eq!(Value::Class(a.clone()), Value::Class(a));
    }

    #[test]
    fn test_subscript_class_yields_generic() {
        let list = ClassObject::new("list").shared();
        let int = ClassObject::new("int").shared();

        let alias = Value::Class(list.clone())
            .subscript(vec![Value::Class(int.clone())])
            .unwrap();
        assert_eq!(
            alias,
            Value::Generic {
                origin: Box::new(Value::Class(list)),
                args: vec![Value::Class(int)],
            }
        );
        assert_eq!(alias.to_string(), "list[int]");
    }

    #[test]
    fn test_subscript_non_class_fails() {
        let err = Value::Int(3).subscript(vec![]).unwrap_err();
        assert!(matches!(err, ObjectError::NotSubscriptable { .. }));
        assert!(err.to_string().contains("not subscriptable"));
    }

    #[test]
    fn test_attr_on_class_own_namespace_only() {
        let inner = ClassObject::new("Inner").shared();
        let outer = ClassObject::new("Outer")
            .with_attr("Inner", Value::Class(inner.clone()))
            .shared();

        let value = Value::Class(outer.clone()).attr("Inner").unwrap();
        assert_eq!(value, Value::Class(inner));

        let err = Value::Class(outer).attr("missing").unwrap_err();
        assert!(err.to_string().contains("has no attribute 'missing'"));
    }

    #[test]
    fn test_attr_on_module() {
        let seq = ClassObject::new("Sequence").shared();
        let abc = ModuleObject::new("collections.abc")
            .with_attr("Sequence", Value::Class(seq.clone()))
            .shared();

        let value = Value::Module(abc).attr("Sequence").unwrap();
        assert_eq!(value, Value::Class(seq));
    }

    #[test]
    fn test_union_flattens_and_dedups() {
        let int = ClassObject::new("int").shared();
        let str_ = ClassObject::new("str").shared();
        let none = Value::None;

        let ab = Value::Class(int.clone())
            .union_with(&Value::Class(str_.clone()), PythonVersion::V3_10)
            .unwrap();
        let abc = ab.union_with(&none, PythonVersion::V3_10).unwrap();
        assert_eq!(
            abc,
            Value::Union(vec![
                Value::Class(int.clone()),
                Value::Class(str_),
                Value::None
            ])
        );

        // X | X collapses to X.
        let same = Value::Class(int.clone())
            .union_with(&Value::Class(int.clone()), PythonVersion::V3_10)
            .unwrap();
        assert_eq!(same, Value::Class(int));
    }

    #[test]
    fn test_union_rejected_before_3_10() {
        let int = ClassObject::new("int").shared();
        let str_ = ClassObject::new("str").shared();

        let err = Value::Class(int)
            .union_with(&Value::Class(str_), PythonVersion::V3_9)
            .unwrap_err();
        assert!(matches!(err, ObjectError::UnsupportedUnionOperands { .. }));
        assert!(err.to_string().contains("unsupported operand type(s) for |"));
    }

    #[test]
    fn test_display_renderings() {
        let node = ClassObject::new("Node").with_qualname("tree.Node").shared();
        assert_eq!(Value::Class(node).to_string(), "<class 'tree.Node'>");
        assert_eq!(Value::Str("Leaf".to_string()).to_string(), "'Leaf'");
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Ellipsis.to_string(), "...");
        assert_eq!(Value::Bool(true).to_string(), "True");
    }

    #[test]
    fn test_callable_kind_contribution() {
        assert!(CallableKind::Plain.contributes_type_params());
        assert!(!CallableKind::BoundMethod.contributes_type_params());
        assert!(!CallableKind::CallableInstance.contributes_type_params());
    }
}
