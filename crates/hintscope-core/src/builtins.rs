//! The builtin namespace and the conventional typing factory names.
//!
//! The forward scope is primed with every builtin binding before any other
//! layer merges in. Priming explicitly, rather than leaning on an
//! implementation-specific fallback hook, keeps the composite scope
//! predictable and inspectable.
//!
//! Typing factories (`List`, `Optional`, `Union`, ...) are *not* builtins:
//! a real module only sees them after importing them. [`typing_scope`]
//! produces bindings for them so embedders can merge the conventional names
//! into a module's global namespace.

use std::sync::OnceLock;

use crate::object::{ClassObject, Value};
use crate::scope::ScopeMap;

// ============================================================================
// Name Tables
// ============================================================================

/// Builtin types, bound as class objects.
const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "bytearray",
    "bytes",
    "complex",
    "dict",
    "float",
    "frozenset",
    "int",
    "list",
    "memoryview",
    "object",
    "property",
    "range",
    "set",
    "slice",
    "str",
    "tuple",
    "type",
];

/// Builtin exception types, bound as class objects.
const BUILTIN_EXCEPTIONS: &[&str] = &[
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "BaseException",
    "BlockingIOError",
    "BrokenPipeError",
    "BufferError",
    "BytesWarning",
    "ChildProcessError",
    "ConnectionAbortedError",
    "ConnectionError",
    "ConnectionRefusedError",
    "ConnectionResetError",
    "DeprecationWarning",
    "EOFError",
    "EnvironmentError",
    "Exception",
    "FileExistsError",
    "FileNotFoundError",
    "FloatingPointError",
    "FutureWarning",
    "GeneratorExit",
    "IOError",
    "ImportError",
    "ImportWarning",
    "IndentationError",
    "IndexError",
    "InterruptedError",
    "IsADirectoryError",
    "KeyError",
    "KeyboardInterrupt",
    "LookupError",
    "MemoryError",
    "ModuleNotFoundError",
    "NameError",
    "NotADirectoryError",
    "NotImplementedError",
    "OSError",
    "OverflowError",
    "PendingDeprecationWarning",
    "PermissionError",
    "ProcessLookupError",
    "RecursionError",
    "ReferenceError",
    "ResourceWarning",
    "RuntimeError",
    "RuntimeWarning",
    "StopAsyncIteration",
    "StopIteration",
    "SyntaxError",
    "SyntaxWarning",
    "SystemError",
    "SystemExit",
    "TabError",
    "TimeoutError",
    "TypeError",
    "UnboundLocalError",
    "UnicodeDecodeError",
    "UnicodeEncodeError",
    "UnicodeError",
    "UnicodeTranslateError",
    "UnicodeWarning",
    "UserWarning",
    "ValueError",
    "Warning",
    "ZeroDivisionError",
];

/// Builtin functions and other non-type callables, bound as opaque objects.
const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs",
    "aiter",
    "all",
    "anext",
    "any",
    "ascii",
    "bin",
    "breakpoint",
    "callable",
    "chr",
    "classmethod",
    "compile",
    "delattr",
    "dir",
    "divmod",
    "enumerate",
    "eval",
    "exec",
    "filter",
    "format",
    "getattr",
    "globals",
    "hasattr",
    "hash",
    "help",
    "hex",
    "id",
    "input",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "locals",
    "map",
    "max",
    "min",
    "next",
    "oct",
    "open",
    "ord",
    "pow",
    "print",
    "repr",
    "reversed",
    "round",
    "setattr",
    "sorted",
    "staticmethod",
    "sum",
    "super",
    "vars",
    "zip",
];

/// Conventional typing factory names, bound as class objects owned by the
/// `typing` module. Not part of the builtin namespace.
const TYPING_FACTORIES: &[&str] = &[
    "Annotated",
    "Any",
    "AsyncContextManager",
    "AsyncGenerator",
    "AsyncIterable",
    "AsyncIterator",
    "Awaitable",
    "BinaryIO",
    "Callable",
    "ClassVar",
    "Concatenate",
    "ContextManager",
    "Coroutine",
    "Dict",
    "Final",
    "FrozenSet",
    "Generator",
    "Generic",
    "IO",
    "Iterable",
    "Iterator",
    "List",
    "Literal",
    "Mapping",
    "MutableMapping",
    "NamedTuple",
    "Never",
    "NoReturn",
    "Optional",
    "ParamSpec",
    "Protocol",
    "Self",
    "Sequence",
    "Set",
    "TextIO",
    "Tuple",
    "Type",
    "TypeAlias",
    "TypeGuard",
    "TypeVar",
    "TypeVarTuple",
    "TypedDict",
    "Union",
    "Unpack",
];

// ============================================================================
// Scope Construction
// ============================================================================

/// The builtin namespace, mapping every builtin name to its value.
///
/// Initialized once per process; the identity of each builtin value is
/// stable across calls, so scopes primed at different times agree on what
/// `str` is.
pub fn builtin_scope() -> &'static ScopeMap {
    static SCOPE: OnceLock<ScopeMap> = OnceLock::new();
    SCOPE.get_or_init(|| {
        let mut scope = ScopeMap::new();
        for &name in BUILTIN_TYPES.iter().chain(BUILTIN_EXCEPTIONS) {
            scope.insert(
                name.to_string(),
                Value::Class(ClassObject::new(name).with_module("builtins").shared()),
            );
        }
        for &name in BUILTIN_FUNCTIONS {
            scope.insert(name.to_string(), Value::opaque(format!("builtins.{name}")));
        }
        scope.insert("None".to_string(), Value::None);
        scope.insert("True".to_string(), Value::Bool(true));
        scope.insert("False".to_string(), Value::Bool(false));
        scope.insert("Ellipsis".to_string(), Value::Ellipsis);
        scope.insert(
            "NotImplemented".to_string(),
            Value::opaque("builtins.NotImplemented"),
        );
        scope.insert("__debug__".to_string(), Value::Bool(true));
        scope
    })
}

/// Check if a name is bound in the builtin namespace.
pub fn is_builtin(name: &str) -> bool {
    builtin_scope().contains_key(name)
}

/// Fresh bindings for the conventional typing factory names.
///
/// Each call produces new bindings (a module that imports `typing` names
/// gets its own view), all subscriptable class values owned by `typing`.
pub fn typing_scope() -> ScopeMap {
    let mut scope = ScopeMap::new();
    for &name in TYPING_FACTORIES {
        scope.insert(
            name.to_string(),
            Value::Class(ClassObject::new(name).with_module("typing").shared()),
        );
    }
    scope
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_membership() {
        assert!(is_builtin("str"));
        assert!(is_builtin("Exception"));
        assert!(is_builtin("print"));
        assert!(is_builtin("None"));
        assert!(!is_builtin("my_function"));
        // Typing factories are not builtins.
        assert!(!is_builtin("List"));
        assert!(!is_builtin("Optional"));
    }

    #[test]
    fn test_builtin_identity_is_stable() {
        let first = builtin_scope().get("str").unwrap();
        let second = builtin_scope().get("str").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_builtin_kinds() {
        assert_eq!(builtin_scope().get("str").unwrap().kind_name(), "class");
        assert_eq!(builtin_scope().get("ValueError").unwrap().kind_name(), "class");
        assert_eq!(builtin_scope().get("len").unwrap().kind_name(), "object");
        assert_eq!(*builtin_scope().get("None").unwrap(), Value::None);
        assert_eq!(*builtin_scope().get("True").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_typing_scope_is_subscriptable() {
        let typing = typing_scope();
        let list = typing.get("List").unwrap();
        let int = builtin_scope().get("int").unwrap();
        let alias = list.subscript(vec![int.clone()]).unwrap();
        assert_eq!(alias.to_string(), "List[int]");
    }
}
