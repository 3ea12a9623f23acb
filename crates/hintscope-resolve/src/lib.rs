//! Forward-reference resolution engine for hintscope.
//!
//! Given a callable or class annotated with stringified type hints, this
//! crate reconstructs the lexical scope that was visible at the point of
//! declaration — builtins, module globals, enclosing-function locals,
//! synthesized nested-class names, and implicit type parameters — and
//! evaluates each hint against it. It includes:
//! - Decorated-entity metadata with per-entity compute-once caches
//! - The nested-name set builder for self-reference detection
//! - The scope oracle seam and its frame-stack implementation
//! - The composite forward scope builder
//! - The hint-expression parser and evaluator
//! - The reference resolver itself

pub mod entity;
pub mod expr;
pub mod forward_scope;
pub mod nested;
pub mod oracle;
pub mod resolver;
pub mod typeparams;

pub use entity::{DecoratedEntity, HintTarget, ResolutionMetadata};
pub use forward_scope::build_forward_scope;
pub use nested::nested_scope_names;
pub use oracle::{Frame, FrameStackOracle, OracleError, ScopeOracle};
pub use resolver::{HintResolver, Resolved};

// The error vocabulary callers match on lives in hintscope-core; re-export
// the pieces every embedder needs.
pub use hintscope_core::error::{ErrorCode, ResolutionErrorKind, ResolveError};
pub use hintscope_core::version::PythonVersion;
