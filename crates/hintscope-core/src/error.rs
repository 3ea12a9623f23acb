//! Error types and error code constants for hintscope.
//!
//! This module provides the unified error type ([`ResolveError`]) surfaced
//! by the resolution engine, plus a stable integer code per error kind for
//! embedders that forward diagnostics across a process boundary.
//!
//! ## Design
//!
//! - **Unified type**: `ResolveError` is the single error type callers see.
//! - **Taxonomy over strings**: each failure condition is a distinct
//!   variant; messages carry the offending hint verbatim and identify the
//!   annotated entity so users can locate the source to fix.
//! - **Code mapping**: `ErrorCode` provides stable integer codes via
//!   `From<&ResolveError>`.

use std::fmt;

use thiserror::Error;

use crate::version::PythonVersion;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable integer codes for embedding diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Malformed input from the caller (e.g., an empty hint string).
    InvalidHint = 2,
    /// Resolution errors (unknown names, missing provenance).
    Unresolvable = 3,
    /// Hint syntax the modeled interpreter version cannot evaluate.
    UnsupportedSyntax = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl ErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Resolution Error Kind
// ============================================================================

/// Which annotation pathway requested resolution.
///
/// A hint reaches the resolver either as an explicitly quoted forward
/// reference or because the whole module deferred annotation evaluation.
/// The distinction only affects how failures are worded; the resolution
/// algorithm is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    /// An explicitly stringified annotation (`x: "Node"`).
    ForwardReference,
    /// An annotation stringified by deferred evaluation semantics.
    PostponedAnnotation,
}

impl ResolutionErrorKind {
    /// Returns the string representation used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionErrorKind::ForwardReference => "forward reference",
            ResolutionErrorKind::PostponedAnnotation => "postponed annotation",
        }
    }
}

impl fmt::Display for ResolutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for hint resolution.
///
/// Every variant carries the caller-supplied message prefix and enough
/// context to act on: the verbatim hint string where one exists, and the
/// identity of the annotated entity.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The hint string is empty; nothing can be resolved.
    #[error("{prefix}annotation on {entity} is not a resolvable hint: empty string")]
    EmptyHint { prefix: String, entity: String },

    /// The entity's owning module cannot be determined, so no global
    /// namespace exists to resolve anything against. Fatal, never retried.
    #[error("{prefix}cannot resolve forward references for {entity}: {reason}")]
    ScopeUnresolvable {
        prefix: String,
        entity: String,
        reason: String,
    },

    /// The hint failed to evaluate against the fully composed scope.
    #[error("{prefix}{kind} \"{hint}\" on {entity} is unresolvable: {cause}{}", dump_suffix(.scope_dump))]
    UnresolvableHint {
        prefix: String,
        kind: ResolutionErrorKind,
        hint: String,
        entity: String,
        cause: String,
        scope_dump: Option<String>,
    },

    /// The hint uses `X | Y` union syntax on an interpreter version that
    /// lacks it, and deferred evaluation hid the failure until now.
    #[error(
        "{prefix}{kind} \"{hint}\" on {entity} uses \"X | Y\" union syntax, which Python {version} \
         does not support; upgrade to Python >= 3.10 or rewrite the hint with typing.Union[...] \
         or typing.Optional[...]"
    )]
    UnsupportedUnionSyntax {
        prefix: String,
        kind: ResolutionErrorKind,
        hint: String,
        entity: String,
        version: PythonVersion,
    },

    /// Internal error (bug or unexpected collaborator behavior).
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Format the optional scope dump as a message suffix.
fn dump_suffix(scope_dump: &Option<String>) -> String {
    match scope_dump {
        Some(dump) => format!("\nforward scope:\n{dump}"),
        None => String::new(),
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&ResolveError> for ErrorCode {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::EmptyHint { .. } => ErrorCode::InvalidHint,
            ResolveError::ScopeUnresolvable { .. } => ErrorCode::Unresolvable,
            ResolveError::UnresolvableHint { .. } => ErrorCode::Unresolvable,
            ResolveError::UnsupportedUnionSyntax { .. } => ErrorCode::UnsupportedSyntax,
            ResolveError::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl ResolveError {
    /// Create a scope-unresolvable error.
    pub fn scope_unresolvable(
        prefix: impl Into<String>,
        entity: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ResolveError::ScopeUnresolvable {
            prefix: prefix.into(),
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ResolveError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
