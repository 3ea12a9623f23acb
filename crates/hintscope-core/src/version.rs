//! Python version abstraction for version-aware hint resolution.
//!
//! This module provides [`PythonVersion`], the single capability flag the
//! resolution engine consults. Hint syntax evolves across versions (e.g.,
//! `X | Y` unions in 3.10, implicit type-parameter scoping in 3.12), and
//! resolution must honor the version of the interpreter whose annotations
//! are being modeled, not the newest one.

/// Target Python language version for hint resolution.
///
/// The engine consults this flag in exactly two places: whether `X | Y`
/// union syntax evaluates natively, and whether generic declarations bind
/// implicit type parameters into an enclosing scope. Everything else is
/// version-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PythonVersion {
    /// Accept every feature the engine models; no version gating.
    ///
    /// This is the default mode and matches the behavior of the newest
    /// supported interpreter.
    #[default]
    Permissive,

    /// A specific target language version (e.g., 3.10).
    V {
        /// Major version number (always 3 for supported versions).
        major: u8,
        /// Minor version number (8-12 for currently defined constants).
        minor: u8,
    },
}

impl PythonVersion {
    /// Python 3.8 - baseline version.
    pub const V3_8: Self = Self::V { major: 3, minor: 8 };

    /// Python 3.9 - builtin generics subscriptable (`list[int]`).
    pub const V3_9: Self = Self::V { major: 3, minor: 9 };

    /// Python 3.10 - native union syntax (`X | Y`).
    pub const V3_10: Self = Self::V {
        major: 3,
        minor: 10,
    };

    /// Python 3.11 - variadic generics.
    pub const V3_11: Self = Self::V {
        major: 3,
        minor: 11,
    };

    /// Python 3.12 - implicit type-parameter scoping (`class C[T]: ...`).
    pub const V3_12: Self = Self::V {
        major: 3,
        minor: 12,
    };

    /// Returns whether `X | Y` union expressions evaluate natively.
    ///
    /// Before Python 3.10, `type.__or__` does not exist, so a deferred
    /// annotation spelled `int | str` is accepted at declaration time but
    /// fails when finally evaluated. The resolver uses this query to refine
    /// that failure into actionable guidance.
    #[must_use]
    pub fn has_native_unions(self) -> bool {
        match self {
            Self::Permissive => true,
            Self::V { major: 3, minor } => minor >= 10,
            Self::V { .. } => false,
        }
    }

    /// Returns whether generic declarations bind implicit type parameters.
    ///
    /// Type-parameter syntax (`def f[T]()`, `class C[T]:`) was introduced in
    /// Python 3.12. On older versions the type-parameter layer of the
    /// forward scope is a no-op.
    #[must_use]
    pub fn has_type_parameter_syntax(self) -> bool {
        match self {
            Self::Permissive => true,
            Self::V { major: 3, minor } => minor >= 12,
            Self::V { .. } => false,
        }
    }

    /// Returns whether this is the permissive mode.
    #[must_use]
    pub fn is_permissive(self) -> bool {
        matches!(self, Self::Permissive)
    }

    /// Returns the major and minor version numbers, if this is a specific
    /// version. Returns `None` for [`Permissive`](Self::Permissive).
    #[must_use]
    pub fn version_tuple(self) -> Option<(u8, u8)> {
        match self {
            Self::Permissive => None,
            Self::V { major, minor } => Some((major, minor)),
        }
    }
}

impl std::fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::V { major, minor } => write!(f, "{}.{}", major, minor),
        }
    }
}
