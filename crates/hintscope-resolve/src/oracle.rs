//! The scope oracle: where globals and enclosing locals come from.
//!
//! The engine does not introspect a live interpreter; it asks a
//! [`ScopeOracle`] for the namespaces it needs. The trait is the seam
//! between resolution logic and whatever machinery actually locates
//! scopes. [`FrameStackOracle`] is the stock implementation: a registry of
//! module global namespaces plus an explicit stack of call frames, walked
//! the way a frame-based introspection utility would walk the real stack.

use std::collections::HashMap;

use thiserror::Error;

use hintscope_core::object::Value;
use hintscope_core::scope::ScopeMap;

use crate::entity::HintTarget;
use crate::nested::scope_components;

// ============================================================================
// Error Types
// ============================================================================

/// Errors signaled by a scope oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The enclosing local scope is not on the call stack.
    ///
    /// This is the one *recoverable* oracle failure: it fires when a nested
    /// entity is resolved long after its declaration completed and the
    /// relevant frames are gone. The resolver substitutes the empty mapping.
    #[error(
        "no enclosing local scope found for '{qualname}' \
         (expected frame '{expected}' is not on the call stack)"
    )]
    ScopeNotFound { qualname: String, expected: String },

    /// The named module has no registered global namespace.
    #[error("module '{module}' has no registered global namespace")]
    ModuleNotFound { module: String },

    /// The object declares no owning module at all.
    #[error("{object} lacks an owning module")]
    MissingModule { object: String },
}

// ============================================================================
// Scope Oracle
// ============================================================================

/// Source of the namespaces resolution evaluates against.
pub trait ScopeOracle {
    /// The local scope of the function lexically enclosing `target`.
    ///
    /// `scopes_to_skip` is the number of innermost enclosing scopes that
    /// have no call-stack frame (classes mid-construction).
    /// `frames_to_skip` is the number of frames interposed above the
    /// enclosing function by the resolution machinery itself.
    fn get_locals(
        &self,
        target: &HintTarget,
        scopes_to_skip: usize,
        frames_to_skip: usize,
    ) -> Result<ScopeMap, OracleError>;

    /// The global namespace of the module defining `target`.
    fn get_globals(&self, target: &HintTarget) -> Result<ScopeMap, OracleError>;

    /// The dotted name of the module owning `target`, if determinable.
    fn owning_module(&self, target: &HintTarget) -> Option<String>;
}

// ============================================================================
// Frame Stack Oracle
// ============================================================================

/// One call frame: the unqualified name of the executing function and its
/// local bindings.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    name: String,
    locals: ScopeMap,
}

impl Frame {
    /// Create a frame for the named function.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locals: ScopeMap::new(),
        }
    }

    /// Bind a local in this frame.
    #[must_use]
    pub fn with_local(mut self, name: impl Into<String>, value: Value) -> Self {
        self.locals.insert(name.into(), value);
        self
    }

    /// The frame's function name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Stock oracle backed by a module registry and an explicit frame stack.
///
/// Frames are ordered outermost first; the last frame is the innermost
/// call. `get_locals` derives the expected enclosing *function* scope from
/// the target's qualified name (skipping `scopes_to_skip` class scopes,
/// which never have frames), then searches the stack top-down for a frame
/// with that name after discarding `frames_to_skip` frames.
#[derive(Debug, Default)]
pub struct FrameStackOracle {
    modules: HashMap<String, ScopeMap>,
    frames: Vec<Frame>,
}

impl FrameStackOracle {
    /// Create an oracle with no modules and an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module's global namespace.
    #[must_use]
    pub fn with_module(mut self, name: impl Into<String>, globals: ScopeMap) -> Self {
        self.modules.insert(name.into(), globals);
        self
    }

    /// Push a frame onto the stack (builder form).
    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Push a frame onto the stack.
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame off the stack.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }
}

impl ScopeOracle for FrameStackOracle {
    fn get_locals(
        &self,
        target: &HintTarget,
        scopes_to_skip: usize,
        frames_to_skip: usize,
    ) -> Result<ScopeMap, OracleError> {
        let qualname = target.qualname();
        let components = scope_components(qualname);

        // The last component names the entity itself; the rest name its
        // enclosing scopes, outermost first. The innermost scopes_to_skip
        // of those are classes without frames.
        let enclosing = components.len().saturating_sub(1);
        if scopes_to_skip >= enclosing {
            // Every enclosing scope is a frameless class scope (or the
            // entity is top-level): there is no function frame to find.
            return Err(OracleError::ScopeNotFound {
                qualname: qualname.to_string(),
                expected: "<module>".to_string(),
            });
        }
        let expected = components[enclosing - 1 - scopes_to_skip];

        for frame in self.frames.iter().rev().skip(frames_to_skip) {
            if frame.name == expected {
                return Ok(frame.locals.clone());
            }
        }
        Err(OracleError::ScopeNotFound {
            qualname: qualname.to_string(),
            expected: expected.to_string(),
        })
    }

    fn get_globals(&self, target: &HintTarget) -> Result<ScopeMap, OracleError> {
        let module = target.module().ok_or_else(|| OracleError::MissingModule {
            object: format!("{} '{}'", target.kind_noun(), target.qualname()),
        })?;
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| OracleError::ModuleNotFound {
                module: module.to_string(),
            })
    }

    fn owning_module(&self, target: &HintTarget) -> Option<String> {
        target.module().map(str::to_string)
    }
}

// ============================================================================
// Tests
// ============================================================================
