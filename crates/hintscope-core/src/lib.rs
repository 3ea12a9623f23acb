//! Core infrastructure for hintscope.
//!
//! This crate provides the building blocks shared by the resolution engine:
//! - Runtime object model for the values type hints evaluate to
//! - Scope maps and the layered forward scope
//! - The Python builtin namespace table
//! - Interpreter-version capability flags
//! - Scratch-map object pool
//! - Unified error type and stable error codes

pub mod builtins;
pub mod error;
pub mod object;
pub mod pool;
pub mod scope;
pub mod version;
