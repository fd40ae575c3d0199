// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! Error types for the module repository
//!
//! Every failure crosses the host boundary as a value. The engine never
//! reports errors through out-of-band state (no shared try/catch handle);
//! each resolve/compile/instantiate/evaluate call returns a `Result` and the
//! repository propagates it to its immediate caller untouched. Nothing is
//! retried and nothing is cached on failure.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for module repository operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// A specifier matched no branch of the resolution policy
#[derive(Debug, Clone, Error)]
#[error("cannot resolve module specifier '{specifier}'{}", referrer_suffix(.referrer))]
pub struct ResolutionError {
    /// The specifier as written in the importing module
    pub specifier: String,
    /// Canonical specifier of the importing module, when known
    pub referrer: Option<String>,
}

fn referrer_suffix(referrer: &Option<String>) -> String {
    match referrer {
        Some(r) => format!(" imported from '{r}'"),
        None => String::new(),
    }
}

/// The engine rejected a module's source text
///
/// Carries the source location the engine reported, when it reported one.
/// Also produced by a [`NativeModuleProvider`](crate::NativeModuleProvider)
/// whose synthetic module cannot be constructed.
#[derive(Debug, Clone, Error)]
#[error("failed to compile '{resource}': {message}")]
pub struct CompileError {
    /// Resource name of the offending module (path or capability key)
    pub resource: String,
    /// Engine-reported diagnostic
    pub message: String,
    /// 1-based line of the failure, if the engine located it
    pub line: Option<u32>,
    /// 1-based column of the failure, if the engine located it
    pub column: Option<u32>,
}

impl CompileError {
    /// Diagnostic without a source location
    pub fn new(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

/// Instantiation or import-resolution failure
#[derive(Debug, Error)]
pub enum LinkError {
    /// The link callback could not supply a handle for a static import
    #[error("unresolved import '{specifier}' in '{resource}'")]
    UnresolvedImport {
        /// Resource name of the module being linked
        resource: String,
        /// The import specifier that failed to resolve
        specifier: String,
    },

    /// The engine's instantiation step failed
    #[error("failed to instantiate '{resource}': {message}")]
    Instantiate {
        /// Resource name of the module being linked
        resource: String,
        /// Engine-reported diagnostic
        message: String,
    },

    /// A transitive dependency failed during the ahead-of-time walk
    ///
    /// This is the common shape: a nested compile or not-found failure
    /// surfacing while the importing module's dependencies were being
    /// loaded ahead of the engine's synchronous link step.
    #[error("failed to link '{resource}'")]
    Dependency {
        /// Resource name of the importing module
        resource: String,
        /// The dependency's own failure
        #[source]
        source: Box<ModuleError>,
    },
}

/// A value thrown while the module body executed
#[derive(Debug, Clone, Error)]
#[error("uncaught exception in '{resource}': {thrown}")]
pub struct EvaluationError {
    /// Resource name of the module that threw
    pub resource: String,
    /// The thrown value, rendered by the engine
    pub thrown: String,
}

/// Errors surfaced by [`ModuleRepository`](crate::ModuleRepository) operations
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Specifier resolution failed
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The resolved key has no backing file and no registered provider
    #[error("module not found: '{0}'")]
    NotFound(String),

    /// The engine rejected the module's source text
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Instantiation or import resolution failed
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The module body threw during evaluation
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Reading a module file failed for a reason other than absence
    #[error("failed to read '{}'", .path.display())]
    Io {
        /// Path of the unreadable module file
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_error_names_referrer() {
        let err = ResolutionError {
            specifier: "wombat".to_string(),
            referrer: Some("/proj/a.js".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "cannot resolve module specifier 'wombat' imported from '/proj/a.js'"
        );

        let err = ResolutionError {
            specifier: "wombat".to_string(),
            referrer: None,
        };
        assert_eq!(err.to_string(), "cannot resolve module specifier 'wombat'");
    }

    #[test]
    fn dependency_link_error_keeps_nested_failure() {
        let nested = ModuleError::NotFound("/proj/missing.js".to_string());
        let err = ModuleError::Link(LinkError::Dependency {
            resource: "/proj/a.js".to_string(),
            source: Box::new(nested),
        });

        let ModuleError::Link(LinkError::Dependency { source, .. }) = &err else {
            panic!("expected dependency link error");
        };
        assert!(matches!(**source, ModuleError::NotFound(_)));
    }
}
