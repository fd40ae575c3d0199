// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! Embedding host seam
//!
//! The repository never talks to a script engine directly. The owner of the
//! engine context implements [`EmbeddingHost`] and hands the repository an
//! opaque [`ModuleHandle`] per compiled module. Handles are engine identity
//! values: the repository stores and compares them but never interprets
//! them, and a handle is only meaningful for the context that produced it.

use crate::error::{CompileError, EvaluationError, LinkError};
use crate::record::ModuleOrigin;

/// Opaque identity of one engine module within its context
///
/// Assigned by the embedding host at compile time. Two handles compare equal
/// exactly when they name the same engine module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle(u64);

impl ModuleHandle {
    /// Wrap an engine identity value
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The engine identity value
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Lifecycle state of an engine module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModuleStatus {
    /// Compiled, imports not yet resolved
    Uninstantiated,
    /// Linking in progress
    Instantiating,
    /// All static imports resolved to concrete handles
    Instantiated,
    /// Module body running
    Evaluating,
    /// Module body completed
    Evaluated,
    /// Evaluation threw; the module is unusable
    Errored,
}

/// Completion shape of a module evaluation
///
/// Engines evaluate module bodies asynchronously in shape: a body using
/// top-level await settles later, through the host's own event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// The body ran to completion synchronously
    Completed,
    /// The body is suspended on a deferred value owned by the host loop
    Pending,
}

/// Engine primitives the repository consumes
///
/// Implemented by the owner of the script engine context. All methods are
/// synchronous and run on the single thread that owns the context;
/// `instantiate_module` calls back into `resolve_import` once per static
/// import, and that callback must answer from already-loaded state only.
pub trait EmbeddingHost {
    /// Compile UTF-8 module source, tagging it with `origin`
    ///
    /// On success the returned handle is `Uninstantiated` and its identity
    /// is stable for the life of the context.
    fn compile_module(
        &self,
        source: &str,
        origin: &ModuleOrigin,
    ) -> Result<ModuleHandle, CompileError>;

    /// The module's statically declared import specifiers, in source order
    fn module_requests(&self, module: ModuleHandle) -> Vec<String>;

    /// Current lifecycle state of the module
    fn module_status(&self, module: ModuleHandle) -> ModuleStatus;

    /// Link the module's static imports
    ///
    /// The engine invokes `resolve_import(specifier, referrer)` synchronously
    /// for each static import; the callback returns the handle to link
    /// against, or `None` when the import cannot be satisfied (which fails
    /// the link). The callback must not compile, read files, or otherwise
    /// load; the ahead-of-time walk has already done so.
    fn instantiate_module(
        &self,
        module: ModuleHandle,
        resolve_import: &mut dyn FnMut(&str, ModuleHandle) -> Option<ModuleHandle>,
    ) -> Result<(), LinkError>;

    /// Run the module body
    ///
    /// The caller must have brought the module to at least
    /// [`ModuleStatus::Instantiated`]. A thrown value is returned as an
    /// [`EvaluationError`], never swallowed.
    fn evaluate_module(
        &self,
        module: ModuleHandle,
    ) -> Result<EvaluationOutcome, EvaluationError>;
}
