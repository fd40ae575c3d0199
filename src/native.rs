// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! Native capability modules
//!
//! Host functionality (widget-class constructors, diagnostics) is exposed
//! to scripts as ordinary importable modules under `@`-prefixed capability
//! keys such as `@mosaic/presentation/Window`. Each key maps 1:1 to a
//! provider that synthesizes the module's export surface on first import.
//! The registry is seeded once at startup and is immutable afterwards;
//! nothing reachable from script code can extend it.

use crate::error::CompileError;
use crate::host::{EmbeddingHost, ModuleHandle};
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::warn;

/// Supplies one capability's synthetic module
///
/// `make` computes the module's fixed export surface (a `default` export
/// plus zero or more named exports) against the given context's engine.
/// Capability initialization is not safely repeatable within a context
/// (registering a widget class twice is an error), so the repository caches
/// the produced handle and calls `make` at most once per context per key.
pub trait NativeModuleProvider<H: EmbeddingHost> {
    /// Build the synthetic module in `host`'s context
    fn make(&self, host: &H) -> Result<ModuleHandle, CompileError>;
}

/// Immutable table of capability keys to providers
///
/// Seeded once at startup and shared by every repository in the process;
/// per-context state lives in the repositories, never here.
pub struct NativeModuleRegistry<H: EmbeddingHost> {
    providers: IndexMap<String, Rc<dyn NativeModuleProvider<H>>>,
}

impl<H: EmbeddingHost> NativeModuleRegistry<H> {
    /// Build the registry from `(capability key, provider)` pairs
    ///
    /// Keys that do not start with `@` are unreachable through the resolver
    /// and are rejected with a warning rather than silently kept.
    pub fn new(
        providers: impl IntoIterator<Item = (String, Rc<dyn NativeModuleProvider<H>>)>,
    ) -> Self {
        let mut table = IndexMap::new();

        for (key, provider) in providers {
            if !key.starts_with('@') {
                warn!(key = %key, "dropping native module key without '@' prefix");
                continue;
            }
            table.insert(key, provider);
        }

        Self { providers: table }
    }

    /// An empty registry, for hosts with no native capabilities
    pub fn empty() -> Self {
        Self {
            providers: IndexMap::new(),
        }
    }

    /// The provider registered for `key`, if any
    pub fn provider(&self, key: &str) -> Option<&Rc<dyn NativeModuleProvider<H>>> {
        self.providers.get(key)
    }

    /// `true` if `key` names a registered capability
    pub fn contains(&self, key: &str) -> bool {
        self.providers.contains_key(key)
    }

    /// Registered capability keys, in registration order
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// `true` when no capabilities are registered
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<H: EmbeddingHost> std::fmt::Debug for NativeModuleRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeModuleRegistry")
            .field("capabilities", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
