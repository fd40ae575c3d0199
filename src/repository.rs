// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! The module repository
//!
//! Orchestrates resolution, caching, loading, the ahead-of-time dependency
//! walk, and linking for one engine context. One repository exists per
//! context, is created with it, and must not outlive or be shared across
//! contexts.
//!
//! Everything here runs on the single thread that owns the context.
//! Re-entrancy comes from recursion, not threads: the dependency walk can
//! revisit an ancestor specifier before that ancestor's own load has
//! returned. Each record is inserted into the cache *before* the walk
//! recurses into its dependencies, so the revisit finds the ancestor cached
//! (and marked in-flight) instead of looping.

use crate::cache::ModuleCache;
use crate::error::{LinkError, ModuleError, Result};
use crate::host::{EmbeddingHost, EvaluationOutcome, ModuleHandle, ModuleStatus};
use crate::native::NativeModuleRegistry;
use crate::record::{ModuleOrigin, ModuleRecord};
use crate::resolver::{CanonicalSpecifier, ResolvedKind, ResolverOptions, SpecifierResolver};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::rc::Rc;
use tracing::{debug, trace};

/// Module repository for one engine context
pub struct ModuleRepository<H: EmbeddingHost> {
    host: Rc<H>,
    registry: Rc<NativeModuleRegistry<H>>,
    resolver: SpecifierResolver,
    cache: RefCell<ModuleCache>,
    /// Specifiers whose dependency walk is on the stack right now
    loading: RefCell<HashSet<CanonicalSpecifier>>,
}

impl<H: EmbeddingHost> ModuleRepository<H> {
    /// Create the repository for `host`'s context
    pub fn new(
        host: Rc<H>,
        registry: Rc<NativeModuleRegistry<H>>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            host,
            registry,
            resolver: SpecifierResolver::new(options),
            cache: RefCell::new(ModuleCache::new()),
            loading: RefCell::new(HashSet::new()),
        }
    }

    /// The resolver this repository keys its cache with
    pub fn resolver(&self) -> &SpecifierResolver {
        &self.resolver
    }

    /// Resolve, load if needed, and link a module
    ///
    /// On success the returned handle, and every module transitively
    /// reachable from it through static imports, is at least
    /// [`ModuleStatus::Instantiated`]. A cached specifier returns the
    /// existing handle without recompiling or re-running a provider.
    pub fn get_or_load(
        &self,
        specifier: &str,
        referrer: Option<&CanonicalSpecifier>,
    ) -> Result<ModuleHandle> {
        let key = self.resolver.resolve(specifier, referrer)?;

        let cached = self
            .cache
            .borrow()
            .get_by_specifier(&key)
            .map(|record| record.handle());

        let handle = match cached {
            Some(handle) => {
                trace!(key = %key, "module cache hit");
                handle
            }
            None => self.load(&key)?,
        };

        self.ensure_linked(handle, &key)?;
        Ok(handle)
    }

    /// Load and evaluate a module in one step
    ///
    /// The host's run-module flow for an application entry point:
    /// `get_or_load` guarantees the handle reached `Instantiated`, then the
    /// engine runs the body. A thrown value surfaces as
    /// [`ModuleError::Evaluation`].
    pub fn load_and_evaluate(&self, specifier: &str) -> Result<EvaluationOutcome> {
        let handle = self.get_or_load(specifier, None)?;
        let outcome = self.host.evaluate_module(handle)?;
        Ok(outcome)
    }

    /// Register a host-prebuilt module under `specifier`
    ///
    /// Seeding path for synthetic modules constructed before any script
    /// requests them. The specifier goes through the same resolver as
    /// ordinary loads so the cache key cannot diverge from what a later
    /// import produces.
    pub fn add(&self, specifier: &str, handle: ModuleHandle) -> Result<Rc<ModuleRecord>> {
        let key = self.resolver.resolve(specifier, None)?;
        let origin = match key.as_kind() {
            ResolvedKind::File(path) => ModuleOrigin::file(path),
            ResolvedKind::Capability(capability) => ModuleOrigin::synthetic(capability),
        };
        Ok(self.add_record(ModuleRecord::new(key, handle, origin)))
    }

    /// Insert a prebuilt record into both cache indices
    ///
    /// Idempotent: an already-cached specifier keeps its existing record.
    pub fn add_record(&self, record: ModuleRecord) -> Rc<ModuleRecord> {
        self.cache.borrow_mut().insert(Rc::new(record))
    }

    /// Record for an engine handle, if the handle is known to this context
    pub fn module_info(&self, handle: ModuleHandle) -> Option<Rc<ModuleRecord>> {
        self.cache.borrow().get_by_handle(handle).cloned()
    }

    /// Record for a canonical specifier, if cached
    pub fn module_info_by_specifier(
        &self,
        specifier: &CanonicalSpecifier,
    ) -> Option<Rc<ModuleRecord>> {
        self.cache.borrow().get_by_specifier(specifier).cloned()
    }

    /// Number of modules cached in this context
    pub fn module_count(&self) -> usize {
        self.cache.borrow().len()
    }

    /// `true` when nothing has been loaded or seeded yet
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Compile or synthesize the module behind `key` and cache it
    ///
    /// Nothing is inserted until the handle exists, so a failed compile
    /// leaves both indices untouched and a corrected retry can succeed.
    fn load(&self, key: &CanonicalSpecifier) -> Result<ModuleHandle> {
        let record = match key.as_kind() {
            ResolvedKind::Capability(capability) => {
                // Fail closed: an unregistered capability key never falls
                // through to the filesystem.
                let provider = self
                    .registry
                    .provider(capability)
                    .ok_or_else(|| ModuleError::NotFound(capability.to_string()))?;

                debug!(capability, "synthesizing native module");
                let handle = provider.make(&self.host)?;
                ModuleRecord::new(key.clone(), handle, ModuleOrigin::synthetic(capability))
            }
            ResolvedKind::File(path) => {
                let source = std::fs::read_to_string(path).map_err(|err| match err.kind() {
                    ErrorKind::NotFound => ModuleError::NotFound(key.to_string()),
                    _ => ModuleError::Io {
                        path: path.to_path_buf(),
                        source: err,
                    },
                })?;

                debug!(path = %path.display(), bytes = source.len(), "compiling module");
                let origin = ModuleOrigin::file(path);
                let handle = self.host.compile_module(&source, &origin)?;
                ModuleRecord::new(key.clone(), handle, origin)
            }
        };

        let handle = record.handle();
        self.cache.borrow_mut().insert(Rc::new(record));
        Ok(handle)
    }

    /// Bring `handle` to at least `Instantiated`
    ///
    /// Loads every statically declared import ahead of time, then runs the
    /// engine's synchronous link step. The engine cannot perform I/O
    /// mid-link, which is why the walk must complete first; the link
    /// callback only answers from the cache.
    fn ensure_linked(&self, handle: ModuleHandle, key: &CanonicalSpecifier) -> Result<()> {
        if self.host.module_status(handle) != ModuleStatus::Uninstantiated {
            return Ok(());
        }

        // Cycle back-edge: an ancestor walk owns this module's linking.
        if !self.loading.borrow_mut().insert(key.clone()) {
            trace!(key = %key, "import cycle back-edge");
            return Ok(());
        }

        let result = self.link_walk(handle, key);
        self.loading.borrow_mut().remove(key);
        result
    }

    fn link_walk(&self, handle: ModuleHandle, key: &CanonicalSpecifier) -> Result<()> {
        for request in self.host.module_requests(handle) {
            self.get_or_load(&request, Some(key))
                .map_err(|err| LinkError::Dependency {
                    resource: key.to_string(),
                    source: Box::new(err),
                })?;
        }

        // A cycle may have instantiated this module during the walk.
        if self.host.module_status(handle) != ModuleStatus::Uninstantiated {
            return Ok(());
        }

        debug!(key = %key, "instantiating module");
        let mut resolve_import =
            |specifier: &str, referrer: ModuleHandle| self.resolve_cached(specifier, referrer);
        self.host
            .instantiate_module(handle, &mut resolve_import)
            .map_err(ModuleError::Link)
    }

    /// Cache-only lookup backing the engine's link callback
    ///
    /// Never triggers a fresh load: by the time the engine links, the
    /// ahead-of-time walk has cached every reachable import.
    fn resolve_cached(&self, specifier: &str, referrer: ModuleHandle) -> Option<ModuleHandle> {
        let cache = self.cache.borrow();
        let referrer_key = cache.get_by_handle(referrer)?.specifier().clone();
        let key = self.resolver.resolve(specifier, Some(&referrer_key)).ok()?;
        cache.get_by_specifier(&key).map(|record| record.handle())
    }
}

impl<H: EmbeddingHost> std::fmt::Debug for ModuleRepository<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRepository")
            .field("modules", &self.cache.borrow().len())
            .field("registry", &self.registry)
            .finish()
    }
}
