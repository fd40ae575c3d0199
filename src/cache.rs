// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! Bidirectional module-graph cache
//!
//! Two indices over the same records: by canonical specifier and by engine
//! handle. Records are shared between the indices, so both always point at
//! the same allocation for a given module. The cache is owned by one
//! repository and dies with it; there is no cross-context storage.

use crate::host::ModuleHandle;
use crate::record::ModuleRecord;
use crate::resolver::CanonicalSpecifier;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;

/// Cache over one context's loaded modules
#[derive(Debug, Default)]
pub struct ModuleCache {
    by_specifier: IndexMap<CanonicalSpecifier, Rc<ModuleRecord>>,
    by_handle: HashMap<ModuleHandle, Rc<ModuleRecord>>,
}

impl ModuleCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record into both indices
    ///
    /// Idempotent: if the specifier is already cached, the existing record
    /// is returned untouched and the argument is dropped. Loading an
    /// already-cached specifier must never replace the handle scripts have
    /// been linked against.
    pub fn insert(&mut self, record: Rc<ModuleRecord>) -> Rc<ModuleRecord> {
        if let Some(existing) = self.by_specifier.get(record.specifier()) {
            return Rc::clone(existing);
        }

        // One record per handle: a handle registered under a second
        // specifier would alias and break the reverse index.
        debug_assert!(
            !self.by_handle.contains_key(&record.handle()),
            "module handle already cached under another specifier"
        );

        self.by_specifier
            .insert(record.specifier().clone(), Rc::clone(&record));
        self.by_handle.insert(record.handle(), Rc::clone(&record));
        record
    }

    /// Look up by canonical specifier
    pub fn get_by_specifier(&self, specifier: &CanonicalSpecifier) -> Option<&Rc<ModuleRecord>> {
        self.by_specifier.get(specifier)
    }

    /// Look up by engine handle
    pub fn get_by_handle(&self, handle: ModuleHandle) -> Option<&Rc<ModuleRecord>> {
        self.by_handle.get(&handle)
    }

    /// `true` if the specifier is cached
    pub fn contains(&self, specifier: &CanonicalSpecifier) -> bool {
        self.by_specifier.contains_key(specifier)
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.by_specifier.len()
    }

    /// `true` when nothing has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.by_specifier.is_empty()
    }

    /// Records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &Rc<ModuleRecord>> {
        self.by_specifier.values()
    }
}
