// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! Module identity and origin metadata

use crate::host::ModuleHandle;
use crate::resolver::CanonicalSpecifier;
use std::path::{Path, PathBuf};
use url::Url;

/// Where a module's exports came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOrigin {
    /// Parsed from a script file on disk
    FileBacked {
        /// Resolved path of the source file
        path: PathBuf,
    },
    /// Constructed programmatically by a native capability provider
    Synthetic {
        /// The capability key the provider is registered under
        capability: String,
    },
}

impl ModuleOrigin {
    /// Origin for a script file at `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::FileBacked { path: path.into() }
    }

    /// Origin for a synthetic capability module
    pub fn synthetic(capability: impl Into<String>) -> Self {
        Self::Synthetic {
            capability: capability.into(),
        }
    }

    /// `true` for modules constructed by a provider rather than compiled
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }

    /// The source path, for file-backed modules
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FileBacked { path } => Some(path),
            Self::Synthetic { .. } => None,
        }
    }

    /// Engine-facing resource name (script origin string)
    pub fn resource_name(&self) -> String {
        match self {
            Self::FileBacked { path } => path.display().to_string(),
            Self::Synthetic { capability } => capability.clone(),
        }
    }

    /// `file://` URI of the module, for the engine's `import.meta` hook
    ///
    /// `None` for synthetic modules, which have no location. The host's
    /// import-meta initialization callback consumes this; scripts observe it
    /// as `import.meta.url`.
    pub fn import_meta_url(&self) -> Option<Url> {
        match self {
            Self::FileBacked { path } => Url::from_file_path(path).ok(),
            Self::Synthetic { .. } => None,
        }
    }
}

/// Identity and origin of one loaded module
///
/// Exactly one record exists per canonical specifier per context, and each
/// engine handle maps back to exactly one record. Records are shared between
/// the cache's two indices, so identity is pointer identity.
#[derive(Debug)]
pub struct ModuleRecord {
    specifier: CanonicalSpecifier,
    handle: ModuleHandle,
    origin: ModuleOrigin,
}

impl ModuleRecord {
    /// Build a record binding `handle` to its canonical specifier
    pub fn new(specifier: CanonicalSpecifier, handle: ModuleHandle, origin: ModuleOrigin) -> Self {
        Self {
            specifier,
            handle,
            origin,
        }
    }

    /// The cache key this record is indexed under
    pub fn specifier(&self) -> &CanonicalSpecifier {
        &self.specifier
    }

    /// The engine module this record owns
    pub fn handle(&self) -> ModuleHandle {
        self.handle
    }

    /// Origin metadata
    pub fn origin(&self) -> &ModuleOrigin {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_origin_reports_import_meta_url() {
        let origin = ModuleOrigin::file("/proj/app/main.js");
        let url = origin.import_meta_url().unwrap();
        assert_eq!(url.as_str(), "file:///proj/app/main.js");
    }

    #[test]
    fn synthetic_origin_has_no_url() {
        let origin = ModuleOrigin::synthetic("@mosaic/diagnostics/Debug");
        assert!(origin.import_meta_url().is_none());
        assert!(origin.is_synthetic());
        assert_eq!(origin.resource_name(), "@mosaic/diagnostics/Debug");
    }
}
