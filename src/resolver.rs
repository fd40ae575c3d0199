// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! Specifier resolution
//!
//! Maps a specifier/referrer pair to the canonical key the cache is indexed
//! under. Resolution must be deterministic (identical inputs produce the
//! identical key for a fixed directory layout) because cache correctness
//! depends on it. Policy, in priority order:
//!
//! 1. Absolute paths (`/a/b.js`) normalize lexically.
//! 2. Relative paths (`./x.js`, `../x.js`) resolve against the referrer's
//!    containing directory, or the resolver's base directory when the
//!    referrer is absent or synthetic.
//! 3. `@`-prefixed bare specifiers (`@scope/name`) pass through unchanged as
//!    capability keys and never touch the filesystem.
//! 4. A path naming an existing directory resolves to its entry file.
//! 5. Anything else fails.

use crate::error::ResolutionError;
use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{trace, warn};

/// Per-directory manifest consulted when a specifier names a directory
const DIR_MANIFEST: &str = "mosaic.json";

/// Resolution settings
///
/// Hosts typically embed this in their own configuration file; every field
/// has a conventional default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Directory that anchors relative specifiers with no referrer
    ///
    /// `None` captures the process working directory when the resolver is
    /// constructed, so later `chdir` calls cannot change what a specifier
    /// means mid-session.
    pub base_dir: Option<PathBuf>,
    /// Entry file appended when a specifier names a directory
    pub entry_file: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            entry_file: "index.js".to_string(),
        }
    }
}

/// The resolved, deduplicated form of a specifier
///
/// Only the resolver constructs these, so holding one proves the key has
/// been through the resolution policy. The `Display` form is the cache-key
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalSpecifier {
    kind: SpecifierKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SpecifierKind {
    File(PathBuf),
    Capability(String),
}

/// Borrowed view for exhaustive matching inside the crate
#[derive(Debug, Clone, Copy)]
pub(crate) enum ResolvedKind<'a> {
    File(&'a Path),
    Capability(&'a str),
}

impl CanonicalSpecifier {
    fn file(path: PathBuf) -> Self {
        Self {
            kind: SpecifierKind::File(path),
        }
    }

    fn new_capability(key: String) -> Self {
        Self {
            kind: SpecifierKind::Capability(key),
        }
    }

    pub(crate) fn as_kind(&self) -> ResolvedKind<'_> {
        match &self.kind {
            SpecifierKind::File(path) => ResolvedKind::File(path),
            SpecifierKind::Capability(key) => ResolvedKind::Capability(key),
        }
    }

    /// `true` when this key names a native capability
    pub fn is_capability(&self) -> bool {
        matches!(self.kind, SpecifierKind::Capability(_))
    }

    /// The resolved path, for file-backed keys
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            SpecifierKind::File(path) => Some(path),
            SpecifierKind::Capability(_) => None,
        }
    }

    /// The capability key, for native keys
    pub fn capability(&self) -> Option<&str> {
        match &self.kind {
            SpecifierKind::File(_) => None,
            SpecifierKind::Capability(key) => Some(key),
        }
    }

    /// Directory that relative imports from this module resolve against
    ///
    /// `None` for capability keys: synthetic modules have no location.
    pub fn containing_dir(&self) -> Option<&Path> {
        self.path().and_then(Path::parent)
    }
}

impl fmt::Display for CanonicalSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SpecifierKind::File(path) => write!(f, "{}", path.display()),
            SpecifierKind::Capability(key) => f.write_str(key),
        }
    }
}

/// Maps `(specifier, referrer)` pairs to canonical cache keys
#[derive(Debug)]
pub struct SpecifierResolver {
    base_dir: PathBuf,
    entry_file: String,
}

impl SpecifierResolver {
    /// Build a resolver from `options`
    ///
    /// Captures the process working directory now if `options.base_dir` is
    /// unset.
    pub fn new(options: ResolverOptions) -> Self {
        let base_dir = options
            .base_dir
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")));
        Self {
            base_dir,
            entry_file: options.entry_file,
        }
    }

    /// The directory anchoring referrer-less relative specifiers
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `specifier` against `referrer` to a canonical key
    pub fn resolve(
        &self,
        specifier: &str,
        referrer: Option<&CanonicalSpecifier>,
    ) -> Result<CanonicalSpecifier, ResolutionError> {
        let absolute = specifier.starts_with('/');
        let relative = specifier.starts_with("./") || specifier.starts_with("../");

        if absolute || relative {
            let joined = if absolute {
                PathBuf::from(specifier)
            } else {
                let dir = referrer
                    .and_then(CanonicalSpecifier::containing_dir)
                    .unwrap_or(&self.base_dir);
                dir.join(specifier)
            };

            let path = self.resolve_entry(normalize_path(&joined));
            trace!(specifier, resolved = %path.display(), "resolved file specifier");
            return Ok(CanonicalSpecifier::file(path));
        }

        // Capability keys pass through untouched; they are matched against
        // the provider registry at load time and must never be mapped to the
        // filesystem, even when unregistered.
        if specifier.starts_with('@') {
            return Ok(CanonicalSpecifier::new_capability(specifier.to_string()));
        }

        Err(ResolutionError {
            specifier: specifier.to_string(),
            referrer: referrer.map(ToString::to_string),
        })
    }

    /// Swap a directory path for the file that stands in for it
    ///
    /// A `mosaic.json` manifest with a `"main"` field wins; otherwise the
    /// conventional entry file is appended. Non-directories pass through.
    fn resolve_entry(&self, path: PathBuf) -> PathBuf {
        if !path.is_dir() {
            return path;
        }

        if let Some(main) = self.manifest_main(&path) {
            return normalize_path(&path.join(main));
        }

        path.join(&self.entry_file)
    }

    fn manifest_main(&self, dir: &Path) -> Option<String> {
        let manifest_path = dir.join(DIR_MANIFEST);
        let content = std::fs::read_to_string(&manifest_path).ok()?;

        match serde_json::from_str::<DirManifest>(&content) {
            Ok(manifest) => manifest.main,
            Err(err) => {
                warn!(
                    manifest = %manifest_path.display(),
                    %err,
                    "ignoring unparseable directory manifest"
                );
                None
            }
        }
    }
}

impl Default for SpecifierResolver {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

/// Minimal directory manifest for entry-file resolution
#[derive(Debug, Deserialize)]
struct DirManifest {
    main: Option<String>,
}

/// Collapse `.` and `..` segments without touching the filesystem
///
/// Popping past the root clamps at the root, so the result of resolving an
/// absolute input is always absolute.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::RootDir);
                }
            }
            other => out.push(other),
        }
    }

    out
}
