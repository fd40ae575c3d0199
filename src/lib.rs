// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! # mosaic-modules
//!
//! ES-module repository for the Mosaic embedding host: specifier
//! resolution, a bidirectional module-graph cache, ahead-of-time transitive
//! dependency loading, and the linking protocol between file-backed script
//! modules and host-supplied native capability modules.
//!
//! The script engine itself stays outside this crate. The owner of an
//! engine context implements [`EmbeddingHost`] and creates one
//! [`ModuleRepository`] per context; native capabilities (widget classes,
//! diagnostics) implement [`NativeModuleProvider`] and are seeded into an
//! immutable [`NativeModuleRegistry`] at startup.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use mosaic_modules::{
//!     ModuleRepository, NativeModuleRegistry, ResolverOptions,
//! };
//! use std::rc::Rc;
//!
//! let registry = Rc::new(NativeModuleRegistry::new([
//!     ("@mosaic/diagnostics/Debug".to_string(), debug_provider),
//!     ("@mosaic/presentation/Window".to_string(), window_provider),
//! ]));
//!
//! let repository = ModuleRepository::new(engine, registry, ResolverOptions::default());
//! repository.load_and_evaluate("./index.js")?;
//! ```
//!
//! ## Specifier forms
//!
//! - absolute paths: `/app/main.js`
//! - relative paths: `./x.js`, `../x.js` (resolved against the importer)
//! - capability keys: `@mosaic/presentation/Window` (never mapped to the
//!   filesystem; unregistered keys fail closed)
//!
//! ## Concurrency
//!
//! Single-threaded and cooperative, like the engine context it serves.
//! Re-entrancy comes from import-graph recursion and from the host event
//! loop re-entering between turns, never from threads.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod error;
pub mod host;
pub mod native;
pub mod record;
pub mod repository;
pub mod resolver;

// Re-exports
pub use cache::ModuleCache;
pub use error::{
    CompileError, EvaluationError, LinkError, ModuleError, ResolutionError, Result,
};
pub use host::{EmbeddingHost, EvaluationOutcome, ModuleHandle, ModuleStatus};
pub use native::{NativeModuleProvider, NativeModuleRegistry};
pub use record::{ModuleOrigin, ModuleRecord};
pub use repository::ModuleRepository;
pub use resolver::{CanonicalSpecifier, ResolverOptions, SpecifierResolver};

/// Version of the module repository crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
