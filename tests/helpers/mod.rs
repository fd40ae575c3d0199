// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Mosaic Contributors

//! Scripted stand-in for the embedding host
//!
//! `FakeEngine` implements [`EmbeddingHost`] over an in-memory module table.
//! It scans compiled source for static `import ... from '...'` declarations
//! the way the real engine would, tracks per-module lifecycle status, and
//! counts compiles/instantiations so tests can assert "exactly once"
//! properties. Two source-text conventions stand in for engine behavior:
//! a module whose source contains `syntax error` fails to compile, and one
//! containing `throw` throws during evaluation (`await` marks the
//! evaluation outcome pending instead).

use mosaic_modules::{
    CompileError, EmbeddingHost, EvaluationError, EvaluationOutcome, LinkError, ModuleHandle,
    ModuleOrigin, ModuleStatus,
};
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Install a `RUST_LOG`-filtered subscriber for test diagnostics
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
struct FakeModule {
    resource: String,
    requests: Vec<String>,
    status: ModuleStatus,
    throws: Option<String>,
    pending: bool,
}

/// In-memory engine double
pub struct FakeEngine {
    modules: RefCell<HashMap<ModuleHandle, FakeModule>>,
    next_id: Cell<u64>,
    compile_count: Cell<usize>,
    instantiate_count: Cell<usize>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            modules: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            compile_count: Cell::new(0),
            instantiate_count: Cell::new(0),
        }
    }

    /// Create a synthetic module with no static imports
    ///
    /// What a native capability provider would build through the engine's
    /// synthetic-module API.
    pub fn synthesize(&self, resource: &str) -> ModuleHandle {
        self.insert(FakeModule {
            resource: resource.to_string(),
            requests: Vec::new(),
            status: ModuleStatus::Uninstantiated,
            throws: None,
            pending: false,
        })
    }

    /// Number of successful compiles so far
    pub fn compiles(&self) -> usize {
        self.compile_count.get()
    }

    /// Number of instantiation passes so far
    pub fn instantiations(&self) -> usize {
        self.instantiate_count.get()
    }

    /// Lifecycle status, panicking on unknown handles
    pub fn status_of(&self, handle: ModuleHandle) -> ModuleStatus {
        self.modules.borrow()[&handle].status
    }

    fn insert(&self, module: FakeModule) -> ModuleHandle {
        let handle = ModuleHandle::from_raw(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.modules.borrow_mut().insert(handle, module);
        handle
    }

    fn scan_imports(source: &str) -> Vec<String> {
        let from_import = Regex::new(r#"import\s+[^'"]+?\s+from\s+['"]([^'"]+)['"]"#).unwrap();
        let bare_import = Regex::new(r#"import\s+['"]([^'"]+)['"]"#).unwrap();

        let mut requests: Vec<String> = from_import
            .captures_iter(source)
            .map(|cap| cap[1].to_string())
            .collect();
        for cap in bare_import.captures_iter(source) {
            let specifier = cap[1].to_string();
            if !requests.contains(&specifier) {
                requests.push(specifier);
            }
        }
        requests
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingHost for FakeEngine {
    fn compile_module(
        &self,
        source: &str,
        origin: &ModuleOrigin,
    ) -> Result<ModuleHandle, CompileError> {
        let resource = origin.resource_name();

        if let Some(offset) = source.find("syntax error") {
            let line = source[..offset].lines().count().max(1) as u32;
            return Err(CompileError {
                resource,
                message: "unexpected token".to_string(),
                line: Some(line),
                column: Some(1),
            });
        }

        self.compile_count.set(self.compile_count.get() + 1);
        Ok(self.insert(FakeModule {
            resource,
            requests: Self::scan_imports(source),
            status: ModuleStatus::Uninstantiated,
            throws: source
                .contains("throw")
                .then(|| "Error: boom".to_string()),
            pending: source.contains("await"),
        }))
    }

    fn module_requests(&self, module: ModuleHandle) -> Vec<String> {
        self.modules
            .borrow()
            .get(&module)
            .map(|m| m.requests.clone())
            .unwrap_or_default()
    }

    fn module_status(&self, module: ModuleHandle) -> ModuleStatus {
        self.modules
            .borrow()
            .get(&module)
            .map(|m| m.status)
            .unwrap_or(ModuleStatus::Errored)
    }

    fn instantiate_module(
        &self,
        module: ModuleHandle,
        resolve_import: &mut dyn FnMut(&str, ModuleHandle) -> Option<ModuleHandle>,
    ) -> Result<(), LinkError> {
        self.instantiate_count.set(self.instantiate_count.get() + 1);

        let (resource, requests) = {
            let modules = self.modules.borrow();
            let m = &modules[&module];
            (m.resource.clone(), m.requests.clone())
        };

        for specifier in &requests {
            if resolve_import(specifier, module).is_none() {
                return Err(LinkError::UnresolvedImport {
                    resource,
                    specifier: specifier.clone(),
                });
            }
        }

        self.modules
            .borrow_mut()
            .get_mut(&module)
            .expect("instantiating unknown module")
            .status = ModuleStatus::Instantiated;
        Ok(())
    }

    fn evaluate_module(
        &self,
        module: ModuleHandle,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let (resource, throws, pending) = {
            let modules = self.modules.borrow();
            let m = &modules[&module];
            assert!(
                m.status >= ModuleStatus::Instantiated,
                "evaluated '{}' before instantiation",
                m.resource
            );
            (m.resource.clone(), m.throws.clone(), m.pending)
        };

        let mut modules = self.modules.borrow_mut();
        let m = modules.get_mut(&module).expect("evaluating unknown module");

        if let Some(thrown) = throws {
            m.status = ModuleStatus::Errored;
            return Err(EvaluationError { resource, thrown });
        }

        m.status = ModuleStatus::Evaluated;
        Ok(if pending {
            EvaluationOutcome::Pending
        } else {
            EvaluationOutcome::Completed
        })
    }
}
