//! Dependency collection over the local import graph
//!
//! Collection runs in two phases. The ordered phase processes the preload
//! files and then the entry file, exactly in that order. The second phase
//! drains the worklist of local modules discovered along the way, first
//! discovered first processed, until no new module turns up. Every module is
//! parsed at most once.

use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use log::{debug, trace, warn};
use ruff_python_ast::{Expr, ModModule, Stmt};
use ruff_python_parser::parse_module;
use rustc_hash::FxHashSet;

use crate::{
    error::BundleError,
    import_handling::{ImportRecord, ImportStatement, ImportedName},
    resolver::ModuleResolver,
    symbol_table::{Definition, SymbolTable},
    types::{FxIndexSet, ModuleKind},
    visitors::UsedNameCollector,
};

/// Name of the entry-point function looked up in the entry module
const ENTRY_FUNCTION: &str = "main";

/// What collection learned about a single module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub path: PathBuf,
    /// Function and class names in source order
    pub definitions: Vec<String>,
    /// Number of top-level assignments recorded as globals
    pub globals: usize,
    /// Every name the module references
    pub used_names: FxIndexSet<String>,
}

/// Result of a collection run
#[derive(Debug, Clone)]
pub struct CollectedProgram {
    /// Canonical entry file
    pub entry: PathBuf,
    /// Canonical preload files, de-duplicated, in caller order
    pub preload: Vec<PathBuf>,
    pub symbols: SymbolTable,
    /// Top-level assignments in discovery order, duplicates included
    pub globals: Vec<Stmt>,
    /// Module-level imports of every processed file
    pub imports: Vec<ImportRecord>,
    /// Processed modules in processing order
    pub modules: Vec<ModuleSummary>,
    /// Whether the entry module defines a top-level `main` function
    pub entry_defines_main: bool,
}

impl CollectedProgram {
    pub fn is_preload(&self, module: &Path) -> bool {
        self.preload.iter().any(|preload| preload == module)
    }
}

/// Accumulators threaded through every `process_file` call
#[derive(Debug, Default)]
struct CollectorState {
    seen: FxHashSet<PathBuf>,
    pending: VecDeque<PathBuf>,
    queued: FxHashSet<PathBuf>,
    symbols: SymbolTable,
    globals: Vec<Stmt>,
    imports: Vec<ImportRecord>,
    modules: Vec<ModuleSummary>,
    entry_defines_main: bool,
}

impl CollectorState {
    /// Queue a newly discovered module unless it is already seen or pending
    fn enqueue(&mut self, path: PathBuf) {
        if self.seen.contains(&path) || !self.queued.insert(path.clone()) {
            return;
        }
        trace!("Queued {}", path.display());
        self.pending.push_back(path);
    }

    fn next_pending(&mut self) -> Option<PathBuf> {
        let path = self.pending.pop_front()?;
        self.queued.remove(&path);
        Some(path)
    }
}

/// Walks the local import graph starting from the preload and entry files
#[derive(Debug)]
pub struct DependencyCollector<'r> {
    resolver: &'r mut ModuleResolver,
}

impl<'r> DependencyCollector<'r> {
    pub fn new(resolver: &'r mut ModuleResolver) -> Self {
        Self { resolver }
    }

    /// Collect every module reachable from `preload` and `entry`
    pub fn collect(&mut self, entry: &Path, preload: &[PathBuf]) -> Result<CollectedProgram> {
        let entry = canonical_source_path(entry)?;
        let mut preload_order: FxIndexSet<PathBuf> = FxIndexSet::default();
        for path in preload {
            preload_order.insert(canonical_source_path(path)?);
        }

        let mut ordered: FxIndexSet<PathBuf> = preload_order.clone();
        ordered.insert(entry.clone());

        let mut state = CollectorState::default();
        for path in &ordered {
            self.process_file(&mut state, path, &entry)?;
        }
        while let Some(path) = state.next_pending() {
            self.process_file(&mut state, &path, &entry)?;
        }

        debug!(
            "Collected {} modules, {} definitions, {} globals, {} imports",
            state.modules.len(),
            state.symbols.len(),
            state.globals.len(),
            state.imports.len()
        );

        Ok(CollectedProgram {
            entry,
            preload: preload_order.into_iter().collect(),
            symbols: state.symbols,
            globals: state.globals,
            imports: state.imports,
            modules: state.modules,
            entry_defines_main: state.entry_defines_main,
        })
    }

    /// Parse one module and fold its imports, definitions and globals into `state`
    fn process_file(&mut self, state: &mut CollectorState, path: &Path, entry: &Path) -> Result<()> {
        if !state.seen.insert(path.to_path_buf()) {
            return Ok(());
        }
        debug!("Processing {}", path.display());

        let module = parse_source_file(path)?;
        let used_names = UsedNameCollector::collect(&module.body);
        debug!("{} references {} names", path.display(), used_names.len());

        let is_entry = path == entry;
        let mut summary = ModuleSummary {
            path: path.to_path_buf(),
            definitions: Vec::new(),
            globals: 0,
            used_names,
        };
        let mut discovered = Vec::new();

        for stmt in module.body {
            match stmt {
                Stmt::Import(_) | Stmt::ImportFrom(_) => {
                    for statement in ImportStatement::from_stmt(&stmt) {
                        discovered.extend(self.local_targets(&statement, path));
                        state.imports.push(ImportRecord {
                            statement,
                            origin: path.to_path_buf(),
                        });
                    }
                }
                Stmt::Assign(_) if is_global_assignment(&stmt) => {
                    summary.globals += 1;
                    state.globals.push(stmt);
                }
                Stmt::FunctionDef(_) | Stmt::ClassDef(_) => {
                    if let Some(definition) = Definition::from_stmt(stmt, path) {
                        if is_entry
                            && definition.name == ENTRY_FUNCTION
                            && matches!(&definition.stmt, Stmt::FunctionDef(f) if !f.is_async)
                        {
                            state.entry_defines_main = true;
                        }
                        summary.definitions.push(definition.name.clone());
                        state.symbols.insert(definition);
                    }
                }
                _ => {}
            }
        }

        for target in discovered {
            state.enqueue(target);
        }
        state.modules.push(summary);
        Ok(())
    }

    /// Local source files an import statement points at
    fn local_targets(&mut self, statement: &ImportStatement, origin: &Path) -> Vec<PathBuf> {
        let mut targets = Vec::new();
        match statement {
            ImportStatement::Import { module, .. } => {
                if let Some(path) = self.resolver.resolve_module_path(module) {
                    warn!(
                        "{} imports local module `{module}` with a bare import; \
                         qualified access through `{module}.` will not resolve in the bundle",
                        origin.display()
                    );
                    targets.push(path);
                }
            }
            ImportStatement::ImportFrom { module, names, .. } if statement.is_relative() => {
                let qualified = statement.qualified_module();
                self.resolve_relative(&qualified, origin, &mut targets);
                for ImportedName { name, .. } in names.iter().filter(|name| !name.is_star()) {
                    let submodule = if module.is_some() {
                        format!("{qualified}.{name}")
                    } else {
                        format!("{qualified}{name}")
                    };
                    self.resolve_relative(&submodule, origin, &mut targets);
                }
                if targets.is_empty() {
                    warn!(
                        "Could not resolve relative import `{qualified}` in {}",
                        origin.display()
                    );
                }
            }
            ImportStatement::ImportFrom {
                module: Some(module),
                names,
                ..
            } => {
                if self.resolver.classify_import(module) != ModuleKind::Local {
                    return targets;
                }
                targets.extend(self.resolver.resolve_module_path(module));
                for name in names.iter().filter(|name| !name.is_star()) {
                    targets.extend(
                        self.resolver
                            .resolve_module_path(&format!("{module}.{}", name.name)),
                    );
                }
            }
            // `from import x` without a module or dots does not parse
            ImportStatement::ImportFrom { module: None, .. } => {}
        }
        targets
    }

    fn resolve_relative(&mut self, module: &str, origin: &Path, targets: &mut Vec<PathBuf>) {
        match self
            .resolver
            .resolve_module_path_with_context(module, origin)
        {
            Ok(Some(path)) => targets.push(path),
            Ok(None) => {}
            Err(e) => debug!("Relative import `{module}` in {}: {e}", origin.display()),
        }
    }
}

/// A top-level assignment with at least one plain name target
fn is_global_assignment(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Assign(assign) if assign.targets.iter().any(Expr::is_name_expr))
}

fn canonical_source_path(path: &Path) -> Result<PathBuf, BundleError> {
    path.canonicalize().map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a Python source file
pub fn parse_source_file(path: &Path) -> Result<ModModule, BundleError> {
    let source = fs::read_to_string(path).map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_module(&source)
        .map(ruff_python_parser::Parsed::into_syntax)
        .map_err(|err| BundleError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}
