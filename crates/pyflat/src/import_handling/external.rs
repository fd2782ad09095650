//! Aggregation of imports that stay imports in the bundle
//!
//! Every import whose module does not resolve inside the project root is
//! merged per module and rendered as one sorted block of import lines.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rustc_hash::FxHashSet;

use super::{ImportRecord, ImportStatement, ImportedName};
use crate::resolver::ModuleResolver;

/// Everything imported from one external module
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExternalImport {
    /// Bare `import module [as alias]` forms; non-empty means the module is imported itself
    module_aliases: BTreeSet<Option<String>>,
    /// Rendered `name [as alias]` entries from `from module import ...`
    names: BTreeSet<String>,
}

impl ExternalImport {
    /// Whether some file imports the module itself
    pub fn imports_module(&self) -> bool {
        !self.module_aliases.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn render(&self, module: &str, lines: &mut Vec<String>) {
        // A bare import of the module takes precedence over any name list
        if self.imports_module() {
            for alias in &self.module_aliases {
                lines.push(match alias {
                    Some(alias) => format!("import {module} as {alias}"),
                    None => format!("import {module}"),
                });
            }
        } else if self.names.contains("*") {
            lines.push(format!("from {module} import *"));
        } else if !self.names.is_empty() {
            let names: Vec<&str> = self.names().collect();
            lines.push(format!("from {module} import {}", names.join(", ")));
        }
    }
}

/// External module name → what the bundle imports from it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExternalImportSet {
    modules: BTreeMap<String, ExternalImport>,
}

impl ExternalImportSet {
    /// Collect the external imports among `imports`
    ///
    /// A `from` import is dropped entirely when any of its names appears in
    /// `ignored_names`. Relative imports always point into the project and are
    /// never external.
    pub fn aggregate(
        imports: &[ImportRecord],
        resolver: &mut ModuleResolver,
        ignored_names: &[String],
    ) -> Self {
        let ignored: FxHashSet<&str> = ignored_names.iter().map(String::as_str).collect();
        let mut set = Self::default();

        for record in imports {
            if record.statement.is_relative() {
                continue;
            }
            match &record.statement {
                ImportStatement::Import { module, alias } => {
                    let kind = resolver.classify_import(module);
                    if kind.is_external() {
                        debug!("Keeping {kind} import `{module}`");
                        set.add_module(module, alias.as_deref());
                    }
                }
                ImportStatement::ImportFrom {
                    module: Some(module),
                    names,
                    ..
                } => {
                    let kind = resolver.classify_import(module);
                    if !kind.is_external() {
                        continue;
                    }
                    if let Some(name) = names.iter().find(|n| ignored.contains(n.name.as_str())) {
                        debug!("Ignoring `from {module} import ...` because of `{}`", name.name);
                        continue;
                    }
                    debug!("Keeping {kind} import `from {module} import ...`");
                    set.add_names(module, names);
                }
                ImportStatement::ImportFrom { module: None, .. } => {}
            }
        }

        set
    }

    pub fn add_module(&mut self, module: &str, alias: Option<&str>) {
        self.modules
            .entry(module.to_owned())
            .or_default()
            .module_aliases
            .insert(alias.map(str::to_owned));
    }

    pub fn add_names(&mut self, module: &str, names: &[ImportedName]) {
        self.modules
            .entry(module.to_owned())
            .or_default()
            .names
            .extend(names.iter().map(ToString::to_string));
    }

    pub fn get(&self, module: &str) -> Option<&ExternalImport> {
        self.modules.get(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Import lines for the bundle header
    ///
    /// `from __future__` lines come first since Python rejects them anywhere
    /// else; the rest are sorted by line text.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.modules.len());
        for (module, import) in &self.modules {
            import.render(module, &mut lines);
        }
        lines.sort_by(|a, b| {
            is_future_import(b)
                .cmp(&is_future_import(a))
                .then_with(|| a.cmp(b))
        });
        lines
    }
}

fn is_future_import(line: &str) -> bool {
    line.starts_with("from __future__ import")
}
