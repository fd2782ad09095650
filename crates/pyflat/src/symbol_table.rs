//! Name → definition table shared by the whole bundle
//!
//! Every top-level `def`, `async def` and `class` discovered during collection
//! lands here, keyed by name. A later module defining the same name replaces
//! the earlier entry in place (last writer wins), so insertion order is the
//! order in which each name was first seen.

use std::path::{Path, PathBuf};

use log::{trace, warn};
use ruff_python_ast::Stmt;

use crate::{types::FxIndexMap, visitors::DocstringStripper};

/// A top-level function or class, docstring-free, tagged with its origin module
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub stmt: Stmt,
    pub module: PathBuf,
}

impl Definition {
    /// Build a definition from a top-level statement
    ///
    /// Returns `None` for anything that is not a function or class definition.
    pub fn from_stmt(mut stmt: Stmt, module: &Path) -> Option<Self> {
        let name = match &stmt {
            Stmt::FunctionDef(func_def) => func_def.name.to_string(),
            Stmt::ClassDef(class_def) => class_def.name.to_string(),
            _ => return None,
        };
        DocstringStripper::new().strip(&mut stmt);
        Some(Self {
            name,
            stmt,
            module: module.to_path_buf(),
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SymbolTable {
    definitions: FxIndexMap<String, Definition>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing any previous one with the same name
    ///
    /// Returns the replaced definition, if any.
    pub fn insert(&mut self, definition: Definition) -> Option<Definition> {
        if let Some(existing) = self.definitions.get(&definition.name) {
            if existing.module == definition.module {
                trace!(
                    "`{}` redefined within {}",
                    definition.name,
                    definition.module.display()
                );
            } else {
                warn!(
                    "`{}` is defined in both {} and {}; keeping the one from {}",
                    definition.name,
                    existing.module.display(),
                    definition.module.display(),
                    definition.module.display()
                );
            }
        }
        self.definitions.insert(definition.name.clone(), definition)
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in table order
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    /// Group definitions by origin module
    ///
    /// Modules appear in the order of their first definition in the table;
    /// definitions keep table order within a module.
    pub fn by_module(&self) -> FxIndexMap<&Path, Vec<&Definition>> {
        let mut grouped: FxIndexMap<&Path, Vec<&Definition>> = FxIndexMap::default();
        for definition in self.definitions.values() {
            grouped
                .entry(definition.module.as_path())
                .or_default()
                .push(definition);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ruff_python_parser::parse_module;

    use super::*;

    fn definitions(code: &str, module: &str) -> Vec<Definition> {
        let module_ast = parse_module(code).expect("Failed to parse").into_syntax();
        module_ast
            .body
            .into_iter()
            .filter_map(|stmt| Definition::from_stmt(stmt, Path::new(module)))
            .collect()
    }

    #[test]
    fn test_only_functions_and_classes_become_definitions() {
        let defs = definitions(
            r#"
X = 1
def f():
    """doc"""
    return X
async def g():
    pass
class C:
    pass
import os
"#,
            "a.py",
        );
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g", "C"]);
        assert!(defs.iter().all(|d| d.module == Path::new("a.py")));

        let Stmt::FunctionDef(f) = &defs[0].stmt else {
            panic!("expected a function");
        };
        assert!(matches!(f.body[0], Stmt::Return(_)));
    }

    #[test]
    fn test_last_writer_wins_in_place() {
        let mut table = SymbolTable::new();
        for def in definitions("def f():\n    pass\ndef g():\n    pass\n", "a.py") {
            table.insert(def);
        }
        for def in definitions("def g():\n    return 2\ndef h():\n    pass\n", "b.py") {
            table.insert(def);
        }

        let order: Vec<_> = table.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(order, vec!["f", "g", "h"]);
        assert_eq!(
            table.get("g").map(|d| d.module.as_path()),
            Some(Path::new("b.py"))
        );
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_by_module_groups_by_current_owner() {
        let mut table = SymbolTable::new();
        for def in definitions("def f():\n    pass\ndef g():\n    pass\n", "a.py") {
            table.insert(def);
        }
        for def in definitions("def g():\n    pass\n", "b.py") {
            table.insert(def);
        }

        let grouped = table.by_module();
        let summary: Vec<(&Path, Vec<&str>)> = grouped
            .iter()
            .map(|(module, defs)| (*module, defs.iter().map(|d| d.name.as_str()).collect()))
            .collect();

        // `a.py` lost `g` to `b.py`, so it now owns a single definition
        assert_eq!(
            summary,
            vec![
                (Path::new("a.py"), vec!["f"]),
                (Path::new("b.py"), vec!["g"]),
            ]
        );
    }
}
