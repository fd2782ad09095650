//! Import statements as seen by the flattener
//!
//! Only module-level imports are recorded: they drive traversal of local
//! modules and, for everything outside the project, end up merged at the top
//! of the bundle. Imports nested in function bodies travel with their function.

mod external;

use std::{fmt, path::PathBuf};

use ruff_python_ast::Stmt;

pub use external::{ExternalImport, ExternalImportSet};

/// One imported name of a `from` import, with its optional alias
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn is_star(&self) -> bool {
        self.name == "*"
    }
}

impl fmt::Display for ImportedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} as {alias}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A single module-level import
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportStatement {
    /// `import module` or `import module as alias`
    Import {
        module: String,
        alias: Option<String>,
    },
    /// `from module import a, b as c`, possibly relative
    ImportFrom {
        module: Option<String>,
        level: u32,
        names: Vec<ImportedName>,
    },
}

impl ImportStatement {
    /// Convert an import statement; `import a, b` yields one entry per module
    ///
    /// Returns an empty list for anything that is not an import.
    pub fn from_stmt(stmt: &Stmt) -> Vec<Self> {
        match stmt {
            Stmt::Import(import) => import
                .names
                .iter()
                .map(|alias| Self::Import {
                    module: alias.name.as_str().to_owned(),
                    alias: alias.asname.as_ref().map(|name| name.as_str().to_owned()),
                })
                .collect(),
            Stmt::ImportFrom(import_from) => vec![Self::ImportFrom {
                module: import_from
                    .module
                    .as_ref()
                    .map(|module| module.as_str().to_owned()),
                level: import_from.level,
                names: import_from
                    .names
                    .iter()
                    .map(|alias| ImportedName {
                        name: alias.name.as_str().to_owned(),
                        alias: alias.asname.as_ref().map(|name| name.as_str().to_owned()),
                    })
                    .collect(),
            }],
            _ => Vec::new(),
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Self::ImportFrom { level, .. } if *level > 0)
    }

    /// Module name as written, with leading dots for relative imports
    pub fn qualified_module(&self) -> String {
        match self {
            Self::Import { module, .. } => module.clone(),
            Self::ImportFrom { module, level, .. } => {
                let dots = ".".repeat(*level as usize);
                format!("{dots}{}", module.as_deref().unwrap_or_default())
            }
        }
    }
}

/// An import together with the module it appeared in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub statement: ImportStatement,
    pub origin: PathBuf,
}
