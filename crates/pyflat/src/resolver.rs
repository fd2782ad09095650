use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};

use crate::{
    stdlib_detection::is_stdlib_module,
    types::{FxIndexMap, ModuleKind},
};

/// Module descriptor for import resolution
#[derive(Debug)]
struct ImportModuleDescriptor {
    /// Number of leading dots for relative imports
    leading_dots: usize,
    /// Module name parts (e.g., ["foo", "bar"] for "foo.bar")
    name_parts: Vec<String>,
}

impl ImportModuleDescriptor {
    fn from_module_name(name: &str) -> Self {
        let leading_dots = name.chars().take_while(|c| *c == '.').count();
        let name_parts = name[leading_dots..]
            .split('.')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            leading_dots,
            name_parts,
        }
    }
}

/// What a module name turned into under a given root
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    /// A source file (`foo.py` or `foo/__init__.py`)
    File(PathBuf),
    /// A directory without `__init__.py`
    Namespace(PathBuf),
}

/// Maps import names to source files, but only inside the project root
#[derive(Debug)]
pub struct ModuleResolver {
    /// Canonical project root
    root: PathBuf,
    /// Python 3 minor version for stdlib classification
    python_minor: u8,
    /// Cache of absolute lookups
    module_cache: FxIndexMap<String, Option<Lookup>>,
}

impl ModuleResolver {
    pub fn new(project_root: &Path, python_minor: u8) -> Result<Self> {
        let root = project_root.canonicalize().with_context(|| {
            format!(
                "failed to canonicalize project root {}",
                project_root.display()
            )
        })?;
        debug!("Project root: {}", root.display());
        Ok(Self {
            root,
            python_minor,
            module_cache: FxIndexMap::default(),
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.root
    }

    /// Resolve an absolute module name to a source file inside the project root
    ///
    /// Returns `None` for stdlib modules, modules that cannot be found and
    /// namespace packages (which have no file of their own).
    pub fn resolve_module_path(&mut self, module_name: &str) -> Option<PathBuf> {
        match self.lookup(module_name) {
            Some(Lookup::File(path)) => Some(path),
            _ => None,
        }
    }

    /// Resolve a possibly relative import as seen from `current_module_path`
    pub fn resolve_module_path_with_context(
        &mut self,
        module_name: &str,
        current_module_path: &Path,
    ) -> Result<Option<PathBuf>> {
        if !module_name.starts_with('.') {
            return Ok(self.resolve_module_path(module_name));
        }

        let descriptor = ImportModuleDescriptor::from_module_name(module_name);
        match self.resolve_relative_import(&descriptor, current_module_path)? {
            Some(Lookup::File(path)) => Ok(Some(path)),
            _ => Ok(None),
        }
    }

    /// Classify an absolute module name
    ///
    /// A module is local when it resolves to a file or a namespace package
    /// under the project root; stdlib names are never local.
    pub fn classify_import(&mut self, module_name: &str) -> ModuleKind {
        if module_name.starts_with('.') {
            return ModuleKind::Local;
        }
        if is_stdlib_module(module_name, self.python_minor) {
            return ModuleKind::StandardLibrary;
        }
        if self.lookup(module_name).is_some() {
            ModuleKind::Local
        } else {
            ModuleKind::ThirdParty
        }
    }

    fn lookup(&mut self, module_name: &str) -> Option<Lookup> {
        if let Some(cached) = self.module_cache.get(module_name) {
            return cached.clone();
        }

        let found = if is_stdlib_module(module_name, self.python_minor) {
            None
        } else {
            let descriptor = ImportModuleDescriptor::from_module_name(module_name);
            self.resolve_in_directory(&self.root, &descriptor)
        };

        self.module_cache
            .insert(module_name.to_owned(), found.clone());
        found
    }

    /// Resolve a relative import given the current module's path
    fn resolve_relative_import(
        &self,
        descriptor: &ImportModuleDescriptor,
        current_module_path: &Path,
    ) -> Result<Option<Lookup>> {
        let mut base_dir = current_module_path
            .parent()
            .ok_or_else(|| anyhow!("Cannot get parent directory of {current_module_path:?}"))?;

        // One dot = current package, two dots = parent package, etc.
        for _ in 1..descriptor.leading_dots {
            base_dir = base_dir
                .parent()
                .ok_or_else(|| anyhow!("Too many dots in relative import - went above root"))?;
        }

        // `from . import x` names the package itself
        if descriptor.name_parts.is_empty() {
            let init_path = base_dir.join("__init__.py");
            if init_path.is_file() {
                return Ok(self.inside_root(init_path).map(Lookup::File));
            }
            return Ok(None);
        }

        Ok(self.resolve_in_directory(base_dir, descriptor))
    }

    /// Resolve a module within a specific directory
    ///
    /// For the last name part the order is: package (`foo/__init__.py`), then
    /// module file (`foo.py`), then namespace package (`foo/`).
    fn resolve_in_directory(
        &self,
        base: &Path,
        descriptor: &ImportModuleDescriptor,
    ) -> Option<Lookup> {
        let (last, parents) = descriptor.name_parts.split_last()?;

        let mut current_path = base.to_path_buf();
        for part in parents {
            current_path.push(part);
            if !current_path.is_dir() {
                return None;
            }
        }

        let package_init = current_path.join(last).join("__init__.py");
        if package_init.is_file() {
            debug!("Found package at: {package_init:?}");
            return self.inside_root(package_init).map(Lookup::File);
        }

        let module_file = current_path.join(format!("{last}.py"));
        if module_file.is_file() {
            debug!("Found module file at: {module_file:?}");
            return self.inside_root(module_file).map(Lookup::File);
        }

        let namespace_dir = current_path.join(last);
        if namespace_dir.is_dir() {
            debug!("Found namespace package at: {namespace_dir:?}");
            return self.inside_root(namespace_dir).map(Lookup::Namespace);
        }

        None
    }

    /// Canonicalize a candidate and keep it only if it lies strictly inside the root
    fn inside_root(&self, path: PathBuf) -> Option<PathBuf> {
        let canonical = match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!("Failed to canonicalize path {}: {}", path.display(), e);
                return None;
            }
        };
        if canonical != self.root && canonical.starts_with(&self.root) {
            Some(canonical)
        } else {
            debug!("{} lies outside the project root", canonical.display());
            None
        }
    }
}
