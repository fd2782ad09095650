//! Shared type definitions for the pyflat crate
//!
//! This module contains common types that are used across multiple components
//! of the flattener, ensuring consistency and avoiding circular dependencies.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

/// Type alias for IndexMap with FxHasher for better performance
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
/// Type alias for IndexSet with FxHasher for better performance
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Classification of an imported module relative to the project root
///
/// Only `Local` modules are traversed and inlined; everything else is carried
/// into the bundle as an import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Python standard library modules (e.g., os, sys, json)
    StandardLibrary,

    /// Anything that is neither stdlib nor found under the project root
    ThirdParty,

    /// Modules that live inside the project root
    Local,
}

impl ModuleKind {
    /// Check if this module lives inside the project root
    pub fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Check if this module stays an import in the bundle
    pub fn is_external(self) -> bool {
        !self.is_local()
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StandardLibrary => write!(f, "stdlib"),
            Self::ThirdParty => write!(f, "third-party"),
            Self::Local => write!(f, "local"),
        }
    }
}
