//! Standard library detection utilities
//!
//! This module is the single source of truth for deciding whether an import
//! names a Python standard library module. Such imports are never looked up on
//! disk: they are external by definition.

use ruff_python_stdlib::sys;

/// Default target when no `target_version` is configured (Python 3.10)
pub const DEFAULT_PYTHON_MINOR: u8 = 10;

/// Check if a module name represents a Python standard library module
///
/// This uses ruff's stdlib database and handles both direct matches and
/// submodules (e.g., both "os" and "os.path" are recognized).
///
/// # Arguments
/// * `module_name` - The module name to check
/// * `python_minor` - The Python 3 minor version (e.g., 10 for Python 3.10)
pub fn is_stdlib_module(module_name: &str, python_minor: u8) -> bool {
    // __future__ is not part of ruff's table
    if module_name == "__future__" {
        return true;
    }

    if sys::is_known_standard_library(python_minor, module_name) {
        return true;
    }

    module_name
        .split('.')
        .next()
        .is_some_and(|top_level| sys::is_known_standard_library(python_minor, top_level))
}

/// Parse a target version such as `py310` or `3.10` into a Python 3 minor version
pub fn parse_target_version(value: &str) -> Option<u8> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("py3")
        .or_else(|| trimmed.strip_prefix("3."))?;
    digits.parse().ok()
}
