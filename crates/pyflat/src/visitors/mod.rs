//! AST visitor implementations for pyflat
//!
//! Transformers that clean up collected definitions and read-only visitors
//! that analyse a parsed module.

mod docstring_stripper;
mod used_names;

pub use docstring_stripper::DocstringStripper;
pub use used_names::UsedNameCollector;
