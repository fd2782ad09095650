//! Flattens a multi-module Python program into one self-contained script.
//!
//! Starting from an entry file, pyflat follows local imports, pulls every
//! top-level function and class into a shared symbol table, merges the
//! imports that stay external and writes a single Python file.

pub mod bundler;
pub mod code_generator;
pub mod collector;
pub mod config;
pub mod emitter;
pub mod error;
pub mod import_handling;
pub mod pruner;
pub mod resolver;
pub mod stdlib_detection;
pub mod symbol_table;
pub mod types;
pub mod visitors;

pub use bundler::{BundleSummary, Bundler};
pub use config::Config;
pub use error::{BundleError, PruneError};
