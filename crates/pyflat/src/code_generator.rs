//! Rendering of AST statements back to Python source

use anyhow::{Context, Result};
use ruff_python_ast::Stmt;
use ruff_python_codegen::{Generator, Stylist};
use ruff_python_parser::parse_module;

/// Renders statements with ruff's default style: four-space indents, double
/// quotes and `\n` line endings
pub struct StatementRenderer {
    stylist: Stylist<'static>,
}

impl StatementRenderer {
    pub fn new() -> Result<Self> {
        let empty = parse_module("").context("failed to initialise code generator")?;
        Ok(Self {
            stylist: Stylist::from_tokens(empty.tokens(), ""),
        })
    }

    pub fn render(&self, stmt: &Stmt) -> String {
        Generator::from(&self.stylist).stmt(stmt)
    }
}

impl std::fmt::Debug for StatementRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementRenderer").finish_non_exhaustive()
    }
}
