//! AST transformer that removes docstrings from function and class bodies.
//!
//! The leading string-literal statement of every `def`, `async def` and
//! `class` body is dropped, recursively, so nested functions, methods and
//! inner classes lose theirs too. Module docstrings and bare assignments are
//! left alone.

use ruff_python_ast::{
    AtomicNodeIndex, Stmt, StmtPass,
    helpers::is_docstring_stmt,
    visitor::transformer::{Transformer, walk_stmt},
};
use ruff_text_size::TextRange;

/// Removes docstrings from definition bodies
#[derive(Debug, Default)]
pub struct DocstringStripper;

impl DocstringStripper {
    pub fn new() -> Self {
        Self
    }

    /// Strip docstrings from a top-level definition and everything nested in it
    pub fn strip(&self, stmt: &mut Stmt) {
        self.visit_stmt(stmt);
    }

    /// Drop a leading docstring, keeping the body valid if nothing remains
    fn strip_body(body: &mut Vec<Stmt>) {
        if body.first().is_some_and(is_docstring_stmt) {
            body.remove(0);
            if body.is_empty() {
                body.push(Stmt::Pass(StmtPass {
                    range: TextRange::default(),
                    node_index: AtomicNodeIndex::dummy(),
                }));
            }
        }
    }
}

impl Transformer for DocstringStripper {
    fn visit_stmt(&self, stmt: &mut Stmt) {
        match stmt {
            Stmt::FunctionDef(func_def) => Self::strip_body(&mut func_def.body),
            Stmt::ClassDef(class_def) => Self::strip_body(&mut class_def.body),
            _ => {}
        }
        walk_stmt(self, stmt);
    }
}

#[cfg(test)]
mod tests {
    use ruff_python_ast::ModModule;
    use ruff_python_parser::{ParseError, parse_module};

    use super::*;

    fn parse_and_strip(code: &str) -> Result<ModModule, ParseError> {
        let mut module = parse_module(code)?.into_syntax();
        let stripper = DocstringStripper::new();
        for stmt in &mut module.body {
            stripper.strip(stmt);
        }
        Ok(module)
    }

    #[test]
    fn test_function_docstring_removed() {
        let code = r#"
def add(a, b):
    """Add two numbers."""
    return a + b
"#;
        let module = parse_and_strip(code).expect("failed to parse test code");

        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected a function");
        };
        assert_eq!(func.body.len(), 1);
        assert!(matches!(func.body[0], Stmt::Return(_)));
    }

    #[test]
    fn test_nested_definitions_are_stripped() {
        let code = r#"
class Greeter:
    """Class docstring."""

    def greet(self):
        """Method docstring."""
        def inner():
            'inner docstring'
            return 1
        return inner()

    async def fetch(self):
        """Async docstring."""
        return None
"#;
        let module = parse_and_strip(code).expect("failed to parse test code");

        let Stmt::ClassDef(class) = &module.body[0] else {
            panic!("expected a class");
        };
        assert_eq!(class.body.len(), 2);
        for member in &class.body {
            let Stmt::FunctionDef(method) = member else {
                panic!("expected a method");
            };
            assert!(!method.body.first().is_some_and(is_docstring_stmt));
            for stmt in &method.body {
                if let Stmt::FunctionDef(inner) = stmt {
                    assert!(!inner.body.first().is_some_and(is_docstring_stmt));
                }
            }
        }
    }

    #[test]
    fn test_docstring_only_body_becomes_pass() {
        let code = r#"
def todo():
    """Nothing here yet."""
"#;
        let module = parse_and_strip(code).expect("failed to parse test code");

        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected a function");
        };
        assert_eq!(func.body.len(), 1);
        assert!(matches!(func.body[0], Stmt::Pass(_)));
    }

    #[test]
    fn test_only_leading_string_is_removed() {
        let code = r#"
def f():
    x = 1
    """not a docstring"""
    return x
"#;
        let module = parse_and_strip(code).expect("failed to parse test code");

        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected a function");
        };
        assert_eq!(func.body.len(), 3);
    }

    #[test]
    fn test_assignments_untouched() {
        let code = r#"
GREETING = "hello"
"#;
        let module = parse_and_strip(code).expect("failed to parse test code");
        assert_eq!(module.body.len(), 1);
        assert!(matches!(module.body[0], Stmt::Assign(_)));
    }
}
