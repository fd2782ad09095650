//! Collects every name a module references.
//!
//! Plain names, the base of attribute chains (`pkg` in `pkg.mod.attr`),
//! decorators and type annotations all count. The result is reported per
//! module; it does not decide what gets bundled.

use ruff_python_ast::{
    Expr, Stmt,
    visitor::source_order::{self, SourceOrderVisitor},
};

use crate::types::FxIndexSet;

#[derive(Debug, Default)]
pub struct UsedNameCollector {
    used_names: FxIndexSet<String>,
}

impl UsedNameCollector {
    /// Collect all names referenced anywhere in `body`, in first-seen order
    pub fn collect(body: &[Stmt]) -> FxIndexSet<String> {
        let mut visitor = Self::default();
        visitor.visit_body(body);
        visitor.used_names
    }
}

impl<'a> SourceOrderVisitor<'a> for UsedNameCollector {
    fn visit_expr(&mut self, expr: &'a Expr) {
        if let Expr::Name(name) = expr {
            self.used_names.insert(name.id.to_string());
        } else {
            source_order::walk_expr(self, expr);
        }
    }
}

#[cfg(test)]
mod tests {
    use ruff_python_parser::parse_module;

    use super::*;

    fn parse_and_collect(code: &str) -> FxIndexSet<String> {
        let module = parse_module(code).expect("Failed to parse").into_syntax();
        UsedNameCollector::collect(&module.body)
    }

    #[test]
    fn test_plain_names() {
        let used = parse_and_collect(
            r"
x = 1
y = x + 2
print(y)
",
        );
        assert!(used.contains("x"));
        assert!(used.contains("y"));
        assert!(used.contains("print"));
    }

    #[test]
    fn test_attribute_base_only() {
        let used = parse_and_collect("value = settings.database.url\n");
        assert!(used.contains("settings"));
        assert!(!used.contains("database"));
        assert!(!used.contains("url"));
    }

    #[test]
    fn test_decorators_and_annotations() {
        let used = parse_and_collect(
            r"
@register
def handler(event: Event, *args: Extra, retries: int = DEFAULT) -> Response:
    limit: Limit = compute()
    return limit
",
        );
        for name in [
            "register", "Event", "Extra", "int", "DEFAULT", "Response", "Limit", "compute",
        ] {
            assert!(used.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_class_bases_and_keywords() {
        let used = parse_and_collect(
            r"
class Model(Base, metaclass=Meta):
    field = Column()
",
        );
        assert!(used.contains("Base"));
        assert!(used.contains("Meta"));
        assert!(used.contains("Column"));
    }
}
