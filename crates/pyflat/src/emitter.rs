//! Assembly of the flattened script
//!
//! The document is laid out in a fixed order:
//!
//! 1. banner
//! 2. merged external imports, one per line, then a blank line
//! 3. optional preamble
//! 4. unique top-level assignments
//! 5. every definition of every preload module, in preload order
//! 6. definitions of the remaining modules that own exactly one definition
//!
//! Definitions are separated by two blank lines.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use cow_utils::CowUtils;
use log::debug;

use crate::{
    code_generator::StatementRenderer,
    collector::CollectedProgram,
    error::BundleError,
    import_handling::ExternalImportSet,
    symbol_table::Definition,
    types::FxIndexSet,
};

/// A rendered script plus what went into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedScript {
    pub text: String,
    /// Names of the emitted definitions, in output order
    pub definitions: Vec<String>,
    /// Non-preload modules whose definitions were left out
    pub skipped_modules: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct ScriptEmitter<'a> {
    banner: &'a str,
    preamble: Option<&'a str>,
    renderer: StatementRenderer,
}

impl<'a> ScriptEmitter<'a> {
    pub fn new(banner: &'a str, preamble: Option<&'a str>) -> Result<Self> {
        Ok(Self {
            banner,
            preamble,
            renderer: StatementRenderer::new()?,
        })
    }

    pub fn render(
        &self,
        program: &CollectedProgram,
        imports: &ExternalImportSet,
    ) -> EmittedScript {
        let mut text = String::new();

        text.push_str(self.banner.trim());
        text.push('\n');
        for line in imports.render_lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text.push('\n');

        if let Some(preamble) = self.preamble.map(str::trim).filter(|p| !p.is_empty()) {
            text.push_str(&preamble.cow_replace("\r\n", "\n"));
            text.push_str("\n\n");
        }

        let globals: FxIndexSet<String> = program
            .globals
            .iter()
            .map(|stmt| self.renderer.render(stmt))
            .collect();
        for global in &globals {
            text.push_str(global);
            text.push('\n');
        }

        let mut definitions = Vec::new();
        let grouped = program.symbols.by_module();

        for preload in &program.preload {
            if let Some(owned) = grouped.get(&preload.as_path()) {
                for definition in owned {
                    self.push_definition(&mut text, definition, &mut definitions);
                }
            }
        }

        let mut skipped_modules = Vec::new();
        for (module, owned) in &grouped {
            if program.is_preload(module) {
                continue;
            }
            if let [definition] = owned.as_slice() {
                self.push_definition(&mut text, definition, &mut definitions);
            } else {
                debug!(
                    "Leaving out {} definitions of {}",
                    owned.len(),
                    module.display()
                );
                skipped_modules.push(module.to_path_buf());
            }
        }

        EmittedScript {
            text,
            definitions,
            skipped_modules,
        }
    }

    /// Render and write the script to `output`
    pub fn write(
        &self,
        program: &CollectedProgram,
        imports: &ExternalImportSet,
        output: &Path,
    ) -> Result<EmittedScript> {
        let script = self.render(program, imports);
        fs::write(output, &script.text).map_err(|source| BundleError::Write {
            path: output.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} bytes to {}", script.text.len(), output.display());
        Ok(script)
    }

    fn push_definition(&self, text: &mut String, definition: &Definition, names: &mut Vec<String>) {
        text.push_str("\n\n");
        text.push_str(&self.renderer.render(&definition.stmt));
        text.push('\n');
        names.push(definition.name.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use ruff_python_ast::Stmt;
    use ruff_python_parser::parse_module;

    use super::*;
    use crate::symbol_table::SymbolTable;

    fn parse(code: &str) -> Vec<Stmt> {
        parse_module(code).expect("Failed to parse").into_syntax().body
    }

    fn program(modules: &[(&str, &str)], preload: &[&str]) -> CollectedProgram {
        let mut symbols = SymbolTable::new();
        let mut globals = Vec::new();
        for (path, code) in modules {
            for stmt in parse(code) {
                if matches!(stmt, Stmt::Assign(_)) {
                    globals.push(stmt);
                } else if let Some(definition) = Definition::from_stmt(stmt, Path::new(path)) {
                    symbols.insert(definition);
                }
            }
        }
        CollectedProgram {
            entry: PathBuf::from(modules[0].0),
            preload: preload.iter().map(PathBuf::from).collect(),
            symbols,
            globals,
            imports: Vec::new(),
            modules: Vec::new(),
            entry_defines_main: true,
        }
    }

    #[test]
    fn test_layout_of_header_and_globals() -> Result<()> {
        let program = program(&[("main.py", "X = 1\nY = 2\nX = 1\n\ndef main():\n    pass\n")], &[]);
        let mut imports = ExternalImportSet::default();
        imports.add_module("os", None);

        let emitter = ScriptEmitter::new("  \"\"\"Generated.\"\"\"\n\n", Some("\r\n# setup\r\n"))?;
        let script = emitter.render(&program, &imports);

        assert_eq!(
            script.text,
            "\"\"\"Generated.\"\"\"\nimport os\n\n# setup\n\nX = 1\nY = 2\n\n\ndef main():\n    pass\n"
        );
        assert_eq!(script.definitions, vec!["main"]);
        Ok(())
    }

    #[test]
    fn test_blank_preamble_is_skipped() -> Result<()> {
        let program = program(&[("main.py", "X = 1\n")], &[]);
        let emitter = ScriptEmitter::new("", Some("   \n"))?;

        let script = emitter.render(&program, &ExternalImportSet::default());

        assert_eq!(script.text, "\n\nX = 1\n");
        Ok(())
    }

    #[test]
    fn test_preload_definitions_come_first() -> Result<()> {
        let program = program(
            &[
                ("main.py", "def main():\n    pass\n"),
                ("utils.py", "def greet():\n    pass\n"),
                ("math.py", "def add():\n    pass\n\ndef sub():\n    pass\n"),
            ],
            &["math.py"],
        );
        let emitter = ScriptEmitter::new("", None)?;

        let script = emitter.render(&program, &ExternalImportSet::default());

        assert_eq!(script.definitions, vec!["add", "sub", "main", "greet"]);
        assert!(script.skipped_modules.is_empty());
        Ok(())
    }

    #[test]
    fn test_multi_definition_modules_are_left_out() -> Result<()> {
        let program = program(
            &[
                ("main.py", "def main():\n    pass\n"),
                ("math.py", "def add():\n    pass\n\ndef sub():\n    pass\n"),
                ("utils.py", "class Greeter:\n    pass\n"),
            ],
            &[],
        );
        let emitter = ScriptEmitter::new("", None)?;

        let script = emitter.render(&program, &ExternalImportSet::default());

        assert_eq!(script.definitions, vec!["main", "Greeter"]);
        assert_eq!(script.skipped_modules, vec![PathBuf::from("math.py")]);
        assert!(!script.text.contains("def add"));
        Ok(())
    }

    #[test]
    fn test_write_reports_missing_directory() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let program = program(&[("main.py", "def main():\n    pass\n")], &[]);
        let emitter = ScriptEmitter::new("", None)?;
        let output = temp_dir.path().join("missing").join("out.py");

        let err = emitter
            .write(&program, &ExternalImportSet::default(), &output)
            .expect_err("parent directory does not exist");

        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::Write { .. })
        ));
        Ok(())
    }
}
