//! End-to-end bundling: collect, aggregate, emit, write and prune

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info, warn};

use crate::{
    collector::DependencyCollector,
    config::Config,
    emitter::ScriptEmitter,
    error::BundleError,
    import_handling::ExternalImportSet,
    pruner::{ReferencePruner, pruner_for},
    resolver::ModuleResolver,
};

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSummary {
    pub output: PathBuf,
    pub modules: usize,
    /// Emitted definitions in output order
    pub definitions: Vec<String>,
    /// Modules whose definitions did not make it into the bundle
    pub skipped_modules: Vec<PathBuf>,
    pub external_imports: usize,
}

#[derive(Debug)]
pub struct Bundler {
    config: Config,
    pruner: Box<dyn ReferencePruner>,
}

impl Bundler {
    pub fn new(config: Config) -> Self {
        let pruner = pruner_for(config.pruner);
        Self { config, pruner }
    }

    /// Bundler with a caller-supplied pruner instead of the configured one
    pub fn with_pruner(config: Config, pruner: Box<dyn ReferencePruner>) -> Self {
        Self { config, pruner }
    }

    /// Flatten `entry` and everything it reaches into `output`
    pub fn bundle(&self, entry: &Path, output: &Path) -> Result<BundleSummary> {
        check_paths(entry, output)?;

        let python_minor = self.config.python_minor()?;
        let project_root = self.config.project_root_for(entry);
        let mut resolver = ModuleResolver::new(&project_root, python_minor)?;
        let preload = self.config.preload_paths(resolver.project_root());

        info!("Bundling {} into {}", entry.display(), output.display());
        let program = DependencyCollector::new(&mut resolver).collect(entry, &preload)?;
        if !program.entry_defines_main {
            warn!(
                "{} does not define a top-level `main` function",
                entry.display()
            );
        }
        for module in &program.modules {
            debug!(
                "{}: {} definitions, {} globals, {} referenced names",
                module.path.display(),
                module.definitions.len(),
                module.globals,
                module.used_names.len()
            );
        }

        let imports =
            ExternalImportSet::aggregate(&program.imports, &mut resolver, &self.config.ignore_imports);
        debug!("{} external modules imported", imports.len());

        let emitter = ScriptEmitter::new(&self.config.banner, self.config.preamble.as_deref())?;
        let script = emitter.write(&program, &imports, output)?;
        info!("Flattened script written to {}", output.display());

        self.pruner.prune(output).map_err(BundleError::from)?;

        Ok(BundleSummary {
            output: output.to_path_buf(),
            modules: program.modules.len(),
            definitions: script.definitions,
            skipped_modules: script.skipped_modules,
            external_imports: imports.len(),
        })
    }
}

/// Reject runs whose entry or output location is missing
fn check_paths(entry: &Path, output: &Path) -> Result<(), BundleError> {
    if !entry.is_file() {
        return Err(BundleError::MissingEntry(entry.to_path_buf()));
    }
    let output_dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !output_dir.is_dir() {
        return Err(BundleError::MissingOutputDir(output_dir.to_path_buf()));
    }
    Ok(())
}
