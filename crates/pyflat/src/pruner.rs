//! Post-processing of the written script by an external tool
//!
//! The bundle carries every definition the collector kept plus the merged
//! import block, so it usually contains imports and locals nobody reads. A
//! pruner rewrites the file in place to drop them.

use std::{path::Path, process::Command};

use log::{debug, info};

use crate::{config::PrunerKind, error::PruneError};

/// Removes unused references from a Python file in place
pub trait ReferencePruner: std::fmt::Debug {
    fn name(&self) -> &str;

    /// Prune `path`, which must already exist
    fn prune(&self, path: &Path) -> Result<(), PruneError>;
}

/// Runs an external program with fixed arguments followed by the target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPruner {
    program: String,
    args: Vec<String>,
}

impl CommandPruner {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn autoflake() -> Self {
        Self::new(
            "autoflake",
            [
                "--in-place",
                "--remove-unused-variables",
                "--remove-all-unused-imports",
                "--expand-star-imports",
            ],
        )
    }

    /// Ruff restricted to unused imports (F401) and unused locals (F841)
    ///
    /// Ruff has no fix that expands `from m import *`, so wildcard imports
    /// survive this pruner untouched. Only `autoflake()` expands them.
    pub fn ruff() -> Self {
        Self::new(
            "ruff",
            [
                "check",
                "--isolated",
                "--no-cache",
                "--select",
                "F401,F841",
                "--fix",
                "--unsafe-fixes",
                "--exit-zero",
                "--quiet",
            ],
        )
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl ReferencePruner for CommandPruner {
    fn name(&self) -> &str {
        &self.program
    }

    fn prune(&self, path: &Path) -> Result<(), PruneError> {
        if !path.is_file() {
            return Err(PruneError::FileNotFound(path.to_path_buf()));
        }

        debug!("Running {} {} {}", self.program, self.args.join(" "), path.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|source| PruneError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PruneError::Failed {
                program: self.program.clone(),
                path: path.to_path_buf(),
                status,
            });
        }

        info!("Removed unused references from {}", path.display());
        Ok(())
    }
}

/// Leaves the file untouched
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoopPruner;

impl ReferencePruner for NoopPruner {
    fn name(&self) -> &str {
        "none"
    }

    fn prune(&self, path: &Path) -> Result<(), PruneError> {
        if !path.is_file() {
            return Err(PruneError::FileNotFound(path.to_path_buf()));
        }
        debug!("Pruning disabled, leaving {} as written", path.display());
        Ok(())
    }
}

pub fn pruner_for(kind: PrunerKind) -> Box<dyn ReferencePruner> {
    match kind {
        PrunerKind::Autoflake => Box::new(CommandPruner::autoflake()),
        PrunerKind::Ruff => Box::new(CommandPruner::ruff()),
        PrunerKind::None => Box::new(NoopPruner),
    }
}
