use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{LevelFilter, error, info};

use pyflat::{
    BundleError, Bundler,
    config::{Config, PrunerKind},
};

#[derive(Parser, Debug)]
#[command(
    name = "pyflat",
    version,
    about = "Flatten a multi-module Python program into a single script"
)]
struct Cli {
    /// Entry Python file
    #[arg(short, long)]
    entry: PathBuf,

    /// Output file for the flattened script
    #[arg(short, long)]
    output: PathBuf,

    /// Files whose definitions are emitted first, relative to the project root
    #[arg(long, num_args = 0..)]
    preload: Option<Vec<PathBuf>>,

    /// Imported name that suppresses an external `from` import
    #[arg(long = "ignore-import", num_args = 0..)]
    ignore_imports: Option<Vec<String>>,

    /// Directory that bounds local module resolution
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File copied verbatim after the import block
    #[arg(long)]
    preamble_file: Option<PathBuf>,

    /// Tool that removes unused references from the output
    #[arg(long, value_enum)]
    pruner: Option<PrunerKind>,

    /// Skip pruning
    #[arg(long, conflicts_with = "pruner")]
    no_prune: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) -> Result<()> {
        if let Some(preload) = &self.preload {
            config.preload.clone_from(preload);
        }
        if let Some(ignored) = &self.ignore_imports {
            config.ignore_imports.clone_from(ignored);
        }
        if let Some(root) = &self.project_root {
            config.project_root = Some(root.clone());
        }
        if let Some(path) = &self.preamble_file {
            let preamble = fs::read_to_string(path)
                .with_context(|| format!("failed to read preamble file {}", path.display()))?;
            config.preamble = Some(preamble);
        }
        if let Some(pruner) = self.pruner {
            config.pruner = pruner;
        }
        if self.no_prune {
            config.pruner = PrunerKind::None;
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<BundleError>() {
            Some(bundle_error) if bundle_error.is_configuration_error() => {
                error!("{bundle_error}");
                ExitCode::SUCCESS
            }
            _ => {
                error!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config)?;

    let summary = Bundler::new(config).bundle(&cli.entry, &cli.output)?;
    info!(
        "Bundled {} modules: {} definitions emitted, {} modules left out",
        summary.modules,
        summary.definitions.len(),
        summary.skipped_modules.len()
    );
    Ok(())
}
