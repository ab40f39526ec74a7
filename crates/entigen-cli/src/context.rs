//! Configuration file and command-line flags merged into what the commands
//! run against.

use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use clap::Args;
use entigen::{BaseClasses, Generator, ModelLayout, Reference, ReferenceRemoval, Settings};
use entigen_config::{ConfigError, DEFAULT_SCHEMA_FILE, LoadedConfig};
use entigen_schema::Schema;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Entigen(#[from] entigen::Error),

    #[error("reference-removal in {}: {message}", .path.display())]
    Removal { path: PathBuf, message: String },

    #[error("{} is not a UTF-8 path", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("cannot determine the working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

/// Flags shared by every subcommand. Each one overrides the configuration file.
#[derive(Args, Debug, Default)]
pub struct Options {
    /// Root namespace of the application
    #[arg(long, global = true)]
    pub app_namespace: Option<String>,

    /// Root source directory
    #[arg(long, global = true)]
    pub app_dir: Option<Utf8PathBuf>,

    /// Module generated classes belong to
    #[arg(long, global = true)]
    pub module: Option<String>,

    /// Schema definition file
    #[arg(long, global = true)]
    pub schema: Option<Utf8PathBuf>,

    /// What to do with a registry import still mentioned after its entry is
    /// removed: `drop` or `retain-if-used`
    #[arg(long, global = true)]
    pub reference_removal: Option<ReferenceRemoval>,
}

/// Resolved layout, settings and schema location.
#[derive(Debug)]
pub struct Context {
    pub layout: ModelLayout,
    pub settings: Settings,
    pub schema_path: Utf8PathBuf,
}

impl Context {
    /// Load `.config/entigen.styx` from the working directory upwards and
    /// apply `options` on top of it.
    pub fn load(options: &Options) -> Result<Self, CliError> {
        let cwd = std::env::current_dir().map_err(CliError::WorkingDir)?;
        let loaded = entigen_config::load_from(&cwd)?;
        Self::resolve(options, loaded, &cwd)
    }

    /// Paths from the configuration file are relative to the project root,
    /// paths from flags to `cwd`.
    pub fn resolve(
        options: &Options,
        loaded: LoadedConfig,
        cwd: &Path,
    ) -> Result<Self, CliError> {
        let root = utf8(loaded.project_root(cwd))?;
        let cwd = utf8(cwd.to_path_buf())?;
        if let Some(path) = &loaded.path {
            debug!(config = %path.display(), %root, "loaded configuration");
        }
        let config = loaded.config;

        let app_dir = match &options.app_dir {
            Some(dir) => cwd.join(dir),
            None => root.join(config.app_dir.as_deref().unwrap_or("app")),
        };
        let app_namespace = options
            .app_namespace
            .clone()
            .or(config.app_namespace)
            .unwrap_or_else(|| "App".to_string());
        let module = options.module.clone().or(config.module);
        let layout = ModelLayout::new(app_namespace, app_dir).with_module(module);

        let schema_path = match &options.schema {
            Some(path) => cwd.join(path),
            None => root.join(config.schema.as_deref().unwrap_or(DEFAULT_SCHEMA_FILE)),
        };

        let removal = match (options.reference_removal, config.reference_removal) {
            (Some(removal), _) => removal,
            (None, Some(value)) => value.parse().map_err(|message| CliError::Removal {
                path: loaded.path.clone().unwrap_or_default(),
                message,
            })?,
            (None, None) => ReferenceRemoval::default(),
        };

        let mut bases = BaseClasses::default();
        if let Some(entity) = config.base_entity {
            bases.entity = Reference::new(entity);
        }
        if let Some(mapper) = config.base_mapper {
            bases.mapper = Reference::new(mapper);
        }
        if let Some(repository) = config.base_repository {
            bases.repository = Reference::new(repository);
        }

        Ok(Self {
            layout,
            settings: Settings {
                with_conventions: config.with_conventions.unwrap_or(false),
                bases,
                removal,
            },
            schema_path,
        })
    }

    pub fn generator(&self) -> Generator {
        Generator::new(self.layout.clone(), self.settings.clone())
    }

    pub fn load_schema(&self) -> Result<Schema, CliError> {
        Ok(entigen_config::load_schema(self.schema_path.as_std_path())?)
    }
}

fn utf8(path: PathBuf) -> Result<Utf8PathBuf, CliError> {
    Utf8PathBuf::from_path_buf(path).map_err(CliError::NonUtf8Path)
}
