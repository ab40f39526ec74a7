//! Facet types for the entigen configuration and schema definition files.
//!
//! Two styx documents are read:
//!
//! - `.config/entigen.styx`, found in the working directory or any parent,
//!   describing where the application lives ([`Config`]);
//! - the schema definition it points at (`schema.styx` by default), listing
//!   tables, columns and foreign keys ([`SchemaFile`]).
//!
//! ```styx
//! article {
//!     columns {
//!         id {type integer}
//!         title {type string}
//!         author_id {type integer, nullable true}
//!     }
//!     primary-key (id)
//!     foreign-keys {
//!         author_id {table user, reverse-name articles}
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use entigen_schema::{Column, ColumnType, Foreign, Junction, PrimaryKey, Schema, SchemaError, Table};
use facet::Facet;
use indexmap::IndexMap;
use thiserror::Error;

/// Location of the configuration file relative to a project root.
pub const CONFIG_FILE: &str = ".config/entigen.styx";

/// Default schema definition path, relative to the project root.
pub const DEFAULT_SCHEMA_FILE: &str = "schema.styx";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("column {table}.{column}: {source}")]
    Column {
        table: String,
        column: String,
        #[source]
        source: SchemaError,
    },
}

/// `.config/entigen.styx`. Every key is optional; command-line flags win over
/// what is set here.
#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "kebab-case")]
pub struct Config {
    /// Root namespace of the application (`App`).
    pub app_namespace: Option<String>,

    /// Root source directory, relative to the project root (`app`).
    pub app_dir: Option<String>,

    /// Module generated classes belong to.
    pub module: Option<String>,

    /// Schema definition file, relative to the project root.
    pub schema: Option<String>,

    /// `drop` or `retain-if-used`.
    pub reference_removal: Option<String>,

    /// Scaffold a conventions class with every new model.
    pub with_conventions: Option<bool>,

    pub base_entity: Option<String>,
    pub base_mapper: Option<String>,
    pub base_repository: Option<String>,
}

/// A loaded configuration and where it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// The file read, `None` when no configuration file exists.
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory relative paths in the configuration are resolved against:
    /// the directory holding `.config/`, or `fallback` without a file.
    pub fn project_root(&self, fallback: &Path) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

/// Load configuration, searching upwards from the current directory.
pub fn load() -> Result<LoadedConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    load_from(&cwd)
}

/// Load configuration, searching upwards from `start`. No file means defaults.
pub fn load_from(start: &Path) -> Result<LoadedConfig, ConfigError> {
    let Some(path) = find_config_file(start) else {
        return Ok(LoadedConfig::default());
    };
    let content = read(&path)?;
    let config: Config = facet_styx::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        message: e.to_string(),
    })?;
    Ok(LoadedConfig {
        config,
        path: Some(path),
    })
}

/// Find `.config/entigen.styx` in `start` or the closest parent holding one.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A schema definition file: table name to table definition.
#[derive(Debug, Clone, Default, Facet)]
#[facet(transparent)]
pub struct SchemaFile(pub IndexMap<String, TableDef>);

#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "kebab-case")]
pub struct TableDef {
    /// Column name to column definition, in declaration order.
    pub columns: IndexMap<String, ColumnDef>,

    pub primary_key: Option<Vec<String>>,

    /// Key column name to the table it references.
    pub foreign_keys: Option<IndexMap<String, ForeignDef>>,

    /// Marks a many-to-many junction table.
    pub junction: Option<bool>,

    /// Junction key column whose entity owns the join.
    pub main: Option<String>,
}

#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "kebab-case")]
pub struct ColumnDef {
    #[facet(rename = "type")]
    pub column_type: String,

    pub nullable: Option<bool>,

    /// Default value, rendered verbatim.
    pub default: Option<String>,
}

#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "kebab-case")]
pub struct ForeignDef {
    /// Referenced table.
    pub table: String,

    /// Property on the referenced entity pointing back.
    pub reverse_name: Option<String>,

    /// Ordering of the reverse collection.
    pub reverse_order: Option<String>,
}

impl SchemaFile {
    /// Build schema descriptors. Tables and columns keep file order.
    pub fn into_schema(self) -> Result<Schema, ConfigError> {
        let mut schema = Schema::new();
        for (name, def) in self.0 {
            schema.add_table(def.into_table(name)?);
        }
        Ok(schema)
    }
}

impl TableDef {
    fn into_table(self, name: String) -> Result<Table, ConfigError> {
        let mut table = Table::new(name);
        for (column_name, def) in self.columns {
            let column_type: ColumnType =
                def.column_type
                    .parse()
                    .map_err(|source| ConfigError::Column {
                        table: table.name.clone(),
                        column: column_name.clone(),
                        source,
                    })?;
            let mut column = Column::new(column_name, column_type);
            if def.nullable.unwrap_or(false) {
                column = column.nullable();
            }
            if let Some(default) = def.default {
                column = column.with_default(default);
            }
            table = table.with_column(column);
        }
        if let Some(columns) = self.primary_key {
            table = table.with_primary_key(PrimaryKey::new(columns));
        }
        for (key_column, def) in self.foreign_keys.unwrap_or_default() {
            let mut foreign = Foreign::new(def.table, key_column);
            if let Some(name) = def.reverse_name {
                foreign = foreign.with_reverse_name(name);
            }
            if let Some(order) = def.reverse_order {
                foreign = foreign.with_reverse_order(order);
            }
            table = table.with_foreign(foreign);
        }
        if self.junction.unwrap_or(false) {
            table = table.with_junction(Junction { main: self.main });
        }
        Ok(table)
    }
}

/// Read and convert a schema definition file.
pub fn load_schema(path: &Path) -> Result<Schema, ConfigError> {
    let content = read(path)?;
    let file: SchemaFile = facet_styx::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    file.into_schema()
}
