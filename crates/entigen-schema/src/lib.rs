//! Relational schema descriptors for entigen.
//!
//! These types describe tables, columns and foreign keys as handed over by a
//! schema definition loader. Everything downstream (the annotation formatter,
//! the synchronizer) only ever reads them.
//!
//! # Naming Convention
//!
//! Table and column names are snake_case (`article_tag`, `author_id`). Entity
//! names are derived from them with [`entity_name`] (`ArticleTag`), property
//! names with [`property_name`] (`author`).

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while building schema descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown column type '{0}'")]
    UnknownColumnType(String),
}

/// Database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// INTEGER
    Integer,
    /// BIGINT
    BigInt,
    /// REAL / DOUBLE PRECISION
    Float,
    /// NUMERIC
    Decimal,
    /// VARCHAR
    String,
    /// TEXT
    Text,
    /// BOOLEAN
    Boolean,
    /// DATE
    Date,
    /// DATETIME / TIMESTAMP
    Datetime,
    /// JSON
    Json,
}

impl ColumnType {
    /// Map this column type to the scalar type used in entity annotations.
    pub fn to_php_type(&self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::BigInt => "int",
            ColumnType::Float | ColumnType::Decimal => "float",
            ColumnType::String | ColumnType::Text => "string",
            ColumnType::Boolean => "bool",
            ColumnType::Date | ColumnType::Datetime => "DateTimeImmutable",
            ColumnType::Json => "array",
        }
    }

    /// Whether values of this type are represented as date/time objects.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Datetime)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Datetime => "datetime",
            ColumnType::Json => "json",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "smallint" => Ok(ColumnType::Integer),
            "bigint" => Ok(ColumnType::BigInt),
            "float" | "double" | "real" => Ok(ColumnType::Float),
            "decimal" | "numeric" => Ok(ColumnType::Decimal),
            "string" | "varchar" => Ok(ColumnType::String),
            "text" => Ok(ColumnType::Text),
            "bool" | "boolean" => Ok(ColumnType::Boolean),
            "date" => Ok(ColumnType::Date),
            "datetime" | "timestamp" | "timestamptz" => Ok(ColumnType::Datetime),
            "json" | "jsonb" => Ok(ColumnType::Json),
            _ => Err(SchemaError::UnknownColumnType(s.to_string())),
        }
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Database type
    pub column_type: ColumnType,
    /// Whether the column allows NULL
    pub nullable: bool,
    /// Default value, rendered verbatim into annotations
    pub default: Option<String>,
}

impl Column {
    /// Create a NOT NULL column without a default.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
        }
    }

    /// Mark the column as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// The primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrimaryKey {
    /// Column names, in declaration order
    pub columns: Vec<String>,
}

impl PrimaryKey {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `column` is part of this key.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// A foreign key held by one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Foreign {
    /// Referenced table
    pub table: String,
    /// Local column holding the key
    pub key_column: String,
    /// Property name on the referenced entity pointing back at this one
    pub reverse_name: Option<String>,
    /// Ordering expression for the reverse collection
    pub reverse_order: Option<String>,
}

impl Foreign {
    pub fn new(table: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key_column: key_column.into(),
            reverse_name: None,
            reverse_order: None,
        }
    }

    pub fn with_reverse_name(mut self, name: impl Into<String>) -> Self {
        self.reverse_name = Some(name.into());
        self
    }

    pub fn with_reverse_order(mut self, order: impl Into<String>) -> Self {
        self.reverse_order = Some(order.into());
        self
    }

    /// Entity name of the referenced table.
    pub fn target_entity(&self) -> String {
        entity_name(&self.table)
    }

    /// Property name of the key column on the owning entity (`author_id` -> `author`).
    pub fn key_property(&self) -> String {
        property_name(&self.key_column, true)
    }
}

/// Junction metadata for a table that only links two other tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Junction {
    /// Foreign key column whose target owns the join
    pub main: Option<String>,
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Columns, in declaration order
    pub columns: Vec<Column>,
    /// Primary key
    pub primary_key: Option<PrimaryKey>,
    /// Foreign keys, indexed by local column name
    pub foreign_keys: IndexMap<String, Foreign>,
    /// Set when the table is a many-to-many junction
    pub junction: Option<Junction>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: IndexMap::new(),
            junction: None,
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_primary_key(mut self, primary_key: PrimaryKey) -> Self {
        self.primary_key = Some(primary_key);
        self
    }

    /// Register a foreign key; the key column is taken from `foreign`.
    pub fn with_foreign(mut self, foreign: Foreign) -> Self {
        self.foreign_keys.insert(foreign.key_column.clone(), foreign);
        self
    }

    pub fn with_junction(mut self, junction: Junction) -> Self {
        self.junction = Some(junction);
        self
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the foreign key held by a column.
    pub fn foreign(&self, column: &str) -> Option<&Foreign> {
        self.foreign_keys.get(column)
    }

    /// Whether `column` is part of the primary key.
    pub fn is_primary(&self, column: &str) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|pk| pk.contains(column))
    }

    /// Entity name for this table.
    pub fn entity_name(&self) -> String {
        entity_name(&self.name)
    }
}

/// A complete schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Tables in the schema, indexed by name
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Iterate over all tables.
    pub fn iter_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}

// =============================================================================
// Naming helpers
// =============================================================================

/// Lower-camel-case a snake_case identifier (`created_at` -> `createdAt`).
///
/// Only the first character of each segment is touched, so `api_URL` becomes
/// `apiURL`.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('_').enumerate() {
        if i == 0 {
            out.push_str(segment);
        } else {
            out.push_str(&ucfirst(segment));
        }
    }
    lcfirst(&out)
}

/// PascalCase entity name for a table (`article_tag` -> `ArticleTag`).
pub fn entity_name(table: &str) -> String {
    ucfirst(&camelize(table))
}

/// Property name for a column; foreign key columns lose their `_id` suffix.
pub fn property_name(column: &str, is_foreign: bool) -> String {
    let base = if is_foreign {
        column.strip_suffix("_id").unwrap_or(column)
    } else {
        column
    };
    camelize(base)
}

/// snake_case a PascalCase name (`ArticleTag` -> `article_tag`).
pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_is_word = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && prev_is_word {
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
        prev_is_word = ch.is_ascii_alphanumeric() || ch == '_';
    }
    out
}

/// Uppercase the first character.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character.
pub fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
