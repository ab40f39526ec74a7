//! File-level operations: one call per command.
//!
//! Each operation reads the files it updates, renders the new content fully in
//! memory, and writes every file once.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use entigen_schema::{Schema, Table};
use tracing::{debug_span, info};

use crate::artifact::{create_artifact, read_artifact, remove_artifact, update_artifact};
use crate::error::{Error, Result};
use crate::layout::ModelLayout;
use crate::plan::plan_schema;
use crate::scaffold::{
    BaseClasses, conventions_file, entity_file, mapper_file, repository_file, service_file,
};
use crate::sync::{EntityChange, ReferenceRemoval, RegistryChange, SyncReport, Synchronizer};

/// Knobs that are not part of the layout.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Also scaffold a conventions class for new models.
    pub with_conventions: bool,
    pub bases: BaseClasses,
    pub removal: ReferenceRemoval,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Unchanged,
    Removed,
    /// Removal target did not exist.
    Absent,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Unchanged => "unchanged",
            Action::Removed => "removed",
            Action::Absent => "absent",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub path: Utf8PathBuf,
    pub action: Action,
}

impl Outcome {
    fn new(path: impl Into<Utf8PathBuf>, action: Action) -> Self {
        Self {
            path: path.into(),
            action,
        }
    }

    fn written(path: impl Into<Utf8PathBuf>, written: bool) -> Self {
        let action = if written {
            Action::Updated
        } else {
            Action::Unchanged
        };
        Self::new(path, action)
    }
}

/// Runs scaffolding and synchronization against the files of one application.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    layout: ModelLayout,
    settings: Settings,
}

impl Generator {
    pub fn new(layout: ModelLayout, settings: Settings) -> Self {
        Self { layout, settings }
    }

    pub fn layout(&self) -> &ModelLayout {
        &self.layout
    }

    fn synchronizer(&self) -> Synchronizer {
        Synchronizer::new(self.layout.clone()).with_removal(self.settings.removal)
    }

    /// Scaffold a model and register its repository.
    ///
    /// Fails before writing anything when the registry is missing or one of
    /// the model files already exists.
    pub fn create_model(&self, name: &str) -> Result<Vec<Outcome>> {
        let _span = debug_span!("create_model", model = name).entered();
        let registry = self.layout.registry_path();
        read_artifact(&registry)?;

        let bases = &self.settings.bases;
        let mut files = vec![
            (
                self.layout.entity_path(name),
                entity_file(name, &self.layout, bases).print(),
            ),
            (
                self.layout.mapper_path(name),
                mapper_file(name, &self.layout, bases, self.settings.with_conventions).print(),
            ),
            (
                self.layout.repository_path(name),
                repository_file(name, &self.layout, bases).print(),
            ),
        ];
        if self.settings.with_conventions {
            files.push((
                self.layout.conventions_path(name),
                conventions_file(name, &self.layout).print(),
            ));
        }
        if let Some((path, _)) = files.iter().find(|(path, _)| path.exists()) {
            return Err(Error::AlreadyExists { path: path.clone() });
        }

        let mut outcomes = Vec::with_capacity(files.len() + 1);
        for (path, contents) in files {
            create_artifact(&path, &contents)?;
            outcomes.push(Outcome::new(path, Action::Created));
        }
        outcomes.push(self.update_registry(&registry, RegistryChange::Add(name))?);
        Ok(outcomes)
    }

    /// Delete a model directory and unregister its repository.
    pub fn remove_model(&self, name: &str) -> Result<Vec<Outcome>> {
        let _span = debug_span!("remove_model", model = name).entered();
        let registry = self.layout.registry_path();
        read_artifact(&registry)?;

        let dir = self.layout.model_dir(name);
        let action = if remove_artifact(&dir)? {
            Action::Removed
        } else {
            Action::Absent
        };
        let registry_outcome = self.update_registry(&registry, RegistryChange::Remove(name))?;
        Ok(vec![Outcome::new(dir, action), registry_outcome])
    }

    fn update_registry(&self, path: &Utf8Path, change: RegistryChange<'_>) -> Result<Outcome> {
        let sync = self.synchronizer();
        let mut report = SyncReport::default();
        let written = update_artifact(path, |text| {
            let (updated, r) = sync.update_registry(text, &change)?;
            report = r;
            Ok(updated)
        })?;
        log_report(path, &report);
        Ok(Outcome::written(path, written))
    }

    /// Apply one change to an entity file.
    pub fn update_entity(&self, entity: &str, change: &EntityChange<'_>) -> Result<Outcome> {
        let path = self.layout.entity_path(entity);
        let _span = debug_span!("update_entity", %path).entered();
        let sync = self.synchronizer();
        let mut report = SyncReport::default();
        let written = update_artifact(&path, |text| {
            let (updated, r) = sync.update_entity(text, change)?;
            report = r;
            Ok(updated)
        })?;
        log_report(&path, &report);
        Ok(Outcome::written(path, written))
    }

    /// Merge every column of `table` into its entity.
    pub fn sync_table(&self, table: &Table) -> Result<Outcome> {
        self.update_entity(&table.entity_name(), &EntityChange::Columns(table))
    }

    /// Merge one column of `table` into its entity.
    pub fn add_column(&self, table: &Table, column: &str) -> Result<Outcome> {
        let column = table.column(column).ok_or_else(|| Error::UnknownColumn {
            table: table.name.clone(),
            column: column.to_string(),
        })?;
        self.update_entity(&table.entity_name(), &EntityChange::Column { table, column })
    }

    /// Add the collection side of `table.fk_column` on the referenced entity.
    pub fn one_to_many(&self, table: &Table, fk_column: &str) -> Result<Outcome> {
        let foreign = table
            .foreign(fk_column)
            .ok_or_else(|| Error::UnknownForeignKey {
                table: table.name.clone(),
                column: fk_column.to_string(),
            })?;
        self.update_entity(
            &foreign.target_entity(),
            &EntityChange::OneToMany {
                source: table,
                foreign,
            },
        )
    }

    /// Add the many-to-many properties of a junction table on both linked
    /// entities. `main` names the key column whose entity owns the join and
    /// defaults to the one declared on the table.
    pub fn many_to_many(&self, junction: &Table, main: Option<&str>) -> Result<Vec<Outcome>> {
        let keys: Vec<_> = junction.foreign_keys.values().collect();
        let [first, second] = keys.as_slice() else {
            return Err(Error::NotAJunction {
                table: junction.name.clone(),
                count: keys.len(),
            });
        };
        let main = main.or_else(|| junction.junction.as_ref().and_then(|j| j.main.as_deref()));

        let mut outcomes = Vec::with_capacity(2);
        for (from, to) in [(*first, *second), (*second, *first)] {
            let change = EntityChange::ManyToMany {
                from,
                to,
                is_main: main == Some(from.key_column.as_str()),
            };
            outcomes.push(self.update_entity(&from.target_entity(), &change)?);
        }
        Ok(outcomes)
    }

    /// Re-sort an entity block without adding anything.
    pub fn sort_entity(&self, entity: &str) -> Result<Outcome> {
        self.update_entity(entity, &EntityChange::Sort)
    }

    /// Apply every change `schema` implies, in schema order.
    pub fn sync_schema(&self, schema: &Schema) -> Result<Vec<Outcome>> {
        let _span = debug_span!("sync_schema", tables = schema.tables.len()).entered();
        plan_schema(schema)
            .iter()
            .map(|planned| self.update_entity(&planned.entity, &planned.change))
            .collect()
    }

    /// Scaffold a service class.
    pub fn create_service(&self, name: &str) -> Result<Outcome> {
        let path = self.layout.service_path(name);
        create_artifact(&path, &service_file(name, &self.layout).print())?;
        Ok(Outcome::new(path, Action::Created))
    }

    pub fn remove_service(&self, name: &str) -> Result<Outcome> {
        let path = self.layout.service_path(name);
        let action = if remove_artifact(&path)? {
            Action::Removed
        } else {
            Action::Absent
        };
        Ok(Outcome::new(path, action))
    }
}

/// Look up a table by name.
pub fn find_table<'s>(schema: &'s Schema, name: &str) -> Result<&'s Table> {
    schema.get_table(name).ok_or_else(|| Error::UnknownTable {
        table: name.to_string(),
    })
}

fn log_report(path: &Utf8Path, report: &SyncReport) {
    for line in &report.added_lines {
        info!(%path, %line, "added");
    }
    for line in &report.removed_lines {
        info!(%path, %line, "removed");
    }
    for reference in &report.added_references {
        info!(%path, %reference, "imported");
    }
    for reference in &report.removed_references {
        info!(%path, %reference, "dropped import");
    }
}

