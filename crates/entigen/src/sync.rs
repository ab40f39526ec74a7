//! Applying one schema change to one source document.
//!
//! Every operation is a single pass over a freshly parsed document: load the
//! managed block into a catalog, merge the candidate lines, render the block
//! back and import what the new lines need. Nothing is kept between calls; the
//! file is the only state.

use std::fmt;
use std::str::FromStr;

use entigen_schema::{Column, Foreign, Table};
use tracing::{debug, debug_span, warn};

use crate::annotation::format::{
    Candidate, column_property, many_to_many_property, one_to_many_property, repository_property,
};
use crate::annotation::{EntityCatalog, Reference, RegistryCatalog};
use crate::error::Result;
use crate::layout::ModelLayout;
use crate::source::{PhpDocument, SourceDocument};

/// What to do with a registry import whose line was removed while another
/// remaining line still mentions the imported class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceRemoval {
    /// Remove the import anyway, logging a warning.
    #[default]
    Drop,
    /// Keep the import.
    RetainIfUsed,
}

impl ReferenceRemoval {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceRemoval::Drop => "drop",
            ReferenceRemoval::RetainIfUsed => "retain-if-used",
        }
    }
}

impl fmt::Display for ReferenceRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceRemoval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "drop" => Ok(ReferenceRemoval::Drop),
            "retain-if-used" => Ok(ReferenceRemoval::RetainIfUsed),
            other => Err(format!(
                "unknown reference removal policy `{other}` (expected `drop` or `retain-if-used`)"
            )),
        }
    }
}

/// A schema fact to merge into an entity's property block.
#[derive(Debug, Clone, Copy)]
pub enum EntityChange<'a> {
    /// Every column of the table.
    Columns(&'a Table),
    /// One column of the table.
    Column { table: &'a Table, column: &'a Column },
    /// The collection side of a foreign key held by `source`.
    OneToMany { source: &'a Table, foreign: &'a Foreign },
    /// One side of a junction table; see [`many_to_many_property`].
    ManyToMany {
        from: &'a Foreign,
        to: &'a Foreign,
        is_main: bool,
    },
    /// No new facts, canonical re-ordering only.
    Sort,
}

/// A change to the repository registry.
#[derive(Debug, Clone, Copy)]
pub enum RegistryChange<'a> {
    Add(&'a str),
    Remove(&'a str),
}

/// What one synchronization did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added_lines: Vec<String>,
    pub removed_lines: Vec<String>,
    pub added_references: Vec<Reference>,
    pub removed_references: Vec<Reference>,
    /// Imports kept because a remaining line still mentions them.
    pub retained_references: Vec<Reference>,
    /// Whether the document differs from its parsed state.
    pub changed: bool,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        !self.changed
    }
}

/// Applies schema changes to entity and registry documents.
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    pub layout: ModelLayout,
    pub removal: ReferenceRemoval,
}

impl Synchronizer {
    pub fn new(layout: ModelLayout) -> Self {
        Self {
            layout,
            removal: ReferenceRemoval::default(),
        }
    }

    pub fn with_removal(mut self, removal: ReferenceRemoval) -> Self {
        self.removal = removal;
        self
    }

    /// Lines (and their imports) a change contributes, in schema order.
    pub fn candidates(&self, change: &EntityChange<'_>) -> Vec<Candidate> {
        match *change {
            EntityChange::Columns(table) => table
                .columns
                .iter()
                .map(|column| column_property(table, column, &self.layout))
                .collect(),
            EntityChange::Column { table, column } => {
                vec![column_property(table, column, &self.layout)]
            }
            EntityChange::OneToMany { source, foreign } => {
                vec![one_to_many_property(source, foreign, &self.layout)]
            }
            EntityChange::ManyToMany { from, to, is_main } => {
                vec![many_to_many_property(from, to, is_main, &self.layout)]
            }
            EntityChange::Sort => Vec::new(),
        }
    }

    /// Merge `change` into the entity property block of `doc`.
    pub fn apply_entity<D: SourceDocument>(
        &self,
        doc: &mut D,
        change: &EntityChange<'_>,
    ) -> SyncReport {
        let span = debug_span!("sync_entity", namespace = doc.namespace());
        let _guard = span.enter();

        let before = doc.comment_lines();
        let mut catalog = EntityCatalog::load(&before);
        let mut report = SyncReport::default();

        for candidate in self.candidates(change) {
            let text = candidate.entry.text().to_string();
            if catalog.add_if_absent(candidate.entry) {
                debug!(line = %text, "adding annotation");
                report.added_lines.push(text);
            } else {
                debug!(line = %text, "annotation already present");
            }
            // Imports are restored even for lines that were already present.
            for reference in candidate.references {
                if doc.add_reference(&reference) {
                    debug!(%reference, "adding import");
                    report.added_references.push(reference);
                }
            }
        }

        let rendered = catalog.render();
        report.changed = rendered != before || !report.added_references.is_empty();
        doc.set_comment_lines(rendered);
        report
    }

    /// Add or remove a model's repository line in the registry document.
    pub fn apply_registry<D: SourceDocument>(
        &self,
        doc: &mut D,
        change: &RegistryChange<'_>,
    ) -> SyncReport {
        let span = debug_span!("sync_registry", namespace = doc.namespace());
        let _guard = span.enter();

        let before = doc.comment_lines();
        let mut catalog = RegistryCatalog::load(&before);
        let mut report = SyncReport::default();

        match *change {
            RegistryChange::Add(model) => {
                let Candidate { entry, references } = repository_property(model, &self.layout);
                let text = entry.text().to_string();
                if catalog.add_if_absent(entry) {
                    debug!(line = %text, "adding repository");
                    report.added_lines.push(text);
                    for reference in references {
                        if doc.add_reference(&reference) {
                            report.added_references.push(reference);
                        }
                    }
                } else {
                    debug!(line = %text, "repository already registered");
                }
            }
            RegistryChange::Remove(model) => {
                let Candidate { entry, references } = repository_property(model, &self.layout);
                if catalog.remove(entry.text()) {
                    debug!(line = %entry, "removing repository");
                    report.removed_lines.push(entry.text().to_string());
                    for reference in references {
                        self.release_reference(doc, &catalog, reference, &mut report);
                    }
                } else {
                    debug!(line = %entry, "repository not registered");
                }
            }
        }

        let rendered = catalog.render();
        report.changed = rendered != before
            || !report.added_references.is_empty()
            || !report.removed_references.is_empty();
        doc.set_comment_lines(rendered);
        report
    }

    /// Drop the import of a removed line, subject to the removal policy.
    fn release_reference<D: SourceDocument>(
        &self,
        doc: &mut D,
        remaining: &RegistryCatalog,
        reference: Reference,
        report: &mut SyncReport,
    ) {
        let still_used = remaining
            .iter()
            .any(|entry| mentions(entry.text(), reference.short_name()));

        if still_used {
            match self.removal {
                ReferenceRemoval::Drop => {
                    warn!(
                        %reference,
                        "removing import still mentioned by a remaining registry line"
                    );
                }
                ReferenceRemoval::RetainIfUsed => {
                    debug!(%reference, "keeping import still in use");
                    report.retained_references.push(reference);
                    return;
                }
            }
        }

        if doc.remove_reference(&reference) {
            report.removed_references.push(reference);
        }
    }

    /// Parse `text`, apply `change` to its entity block, print it back.
    pub fn update_entity(&self, text: &str, change: &EntityChange<'_>) -> Result<(String, SyncReport)> {
        let mut doc = PhpDocument::parse(text)?;
        let report = self.apply_entity(&mut doc, change);
        Ok((doc.print(), report))
    }

    /// Parse `text`, apply `change` to its registry block, print it back.
    pub fn update_registry(
        &self,
        text: &str,
        change: &RegistryChange<'_>,
    ) -> Result<(String, SyncReport)> {
        let mut doc = PhpDocument::parse(text)?;
        let report = self.apply_registry(&mut doc, change);
        Ok((doc.print(), report))
    }
}

/// Whether `text` uses `name` as a bare class name: not as part of a longer
/// identifier, not fully qualified and not as a `$variable`.
fn mentions(text: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    text.match_indices(name).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + name.len()..].chars().next();
        !before.is_some_and(|c| is_ident(c) || c == '\\' || c == '$')
            && !after.is_some_and(is_ident)
    })
}

#[cfg(test)]
mod tests;
