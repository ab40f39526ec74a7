//! The in-memory set of annotation lines of one doc block.
//!
//! A catalog is rebuilt from the file on every synchronization: loaded from the
//! current comment lines, given at most a handful of new entries, then rendered
//! back in full. Both flavors share the merge engine and only differ in how
//! [`Grouping::arrange`] lays the lines out:
//!
//! - [`Categorized`] (entity property blocks): one group per [`Category`], in
//!   category order, sorted within the group, groups separated by one blank
//!   line.
//! - [`Flat`] (the repository registry): every line sorted together, no
//!   separators. Only this flavor supports [`AnnotationCatalog::remove`].

use std::collections::HashSet;
use std::marker::PhantomData;

use super::{AnnotationEntry, Category, byte_order};

/// Layout strategy of a rendered catalog.
pub trait Grouping {
    /// Lay out `entries` as block lines; an empty string is a blank separator.
    fn arrange(entries: &[AnnotationEntry]) -> Vec<String>;
}

/// Category-then-alphabetical layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Categorized;

/// Alphabetical layout, categories ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flat;

impl Grouping for Categorized {
    fn arrange(entries: &[AnnotationEntry]) -> Vec<String> {
        let mut lines = Vec::with_capacity(entries.len() + Category::ALL.len());
        for category in Category::ALL {
            let mut group: Vec<&str> = entries
                .iter()
                .filter(|e| e.category() == category)
                .map(AnnotationEntry::text)
                .collect();
            if group.is_empty() {
                continue;
            }
            group.sort_by(|a, b| byte_order(a, b));
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(group.into_iter().map(str::to_string));
        }
        lines
    }
}

impl Grouping for Flat {
    fn arrange(entries: &[AnnotationEntry]) -> Vec<String> {
        let mut lines: Vec<&str> = entries.iter().map(AnnotationEntry::text).collect();
        lines.sort_by(|a, b| byte_order(a, b));
        lines.into_iter().map(str::to_string).collect()
    }
}

/// Catalog of entity property lines.
pub type EntityCatalog = AnnotationCatalog<Categorized>;

/// Catalog of repository registry lines.
pub type RegistryCatalog = AnnotationCatalog<Flat>;

/// A duplicate-free collection of annotation lines.
#[derive(Debug, Clone)]
pub struct AnnotationCatalog<G: Grouping> {
    entries: Vec<AnnotationEntry>,
    seen: HashSet<String>,
    _grouping: PhantomData<G>,
}

impl<G: Grouping> Default for AnnotationCatalog<G> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            _grouping: PhantomData,
        }
    }
}

impl<G: Grouping> AnnotationCatalog<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load existing block lines. Blank lines are dropped, trailing whitespace
    /// is trimmed, repeated lines are kept once. Nothing is classified yet.
    pub fn load<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for line in lines {
            catalog.add_if_absent(AnnotationEntry::untagged(line.as_ref()));
        }
        catalog
    }

    /// Load from raw block text, one line per entry.
    pub fn from_text(text: &str) -> Self {
        Self::load(text.lines())
    }

    /// Whether a line with exactly this text is present.
    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains(text)
    }

    /// Add `entry` unless a line with identical text is already present.
    ///
    /// Trailing whitespace is trimmed first and blank text is never added, so
    /// an entry compares equal to itself after a render and reload. Beyond
    /// that, comparison is exact: two differently worded lines describing the
    /// same fact are distinct entries. Returns whether the entry was added.
    pub fn add_if_absent(&mut self, mut entry: AnnotationEntry) -> bool {
        let len = entry.text.trim_end().len();
        entry.text.truncate(len);
        if entry.text.trim_start().is_empty() {
            return false;
        }
        if self.seen.contains(entry.text()) {
            return false;
        }
        self.seen.insert(entry.text().to_string());
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationEntry> {
        self.entries.iter()
    }

    /// Render the block lines in canonical order.
    pub fn render(&self) -> Vec<String> {
        G::arrange(&self.entries)
    }

    /// Render the block as newline-joined text.
    pub fn render_text(&self) -> String {
        self.render().join("\n")
    }
}

impl AnnotationCatalog<Flat> {
    /// Remove the line with exactly this text. Returns whether it was present.
    pub fn remove(&mut self, text: &str) -> bool {
        if !self.seen.remove(text) {
            return false;
        }
        self.entries.retain(|e| e.text() != text);
        true
    }
}
