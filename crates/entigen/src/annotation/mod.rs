//! Entity annotation lines.
//!
//! An entity class carries a machine-maintained doc block listing its
//! properties, one per line:
//!
//! ```text
//! @property int $id {primary}
//!
//! @property string $title
//!
//! @property User $author {m:1 User::$articles}
//! ```
//!
//! Each line belongs to exactly one [`Category`]. Lines built by the
//! [`format`] module carry their category from the start; lines read back from
//! an existing file are classified from their text with [`classify`], using the
//! ordered [`MARKERS`] table.

use std::cmp::Ordering;
use std::fmt;

pub mod catalog;
pub mod format;

pub use catalog::{AnnotationCatalog, Categorized, EntityCatalog, Flat, Grouping, RegistryCatalog};
pub use format::Candidate;

/// Leading marker of a property line.
pub const PROPERTY_MARKER: &str = "@property";

/// Marker of a property that is part of the primary key.
pub const PRIMARY_MARKER: &str = "{primary}";

/// Type marker of date/time properties.
pub const DATE_MARKER: &str = "DateTimeImmutable";

/// Relationship markers, as they appear inside the `{...}` modifier.
pub const MANY_TO_ONE_MARKER: &str = "m:1";
pub const ONE_TO_MANY_MARKER: &str = "1:m";
pub const MANY_TO_MANY_MARKER: &str = "m:m";

/// Classification of one annotation line.
///
/// The declaration order is the order of groups in a rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Primary,
    Simple,
    Date,
    ManyToOne,
    OneToMany,
    ManyToMany,
    Other,
}

impl Category {
    /// All categories, in rendering order.
    pub const ALL: [Category; 7] = [
        Category::Primary,
        Category::Simple,
        Category::Date,
        Category::ManyToOne,
        Category::OneToMany,
        Category::ManyToMany,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Primary => "primary",
            Category::Simple => "simple",
            Category::Date => "date",
            Category::ManyToOne => "manyToOne",
            Category::OneToMany => "oneToMany",
            Category::ManyToMany => "manyToMany",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a marker is looked up in a line.
#[derive(Debug, Clone, Copy)]
pub enum Marker {
    /// The marker appears anywhere in the line.
    Contains(&'static str),
    /// The line (ignoring leading whitespace) starts with the marker.
    StartsWith(&'static str),
}

impl Marker {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Marker::Contains(needle) => line.contains(needle),
            Marker::StartsWith(prefix) => line.trim_start().starts_with(prefix),
        }
    }
}

/// Classification markers, checked top to bottom. The first match wins; a line
/// matching none of them is [`Category::Other`].
pub const MARKERS: [(Marker, Category); 6] = [
    (Marker::Contains(PRIMARY_MARKER), Category::Primary),
    (Marker::Contains(DATE_MARKER), Category::Date),
    (Marker::Contains(MANY_TO_ONE_MARKER), Category::ManyToOne),
    (Marker::Contains(ONE_TO_MANY_MARKER), Category::OneToMany),
    (Marker::Contains(MANY_TO_MANY_MARKER), Category::ManyToMany),
    (Marker::StartsWith(PROPERTY_MARKER), Category::Simple),
];

/// Classify a line by its markers.
pub fn classify(line: &str) -> Category {
    MARKERS
        .iter()
        .find(|(marker, _)| marker.matches(line))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

/// Ordering used inside a group: plain byte-wise comparison, independent of
/// locale.
pub fn byte_order(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// One annotation line.
///
/// Equality and hashing only look at the text: two entries with the same text
/// are the same entry, whatever their tag.
#[derive(Debug, Clone, Eq)]
pub struct AnnotationEntry {
    text: String,
    tag: Option<Category>,
}

impl AnnotationEntry {
    /// An entry whose category is known up front.
    pub fn new(category: Category, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: Some(category),
        }
    }

    /// An entry read back from existing text; classified on demand.
    pub fn untagged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Category {
        self.tag.unwrap_or_else(|| classify(&self.text))
    }
}

impl PartialEq for AnnotationEntry {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl std::hash::Hash for AnnotationEntry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for AnnotationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A fully qualified class name imported by a source file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference(String);

impl Reference {
    /// Build a reference; a leading namespace separator is dropped.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim_start_matches('\\').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment (`App\Model\User\User` -> `User`).
    pub fn short_name(&self) -> &str {
        self.0.rsplit('\\').next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, empty for a global name.
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once('\\').map(|(ns, _)| ns).unwrap_or("")
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
