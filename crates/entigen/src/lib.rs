//! Schema-driven maintenance of Nextras ORM entity classes.
//!
//! Every entity class carries a machine-maintained doc block listing its
//! properties. Given a schema change (a table's columns, one column, a
//! one-to-many or many-to-many relationship), this crate merges the new
//! property lines into that block, drops exact duplicates, orders the block by
//! category and then alphabetically, and adds the imports the new lines need,
//! leaving the rest of the file byte-for-byte unchanged.
//!
//! ```text
//! /**
//!  * @property int $id {primary}
//!  *
//!  * @property string $title
//!  *
//!  * @property User $author {m:1 User::$articles}
//!  */
//! class Article extends Entity
//! ```
//!
//! The pieces, leaves first:
//!
//! - [`annotation`]: line categories, the formatter turning schema facts into
//!   lines, and the catalog merging and ordering them.
//! - [`source`]: the parsed source file the catalog is read from and written to.
//! - [`sync`]: one schema change applied to one document, as a pure transform.
//! - [`generator`]: file-level operations (scaffolding, updates, removals).

pub mod annotation;
pub mod artifact;
pub mod error;
pub mod generator;
pub mod layout;
pub mod plan;
pub mod scaffold;
pub mod source;
pub mod sync;

pub use annotation::{AnnotationCatalog, AnnotationEntry, Category, Reference};
pub use error::{Error, Result};
pub use generator::{Action, Generator, Outcome, Settings, find_table};
pub use layout::ModelLayout;
pub use plan::{PlannedChange, plan_schema};
pub use scaffold::BaseClasses;
pub use source::{PhpDocument, SourceDocument, SourceError};
pub use sync::{EntityChange, ReferenceRemoval, RegistryChange, SyncReport, Synchronizer};
