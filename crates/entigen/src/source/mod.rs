//! Structured access to a generated source file.
//!
//! The synchronizer never touches raw text. It goes through a
//! [`SourceDocument`], which exposes the one managed doc block of the file's
//! single class and the file's import list, and prints the whole file back.

use thiserror::Error;

use crate::annotation::Reference;

mod php;

pub use php::PhpDocument;

/// Shape problems found while parsing a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("no namespace declaration found")]
    MissingNamespace,

    #[error("expected a single namespace, found {count}")]
    MultipleNamespaces { count: usize },

    #[error("no class declaration found")]
    MissingClass,

    #[error("expected a single class, found {count}")]
    MultipleClasses { count: usize },

    #[error("comment opened on line {line} is never closed")]
    UnterminatedComment { line: usize },
}

/// A parsed source file with one attachment point for the managed block.
pub trait SourceDocument {
    /// The file's namespace.
    fn namespace(&self) -> &str;

    /// Lines of the class doc block, without comment decoration. Empty when
    /// the class has no doc block.
    fn comment_lines(&self) -> Vec<String>;

    /// Replace the class doc block. An empty list removes the block.
    fn set_comment_lines(&mut self, lines: Vec<String>);

    /// Imported classes, in file order.
    fn references(&self) -> Vec<Reference>;

    /// Import `reference`. Returns false when it is already imported or lives
    /// in the document's own namespace.
    fn add_reference(&mut self, reference: &Reference) -> bool;

    /// Drop the import of `reference`. Returns whether it was imported.
    fn remove_reference(&mut self, reference: &Reference) -> bool;

    /// Print the full file text.
    fn print(&self) -> String;
}

#[cfg(test)]
mod tests;
