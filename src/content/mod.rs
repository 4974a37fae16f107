//! content
//!
//! Content documents: lossless frontmatter parsing and field-level edits.
//!
//! # Modules
//!
//! - [`frontmatter`] - Parse and re-serialize documents byte-for-byte
//! - [`mutator`] - Apply field edits and new bodies; build new documents
//!
//! Nothing in this module touches the filesystem. Reading and writing
//! documents is the working copy's job (see [`crate::workspace`]).

pub mod frontmatter;
pub mod mutator;

pub use frontmatter::{
    parse, serialize, ContentDocument, Entry, Field, Frontmatter, FrontmatterFormat, LineEnding,
    ParseError,
};
pub use mutator::{apply_edits, new_document, EditError, FieldEdits};
