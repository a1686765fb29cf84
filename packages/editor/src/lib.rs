//! # CSL Editor
//!
//! Document store and structural editing engine for CSL styles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ codec: CSL XML ↔ Node tree                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document store + mutations          │
//! │  - Snapshot get/set through Storage         │
//! │  - add / delete / amend / move              │
//! │  - Inverse commands for undo                │
//! │  - Macro call sites → macro definitions     │
//! │  - style/info ordering on load and save     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ observers: views, citation formatter        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshot is the source of truth**: every write replaces the whole
//!    stored tree; nothing is patched in place.
//! 2. **Identities are derived**: node ids are pre-order positions and are
//!    recomputed after every structural change.
//! 3. **Every edit is invertible**: each mutation returns the [`Command`]
//!    that undoes it.
//! 4. **User errors are data**: bad input comes back as [`StyleError`];
//!    internal inconsistencies are [`MutationError`]s.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use csledit_editor::{Document, MemoryStorage, Node, Position};
//!
//! let mut doc = Document::new(Box::new(MemoryStorage::new()), Default::default());
//! doc.set_from_markup(&std::fs::read_to_string("apa.csl")?)?;
//!
//! // Append a group to the citation layout
//! let layout = doc.get_nodes_from_path("style/citation/layout")?[0].node_id;
//! let undo = doc.add_node(layout, Position::Last, Node::new("group"))?;
//!
//! // ... and take it back
//! doc.apply(undo)?;
//! ```

mod commands;
mod document;
mod errors;
mod macro_resolver;
mod mutations;
mod observers;
mod options;
mod ordering;
mod schema;
mod source;
mod storage;
mod undo_stack;

pub use commands::{Command, CommandError, Position};
pub use document::{Document, NodeAndParent, UPDATED_PATH};
pub use errors::{EditorError, StyleError};
pub use macro_resolver::resolve_macro_target;
pub use mutations::{splice, MutationError, Spliced};
pub use observers::{ObserverId, ObserverRegistry, StyleEvent, StyleObserver};
pub use options::{EditorOptions, DEFAULT_CONFIG_NAME};
pub use ordering::{reorder_style_info, STYLE_INFO_ORDER};
pub use schema::{NoDefaults, Schema, StaticSchema};
pub use source::{strip_comments, FileSource, SourceError, StyleSource};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use undo_stack::{CommandBatch, UndoStack};

#[cfg(feature = "http")]
pub use source::HttpSource;

// Re-export tree types for convenience
pub use csledit_codec::{MarkupCodec, ParseError, XmlCodec};
pub use csledit_tree::{Attribute, Node};
