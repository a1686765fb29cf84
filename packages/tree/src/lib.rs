//! # CSL Style Tree
//!
//! In-memory representation of a CSL style document.
//!
//! ## Identity Model
//!
//! Every node carries a `node_id`. Identities are derived data: they equal
//! the node's position in a pre-order walk of the whole tree, starting at 0
//! for the root. Any structural change invalidates them, so writers call
//! [`renumber`] (or [`renumber_from`] for a single subtree) before the tree
//! is observed again.
//!
//! ```text
//! style            0
//! ├── info         1
//! │   ├── title    2
//! │   └── id       3
//! └── citation     4
//!     └── layout   5
//! ```
//!
//! ## Addressing
//!
//! - By identity: [`locate`] walks the tree with a [`Traversal`] and returns
//!   the node, its parent and its child-index path.
//! - By path: [`find_by_path`] resolves `style/info/link rel="self"` style
//!   paths, with `*` wildcards in names.

mod descriptor;
mod error;
mod node;
mod path;
mod traversal;

pub use descriptor::{NamePattern, NodeSpec};
pub use error::PathError;
pub use node::{Attribute, Node};
pub use path::find_by_path;
pub use traversal::{locate, renumber, renumber_from, Located, Traversal};
