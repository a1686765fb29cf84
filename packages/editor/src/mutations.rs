//! # Mutation Engine
//!
//! Identity-addressed edits on the stored style.
//!
//! ## Semantics
//!
//! Every edit reads the stored tree, changes a copy, renumbers it and writes
//! it back in one step. Each public edit returns the [`Command`] that undoes
//! it, expressed in the identities valid *after* the edit.
//!
//! ### Add
//! - `ByIndex`, `First`, `Last` and `Inside` address the parent, and follow
//!   macro call sites to the macro definition
//! - `Before` and `After` address a sibling and are never redirected
//! - Nodes without attributes or children get schema defaults
//! - [`Document::apply`] replays the node as given: no schema defaults, and
//!   a `ByIndex` parent is never redirected
//!
//! ### Delete
//! - Removes the node with its whole subtree
//! - Required paths and `style/info/updated` cannot be deleted
//!
//! ### Amend
//! - Replaces name, attributes and text; children stay
//!
//! ### Move
//! - Delete then insert, observers only see the summary
//! - Fails if the destination lies inside the moved subtree

use csledit_tree::{locate, renumber, Node};
use thiserror::Error;
use tracing::debug;

use crate::commands::{Command, Position};
use crate::document::{Document, UPDATED_PATH};
use crate::errors::{EditorError, StyleError};
use crate::macro_resolver::resolve_macro_target;
use crate::observers::StyleEvent;

/// Caller contract violations; the stored style is left untouched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(usize),

    #[error(
        "Cannot remove {delete_count} children at {position} from node {id}, it has {child_count}"
    )]
    SpliceOutOfBounds {
        id: usize,
        position: usize,
        delete_count: usize,
        child_count: usize,
    },

    #[error("The root node has no siblings")]
    RootRelativePosition,

    #[error("Cannot delete the root node")]
    RootDeletion,

    #[error("Cannot move node {from} into its own subtree at {to}")]
    CycleDetected { from: usize, to: usize },
}

/// Result of [`splice`]
#[derive(Debug, Clone, PartialEq)]
pub struct Spliced {
    /// Change in total node count
    pub delta: isize,
    /// Children taken out, in order
    pub removed: Vec<Node>,
}

/// Remove `delete_count` children of node `id` starting at `position`, then
/// insert `node` there. The tree is renumbered afterwards.
pub fn splice(
    tree: &mut Node,
    id: usize,
    position: usize,
    delete_count: usize,
    node: Option<Node>,
) -> Result<Spliced, MutationError> {
    let before = tree.count();
    let path = locate(tree, id).ok_or(MutationError::NodeNotFound(id))?.path;
    let target = tree
        .descendant_mut(&path)
        .ok_or(MutationError::NodeNotFound(id))?;

    let child_count = target.children.len();
    let end = position
        .checked_add(delete_count)
        .filter(|end| *end <= child_count)
        .ok_or(MutationError::SpliceOutOfBounds {
            id,
            position,
            delete_count,
            child_count,
        })?;

    let removed: Vec<Node> = target.children.splice(position..end, node).collect();
    let after = renumber(tree);

    Ok(Spliced {
        delta: after as isize - before as isize,
        removed,
    })
}

/// What [`Document::remove_node`] took out and where from
struct Removed {
    node: Node,
    parent_id: usize,
    index: usize,
}

impl Document {
    /// Low-level splice on the stored style. No schema defaults, no events.
    pub fn splice_node(
        &mut self,
        id: usize,
        position: usize,
        delete_count: usize,
        node: Option<Node>,
    ) -> Result<isize, EditorError> {
        let mut tree = self.get()?;
        let spliced = splice(&mut tree, id, position, delete_count, node)?;
        self.set(tree)?;
        Ok(spliced.delta)
    }

    /// Insert `node` relative to `id`. Returns the inverse `DeleteNode`.
    pub fn add_node(
        &mut self,
        id: usize,
        position: Position,
        node: Node,
    ) -> Result<Command, EditorError> {
        let node = self.schema.populate(node);
        let new_id = self.insert_node(id, position, node, MacroIndex::Follow)?;
        self.emit(StyleEvent::FormatCitations);
        Ok(Command::DeleteNode(new_id))
    }

    /// Replay an `AddNode` command. The node goes in as given, and a
    /// `ByIndex` parent is taken literally, so the inverse of a delete puts
    /// the subtree back exactly where it was.
    fn restore_node(
        &mut self,
        id: usize,
        position: Position,
        node: Node,
    ) -> Result<Command, EditorError> {
        let new_id = self.insert_node(id, position, node, MacroIndex::Literal)?;
        self.emit(StyleEvent::FormatCitations);
        Ok(Command::DeleteNode(new_id))
    }

    /// Insert without schema defaults; emits `AddNode` only
    pub(crate) fn insert_node(
        &mut self,
        id: usize,
        position: Position,
        node: Node,
        macro_index: MacroIndex,
    ) -> Result<usize, EditorError> {
        let mut tree = self.get()?;
        let (parent_id, index) = insertion_slot(&tree, id, position, macro_index)?;
        let spliced = splice(&mut tree, parent_id, index, 0, Some(node))?;

        let inserted = locate(&tree, parent_id)
            .and_then(|parent| parent.node.children.get(index))
            .cloned()
            .ok_or(MutationError::NodeNotFound(parent_id))?;
        debug!(
            "Inserted <{}> as node {} under {} at {}",
            inserted.name, inserted.node_id, parent_id, index
        );

        self.set(tree)?;
        let new_id = inserted.node_id;
        self.emit(StyleEvent::AddNode {
            parent_id,
            position: index,
            node: inserted,
            nodes_added: spliced.delta,
        });
        Ok(new_id)
    }

    /// Delete `id` with its subtree. Returns the inverse `AddNode`.
    pub fn delete_node(&mut self, id: usize) -> Result<Command, EditorError> {
        let tree = self.get()?;
        let path = locate(&tree, id)
            .ok_or(MutationError::NodeNotFound(id))?
            .names_path();

        if path == UPDATED_PATH || self.options.required_nodes.iter().any(|r| *r == path) {
            debug!("Refusing to delete required node {}", path);
            return Err(StyleError::required_node(&path).into());
        }

        let removed = self.remove_node(id)?;
        self.emit(StyleEvent::FormatCitations);
        Ok(Command::AddNode(
            removed.parent_id,
            Position::ByIndex(removed.index),
            removed.node,
        ))
    }

    /// Delete without the required-node check; emits `DeleteNode` only
    fn remove_node(&mut self, id: usize) -> Result<Removed, EditorError> {
        if id == 0 {
            return Err(MutationError::RootDeletion.into());
        }

        let mut tree = self.get()?;
        let found = locate(&tree, id).ok_or(MutationError::NodeNotFound(id))?;
        let parent_id = found
            .parent
            .map(|parent| parent.node_id)
            .ok_or(MutationError::RootDeletion)?;
        let index = found.index_in_parent().ok_or(MutationError::RootDeletion)?;

        let spliced = splice(&mut tree, parent_id, index, 1, None)?;
        let node = spliced
            .removed
            .into_iter()
            .next()
            .ok_or(MutationError::NodeNotFound(id))?;
        let nodes_deleted = spliced.delta.unsigned_abs();
        debug!("Deleted <{}> at {} ({} nodes)", node.name, id, nodes_deleted);

        self.set(tree)?;
        self.emit(StyleEvent::DeleteNode { id, nodes_deleted });
        Ok(Removed {
            node,
            parent_id,
            index,
        })
    }

    /// Replace the name, attributes and text of `id`, keeping its children.
    /// Returns the inverse `AmendNode`.
    pub fn amend_node(&mut self, id: usize, amended: Node) -> Result<Command, EditorError> {
        let mut tree = self.get()?;
        let path = locate(&tree, id).ok_or(MutationError::NodeNotFound(id))?.path;
        let target = tree
            .descendant_mut(&path)
            .ok_or(MutationError::NodeNotFound(id))?;

        let previous = Node {
            name: std::mem::replace(&mut target.name, amended.name),
            attributes: std::mem::replace(&mut target.attributes, amended.attributes),
            text_value: std::mem::replace(&mut target.text_value, amended.text_value),
            children: Vec::new(),
            node_id: id,
        };
        let node = target.clone();
        debug!("Amended node {} <{}> → <{}>", id, previous.name, node.name);

        self.set(tree)?;
        self.emit(StyleEvent::AmendNode { id, node });
        self.emit(StyleEvent::FormatCitations);
        Ok(Command::AmendNode(id, previous))
    }

    /// Relocate `from` (with its subtree) relative to `to`, both in
    /// pre-move identities. Returns the inverse `MoveNode`.
    pub fn move_node(
        &mut self,
        from: usize,
        to: usize,
        position: Position,
    ) -> Result<Command, EditorError> {
        let snapshot = self.raw_snapshot()?.ok_or(EditorError::NoDocument)?;
        let tree: Node = serde_json::from_str(&snapshot)?;

        let found = locate(&tree, from).ok_or(MutationError::NodeNotFound(from))?;
        let size = found.node.count();
        if (from..from + size).contains(&to) {
            return Err(MutationError::CycleDetected { from, to }.into());
        }
        let mut inverse_parent = found
            .parent
            .map(|parent| parent.node_id)
            .ok_or(MutationError::RootDeletion)?;
        let inverse_index = found.index_in_parent().ok_or(MutationError::RootDeletion)?;

        let moved = self.suppressed(|doc| {
            let removed = doc.remove_node(from)?;
            let target = if to > from { to - size } else { to };
            doc.insert_node(target, position, removed.node, MacroIndex::Follow)
        });

        let new_id = match moved {
            Ok(new_id) => new_id,
            Err(error) => {
                self.restore_raw(&snapshot)?;
                return Err(error);
            }
        };

        // The old parent shifts if the node landed at or before it
        if inverse_parent >= new_id {
            inverse_parent += size;
        }
        debug!("Moved node {} to {} ({} nodes)", from, new_id, size);

        self.emit(StyleEvent::MoveNode {
            from_id: from,
            to_id: to,
            position,
        });
        self.emit(StyleEvent::FormatCitations);
        Ok(Command::MoveNode(
            new_id,
            inverse_parent,
            Position::ByIndex(inverse_index),
        ))
    }

    /// Run any command, returning its inverse
    pub fn apply(&mut self, command: Command) -> Result<Command, EditorError> {
        debug!("Applying {}", command.name());
        match command {
            Command::AddNode(id, position, node) => self.restore_node(id, position, node),
            Command::DeleteNode(id) => self.delete_node(id),
            Command::AmendNode(id, node) => self.amend_node(id, node),
            Command::MoveNode(from, to, position) => self.move_node(from, to, position),
        }
    }
}

/// Whether a `ByIndex` insertion under a macro call goes into the macro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MacroIndex {
    Follow,
    Literal,
}

/// Parent identity and child index an insertion relative to `id` lands at
fn insertion_slot(
    tree: &Node,
    id: usize,
    position: Position,
    macro_index: MacroIndex,
) -> Result<(usize, usize), EditorError> {
    match position {
        Position::ByIndex(index) if macro_index == MacroIndex::Literal => {
            locate(tree, id).ok_or(MutationError::NodeNotFound(id))?;
            Ok((id, index))
        }
        Position::ByIndex(index) => Ok((resolve_macro_target(tree, id)?, index)),
        Position::First => Ok((resolve_macro_target(tree, id)?, 0)),
        Position::Last | Position::Inside => {
            let parent = resolve_macro_target(tree, id)?;
            let found = locate(tree, parent).ok_or(MutationError::NodeNotFound(parent))?;
            Ok((parent, found.node.children.len()))
        }
        Position::Before | Position::After => {
            let found = locate(tree, id).ok_or(MutationError::NodeNotFound(id))?;
            let parent = found.parent.ok_or(MutationError::RootRelativePosition)?;
            let index = found
                .index_in_parent()
                .ok_or(MutationError::RootRelativePosition)?;
            let index = if position == Position::After { index + 1 } else { index };
            Ok((parent.node_id, index))
        }
    }
}
