//! # Undo/Redo Stack
//!
//! Tracks command history on top of [`Document::apply`].
//!
//! ## Design
//!
//! - Every applied command hands back its inverse, which is recorded
//! - Undo applies the inverses; what *those* return becomes the redo commands
//! - Redo does the same in the other direction
//! - New commands clear the redo stack
//! - Batches group several commands into one undo step
//!
//! Identities shift with every edit, so stored commands are only valid for
//! the exact document state they were derived against. Re-deriving them on
//! each undo and redo keeps them in step.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! stack.execute(Command::DeleteNode(4), &mut doc)?;
//! stack.undo(&mut doc)?;
//! stack.redo(&mut doc)?;
//! ```

use tracing::warn;

use crate::commands::Command;
use crate::document::Document;
use crate::errors::EditorError;

/// Commands undone and redone together
#[derive(Debug, Clone)]
pub struct CommandBatch {
    /// Commands in application order
    pub commands: Vec<Command>,

    /// Inverses in undo order (last command's inverse first)
    pub inverses: Vec<Command>,

    pub description: Option<String>,
}

impl CommandBatch {
    pub fn single(command: Command, inverse: Command) -> Self {
        Self {
            commands: vec![command],
            inverses: vec![inverse],
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn empty() -> Self {
        Self {
            commands: Vec::new(),
            inverses: Vec::new(),
            description: None,
        }
    }
}

/// Undo/redo history for one document
#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<CommandBatch>,
    redo_stack: Vec<CommandBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<CommandBatch>,
}

impl UndoStack {
    /// Stack keeping the last 100 undo levels
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply `command` to `doc` and record it. Returns the inverse.
    pub fn execute(&mut self, command: Command, doc: &mut Document) -> Result<Command, EditorError> {
        let inverse = doc.apply(command.clone())?;
        self.record(command, inverse.clone());
        Ok(inverse)
    }

    /// Record a command that was applied elsewhere along with its inverse
    pub fn record(&mut self, command: Command, inverse: Command) {
        match &mut self.current_batch {
            Some(batch) => {
                batch.commands.push(command);
                batch.inverses.insert(0, inverse);
            }
            None => self.push_batch(CommandBatch::single(command, inverse)),
        }
    }

    pub fn begin_batch(&mut self) {
        self.current_batch = Some(CommandBatch::empty());
    }

    /// Close the current batch; empty batches are dropped
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.commands.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: CommandBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent batch. Returns false if there was nothing to undo.
    ///
    /// If any inverse fails the document is restored and the batch dropped.
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool, EditorError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        let mut commands = replay(doc, &batch.inverses)?;
        commands.reverse();
        self.redo_stack.push(CommandBatch {
            commands,
            inverses: batch.inverses,
            description: batch.description,
        });
        Ok(true)
    }

    /// Redo the most recently undone batch. Returns false if there was
    /// nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool, EditorError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        let mut inverses = replay(doc, &batch.commands)?;
        inverses.reverse();
        self.undo_stack.push(CommandBatch {
            commands: batch.commands,
            inverses,
            description: batch.description,
        });
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `commands` in order, collecting what each returns.
/// All or nothing: a failure puts the stored style back as it was.
fn replay(doc: &mut Document, commands: &[Command]) -> Result<Vec<Command>, EditorError> {
    let snapshot = doc.raw_snapshot()?;
    let mut results = Vec::with_capacity(commands.len());

    for command in commands {
        match doc.apply(command.clone()) {
            Ok(result) => results.push(result),
            Err(error) => {
                warn!("History replay failed at {}: {}", command.name(), error);
                if let Some(raw) = &snapshot {
                    doc.restore_raw(raw)?;
                }
                return Err(error);
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Position;
    use csledit_tree::Node;

    fn doc() -> Document {
        let mut doc = Document::in_memory();
        doc.set_from_markup(
            r#"<style><info><title>Example</title></info><citation><layout/></citation></style>"#,
        )
        .unwrap();
        doc
    }

    fn title(doc: &Document) -> String {
        doc.get_node(2).unwrap().unwrap().text_value.unwrap_or_default()
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_execute_undo_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack
            .execute(Command::AmendNode(2, Node::new("title").with_text("Changed")), &mut doc)
            .unwrap();
        assert_eq!(title(&doc), "Changed");

        assert!(stack.undo(&mut doc).unwrap());
        assert_eq!(title(&doc), "Example");
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc).unwrap());
        assert_eq!(title(&doc), "Changed");
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_batch_undoes_in_reverse() {
        let mut doc = doc();
        let before = doc.get().unwrap();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        stack.set_batch_description("Add bibliography");
        stack
            .execute(Command::AddNode(0, Position::Last, Node::new("bibliography")), &mut doc)
            .unwrap();
        stack
            .execute(Command::AddNode(5, Position::Last, Node::new("layout")), &mut doc)
            .unwrap();
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Add bibliography"));
        assert_eq!(doc.node_count().unwrap(), 7);

        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.get().unwrap(), before);

        stack.redo(&mut doc).unwrap();
        assert_eq!(doc.node_count().unwrap(), 7);
        assert_eq!(doc.get_node_path(6).unwrap().as_deref(), Some("style/bibliography/layout"));
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack.execute(Command::DeleteNode(4), &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        stack.execute(Command::DeleteNode(3), &mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = doc();
        let mut stack = UndoStack::with_max_levels(2);

        for i in 0..3 {
            let title = Node::new("title").with_text(format!("Title {}", i));
            stack.execute(Command::AmendNode(2, title), &mut doc).unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_failed_command_is_not_recorded() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        assert!(stack.execute(Command::DeleteNode(42), &mut doc).is_err());
        assert!(!stack.can_undo());
    }
}
