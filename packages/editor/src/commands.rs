//! # Commands
//!
//! Data-only description of an edit. Every mutation on [`crate::Document`]
//! returns the command that reverses it, and [`crate::Document::apply`]
//! runs any command, so undo/redo is just "apply what you were given".
//!
//! ## Wire format
//!
//! ```text
//! {"command": "addNode",    "args": [parentId, position, node]}
//! {"command": "deleteNode", "args": [id]}
//! {"command": "amendNode",  "args": [id, node]}
//! {"command": "moveNode",   "args": [fromId, toId, position]}
//! ```
//!
//! Positions are either a sibling index or one of `"first"`, `"last"`,
//! `"inside"`, `"before"`, `"after"`.

use csledit_tree::Node;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Where to put a node relative to an addressed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PositionRepr", into = "PositionRepr")]
pub enum Position {
    /// Child index within the addressed node
    ByIndex(usize),
    /// First child of the addressed node
    First,
    /// Last child of the addressed node
    Last,
    /// Same as `Last`
    Inside,
    /// Sibling immediately before the addressed node
    Before,
    /// Sibling immediately after the addressed node
    After,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Index(usize),
    Keyword(Keyword),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Keyword {
    First,
    Last,
    Inside,
    Before,
    After,
}

impl From<PositionRepr> for Position {
    fn from(repr: PositionRepr) -> Self {
        match repr {
            PositionRepr::Index(index) => Position::ByIndex(index),
            PositionRepr::Keyword(Keyword::First) => Position::First,
            PositionRepr::Keyword(Keyword::Last) => Position::Last,
            PositionRepr::Keyword(Keyword::Inside) => Position::Inside,
            PositionRepr::Keyword(Keyword::Before) => Position::Before,
            PositionRepr::Keyword(Keyword::After) => Position::After,
        }
    }
}

impl From<Position> for PositionRepr {
    fn from(position: Position) -> Self {
        match position {
            Position::ByIndex(index) => PositionRepr::Index(index),
            Position::First => PositionRepr::Keyword(Keyword::First),
            Position::Last => PositionRepr::Keyword(Keyword::Last),
            Position::Inside => PositionRepr::Keyword(Keyword::Inside),
            Position::Before => PositionRepr::Keyword(Keyword::Before),
            Position::After => PositionRepr::Keyword(Keyword::After),
        }
    }
}

/// A structural edit, usually the inverse of one that was just applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCommand", into = "RawCommand")]
pub enum Command {
    AddNode(usize, Position, Node),
    DeleteNode(usize),
    AmendNode(usize, Node),
    MoveNode(usize, usize, Position),
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddNode(..) => "addNode",
            Command::DeleteNode(..) => "deleteNode",
            Command::AmendNode(..) => "amendNode",
            Command::MoveNode(..) => "moveNode",
        }
    }
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Bad arguments for {command}: {source}")]
    BadArguments {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize)]
struct RawCommand {
    command: String,
    #[serde(default)]
    args: Vec<Value>,
}

impl From<Command> for RawCommand {
    fn from(command: Command) -> Self {
        let name = command.name().to_string();
        let args = match command {
            Command::AddNode(parent, position, node) => json!([parent, position, node]),
            Command::DeleteNode(id) => json!([id]),
            Command::AmendNode(id, node) => json!([id, node]),
            Command::MoveNode(from, to, position) => json!([from, to, position]),
        };

        let args = match args {
            Value::Array(args) => args,
            other => vec![other],
        };
        RawCommand {
            command: name,
            args,
        }
    }
}

impl TryFrom<RawCommand> for Command {
    type Error = CommandError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        let args = Value::Array(raw.args);
        let bad = |source| CommandError::BadArguments {
            command: raw.command.clone(),
            source,
        };

        match raw.command.as_str() {
            "addNode" => {
                let (parent, position, node) = serde_json::from_value(args).map_err(bad)?;
                Ok(Command::AddNode(parent, position, node))
            }
            "deleteNode" => {
                let (id,) = serde_json::from_value(args).map_err(bad)?;
                Ok(Command::DeleteNode(id))
            }
            "amendNode" => {
                let (id, node) = serde_json::from_value(args).map_err(bad)?;
                Ok(Command::AmendNode(id, node))
            }
            "moveNode" => {
                let (from, to, position) = serde_json::from_value(args).map_err(bad)?;
                Ok(Command::MoveNode(from, to, position))
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wire_format() {
        assert_eq!(serde_json::to_string(&Position::ByIndex(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Position::After).unwrap(), "\"after\"");

        let inside: Position = serde_json::from_str("\"inside\"").unwrap();
        assert_eq!(inside, Position::Inside);
        assert!(serde_json::from_str::<Position>("\"sideways\"").is_err());
    }

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::to_value(Command::DeleteNode(7)).unwrap();
        assert_eq!(json, json!({"command": "deleteNode", "args": [7]}));

        let json = serde_json::to_value(Command::MoveNode(4, 1, Position::Last)).unwrap();
        assert_eq!(json, json!({"command": "moveNode", "args": [4, 1, "last"]}));
    }

    #[test]
    fn test_command_from_wire() {
        let command: Command = serde_json::from_str(
            r#"{"command": "addNode", "args": [2, "first", {"name": "group"}]}"#,
        )
        .unwrap();

        match command {
            Command::AddNode(2, Position::First, node) => assert_eq!(node.name, "group"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let result = serde_json::from_str::<Command>(r#"{"command": "renameNode", "args": []}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<Command>(r#"{"command": "deleteNode", "args": ["x"]}"#);
        assert!(result.is_err());
    }
}
