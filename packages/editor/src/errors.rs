//! Error types for the editor

use csledit_tree::PathError;
use serde::Serialize;
use thiserror::Error;

use crate::commands::CommandError;
use crate::mutations::MutationError;
use crate::source::SourceError;
use crate::storage::StorageError;

/// Problems caused by the style being edited, reported back to the user.
///
/// Serializes as `{"type": "requiredNode", "message": "..."}` and friends.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleError {
    #[error("{message}")]
    CslParsing { message: String },

    #[error("{message}")]
    DependentStyle {
        #[serde(rename = "parentURL")]
        parent_url: String,
        message: String,
    },

    #[error("{message}")]
    NodeMissing { node: String, message: String },

    #[error("{message}")]
    RequiredNode { message: String },
}

impl StyleError {
    pub fn required_node(path: &str) -> Self {
        StyleError::RequiredNode {
            message: format!("Cannot delete required node: {}", path),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Style(#[from] StyleError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No style document has been stored yet")]
    NoDocument,

    #[error("No default style URL is configured")]
    NoDefaultStyle,
}

impl EditorError {
    /// True for errors caused by the style itself rather than by the editor
    pub fn is_user_error(&self) -> bool {
        matches!(self, EditorError::Style(_))
    }

    pub fn style_error(&self) -> Option<&StyleError> {
        match self {
            EditorError::Style(error) => Some(error),
            _ => None,
        }
    }
}
