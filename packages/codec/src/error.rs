use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Element <{0}> is never closed")]
    Unclosed(String),

    #[error("Unexpected element <{0}> after the root element")]
    TrailingElement(String),
}
