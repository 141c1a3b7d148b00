//! Error types for the editor

use rosewood_common::CommonError;
use rosewood_parser::{ParseError, SyntaxKind, TreeError};
use thiserror::Error;

pub type NavigatorResult<T> = Result<T, NavigatorError>;

#[derive(Error, Debug)]
pub enum NavigatorError {
    /// The session is not in a shape the operation can work with
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A precondition of the requested operation does not hold
    #[error("Invalid action for state: {0}")]
    InvalidActionForState(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid argument `{argument}`: {message}")]
    Argument { argument: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Editing {kind} would lose {dropped} selected node(s)")]
    RelocationLost { kind: SyntaxKind, dropped: usize },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl NavigatorError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn invalid_action(message: impl Into<String>) -> Self {
        Self::InvalidActionForState(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Argument {
            argument: argument.into(),
            message: message.into(),
        }
    }
}
