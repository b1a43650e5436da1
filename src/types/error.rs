//! Unified error types for the engine
//!
//! This module defines error types that:
//! - Are serializable for frontend consumption
//! - Provide actionable error messages
//! - Map internal errors to user-friendly variants

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine error type for all public operations
///
/// All errors are serializable so they can cross a process or IPC boundary.
/// Error messages should be user-friendly and actionable.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum OrchestratedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Suggestion generator error: {0}")]
    Generator(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

// Implement From for common error types

impl From<std::io::Error> for OrchestratedError {
    fn from(err: std::io::Error) -> Self {
        OrchestratedError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for OrchestratedError {
    fn from(err: toml::de::Error) -> Self {
        OrchestratedError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for OrchestratedError {
    fn from(err: serde_json::Error) -> Self {
        OrchestratedError::Parse(err.to_string())
    }
}

impl From<String> for OrchestratedError {
    fn from(err: String) -> Self {
        OrchestratedError::Other(err)
    }
}

impl From<&str> for OrchestratedError {
    fn from(err: &str) -> Self {
        OrchestratedError::Other(err.to_string())
    }
}

/// Result type alias using OrchestratedError
pub type Result<T> = std::result::Result<T, OrchestratedError>;
