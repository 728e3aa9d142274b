//! Structured error types shared across divsim crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`DivError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (scenario keys, replication ids, row numbers).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the divsim pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum DivError {
    /// Invalid population mix or scenario key.
    #[error("scenario error: {0}")]
    Scenario(ErrorInfo),
    /// Malformed frequency or result tables.
    #[error("table error: {0}")]
    Table(ErrorInfo),
    /// Failures raised while building or stepping a world model.
    #[error("world error: {0}")]
    World(ErrorInfo),
    /// Replication boundaries violated while aggregating stored results.
    #[error("integrity error: {0}")]
    Integrity(ErrorInfo),
    /// Invalid sweep plan or world configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Filesystem and thread pool failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl DivError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            DivError::Scenario(info)
            | DivError::Table(info)
            | DivError::World(info)
            | DivError::Integrity(info)
            | DivError::Config(info)
            | DivError::Io(info)
            | DivError::Serde(info) => info,
        }
    }

    /// Returns true for errors raised by replication boundary checks.
    pub fn is_integrity(&self) -> bool {
        matches!(self, DivError::Integrity(_))
    }
}
