//! Structured error types shared across symspace crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SymError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sector labels, sizes, etc.).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for symmetry and space operations.
///
/// Internal invariant violations are not represented here; they panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SymError {
    /// Shape or domain mismatch of caller supplied data.
    #[error("validation error: {0}")]
    Validation(ErrorInfo),
    /// Operation that is not available for the given symmetry or fusion style.
    #[error("unsupported operation: {0}")]
    Unsupported(ErrorInfo),
    /// Out-of-bounds index.
    #[error("range error: {0}")]
    Range(ErrorInfo),
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

impl SymError {
    /// Creates a [`SymError::Validation`] with the given code and message.
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        SymError::Validation(ErrorInfo::new(code, message))
    }

    /// Creates a [`SymError::Unsupported`] with the given code and message.
    pub fn unsupported(code: impl Into<String>, message: impl Into<String>) -> Self {
        SymError::Unsupported(ErrorInfo::new(code, message))
    }

    /// Creates a [`SymError::Range`] with the given code and message.
    pub fn range(code: impl Into<String>, message: impl Into<String>) -> Self {
        SymError::Range(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SymError::Validation(info)
            | SymError::Unsupported(info)
            | SymError::Range(info)
            | SymError::Serde(info) => info,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Attaches a context entry, keeping the error family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.map_info(|info| info.with_context(key, value))
    }

    /// Attaches a remediation hint, keeping the error family.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        self.map_info(|info| info.with_hint(hint))
    }

    fn map_info(self, f: impl FnOnce(ErrorInfo) -> ErrorInfo) -> Self {
        match self {
            SymError::Validation(info) => SymError::Validation(f(info)),
            SymError::Unsupported(info) => SymError::Unsupported(f(info)),
            SymError::Range(info) => SymError::Range(f(info)),
            SymError::Serde(info) => SymError::Serde(f(info)),
        }
    }
}
