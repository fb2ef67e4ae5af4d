// Plugin Loader - Error Types
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for plugin registration, loading and finalization

use std::path::PathBuf;
use thiserror::Error;

/// Plugin system error type
#[derive(Error, Debug)]
pub enum PluginError {
    /// Two kinds registered under the same export name
    #[error("plugin kind with export name \"{export_name}\" already registered")]
    NameConflict { export_name: String },

    /// A module exported a contribution with the wrong shape for its kind
    #[error("{export_name} must be {expected}")]
    Unsupported {
        export_name: String,
        expected: &'static str,
    },

    /// A resolved root hook object holds something other than callbacks
    #[error(
        "invalid root hook set: {slot} must be a function or an array of functions, got {found}"
    )]
    InvalidHookSet { slot: String, found: &'static str },

    /// A factory fulfilled with something other than an object
    #[error("{export_name} factory must return an object, got {found}")]
    InvalidFactoryResult {
        export_name: String,
        found: &'static str,
    },

    /// A contributor callback raised an error while being resolved
    #[error("{export_name} contributor failed: {source}")]
    Contributor {
        export_name: String,
        #[source]
        source: mlua::Error,
    },

    #[error("module not found: {}", path.display())]
    ModuleNotFound { path: PathBuf },

    #[error("failed to read module {}: {source}", path.display())]
    ModuleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to evaluate module {}: {source}", path.display())]
    ModuleEval {
        path: PathBuf,
        #[source]
        source: mlua::Error,
    },

    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),
}

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

impl PluginError {
    /// Create a validation error for the given export
    pub fn unsupported(export_name: impl Into<String>, expected: &'static str) -> Self {
        Self::Unsupported {
            export_name: export_name.into(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_export() {
        let err = PluginError::unsupported("mochaHooks", "an object");
        assert_eq!(err.to_string(), "mochaHooks must be an object");
    }

    #[test]
    fn test_name_conflict_message() {
        let err = PluginError::NameConflict {
            export_name: "mochaHooks".to_string(),
        };
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_factory_result_message_names_export() {
        let err = PluginError::InvalidFactoryResult {
            export_name: "mochaHooks".to_string(),
            found: "integer",
        };
        assert_eq!(err.to_string(), "mochaHooks factory must return an object, got integer");
    }
}
