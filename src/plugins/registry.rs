//! Plugin kind registry
//!
//! This module provides the catalog of plugin kinds the loader recognises.
//! A kind is looked up by the name a module exports it under and carries its
//! own behaviour (validator, finalizer), so new kinds are added by
//! registering a definition rather than by touching the loader.

use crate::plugins::contribution::{is_empty_table, to_sequence};
use crate::plugins::error::{PluginError, PluginResult};
use crate::plugins::settings::PluginSetting;
use futures::future::{FutureExt, LocalBoxFuture};
use indexmap::IndexMap;
use mlua::Value;
use once_cell::sync::Lazy;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Checks the raw exported value of a kind before it is accumulated
pub type Validator = Arc<dyn Fn(&str, &Value) -> PluginResult<()> + Send + Sync>;

/// Reduces the ordered contributions of a kind into its finalized setting
pub type Finalizer =
    Arc<dyn Fn(Vec<Value>) -> LocalBoxFuture<'static, PluginResult<PluginSetting>> + Send + Sync>;

/// What happens to a kind without a finalizer when it has contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassThrough {
    /// The accumulated list never reaches the settings
    #[default]
    Hidden,
    /// The accumulated list is surfaced as-is under the option name
    Surface,
}

/// Description of one recognised plugin kind
#[derive(Clone)]
pub struct PluginKindDefinition {
    export_name: String,
    option_name: Option<String>,
    validator: Option<Validator>,
    finalizer: Option<Finalizer>,
    pass_through: PassThrough,
    /// `{}` is read as an empty array rather than an object
    empty_table_is_array: bool,
}

impl PluginKindDefinition {
    /// Create a kind recognised under `export_name`, with no behaviour attached
    pub fn new(export_name: impl Into<String>) -> Self {
        Self {
            export_name: export_name.into(),
            option_name: None,
            validator: None,
            finalizer: None,
            pass_through: PassThrough::default(),
            empty_table_is_array: false,
        }
    }

    /// Key of the finalized value in the settings (defaults to the export name)
    pub fn with_option_name(mut self, option_name: impl Into<String>) -> Self {
        self.option_name = Some(option_name.into());
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> PluginResult<()> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_finalizer<F, Fut>(mut self, finalizer: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PluginResult<PluginSetting>> + 'static,
    {
        self.finalizer = Some(Arc::new(move |contributions| {
            finalizer(contributions).boxed_local()
        }));
        self
    }

    pub fn with_pass_through(mut self, pass_through: PassThrough) -> Self {
        self.pass_through = pass_through;
        self
    }

    /// Read an empty table export as an empty array of contributions
    pub fn with_empty_table_as_array(mut self) -> Self {
        self.empty_table_is_array = true;
        self
    }

    pub fn export_name(&self) -> &str {
        &self.export_name
    }

    pub fn option_name(&self) -> &str {
        self.option_name.as_deref().unwrap_or(&self.export_name)
    }

    pub fn pass_through(&self) -> PassThrough {
        self.pass_through
    }

    pub fn finalizer(&self) -> Option<&Finalizer> {
        self.finalizer.as_ref()
    }

    /// Run the validator, if any, against a raw exported value
    pub fn validate(&self, value: &Value) -> PluginResult<()> {
        match &self.validator {
            Some(validator) => validator(&self.export_name, value),
            None => Ok(()),
        }
    }

    /// Coerce a validated export into the contributions it adds
    pub fn normalize(&self, value: Value) -> PluginResult<Vec<Value>> {
        if self.empty_table_is_array && is_empty_table(&value) {
            return Ok(Vec::new());
        }
        Ok(to_sequence(value)?)
    }
}

impl fmt::Debug for PluginKindDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginKindDefinition")
            .field("export_name", &self.export_name)
            .field("option_name", &self.option_name())
            .field("validator", &self.validator.is_some())
            .field("finalizer", &self.finalizer.is_some())
            .field("pass_through", &self.pass_through)
            .field("empty_table_is_array", &self.empty_table_is_array)
            .finish()
    }
}

/// Catalog of plugin kinds, keyed by export name
///
/// Kinds iterate in registration order so finalized settings come out in a
/// reproducible key order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    kinds: IndexMap<String, PluginKindDefinition>,
}

static DEFAULT_REGISTRY: Lazy<Arc<PluginRegistry>> =
    Lazy::new(|| Arc::new(PluginRegistry::builtin()));

/// Shared registry holding the built-in kinds
pub fn default_registry() -> Arc<PluginRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            kinds: IndexMap::new(),
        }
    }

    /// Create a registry with the root hook and global fixture kinds
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in crate::plugins::kinds::builtin_kinds() {
            // Built-in export names are distinct constants
            let _ = registry.register(kind);
        }
        registry
    }

    /// Register a plugin kind
    ///
    /// # Errors
    /// Returns an error if a kind with the same export name is already registered
    pub fn register(&mut self, kind: PluginKindDefinition) -> PluginResult<()> {
        if self.kinds.contains_key(kind.export_name()) {
            return Err(PluginError::NameConflict {
                export_name: kind.export_name().to_string(),
            });
        }

        self.kinds.insert(kind.export_name().to_string(), kind);
        Ok(())
    }

    pub fn get(&self, export_name: &str) -> Option<&PluginKindDefinition> {
        self.kinds.get(export_name)
    }

    /// Registered export names in registration order
    pub fn list_kinds(&self) -> Vec<&str> {
        self.kinds.keys().map(String::as_str).collect()
    }

    /// Registered kinds in registration order
    pub fn kinds(&self) -> impl Iterator<Item = &PluginKindDefinition> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
