//! Plugin loading logic
//!
//! [`PluginLoader`] collects plugin contributions from module exports, one
//! module at a time, and reduces them into [`PluginSettings`] once every
//! module has been loaded.

use crate::plugins::contribution::is_truthy;
use crate::plugins::error::PluginResult;
use crate::plugins::observer::{LoaderEvent, LoaderObserver};
use crate::plugins::registry::{PassThrough, PluginRegistry, default_registry};
use crate::plugins::settings::{PluginSetting, PluginSettings};
use indexmap::IndexMap;
use mlua::{Table, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Stateful collector of plugin contributions for one run
pub struct PluginLoader {
    registry: Arc<PluginRegistry>,
    /// Contributions per export name, in load order
    loaded: IndexMap<String, Vec<Value>>,
    ignored: HashSet<String>,
    observer: Option<Arc<dyn LoaderObserver>>,
}

impl PluginLoader {
    /// Create a loader over the built-in kinds
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }

    /// Create a loader over a caller-supplied registry
    pub fn with_registry(registry: Arc<PluginRegistry>) -> Self {
        let loaded = registry
            .list_kinds()
            .into_iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();

        Self {
            registry,
            loaded,
            ignored: HashSet::new(),
            observer: None,
        }
    }

    /// Refuse to recognise the given export names
    ///
    /// Parallel workers use this to leave global fixtures to the main process.
    pub fn ignore<I, S>(mut self, export_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(export_names.into_iter().map(Into::into));
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoaderObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn is_ignored(&self, export_name: &str) -> bool {
        self.ignored.contains(export_name)
    }

    /// Contributions accumulated so far for a kind
    pub fn contributions(&self, export_name: &str) -> Option<&[Value]> {
        self.loaded.get(export_name).map(Vec::as_slice)
    }

    fn emit(&self, event: LoaderEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }

    /// Load the export object of one module
    ///
    /// Returns `Ok(true)` when at least one recognised kind was accepted.
    /// Exports that are not tables, or tables without recognised kinds, are
    /// not an error and return `Ok(false)`.
    ///
    /// # Errors
    /// Returns the validation error of the first malformed export. The whole
    /// module is rejected in that case; no bucket changes.
    pub fn load(&mut self, exports: &Value) -> PluginResult<bool> {
        let Value::Table(exports) = exports else {
            return Ok(false);
        };

        let accepted = self.collect(exports)?;
        if accepted.is_empty() {
            self.emit(LoaderEvent::ModuleSkipped);
            return Ok(false);
        }

        for (export_name, contributions) in accepted {
            let count = contributions.len();
            if let Some(bucket) = self.loaded.get_mut(&export_name) {
                bucket.extend(contributions);
            }
            self.emit(LoaderEvent::ContributionsLoaded { export_name, count });
        }
        Ok(true)
    }

    /// Validate and normalise every recognised export of a module
    fn collect(&self, exports: &Table) -> PluginResult<Vec<(String, Vec<Value>)>> {
        let mut accepted = Vec::new();

        for kind in self.registry.kinds() {
            let value: Value = exports.get(kind.export_name())?;
            if !is_truthy(&value) {
                continue;
            }

            if self.is_ignored(kind.export_name()) {
                self.emit(LoaderEvent::KindIgnored {
                    export_name: kind.export_name().to_string(),
                });
                continue;
            }

            kind.validate(&value)?;
            accepted.push((kind.export_name().to_string(), kind.normalize(value)?));
        }

        Ok(accepted)
    }

    /// Reduce every non-empty bucket into the settings handed to the runner
    ///
    /// Kinds are visited in registration order. Buckets are left intact, so
    /// calling this again without further loads gives the same settings.
    pub async fn finalize(&self) -> PluginResult<PluginSettings> {
        let mut settings = PluginSettings::new();

        for kind in self.registry.kinds() {
            if self.is_ignored(kind.export_name()) {
                continue;
            }
            let Some(bucket) = self.loaded.get(kind.export_name()) else {
                continue;
            };
            if bucket.is_empty() {
                continue;
            }

            let setting = match (kind.finalizer(), kind.pass_through()) {
                (Some(finalizer), _) => finalizer(bucket.clone()).await?,
                (None, PassThrough::Surface) => PluginSetting::Contributions(bucket.clone()),
                (None, PassThrough::Hidden) => {
                    self.emit(LoaderEvent::KindHidden {
                        export_name: kind.export_name().to_string(),
                        contributions: bucket.len(),
                    });
                    continue;
                }
            };

            self.emit(LoaderEvent::KindFinalized {
                option_name: kind.option_name().to_string(),
                contributions: bucket.len(),
            });
            settings.insert(kind.option_name(), setting);
        }

        Ok(settings)
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: IndexMap<&str, usize> = self
            .loaded
            .iter()
            .map(|(name, bucket)| (name.as_str(), bucket.len()))
            .collect();
        f.debug_struct("PluginLoader")
            .field("loaded", &counts)
            .field("ignored", &self.ignored)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
