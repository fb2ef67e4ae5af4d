//! Finalized plugin settings handed to the runner

use crate::config::{GLOBAL_SETUP_OPTION, GLOBAL_TEARDOWN_OPTION, ROOT_HOOKS_OPTION};
use crate::plugins::root_hooks::RootHookSet;
use indexmap::IndexMap;
use mlua::{Function, Value};
use serde::Serialize;

/// The finalized value of one plugin kind
#[derive(Debug, Clone)]
pub enum PluginSetting {
    /// Output of the root hook aggregator
    RootHooks(RootHookSet),
    /// Raw accumulated contributions of a surfaced pass-through kind
    Contributions(Vec<Value>),
    /// Output of a custom aggregator
    Value(Value),
}

impl PluginSetting {
    pub fn as_root_hooks(&self) -> Option<&RootHookSet> {
        match self {
            Self::RootHooks(hooks) => Some(hooks),
            _ => None,
        }
    }

    pub fn as_contributions(&self) -> Option<&[Value]> {
        match self {
            Self::Contributions(values) => Some(values),
            _ => None,
        }
    }

    /// Callable contributions in order
    pub fn functions(&self) -> Vec<Function> {
        self.as_contributions()
            .unwrap_or_default()
            .iter()
            .filter_map(|value| match value {
                Value::Function(func) => Some(func.clone()),
                _ => None,
            })
            .collect()
    }

    fn summary(&self) -> SettingSummary {
        match self {
            Self::RootHooks(hooks) => SettingSummary::RootHooks(RootHookCounts {
                before_all: hooks.before_all.len(),
                before_each: hooks.before_each.len(),
                after_all: hooks.after_all.len(),
                after_each: hooks.after_each.len(),
            }),
            Self::Contributions(values) => SettingSummary::Contributions(values.len()),
            Self::Value(value) => SettingSummary::Value(value.type_name().to_string()),
        }
    }
}

/// Finalized settings keyed by option name, in registration order
#[derive(Debug, Clone, Default)]
pub struct PluginSettings {
    entries: IndexMap<String, PluginSetting>,
}

impl PluginSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, option_name: impl Into<String>, setting: PluginSetting) {
        self.entries.insert(option_name.into(), setting);
    }

    pub fn get(&self, option_name: &str) -> Option<&PluginSetting> {
        self.entries.get(option_name)
    }

    pub fn contains(&self, option_name: &str) -> bool {
        self.entries.contains_key(option_name)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No plugin customised anything
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root_hooks(&self) -> Option<&RootHookSet> {
        self.get(ROOT_HOOKS_OPTION).and_then(PluginSetting::as_root_hooks)
    }

    pub fn global_setup(&self) -> Option<Vec<Function>> {
        self.get(GLOBAL_SETUP_OPTION).map(PluginSetting::functions)
    }

    pub fn global_teardown(&self) -> Option<Vec<Function>> {
        self.get(GLOBAL_TEARDOWN_OPTION).map(PluginSetting::functions)
    }

    /// Serializable overview of what each setting holds
    pub fn summary(&self) -> IndexMap<String, SettingSummary> {
        self.entries
            .iter()
            .map(|(name, setting)| (name.clone(), setting.summary()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootHookCounts {
    pub before_all: usize,
    pub before_each: usize,
    pub after_all: usize,
    pub after_each: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingSummary {
    RootHooks(RootHookCounts),
    Contributions(usize),
    Value(String),
}
