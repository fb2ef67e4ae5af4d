//! Built-in plugin kinds: root hooks and global fixtures

use crate::config::{
    GLOBAL_SETUP_EXPORT, GLOBAL_SETUP_OPTION, GLOBAL_TEARDOWN_EXPORT, GLOBAL_TEARDOWN_OPTION,
    ROOT_HOOKS_EXPORT, ROOT_HOOKS_OPTION,
};
use crate::plugins::contribution::{is_array, is_empty_table, is_object, to_sequence};
use crate::plugins::error::{PluginError, PluginResult};
use crate::plugins::registry::{PassThrough, PluginKindDefinition};
use crate::plugins::root_hooks::aggregate_root_hooks;
use crate::plugins::settings::PluginSetting;
use mlua::Value;

const ROOT_HOOKS_SHAPE: &str = "an object or a function returning (or fulfilling with) an object";
const GLOBAL_FIXTURE_SHAPE: &str = "a function or an array of functions";

/// The kinds every default registry starts with
pub fn builtin_kinds() -> Vec<PluginKindDefinition> {
    vec![root_hooks_kind(), global_setup_kind(), global_teardown_kind()]
}

pub fn root_hooks_kind() -> PluginKindDefinition {
    PluginKindDefinition::new(ROOT_HOOKS_EXPORT)
        .with_option_name(ROOT_HOOKS_OPTION)
        .with_validator(validate_root_hooks)
        .with_finalizer(|contributions| async move {
            aggregate_root_hooks(contributions).await.map(PluginSetting::RootHooks)
        })
}

pub fn global_setup_kind() -> PluginKindDefinition {
    PluginKindDefinition::new(GLOBAL_SETUP_EXPORT)
        .with_option_name(GLOBAL_SETUP_OPTION)
        .with_validator(validate_global_fixture)
        .with_pass_through(PassThrough::Surface)
        .with_empty_table_as_array()
}

pub fn global_teardown_kind() -> PluginKindDefinition {
    PluginKindDefinition::new(GLOBAL_TEARDOWN_EXPORT)
        .with_option_name(GLOBAL_TEARDOWN_OPTION)
        .with_validator(validate_global_fixture)
        .with_pass_through(PassThrough::Surface)
        .with_empty_table_as_array()
}

/// Root hooks must be a hook-set object or a factory, never an array
pub fn validate_root_hooks(export_name: &str, value: &Value) -> PluginResult<()> {
    if value.is_function() || is_object(value) {
        Ok(())
    } else {
        Err(PluginError::unsupported(export_name, ROOT_HOOKS_SHAPE))
    }
}

/// Global fixtures must be a function or an array holding only functions
///
/// `{}` counts as an empty array.
pub fn validate_global_fixture(export_name: &str, value: &Value) -> PluginResult<()> {
    let valid = if is_empty_table(value) {
        true
    } else if is_array(value) {
        to_sequence(value.clone())?.iter().all(Value::is_function)
    } else {
        value.is_function()
    };

    if valid {
        Ok(())
    } else {
        Err(PluginError::unsupported(export_name, GLOBAL_FIXTURE_SHAPE))
    }
}
