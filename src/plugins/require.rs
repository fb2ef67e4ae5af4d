//! Module requiring
//!
//! This module resolves module paths, evaluates them in a plugin Lua state
//! and feeds their exports to a [`PluginLoader`] one at a time.

use crate::config::MODULE_EXTENSION;
use crate::plugins::error::{PluginError, PluginResult};
use crate::plugins::loader::PluginLoader;
use crate::plugins::observer::LoaderObserver;
use crate::plugins::settings::PluginSettings;
use mlua::{Lua, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolve a required module to a file
///
/// The path is used as given when it exists, otherwise the `.lua`
/// extension is tried.
pub fn resolve_module_path(module: &Path) -> PluginResult<PathBuf> {
    if module.is_file() {
        return Ok(module.to_path_buf());
    }

    let with_extension = module.with_extension(MODULE_EXTENSION);
    if module.extension().is_none() && with_extension.is_file() {
        return Ok(with_extension);
    }

    Err(PluginError::ModuleNotFound {
        path: module.to_path_buf(),
    })
}

/// Evaluate a module file and return what it exports
pub fn require_module(lua: &Lua, path: &Path) -> PluginResult<Value> {
    let code = fs::read_to_string(path).map_err(|source| PluginError::ModuleRead {
        path: path.to_path_buf(),
        source,
    })?;

    lua.load(&code)
        .set_name(format!("@{}", path.display()))
        .eval::<Value>()
        .map_err(|source| PluginError::ModuleEval {
            path: path.to_path_buf(),
            source,
        })
}

/// Require every module in order and finalize the plugins they export
///
/// Export names in `ignored` are not recognised as plugins.
pub async fn handle_requires(
    lua: &Lua,
    requires: &[PathBuf],
    ignored: &[String],
    observer: Option<Arc<dyn LoaderObserver>>,
) -> PluginResult<PluginSettings> {
    let mut loader = PluginLoader::new().ignore(ignored.iter().cloned());
    if let Some(observer) = observer {
        loader = loader.with_observer(observer);
    }

    for module in requires {
        let path = resolve_module_path(module)?;
        let exports = require_module(lua, &path)?;

        if loader.load(&exports)? {
            crate::log_debug!("Found plugin implementations in {}", path.display());
        }
        crate::log_debug!("Loaded required module {}", module.display());
    }

    let settings = loader.finalize().await?;
    if !settings.is_empty() {
        crate::log_debug!("Finalized plugin settings: {}", settings.keys().join(", "));
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GLOBAL_SETUP_EXPORT, GLOBAL_SETUP_OPTION, ROOT_HOOKS_OPTION};
    use crate::plugins::sandbox::create_plugin_state;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_module(dir: &TempDir, name: &str, code: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{code}").unwrap();
        path
    }

    #[test]
    fn test_resolve_adds_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_module(&temp_dir, "hooks.lua", "return {}");

        assert_eq!(resolve_module_path(&path).unwrap(), path);
        assert_eq!(resolve_module_path(&temp_dir.path().join("hooks")).unwrap(), path);
    }

    #[test]
    fn test_resolve_missing_module() {
        let temp_dir = TempDir::new().unwrap();
        let err = resolve_module_path(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, PluginError::ModuleNotFound { .. }));
    }

    #[test]
    fn test_require_module_syntax_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_module(&temp_dir, "broken.lua", "return {");
        let lua = create_plugin_state().unwrap();

        let err = require_module(&lua, &path).unwrap_err();
        assert!(matches!(err, PluginError::ModuleEval { .. }));
    }

    #[tokio::test]
    async fn test_handle_requires_loads_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let first = write_module(
            &temp_dir,
            "first.lua",
            r#"return { mochaHooks = { beforeEach = function() return "first" end } }"#,
        );
        let helper = write_module(&temp_dir, "helper.lua", "return 42");
        let second = write_module(
            &temp_dir,
            "second.lua",
            r#"
            return {
                mochaHooks = function()
                    sleep(5)
                    return { beforeEach = function() return "second" end }
                end,
                mochaGlobalSetup = function() end,
            }
            "#,
        );

        let lua = create_plugin_state().unwrap();
        let settings = handle_requires(&lua, &[first, helper, second], &[], None)
            .await
            .unwrap();

        assert_eq!(settings.keys(), vec![ROOT_HOOKS_OPTION, GLOBAL_SETUP_OPTION]);
        let order: Vec<String> = settings
            .root_hooks()
            .unwrap()
            .before_each
            .iter()
            .map(|hook| hook.call::<String>(()).unwrap())
            .collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_handle_requires_honours_ignore_list() {
        let temp_dir = TempDir::new().unwrap();
        let fixture = write_module(
            &temp_dir,
            "fixture.lua",
            "return { mochaGlobalSetup = function() end }",
        );

        let lua = create_plugin_state().unwrap();
        let settings = handle_requires(&lua, &[fixture], &[GLOBAL_SETUP_EXPORT.to_string()], None)
            .await
            .unwrap();
        assert!(settings.is_empty());
    }

    #[tokio::test]
    async fn test_handle_requires_stops_on_invalid_module() {
        let temp_dir = TempDir::new().unwrap();
        let invalid = write_module(
            &temp_dir,
            "invalid.lua",
            "return { mochaGlobalTeardown = { 1, 2 } }",
        );

        let lua = create_plugin_state().unwrap();
        let err = handle_requires(&lua, &[invalid], &[], None).await.unwrap_err();
        assert!(matches!(err, PluginError::Unsupported { .. }));
    }
}
