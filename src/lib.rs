//! # Plugin Loader Library
//!
//! Plugin registry and loader for a test runner. User modules are Lua chunks;
//! the table each one returns is scanned for known plugin kinds:
//! - Root hooks (`mochaHooks`): callbacks run around every test, merged
//!   from every module in load order
//! - Global fixtures (`mochaGlobalSetup`, `mochaGlobalTeardown`): callbacks
//!   run once per run
//!
//! Additional kinds are added by registering a [`PluginKindDefinition`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use plugin_loader::{create_plugin_state, load_plugins};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let lua = create_plugin_state()?;
//!     let settings = load_plugins(&lua, &[PathBuf::from("test/hooks.lua")]).await?;
//!     if let Some(hooks) = settings.root_hooks() {
//!         println!("{} root hooks", hooks.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod plugins;

pub use plugins::{
    LoaderEvent, LoaderObserver, LogObserver, PassThrough, PluginError, PluginKindDefinition,
    PluginLoader, PluginRegistry, PluginResult, PluginSetting, PluginSettings, RootHookSet,
    create_plugin_state, default_registry,
};

use std::path::PathBuf;

/// Require the given modules with the built-in kinds and return the finalized settings
///
/// This is the main entry point for using this crate as a library.
pub async fn load_plugins(lua: &mlua::Lua, requires: &[PathBuf]) -> PluginResult<PluginSettings> {
    plugins::handle_requires(lua, requires, &[], None).await
}
