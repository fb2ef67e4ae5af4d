//! Plugin system for test-runner extensions
//!
//! User modules are Lua chunks. The table a chunk returns is its export
//! object, and any export named after a registered plugin kind is picked up
//! as a contribution of that kind.
//!
//! # Built-in kinds
//!
//! - `mochaHooks` -> `rootHooks`: hook-set tables (`beforeAll`, `beforeEach`,
//!   `afterAll`, `afterEach`) or functions returning one, merged in load order
//! - `mochaGlobalSetup` -> `globalSetup`: a function or array of functions
//! - `mochaGlobalTeardown` -> `globalTeardown`: a function or array of functions
//!
//! # Pipeline
//!
//! Modules are fed to [`PluginLoader::load`] one at a time, then
//! [`PluginLoader::finalize`] reduces every kind into [`PluginSettings`].
//!
//! # Example module
//!
//! ```lua
//! return {
//!     mochaHooks = function()
//!         sleep(10)
//!         return { beforeEach = function() log_info("starting test") end }
//!     end,
//!     mochaGlobalSetup = { function() end, function() end },
//! }
//! ```

pub mod api;
pub mod contribution;
pub mod error;
pub mod kinds;
pub mod loader;
pub mod observer;
pub mod registry;
pub mod require;
pub mod root_hooks;
pub mod sandbox;
pub mod settings;

pub use error::{PluginError, PluginResult};
pub use loader::PluginLoader;
pub use observer::{LoaderEvent, LoaderObserver, LogObserver};
pub use registry::{PassThrough, PluginKindDefinition, PluginRegistry, default_registry};
pub use require::handle_requires;
pub use root_hooks::{RootHookSet, aggregate_root_hooks};
pub use sandbox::create_plugin_state;
pub use settings::{PluginSetting, PluginSettings};
