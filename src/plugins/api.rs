//! Host APIs available to plugin modules
//!
//! - Logging functions routed through the crate logger
//! - `sleep(ms)`, an async timer that lets hook factories suspend

use mlua::Lua;
use std::time::Duration;

/// Register logging API
///
/// Plugins can log messages that will be handled by the host's logger.
pub fn register_logging_api(lua: &Lua) -> mlua::Result<()> {
    let log_info_fn = lua.create_function(move |_lua, msg: String| {
        crate::log_info!("[plugin] {}", msg);
        Ok(())
    })?;

    let log_warn_fn = lua.create_function(move |_lua, msg: String| {
        crate::log_warn!("[plugin] {}", msg);
        Ok(())
    })?;

    let log_error_fn = lua.create_function(move |_lua, msg: String| {
        crate::log_error!("[plugin] {}", msg);
        Ok(())
    })?;

    lua.globals().set("log_info", log_info_fn)?;
    lua.globals().set("log_warn", log_warn_fn)?;
    lua.globals().set("log_error", log_error_fn)?;

    Ok(())
}

/// Register the async `sleep(ms)` timer
///
/// Only usable from code resumed asynchronously, such as root hook
/// factories during finalization.
pub fn register_timer_api(lua: &Lua) -> mlua::Result<()> {
    let sleep = lua.create_async_function(|_lua, ms: u64| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    })?;

    lua.globals().set("sleep", sleep)?;
    Ok(())
}
