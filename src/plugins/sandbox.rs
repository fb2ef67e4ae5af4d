//! Security sandbox for plugin modules
//!
//! This module creates the Lua environment user modules are evaluated in.
//! It strips the libraries that reach outside the process and registers
//! the host API plugins may call.

use crate::config::LUA_MEMORY_LIMIT;
use crate::plugins::api::{register_logging_api, register_timer_api};
use mlua::{Lua, Table, Value};

/// Create the Lua state plugin modules run in
///
/// This function:
/// - Removes dangerous libraries (os, io, load, etc.)
/// - Restricts native library loading
/// - Sets a memory limit
/// - Registers the host API (logging, timers)
pub fn create_plugin_state() -> mlua::Result<Lua> {
    let lua = Lua::new();

    // Remove dangerous libraries
    lua.globals().set("os", Value::Nil)?;
    lua.globals().set("io", Value::Nil)?;
    lua.globals().set("load", Value::Nil)?;
    lua.globals().set("loadfile", Value::Nil)?;
    lua.globals().set("dofile", Value::Nil)?;
    lua.globals().set("debug", Value::Nil)?;

    if let Ok(package) = lua.globals().get::<Table>("package") {
        package.set("loadlib", Value::Nil)?;
        package.set("cpath", Value::Nil)?;
    }

    lua.set_memory_limit(LUA_MEMORY_LIMIT)?;

    register_logging_api(&lua)?;
    register_timer_api(&lua)?;

    // print goes to the logger instead of stdout
    let log_info = lua.globals().get::<mlua::Function>("log_info")?;
    lua.globals().set("print", log_info)?;

    Ok(lua)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_blocks_dangerous_libs() {
        let lua = create_plugin_state().unwrap();

        for name in ["os", "io", "load", "loadfile", "dofile", "debug"] {
            assert!(lua.globals().get::<Value>(name).unwrap().is_nil(), "{name} should be removed");
        }

        let package: Table = lua.globals().get("package").unwrap();
        assert!(package.get::<Value>("loadlib").unwrap().is_nil());
    }

    #[test]
    fn test_sandbox_allows_host_api() {
        let lua = create_plugin_state().unwrap();

        for name in ["log_info", "log_warn", "log_error", "print", "sleep"] {
            assert!(
                lua.globals().get::<Value>(name).unwrap().is_function(),
                "{name} should be available"
            );
        }
    }

    #[test]
    fn test_sandbox_keeps_pure_libraries() {
        let lua = create_plugin_state().unwrap();
        let joined: String = lua
            .load(r#"return table.concat({ string.upper("a"), tostring(math.max(1, 2)) }, ",")"#)
            .eval()
            .unwrap();
        assert_eq!(joined, "A,2");
    }
}
