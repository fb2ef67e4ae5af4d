// Plugin Loader - Root Hook Aggregation
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Root hook aggregation
//!
//! Root hook contributions are either hook-set tables or factory functions
//! producing one. Factories are resolved concurrently, then every resolved
//! set is merged in contribution order into a single [`RootHookSet`].

use crate::config::ROOT_HOOKS_EXPORT;
use crate::plugins::contribution::to_sequence;
use crate::plugins::error::{PluginError, PluginResult};
use futures::future::try_join_all;
use mlua::{Function, Table, Value};

pub const BEFORE_ALL: &str = "beforeAll";
pub const BEFORE_EACH: &str = "beforeEach";
pub const AFTER_ALL: &str = "afterAll";
pub const AFTER_EACH: &str = "afterEach";

/// Merged root hooks, one ordered list per lifecycle slot
#[derive(Debug, Clone, Default)]
pub struct RootHookSet {
    pub before_all: Vec<Function>,
    pub before_each: Vec<Function>,
    pub after_all: Vec<Function>,
    pub after_each: Vec<Function>,
}

impl RootHookSet {
    /// Read a resolved hook-set table; missing slots stay empty
    pub fn from_table(table: &Table) -> PluginResult<Self> {
        Ok(Self {
            before_all: slot_functions(table, BEFORE_ALL)?,
            before_each: slot_functions(table, BEFORE_EACH)?,
            after_all: slot_functions(table, AFTER_ALL)?,
            after_each: slot_functions(table, AFTER_EACH)?,
        })
    }

    /// Append another set after this one, slot by slot
    pub fn extend(&mut self, other: RootHookSet) {
        self.before_all.extend(other.before_all);
        self.before_each.extend(other.before_each);
        self.after_all.extend(other.after_all);
        self.after_each.extend(other.after_each);
    }

    /// Total number of hooks across all slots
    pub fn len(&self) -> usize {
        self.before_all.len()
            + self.before_each.len()
            + self.after_all.len()
            + self.after_each.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn slot_functions(table: &Table, slot: &str) -> PluginResult<Vec<Function>> {
    let value: Value = table.get(slot)?;
    if value.is_nil() {
        return Ok(Vec::new());
    }

    to_sequence(value)?
        .into_iter()
        .map(|hook| match hook {
            Value::Function(func) => Ok(func),
            other => Err(PluginError::InvalidHookSet {
                slot: slot.to_string(),
                found: other.type_name(),
            }),
        })
        .collect()
}

/// Turn one contribution into a hook set, calling it first if it is a factory
async fn resolve_contribution(contribution: Value) -> PluginResult<RootHookSet> {
    let resolved = match contribution {
        Value::Function(factory) => factory
            .call_async::<Value>(())
            .await
            .map_err(|source| PluginError::Contributor {
                export_name: ROOT_HOOKS_EXPORT.to_string(),
                source,
            })?,
        other => other,
    };

    match resolved {
        Value::Nil => Ok(RootHookSet::default()),
        Value::Table(table) => RootHookSet::from_table(&table),
        other => Err(PluginError::InvalidFactoryResult {
            export_name: ROOT_HOOKS_EXPORT.to_string(),
            found: other.type_name(),
        }),
    }
}

/// Merge root hook contributions into one set
///
/// All contributions resolve concurrently; the merge follows contribution
/// order, never completion order. The first failure aborts the whole merge.
pub async fn aggregate_root_hooks(contributions: Vec<Value>) -> PluginResult<RootHookSet> {
    let resolved = try_join_all(contributions.into_iter().map(resolve_contribution)).await?;

    let mut merged = RootHookSet::default();
    for hooks in resolved {
        merged.extend(hooks);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::sandbox::create_plugin_state;
    use mlua::Lua;
    use std::time::{Duration, Instant};

    fn names(hooks: &[Function]) -> Vec<String> {
        hooks.iter().map(|hook| hook.call::<String>(()).unwrap()).collect()
    }

    fn contributions(lua: &Lua, code: &str) -> Vec<Value> {
        let table: Table = lua.load(code).eval().unwrap();
        to_sequence(Value::Table(table)).unwrap()
    }

    #[tokio::test]
    async fn test_mixed_contributions_merge_in_order() {
        let lua = create_plugin_state().unwrap();
        let input = contributions(
            &lua,
            r#"
            local function named(n) return function() return n end end
            return {
                { beforeEach = named("a") },
                { afterAll = named("b") },
                function() return { beforeAll = named("d"), beforeEach = named("g") } end,
                function()
                    sleep(10)
                    return { afterEach = named("f") }
                end,
            }
            "#,
        );

        let hooks = aggregate_root_hooks(input).await.unwrap();
        assert_eq!(names(&hooks.before_all), vec!["d"]);
        assert_eq!(names(&hooks.before_each), vec!["a", "g"]);
        assert_eq!(names(&hooks.after_all), vec!["b"]);
        assert_eq!(names(&hooks.after_each), vec!["f"]);
        assert_eq!(hooks.len(), 5);
    }

    #[tokio::test]
    async fn test_merge_order_ignores_completion_order() {
        let lua = create_plugin_state().unwrap();
        let input = contributions(
            &lua,
            r#"
            local function delayed(ms, n)
                return function()
                    sleep(ms)
                    return { beforeEach = function() return n end }
                end
            end
            return { delayed(60, "first"), delayed(30, "second"), delayed(0, "third") }
            "#,
        );

        let hooks = aggregate_root_hooks(input).await.unwrap();
        assert_eq!(names(&hooks.before_each), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_factories_resolve_concurrently() {
        let lua = create_plugin_state().unwrap();
        let input = contributions(
            &lua,
            r#"
            local function slow(n)
                return function()
                    sleep(200)
                    return { beforeAll = function() return n end }
                end
            end
            return { slow("a"), slow("b"), slow("c") }
            "#,
        );

        let started = Instant::now();
        let hooks = aggregate_root_hooks(input).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(200), "resolved in {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "resolved in {elapsed:?}");
        assert_eq!(names(&hooks.before_all), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_array_valued_slots_are_concatenated() {
        let lua = Lua::new();
        let input = contributions(
            &lua,
            r#"
            local function named(n) return function() return n end end
            return {
                { afterEach = { named("x"), named("y") } },
                { afterEach = named("z") },
            }
            "#,
        );

        let hooks = aggregate_root_hooks(input).await.unwrap();
        assert_eq!(names(&hooks.after_each), vec!["x", "y", "z"]);
        assert!(hooks.before_all.is_empty());
    }

    #[tokio::test]
    async fn test_factory_returning_nil_is_empty() {
        let lua = Lua::new();
        let input = contributions(&lua, "return { function() return nil end }");
        let hooks = aggregate_root_hooks(input).await.unwrap();
        assert!(hooks.is_empty());
    }

    #[tokio::test]
    async fn test_failing_factory_propagates() {
        let lua = Lua::new();
        let input = contributions(
            &lua,
            r#"
            return {
                { beforeAll = function() end },
                function() error("boom") end,
            }
            "#,
        );

        let err = aggregate_root_hooks(input).await.unwrap_err();
        assert!(matches!(err, PluginError::Contributor { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_non_function_hook_is_rejected() {
        let lua = Lua::new();
        let input = contributions(&lua, r#"return { { beforeEach = "not a hook" } }"#);
        let err = aggregate_root_hooks(input).await.unwrap_err();
        match err {
            PluginError::InvalidHookSet { slot, found } => {
                assert_eq!(slot, BEFORE_EACH);
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_factory_returning_scalar_is_rejected() {
        let lua = Lua::new();
        let input = contributions(&lua, "return { function() return 42 end }");
        let err = aggregate_root_hooks(input).await.unwrap_err();
        assert!(matches!(
            err,
            PluginError::InvalidFactoryResult { ref export_name, found: "integer" }
                if export_name == ROOT_HOOKS_EXPORT
        ));
        assert_eq!(err.to_string(), "mochaHooks factory must return an object, got integer");
    }
}
