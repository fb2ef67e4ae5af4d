// Plugin Loader - Contribution Shapes
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Helpers for the shapes a plugin contribution can take
//!
//! A contribution exported by a module is a function, an object (a table with
//! an empty sequence part) or an array (a table with a non-empty sequence
//! part). Everything downstream works on ordered sequences, so values are
//! coerced once with [`to_sequence`] at the accumulation boundary.

use mlua::{Table, Value};

/// Lua truthiness: everything except `nil` and `false`
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Boolean(false))
}

/// Whether the value is a table used as an array
pub fn is_array(value: &Value) -> bool {
    match value {
        Value::Table(table) => table.raw_len() > 0,
        _ => false,
    }
}

/// Whether the value is a table used as an object
pub fn is_object(value: &Value) -> bool {
    matches!(value, Value::Table(_)) && !is_array(value)
}

/// Whether the value is a table with no entries at all
pub fn is_empty_table(value: &Value) -> bool {
    match value {
        Value::Table(table) => table.pairs::<Value, Value>().next().is_none(),
        _ => false,
    }
}

/// Coerce a contribution to an ordered sequence
///
/// Arrays yield their elements in order; any other value becomes a
/// one-element sequence.
pub fn to_sequence(value: Value) -> mlua::Result<Vec<Value>> {
    match value {
        Value::Table(ref table) if table.raw_len() > 0 => sequence_values(table),
        other => Ok(vec![other]),
    }
}

fn sequence_values(table: &Table) -> mlua::Result<Vec<Value>> {
    let len = table.raw_len();
    let mut values = Vec::with_capacity(len);
    for index in 1..=len {
        values.push(table.raw_get::<Value>(index)?);
    }
    Ok(values)
}
