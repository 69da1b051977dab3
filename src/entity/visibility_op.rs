use super::Entity;
use crate::error::EntityError;
use crate::types::{FieldMap, FieldSet, WILDCARD};
use crate::value::{DateLike, Value};
use serde::{Serialize, Serializer};
use smol_str::SmolStr;
use std::fmt;

impl Entity {
    // ════════════════════════════════════════════════════════════════════════
    // Hidden / virtual fields
    // ════════════════════════════════════════════════════════════════════════

    pub fn get_hidden(&self) -> Vec<SmolStr> {
        self.hidden.iter().cloned().collect()
    }

    /// Fields left out of `to_array`/`to_json`.
    pub fn set_hidden<I, S>(&mut self, fields: I, merge: bool) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_set(&mut self.hidden, fields, merge);
        self
    }

    pub fn get_virtual(&self) -> Vec<SmolStr> {
        self.virtual_fields.iter().cloned().collect()
    }

    /// Fields exported even though nothing is stored for them; usually backed
    /// by a get-mutator.
    pub fn set_virtual<I, S>(&mut self, fields: I, merge: bool) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_set(&mut self.virtual_fields, fields, merge);
        self
    }

    /// Stored fields, then virtual fields, minus hidden fields.
    pub fn get_visible(&self) -> Vec<SmolStr> {
        let mut visible: FieldSet = self.fields.keys().cloned().collect();
        visible.extend(self.virtual_fields.iter().cloned());
        visible
            .into_iter()
            .filter(|field| !self.hidden.contains(field))
            .collect()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Mass-assignment guard
    // ════════════════════════════════════════════════════════════════════════

    /// Set whether a field may be written by guarded writes.
    ///
    /// Setting the wildcard `*` drops every per-field override first. A
    /// per-field entry is only kept while it differs from the wildcard.
    pub fn set_access(&mut self, field: &str, accessible: bool) -> &mut Self {
        if field == WILDCARD {
            self.accessible.clear();
        }

        let default = *self
            .accessible
            .entry(SmolStr::new_static(WILDCARD))
            .or_insert(true);

        if accessible != default {
            self.accessible.insert(SmolStr::new(field), accessible);
        } else if field != WILDCARD {
            self.accessible.shift_remove(field);
        }
        self
    }

    #[inline]
    pub fn get_accessible(&self) -> &FieldMap<bool> {
        &self.accessible
    }

    pub fn is_accessible(&self, field: &str) -> bool {
        self.accessible
            .get(field)
            .or_else(|| self.accessible.get(WILDCARD))
            .copied()
            .unwrap_or(false)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Export
    // ════════════════════════════════════════════════════════════════════════

    /// Visible fields with their (mutated) values. Nested entities become
    /// maps. With `convert_objects`, dates render as ISO-8601 strings and
    /// opaque objects through their string or JSON capability.
    pub fn to_array(&self, convert_objects: bool) -> FieldMap<Value> {
        self.get_visible()
            .into_iter()
            .map(|field| {
                let value = self.get(&field).unwrap_or_default();
                (field, export_value(value, convert_objects))
            })
            .collect()
    }

    /// Pretty-printed JSON of `to_array(true)`.
    pub fn try_to_json(&self) -> Result<String, EntityError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Like [`try_to_json`](Self::try_to_json), yielding an empty string on
    /// failure.
    pub fn to_json(&self) -> String {
        self.try_to_json().unwrap_or_default()
    }
}

fn replace_set<I, S>(set: &mut FieldSet, fields: I, merge: bool)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if !merge {
        set.clear();
    }
    set.extend(fields.into_iter().map(|f| SmolStr::new(f.as_ref())));
}

fn export_value(value: Value, convert_objects: bool) -> Value {
    match value {
        Value::Entity(entity) => Value::Map(entity.borrow().to_array(convert_objects)),
        Value::DateTime(dt) if convert_objects => Value::Str(dt.to_iso_string().into()),
        Value::Object(obj) if convert_objects => {
            if let Some(text) = obj.to_display() {
                Value::Str(text.into())
            } else if let Some(json) = obj.to_json() {
                Value::from(json)
            } else {
                Value::Object(obj)
            }
        }
        Value::List(list) => Value::List(
            list.into_iter()
                .map(|item| export_element(item, convert_objects))
                .collect(),
        ),
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(key, item)| (key, export_element(item, convert_objects)))
                .collect(),
        ),
        other => other,
    }
}

fn export_element(item: Value, convert_objects: bool) -> Value {
    match item {
        Value::Entity(entity) => Value::Map(entity.borrow().to_array(convert_objects)),
        other => other,
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array(true).serialize(serializer)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}
