use super::Entity;
use crate::types::{Direction, FieldMap, SetOptions};
use crate::value::Value;
use smol_str::SmolStr;
use tracing::trace;

impl Entity {
    // ════════════════════════════════════════════════════════════════════════
    // Reads
    // ════════════════════════════════════════════════════════════════════════

    /// Current value of a field, passed through its get-mutator if the entity
    /// type defines one. `None` means the field is not set at all, which is
    /// distinct from `Some(Value::Null)`.
    ///
    /// A get-mutator runs on every call and receives `Value::Null` for a
    /// missing field. A missing field stays `None` unless the mutator derives
    /// a non-null value for it.
    pub fn get(&self, field: &str) -> Option<Value> {
        let raw = self.fields.get(field);
        let Some(hook) = self.class.mutator(Direction::Get, field) else {
            return raw.cloned();
        };
        match raw {
            Some(value) => Some(hook(self, value.clone())),
            None => Some(hook(self, Value::Null)).filter(|value| !value.is_null()),
        }
    }

    /// Stored value, without mutators.
    #[inline]
    pub fn get_raw(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Key presence, regardless of value.
    #[inline]
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Present and not null, `""` or an empty collection.
    pub fn has_value(&self, field: &str) -> bool {
        !self.is_field_empty(field)
    }

    pub fn is_field_empty(&self, field: &str) -> bool {
        self.fields.get(field).is_none_or(Value::is_empty)
    }

    /// True when every field is empty (or there are none).
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(Value::is_empty)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<SmolStr> {
        self.fields.keys().cloned().collect()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Writes
    // ════════════════════════════════════════════════════════════════════════

    /// Unguarded write with mutators enabled.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.set_with(field, value, SetOptions::default())
    }

    /// Write one field.
    ///
    /// A guarded write to an inaccessible field is skipped. Writing a value
    /// that is the same as the stored one changes nothing. Otherwise the field
    /// becomes dirty, loses its errors and invalid input, and (if it is
    /// original-tracked) its prior value is kept as the original. Writing the
    /// kept original back clears the dirty and temporary flags again.
    pub fn set_with(&mut self, field: &str, value: impl Into<Value>, options: SetOptions) -> &mut Self {
        if options.guard && !self.is_accessible(field) {
            trace!(field, "guarded write skipped");
            return self;
        }

        let mut value = value.into();
        if options.mutate {
            if let Some(hook) = self.class.mutator(Direction::Set, field) {
                value = hook(self, value);
            }
        }

        let field = SmolStr::new(field);
        if options.original {
            self.original_fields.insert(field.clone());
        }

        let Some(current) = self.fields.get(&field) else {
            self.set_dirty(&field, true);
            if options.temporary {
                self.temporary_fields.insert(field.clone());
            }
            self.fields.insert(field, value);
            return self;
        };

        if current.is_same(&value) {
            return self;
        }

        if self.original_fields.contains(&field) && !self.original.contains_key(&field) {
            let prior = current.clone();
            self.original.insert(field.clone(), prior);
        }

        self.set_dirty(&field, true);

        // back at its baseline: nothing left to track or roll back
        if self.original.get(&field).is_some_and(|orig| orig.is_same(&value)) {
            self.original.shift_remove(&field);
            self.dirty.shift_remove(&field);
            self.temporary_fields.shift_remove(&field);
        } else if options.temporary {
            self.temporary_fields.insert(field.clone());
        }
        self.fields.insert(field, value);
        self
    }

    /// Guarded bulk write.
    pub fn fill<I, K, V>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.fill_with(data, SetOptions::guarded())
    }

    pub fn fill_with<I, K, V>(&mut self, data: I, options: SetOptions) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (field, value) in data {
            self.set_with(field.as_ref(), value, options);
        }
        self
    }

    /// Remove a field together with its original value and dirty flag.
    pub fn unset(&mut self, field: &str) -> &mut Self {
        self.fields.shift_remove(field);
        self.original.shift_remove(field);
        self.dirty.shift_remove(field);
        self
    }

    pub fn clear<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            self.unset(field.as_ref());
        }
        self
    }

    // ════════════════════════════════════════════════════════════════════════
    // Extraction
    // ════════════════════════════════════════════════════════════════════════

    /// Current values for the named fields; missing fields map to null.
    pub fn extract<I, S>(&self, fields: I) -> FieldMap<Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|field| {
                let field = field.as_ref();
                (SmolStr::new(field), self.get(field).unwrap_or_default())
            })
            .collect()
    }

    /// Current values of every dirty field.
    pub fn extract_dirty(&self) -> FieldMap<Value> {
        self.extract_dirty_fields(self.get_dirty())
    }

    /// Current values of the named fields that are dirty.
    pub fn extract_dirty_fields<I, S>(&self, fields: I) -> FieldMap<Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .filter(|field| self.is_field_dirty(field.as_ref()))
            .map(|field| {
                let field = field.as_ref();
                (SmolStr::new(field), self.get(field).unwrap_or_default())
            })
            .collect()
    }

    /// Original values (falling back to current) for the named fields.
    pub fn extract_original<I, S>(&self, fields: I) -> FieldMap<Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|field| {
                let field = field.as_ref();
                (SmolStr::new(field), self.get_original(field).unwrap_or_default())
            })
            .collect()
    }

    /// Original values of the named fields whose original differs from the
    /// current value.
    pub fn extract_original_changed<I, S>(&self, fields: I) -> FieldMap<Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = FieldMap::default();
        for field in fields {
            let field = field.as_ref();
            let Some(original) = self.original.get(field) else {
                continue;
            };
            let changed = self
                .fields
                .get(field)
                .is_none_or(|current| !current.is_same(original));
            if changed {
                result.insert(SmolStr::new(field), original.clone());
            }
        }
        result
    }
}
