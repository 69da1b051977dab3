use super::Entity;
use crate::types::{ErrorMap, ErrorMode, FieldErrors, FieldMap, PATH_SEPARATOR};
use crate::value::Value;
use smol_str::SmolStr;

impl Entity {
    // ════════════════════════════════════════════════════════════════════════
    // Errors
    // ════════════════════════════════════════════════════════════════════════

    /// Record error messages for a field.
    pub fn set_error<I, S>(&mut self, field: &str, errors: I, mode: ErrorMode) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let errors = errors.into_iter().map(Into::into);
        match mode {
            ErrorMode::Replace => {
                self.errors.insert(SmolStr::new(field), errors.collect());
            }
            ErrorMode::Append => {
                self.errors
                    .entry(SmolStr::new(field))
                    .or_default()
                    .extend(errors);
            }
        }
        self
    }

    pub fn set_errors<I, K, E, S>(&mut self, errors: I, mode: ErrorMode) -> &mut Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: AsRef<str>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (field, list) in errors {
            self.set_error(field.as_ref(), list, mode);
        }
        self
    }

    /// Errors for one field.
    ///
    /// Explicit errors win. Otherwise a plain name reads the errors of the
    /// nested entity (or entities) held by the field, and a dotted path such as
    /// `"author.name"` walks nested values down to the last segment.
    pub fn get_error(&self, field: &str) -> FieldErrors {
        if let Some(errors) = self.errors.get(field) {
            return FieldErrors::Messages(errors.clone());
        }

        if !field.contains(PATH_SEPARATOR) {
            let value = self.get(field).unwrap_or_default();
            return read_error(&value, None);
        }

        self.read_nested_errors(field)
    }

    /// Explicit errors followed by errors derived from nested entities of
    /// fields that have none of their own.
    pub fn get_errors(&self) -> ErrorMap {
        let mut result: ErrorMap = self
            .errors
            .iter()
            .map(|(field, list)| (field.clone(), FieldErrors::Messages(list.clone())))
            .collect();

        for (field, value) in &self.fields {
            if self.errors.contains_key(field) {
                continue;
            }
            let errors = read_error(value, None);
            if !errors.is_empty() {
                result.insert(field.clone(), errors);
            }
        }

        result
    }

    pub fn has_errors(&self, include_nested: bool) -> bool {
        if !self.errors.is_empty() {
            return true;
        }

        include_nested && self.fields.values().any(check_error)
    }

    fn read_nested_errors(&self, path: &str) -> FieldErrors {
        let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let Some(last) = segments.pop() else {
            return FieldErrors::default();
        };

        let mut current: Option<Value> = None;
        for segment in segments {
            let next = match &current {
                None => self.get(segment),
                Some(Value::Entity(entity)) => entity.borrow().get(segment),
                Some(Value::Map(map)) => map.get(segment).cloned(),
                Some(Value::List(list)) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| list.get(i).cloned()),
                Some(_) => None,
            };

            match next {
                Some(value) if value.is_truthy() => current = Some(value),
                _ => return FieldErrors::default(),
            }
        }

        read_error(&current.unwrap_or_default(), Some(last))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Invalid input
    // ════════════════════════════════════════════════════════════════════════

    /// Keep a rejected raw input value. Without `overwrite` an existing value
    /// is kept.
    pub fn set_invalid(&mut self, field: &str, value: impl Into<Value>, overwrite: bool) -> &mut Self {
        let field = SmolStr::new(field);
        if overwrite || !self.invalid.contains_key(&field) {
            self.invalid.insert(field, value.into());
        }
        self
    }

    #[inline]
    pub fn get_invalid(&self, field: &str) -> Option<&Value> {
        self.invalid.get(field)
    }

    #[inline]
    pub fn get_invalid_map(&self) -> &FieldMap<Value> {
        &self.invalid
    }

    pub fn fill_invalid<I, K, V>(&mut self, data: I, overwrite: bool) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (field, value) in data {
            self.set_invalid(field.as_ref(), value, overwrite);
        }
        self
    }
}

// ─── Nested error helpers ───────────────────────────────────────────────────

fn entity_errors(value: &Value, field: Option<&str>) -> Option<FieldErrors> {
    let entity = value.as_entity()?;
    let entity = entity.borrow();
    Some(match field {
        Some(field) => entity.get_error(field),
        None => FieldErrors::Nested(entity.get_errors()),
    })
}

/// Errors held by a value: a nested entity's own errors, or the non-empty
/// errors of each entity in a collection keyed by index (lists) or key (maps).
fn read_error(value: &Value, field: Option<&str>) -> FieldErrors {
    let collected: ErrorMap = match value {
        Value::Entity(_) => {
            return entity_errors(value, field)
                .filter(|errors| !errors.is_empty())
                .unwrap_or_default();
        }
        Value::List(list) => list
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let errors = entity_errors(item, field)?;
                (!errors.is_empty()).then(|| (SmolStr::new(i.to_string()), errors))
            })
            .collect(),
        Value::Map(map) => map
            .iter()
            .filter_map(|(key, item)| {
                let errors = entity_errors(item, field)?;
                (!errors.is_empty()).then(|| (key.clone(), errors))
            })
            .collect(),
        _ => return FieldErrors::default(),
    };

    if collected.is_empty() {
        FieldErrors::default()
    } else {
        FieldErrors::Nested(collected)
    }
}

fn check_error(value: &Value) -> bool {
    match value {
        Value::Entity(entity) => entity.borrow().has_errors(true),
        Value::List(list) => list.iter().any(check_error),
        Value::Map(map) => map.values().any(check_error),
        _ => false,
    }
}
