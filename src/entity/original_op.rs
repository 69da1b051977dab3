use super::{Entity, EntityState};
use crate::error::EntityError;
use crate::types::FieldMap;
use crate::value::Value;
use smol_str::SmolStr;
use tracing::trace;

impl Entity {
    // ════════════════════════════════════════════════════════════════════════
    // Dirty tracking
    // ════════════════════════════════════════════════════════════════════════

    /// True if any field is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    #[inline]
    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    /// Dirty field names, in the order they became dirty.
    pub fn get_dirty(&self) -> Vec<SmolStr> {
        self.dirty.iter().cloned().collect()
    }

    /// Marking a field clean makes it original-tracked; a captured original
    /// stays retrievable. Marking it dirty drops its errors and invalid input.
    pub fn set_dirty(&mut self, field: &str, dirty: bool) -> &mut Self {
        if dirty {
            self.dirty.insert(SmolStr::new(field));
            self.errors.shift_remove(field);
            self.invalid.shift_remove(field);
        } else {
            self.dirty.shift_remove(field);
            self.original_fields.insert(SmolStr::new(field));
        }
        self
    }

    // ════════════════════════════════════════════════════════════════════════
    // Original values
    // ════════════════════════════════════════════════════════════════════════

    /// Captured original, or the stored value when none was captured.
    pub fn get_original(&self, field: &str) -> Option<Value> {
        self.original
            .get(field)
            .or_else(|| self.fields.get(field))
            .cloned()
    }

    /// Captured original only.
    pub fn get_original_strict(&self, field: &str) -> Result<Value, EntityError> {
        self.original
            .get(field)
            .cloned()
            .ok_or_else(|| EntityError::NoOriginal {
                field: SmolStr::new(field),
            })
    }

    /// Every field with captured originals laid over the current values.
    pub fn get_originals(&self) -> FieldMap<Value> {
        let mut result = self.fields.clone();
        for (field, value) in &self.original {
            result.insert(field.clone(), value.clone());
        }
        result
    }

    /// Original-tracked fields with their original (or, if unchanged,
    /// current) values.
    pub fn get_original_values(&self) -> FieldMap<Value> {
        self.fields
            .iter()
            .filter(|(field, _)| self.original_fields.contains(*field))
            .map(|(field, value)| {
                let value = self.original.get(field).unwrap_or(value);
                (field.clone(), value.clone())
            })
            .collect()
    }

    #[inline]
    pub fn has_original(&self, field: &str) -> bool {
        self.original.contains_key(field)
    }

    #[inline]
    pub fn is_original_field(&self, field: &str) -> bool {
        self.original_fields.contains(field)
    }

    pub fn get_original_fields(&self) -> Vec<SmolStr> {
        self.original_fields.iter().cloned().collect()
    }

    /// Mark fields as original-tracked, merging with (or replacing) the
    /// current set.
    pub fn set_original_fields<I, S>(&mut self, fields: I, overwrite: bool) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if overwrite {
            self.original_fields.clear();
        }
        self.original_fields
            .extend(fields.into_iter().map(|f| SmolStr::new(f.as_ref())));
        self
    }

    // ════════════════════════════════════════════════════════════════════════
    // Temporary fields
    // ════════════════════════════════════════════════════════════════════════

    pub fn get_temporary_fields(&self) -> Vec<SmolStr> {
        self.temporary_fields.iter().cloned().collect()
    }

    pub fn set_temporary_fields<I, S>(&mut self, fields: I, overwrite: bool) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if overwrite {
            self.temporary_fields.clear();
        }
        self.temporary_fields
            .extend(fields.into_iter().map(|f| SmolStr::new(f.as_ref())));
        self
    }

    /// Roll back every temporary field: restore its original if one was
    /// captured, otherwise remove it. Its original, invalid input and dirty
    /// flag are dropped either way.
    pub fn clear_temporary_fields(&mut self) -> &mut Self {
        let temporary = std::mem::take(&mut self.temporary_fields);
        for field in &temporary {
            match self.original.shift_remove(field) {
                Some(original) => {
                    self.fields.insert(field.clone(), original);
                }
                None => {
                    self.fields.shift_remove(field);
                }
            }
            self.invalid.shift_remove(field);
            self.dirty.shift_remove(field);
        }
        trace!(count = temporary.len(), "temporary fields rolled back");
        self
    }

    // ════════════════════════════════════════════════════════════════════════
    // State snapshot
    // ════════════════════════════════════════════════════════════════════════

    /// Snapshot fields, originals, dirty flags, errors, invalid input,
    /// temporary fields and the new flag. A later call replaces the previous snapshot.
    pub fn save_state(&mut self) -> &mut Self {
        self.saved_state = Some(Box::new(EntityState {
            fields: self.fields.clone(),
            original: self.original.clone(),
            dirty: self.dirty.clone(),
            errors: self.errors.clone(),
            invalid: self.invalid.clone(),
            temporary_fields: self.temporary_fields.clone(),
            new: self.new,
        }));
        self
    }

    /// Restore the last snapshot; the current errors are kept when
    /// `restore_errors` is false. Does nothing without a snapshot.
    pub fn restore_state(&mut self, restore_errors: bool) -> &mut Self {
        let Some(state) = self.saved_state.as_deref() else {
            return self;
        };

        self.fields = state.fields.clone();
        self.original = state.original.clone();
        self.dirty = state.dirty.clone();
        self.invalid = state.invalid.clone();
        self.temporary_fields = state.temporary_fields.clone();
        self.new = state.new;
        if restore_errors {
            self.errors = state.errors.clone();
        }
        trace!(restore_errors, "entity state restored");
        self
    }
}
