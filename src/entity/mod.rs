//! Change-tracking entity.
//!
//! An [`Entity`] keeps current field values next to the bookkeeping an ORM
//! needs to persist them: which fields are dirty, what they held before the
//! latest change, which are guarded against mass assignment, and any
//! validation errors or rejected input recorded against them. Field values
//! may themselves be entities (or lists of them); their error state composes
//! upward.
pub mod class;
mod error_op;
mod field_op;
mod original_op;
mod visibility_op;

pub use class::{EntityClass, EntityClassBuilder, Mutator};

use crate::types::{EntityOptions, FieldMap, FieldSet, WILDCARD};
use crate::value::Value;
use smol_str::SmolStr;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a nested entity.
///
/// Parents hold children through this handle, so the same child can be
/// inspected and updated from outside. Graphs are expected to be acyclic:
/// a cycle makes `to_array`, `get_errors` and `has_errors` recurse without
/// bound.
pub type SharedEntity = Rc<RefCell<Entity>>;

/// Single-slot snapshot taken by [`Entity::save_state`].
#[derive(Debug, Clone)]
struct EntityState {
    fields: FieldMap<Value>,
    original: FieldMap<Value>,
    dirty: FieldSet,
    errors: FieldMap<Vec<String>>,
    invalid: FieldMap<Value>,
    temporary_fields: FieldSet,
    new: bool,
}

#[derive(Debug, Clone)]
pub struct Entity {
    class: EntityClass,
    fields: FieldMap<Value>,
    /// Value before the latest change, only for original-tracked fields.
    original: FieldMap<Value>,
    original_fields: FieldSet,
    dirty: FieldSet,
    temporary_fields: FieldSet,
    errors: FieldMap<Vec<String>>,
    invalid: FieldMap<Value>,
    accessible: FieldMap<bool>,
    hidden: FieldSet,
    virtual_fields: FieldSet,
    source: Option<SmolStr>,
    new: bool,
    saved_state: Option<Box<EntityState>>,
}

impl Entity {
    // ════════════════════════════════════════════════════════════════════════
    // Construction
    // ════════════════════════════════════════════════════════════════════════

    /// Create a base entity filled (guarded) with `data`.
    pub fn new(data: FieldMap<Value>, options: EntityOptions) -> Self {
        Self::with_class(EntityClass::base(), data, options)
    }

    /// Create an entity of a specific type, so its mutators apply.
    pub fn with_class(class: EntityClass, data: FieldMap<Value>, options: EntityOptions) -> Self {
        let mut accessible = FieldMap::default();
        accessible.insert(SmolStr::new_static(WILDCARD), true);

        let mut entity = Self {
            class,
            fields: FieldMap::default(),
            original: FieldMap::default(),
            original_fields: FieldSet::default(),
            dirty: FieldSet::default(),
            temporary_fields: FieldSet::default(),
            errors: FieldMap::default(),
            invalid: FieldMap::default(),
            accessible,
            hidden: FieldSet::default(),
            virtual_fields: FieldSet::default(),
            source: options.source,
            new: options.new,
            saved_state: None,
        };

        if !data.is_empty() {
            entity.fill(data);
        }

        if options.clean {
            entity.clean();
        }

        entity
    }

    /// Wrap in a shared handle, ready to be stored as another entity's field.
    pub fn into_shared(self) -> SharedEntity {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub fn class(&self) -> &EntityClass {
        &self.class
    }

    // ════════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ════════════════════════════════════════════════════════════════════════

    /// Reset dirty, original, error, invalid and temporary bookkeeping and make
    /// the current field set the original baseline. Field values are kept.
    pub fn clean(&mut self) -> &mut Self {
        self.original.clear();
        self.dirty.clear();
        self.errors.clear();
        self.invalid.clear();
        self.temporary_fields.clear();
        self.original_fields = self.fields.keys().cloned().collect();
        self
    }

    #[inline]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn set_source(&mut self, source: impl Into<SmolStr>) -> &mut Self {
        self.source = Some(source.into());
        self
    }

    #[inline]
    pub fn is_new(&self) -> bool {
        self.new
    }

    pub fn set_new(&mut self, new: bool) -> &mut Self {
        self.new = new;
        self
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new(FieldMap::default(), EntityOptions::default())
    }
}
