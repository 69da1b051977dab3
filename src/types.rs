use heck::ToLowerCamelCase;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::num::NonZeroUsize;

pub type FastMap<K, V> = HashMap<K, V, FxBuildHasher>;

/// Field-name keyed map that keeps insertion order.
pub type FieldMap<V> = IndexMap<SmolStr, V, FxBuildHasher>;

/// Ordered set of field names.
pub type FieldSet = IndexSet<SmolStr, FxBuildHasher>;

/// Field name that stands for "every field" in the access map.
pub const WILDCARD: &str = "*";

/// Separator for nested error paths (`"author.name"`).
pub const PATH_SEPARATOR: char = '.';

// ─── Direction ──────────────────────────────────────────────────────────────

/// Which side of a field access a mutator hooks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Get,
    Set,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Get => "get",
            Direction::Set => "set",
        }
    }

    /// Conventional hook name for a field, e.g. `_getDecimal` or `_setInteger`.
    ///
    /// Underscore-delimited segments are titlecased and joined, then the first
    /// character is lowered and the reserved `_` marker prepended.
    pub fn hook_name(self, field: &str) -> String {
        format!("_{}", format!("{}_{}", self.as_str(), field).to_lower_camel_case())
    }

    /// Split a conventional hook name back into direction and camel-cased
    /// field suffix (`_getDecimal` -> `(Get, "Decimal")`).
    pub fn parse_hook(name: &str) -> Option<(Direction, &str)> {
        let rest = name.strip_prefix('_')?;
        if let Some(field) = rest.strip_prefix("get") {
            return (!field.is_empty()).then_some((Direction::Get, field));
        }
        if let Some(field) = rest.strip_prefix("set") {
            return (!field.is_empty()).then_some((Direction::Set, field));
        }
        None
    }
}

// ─── ErrorMode ──────────────────────────────────────────────────────────────

/// How `set_error`/`set_errors` treat an existing error list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    #[default]
    Append,
    Replace,
}

impl From<bool> for ErrorMode {
    /// `true` means overwrite.
    fn from(overwrite: bool) -> Self {
        if overwrite {
            ErrorMode::Replace
        } else {
            ErrorMode::Append
        }
    }
}

// ─── FieldErrors ────────────────────────────────────────────────────────────

/// Errors for one field: either explicit messages, or errors derived from a
/// nested entity (keyed by field) or list of entities (keyed by index).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldErrors {
    Messages(Vec<String>),
    Nested(ErrorMap),
}

pub type ErrorMap = FieldMap<FieldErrors>;

impl Default for FieldErrors {
    fn default() -> Self {
        FieldErrors::Messages(Vec::new())
    }
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldErrors::Messages(list) => list.is_empty(),
            FieldErrors::Nested(map) => map.is_empty(),
        }
    }

    pub fn messages(&self) -> Option<&[String]> {
        match self {
            FieldErrors::Messages(list) => Some(list),
            FieldErrors::Nested(_) => None,
        }
    }

    pub fn nested(&self) -> Option<&ErrorMap> {
        match self {
            FieldErrors::Nested(map) => Some(map),
            FieldErrors::Messages(_) => None,
        }
    }
}

impl From<Vec<String>> for FieldErrors {
    fn from(list: Vec<String>) -> Self {
        FieldErrors::Messages(list)
    }
}

impl From<ErrorMap> for FieldErrors {
    fn from(map: ErrorMap) -> Self {
        FieldErrors::Nested(map)
    }
}

// ─── Options ────────────────────────────────────────────────────────────────

/// Construction options for an [`Entity`](crate::Entity).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntityOptions {
    /// Originating table/collection tag.
    pub source: Option<SmolStr>,
    /// Whether the entity has not been persisted yet.
    pub new: bool,
    /// Reset dirty/error/invalid state right after the initial fill.
    pub clean: bool,
}

impl Default for EntityOptions {
    fn default() -> Self {
        Self {
            source: None,
            new: true,
            clean: true,
        }
    }
}

impl EntityOptions {
    pub fn source(mut self, source: impl Into<SmolStr>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn new_record(mut self, new: bool) -> Self {
        self.new = new;
        self
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

/// Options for a single `set` (and, applied per entry, `fill`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// Skip the write when the field is not accessible.
    pub guard: bool,
    /// Run the field's set-mutator before storing.
    pub mutate: bool,
    /// Mark the field as original-tracked.
    pub original: bool,
    /// Mark the field as temporary.
    pub temporary: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            guard: false,
            mutate: true,
            original: false,
            temporary: false,
        }
    }
}

impl SetOptions {
    /// Defaults for bulk assignment: mass-assignment protection on.
    pub fn guarded() -> Self {
        Self {
            guard: true,
            ..Self::default()
        }
    }

    pub fn guard(mut self, guard: bool) -> Self {
        self.guard = guard;
        self
    }

    pub fn mutate(mut self, mutate: bool) -> Self {
        self.mutate = mutate;
        self
    }

    pub fn original(mut self, original: bool) -> Self {
        self.original = original;
        self
    }

    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
}

/// Configuration for [`EntityLocator::new_with_config`](crate::EntityLocator::new_with_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Maximum number of alias resolutions kept in the LRU cache.
    ///
    /// Default: 1024 aliases.
    pub cache_capacity: NonZeroUsize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            cache_capacity: NonZeroUsize::new(1024).unwrap_or(NonZeroUsize::MIN),
        }
    }
}
