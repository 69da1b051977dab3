//! Change-tracking entities for an object-relational mapping layer.
//!
//! - [`Entity`]: field values plus dirty/original tracking, mass-assignment
//!   guards, validation errors and rejected input, hidden/virtual fields and
//!   per-type get/set mutators. Entities nest.
//! - [`EntityClass`]: the type identifier and mutator table of an entity
//!   subtype.
//! - [`EntityLocator`]: resolves an alias such as `"users"` to the
//!   [`EntityClass`] responsible for it.
pub mod entity;
pub mod error;
pub mod inflector;
pub mod locator;
pub mod types;
pub mod value;

pub use entity::{Entity, EntityClass, EntityClassBuilder, Mutator, SharedEntity};
pub use error::EntityError;
pub use inflector::{DefaultInflector, Inflector};
pub use locator::EntityLocator;
pub use types::{
    Direction, EntityOptions, ErrorMap, ErrorMode, FieldErrors, FieldMap, FieldSet, LocatorConfig,
    SetOptions,
};
pub use value::{DateLike, Value, ValueObject};

pub use smol_str::SmolStr;
