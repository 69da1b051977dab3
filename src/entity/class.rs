use super::Entity;
use crate::error::EntityError;
use crate::types::{Direction, EntityOptions, FastMap, FieldMap};
use crate::value::Value;
use heck::ToSnakeCase;
use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

/// Per-field value transform. Receives the entity (so a getter may derive its
/// value from other fields) and the raw value, returns the replacement.
pub type Mutator = fn(&Entity, Value) -> Value;

const BASE_CLASS_NAME: &str = "orm_entity::Entity";

static BASE_CLASS: LazyLock<EntityClass> = LazyLock::new(|| {
    EntityClass(Arc::new(ClassInner {
        name: SmolStr::new_static(BASE_CLASS_NAME),
        base: true,
        getters: FastMap::default(),
        setters: FastMap::default(),
    }))
});

struct ClassInner {
    name: SmolStr,
    base: bool,
    getters: FastMap<SmolStr, Mutator>,
    setters: FastMap<SmolStr, Mutator>,
}

// ─── EntityClass ────────────────────────────────────────────────────────────

/// Type identifier for an entity "subtype": a fully qualified name plus the
/// mutator table that subtype defines. Cheap to clone.
///
/// Tables are built once, typically into a `static`:
///
/// ```
/// use orm_entity::{Entity, EntityClass, Value};
/// use std::sync::LazyLock;
///
/// fn floor(_: &Entity, value: Value) -> Value {
///     value.as_f64().map_or(value, |f| Value::Float(f.floor()))
/// }
///
/// static INVOICE: LazyLock<EntityClass> = LazyLock::new(|| {
///     EntityClass::builder("app::model::Invoice")
///         .setter("amount", floor)
///         .build()
/// });
///
/// let mut invoice = INVOICE.create(Default::default(), Default::default());
/// invoice.set("amount", 2.5);
/// assert_eq!(invoice.get("amount"), Some(Value::Float(2.0)));
/// ```
#[derive(Clone)]
pub struct EntityClass(Arc<ClassInner>);

impl EntityClass {
    /// The base entity type. Performs no transforms.
    pub fn base() -> EntityClass {
        BASE_CLASS.clone()
    }

    pub fn builder(name: impl Into<SmolStr>) -> EntityClassBuilder {
        EntityClassBuilder {
            name: name.into(),
            getters: FastMap::default(),
            setters: FastMap::default(),
        }
    }

    /// Fully qualified name, e.g. `app::model::Invoice`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Last path segment of the name.
    pub fn short_name(&self) -> &str {
        self.0
            .name
            .rsplit("::")
            .next()
            .unwrap_or(self.0.name.as_str())
    }

    #[inline]
    pub fn is_base(&self) -> bool {
        self.0.base
    }

    /// Resolve the transform for a field, if this type defines one.
    #[inline]
    pub fn mutator(&self, direction: Direction, field: &str) -> Option<Mutator> {
        let table = match direction {
            Direction::Get => &self.0.getters,
            Direction::Set => &self.0.setters,
        };
        table.get(field).copied()
    }

    /// Conventional hook names of every registered mutator, sorted.
    pub fn hook_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .0
            .getters
            .keys()
            .map(|f| Direction::Get.hook_name(f))
            .chain(self.0.setters.keys().map(|f| Direction::Set.hook_name(f)))
            .collect();
        names.sort_unstable();
        names
    }

    /// Construct an entity of this type.
    pub fn create(&self, data: FieldMap<Value>, options: EntityOptions) -> Entity {
        Entity::with_class(self.clone(), data, options)
    }
}

impl PartialEq for EntityClass {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for EntityClass {}

impl Hash for EntityClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityClass")
            .field("name", &self.0.name)
            .field("hooks", &self.hook_names())
            .finish()
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl Default for EntityClass {
    fn default() -> Self {
        Self::base()
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

pub struct EntityClassBuilder {
    name: SmolStr,
    getters: FastMap<SmolStr, Mutator>,
    setters: FastMap<SmolStr, Mutator>,
}

impl EntityClassBuilder {
    /// Transform applied on every read of `field`.
    pub fn getter(mut self, field: impl Into<SmolStr>, mutator: Mutator) -> Self {
        self.getters.insert(field.into(), mutator);
        self
    }

    /// Transform applied before `field` is stored.
    pub fn setter(mut self, field: impl Into<SmolStr>, mutator: Mutator) -> Self {
        self.setters.insert(field.into(), mutator);
        self
    }

    /// Register a mutator by its conventional hook name (`_getDecimal`,
    /// `_setCreatedAt`). The camel-cased suffix maps to a snake_case field.
    pub fn method(self, hook: &str, mutator: Mutator) -> Result<Self, EntityError> {
        let (direction, suffix) =
            Direction::parse_hook(hook).ok_or_else(|| EntityError::InvalidHook(hook.to_owned()))?;
        let field = suffix.to_snake_case();
        Ok(match direction {
            Direction::Get => self.getter(field, mutator),
            Direction::Set => self.setter(field, mutator),
        })
    }

    pub fn build(self) -> EntityClass {
        EntityClass(Arc::new(ClassInner {
            name: self.name,
            base: false,
            getters: self.getters,
            setters: self.setters,
        }))
    }
}
