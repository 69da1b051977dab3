use crate::entity::{Entity, SharedEntity};
use crate::types::FieldMap;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use smol_str::SmolStr;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ─── Capabilities ───────────────────────────────────────────────────────────

/// Date/time values the entity can compare and render.
pub trait DateLike {
    /// Same instant, regardless of representation.
    fn is_same(&self, other: &Self) -> bool;

    /// ISO-8601 rendering with milliseconds, e.g. `2024-01-15T10:30:00.000Z`.
    fn to_iso_string(&self) -> String;
}

impl DateLike for DateTime<Utc> {
    #[inline]
    fn is_same(&self, other: &Self) -> bool {
        self == other
    }

    fn to_iso_string(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Opaque value stored in a field.
///
/// Implementors opt into string and JSON conversion; both are used when an
/// entity is exported with object conversion enabled.
pub trait ValueObject: fmt::Debug {
    /// Equality used to detect no-op writes. Handles compare by identity
    /// before this is consulted.
    fn is_same(&self, other: &dyn ValueObject) -> bool {
        let _ = other;
        false
    }

    fn to_display(&self) -> Option<String> {
        None
    }

    fn to_json(&self) -> Option<serde_json::Value> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

// ─── Value ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(SmolStr),
    DateTime(DateTime<Utc>),
    List(Vec<Value>),
    Map(FieldMap<Value>),
    Entity(SharedEntity),
    Object(Rc<dyn ValueObject>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap<Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&SharedEntity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<dyn ValueObject>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, the empty string, or an empty collection.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            Value::List(list) => list.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// False for empty values, `false`, zero and `"0"`.
    pub fn is_truthy(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => s != "0",
            _ => true,
        }
    }

    /// Equality used for no-op detection.
    ///
    /// Scalars compare strictly (`Int(1)` is not `Float(1.0)`), dates by
    /// instant, nested entities by handle identity, objects by identity or
    /// their own `is_same`, collections element-wise in order.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a.is_same(b),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_same(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.is_same(vb))
            }
            (Value::Entity(a), Value::Entity(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || a.is_same(b.as_ref()),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

// ─── Serialize ──────────────────────────────────────────────────────────────

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s.as_str()),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_iso_string()),
            Value::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for v in list {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k.as_str(), v)?;
                }
                m.end()
            }
            Value::Entity(entity) => entity.borrow().serialize(serializer),
            Value::Object(obj) => {
                if let Some(text) = obj.to_display() {
                    serializer.serialize_str(&text)
                } else if let Some(json) = obj.to_json() {
                    json.serialize(serializer)
                } else {
                    serializer.serialize_none()
                }
            }
        }
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(SmolStr::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(SmolStr::from(s))
    }
}

impl From<SmolStr> for Value {
    fn from(s: SmolStr) -> Self {
        Value::Str(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<FieldMap<Value>> for Value {
    fn from(map: FieldMap<Value>) -> Self {
        Value::Map(map)
    }
}

impl From<SharedEntity> for Value {
    fn from(entity: SharedEntity) -> Self {
        Value::Entity(entity)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Entity(Rc::new(RefCell::new(entity)))
    }
}

impl From<Rc<dyn ValueObject>> for Value {
    fn from(obj: Rc<dyn ValueObject>) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

// ─── From/Into serde_json::Value ────────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(SmolStr::from(s)),
            serde_json::Value::Array(arr) => {
                Value::List(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(val: &Value) -> Self {
        match val {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(i),
            Value::Float(f) => serde_json::json!(f),
            Value::Str(s) => serde_json::Value::String(s.to_string()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_iso_string()),
            Value::List(list) => serde_json::Value::Array(list.iter().map(Into::into).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.into()))
                    .collect(),
            ),
            Value::Entity(_) | Value::Object(_) => {
                serde_json::to_value(val).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

/// Build a [`FieldMap`] of [`Value`]s, preserving the written order.
///
/// ```
/// use orm_entity::fields;
/// let data = fields! { "id" => 1, "name" => "Alice" };
/// assert_eq!(data.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::types::FieldMap::<$crate::value::Value>::default()
    };
    ($($key:expr => $val:expr),+ $(,)?) => {{
        let mut map = $crate::types::FieldMap::<$crate::value::Value>::default();
        $(
            map.insert($crate::SmolStr::from($key), $crate::value::Value::from($val));
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug)]
    struct Money(i64);

    impl ValueObject for Money {
        fn is_same(&self, other: &dyn ValueObject) -> bool {
            other
                .as_any()
                .downcast_ref::<Money>()
                .is_some_and(|o| o.0 == self.0)
        }

        fn to_display(&self) -> Option<String> {
            Some(format!("${}.{:02}", self.0 / 100, self.0 % 100))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_is_same_is_strict_for_scalars() {
        assert!(Value::from(1).is_same(&Value::Int(1)));
        assert!(!Value::Int(1).is_same(&Value::Float(1.0)));
        assert!(!Value::from("1").is_same(&Value::Int(1)));
        assert!(Value::Null.is_same(&Value::Null));
    }

    #[test]
    fn test_is_same_collections_in_order() {
        let a = Value::List(vec![Value::from(1), Value::from("x")]);
        let b = Value::List(vec![Value::from(1), Value::from("x")]);
        let c = Value::List(vec![Value::from("x"), Value::from(1)]);
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
    }

    #[test]
    fn test_is_same_entities_by_handle() {
        let a = Value::from(Entity::default());
        let b = Value::from(Entity::default());
        assert!(a.is_same(&a.clone()));
        assert!(!a.is_same(&b));
    }

    #[test]
    fn test_is_same_dates_by_instant() {
        let a = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert!(Value::from(a).is_same(&Value::from(a)));
        assert!(!Value::from(a).is_same(&Value::from(a + chrono::Duration::seconds(1))));
    }

    #[test]
    fn test_is_same_objects_via_capability() {
        let a: Rc<dyn ValueObject> = Rc::new(Money(150));
        let b: Rc<dyn ValueObject> = Rc::new(Money(150));
        let c: Rc<dyn ValueObject> = Rc::new(Money(200));
        assert!(Value::from(a.clone()).is_same(&Value::from(b)));
        assert!(!Value::from(a).is_same(&Value::from(c)));
    }

    #[test]
    fn test_empty_and_truthy() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::from(0).is_empty());
        assert!(!Value::from(false).is_empty());

        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(Value::from("a").is_truthy());
        assert!(Value::from(Entity::default()).is_truthy());
    }

    #[test]
    fn test_iso_string() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(dt.to_iso_string(), "2024-01-15T10:30:00.000Z");
    }

    #[test]
    fn test_serialize_object_prefers_display() {
        let obj: Rc<dyn ValueObject> = Rc::new(Money(1234));
        let json = serde_json::to_string(&Value::from(obj)).unwrap();
        assert_eq!(json, "\"$12.34\"");
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": 1, "a": [true, null, 2.5]}"#).unwrap();
        let value = Value::from(json);
        let map = value.as_map().unwrap();
        assert_eq!(map.keys().map(|k| k.as_str()).collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Bool(true), Value::Null, Value::Float(2.5)])
        );
    }
}
