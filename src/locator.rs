use crate::entity::{Entity, EntityClass};
use crate::inflector::{DefaultInflector, Inflector};
use crate::types::{EntityOptions, FastMap, FieldMap, LocatorConfig};
use crate::value::Value;
use lru::LruCache;
use smol_str::SmolStr;
use tracing::debug;

/// Path separator between namespace segments and the class name.
const NAMESPACE_SEPARATOR: &str = "::";

/// Resolves an alias (`"users"`, `"MockEntities"`) to the entity class that
/// handles it.
///
/// Candidates are `namespace + ClassName` for each namespace in registration
/// order, looked up among the classes registered with the locator. Unmatched
/// aliases resolve to the default class, never to an error.
pub struct EntityLocator<I: Inflector = DefaultInflector> {
    inflector: I,
    namespaces: Vec<SmolStr>,
    /// Classes that can be located, by fully qualified name.
    classes: FastMap<SmolStr, EntityClass>,
    /// Explicit alias mappings; these bypass namespace resolution.
    aliases: FieldMap<EntityClass>,
    cache: LruCache<SmolStr, EntityClass>,
    default_class: EntityClass,
}

impl Default for EntityLocator<DefaultInflector> {
    fn default() -> Self {
        Self::new(DefaultInflector)
    }
}

impl<I: Inflector> EntityLocator<I> {
    pub fn new(inflector: I) -> Self {
        Self::new_with_config(inflector, LocatorConfig::default())
    }

    pub fn new_with_config(inflector: I, config: LocatorConfig) -> Self {
        Self {
            inflector,
            namespaces: Vec::new(),
            classes: FastMap::default(),
            aliases: FieldMap::default(),
            cache: LruCache::new(config.cache_capacity),
            default_class: EntityClass::base(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Class catalogue
    // ════════════════════════════════════════════════════════════════════════

    /// Make a class locatable by its fully qualified name.
    pub fn register(&mut self, class: EntityClass) -> &mut Self {
        debug!(class = class.name(), "entity class registered");
        self.classes.insert(SmolStr::new(class.name()), class);
        self.cache.clear();
        self
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Namespaces
    // ════════════════════════════════════════════════════════════════════════

    pub fn add_namespace(&mut self, namespace: &str) -> &mut Self {
        let namespace = normalize_namespace(namespace);
        if !self.namespaces.contains(&namespace) {
            debug!(namespace = namespace.as_str(), "namespace added");
            self.namespaces.push(namespace);
            self.cache.clear();
        }
        self
    }

    /// Returns whether the namespace was registered.
    pub fn remove_namespace(&mut self, namespace: &str) -> bool {
        let namespace = normalize_namespace(namespace);
        let Some(pos) = self.namespaces.iter().position(|ns| *ns == namespace) else {
            return false;
        };
        self.namespaces.remove(pos);
        self.cache.clear();
        debug!(namespace = namespace.as_str(), "namespace removed");
        true
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains(&normalize_namespace(namespace))
    }

    #[inline]
    pub fn get_namespaces(&self) -> &[SmolStr] {
        &self.namespaces
    }

    // ════════════════════════════════════════════════════════════════════════
    // Resolution
    // ════════════════════════════════════════════════════════════════════════

    /// Map an alias straight to a class. Takes precedence over namespace
    /// resolution and is what `find_alias` reports back for the class.
    pub fn map(&mut self, alias: &str, class: EntityClass) -> &mut Self {
        self.cache.pop(alias);
        self.aliases.insert(SmolStr::new(alias), class);
        self
    }

    /// Class for an alias, falling back to the default class.
    pub fn find(&mut self, alias: &str) -> EntityClass {
        if let Some(class) = self.aliases.get(alias) {
            return class.clone();
        }
        if let Some(class) = self.cache.get(alias) {
            return class.clone();
        }

        let class = self.locate(alias);
        self.cache.put(SmolStr::new(alias), class.clone());
        class
    }

    /// Alias for a class: the explicitly mapped alias if there is one,
    /// otherwise the plural of its short name.
    pub fn find_alias(&self, class: &EntityClass) -> SmolStr {
        self.aliases
            .iter()
            .find(|(_, mapped)| *mapped == class)
            .map(|(alias, _)| alias.clone())
            .unwrap_or_else(|| SmolStr::from(self.inflector.pluralize(class.short_name())))
    }

    /// Build an entity of the class `alias` resolves to.
    pub fn create(&mut self, alias: &str, data: FieldMap<Value>, options: EntityOptions) -> Entity {
        self.find(alias).create(data, options)
    }

    #[inline]
    pub fn get_default_entity_class(&self) -> &EntityClass {
        &self.default_class
    }

    /// Also drops cached resolutions, which may have fallen back to the
    /// previous default.
    pub fn set_default_entity_class(&mut self, class: EntityClass) -> &mut Self {
        self.default_class = class;
        self.cache.clear();
        self
    }

    /// Forget namespaces, alias mappings and cached resolutions. Registered
    /// classes and the default class are kept.
    pub fn clear(&mut self) -> &mut Self {
        self.namespaces.clear();
        self.aliases.clear();
        self.cache.clear();
        self
    }

    fn locate(&self, alias: &str) -> EntityClass {
        let name = self.inflector.classify(alias);

        for namespace in &self.namespaces {
            let full_name = format!("{namespace}{name}");
            match self.classes.get(full_name.as_str()) {
                Some(class) if !class.is_base() => {
                    debug!(alias, class = class.name(), "alias resolved");
                    return class.clone();
                }
                _ => {}
            }
        }

        debug!(
            alias,
            default = self.default_class.name(),
            "alias unresolved, using default class"
        );
        self.default_class.clone()
    }
}

/// Trim separators and give every namespace the same trailing `::` form;
/// the root namespace becomes the empty prefix.
fn normalize_namespace(namespace: &str) -> SmolStr {
    let trimmed = namespace.trim().trim_matches(':');
    if trimmed.is_empty() {
        SmolStr::default()
    } else {
        SmolStr::from(format!("{trimmed}{NAMESPACE_SEPARATOR}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use std::num::NonZeroUsize;
    use std::sync::LazyLock;

    fn floor(_: &Entity, value: Value) -> Value {
        value.as_f64().map_or(value, |f| Value::Float(f.floor()))
    }

    static MOCK_ENTITY: LazyLock<EntityClass> = LazyLock::new(|| {
        EntityClass::builder("tests::mock::MockEntity")
            .setter("integer", floor)
            .build()
    });

    static OTHER_MOCK_ENTITY: LazyLock<EntityClass> =
        LazyLock::new(|| EntityClass::builder("tests::other::MockEntity").build());

    fn make_locator() -> EntityLocator {
        let mut locator: EntityLocator = EntityLocator::default();
        locator
            .register(MOCK_ENTITY.clone())
            .register(OTHER_MOCK_ENTITY.clone())
            .add_namespace("tests::mock");
        locator
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Namespaces
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_get_namespaces() {
        let locator = make_locator();
        assert_eq!(locator.get_namespaces(), ["tests::mock::"]);
    }

    #[test]
    fn test_namespaces_are_normalized() {
        let mut locator = make_locator();
        locator.add_namespace("::tests::mock::");
        assert_eq!(locator.get_namespaces().len(), 1);
        assert!(locator.has_namespace("tests::mock::"));
        assert!(locator.has_namespace("  tests::mock"));
    }

    #[test]
    fn test_has_namespace_invalid() {
        let locator = make_locator();
        assert!(!locator.has_namespace("tests::invalid"));
    }

    #[test]
    fn test_remove_namespace() {
        let mut locator = make_locator();
        assert!(locator.remove_namespace("tests::mock"));
        assert!(!locator.has_namespace("tests::mock"));
        assert!(!locator.remove_namespace("tests::mock"));
    }

    #[test]
    fn test_remove_namespace_invalid() {
        let mut locator = make_locator();
        assert!(!locator.remove_namespace("tests::invalid"));
        assert_eq!(locator.get_namespaces().len(), 1);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // find / find_alias
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_find() {
        let mut locator = make_locator();
        assert_eq!(locator.find("MockEntity"), *MOCK_ENTITY);
    }

    #[test]
    fn test_find_plural() {
        let mut locator = make_locator();
        assert_eq!(locator.find("MockEntities"), *MOCK_ENTITY);
        assert_eq!(locator.find("mock_entities"), *MOCK_ENTITY);
    }

    #[test]
    fn test_find_invalid() {
        let mut locator = make_locator();
        assert_eq!(locator.find("Invalid"), EntityClass::base());
    }

    #[test]
    fn test_find_uses_namespace_order() {
        let mut locator = make_locator();
        locator.clear();
        locator
            .add_namespace("tests::other")
            .add_namespace("tests::mock");
        assert_eq!(locator.find("MockEntities"), *OTHER_MOCK_ENTITY);

        locator.remove_namespace("tests::other");
        assert_eq!(locator.find("MockEntities"), *MOCK_ENTITY);
    }

    #[test]
    fn test_find_skips_base_class() {
        let mut locator: EntityLocator = EntityLocator::default();
        locator
            .register(EntityClass::base())
            .add_namespace("orm_entity");
        let fallback = EntityClass::builder("app::Fallback").build();
        locator.set_default_entity_class(fallback.clone());

        assert_eq!(locator.find("entities"), fallback);
    }

    #[test]
    fn test_find_alias() {
        let locator = make_locator();
        assert_eq!(locator.find_alias(&MOCK_ENTITY), "MockEntities");
    }

    #[test]
    fn test_map() {
        let mut locator = make_locator();
        locator.map("Test", MOCK_ENTITY.clone());

        assert_eq!(locator.find("Test"), *MOCK_ENTITY);
        assert_eq!(locator.find_alias(&MOCK_ENTITY), "Test");
    }

    #[test]
    fn test_map_overrides_cached_resolution() {
        let mut locator = make_locator();
        assert_eq!(locator.find("Widgets"), EntityClass::base());

        locator.map("Widgets", MOCK_ENTITY.clone());
        assert_eq!(locator.find("Widgets"), *MOCK_ENTITY);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Default class / clear / cache
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_get_default_entity_class() {
        let locator = make_locator();
        assert_eq!(*locator.get_default_entity_class(), EntityClass::base());
    }

    #[test]
    fn test_set_default_entity_class_resets_fallbacks() {
        let mut locator = make_locator();
        assert_eq!(locator.find("Invalid"), EntityClass::base());

        locator.set_default_entity_class(MOCK_ENTITY.clone());
        assert_eq!(locator.find("Invalid"), *MOCK_ENTITY);
    }

    #[test]
    fn test_clear() {
        let mut locator = make_locator();
        locator.map("Test", OTHER_MOCK_ENTITY.clone());
        locator.clear();

        assert!(locator.get_namespaces().is_empty());
        assert_eq!(locator.find("MockEntity"), EntityClass::base());
        assert_eq!(locator.find("Test"), EntityClass::base());
        assert!(locator.is_registered("tests::mock::MockEntity"));
    }

    #[test]
    fn test_small_cache_still_resolves() {
        let config = LocatorConfig {
            cache_capacity: NonZeroUsize::new(1).unwrap(),
        };
        let mut locator = EntityLocator::new_with_config(DefaultInflector, config);
        locator
            .register(MOCK_ENTITY.clone())
            .add_namespace("tests::mock");

        assert_eq!(locator.find("MockEntity"), *MOCK_ENTITY);
        assert_eq!(locator.find("Invalid"), EntityClass::base());
        assert_eq!(locator.find("MockEntity"), *MOCK_ENTITY);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // create
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_create_uses_resolved_class() {
        let mut locator = make_locator();
        let mut entity = locator.create(
            "MockEntities",
            fields! { "integer" => 3.7 },
            EntityOptions::default().source("mock_entities"),
        );

        assert_eq!(*entity.class(), *MOCK_ENTITY);
        assert_eq!(entity.source(), Some("mock_entities"));
        assert_eq!(entity.get("integer"), Some(Value::Float(3.0)));

        entity.set("integer", 5.5);
        assert_eq!(entity.get("integer"), Some(Value::Float(5.0)));
    }
}
