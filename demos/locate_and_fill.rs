//! Resolve an alias to an entity type, fill it from JSON input and inspect
//! what changed.
//!
//! Run with `cargo run --example locate_and_fill`.
use orm_entity::{
    Entity, EntityClass, EntityError, EntityLocator, EntityOptions, ErrorMode, Value, fields,
};
use std::sync::LazyLock;

fn cents(_: &Entity, value: Value) -> Value {
    value
        .as_f64()
        .map_or(value, |f| Value::Int((f * 100.0).round() as i64))
}

static PRODUCT: LazyLock<EntityClass> = LazyLock::new(|| {
    EntityClass::builder("shop::model::Product")
        .setter("price", cents)
        .build()
});

fn main() -> Result<(), EntityError> {
    let mut locator: EntityLocator = EntityLocator::default();
    locator
        .register(PRODUCT.clone())
        .add_namespace("shop::model");

    let mut product = locator.create(
        "products",
        fields! { "id" => 1, "name" => "Lamp", "price" => 19.99, "internal_code" => "LX-1" },
        EntityOptions::default().source("products").new_record(false),
    );
    println!("resolved `products` to {}", product.class());

    product.set_access("id", false).set_hidden(["internal_code"], false);

    let input: serde_json::Value =
        serde_json::from_str(r#"{"id": 99, "name": "Desk lamp", "price": 24.5}"#)?;
    if let Value::Map(patch) = Value::from(input) {
        product.fill(patch);
    }

    println!("dirty fields: {:?}", product.get_dirty());
    for (field, original) in product.extract_original_changed(product.get_dirty()) {
        println!("  {field}: {original:?} -> {:?}", product.get(&field));
    }

    if product.get("name").is_some_and(|name| name.as_str().is_some_and(|s| s.len() > 8)) {
        product.set_error("name", ["must be at most 8 characters"], ErrorMode::Append);
    }
    println!("errors: {}", serde_json::to_string(&product.get_errors())?);

    println!("{}", product.try_to_json()?);
    Ok(())
}
