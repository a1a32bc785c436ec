//! Property-based tests for tagschema.
//!
//! Properties tested:
//! - Determinism: compiling twice yields byte-identical output
//! - Order: properties follow declaration order
//! - Required flag: defaults never change a type descriptor
//! - Dispatch: every union key selects its own member
//! - Duplicates: a rejected registration leaves the registry unchanged

use proptest::prelude::*;
use serde_json::{json, Value};

use tagschema::{
    DiscriminatedUnion, Field, FieldType, IndentStyle, RegistryError, SchemaCompiler, Shape,
    ShapeRegistry,
};

// =============================================================================
// Generators for property tests
// =============================================================================

/// Generate a field name.
fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}".prop_map(|s| s)
}

/// Generate a primitive field type, optionally wrapped.
fn arb_field_type() -> impl Strategy<Value = FieldType> {
    let primitive = prop_oneof![
        Just(FieldType::String),
        Just(FieldType::Integer),
        Just(FieldType::Number),
        Just(FieldType::Boolean),
    ];
    (primitive, any::<bool>(), any::<bool>()).prop_map(|(ty, optional, array)| {
        let ty = if array { FieldType::array(ty) } else { ty };
        if optional {
            FieldType::optional(ty)
        } else {
            ty
        }
    })
}

/// Generate a list of fields with distinct names.
fn arb_fields() -> impl Strategy<Value = Vec<(String, FieldType, bool)>> {
    prop::collection::btree_map(arb_identifier(), (arb_field_type(), any::<bool>()), 1..8)
        .prop_map(|fields| {
            fields
                .into_iter()
                .map(|(name, (ty, required))| (name, ty, required))
                .collect()
        })
        .prop_shuffle()
}

/// Generate distinct discriminator values.
fn arb_keys() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,8}", 1..6).prop_map(|keys| keys.into_iter().collect())
}

fn member_name(key: &str) -> String {
    format!("Member_{}", key)
}

fn union_registry(keys: &[String]) -> ShapeRegistry {
    let mut registry = ShapeRegistry::new();
    let mut union = DiscriminatedUnion::new("Union", "kind");
    for key in keys {
        registry
            .register(
                Shape::new(member_name(key))
                    .with_field(Field::literal("kind", key.as_str()))
                    .with_field(Field::new("payload", FieldType::Integer).with_default(0)),
            )
            .unwrap();
        union = union.with_member(key.as_str(), member_name(key));
    }
    registry.register_union(union).unwrap();
    registry
        .register(
            Shape::new("Holder")
                .with_field(Field::new("item", FieldType::optional(FieldType::reference("Union")))),
        )
        .unwrap();
    registry
}

fn record_registry(fields: &[(String, FieldType, bool)]) -> ShapeRegistry {
    let mut registry = ShapeRegistry::new();
    let shape = fields.iter().fold(Shape::new("Record"), |shape, (name, ty, required)| {
        shape.with_field(Field::new(name.as_str(), ty.clone()).with_required(*required))
    });
    registry.register(shape).unwrap();
    registry
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_compile_is_deterministic(keys in arb_keys()) {
        let registry = union_registry(&keys);
        let compiler = SchemaCompiler::new();

        let first = compiler.compile(&registry, "Holder").unwrap();
        let second = compiler.compile(&registry, "Holder").unwrap();
        prop_assert_eq!(
            first.to_json_string(IndentStyle::Spaces2).unwrap(),
            second.to_json_string(IndentStyle::Spaces2).unwrap()
        );
    }

    #[test]
    fn prop_properties_follow_declaration_order(fields in arb_fields()) {
        let registry = record_registry(&fields);
        let document = SchemaCompiler::new().compile(&registry, "Record").unwrap();
        let object = document.root.as_object().unwrap();

        let emitted: Vec<&str> = object.properties.keys().map(String::as_str).collect();
        let declared: Vec<&str> = fields.iter().map(|(name, _, _)| name.as_str()).collect();
        prop_assert_eq!(emitted, declared);

        let required: Vec<&str> = fields
            .iter()
            .filter(|(_, _, required)| *required)
            .map(|(name, _, _)| name.as_str())
            .collect();
        prop_assert_eq!(object.required.iter().map(String::as_str).collect::<Vec<_>>(), required);
    }

    #[test]
    fn prop_default_never_changes_descriptor(ty in arb_field_type(), default in any::<i64>()) {
        let compile = |field: Field| {
            let mut registry = ShapeRegistry::new();
            registry.register(Shape::new("Record").with_field(field)).unwrap();
            SchemaCompiler::new().compile(&registry, "Record").unwrap()
        };

        let plain = compile(Field::new("value", ty.clone()));
        let defaulted = compile(Field::new("value", ty).with_default(default));

        let plain = plain.root.as_object().unwrap();
        let defaulted = defaulted.root.as_object().unwrap();
        prop_assert_eq!(&plain.properties["value"].descriptor, &defaulted.properties["value"].descriptor);
        prop_assert!(plain.is_required("value"));
        prop_assert!(!defaulted.is_required("value"));
    }

    #[test]
    fn prop_every_key_dispatches_to_its_member(keys in arb_keys()) {
        let registry = union_registry(&keys);
        let document = SchemaCompiler::new().compile(&registry, "Holder").unwrap();
        let union = document.union("Union").unwrap();

        prop_assert_eq!(union.discriminator.mapping.len(), keys.len());
        for key in &keys {
            let instance = json!({ "kind": key, "payload": 1 });
            let member = document.select_member("Union", &instance).unwrap();
            prop_assert_eq!(member, member_name(key));

            let definition = document.to_value().unwrap()["definitions"][member_name(key)].clone();
            prop_assert_eq!(&definition["properties"]["kind"]["const"], &Value::String(key.clone()));
        }
    }

    #[test]
    fn prop_duplicate_registration_is_rejected(keys in arb_keys()) {
        let mut registry = union_registry(&keys);
        let before = registry.len();

        let err = registry
            .register(Shape::new("Holder").with_field(Field::new("other", FieldType::String)))
            .unwrap_err();
        prop_assert_eq!(err, RegistryError::duplicate_shape("Holder"));
        prop_assert_eq!(registry.len(), before);
    }
}
