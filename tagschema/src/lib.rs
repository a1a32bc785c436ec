//! # tagschema
//!
//! A registry of tagged-union record shapes and a compiler that turns it into
//! a JSON-Schema-style document.
//!
//! ## Overview
//!
//! A family of record shapes shares a base and is told apart by a
//! discriminator field whose literal value selects the member. `tagschema`
//! keeps those definitions in a [`ShapeRegistry`], checks that every
//! [`DiscriminatedUnion`] is self-tagging, and compiles any shape into a
//! [`SchemaDocument`] with a dispatch table per union.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tagschema::{
//!     DiscriminatedUnion, Field, FieldType, IndentStyle, SchemaCompiler, Shape, ShapeRegistry,
//! };
//!
//! let mut registry = ShapeRegistry::new();
//! registry.register(
//!     Shape::new("Cat")
//!         .with_field(Field::literal("pet_type", "cat"))
//!         .with_field(Field::new("can_meow", FieldType::Boolean).with_default(true)),
//! )?;
//! registry.register(
//!     Shape::new("Dog")
//!         .with_field(Field::literal("pet_type", "dog"))
//!         .with_field(Field::new("can_bark", FieldType::Boolean).with_default(true)),
//! )?;
//! registry.register_union(
//!     DiscriminatedUnion::new("Pet", "pet_type")
//!         .with_member("cat", "Cat")
//!         .with_member("dog", "Dog"),
//! )?;
//! registry.register(
//!     Shape::new("Person")
//!         .with_field(Field::new("owner", FieldType::String))
//!         .with_field(Field::new("pet", FieldType::optional(FieldType::reference("Pet")))
//!             .with_default(serde_json::Value::Null)),
//! )?;
//!
//! let document = SchemaCompiler::new().compile(&registry, "Person")?;
//! let value = document.to_value()?;
//! assert_eq!(value["required"], json!(["owner"]));
//! assert_eq!(
//!     value["definitions"]["Pet"]["discriminator"]["mapping"],
//!     json!({ "cat": "Cat", "dog": "Dog" })
//! );
//!
//! let text = document.to_json_string(IndentStyle::Spaces2)?;
//! assert!(text.starts_with("{\n  \"title\": \"Person\""));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Field Types
//!
//! | Field type | Type descriptor |
//! |------------|-----------------|
//! | [`FieldType::String`] | `{"type": "string"}` |
//! | [`FieldType::Integer`] | `{"type": "integer"}` |
//! | [`FieldType::Number`] | `{"type": "number"}` |
//! | [`FieldType::Boolean`] | `{"type": "boolean"}` |
//! | [`FieldType::Reference`] | `{"$ref": "Name"}` |
//! | [`FieldType::Optional`] | `{"oneOf": [T, {"type": "null"}]}` |
//! | [`FieldType::OneOf`] | `{"oneOf": [{"$ref": "A"}, {"$ref": "B"}]}` |
//! | [`FieldType::Array`] | `{"type": "array", "items": T}` |
//!
//! Whether a field is listed under `required` is controlled only by its
//! `required` flag; defaults and the required flag never change the type
//! descriptor.
//!
//! ## Inheritance
//!
//! A shape may name one base shape. Its effective fields are the base's
//! fields followed by its own; a field redeclared by the derived shape
//! replaces the base field in place. Bases cannot themselves have a base.
//!
//! ## Dispatch
//!
//! Compiled unions can pick the member for an instance by reading its
//! discriminator:
//!
//! ```rust
//! # use serde_json::json;
//! # use tagschema::{DiscriminatedUnion, Field, SchemaCompiler, Shape, ShapeRegistry};
//! # let mut registry = ShapeRegistry::new();
//! # registry.register(Shape::new("Cat").with_field(Field::literal("pet_type", "cat")))?;
//! # registry.register(Shape::new("Dog").with_field(Field::literal("pet_type", "dog")))?;
//! # registry.register_union(
//! #     DiscriminatedUnion::new("Pet", "pet_type")
//! #         .with_member("cat", "Cat")
//! #         .with_member("dog", "Dog"),
//! # )?;
//! let document = SchemaCompiler::new().compile(&registry, "Pet")?;
//! let member = document.select_member("Pet", &json!({ "pet_type": "dog" }))?;
//! assert_eq!(member, "Dog");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compiler;
pub mod document;
pub mod error;
pub mod registry;
pub mod shape;

pub use compiler::{CompilerConfig, ReferenceStyle, SchemaCompiler, TypeMapper};
pub use document::{
    Discriminator, IndentStyle, ObjectSchema, PrimitiveType, Property, SchemaDefinition,
    SchemaDocument, TypeDescriptor, UnionSchema,
};
pub use error::{DispatchError, RegistryError, RegistryResult, UnionViolation};
pub use registry::{ShapeRegistry, ValidatedRegistry};
pub use shape::{Definition, DiscriminatedUnion, Field, FieldType, Shape};
