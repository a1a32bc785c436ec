//! Schema document model.
//!
//! A [`SchemaDocument`] is the output of the compiler: the root shape's
//! field map at the top level plus every reachable shape and union under
//! `definitions`, cross-referenced by identifier.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "title": "Person",
//!   "type": "object",
//!   "properties": { "owner": { "type": "string" } },
//!   "required": ["owner"],
//!   "definitions": {
//!     "Pet": {
//!       "discriminator": { "propertyName": "pet_type", "mapping": { "cat": "Cat" } },
//!       "oneOf": [{ "$ref": "Cat" }]
//!     }
//!   }
//! }
//! ```
//!
//! Key order is insertion order everywhere, so rendering the same document
//! twice yields identical bytes.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;

const OBJECT_TYPE: &str = "object";

/// JSON primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl PrimitiveType {
    /// The JSON Schema type keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Null => "null",
        }
    }
}

static NULL: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveType::Null);

/// The type part of a property or of a nested schema position.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// `{"type": "<primitive>"}`
    Primitive(PrimitiveType),

    /// `{"$ref": "<identifier>"}`
    Reference(String),

    /// `{"type": "array", "items": …}`
    Array(Box<TypeDescriptor>),

    /// `{"oneOf": [ … ]}`
    OneOf(Vec<TypeDescriptor>),

    /// The wrapped type or `null`, rendered as a two-element `oneOf`.
    ///
    /// A wrapped `OneOf` is not nested: its arms are kept and the `null` arm
    /// is appended, so `OneOf([A, B])` renders as `oneOf: [A, B, null]`.
    Nullable(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Wrap a descriptor as nullable. Already-nullable descriptors are
    /// returned unchanged.
    pub fn nullable(inner: TypeDescriptor) -> Self {
        match inner {
            TypeDescriptor::Nullable(_) => inner,
            other => TypeDescriptor::Nullable(Box::new(other)),
        }
    }

    /// Check whether `null` is accepted.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeDescriptor::Nullable(_))
    }

    /// The referenced identifier, looking through a nullable wrapper.
    pub fn reference(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Reference(target) => Some(target),
            TypeDescriptor::Nullable(inner) => inner.reference(),
            _ => None,
        }
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypeDescriptor::Primitive(primitive) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", primitive.as_str())?;
                map.end()
            }
            TypeDescriptor::Reference(target) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", target)?;
                map.end()
            }
            TypeDescriptor::Array(items) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
                map.end()
            }
            TypeDescriptor::OneOf(alternatives) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("oneOf", alternatives)?;
                map.end()
            }
            TypeDescriptor::Nullable(inner) => {
                // A nullable oneOf gains a null arm instead of nesting.
                let mut alternatives: Vec<&TypeDescriptor> = match inner.as_ref() {
                    TypeDescriptor::OneOf(arms) => arms.iter().collect(),
                    other => vec![other],
                };
                alternatives.push(&NULL);

                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("oneOf", &alternatives)?;
                map.end()
            }
        }
    }
}

/// A field entry in an object schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Type descriptor, independent of `required` and `default`
    #[serde(flatten)]
    pub descriptor: TypeDescriptor,

    /// The only accepted value, for constant fields
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Field description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Property {
    /// Create a property with only a type descriptor.
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            constant: None,
            default: None,
            description: None,
        }
    }
}

/// Schema for a plain shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSchema {
    #[serde(rename = "type")]
    type_name: &'static str,

    /// Shape description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Properties in effective field order
    pub properties: IndexMap<String, Property>,

    /// Names of required properties, in field order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Create an empty object schema.
    pub fn new() -> Self {
        Self {
            type_name: OBJECT_TYPE,
            description: None,
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }

    /// Look up a property.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Check whether a property is listed as required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Which field to inspect and where each of its values leads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discriminator {
    /// Name of the discriminator field
    #[serde(rename = "propertyName")]
    pub property_name: String,

    /// Dispatch table: discriminator value to member reference
    pub mapping: IndexMap<String, String>,
}

/// Schema for a discriminated union.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionSchema {
    /// Union description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Discriminator field and dispatch table
    pub discriminator: Discriminator,

    /// Member references in declaration order
    #[serde(rename = "oneOf")]
    pub one_of: Vec<TypeDescriptor>,

    /// Discriminator value to member shape name
    #[serde(skip)]
    members: IndexMap<String, String>,
}

impl UnionSchema {
    /// Create a union schema with no members.
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            description: None,
            discriminator: Discriminator {
                property_name: property_name.into(),
                mapping: IndexMap::new(),
            },
            one_of: Vec::new(),
            members: IndexMap::new(),
        }
    }

    /// Add a member keyed by its discriminator value.
    pub fn add_member(
        &mut self,
        value: impl Into<String>,
        shape: impl Into<String>,
        reference: impl Into<String>,
    ) {
        let value = value.into();
        let reference = reference.into();
        self.discriminator
            .mapping
            .insert(value.clone(), reference.clone());
        self.members.insert(value, shape.into());
        self.one_of.push(TypeDescriptor::Reference(reference));
    }

    /// Member shape names in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.values().map(String::as_str)
    }

    /// Pick the member shape for a data instance by its discriminator value.
    pub fn select(&self, instance: &Value) -> Result<&str, DispatchError> {
        let field = &self.discriminator.property_name;

        let object = instance.as_object().ok_or_else(|| DispatchError::NotAnObject {
            field: field.clone(),
        })?;

        let tag = object
            .get(field)
            .ok_or_else(|| DispatchError::MissingDiscriminator {
                field: field.clone(),
            })?;

        let value = tag
            .as_str()
            .ok_or_else(|| DispatchError::NonStringDiscriminator {
                field: field.clone(),
                found: tag.to_string(),
            })?;

        self.members
            .get(value)
            .map(String::as_str)
            .ok_or_else(|| DispatchError::UnknownValue {
                field: field.clone(),
                value: value.to_string(),
            })
    }
}

/// A named entry under `definitions`, or the document body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaDefinition {
    /// Plain shape
    Object(ObjectSchema),

    /// Discriminated union
    Union(UnionSchema),
}

impl SchemaDefinition {
    /// Get the object schema, if this is a plain shape.
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            SchemaDefinition::Object(object) => Some(object),
            SchemaDefinition::Union(_) => None,
        }
    }

    /// Get the union schema, if this is a union.
    pub fn as_union(&self) -> Option<&UnionSchema> {
        match self {
            SchemaDefinition::Union(union) => Some(union),
            SchemaDefinition::Object(_) => None,
        }
    }
}

/// The compiled schema for a root shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDocument {
    /// Root shape name
    pub title: String,

    /// Root body, inlined at the top level
    #[serde(flatten)]
    pub root: SchemaDefinition,

    /// Every reachable definition, in discovery order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaDefinition>,
}

impl SchemaDocument {
    /// Look up a named definition.
    pub fn definition(&self, name: &str) -> Option<&SchemaDefinition> {
        self.definitions.get(name)
    }

    /// Find a union by name, including a union at the root.
    pub fn union(&self, name: &str) -> Option<&UnionSchema> {
        if name == self.title {
            if let Some(union) = self.root.as_union() {
                return Some(union);
            }
        }
        self.definitions.get(name).and_then(SchemaDefinition::as_union)
    }

    /// Pick the member of union `union` that describes `instance`.
    pub fn select_member(&self, union: &str, instance: &Value) -> Result<&str, DispatchError> {
        self.union(union)
            .ok_or_else(|| DispatchError::UnknownUnion {
                name: union.to_string(),
            })?
            .select(instance)
    }

    /// Convert to a JSON value.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Render as indented JSON.
    pub fn to_json_string(&self, indent: IndentStyle) -> serde_json::Result<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_str().as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;

        // serde_json only ever writes valid UTF-8.
        String::from_utf8(buffer).map_err(|e| serde::ser::Error::custom(e.to_string()))
    }
}

/// Indentation style for rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentStyle {
    /// Two spaces (default)
    #[default]
    Spaces2,

    /// Four spaces
    Spaces4,

    /// Tabs
    Tabs,
}

impl IndentStyle {
    /// Get the indentation string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndentStyle::Spaces2 => "  ",
            IndentStyle::Spaces4 => "    ",
            IndentStyle::Tabs => "\t",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pet_union() -> UnionSchema {
        let mut union = UnionSchema::new("pet_type");
        union.add_member("cat", "Cat", "Cat");
        union.add_member("dog", "Dog", "Dog");
        union
    }

    #[test]
    fn test_primitive_descriptor() {
        let value = serde_json::to_value(TypeDescriptor::Primitive(PrimitiveType::Integer)).unwrap();
        assert_eq!(value, json!({ "type": "integer" }));
    }

    #[test]
    fn test_nullable_reference() {
        let descriptor = TypeDescriptor::nullable(TypeDescriptor::Reference("Pet".to_string()));
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({ "oneOf": [{ "$ref": "Pet" }, { "type": "null" }] })
        );
        assert_eq!(descriptor.reference(), Some("Pet"));
    }

    #[test]
    fn test_nullable_collapses() {
        let once = TypeDescriptor::nullable(TypeDescriptor::Primitive(PrimitiveType::String));
        let twice = TypeDescriptor::nullable(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nullable_one_of_appends_null_arm() {
        let descriptor = TypeDescriptor::nullable(TypeDescriptor::OneOf(vec![
            TypeDescriptor::Reference("Cat".to_string()),
            TypeDescriptor::Reference("Dog".to_string()),
        ]));
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({ "oneOf": [{ "$ref": "Cat" }, { "$ref": "Dog" }, { "type": "null" }] })
        );
    }

    #[test]
    fn test_array_descriptor() {
        let descriptor =
            TypeDescriptor::Array(Box::new(TypeDescriptor::Primitive(PrimitiveType::Number)));
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({ "type": "array", "items": { "type": "number" } })
        );
    }

    #[test]
    fn test_property_flattens_descriptor() {
        let property = Property {
            descriptor: TypeDescriptor::Primitive(PrimitiveType::String),
            constant: Some(json!("cat")),
            default: Some(json!("cat")),
            description: None,
        };
        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            json!({ "type": "string", "const": "cat", "default": "cat" })
        );
    }

    #[test]
    fn test_null_default_is_rendered() {
        let mut property =
            Property::new(TypeDescriptor::nullable(TypeDescriptor::Reference("Pet".to_string())));
        property.default = Some(Value::Null);
        let value = serde_json::to_value(&property).unwrap();
        assert_eq!(value["default"], Value::Null);
        assert!(value.as_object().unwrap().contains_key("default"));
    }

    #[test]
    fn test_union_schema_serialization() {
        let value = serde_json::to_value(pet_union()).unwrap();
        assert_eq!(
            value,
            json!({
                "discriminator": {
                    "propertyName": "pet_type",
                    "mapping": { "cat": "Cat", "dog": "Dog" }
                },
                "oneOf": [{ "$ref": "Cat" }, { "$ref": "Dog" }]
            })
        );
    }

    #[test]
    fn test_select_member() {
        let union = pet_union();
        assert_eq!(union.select(&json!({ "pet_type": "dog", "can_bark": false })), Ok("Dog"));
        assert_eq!(
            union.select(&json!({ "pet_type": "fish" })),
            Err(DispatchError::UnknownValue {
                field: "pet_type".to_string(),
                value: "fish".to_string(),
            })
        );
        assert_eq!(
            union.select(&json!({ "can_meow": true })),
            Err(DispatchError::MissingDiscriminator {
                field: "pet_type".to_string(),
            })
        );
        assert!(matches!(
            union.select(&json!({ "pet_type": 3 })),
            Err(DispatchError::NonStringDiscriminator { .. })
        ));
        assert!(matches!(
            union.select(&json!(["cat"])),
            Err(DispatchError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_indent_styles() {
        let document = SchemaDocument {
            title: "Empty".to_string(),
            root: SchemaDefinition::Object(ObjectSchema::new()),
            definitions: IndexMap::new(),
        };

        let two = document.to_json_string(IndentStyle::Spaces2).unwrap();
        assert_eq!(two, "{\n  \"title\": \"Empty\",\n  \"type\": \"object\",\n  \"properties\": {}\n}");

        let tabs = document.to_json_string(IndentStyle::Tabs).unwrap();
        assert!(tabs.contains("\n\t\"title\""));
    }
}
