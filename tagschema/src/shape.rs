//! Shape definitions.
//!
//! This module defines the immutable building blocks of a registry:
//! [`Field`], [`Shape`], [`DiscriminatedUnion`] and the [`FieldType`]
//! a field is declared with. Definitions are plain data; lookups and
//! validation live in [`crate::registry`].

use serde_json::Value;

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// String value
    String,

    /// Integer value
    Integer,

    /// Floating point value
    Number,

    /// Boolean value
    Boolean,

    /// Reference to another shape or union by name
    Reference(String),

    /// Nullable wrapper around another type
    Optional(Box<FieldType>),

    /// Any one of the named shapes, with no discriminator
    OneOf(Vec<String>),

    /// Homogeneous list
    Array(Box<FieldType>),
}

impl FieldType {
    /// Create a reference to another definition.
    pub fn reference(name: impl Into<String>) -> Self {
        FieldType::Reference(name.into())
    }

    /// Wrap a type as nullable.
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    /// Create a list of the given item type.
    pub fn array(item: FieldType) -> Self {
        FieldType::Array(Box::new(item))
    }

    /// Create a plain union over the named shapes.
    pub fn one_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::OneOf(names.into_iter().map(Into::into).collect())
    }

    /// Check whether this type is wrapped as nullable.
    pub fn is_optional(&self) -> bool {
        matches!(self, FieldType::Optional(_))
    }

    /// Names of every definition this type refers to, in declaration order.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            FieldType::Reference(name) => names.push(name),
            FieldType::OneOf(members) => names.extend(members.iter().map(String::as_str)),
            FieldType::Optional(inner) | FieldType::Array(inner) => {
                inner.collect_references(names)
            }
            FieldType::String | FieldType::Integer | FieldType::Number | FieldType::Boolean => {}
        }
    }
}

/// A named attribute of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, unique within its shape
    pub name: String,

    /// Declared type
    pub ty: FieldType,

    /// Whether the field appears in the document's `required` list
    pub required: bool,

    /// Default value, if any
    pub default: Option<Value>,

    /// Whether the default is the only accepted value
    pub constant: bool,

    /// Human readable description
    pub description: Option<String>,
}

impl Field {
    /// Create a required field with no default.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            constant: false,
            description: None,
        }
    }

    /// Create a required string field fixed to `value`.
    ///
    /// This is the form a discriminator field takes in every member of a
    /// discriminated union.
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::String,
            required: true,
            default: Some(Value::String(value.into())),
            constant: true,
            description: None,
        }
    }

    /// Set a default value. A field with a default is no longer required.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self.required = false;
        self.constant = false;
        self
    }

    /// Override the required flag.
    ///
    /// A required field may only keep a default if it is a constant; the
    /// registry rejects anything else.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The constant value of this field, if it is fixed.
    pub fn constant_value(&self) -> Option<&Value> {
        if self.constant {
            self.default.as_ref()
        } else {
            None
        }
    }
}

/// A named record definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Shape name, unique across the registry
    pub name: String,

    /// Fields in declaration order
    pub fields: Vec<Field>,

    /// Shape whose fields are logically prepended
    pub base: Option<String>,

    /// Human readable description
    pub description: Option<String>,
}

impl Shape {
    /// Create a shape with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            base: None,
            description: None,
        }
    }

    /// Append a field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace all fields.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Set the base shape.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up a declared field by name (own fields only).
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A union of shapes selected by the value of a discriminator field.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatedUnion {
    /// Union name, unique across the registry
    pub name: String,

    /// Field every member declares as a fixed literal
    pub discriminator_field: String,

    /// `(discriminator value, member shape name)` in declaration order
    pub members: Vec<(String, String)>,

    /// Human readable description
    pub description: Option<String>,
}

impl DiscriminatedUnion {
    /// Create a union with no members.
    pub fn new(name: impl Into<String>, discriminator_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminator_field: discriminator_field.into(),
            members: Vec::new(),
            description: None,
        }
    }

    /// Add a member keyed by its discriminator value.
    pub fn with_member(mut self, value: impl Into<String>, shape: impl Into<String>) -> Self {
        self.members.push((value.into(), shape.into()));
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Member shape names in declaration order.
    pub fn member_shapes(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(_, shape)| shape.as_str())
    }
}

/// Anything that can be registered under a name.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// Plain record shape
    Shape(Shape),

    /// Discriminated union over shapes
    Union(DiscriminatedUnion),
}

impl Definition {
    /// The registered name.
    pub fn name(&self) -> &str {
        match self {
            Definition::Shape(shape) => &shape.name,
            Definition::Union(union) => &union.name,
        }
    }

    /// Get the shape, if this is a shape.
    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Definition::Shape(shape) => Some(shape),
            Definition::Union(_) => None,
        }
    }

    /// Get the union, if this is a union.
    pub fn as_union(&self) -> Option<&DiscriminatedUnion> {
        match self {
            Definition::Union(union) => Some(union),
            Definition::Shape(_) => None,
        }
    }
}

impl From<Shape> for Definition {
    fn from(shape: Shape) -> Self {
        Definition::Shape(shape)
    }
}

impl From<DiscriminatedUnion> for Definition {
    fn from(union: DiscriminatedUnion) -> Self {
        Definition::Union(union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_defaults_to_required() {
        let field = Field::new("owner", FieldType::String);
        assert!(field.required);
        assert!(field.default.is_none());
        assert!(field.constant_value().is_none());
    }

    #[test]
    fn test_default_clears_required() {
        let field = Field::new("can_meow", FieldType::Boolean).with_default(true);
        assert!(!field.required);
        assert_eq!(field.default, Some(json!(true)));
    }

    #[test]
    fn test_literal_is_required_constant() {
        let field = Field::literal("pet_type", "cat");
        assert!(field.required);
        assert_eq!(field.ty, FieldType::String);
        assert_eq!(field.constant_value(), Some(&json!("cat")));
    }

    #[test]
    fn test_null_default_is_kept() {
        let field = Field::new("pet", FieldType::optional(FieldType::reference("Pet")))
            .with_default(Value::Null);
        assert_eq!(field.default, Some(Value::Null));
        assert!(field.ty.is_optional());
    }

    #[test]
    fn test_references_walk_wrappers() {
        let ty = FieldType::optional(FieldType::array(FieldType::one_of(["Cat", "Dog"])));
        assert_eq!(ty.references(), vec!["Cat", "Dog"]);
        assert!(FieldType::Integer.references().is_empty());
    }

    #[test]
    fn test_union_members_keep_order() {
        let union = DiscriminatedUnion::new("Pet", "pet_type")
            .with_member("dog", "Dog")
            .with_member("cat", "Cat");
        assert_eq!(union.member_shapes().collect::<Vec<_>>(), vec!["Dog", "Cat"]);
    }
}
