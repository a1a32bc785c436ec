//! Field type to type descriptor mappings.
//!
//! | Field type | Descriptor |
//! |------------|------------|
//! | `String` | `{"type": "string"}` |
//! | `Integer` | `{"type": "integer"}` |
//! | `Number` | `{"type": "number"}` |
//! | `Boolean` | `{"type": "boolean"}` |
//! | `Reference(name)` | `{"$ref": name}` |
//! | `Optional(T)` | `{"oneOf": [T, {"type": "null"}]}` |
//! | `OneOf(names)` | `{"oneOf": [{"$ref": name}, …]}` |
//! | `Array(T)` | `{"type": "array", "items": T}` |

use crate::compiler::ReferenceStyle;
use crate::document::{PrimitiveType, TypeDescriptor};
use crate::shape::FieldType;

/// Maps declared field types to schema type descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    reference_style: ReferenceStyle,
}

impl TypeMapper {
    /// Create a mapper that renders references in the given style.
    pub fn new(reference_style: ReferenceStyle) -> Self {
        Self { reference_style }
    }

    /// Map a field type to its descriptor.
    pub fn map_type(&self, ty: &FieldType) -> TypeDescriptor {
        match ty {
            FieldType::String => TypeDescriptor::Primitive(PrimitiveType::String),
            FieldType::Integer => TypeDescriptor::Primitive(PrimitiveType::Integer),
            FieldType::Number => TypeDescriptor::Primitive(PrimitiveType::Number),
            FieldType::Boolean => TypeDescriptor::Primitive(PrimitiveType::Boolean),
            FieldType::Reference(name) => TypeDescriptor::Reference(self.reference(name)),
            FieldType::Optional(inner) => TypeDescriptor::nullable(self.map_type(inner)),
            FieldType::OneOf(names) => {
                TypeDescriptor::OneOf(names.iter().map(|n| self.map_reference(n)).collect())
            }
            FieldType::Array(item) => TypeDescriptor::Array(Box::new(self.map_type(item))),
        }
    }

    /// Render a definition name as a reference target.
    pub fn reference(&self, name: &str) -> String {
        self.reference_style.render(name)
    }

    fn map_reference(&self, name: &str) -> TypeDescriptor {
        TypeDescriptor::Reference(self.reference(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> TypeMapper {
        TypeMapper::default()
    }

    #[test]
    fn test_map_primitives() {
        assert_eq!(
            mapper().map_type(&FieldType::String),
            TypeDescriptor::Primitive(PrimitiveType::String)
        );
        assert_eq!(
            mapper().map_type(&FieldType::Boolean),
            TypeDescriptor::Primitive(PrimitiveType::Boolean)
        );
    }

    #[test]
    fn test_map_nested_optional_collapses() {
        let ty = FieldType::optional(FieldType::optional(FieldType::Integer));
        assert_eq!(
            mapper().map_type(&ty),
            TypeDescriptor::nullable(TypeDescriptor::Primitive(PrimitiveType::Integer))
        );
    }

    #[test]
    fn test_map_reference_styles() {
        let ty = FieldType::reference("Pet");
        assert_eq!(
            mapper().map_type(&ty),
            TypeDescriptor::Reference("Pet".to_string())
        );
        assert_eq!(
            TypeMapper::new(ReferenceStyle::Pointer).map_type(&ty),
            TypeDescriptor::Reference("#/definitions/Pet".to_string())
        );
    }

    #[test]
    fn test_map_one_of_and_array() {
        let ty = FieldType::array(FieldType::one_of(["Cat", "Dog"]));
        assert_eq!(
            mapper().map_type(&ty),
            TypeDescriptor::Array(Box::new(TypeDescriptor::OneOf(vec![
                TypeDescriptor::Reference("Cat".to_string()),
                TypeDescriptor::Reference("Dog".to_string()),
            ])))
        );
    }
}
