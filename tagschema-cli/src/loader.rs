//! Registry definition files.
//!
//! A registry file lists shapes and unions in JSON or TOML:
//!
//! ```json
//! {
//!   "shapes": [
//!     { "name": "Cat", "fields": [
//!         { "name": "pet_type", "const": "cat" },
//!         { "name": "can_meow", "type": "boolean", "default": true }
//!     ] }
//!   ],
//!   "unions": [
//!     { "name": "Pet", "discriminator": "pet_type",
//!       "members": [{ "value": "cat", "shape": "Cat" }] }
//!   ]
//! }
//! ```
//!
//! A field `type` is `string`, `integer`, `number`, `boolean`, the name of
//! another definition, `{"array": <type>}` or `{"one_of": [<names>]}`.

use crate::error::LoadError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tagschema::{DiscriminatedUnion, Field, FieldType, Shape, ShapeRegistry};

/// Top level of a registry file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryFile {
    #[serde(default)]
    pub shapes: Vec<ShapeSpec>,

    #[serde(default)]
    pub unions: Vec<UnionSpec>,
}

/// A shape entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeSpec {
    pub name: String,

    #[serde(default)]
    pub base: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// A field entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,

    #[serde(rename = "type", default)]
    pub ty: Option<TypeSpec>,

    /// Wrap the type as nullable.
    #[serde(default)]
    pub nullable: bool,

    /// Default value. An explicit `null` is kept.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,

    /// Fix the field to a string literal (the discriminator form).
    #[serde(rename = "const", default)]
    pub constant: Option<String>,

    /// Override the required flag.
    #[serde(default)]
    pub required: Option<bool>,

    #[serde(default)]
    pub description: Option<String>,
}

/// A field type as written in a registry file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    /// A primitive name or a definition name
    Named(String),

    /// `{"array": <type>}`
    Array { array: Box<TypeSpec> },

    /// `{"one_of": [<names>]}`
    OneOf { one_of: Vec<String> },
}

/// A union entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionSpec {
    pub name: String,

    pub discriminator: String,

    #[serde(default)]
    pub description: Option<String>,

    pub members: Vec<MemberSpec>,
}

/// One `value -> shape` entry of a union.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSpec {
    pub value: String,
    pub shape: String,
}

/// Deserialize a present value, including `null`, as `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TypeSpec {
    fn to_field_type(&self) -> FieldType {
        match self {
            TypeSpec::Named(name) => match name.as_str() {
                "string" => FieldType::String,
                "integer" => FieldType::Integer,
                "number" => FieldType::Number,
                "boolean" => FieldType::Boolean,
                other => FieldType::reference(other),
            },
            TypeSpec::Array { array } => FieldType::array(array.to_field_type()),
            TypeSpec::OneOf { one_of } => FieldType::one_of(one_of.iter().cloned()),
        }
    }
}

impl FieldSpec {
    fn to_field(&self, shape: &str) -> Result<Field, String> {
        let mut field = match (&self.constant, &self.ty) {
            (Some(value), None) | (Some(value), Some(TypeSpec::Named(_))) => {
                if let Some(TypeSpec::Named(name)) = &self.ty {
                    if name != "string" {
                        return Err(format!(
                            "field '{}.{}': const values must be strings",
                            shape, self.name
                        ));
                    }
                }
                if self.default.is_some() {
                    return Err(format!(
                        "field '{}.{}': const and default are mutually exclusive",
                        shape, self.name
                    ));
                }
                Field::literal(&self.name, value)
            }
            (Some(_), Some(_)) => {
                return Err(format!(
                    "field '{}.{}': const values must be strings",
                    shape, self.name
                ))
            }
            (None, None) => {
                return Err(format!("field '{}.{}' has no type", shape, self.name));
            }
            (None, Some(ty)) => {
                let ty = ty.to_field_type();
                let ty = if self.nullable { FieldType::optional(ty) } else { ty };
                let field = Field::new(&self.name, ty);
                match &self.default {
                    Some(default) => field.with_default(default.clone()),
                    None => field,
                }
            }
        };

        if let Some(required) = self.required {
            field = field.with_required(required);
        }
        if field.required && field.default.is_some() && !field.constant {
            return Err(format!(
                "field '{}.{}': a required field cannot have a default",
                shape, self.name
            ));
        }
        if let Some(description) = &self.description {
            field = field.with_description(description);
        }
        Ok(field)
    }
}

impl RegistryFile {
    /// Build a registry, registering shapes first and then unions.
    pub fn into_registry(self, path: &Path) -> Result<ShapeRegistry, LoadError> {
        let mut registry = ShapeRegistry::new();

        for spec in &self.shapes {
            let mut shape = Shape::new(&spec.name);
            for field in &spec.fields {
                let field = field
                    .to_field(&spec.name)
                    .map_err(|message| LoadError::parse(path.to_path_buf(), message))?;
                shape = shape.with_field(field);
            }
            if let Some(base) = &spec.base {
                shape = shape.with_base(base);
            }
            if let Some(description) = &spec.description {
                shape = shape.with_description(description);
            }
            registry.register(shape).map_err(|source| LoadError::Definition {
                path: path.to_path_buf(),
                source,
            })?;
        }

        for spec in self.unions {
            let mut union = DiscriminatedUnion::new(spec.name, spec.discriminator);
            for member in spec.members {
                union = union.with_member(member.value, member.shape);
            }
            if let Some(description) = spec.description {
                union = union.with_description(description);
            }
            registry
                .register_union(union)
                .map_err(|source| LoadError::Definition {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        Ok(registry)
    }
}

/// Loads registry definition files.
pub struct RegistryLoader;

impl RegistryLoader {
    /// Load a registry from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<ShapeRegistry, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let registry = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content, path)?,
            Some("toml") => Self::from_toml_str(&content, path)?,
            _ => {
                return Err(LoadError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        tracing::debug!(
            path = %path.display(),
            definitions = registry.len(),
            "loaded registry"
        );
        Ok(registry)
    }

    /// Parse a JSON registry file. `path` is only used in errors.
    pub fn from_json_str(content: &str, path: &Path) -> Result<ShapeRegistry, LoadError> {
        let file: RegistryFile = serde_json::from_str(content)
            .map_err(|e| LoadError::parse(PathBuf::from(path), e.to_string()))?;
        file.into_registry(path)
    }

    /// Parse a TOML registry file. `path` is only used in errors.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<ShapeRegistry, LoadError> {
        let file: RegistryFile = toml::from_str(content)
            .map_err(|e| LoadError::parse(PathBuf::from(path), e.to_string()))?;
        file.into_registry(path)
    }
}
