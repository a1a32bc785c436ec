//! Schema compiler.
//!
//! Walks a validated registry from a root definition and produces a
//! [`SchemaDocument`]. Traversal is depth first over field types; each
//! definition is expanded once and referenced by identifier afterwards, so
//! cycles terminate and shared unions keep a single identity.
//!
//! # Example
//!
//! ```rust
//! use tagschema::{Field, FieldType, SchemaCompiler, Shape, ShapeRegistry};
//!
//! let mut registry = ShapeRegistry::new();
//! registry
//!     .register(Shape::new("Person").with_field(Field::new("owner", FieldType::String)))
//!     .unwrap();
//!
//! let document = SchemaCompiler::new().compile(&registry, "Person").unwrap();
//! assert_eq!(document.title, "Person");
//! ```

pub mod type_mapper;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::document::{ObjectSchema, Property, SchemaDefinition, SchemaDocument, UnionSchema};
use crate::error::{RegistryError, RegistryResult};
use crate::registry::{first_unresolved, ShapeRegistry, ValidatedRegistry};
use crate::shape::{Definition, DiscriminatedUnion, Shape};

pub use type_mapper::TypeMapper;

/// Prefix for pointer-style references.
pub const DEFINITIONS_POINTER: &str = "#/definitions/";

/// How references to definitions are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceStyle {
    /// The bare definition name: `"Pet"`
    #[default]
    Name,

    /// A JSON pointer into `definitions`: `"#/definitions/Pet"`
    Pointer,
}

impl ReferenceStyle {
    /// Render a definition name as a reference target.
    pub fn render(&self, name: &str) -> String {
        match self {
            ReferenceStyle::Name => name.to_string(),
            ReferenceStyle::Pointer => format!("{}{}", DEFINITIONS_POINTER, name),
        }
    }
}

/// Compiler configuration options.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Reference style used by `$ref` and by discriminator mappings
    pub reference_style: ReferenceStyle,

    /// Whether shape, union and field descriptions are emitted
    pub include_descriptions: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            reference_style: ReferenceStyle::default(),
            include_descriptions: true,
        }
    }
}

impl CompilerConfig {
    /// Create a new compiler config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reference style.
    pub fn with_reference_style(mut self, style: ReferenceStyle) -> Self {
        self.reference_style = style;
        self
    }

    /// Set whether descriptions are emitted.
    pub fn with_descriptions(mut self, include: bool) -> Self {
        self.include_descriptions = include;
        self
    }
}

/// Compiles registry definitions into schema documents.
///
/// The compiler holds no state between calls; compiling the same registry
/// twice yields identical documents.
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    config: CompilerConfig,
    type_mapper: TypeMapper,
}

impl SchemaCompiler {
    /// Create a compiler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler with the given configuration.
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            type_mapper: TypeMapper::new(config.reference_style),
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Validate `registry` and compile the document for `root`.
    ///
    /// Propagates [`RegistryError::InvalidUnion`] (and base errors) from
    /// validation before any traversal starts.
    pub fn compile(&self, registry: &ShapeRegistry, root: &str) -> RegistryResult<SchemaDocument> {
        let validated = registry.validate_registry()?;
        self.compile_validated(&validated, root)
    }

    /// Compile the document for `root` from an already validated registry.
    ///
    /// Fails with [`RegistryError::UnknownShape`] if `root` is not registered
    /// and with [`RegistryError::UnresolvedReference`] as soon as a field
    /// names a missing definition.
    pub fn compile_validated(
        &self,
        registry: &ValidatedRegistry<'_>,
        root: &str,
    ) -> RegistryResult<SchemaDocument> {
        let definition = registry.resolve(root)?;
        tracing::debug!(root = %root, "compiling schema");

        let mut walk = Walk {
            compiler: self,
            registry,
            root,
            slots: IndexMap::new(),
        };
        let body = walk.build(definition)?;

        // The root gets a definition only when something refers back to it.
        if let Some(slot) = walk.slots.get_mut(root) {
            *slot = Some(body.clone());
        }

        let definitions: IndexMap<String, SchemaDefinition> = walk
            .slots
            .into_iter()
            .filter_map(|(name, schema)| schema.map(|schema| (name, schema)))
            .collect();

        tracing::debug!(root = %root, definitions = definitions.len(), "schema compiled");
        Ok(SchemaDocument {
            title: root.to_string(),
            root: body,
            definitions,
        })
    }
}

/// State of one compilation.
struct Walk<'c, 'r> {
    compiler: &'c SchemaCompiler,
    registry: &'c ValidatedRegistry<'r>,
    root: &'c str,
    /// Definitions in discovery order; `None` while still being built
    slots: IndexMap<String, Option<SchemaDefinition>>,
}

impl Walk<'_, '_> {
    fn visit(&mut self, name: &str) -> RegistryResult<()> {
        if self.slots.contains_key(name) {
            return Ok(());
        }
        self.slots.insert(name.to_string(), None);

        if name == self.root {
            return Ok(());
        }

        tracing::trace!(definition = %name, "expanding definition");
        let definition = self.registry.resolve(name)?;
        let schema = self.build(definition)?;
        self.slots.insert(name.to_string(), Some(schema));
        Ok(())
    }

    fn build(&mut self, definition: &Definition) -> RegistryResult<SchemaDefinition> {
        match definition {
            Definition::Shape(shape) => self.build_object(shape).map(SchemaDefinition::Object),
            Definition::Union(union) => self.build_union(union).map(SchemaDefinition::Union),
        }
    }

    fn build_object(&mut self, shape: &Shape) -> RegistryResult<ObjectSchema> {
        let registry = self.registry;
        let fields = registry
            .effective_fields(&shape.name)
            .unwrap_or(shape.fields.as_slice());
        let include_descriptions = self.compiler.config.include_descriptions;

        let mut object = ObjectSchema::new();
        if include_descriptions {
            object.description = shape.description.clone();
        }

        for field in fields {
            if let Some(missing) = first_unresolved(registry.registry(), &field.ty) {
                return Err(RegistryError::unresolved(&shape.name, &field.name, missing));
            }

            let property = Property {
                descriptor: self.compiler.type_mapper.map_type(&field.ty),
                constant: field.constant_value().cloned(),
                default: field.default.clone(),
                description: field
                    .description
                    .clone()
                    .filter(|_| include_descriptions),
            };
            object.properties.insert(field.name.clone(), property);
            if field.required {
                object.required.push(field.name.clone());
            }

            for name in field.ty.references() {
                self.visit(name)?;
            }
        }

        Ok(object)
    }

    fn build_union(&mut self, union: &DiscriminatedUnion) -> RegistryResult<UnionSchema> {
        let mut schema = UnionSchema::new(&union.discriminator_field);
        if self.compiler.config.include_descriptions {
            schema.description = union.description.clone();
        }

        for (value, member) in &union.members {
            let reference = self.compiler.type_mapper.reference(member);
            schema.add_member(value, member, reference);
        }

        for member in union.member_shapes() {
            self.visit(member)?;
        }

        Ok(schema)
    }
}
