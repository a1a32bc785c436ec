//! Shape registry for collecting and validating definitions.
//!
//! The registry owns every [`Shape`] and [`DiscriminatedUnion`] in one
//! insertion-ordered namespace. [`ShapeRegistry::validate_registry`] resolves
//! base shapes into effective field lists and checks every union, producing a
//! [`ValidatedRegistry`] snapshot that the compiler reads from.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{RegistryError, RegistryResult, UnionViolation};
use crate::shape::{Definition, DiscriminatedUnion, Field, FieldType, Shape};

/// A registry of shape and union definitions.
///
/// Definitions are immutable once registered. Registration order is kept so
/// that anything derived from the registry is deterministic.
#[derive(Debug, Default, Clone)]
pub struct ShapeRegistry {
    definitions: IndexMap<String, Definition>,
}

impl ShapeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape.
    ///
    /// Fails with [`RegistryError::DuplicateShape`] if the name is taken and
    /// with [`RegistryError::DuplicateField`] if the shape repeats a field
    /// name. A field that is required and has a default must be a constant,
    /// otherwise [`RegistryError::RequiredWithDefault`]. The registry is
    /// unchanged after a failed call.
    pub fn register(&mut self, shape: Shape) -> RegistryResult<()> {
        self.ensure_vacant(&shape.name)?;

        let mut seen = HashSet::new();
        for field in &shape.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(RegistryError::DuplicateField {
                    shape: shape.name.clone(),
                    field: field.name.clone(),
                });
            }
            if field.required && field.default.is_some() && !field.constant {
                return Err(RegistryError::RequiredWithDefault {
                    shape: shape.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        tracing::trace!(shape = %shape.name, fields = shape.fields.len(), "registered shape");
        self.definitions
            .insert(shape.name.clone(), Definition::Shape(shape));
        Ok(())
    }

    /// Register a discriminated union.
    ///
    /// Members are not checked here; see [`ShapeRegistry::validate_registry`].
    pub fn register_union(&mut self, union: DiscriminatedUnion) -> RegistryResult<()> {
        self.ensure_vacant(&union.name)?;

        tracing::trace!(union = %union.name, members = union.members.len(), "registered union");
        self.definitions
            .insert(union.name.clone(), Definition::Union(union));
        Ok(())
    }

    /// Register either kind of definition.
    pub fn register_definition(&mut self, definition: impl Into<Definition>) -> RegistryResult<()> {
        match definition.into() {
            Definition::Shape(shape) => self.register(shape),
            Definition::Union(union) => self.register_union(union),
        }
    }

    fn ensure_vacant(&self, name: &str) -> RegistryResult<()> {
        if self.definitions.contains_key(name) {
            return Err(RegistryError::duplicate_shape(name));
        }
        Ok(())
    }

    /// Resolve a definition by name.
    pub fn resolve(&self, name: &str) -> RegistryResult<&Definition> {
        self.definitions
            .get(name)
            .ok_or_else(|| RegistryError::unknown_shape(name))
    }

    /// Get a definition by name.
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    /// All plain shapes in registration order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.definitions.values().filter_map(Definition::as_shape)
    }

    /// All discriminated unions in registration order.
    pub fn unions(&self) -> impl Iterator<Item = &DiscriminatedUnion> {
        self.definitions.values().filter_map(Definition::as_union)
    }

    /// Shapes that hold a discriminated union in one of their own fields,
    /// directly or through a nullable or list wrapper.
    pub fn container_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes().filter(move |shape| {
            shape.fields.iter().any(|field| {
                field
                    .ty
                    .references()
                    .into_iter()
                    .any(|name| matches!(self.get(name), Some(Definition::Union(_))))
            })
        })
    }

    /// Get the number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve base shapes and check every discriminated union.
    ///
    /// Base problems fail fast with [`RegistryError::UnknownShape`] or
    /// [`RegistryError::InvalidBase`]. Union problems are accumulated and
    /// reported together in one [`RegistryError::InvalidUnion`].
    pub fn validate_registry(&self) -> RegistryResult<ValidatedRegistry<'_>> {
        let mut effective = IndexMap::new();
        for shape in self.shapes() {
            effective.insert(shape.name.clone(), self.effective_fields(shape)?);
        }

        let mut violations = Vec::new();
        for union in self.unions() {
            self.check_union(union, &effective, &mut violations);
        }

        if !violations.is_empty() {
            tracing::debug!(count = violations.len(), "registry validation failed");
            return Err(RegistryError::InvalidUnion(violations));
        }

        tracing::debug!(definitions = self.len(), "registry validated");
        Ok(ValidatedRegistry {
            registry: self,
            effective,
        })
    }

    /// Base fields followed by the shape's own fields. A field redeclared by
    /// the shape takes the base field's position.
    fn effective_fields(&self, shape: &Shape) -> RegistryResult<Vec<Field>> {
        let Some(base_name) = &shape.base else {
            return Ok(shape.fields.clone());
        };

        if base_name == &shape.name {
            return Err(RegistryError::invalid_base(
                &shape.name,
                base_name,
                "a shape cannot be its own base",
            ));
        }

        let base = match self.resolve(base_name)? {
            Definition::Shape(base) => base,
            Definition::Union(_) => {
                return Err(RegistryError::invalid_base(
                    &shape.name,
                    base_name,
                    "a discriminated union cannot be a base",
                ))
            }
        };

        if base.base.is_some() {
            return Err(RegistryError::invalid_base(
                &shape.name,
                base_name,
                "only single-level inheritance is supported",
            ));
        }

        let mut fields = base.fields.clone();
        for field in &shape.fields {
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(slot) => *slot = field.clone(),
                None => fields.push(field.clone()),
            }
        }
        Ok(fields)
    }

    fn check_union(
        &self,
        union: &DiscriminatedUnion,
        effective: &IndexMap<String, Vec<Field>>,
        violations: &mut Vec<UnionViolation>,
    ) {
        if union.members.is_empty() {
            violations.push(UnionViolation::Empty {
                union: union.name.clone(),
            });
            return;
        }

        let discriminator = &union.discriminator_field;
        let mut seen = HashSet::new();

        for (value, member) in &union.members {
            if !seen.insert(value.as_str()) {
                violations.push(UnionViolation::DuplicateValue {
                    union: union.name.clone(),
                    value: value.clone(),
                });
            }

            match self.get(member) {
                None => violations.push(UnionViolation::UnknownMember {
                    union: union.name.clone(),
                    value: value.clone(),
                    shape: member.clone(),
                }),
                Some(Definition::Union(_)) => violations.push(UnionViolation::MemberNotAShape {
                    union: union.name.clone(),
                    value: value.clone(),
                    shape: member.clone(),
                }),
                Some(Definition::Shape(_)) => {
                    let field = effective
                        .get(member)
                        .and_then(|fields| fields.iter().find(|f| &f.name == discriminator));

                    let Some(field) = field else {
                        violations.push(UnionViolation::MissingDiscriminator {
                            union: union.name.clone(),
                            member: member.clone(),
                            field: discriminator.clone(),
                        });
                        continue;
                    };

                    if field.ty != FieldType::String {
                        violations.push(UnionViolation::DiscriminatorNotString {
                            union: union.name.clone(),
                            member: member.clone(),
                            field: discriminator.clone(),
                        });
                    }

                    let expected = Value::String(value.clone());
                    if !field.required || !field.constant {
                        violations.push(UnionViolation::DiscriminatorNotConstant {
                            union: union.name.clone(),
                            member: member.clone(),
                            field: discriminator.clone(),
                        });
                    } else if field.default.as_ref() != Some(&expected) {
                        violations.push(UnionViolation::DiscriminatorMismatch {
                            union: union.name.clone(),
                            member: member.clone(),
                            field: discriminator.clone(),
                            expected: value.clone(),
                            found: field
                                .default
                                .as_ref()
                                .map(Value::to_string)
                                .unwrap_or_else(|| "nothing".to_string()),
                        });
                    }
                }
            }
        }
    }
}

/// A registry whose bases are resolved and whose unions are known to be
/// well formed.
///
/// The snapshot borrows the registry, so the registry cannot change while a
/// compilation reads from it.
#[derive(Debug, Clone)]
pub struct ValidatedRegistry<'a> {
    registry: &'a ShapeRegistry,
    effective: IndexMap<String, Vec<Field>>,
}

impl<'a> ValidatedRegistry<'a> {
    /// The underlying registry.
    pub fn registry(&self) -> &'a ShapeRegistry {
        self.registry
    }

    /// Resolve a definition by name.
    pub fn resolve(&self, name: &str) -> RegistryResult<&'a Definition> {
        self.registry.resolve(name)
    }

    /// Get a definition by name.
    pub fn get(&self, name: &str) -> Option<&'a Definition> {
        self.registry.get(name)
    }

    /// The effective field list of a shape: base fields first, then its own.
    pub fn effective_fields(&self, shape: &str) -> Option<&[Field]> {
        self.effective.get(shape).map(Vec::as_slice)
    }
}

/// Check whether `ty` mentions a name the registry does not define.
///
/// Returns the first missing name in declaration order.
pub(crate) fn first_unresolved<'t>(registry: &ShapeRegistry, ty: &'t FieldType) -> Option<&'t str> {
    ty.references()
        .into_iter()
        .find(|name| !registry.contains(name))
}
