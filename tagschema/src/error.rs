//! Error types for registry construction, validation and compilation.
//!
//! Every error carries the names needed to locate the problem (shape,
//! field, discriminator value) without re-running the operation.

use thiserror::Error;

/// Result type alias for registry and compiler operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Main error type for the shape registry and the schema compiler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// A definition with the same name is already registered.
    #[error("Definition '{name}' is already registered")]
    DuplicateShape { name: String },

    /// A shape declares the same field name twice.
    #[error("Shape '{shape}' declares field '{field}' more than once")]
    DuplicateField { shape: String, field: String },

    /// A required field carries a default without being a constant.
    #[error("Field '{shape}.{field}' is required but has a default (only constant fields may be both)")]
    RequiredWithDefault { shape: String, field: String },

    /// A lookup named a definition that is not registered.
    #[error("Unknown shape '{name}'")]
    UnknownShape { name: String },

    /// A shape's base cannot be used as a base.
    #[error("Shape '{shape}' cannot use '{base}' as its base: {reason}")]
    InvalidBase {
        shape: String,
        base: String,
        reason: String,
    },

    /// One or more discriminated unions are malformed.
    #[error("Invalid discriminated union(s):\n{}", format_violations(.0))]
    InvalidUnion(Vec<UnionViolation>),

    /// A field type references a definition that is not registered.
    #[error("Field '{shape}.{field}' references unknown shape '{missing}'")]
    UnresolvedReference {
        shape: String,
        field: String,
        missing: String,
    },
}

impl RegistryError {
    /// Create a duplicate shape error.
    pub fn duplicate_shape(name: impl Into<String>) -> Self {
        Self::DuplicateShape { name: name.into() }
    }

    /// Create an unknown shape error.
    pub fn unknown_shape(name: impl Into<String>) -> Self {
        Self::UnknownShape { name: name.into() }
    }

    /// Create an invalid base error.
    pub fn invalid_base(
        shape: impl Into<String>,
        base: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidBase {
            shape: shape.into(),
            base: base.into(),
            reason: reason.into(),
        }
    }

    /// Create an unresolved reference error.
    pub fn unresolved(
        shape: impl Into<String>,
        field: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        Self::UnresolvedReference {
            shape: shape.into(),
            field: field.into(),
            missing: missing.into(),
        }
    }

    /// The accumulated union violations, if this is an `InvalidUnion` error.
    pub fn violations(&self) -> &[UnionViolation] {
        match self {
            Self::InvalidUnion(violations) => violations,
            _ => &[],
        }
    }
}

/// A single problem found while validating a discriminated union.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnionViolation {
    /// The union has no members.
    #[error("union '{union}' has no members")]
    Empty { union: String },

    /// Two members share a discriminator value.
    #[error("union '{union}' maps discriminator value '{value}' more than once")]
    DuplicateValue { union: String, value: String },

    /// A member names a definition that is not registered.
    #[error("union '{union}' member '{value}' names unknown shape '{shape}'")]
    UnknownMember {
        union: String,
        value: String,
        shape: String,
    },

    /// A member names another union instead of a shape.
    #[error("union '{union}' member '{value}' names union '{shape}', expected a shape")]
    MemberNotAShape {
        union: String,
        value: String,
        shape: String,
    },

    /// A member shape does not declare the discriminator field.
    #[error("shape '{member}' in union '{union}' does not declare discriminator field '{field}'")]
    MissingDiscriminator {
        union: String,
        member: String,
        field: String,
    },

    /// The discriminator field is not declared as a string.
    #[error("field '{member}.{field}' in union '{union}' must be a string")]
    DiscriminatorNotString {
        union: String,
        member: String,
        field: String,
    },

    /// The discriminator field is not a required constant.
    #[error("field '{member}.{field}' in union '{union}' must be a required constant")]
    DiscriminatorNotConstant {
        union: String,
        member: String,
        field: String,
    },

    /// The constant on the discriminator field differs from the member key.
    #[error(
        "field '{member}.{field}' in union '{union}' is fixed to {found}, expected \"{expected}\""
    )]
    DiscriminatorMismatch {
        union: String,
        member: String,
        field: String,
        expected: String,
        found: String,
    },
}

/// Error raised when selecting a union member for a data instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The document has no union with this name.
    #[error("Unknown union '{name}'")]
    UnknownUnion { name: String },

    /// The instance is not a JSON object.
    #[error("Expected an object carrying discriminator '{field}'")]
    NotAnObject { field: String },

    /// The instance lacks the discriminator property.
    #[error("Missing discriminator property '{field}'")]
    MissingDiscriminator { field: String },

    /// The discriminator property is not a string.
    #[error("Discriminator property '{field}' must be a string, found {found}")]
    NonStringDiscriminator { field: String, found: String },

    /// No member is keyed by this discriminator value.
    #[error("No member of the union is keyed by '{value}' (property '{field}')")]
    UnknownValue { field: String, value: String },
}

/// Format accumulated violations for display.
fn format_violations(violations: &[UnionViolation]) -> String {
    violations
        .iter()
        .enumerate()
        .map(|(i, v)| format!("  {}. {}", i + 1, v))
        .collect::<Vec<_>>()
        .join("\n")
}
