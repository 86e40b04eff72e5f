//! Declarative JSON payload schemas.
//!
//! A [`PayloadSchema`] is compiled once from a JSON Schema document and then
//! shared (read-only) by every request. Validation stops at the first
//! violation and reports the validator's message verbatim, which is what
//! clients receive in the `message` field of a 422 response.

use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors produced while compiling or applying a payload schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The schema document itself is not a valid JSON Schema.
    #[error("invalid schema definition: {0}")]
    InvalidDefinition(String),

    /// The payload does not satisfy the schema.
    #[error("{0}")]
    Invalid(String),
}

/// A compiled JSON Schema for one kind of request payload.
pub struct PayloadSchema {
    compiled: JSONSchema,
}

impl PayloadSchema {
    /// Compiles a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidDefinition`] if `definition` is not a
    /// usable schema.
    pub fn compile(definition: Value) -> Result<Self, SchemaError> {
        let compiled = JSONSchema::compile(&definition)
            .map_err(|e| SchemaError::InvalidDefinition(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Checks `payload` against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] carrying the first violation.
    pub fn validate(&self, payload: &Value) -> Result<(), SchemaError> {
        match self.compiled.validate(payload) {
            Ok(()) => Ok(()),
            Err(mut errors) => {
                let message = errors
                    .next()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "payload does not match schema".to_string());
                Err(SchemaError::Invalid(message))
            }
        }
    }

    /// Validates `payload` and then deserializes it into `T`.
    ///
    /// A value can satisfy the schema and still not fit `T` (an integer
    /// beyond `i64`, for example); that is reported as
    /// [`SchemaError::Invalid`] as well.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] if validation or deserialization fails.
    pub fn parse<T: DeserializeOwned>(&self, payload: Value) -> Result<T, SchemaError> {
        self.validate(&payload)?;
        serde_json::from_value(payload).map_err(|e| SchemaError::Invalid(e.to_string()))
    }
}

impl fmt::Debug for PayloadSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadSchema").finish_non_exhaustive()
    }
}
