//! Validation of rendered documents against the UBER+JSON schema.

use serde_json::{json, Value};

use crate::error::{SchemaError, ValidateError};

/// JSON Schema describing UBER+JSON documents as this crate renders them.
pub fn uber_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["uber"],
        "properties": {
            "uber": {
                "type": "object",
                "required": ["version"],
                "properties": {
                    "version": { "type": "string" },
                    "data": { "type": "array", "items": { "$ref": "#/definitions/data" } },
                    "error": { "type": "array", "items": { "$ref": "#/definitions/data" } }
                },
                "additionalProperties": false
            }
        },
        "definitions": {
            "data": {
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "name": { "type": "string" },
                    "label": { "type": "string" },
                    "rel": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1
                    },
                    "url": { "type": "string" },
                    "templated": { "type": "boolean" },
                    "action": {
                        "enum": ["append", "partial", "read", "remove", "replace"]
                    },
                    "transclude": { "type": "boolean" },
                    "model": { "type": "string", "minLength": 1 },
                    "sending": { "type": "array", "items": { "type": "string" } },
                    "accepting": { "type": "array", "items": { "type": "string" } },
                    "value": { "type": ["string", "number", "boolean", "null"] },
                    "data": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/data" },
                        "minItems": 1
                    }
                },
                "additionalProperties": false
            }
        }
    })
}

/// Validate a rendered document against [`uber_schema`].
///
/// # Errors
///
/// Returns `ValidateError::Invalid` listing every violation.
pub fn validate_document(document: &Value) -> Result<(), ValidateError> {
    validate_against_schema(&uber_schema(), document)
}

/// Validate an instance against an arbitrary JSON Schema.
pub fn validate_against_schema(schema: &Value, instance: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(instance)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_is_valid() {
        let doc = json!({"uber": {"version": "1.0"}});
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn nested_document_is_valid() {
        let doc = json!({"uber": {"version": "1.0", "data": [
            {"rel": ["self"], "url": "/widgets/1"},
            {"rel": ["edit"], "url": "/widgets/1", "action": "replace", "model": "name={name}"},
            {"name": "parts", "data": [{"name": "sku", "value": "B-12"}]},
            {"name": "gone", "value": null}
        ]}});
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn unknown_action_is_invalid() {
        let doc = json!({"uber": {"version": "1.0", "data": [
            {"rel": ["self"], "url": "/a", "action": "fly"}
        ]}});
        let err = validate_document(&doc).unwrap_err();
        match err {
            ValidateError::Invalid { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "/uber/data/0/action");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn empty_lists_are_invalid() {
        let doc = json!({"uber": {"version": "1.0", "data": [{"rel": [], "data": []}]}});
        assert!(matches!(
            validate_document(&doc),
            Err(ValidateError::Invalid { errors }) if errors.len() == 2
        ));
    }

    #[test]
    fn missing_envelope_is_invalid() {
        let doc = json!({"version": "1.0"});
        assert!(validate_document(&doc).is_err());
    }

    #[test]
    fn broken_schema() {
        let schema = json!({"type": 12});
        let err = validate_against_schema(&schema, &json!({})).unwrap_err();
        assert!(matches!(err, ValidateError::InvalidSchema { .. }));
    }
}
