//! Data Pipeline definition graph
//!
//! A pipeline definition is a flat set of objects that reference each other
//! by symbolic id. The target manifest format carries no numeric or boolean
//! field types; every field value is either a literal string or a reference
//! to another object id. Referential integrity is checked once, when the
//! definition is assembled.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, ManifestResult};

/// One key/value entry of a pipeline object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineField {
    /// Field key
    pub key: String,
    /// Literal string value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// Symbolic reference to another pipeline object id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_value: Option<String>,
}

impl PipelineField {
    /// Creates a literal string field
    #[must_use]
    pub fn string(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            string_value: Some(value.into()),
            ref_value: None,
        }
    }

    /// Creates a symbolic reference field pointing at `referenced_id`
    #[must_use]
    pub fn reference(key: &str, referenced_id: &str) -> Self {
        Self {
            key: key.to_string(),
            string_value: None,
            ref_value: Some(referenced_id.to_string()),
        }
    }
}

/// A single node of a pipeline definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineObject {
    /// Object id, unique within the definition
    pub id: String,
    /// Human-readable object name
    pub name: String,
    /// Object fields
    pub fields: Vec<PipelineField>,
}

impl PipelineObject {
    /// Creates an object whose name mirrors its id
    #[must_use]
    pub fn new(id: &str, fields: Vec<PipelineField>) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            fields,
        }
    }

    /// Returns the literal value of the field with the given key, if any
    #[must_use]
    pub fn string_value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .and_then(|field| field.string_value.as_deref())
    }
}

/// A validated set of pipeline objects
///
/// Serializes transparently as the list of objects.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PipelineDefinition {
    objects: Vec<PipelineObject>,
}

impl PipelineDefinition {
    /// Assembles a definition from the given objects
    ///
    /// Object ids must be unique and every reference field must point at a
    /// declared object id. No other validation is performed; field values
    /// pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::DuplicateObjectId` if two objects share an
    /// id, or `ManifestError::DanglingReference` if a reference field names
    /// an undeclared object id
    pub fn new(objects: Vec<PipelineObject>) -> ManifestResult<Self> {
        let mut ids = HashSet::new();
        for object in &objects {
            if !ids.insert(object.id.as_str()) {
                return Err(ManifestError::DuplicateObjectId(object.id.clone()));
            }
        }

        for object in &objects {
            for field in &object.fields {
                if let Some(referenced_id) = &field.ref_value {
                    if !ids.contains(referenced_id.as_str()) {
                        return Err(ManifestError::DanglingReference {
                            field: format!("{}.{}", object.id, field.key),
                            referenced_id: referenced_id.clone(),
                        });
                    }
                }
            }
        }

        tracing::debug!(object_count = objects.len(), "assembled pipeline definition");

        Ok(Self { objects })
    }

    /// Declared objects, in declaration order
    #[must_use]
    pub fn objects(&self) -> &[PipelineObject] {
        &self.objects
    }

    /// Looks up an object by id
    #[must_use]
    pub fn object(&self, id: &str) -> Option<&PipelineObject> {
        self.objects.iter().find(|object| object.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_serialization() {
        let field = PipelineField::string("tableName", "Orders");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json, serde_json::json!({ "Key": "tableName", "StringValue": "Orders" }));

        let field = PipelineField::reference("dataFormat", "ExportFormat");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json, serde_json::json!({ "Key": "dataFormat", "RefValue": "ExportFormat" }));
    }

    #[test]
    fn test_object_serialization() {
        let object = PipelineObject::new(
            "ExportFormat",
            vec![PipelineField::string("type", "DynamoDBExportDataFormat")],
        );
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Id": "ExportFormat",
                "Name": "ExportFormat",
                "Fields": [{ "Key": "type", "StringValue": "DynamoDBExportDataFormat" }],
            })
        );
    }

    #[test]
    fn test_valid_reference_graph() {
        let definition = PipelineDefinition::new(vec![
            PipelineObject::new("Format", vec![]),
            PipelineObject::new(
                "Source",
                vec![PipelineField::reference("dataFormat", "Format")],
            ),
        ])
        .unwrap();

        assert_eq!(definition.objects().len(), 2);
        assert_eq!(definition.object("Source").unwrap().id, "Source");
        assert!(definition.object("Missing").is_none());
    }

    #[test]
    fn test_dangling_reference_is_rejected() {
        let err = PipelineDefinition::new(vec![PipelineObject::new(
            "Source",
            vec![PipelineField::reference("dataFormat", "Format")],
        )])
        .unwrap_err();

        assert_eq!(
            err,
            ManifestError::DanglingReference {
                field: "Source.dataFormat".to_string(),
                referenced_id: "Format".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_object_id_is_rejected() {
        let err = PipelineDefinition::new(vec![
            PipelineObject::new("Source", vec![]),
            PipelineObject::new("Source", vec![]),
        ])
        .unwrap_err();

        assert_eq!(err, ManifestError::DuplicateObjectId("Source".to_string()));
    }

    #[test]
    fn test_string_value_lookup() {
        let object = PipelineObject::new(
            "Schedule",
            vec![
                PipelineField::string("period", "1 Day"),
                PipelineField::reference("schedule", "Schedule"),
            ],
        );

        assert_eq!(object.string_value("period"), Some("1 Day"));
        assert_eq!(object.string_value("schedule"), None);
        assert_eq!(object.string_value("missing"), None);
    }
}
