//! Resource tree assembled at synthesis time
//!
//! A [`Stack`] is an ordered collection of resource declarations keyed by
//! logical id. Constructs register declarations into it; the rendered
//! template tree is handed to an external provisioning engine, which
//! resolves the deferred-value tokens.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::error::{ManifestError, ManifestResult};

/// A single declarative resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Provider type tag, e.g. `AWS::SQS::Queue`
    pub resource_type: String,
    /// Literal resource properties
    pub properties: Value,
}

/// Ordered collection of resource declarations keyed by logical id
#[derive(Debug, Default)]
pub struct Stack {
    resources: BTreeMap<String, Resource>,
}

impl Stack {
    /// Creates an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource declaration under `logical_id`
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::DuplicateLogicalId` if a resource is already
    /// declared under the same logical id
    pub fn add_resource(
        &mut self,
        logical_id: &str,
        resource_type: &str,
        properties: Value,
    ) -> ManifestResult<()> {
        if self.resources.contains_key(logical_id) {
            return Err(ManifestError::DuplicateLogicalId(logical_id.to_string()));
        }

        tracing::debug!(logical_id, resource_type, "registered resource declaration");

        self.resources.insert(
            logical_id.to_string(),
            Resource {
                resource_type: resource_type.to_string(),
                properties,
            },
        );

        Ok(())
    }

    /// Returns the resource declared under `logical_id`, if any
    #[must_use]
    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Logical ids of all declared resources, in template order
    #[must_use]
    pub fn logical_ids(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Number of declared resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the stack holds no declarations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Deferred-value token for an attribute of a declared resource
    ///
    /// The token is resolved by the provisioning engine, not by this crate.
    /// Always non-empty.
    #[must_use]
    pub fn get_att(logical_id: &str, attribute: &str) -> String {
        format!("${{{logical_id}.{attribute}}}")
    }

    /// Deferred-value token for a declared resource itself
    #[must_use]
    pub fn reference(logical_id: &str) -> String {
        format!("${{{logical_id}}}")
    }

    /// Renders the template tree consumed by the provisioning engine
    #[must_use]
    pub fn to_template(&self) -> Value {
        let resources: Map<String, Value> = self
            .resources
            .iter()
            .map(|(logical_id, resource)| {
                (
                    logical_id.clone(),
                    json!({
                        "Type": resource.resource_type,
                        "Properties": resource.properties,
                    }),
                )
            })
            .collect();

        json!({ "Resources": resources })
    }
}
