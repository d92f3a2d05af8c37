use thiserror::Error;

/// Result type alias for manifest assembly
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Error types for manifest assembly
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestError {
    /// Two resources were declared under the same logical id
    #[error("Duplicate logical id in stack: {0}")]
    DuplicateLogicalId(String),

    /// Two pipeline objects were declared under the same object id
    #[error("Duplicate pipeline object id: {0}")]
    DuplicateObjectId(String),

    /// A field references a pipeline object id that is not declared
    #[error("Field {field} references undeclared pipeline object: {referenced_id}")]
    DanglingReference {
        /// Qualified field that carries the reference (`<object id>.<key>`)
        field: String,
        /// Object id the field points at
        referenced_id: String,
    },
}
