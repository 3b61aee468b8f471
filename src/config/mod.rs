//! Declarative resource manifests: load, validate, apply.

pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{apply_manifest, ResourceOutcome};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    Ensure, Manifest, Metadata, ResourceDefinition, ValidationError, ValidationIssue,
};
