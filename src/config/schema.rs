use crate::lens::{is_keyword, LensOptions};
use crate::value::Value;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Manifest {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

impl Manifest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.resources.is_empty() {
            issues.push(ValidationIssue::EmptyResourceList);
        }

        for resource in &self.resources {
            let id = (!resource.host.trim().is_empty() && !resource.key.trim().is_empty())
                .then(|| resource.id());

            if resource.host.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    resource_id: id.clone(),
                    field: "host",
                });
            }
            if resource.key.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    resource_id: id.clone(),
                    field: "key",
                });
            } else if !is_keyword(&resource.key) {
                issues.push(ValidationIssue::InvalidCombo {
                    resource_id: id.clone(),
                    message: format!("'{}' is not a valid directive name", resource.key),
                });
            }

            match resource.ensure {
                Ensure::Present => {
                    if resource.value.as_ref().map_or(true, Value::is_empty) {
                        issues.push(ValidationIssue::MissingField {
                            resource_id: id.clone(),
                            field: "value",
                        });
                    }
                }
                Ensure::Absent => {
                    if resource.value.is_some() || resource.comment.is_some() {
                        issues.push(ValidationIssue::InvalidCombo {
                            resource_id: id.clone(),
                            message: "absent resources cannot carry a value or comment"
                                .to_string(),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Formatting options for sessions this manifest is applied to.
    pub fn lens_options(&self) -> LensOptions {
        match &self.meta.indent {
            Some(indent) => LensOptions {
                indent: indent.clone(),
            },
            None => LensOptions::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Indentation for entries of host blocks that have none to copy.
    #[serde(default)]
    pub indent: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResourceDefinition {
    pub host: String,
    pub key: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub ensure: Ensure,
}

impl ResourceDefinition {
    pub fn id(&self) -> String {
        format!("{}/{}", self.host, self.key)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyResourceList,
    MissingField {
        resource_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        resource_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyResourceList => write!(f, "manifest contains no resources"),
            ValidationIssue::MissingField { resource_id, field } => match resource_id {
                Some(id) => write!(f, "resource '{id}' missing required field '{field}'"),
                None => write!(f, "resource missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo {
                resource_id,
                message,
            } => match resource_id {
                Some(id) => write!(f, "resource '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid resource configuration: {message}"),
            },
        }
    }
}
