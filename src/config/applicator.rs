//! Manifest applicator - brings a session in line with a manifest
//!
//! For each resource the applicator:
//! - reads the current value and annotation through the session
//! - compares them with the desired state
//! - creates, updates or removes only what differs
//! - reports one outcome per resource, keyed by `host/key`

use crate::config::schema::{Ensure, Manifest, ResourceDefinition};
use crate::mutation::EditError;
use crate::session::{Resource, Session};
use std::fmt;
use tracing::debug;

/// Result of applying a single resource
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "ResourceOutcome should be checked"]
pub enum ResourceOutcome {
    /// Key (and host block, if needed) was added
    Created,
    /// Existing key was changed
    Updated { value: bool, comment: bool },
    /// Nothing to do
    InSync,
    /// Key was removed
    Removed,
    /// Key was already missing
    Absent,
}

impl ResourceOutcome {
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            ResourceOutcome::Created | ResourceOutcome::Updated { .. } | ResourceOutcome::Removed
        )
    }
}

impl fmt::Display for ResourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceOutcome::Created => write!(f, "created"),
            ResourceOutcome::Updated { value, comment } => match (value, comment) {
                (true, true) => write!(f, "updated value and comment"),
                (true, false) => write!(f, "updated value"),
                (false, true) => write!(f, "updated comment"),
                (false, false) => write!(f, "updated"),
            },
            ResourceOutcome::InSync => write!(f, "already in sync"),
            ResourceOutcome::Removed => write!(f, "removed"),
            ResourceOutcome::Absent => write!(f, "already absent"),
        }
    }
}

/// Apply every resource of `manifest` to `session`, in order.
///
/// A failing resource does not stop the others; its error is reported in
/// place of an outcome.
pub fn apply_manifest(
    session: &mut Session,
    manifest: &Manifest,
) -> Vec<(String, Result<ResourceOutcome, EditError>)> {
    manifest
        .resources
        .iter()
        .map(|resource| (resource.id(), apply_resource(session, resource)))
        .collect()
}

fn apply_resource(
    session: &mut Session,
    resource: &ResourceDefinition,
) -> Result<ResourceOutcome, EditError> {
    let host = resource.host.as_str();
    let key = resource.key.as_str();

    let outcome = match resource.ensure {
        Ensure::Absent => {
            if session.exists(host, key) {
                session.destroy(host, key)?;
                ResourceOutcome::Removed
            } else {
                ResourceOutcome::Absent
            }
        }
        Ensure::Present => {
            let value = resource
                .value
                .as_ref()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| EditError::EmptyValue {
                    host: host.to_string(),
                    key: key.to_string(),
                })?;

            if !session.exists(host, key) {
                session.create(&Resource {
                    host: host.to_string(),
                    key: key.to_string(),
                    value: value.clone(),
                    comment: resource.comment.clone(),
                })?;
                ResourceOutcome::Created
            } else {
                let value_changed = session.read_value(host, key)? != value.to_list();
                if value_changed {
                    session.write_value(host, key, value)?;
                }

                let mut comment_changed = false;
                if let Some(comment) = &resource.comment {
                    if session.read_comment(host, key)? != *comment {
                        session.write_comment(host, key, comment)?;
                        comment_changed = true;
                    }
                }

                if value_changed || comment_changed {
                    ResourceOutcome::Updated {
                        value: value_changed,
                        comment: comment_changed,
                    }
                } else {
                    ResourceOutcome::InSync
                }
            }
        }
    };

    debug!(resource = resource.id().as_str(), %outcome, "applied resource");
    Ok(outcome)
}
