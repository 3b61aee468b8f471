//! Open-edit session over one ssh_config text.
//!
//! A [`Session`] is the Open state: it owns the parsed tree and the working
//! path of the last written resource. [`Session::close`] renders the text and
//! drops the tree, returning to the Closed state (plain text).

use crate::annotation::{check_text, get_comment, set_comment};
use crate::lens::{LensError, LensOptions};
use crate::mutation::{self, key_path, EditError};
use crate::tree::{Match, NodeKind, NodeRef, Path, Tree, HOST_LABEL};
use crate::value::{decode, Value};
use serde::{Deserialize, Serialize};
use similar::TextDiff;
use tracing::debug;

/// One key of one host block, as seen by an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub host: String,
    pub key: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Resource {
    pub fn new(host: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
            value: value.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    original: String,
    tree: Tree,
    working: Option<Path>,
}

impl Session {
    pub fn open(text: &str) -> Result<Self, LensError> {
        Self::open_with(text, LensOptions::default())
    }

    pub fn open_with(text: &str, options: LensOptions) -> Result<Self, LensError> {
        Ok(Self {
            original: text.to_string(),
            tree: Tree::parse_with(text, options)?,
            working: None,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Key path of the resource most recently created or written.
    pub fn working_path(&self) -> Option<&Path> {
        self.working.as_ref()
    }

    pub fn render(&self) -> String {
        self.tree.serialize()
    }

    pub fn is_modified(&self) -> bool {
        self.render() != self.original
    }

    /// Unified diff from the text the session was opened with to the current text.
    pub fn diff(&self) -> String {
        let rendered = self.render();
        if rendered == self.original {
            return String::new();
        }
        TextDiff::from_lines(self.original.as_str(), rendered.as_str())
            .unified_diff()
            .context_radius(3)
            .header("original", "modified")
            .to_string()
    }

    pub fn close(self) -> String {
        self.tree.serialize()
    }

    /// Every key of every host block.
    pub fn instances(&self) -> Result<Vec<Resource>, EditError> {
        self.collect_resources(&Path::host(Match::Any))
    }

    /// Every key of the host blocks named `host`.
    pub fn read(&self, host: &str) -> Result<Vec<Resource>, EditError> {
        self.collect_resources(&Path::host(Match::literal(host)))
    }

    fn collect_resources(&self, hosts: &Path) -> Result<Vec<Resource>, EditError> {
        // (host, key, nodes); repeated keys and repeated host blocks fold into one resource
        let mut groups: Vec<(String, String, Vec<NodeRef>)> = Vec::new();
        for host_node in self.tree.query(hosts) {
            let host = self.tree.value(host_node)?.unwrap_or("").to_string();
            for child in self.tree.children(host_node)? {
                if self.tree.kind(child)? != NodeKind::Entry {
                    continue;
                }
                let key = self.tree.label(child)?;
                let existing = groups.iter_mut().find(|(h, k, _)| {
                    h.to_lowercase() == host.to_lowercase() && k.eq_ignore_ascii_case(key)
                });
                match existing {
                    Some((_, _, nodes)) => nodes.push(child),
                    None => groups.push((host.clone(), key.to_string(), vec![child])),
                }
            }
        }

        groups
            .into_iter()
            .map(|(host, key, nodes)| -> Result<Resource, EditError> {
                let value = Value::from_list(decode(&self.tree, &nodes)?);
                let comment = get_comment(&self.tree, &host, &key)?;
                Ok(Resource {
                    comment: (!comment.is_empty()).then_some(comment),
                    host,
                    key,
                    value,
                })
            })
            .collect()
    }

    pub fn exists(&self, host: &str, key: &str) -> bool {
        !self.tree.query(&key_path(host, key)).is_empty()
    }

    /// Creates the host block when needed, then writes value and comment.
    /// Nothing is changed when the resource would not parse back as given.
    pub fn create(&mut self, resource: &Resource) -> Result<(), EditError> {
        let values = resource.value.to_list();
        if resource.value.is_empty() {
            return Err(EditError::EmptyValue {
                host: resource.host.clone(),
                key: resource.key.clone(),
            });
        }

        mutation::check_host(&resource.host)?;
        mutation::check_values(&resource.host, &resource.key, &values)?;
        if let Some(comment) = &resource.comment {
            check_text(&resource.host, &resource.key, comment)?;
        }
        if mutation::find_host(&self.tree, &resource.host).is_err() {
            let root = self.tree.root();
            let host = self.tree.append_child(root, HOST_LABEL)?;
            self.tree.set_value(host, &resource.host)?;
            debug!(host = resource.host.as_str(), "created host block");
        }

        self.write_list(&resource.host, &resource.key, &values)?;
        if let Some(comment) = resource.comment.as_deref().filter(|c| !c.is_empty()) {
            set_comment(&mut self.tree, &resource.host, &resource.key, comment)?;
        }
        Ok(())
    }

    pub fn read_value(&self, host: &str, key: &str) -> Result<Vec<String>, EditError> {
        let nodes = self.tree.query(&key_path(host, key));
        Ok(decode(&self.tree, &nodes)?)
    }

    pub fn write_value(&mut self, host: &str, key: &str, value: &Value) -> Result<(), EditError> {
        self.write_list(host, key, &value.to_list())
    }

    fn write_list(&mut self, host: &str, key: &str, values: &[String]) -> Result<(), EditError> {
        let path = mutation::set_value(&mut self.tree, host, key, values)?;
        self.working = Some(path);
        Ok(())
    }

    pub fn read_comment(&self, host: &str, key: &str) -> Result<String, EditError> {
        get_comment(&self.tree, host, key)
    }

    pub fn write_comment(&mut self, host: &str, key: &str, text: &str) -> Result<(), EditError> {
        set_comment(&mut self.tree, host, key, text)
    }

    /// Removes every `key` entry under `host` together with its annotation.
    pub fn destroy(&mut self, host: &str, key: &str) -> Result<(), EditError> {
        set_comment(&mut self.tree, host, key, "")?;
        for node in self.tree.query(&key_path(host, key)) {
            self.tree.remove(node)?;
        }
        debug!(host, key, "destroyed resource");
        Ok(())
    }
}
