//! ssh-config-editor: idempotent, structure-preserving editing of ssh_config files
//!
//! The text is parsed into a tree of labeled nodes (host blocks, key entries,
//! comments, blank lines). Declarative requests such as "set `Port` under
//! `Host example` to `2222`" are resolved into the smallest set of tree edits,
//! and the tree renders back to text that is byte-for-byte identical wherever
//! nothing changed.
//!
//! # Architecture
//!
//! - [`lens`]: the grammar, text to tree and back
//! - [`tree`]: arena tree with typed [`Path`] queries
//! - [`value`]: node text to [`Value`] and back
//! - [`mutation`]: the edit policies for simple and multi-valued directives
//! - [`annotation`]: `"<key>: <text>"` comments above a key
//! - [`session`]: the open-edit [`Session`] exposing the resource operations
//! - [`config`]: declarative resource manifests
//!
//! # Example
//!
//! ```
//! use ssh_config_editor::{Session, Value};
//!
//! let mut session = Session::open("Host example\n    #Port 22\n    User alice\n").unwrap();
//! session.write_value("example", "Port", &Value::from("2222")).unwrap();
//! session.write_comment("example", "Port", "moved off 22").unwrap();
//!
//! assert_eq!(
//!     session.close(),
//!     "Host example\n    # Port: moved off 22\n    Port 2222\n    #Port 22\n    User alice\n"
//! );
//! ```

pub mod annotation;
pub mod config;
pub mod lens;
pub mod mutation;
pub mod session;
pub mod tree;
pub mod value;

// Re-exports
pub use config::{
    apply_manifest, load_from_path, load_from_str, ConfigError, Manifest, ResourceOutcome,
};
pub use lens::{LensError, LensOptions};
pub use mutation::EditError;
pub use session::{Resource, Session};
pub use tree::{ConfigTree, Match, NodeRef, Path, Position, Tree, TreeError};
pub use value::Value;
