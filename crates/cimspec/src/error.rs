use std::fmt;

use thiserror::Error;

use crate::model::{NodeId, SectionKey};

/// Contract violations detected while walking a specialization or assembling fragments.
///
/// These never occur for a well-formed model; they indicate a malformed tree or a
/// traversal-order bug and always abort the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[error("node {node} does not exist in the specialization")]
    UnknownNode { node: NodeId },
    #[error("a {child} node cannot be placed under a {parent} node ({node})")]
    UnexpectedChild {
        node: NodeId,
        parent: SectionKey,
        child: SectionKey,
    },
    #[error("traversal must start at the root node, found {found} ({node})")]
    NotARoot { node: NodeId, found: SectionKey },
    #[error("node {node} was reached more than once")]
    Revisited { node: NodeId },
    #[error("fragment for node {node} already exists")]
    DuplicateFragment { node: NodeId },
    #[error("no fragment cached for node {node}")]
    CacheMiss { node: NodeId },
    #[error("property {node} already declares an enumeration")]
    DuplicateEnum { node: NodeId },
    #[error("property owner {node} is not inside a topic or subprocess")]
    MissingTopic { node: NodeId },
    #[error("no output has been generated; walk the specialization first")]
    NotGenerated,
}

/// High-level error type shared across cimspec components.
#[derive(Debug, Error)]
pub enum CimspecError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error("no style configured for section '{key}'")]
    ConfigurationLookup { key: String },
    #[error("document error: {0}")]
    Document(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CimspecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for CimspecError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Document(err.to_string())
    }
}

impl CimspecError {
    pub fn missing_section(key: SectionKey) -> Self {
        Self::ConfigurationLookup {
            key: key.to_string(),
        }
    }

    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            CimspecError::Structural(err) => CimspecError::Structural(err),
            CimspecError::ConfigurationLookup { key } => CimspecError::ConfigurationLookup { key },
            CimspecError::Document(msg) => CimspecError::Document(format!("{ctx}: {msg}")),
            CimspecError::Template(msg) => CimspecError::Template(format!("{ctx}: {msg}")),
            CimspecError::Serialization(msg) => {
                CimspecError::Serialization(format!("{ctx}: {msg}"))
            }
            CimspecError::Io(err) => CimspecError::Io(err),
        }
    }
}
