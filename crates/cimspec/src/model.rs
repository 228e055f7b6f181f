//! In-memory specialization tree.
//!
//! A [`Specialization`] is an arena of [`Node`]s addressed by [`NodeId`]. The arena is built
//! once (see [`crate::builder`]) and is read-only afterwards, so a `NodeId` is a stable
//! identity for the lifetime of every generation run over it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// Stable identity of a node within one [`Specialization`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of section kinds. Doubles as the style-table key.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKey {
    Model,
    Realm,
    Grid,
    #[serde(rename = "keyprops")]
    KeyProps,
    Process,
    Subprocess,
    PropertySet,
    Property,
    EnumChoice,
}

impl SectionKey {
    pub const ALL: [SectionKey; 9] = [
        SectionKey::Model,
        SectionKey::Realm,
        SectionKey::Grid,
        SectionKey::KeyProps,
        SectionKey::Process,
        SectionKey::Subprocess,
        SectionKey::PropertySet,
        SectionKey::Property,
        SectionKey::EnumChoice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Model => "model",
            SectionKey::Realm => "realm",
            SectionKey::Grid => "grid",
            SectionKey::KeyProps => "keyprops",
            SectionKey::Process => "process",
            SectionKey::Subprocess => "subprocess",
            SectionKey::PropertySet => "property-set",
            SectionKey::Property => "property",
            SectionKey::EnumChoice => "enum-choice",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes shared by every node kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Optional documentation link rendered on mindmap nodes.
    pub url: Option<String>,
}

impl Header {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// One entry of the root document's change history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub version: String,
    pub date: String,
    pub author: String,
    pub note: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootSpec {
    pub contact: Option<String>,
    pub authors: Vec<String>,
    pub contributors: Vec<String>,
    pub change_history: Vec<ChangeEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicKind {
    Realm,
    Grid,
    #[serde(alias = "keyprops")]
    KeyProperties,
    Process,
}

impl TopicKind {
    pub fn section(self) -> SectionKey {
        match self {
            TopicKind::Realm => SectionKey::Realm,
            TopicKind::Grid => SectionKey::Grid,
            TopicKind::KeyProperties => SectionKey::KeyProps,
            TopicKind::Process => SectionKey::Process,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicSpec {
    pub kind: TopicKind,
    pub contact: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertySetSpec {
    /// Every member is injected from the shared base schema.
    pub members_inherited: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: String,
    pub description: Option<String>,
    pub is_open: bool,
    /// Node under which the choices hang in the mindmap.
    pub detail: NodeId,
    pub choices: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySpec {
    pub cardinality: String,
    pub type_name: String,
    pub was_injected: bool,
    /// Nearest enclosing topic or subprocess.
    pub root_topic: NodeId,
    pub enumeration: Option<EnumSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumChoiceSpec {
    pub value: String,
    /// Property whose enumeration declares this choice.
    pub owner: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Root(RootSpec),
    Topic(TopicSpec),
    Subprocess,
    PropertySet(PropertySetSpec),
    Property(PropertySpec),
    EnumChoice(EnumChoiceSpec),
}

impl NodeKind {
    pub fn section(&self) -> SectionKey {
        match self {
            NodeKind::Root(_) => SectionKey::Model,
            NodeKind::Topic(topic) => topic.kind.section(),
            NodeKind::Subprocess => SectionKey::Subprocess,
            NodeKind::PropertySet(_) => SectionKey::PropertySet,
            NodeKind::Property(_) => SectionKey::Property,
            NodeKind::EnumChoice(_) => SectionKey::EnumChoice,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub header: Header,
    pub kind: NodeKind,
}

impl Node {
    pub fn section(&self) -> SectionKey {
        self.kind.section()
    }
}

/// A fully constructed specialization tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Specialization {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Specialization {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> Result<&Node, StructuralError> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, StructuralError> {
        self.nodes
            .get(id.0)
            .ok_or(StructuralError::UnknownNode { node: id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Every topic and subprocess in document order.
    ///
    /// Subprocesses are listed alongside their process rather than nested in it, so the JSON
    /// root's `subTopics` holds one entry per topic and per subprocess.
    pub fn sub_topics(&self) -> Result<Vec<NodeId>, StructuralError> {
        let mut topics = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            match node.kind {
                NodeKind::Root(_) | NodeKind::Topic(_) | NodeKind::Subprocess => {
                    if !matches!(node.kind, NodeKind::Root(_)) {
                        topics.push(id);
                    }
                    stack.extend(node.children.iter().rev().copied());
                }
                _ => {}
            }
        }
        Ok(topics)
    }
}
