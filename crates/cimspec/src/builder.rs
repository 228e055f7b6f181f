use crate::error::StructuralError;
use crate::model::{
    EnumChoiceSpec, EnumSpec, Header, Node, NodeId, NodeKind, PropertySetSpec, PropertySpec,
    RootSpec, SectionKey, Specialization, TopicKind, TopicSpec,
};

/// Property attributes supplied by the caller; the owning topic is derived.
#[derive(Clone, Debug, Default)]
pub struct PropertyDraft {
    pub cardinality: String,
    pub type_name: String,
    pub was_injected: bool,
}

impl PropertyDraft {
    pub fn new(cardinality: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            cardinality: cardinality.into(),
            type_name: type_name.into(),
            was_injected: false,
        }
    }

    pub fn injected(mut self) -> Self {
        self.was_injected = true;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnumDraft {
    pub name: String,
    pub description: Option<String>,
    pub is_open: bool,
    pub choices: Vec<ChoiceDraft>,
}

#[derive(Clone, Debug, Default)]
pub struct ChoiceDraft {
    pub id: Option<String>,
    pub value: String,
    pub description: Option<String>,
}

impl ChoiceDraft {
    pub fn new(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
            description: Some(description.into()),
        }
    }
}

/// Incrementally assembles a [`Specialization`].
///
/// Parents must exist before children are attached. Kind placement is checked later by
/// [`crate::traversal::walk`], so `add_node` accepts any kind under any parent.
pub struct SpecializationBuilder {
    nodes: Vec<Node>,
}

impl SpecializationBuilder {
    pub fn new(header: Header, root: RootSpec) -> Self {
        Self {
            nodes: vec![Node {
                id: NodeId(0),
                parent: None,
                children: Vec::new(),
                header,
                kind: NodeKind::Root(root),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add_node(
        &mut self,
        parent: NodeId,
        header: Header,
        kind: NodeKind,
    ) -> Result<NodeId, StructuralError> {
        let id = self.push(parent, header, kind)?;
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub fn topic(
        &mut self,
        kind: TopicKind,
        header: Header,
        contact: Option<String>,
    ) -> Result<NodeId, StructuralError> {
        let root = self.root();
        self.add_node(root, header, NodeKind::Topic(TopicSpec { kind, contact }))
    }

    pub fn subprocess(
        &mut self,
        process: NodeId,
        header: Header,
    ) -> Result<NodeId, StructuralError> {
        self.add_node(process, header, NodeKind::Subprocess)
    }

    pub fn property_set(
        &mut self,
        owner: NodeId,
        header: Header,
        members_inherited: bool,
    ) -> Result<NodeId, StructuralError> {
        self.add_node(
            owner,
            header,
            NodeKind::PropertySet(PropertySetSpec { members_inherited }),
        )
    }

    pub fn property(
        &mut self,
        owner: NodeId,
        header: Header,
        draft: PropertyDraft,
    ) -> Result<NodeId, StructuralError> {
        self.node(owner)?;
        let root_topic = self
            .nearest_topic(owner)
            .ok_or(StructuralError::MissingTopic { node: owner })?;
        self.add_node(
            owner,
            header,
            NodeKind::Property(PropertySpec {
                cardinality: draft.cardinality,
                type_name: draft.type_name,
                was_injected: draft.was_injected,
                root_topic,
                enumeration: None,
            }),
        )
    }

    /// Attaches an enumeration and its choice nodes to `property`.
    ///
    /// Choices are owned by the enum rather than listed as children of the property.
    pub fn enumeration(
        &mut self,
        property: NodeId,
        draft: EnumDraft,
    ) -> Result<Vec<NodeId>, StructuralError> {
        let owner = self.node(property)?;
        match &owner.kind {
            NodeKind::Property(spec) if spec.enumeration.is_some() => {
                return Err(StructuralError::DuplicateEnum { node: property });
            }
            NodeKind::Property(_) => {}
            other => {
                return Err(StructuralError::UnexpectedChild {
                    node: property,
                    parent: other.section(),
                    child: SectionKey::EnumChoice,
                });
            }
        }
        let property_id = owner.header.id.clone();

        let mut choices = Vec::with_capacity(draft.choices.len());
        for choice in draft.choices {
            let id = choice
                .id
                .unwrap_or_else(|| format!("{property_id}.{}", choice.value));
            let header = Header {
                id,
                name: choice.value.clone(),
                description: choice.description,
                url: None,
            };
            let kind = NodeKind::EnumChoice(EnumChoiceSpec {
                value: choice.value,
                owner: property,
            });
            choices.push(self.push(property, header, kind)?);
        }

        if let NodeKind::Property(spec) = &mut self.node_mut(property)?.kind {
            spec.enumeration = Some(EnumSpec {
                name: draft.name,
                description: draft.description,
                is_open: draft.is_open,
                detail: property,
                choices: choices.clone(),
            });
        }
        Ok(choices)
    }

    pub fn build(self) -> Specialization {
        Specialization {
            nodes: self.nodes,
            root: NodeId(0),
        }
    }

    fn push(
        &mut self,
        parent: NodeId,
        header: Header,
        kind: NodeKind,
    ) -> Result<NodeId, StructuralError> {
        self.node(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            parent: Some(parent),
            children: Vec::new(),
            header,
            kind,
        });
        Ok(id)
    }

    fn nearest_topic(&self, start: NodeId) -> Option<NodeId> {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let node = self.nodes.get(id.0)?;
            if matches!(node.kind, NodeKind::Topic(_) | NodeKind::Subprocess) {
                return Some(id);
            }
            cursor = node.parent;
        }
        None
    }

    fn node(&self, id: NodeId) -> Result<&Node, StructuralError> {
        self.nodes
            .get(id.0)
            .ok_or(StructuralError::UnknownNode { node: id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, StructuralError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(StructuralError::UnknownNode { node: id })
    }
}
