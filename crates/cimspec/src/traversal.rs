//! Depth-first walk over a [`Specialization`] that fires typed enter/exit events.
//!
//! Containers (root, topics, subprocesses, property sets) receive both an enter and an exit
//! event; properties and enum choices only receive an enter event. Events are delivered in
//! document order. Sinks implement [`SpecializationVisitor`] and override only the handlers
//! they care about.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

use crate::error::{CimspecError, StructuralError};
use crate::model::{
    EnumChoiceSpec, Node, NodeId, NodeKind, PropertySetSpec, PropertySpec, RootSpec,
    Specialization, TopicKind, TopicSpec,
};

/// Closed set of traversal events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    RootEnter,
    RootExit,
    TopicEnter,
    TopicExit,
    SubprocessEnter,
    SubprocessExit,
    PropertySetEnter,
    PropertySetExit,
    PropertyEnter,
    EnumChoiceEnter,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::RootEnter => "root-enter",
            EventKind::RootExit => "root-exit",
            EventKind::TopicEnter => "topic-enter",
            EventKind::TopicExit => "topic-exit",
            EventKind::SubprocessEnter => "subprocess-enter",
            EventKind::SubprocessExit => "subprocess-exit",
            EventKind::PropertySetEnter => "property-set-enter",
            EventKind::PropertySetExit => "property-set-exit",
            EventKind::PropertyEnter => "property-enter",
            EventKind::EnumChoiceEnter => "enum-choice-enter",
        };
        f.write_str(label)
    }
}

/// Event sink driven by [`walk`]. Every handler defaults to a no-op.
#[allow(unused_variables)]
pub trait SpecializationVisitor {
    fn on_root_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        root: &RootSpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_root_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
        root: &RootSpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    /// Fired for realm, grid, key-properties and process topics alike.
    fn on_topic_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        topic: &TopicSpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_topic_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
        topic: &TopicSpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_subprocess_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_subprocess_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_property_set_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        set: &PropertySetSpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_property_set_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
        set: &PropertySetSpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_property_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        property: &PropertySpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }

    fn on_enum_choice_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        choice: &EnumChoiceSpec,
    ) -> Result<(), CimspecError> {
        Ok(())
    }
}

impl<V> SpecializationVisitor for &mut V
where
    V: SpecializationVisitor + ?Sized,
{
    fn on_root_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        root: &RootSpec,
    ) -> Result<(), CimspecError> {
        (**self).on_root_enter(spec, node, root)
    }

    fn on_root_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
        root: &RootSpec,
    ) -> Result<(), CimspecError> {
        (**self).on_root_exit(spec, node, root)
    }

    fn on_topic_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        topic: &TopicSpec,
    ) -> Result<(), CimspecError> {
        (**self).on_topic_enter(spec, node, topic)
    }

    fn on_topic_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
        topic: &TopicSpec,
    ) -> Result<(), CimspecError> {
        (**self).on_topic_exit(spec, node, topic)
    }

    fn on_subprocess_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
    ) -> Result<(), CimspecError> {
        (**self).on_subprocess_enter(spec, node)
    }

    fn on_subprocess_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
    ) -> Result<(), CimspecError> {
        (**self).on_subprocess_exit(spec, node)
    }

    fn on_property_set_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        set: &PropertySetSpec,
    ) -> Result<(), CimspecError> {
        (**self).on_property_set_enter(spec, node, set)
    }

    fn on_property_set_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
        set: &PropertySetSpec,
    ) -> Result<(), CimspecError> {
        (**self).on_property_set_exit(spec, node, set)
    }

    fn on_property_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        property: &PropertySpec,
    ) -> Result<(), CimspecError> {
        (**self).on_property_enter(spec, node, property)
    }

    fn on_enum_choice_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        choice: &EnumChoiceSpec,
    ) -> Result<(), CimspecError> {
        (**self).on_enum_choice_enter(spec, node, choice)
    }
}

/// Walks `spec` once, depth-first, delivering events to `visitor`.
///
/// The first error (structural or raised by the visitor) aborts the walk.
pub fn walk<V>(spec: &Specialization, visitor: &mut V) -> Result<(), CimspecError>
where
    V: SpecializationVisitor + ?Sized,
{
    let root = spec.root_node()?;
    if !matches!(root.kind, NodeKind::Root(_)) {
        return Err(StructuralError::NotARoot {
            node: root.id,
            found: root.section(),
        }
        .into());
    }

    let mut walker = Walker {
        spec,
        visited: HashSet::with_capacity(spec.len()),
    };
    walker.visit(root.id, visitor)
}

struct Walker<'a> {
    spec: &'a Specialization,
    visited: HashSet<NodeId>,
}

impl<'a> Walker<'a> {
    fn visit<V>(&mut self, id: NodeId, visitor: &mut V) -> Result<(), CimspecError>
    where
        V: SpecializationVisitor + ?Sized,
    {
        let spec = self.spec;
        let node = spec.node(id)?;
        if !self.visited.insert(id) {
            return Err(StructuralError::Revisited { node: id }.into());
        }

        match &node.kind {
            NodeKind::Root(root) => {
                trace!(node = %id, event = %EventKind::RootEnter);
                visitor.on_root_enter(spec, node, root)?;
                self.visit_children(node, visitor)?;
                trace!(node = %id, event = %EventKind::RootExit);
                visitor.on_root_exit(spec, node, root)?;
            }
            NodeKind::Topic(topic) => {
                trace!(node = %id, event = %EventKind::TopicEnter);
                visitor.on_topic_enter(spec, node, topic)?;
                self.visit_children(node, visitor)?;
                trace!(node = %id, event = %EventKind::TopicExit);
                visitor.on_topic_exit(spec, node, topic)?;
            }
            NodeKind::Subprocess => {
                trace!(node = %id, event = %EventKind::SubprocessEnter);
                visitor.on_subprocess_enter(spec, node)?;
                self.visit_children(node, visitor)?;
                trace!(node = %id, event = %EventKind::SubprocessExit);
                visitor.on_subprocess_exit(spec, node)?;
            }
            NodeKind::PropertySet(set) => {
                trace!(node = %id, event = %EventKind::PropertySetEnter);
                visitor.on_property_set_enter(spec, node, set)?;
                self.visit_children(node, visitor)?;
                trace!(node = %id, event = %EventKind::PropertySetExit);
                visitor.on_property_set_exit(spec, node, set)?;
            }
            NodeKind::Property(property) => {
                trace!(node = %id, event = %EventKind::PropertyEnter);
                visitor.on_property_enter(spec, node, property)?;
                if let Some(enumeration) = &property.enumeration {
                    for choice in &enumeration.choices {
                        self.visit_choice(node, *choice, visitor)?;
                    }
                }
                self.visit_children(node, visitor)?;
            }
            NodeKind::EnumChoice(_) => {
                // Choices are only reachable through their enumeration.
                let parent = node.parent.unwrap_or(id);
                return Err(StructuralError::UnexpectedChild {
                    node: id,
                    parent: spec.node(parent)?.section(),
                    child: node.section(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn visit_children<V>(&mut self, parent: &Node, visitor: &mut V) -> Result<(), CimspecError>
    where
        V: SpecializationVisitor + ?Sized,
    {
        for child_id in &parent.children {
            let child = self.spec.node(*child_id)?;
            if !permits(&parent.kind, &child.kind) {
                return Err(StructuralError::UnexpectedChild {
                    node: child.id,
                    parent: parent.section(),
                    child: child.section(),
                }
                .into());
            }
            self.visit(child.id, visitor)?;
        }
        Ok(())
    }

    fn visit_choice<V>(
        &mut self,
        property: &Node,
        id: NodeId,
        visitor: &mut V,
    ) -> Result<(), CimspecError>
    where
        V: SpecializationVisitor + ?Sized,
    {
        let spec = self.spec;
        let node = spec.node(id)?;
        let NodeKind::EnumChoice(choice) = &node.kind else {
            return Err(StructuralError::UnexpectedChild {
                node: id,
                parent: property.section(),
                child: node.section(),
            }
            .into());
        };
        if !self.visited.insert(id) {
            return Err(StructuralError::Revisited { node: id }.into());
        }
        trace!(node = %id, event = %EventKind::EnumChoiceEnter);
        visitor.on_enum_choice_enter(spec, node, choice)
    }
}

fn permits(parent: &NodeKind, child: &NodeKind) -> bool {
    match (parent, child) {
        (NodeKind::Root(_), NodeKind::Topic(_)) => true,
        (NodeKind::Topic(_), NodeKind::PropertySet(_)) => true,
        (NodeKind::Topic(topic), NodeKind::Subprocess) => topic.kind == TopicKind::Process,
        (NodeKind::Subprocess, NodeKind::PropertySet(_)) => true,
        (NodeKind::PropertySet(_), NodeKind::Property(_) | NodeKind::PropertySet(_)) => true,
        (NodeKind::Property(_), NodeKind::PropertySet(_)) => true,
        _ => false,
    }
}
