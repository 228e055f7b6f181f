//! Tree-form (JSON) rendering of a specialization.
//!
//! Fragments are built bottom-up: every topic caches its own fragment on enter, properties
//! attach themselves to their owning topic's fragment, and the root collects the topic
//! fragments on exit.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::cache::FragmentCache;
use crate::error::{CimspecError, StructuralError};
use crate::generate::Generator;
use crate::labels::{LabelFormatter, TitleCaseLabels, property_label};
use crate::model::{
    ChangeEntry, EnumSpec, Node, NodeKind, PropertySpec, RootSpec, SectionKey, Specialization,
    TopicSpec,
};
use crate::traversal::SpecializationVisitor;

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/specialization.js.tmpl");

/// Token replaced by the serialized document.
pub const DEFAULT_PLACEHOLDER: &str = "TOPIC";

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RootFragment {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub authors: Vec<String>,
    pub contributors: Vec<String>,
    pub project: String,
    pub change_history: Vec<ChangeEntry>,
    pub sub_topics: Vec<TopicFragment>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TopicFragment {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub properties: Vec<PropertyFragment>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFragment {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub cardinality: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_injected: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<EnumFragment>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnumFragment {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub is_open: bool,
    pub choices: Vec<ChoiceFragment>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChoiceFragment {
    pub description: Option<String>,
    pub value: String,
}

#[derive(Debug)]
enum TreeFragment {
    Root(RootFragment),
    Topic(TopicFragment),
}

/// Text wrapper the serialized document is embedded into.
#[derive(Clone, Debug)]
pub struct JsonTemplate {
    body: String,
    placeholder: String,
}

impl Default for JsonTemplate {
    fn default() -> Self {
        Self::new(EMBEDDED_TEMPLATE, DEFAULT_PLACEHOLDER)
    }
}

impl JsonTemplate {
    pub fn new(body: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Template that emits the bare JSON document.
    pub fn bare() -> Self {
        Self::new(DEFAULT_PLACEHOLDER, DEFAULT_PLACEHOLDER)
    }

    pub fn from_path(path: &Path) -> Result<Self, CimspecError> {
        let body = fs::read_to_string(path)?;
        Ok(Self::new(body, DEFAULT_PLACEHOLDER))
    }

    pub fn render(&self, document: &str) -> Result<String, CimspecError> {
        if self.placeholder.is_empty() || !self.body.contains(&self.placeholder) {
            return Err(CimspecError::Template(format!(
                "template does not contain placeholder '{}'",
                self.placeholder
            )));
        }
        Ok(self.body.replace(&self.placeholder, document))
    }
}

/// Encodes a specialization as a JSON document tree.
pub struct JsonGenerator<'a, L = TitleCaseLabels> {
    project: String,
    spec: &'a Specialization,
    labels: L,
    template: JsonTemplate,
    cache: FragmentCache<TreeFragment>,
}

impl<'a> JsonGenerator<'a> {
    pub fn new(project: impl Into<String>, spec: &'a Specialization) -> Self {
        Self::with_labels(project, spec, TitleCaseLabels)
    }
}

impl<'a, L> JsonGenerator<'a, L>
where
    L: LabelFormatter,
{
    pub fn with_labels(project: impl Into<String>, spec: &'a Specialization, labels: L) -> Self {
        Self {
            project: project.into(),
            spec,
            labels,
            template: JsonTemplate::default(),
            cache: FragmentCache::new(),
        }
    }

    pub fn with_template(mut self, template: JsonTemplate) -> Self {
        self.template = template;
        self
    }

    /// The root fragment of the last run.
    pub fn root_fragment(&self) -> Result<&RootFragment, CimspecError> {
        match self.cache.get(self.spec.root()) {
            Ok(TreeFragment::Root(root)) => Ok(root),
            _ => Err(StructuralError::NotGenerated.into()),
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, CimspecError> {
        Ok(serde_json::to_value(self.root_fragment()?)?)
    }

    fn topic_fragment(&self, node: &Node, contact: Option<&String>) -> TopicFragment {
        TopicFragment {
            id: node.header.id.clone(),
            label: self.labels.get_label(&node.header.name),
            description: node.header.description.clone(),
            contact: contact.cloned(),
            properties: Vec::new(),
        }
    }

    fn enum_fragment(
        &self,
        spec: &Specialization,
        enumeration: &EnumSpec,
    ) -> Result<EnumFragment, CimspecError> {
        let mut choices = Vec::with_capacity(enumeration.choices.len());
        for id in &enumeration.choices {
            let choice = spec.node(*id)?;
            let NodeKind::EnumChoice(detail) = &choice.kind else {
                return Err(StructuralError::UnexpectedChild {
                    node: *id,
                    parent: SectionKey::Property,
                    child: choice.section(),
                }
                .into());
            };
            choices.push(ChoiceFragment {
                description: choice.header.description.clone(),
                value: detail.value.clone(),
            });
        }

        Ok(EnumFragment {
            id: enumeration.name.clone(),
            label: self.labels.get_label(&enumeration.name),
            description: enumeration.description.clone(),
            is_open: enumeration.is_open,
            choices,
        })
    }
}

impl<'a, L> SpecializationVisitor for JsonGenerator<'a, L>
where
    L: LabelFormatter,
{
    fn on_root_enter(
        &mut self,
        _spec: &Specialization,
        node: &Node,
        root: &RootSpec,
    ) -> Result<(), CimspecError> {
        debug!(id = %node.header.id, "json: root");
        let fragment = RootFragment {
            id: node.header.id.clone(),
            label: self.labels.get_label(&node.header.name),
            description: node.header.description.clone(),
            contact: root.contact.clone(),
            authors: root.authors.clone(),
            contributors: root.contributors.clone(),
            project: self.project.clone(),
            change_history: root.change_history.clone(),
            sub_topics: Vec::new(),
        };
        self.cache.insert(node.id, TreeFragment::Root(fragment))?;
        Ok(())
    }

    fn on_root_exit(
        &mut self,
        spec: &Specialization,
        node: &Node,
        _root: &RootSpec,
    ) -> Result<(), CimspecError> {
        let mut topics = Vec::new();
        for id in spec.sub_topics()? {
            match self.cache.take(id)? {
                TreeFragment::Topic(topic) => topics.push(topic),
                TreeFragment::Root(_) => {
                    return Err(StructuralError::CacheMiss { node: id }.into());
                }
            }
        }
        debug!(id = %node.header.id, topics = topics.len(), "json: attached sub-topics");

        match self.cache.get_mut(node.id)? {
            TreeFragment::Root(root) => root.sub_topics.extend(topics),
            TreeFragment::Topic(_) => {
                return Err(StructuralError::CacheMiss { node: node.id }.into());
            }
        }
        Ok(())
    }

    fn on_topic_enter(
        &mut self,
        _spec: &Specialization,
        node: &Node,
        topic: &TopicSpec,
    ) -> Result<(), CimspecError> {
        debug!(id = %node.header.id, kind = %topic.kind.section(), "json: topic");
        let fragment = self.topic_fragment(node, topic.contact.as_ref());
        self.cache.insert(node.id, TreeFragment::Topic(fragment))?;
        Ok(())
    }

    fn on_subprocess_enter(
        &mut self,
        _spec: &Specialization,
        node: &Node,
    ) -> Result<(), CimspecError> {
        debug!(id = %node.header.id, "json: subprocess");
        let fragment = self.topic_fragment(node, None);
        self.cache.insert(node.id, TreeFragment::Topic(fragment))?;
        Ok(())
    }

    fn on_property_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        property: &PropertySpec,
    ) -> Result<(), CimspecError> {
        debug!(id = %node.header.id, injected = property.was_injected, "json: property");
        let enumeration = property
            .enumeration
            .as_ref()
            .map(|enumeration| self.enum_fragment(spec, enumeration))
            .transpose()?;
        let type_name = if enumeration.is_some() {
            "enum".to_string()
        } else {
            property.type_name.clone()
        };
        let fragment = PropertyFragment {
            id: node.header.id.clone(),
            label: property_label(&self.labels, &node.header.id),
            description: node.header.description.clone(),
            cardinality: property.cardinality.clone(),
            type_name,
            is_injected: property.was_injected,
            enumeration,
        };

        match self.cache.get_mut(property.root_topic)? {
            TreeFragment::Topic(topic) => topic.properties.push(fragment),
            TreeFragment::Root(_) => {
                return Err(StructuralError::CacheMiss {
                    node: property.root_topic,
                }
                .into());
            }
        }
        Ok(())
    }
}

impl<'a, L> Generator<'a> for JsonGenerator<'a, L>
where
    L: LabelFormatter,
{
    const FORMAT: &'static str = "json";

    fn specialization(&self) -> &'a Specialization {
        self.spec
    }

    fn reset(&mut self) {
        self.cache.clear();
    }

    fn get_output(&self) -> Result<String, CimspecError> {
        let document = serde_json::to_string(self.root_fragment()?)?;
        self.template.render(&document)
    }
}
