use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::builder::{ChoiceDraft, EnumDraft, PropertyDraft, SpecializationBuilder};
use crate::error::CimspecError;
use crate::model::{ChangeEntry, Header, NodeId, RootSpec, Specialization, TopicKind};

/// Serialized form of a specialization, as accepted by [`load_path`].
///
/// YAML is the primary format; JSON parses through the same path.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecializationDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub authors: NameList,
    #[serde(default)]
    pub contributors: NameList,
    #[serde(default)]
    pub change_history: Vec<ChangeEntry>,
    #[serde(default)]
    pub topics: Vec<TopicDocument>,
}

/// Either a list of names or a single comma-separated string.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum NameList {
    List(Vec<String>),
    Joined(String),
}

impl Default for NameList {
    fn default() -> Self {
        NameList::List(Vec::new())
    }
}

impl NameList {
    pub fn into_vec(self) -> Vec<String> {
        let names = match self {
            NameList::List(names) => names,
            NameList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopicDocument {
    pub kind: TopicKind,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub property_sets: Vec<PropertySetDocument>,
    #[serde(default)]
    pub subprocesses: Vec<SubprocessDocument>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubprocessDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub property_sets: Vec<PropertySetDocument>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySetDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
    #[serde(default)]
    pub property_sets: Vec<PropertySetDocument>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub cardinality: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub injected: bool,
    #[serde(default, rename = "enum")]
    pub enumeration: Option<EnumDocument>,
    #[serde(default)]
    pub property_sets: Vec<PropertySetDocument>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDocument {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub choices: Vec<ChoiceDocument>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn load_path(path: &Path) -> Result<Specialization, CimspecError> {
    let raw = fs::read_to_string(path)?;
    from_str(&raw).map_err(|err| err.context(path.display()))
}

pub fn from_str(raw: &str) -> Result<Specialization, CimspecError> {
    let document: SpecializationDocument = serde_yaml::from_str(raw)?;
    document.into_specialization()
}

impl SpecializationDocument {
    pub fn into_specialization(self) -> Result<Specialization, CimspecError> {
        let header = Header {
            id: self.id,
            name: self.name,
            description: self.description,
            url: self.url,
        };
        let root = RootSpec {
            contact: self.contact,
            authors: self.authors.into_vec(),
            contributors: self.contributors.into_vec(),
            change_history: self.change_history,
        };

        let mut builder = SpecializationBuilder::new(header, root);
        for topic in self.topics {
            let header = Header {
                id: topic.id,
                name: topic.name,
                description: topic.description,
                url: topic.url,
            };
            let topic_id = builder.topic(topic.kind, header, topic.contact)?;
            add_property_sets(&mut builder, topic_id, topic.property_sets)?;

            for subprocess in topic.subprocesses {
                let header = Header {
                    id: subprocess.id,
                    name: subprocess.name,
                    description: subprocess.description,
                    url: subprocess.url,
                };
                let subprocess_id = builder.subprocess(topic_id, header)?;
                add_property_sets(&mut builder, subprocess_id, subprocess.property_sets)?;
            }
        }
        Ok(builder.build())
    }
}

fn add_property_sets(
    builder: &mut SpecializationBuilder,
    owner: NodeId,
    sets: Vec<PropertySetDocument>,
) -> Result<(), CimspecError> {
    for set in sets {
        let header = Header {
            id: set.id,
            name: set.name,
            description: set.description,
            url: set.url,
        };
        let set_id = builder.property_set(owner, header, set.inherited)?;

        for property in set.properties {
            let header = Header {
                id: property.id,
                name: property.name,
                description: property.description,
                url: property.url,
            };
            let draft = PropertyDraft {
                cardinality: property.cardinality,
                type_name: property.type_name,
                was_injected: property.injected,
            };
            let property_id = builder.property(set_id, header, draft)?;

            if let Some(enumeration) = property.enumeration {
                let draft = EnumDraft {
                    name: enumeration.name,
                    description: enumeration.description,
                    is_open: enumeration.open,
                    choices: enumeration
                        .choices
                        .into_iter()
                        .map(|choice| ChoiceDraft {
                            id: choice.id,
                            value: choice.value,
                            description: choice.description,
                        })
                        .collect(),
                };
                builder.enumeration(property_id, draft)?;
            }
            add_property_sets(builder, property_id, property.property_sets)?;
        }

        add_property_sets(builder, set_id, set.property_sets)?;
    }
    Ok(())
}
