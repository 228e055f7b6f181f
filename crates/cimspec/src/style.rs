use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CimspecError;
use crate::model::SectionKey;

const EMBEDDED_STYLES: &str = include_str!("../config/mindmap.yaml");

/// Legend entries, in the order they are rendered.
pub const LEGEND_SECTIONS: [SectionKey; 8] = [
    SectionKey::EnumChoice,
    SectionKey::Grid,
    SectionKey::KeyProps,
    SectionKey::Process,
    SectionKey::Property,
    SectionKey::PropertySet,
    SectionKey::Realm,
    SectionKey::Subprocess,
];

/// Presentation attributes for one section kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SectionStyle {
    pub bg_color: String,
    pub font_bold: bool,
    pub font_color: String,
    pub font_name: String,
    pub font_size: u32,
    pub is_collapsed: bool,
    pub description: String,
}

/// Immutable section-style lookup table used by the mindmap generator.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StyleTable {
    sections: BTreeMap<SectionKey, SectionStyle>,
}

impl StyleTable {
    /// The bundled default table.
    pub fn embedded() -> Result<Self, CimspecError> {
        Self::from_yaml(EMBEDDED_STYLES).map_err(|err| err.context("embedded style table"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, CimspecError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CimspecError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml(&raw).map_err(|err| err.context(path.display()))
    }

    pub fn section(&self, key: SectionKey) -> Result<&SectionStyle, CimspecError> {
        self.sections
            .get(&key)
            .ok_or_else(|| CimspecError::missing_section(key))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_covers_every_section() {
        let table = StyleTable::embedded().unwrap();
        for key in SectionKey::ALL {
            table.section(key).unwrap();
        }
        assert_eq!(table.len(), SectionKey::ALL.len());

        let property_set = table.section(SectionKey::PropertySet).unwrap();
        assert!(property_set.is_collapsed);
        assert_eq!(property_set.font_size, 10);
        assert_eq!(table.section(SectionKey::KeyProps).unwrap().bg_color, "#ffff66");
    }

    #[test]
    fn missing_section_is_a_lookup_error() {
        let table = StyleTable::from_yaml(
            r##"
realm:
  bg-color: "#66cc00"
  font-bold: true
  font-color: "#000000"
  font-name: courier
  font-size: 14
  is-collapsed: false
  description: Scientific area.
"##,
        )
        .unwrap();

        table.section(SectionKey::Realm).unwrap();
        match table.section(SectionKey::Grid).unwrap_err() {
            CimspecError::ConfigurationLookup { key } => assert_eq!(key, "grid"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let err = StyleTable::from_yaml("ocean-floor: {}\n").unwrap_err();
        assert!(matches!(err, CimspecError::Document(_)));
    }

    #[test]
    fn file_override_replaces_the_embedded_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("styles.yaml");
        std::fs::write(&path, "grid: { bg-color: \"#000\" }\n").unwrap();

        let err = StyleTable::from_path(&path).unwrap_err();
        match err {
            CimspecError::Document(message) => assert!(message.contains("styles.yaml")),
            other => panic!("unexpected error {other:?}"),
        }

        std::fs::write(&path, EMBEDDED_STYLES.replace("#ffff66", "#123456")).unwrap();
        let table = StyleTable::from_path(&path).unwrap();
        assert_eq!(table.section(SectionKey::KeyProps).unwrap().bg_color, "#123456");
    }
}
