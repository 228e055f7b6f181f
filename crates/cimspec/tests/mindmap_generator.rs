use std::path::PathBuf;

use cimspec::mindmap::NodeStyle;
use cimspec::{
    CimspecError, Generator, LEGEND_SECTIONS, MindMap, MindmapGenerator, NodeId, Specialization,
    StyleTable, load_path,
};

fn fixture() -> Specialization {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("ocean.yaml");
    load_path(&path).unwrap()
}

fn source(spec: &Specialization, id: &str) -> NodeId {
    spec.iter()
        .find(|node| node.header.id == id)
        .map(|node| node.id)
        .unwrap_or_else(|| panic!("no node {id}"))
}

fn child_texts(map: &MindMap, parent: cimspec::MapNodeId) -> Vec<String> {
    map.children(parent)
        .map(|(_, node)| node.attributes.text.clone())
        .collect()
}

#[test]
fn root_hangs_off_the_map_with_synthetic_sections_first() {
    let spec = fixture();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    generator.generate().unwrap();

    let map = generator.map();
    assert_eq!(map.top_level().len(), 1);
    let root = map.top_level()[0];
    let root_node = map.node(root).unwrap();
    assert_eq!(root_node.attributes.text, "ocean");
    assert_eq!(root_node.attributes.style, NodeStyle::Fork);
    assert_eq!(
        child_texts(map, root),
        vec!["CHANGE HISTORY", "LEGEND", "key_properties", "grid", "advection"]
    );
}

#[test]
fn legend_lists_every_section_kind() {
    let spec = fixture();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    generator.generate().unwrap();

    let map = generator.map();
    let legend = map.find_by_text("LEGEND").unwrap();
    let expected: Vec<String> = LEGEND_SECTIONS.iter().map(|key| key.to_string()).collect();
    assert_eq!(child_texts(map, legend), expected);

    for (_, entry) in map.children(legend) {
        assert_eq!(entry.notes.len(), 1);
        assert_eq!(entry.notes[0].label, "Description");
        assert!(entry.attributes.background_color.is_some());
    }
}

#[test]
fn change_history_entries_carry_four_notes() {
    let spec = fixture();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    generator.generate().unwrap();

    let map = generator.map();
    let history = map.find_by_text("CHANGE HISTORY").unwrap();
    assert_eq!(child_texts(map, history), vec!["0.1.0", "0.2.0"]);

    let (_, second) = map.children(history).nth(1).unwrap();
    let labels: Vec<_> = second.notes.iter().map(|note| note.label).collect();
    assert_eq!(labels, vec!["Version", "Date", "Person", "Comment"]);
    let values: Vec<_> = second.notes.iter().map(|note| note.value.as_str()).collect();
    assert_eq!(values, vec!["0.2.0", "2016-04-21", "David Hassell", "Added advection"]);
}

#[test]
fn injected_and_inherited_nodes_are_suppressed() {
    let spec = fixture();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    generator.generate().unwrap();

    for id in [
        "cmip6.ocean.key_properties.general.name",
        "cmip6.ocean.key_properties.general.basic_approximations",
        "cmip6.ocean.key_properties.citations",
        "cmip6.ocean.key_properties.citations.reference",
        "cmip6.ocean.key_properties.general.basic_approximations.Boussinesq",
    ] {
        let node = source(&spec, id);
        assert!(generator.node_for(node).is_none(), "{id} should be suppressed");
        assert!(generator.is_suppressed(node), "{id} should be recorded");
    }

    let map = generator.map();
    assert!(map.find_by_text("citations").is_none());
    assert!(map.find_by_text("Boussinesq").is_none());

    let general = generator
        .node_for(source(&spec, "cmip6.ocean.key_properties.general"))
        .unwrap();
    assert_eq!(child_texts(map, general), vec!["model_family"]);
}

#[test]
fn enum_choices_hang_under_their_property() {
    let spec = fixture();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    generator.generate().unwrap();

    let family = generator
        .node_for(source(&spec, "cmip6.ocean.key_properties.general.model_family"))
        .unwrap();
    let map = generator.map();
    assert_eq!(
        child_texts(map, family),
        vec!["OGCM", "slab ocean", "mixed layer ocean"]
    );

    let family_node = map.node(family).unwrap();
    let labels: Vec<_> = family_node.notes.iter().map(|note| note.label).collect();
    assert_eq!(
        labels,
        vec!["Description", "Spec. ID", "Type", "Cardinality", "Specialization ID"]
    );
    let font = family_node.font.as_ref().unwrap();
    assert_eq!(font.size, 10);
    assert_eq!(family_node.attributes.folded, Some(true));
}

#[test]
fn subprocesses_nest_under_their_process_with_links() {
    let spec = fixture();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    generator.generate().unwrap();

    let advection = generator
        .node_for(source(&spec, "cmip6.ocean.advection"))
        .unwrap();
    let map = generator.map();
    assert_eq!(child_texts(map, advection), vec!["details", "momentum"]);
    assert_eq!(
        map.node(advection).unwrap().attributes.link.as_deref(),
        Some("https://es-doc.org/cmip6/ocean/advection")
    );

    let grid = generator.node_for(source(&spec, "cmip6.ocean.grid")).unwrap();
    assert_eq!(map.node(grid).unwrap().attributes.link, None);
}

#[test]
fn serialized_output_is_well_formed_and_stable() {
    let spec = fixture();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    let first = generator.generate().unwrap();
    let second = generator.generate().unwrap();
    assert_eq!(first, second);

    assert!(first.starts_with(
        "<map><node FOLDED=\"false\" COLOR=\"#000000\" BACKGROUND_COLOR=\"#F5A9BC\" \
         STYLE=\"fork\" TEXT=\"ocean\" LINK=\"https://es-doc.org/cmip6/ocean\">"
    ));
    assert!(first.contains("<font BOLD=\"true\" NAME=\"courier\" SIZE=\"14\"/>"));
    assert!(first.contains("<dd>Ocean realm and its processes</dd>"));
    assert!(first.contains("<dt><b>Authors</b></dt><dd>Eric Guilyardi, David Hassell</dd>"));
    assert!(first.contains("TEXT=\"LEGEND\" POSITION=\"left\""));
    assert!(first.ends_with("</node></map>"));
    assert_eq!(
        first.matches("<richcontent TYPE=\"NOTE\">").count(),
        first.matches("</richcontent>").count()
    );
}

#[test]
fn missing_style_section_fails_the_run() {
    let spec = fixture();
    let styles = StyleTable::from_yaml(
        r##"
model:
  bg-color: "#fff"
  font-bold: true
  font-color: "#000"
  font-name: courier
  font-size: 14
  is-collapsed: false
  description: Model
"##,
    )
    .unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);

    match generator.generate().unwrap_err() {
        CimspecError::ConfigurationLookup { key } => assert_eq!(key, "enum-choice"),
        other => panic!("unexpected error {other:?}"),
    }
}
