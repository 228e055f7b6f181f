use cimspec::{
    ChangeEntry, ChoiceDraft, CimspecError, EnumDraft, Generator, Header, JsonGenerator,
    JsonTemplate, MindmapGenerator, NodeId, NodeKind, PropertyDraft, RootSpec, Specialization,
    SpecializationBuilder, StructuralError, StyleTable, TopicKind, walk,
};

struct Scenario {
    spec: Specialization,
    property: NodeId,
}

/// One realm, one property with cardinality 1.1 and an open two-choice enum.
fn scenario() -> Scenario {
    let root = RootSpec {
        contact: Some("Charlotte Pascoe".into()),
        authors: vec!["Charlotte Pascoe".into()],
        contributors: Vec::new(),
        change_history: vec![ChangeEntry {
            version: "0.0.1".into(),
            date: "2016-05-01".into(),
            author: "Charlotte Pascoe".into(),
            note: "Initial version".into(),
        }],
    };
    let mut builder = SpecializationBuilder::new(
        Header::new("cmip6.atmos", "atmos").with_description("Atmosphere realm"),
        root,
    );
    let realm = builder
        .topic(TopicKind::Realm, Header::new("cmip6.atmos.dynamics", "dynamics"), None)
        .unwrap();
    let set = builder
        .property_set(realm, Header::new("cmip6.atmos.dynamics.core", "core"), false)
        .unwrap();
    let property = builder
        .property(
            set,
            Header::new("cmip6.atmos.dynamics.core.timestepping", "timestepping"),
            PropertyDraft::new("1.1", "ENUM"),
        )
        .unwrap();
    builder
        .enumeration(
            property,
            EnumDraft {
                name: "timestepping_types".into(),
                description: Some("Time stepping schemes".into()),
                is_open: true,
                choices: vec![
                    ChoiceDraft::new("Adams-Bashforth", "Multi-step explicit"),
                    ChoiceDraft::new("leapfrog", "Centred explicit"),
                ],
            },
        )
        .unwrap();

    Scenario {
        spec: builder.build(),
        property,
    }
}

#[test]
fn tree_form_inlines_the_enumeration() {
    let Scenario { spec, .. } = scenario();
    let mut generator = JsonGenerator::new("cmip6", &spec).with_template(JsonTemplate::bare());
    let output = generator.generate().unwrap();
    let document: serde_json::Value = serde_json::from_str(&output).unwrap();

    let property = &document["subTopics"][0]["properties"][0];
    assert_eq!(property["cardinality"], "1.1");
    assert_eq!(property["label"], "Core > Timestepping");
    assert_eq!(property["enum"]["isOpen"], true);
    assert_eq!(property["enum"]["choices"].as_array().unwrap().len(), 2);
    assert_eq!(property["enum"]["choices"][0]["description"], "Multi-step explicit");
}

#[test]
fn graph_form_attaches_choices_to_the_property() {
    let Scenario { spec, property } = scenario();
    let styles = StyleTable::embedded().unwrap();
    let mut generator = MindmapGenerator::new("cmip6", &spec, &styles);
    generator.generate().unwrap();

    let node = generator.node_for(property).unwrap();
    let texts: Vec<_> = generator
        .map()
        .children(node)
        .map(|(_, child)| child.attributes.text.clone())
        .collect();
    assert_eq!(texts, vec!["Adams-Bashforth", "leapfrog"]);
}

#[test]
fn dangling_root_topic_is_a_cache_miss() {
    let Scenario { spec, property } = scenario();

    // Point the property at a property set, which never gets a tree fragment.
    let mut builder = SpecializationBuilder::new(Header::new("r", "r"), RootSpec::default());
    let realm = builder
        .topic(TopicKind::Realm, Header::new("r.realm", "realm"), None)
        .unwrap();
    let set = builder
        .property_set(realm, Header::new("r.realm.set", "set"), false)
        .unwrap();
    let mut detached = match &spec.node(property).unwrap().kind {
        NodeKind::Property(property_spec) => property_spec.clone(),
        other => panic!("unexpected kind {other:?}"),
    };
    detached.root_topic = set;
    detached.enumeration = None;
    builder
        .add_node(
            set,
            Header::new("r.realm.set.p", "p"),
            NodeKind::Property(detached),
        )
        .unwrap();
    let broken = builder.build();

    let mut generator = JsonGenerator::new("cmip6", &broken);
    match generator.generate().unwrap_err() {
        CimspecError::Structural(StructuralError::CacheMiss { node }) => assert_eq!(node, set),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn both_generators_share_one_walk_contract() {
    let Scenario { spec, .. } = scenario();
    let styles = StyleTable::embedded().unwrap();

    let mut json = JsonGenerator::new("cmip6", &spec);
    let mut mindmap = MindmapGenerator::new("cmip6", &spec, &styles);
    walk(&spec, &mut json).unwrap();
    walk(&spec, &mut mindmap).unwrap();

    assert!(json.get_output().unwrap().contains("timestepping_types"));
    assert!(mindmap.get_output().unwrap().contains("TEXT=\"leapfrog\""));
}
