//! Graph-form (mindmap) rendering of a specialization.
//!
//! Nodes are created top-down: every emitted source node becomes a [`MapNode`] attached under
//! its parent's already-created map node, then decorated with a font and a notes block taken
//! from the [`StyleTable`]. Injected properties and inherited property sets are skipped along
//! with everything beneath them.

use std::collections::HashSet;

use handlebars::Handlebars;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use tracing::debug;

use crate::cache::FragmentCache;
use crate::error::{CimspecError, StructuralError};
use crate::generate::Generator;
use crate::model::{
    EnumChoiceSpec, Node, NodeId, NodeKind, PropertySetSpec, PropertySpec, RootSpec,
    Specialization, TopicSpec,
};
use crate::style::{LEGEND_SECTIONS, SectionStyle, StyleTable};
use crate::traversal::SpecializationVisitor;

const NOTES_TEMPLATE: &str = "<html><head></head><body><dl>\
{{#each notes}}<dt><b>{{this.label}}</b></dt><dd>{{this.value}}</dd>{{/each}}\
</dl></body></html>";

const NOT_AVAILABLE: &str = "N/A";
const LEGEND_TEXT: &str = "LEGEND";
const CHANGE_HISTORY_TEXT: &str = "CHANGE HISTORY";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapNodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStyle {
    Fork,
    Bubble,
}

impl NodeStyle {
    fn as_str(self) -> &'static str {
        match self {
            NodeStyle::Fork => "fork",
            NodeStyle::Bubble => "bubble",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Left,
}

impl Position {
    fn as_str(self) -> &'static str {
        match self {
            Position::Left => "left",
        }
    }
}

/// `node` element attributes. Serialized in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeAttributes {
    pub folded: Option<bool>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub style: NodeStyle,
    pub text: String,
    pub link: Option<String>,
    pub position: Option<Position>,
}

impl NodeAttributes {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            folded: None,
            color: None,
            background_color: None,
            style: NodeStyle::Bubble,
            text: text.into(),
            link: None,
            position: None,
        }
    }

    fn styled(section: &SectionStyle, text: impl Into<String>, style: NodeStyle) -> Self {
        Self {
            folded: Some(section.is_collapsed),
            color: Some(section.font_color.clone()),
            background_color: Some(section.bg_color.clone()),
            style,
            ..Self::new(text)
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(7);
        if let Some(folded) = self.folded {
            pairs.push(("FOLDED", folded.to_string()));
        }
        if let Some(color) = &self.color {
            pairs.push(("COLOR", color.clone()));
        }
        if let Some(background) = &self.background_color {
            pairs.push(("BACKGROUND_COLOR", background.clone()));
        }
        pairs.push(("STYLE", self.style.as_str().to_string()));
        pairs.push(("TEXT", self.text.clone()));
        if let Some(link) = &self.link {
            pairs.push(("LINK", link.clone()));
        }
        if let Some(position) = self.position {
            pairs.push(("POSITION", position.as_str().to_string()));
        }
        pairs
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Font {
    pub bold: bool,
    pub name: String,
    pub size: u32,
}

impl From<&SectionStyle> for Font {
    fn from(section: &SectionStyle) -> Self {
        Self {
            bold: section.font_bold,
            name: section.font_name.clone(),
            size: section.font_size,
        }
    }
}

/// One `<dt>`/`<dd>` pair of a notes block.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Note {
    pub label: &'static str,
    pub value: String,
}

impl Note {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapNode {
    pub attributes: NodeAttributes,
    pub font: Option<Font>,
    pub notes: Vec<Note>,
    pub children: Vec<MapNodeId>,
}

/// Arena of mindmap nodes hanging off a synthetic `map` element.
#[derive(Clone, Debug, Default)]
pub struct MindMap {
    nodes: Vec<MapNode>,
    top_level: Vec<MapNodeId>,
}

impl MindMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node under `parent`, or directly under `map` when `parent` is `None`.
    pub fn add(
        &mut self,
        parent: Option<MapNodeId>,
        attributes: NodeAttributes,
    ) -> Result<MapNodeId, CimspecError> {
        let id = MapNodeId(self.nodes.len());
        match parent {
            Some(parent) => self.node_mut(parent)?.children.push(id),
            None => self.top_level.push(id),
        }
        self.nodes.push(MapNode {
            attributes,
            font: None,
            notes: Vec::new(),
            children: Vec::new(),
        });
        Ok(id)
    }

    pub fn node(&self, id: MapNodeId) -> Option<&MapNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: MapNodeId) -> Result<&mut MapNode, CimspecError> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| CimspecError::Serialization(format!("unknown map node {}", id.0)))
    }

    pub fn top_level(&self) -> &[MapNodeId] {
        &self.top_level
    }

    pub fn children(&self, id: MapNodeId) -> impl Iterator<Item = (MapNodeId, &MapNode)> {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.node(*child).map(|node| (*child, node)))
    }

    /// Depth-first search for the first node whose TEXT equals `text`.
    pub fn find_by_text(&self, text: &str) -> Option<MapNodeId> {
        let mut stack: Vec<MapNodeId> = self.top_level.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if node.attributes.text == text {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_xml(&self, notes: &NotesRenderer) -> Result<String, CimspecError> {
        let mut writer = Writer::new(Vec::new());
        emit(&mut writer, Event::Start(BytesStart::new("map")))?;
        for id in &self.top_level {
            self.write_node(&mut writer, *id, notes)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("map")))?;
        String::from_utf8(writer.into_inner())
            .map_err(|err| CimspecError::Serialization(err.to_string()))
    }

    fn write_node(
        &self,
        writer: &mut Writer<Vec<u8>>,
        id: MapNodeId,
        notes: &NotesRenderer,
    ) -> Result<(), CimspecError> {
        let node = self
            .node(id)
            .ok_or_else(|| CimspecError::Serialization(format!("unknown map node {}", id.0)))?;

        let pairs = node.attributes.pairs();
        let mut start = BytesStart::new("node");
        for (key, value) in &pairs {
            start.push_attribute((*key, value.as_str()));
        }
        emit(writer, Event::Start(start))?;

        if let Some(font) = &node.font {
            let bold = font.bold.to_string();
            let size = font.size.to_string();
            let mut element = BytesStart::new("font");
            element.push_attribute(("BOLD", bold.as_str()));
            element.push_attribute(("NAME", font.name.as_str()));
            element.push_attribute(("SIZE", size.as_str()));
            emit(writer, Event::Empty(element))?;
        }

        if !node.notes.is_empty() {
            let html = notes.render(&node.notes)?;
            let mut element = BytesStart::new("richcontent");
            element.push_attribute(("TYPE", "NOTE"));
            emit(writer, Event::Start(element))?;
            emit(writer, Event::Text(BytesText::from_escaped(html.as_str())))?;
            emit(writer, Event::End(BytesEnd::new("richcontent")))?;
        }

        for child in &node.children {
            self.write_node(writer, *child, notes)?;
        }
        emit(writer, Event::End(BytesEnd::new("node")))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CimspecError> {
    writer
        .write_event(event)
        .map_err(|err| CimspecError::Serialization(err.to_string()))
}

/// Renders notes as an HTML definition list; values are HTML-escaped.
pub struct NotesRenderer {
    registry: Handlebars<'static>,
}

impl Default for NotesRenderer {
    fn default() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        Self { registry }
    }
}

impl NotesRenderer {
    pub fn render(&self, notes: &[Note]) -> Result<String, CimspecError> {
        #[derive(Serialize)]
        struct NotesContext<'n> {
            notes: &'n [Note],
        }

        self.registry
            .render_template(NOTES_TEMPLATE, &NotesContext { notes })
            .map_err(|err| CimspecError::Template(err.to_string()))
    }
}

/// Encodes a specialization as a mindmap document.
pub struct MindmapGenerator<'a> {
    project: String,
    spec: &'a Specialization,
    styles: &'a StyleTable,
    renderer: NotesRenderer,
    map: MindMap,
    cache: FragmentCache<MapNodeId>,
    suppressed: HashSet<NodeId>,
}

impl<'a> MindmapGenerator<'a> {
    pub fn new(
        project: impl Into<String>,
        spec: &'a Specialization,
        styles: &'a StyleTable,
    ) -> Self {
        Self {
            project: project.into(),
            spec,
            styles,
            renderer: NotesRenderer::default(),
            map: MindMap::new(),
            cache: FragmentCache::new(),
            suppressed: HashSet::new(),
        }
    }

    pub fn map(&self) -> &MindMap {
        &self.map
    }

    /// Map node created for `source`, if it was emitted.
    pub fn node_for(&self, source: NodeId) -> Option<MapNodeId> {
        self.cache.get(source).ok().copied()
    }

    pub fn is_suppressed(&self, source: NodeId) -> bool {
        self.suppressed.contains(&source)
    }

    /// Records `node` as skipped when it is flagged, or when its parent was skipped.
    fn suppress_if(&mut self, node: &Node, parent: NodeId, flagged: bool) -> bool {
        if flagged || self.suppressed.contains(&parent) {
            debug!(id = %node.header.id, "mindmap: suppressed");
            self.suppressed.insert(node.id);
            return true;
        }
        false
    }

    fn emit_node(
        &mut self,
        parent: Option<NodeId>,
        node: &Node,
        text: &str,
        style: NodeStyle,
    ) -> Result<MapNodeId, CimspecError> {
        let section = self.styles.section(node.section())?;
        let mut attributes = NodeAttributes::styled(section, text, style);
        attributes.link = node.header.url.clone();

        let parent = match parent {
            Some(parent) => Some(*self.cache.get(parent)?),
            None => None,
        };
        let id = self.map.add(parent, attributes)?;
        self.cache.insert(node.id, id)?;

        let decorated = self.map.node_mut(id)?;
        decorated.font = Some(Font::from(section));
        decorated.notes = node_notes(node);
        debug!(id = %node.header.id, section = %node.section(), "mindmap: node");
        Ok(id)
    }

    fn emit_change_history(
        &mut self,
        root: MapNodeId,
        spec: &RootSpec,
    ) -> Result<(), CimspecError> {
        let mut attributes = NodeAttributes::new(CHANGE_HISTORY_TEXT);
        attributes.folded = Some(true);
        attributes.position = Some(Position::Left);
        let section = self.map.add(Some(root), attributes)?;

        for entry in &spec.change_history {
            let id = self
                .map
                .add(Some(section), NodeAttributes::new(entry.version.clone()))?;
            self.map.node_mut(id)?.notes = vec![
                Note::new("Version", entry.version.clone()),
                Note::new("Date", entry.date.clone()),
                Note::new("Person", entry.author.clone()),
                Note::new("Comment", entry.note.clone()),
            ];
        }
        Ok(())
    }

    fn emit_legend(&mut self, root: MapNodeId) -> Result<(), CimspecError> {
        let mut attributes = NodeAttributes::new(LEGEND_TEXT);
        attributes.folded = Some(true);
        attributes.position = Some(Position::Left);
        let legend = self.map.add(Some(root), attributes)?;

        for key in LEGEND_SECTIONS {
            let section = self.styles.section(key)?;
            let mut attributes = NodeAttributes::new(key.as_str());
            attributes.background_color = Some(section.bg_color.clone());
            attributes.color = Some(section.font_color.clone());
            let id = self.map.add(Some(legend), attributes)?;
            self.map.node_mut(id)?.notes =
                vec![Note::new("Description", section.description.clone())];
        }
        Ok(())
    }
}

fn node_notes(node: &Node) -> Vec<Note> {
    let description = match &node.header.description {
        Some(description) => description.replace('&', "and"),
        None => NOT_AVAILABLE.to_string(),
    };
    let mut notes = vec![
        Note::new("Description", description),
        Note::new("Spec. ID", node.header.id.clone()),
    ];

    match &node.kind {
        NodeKind::Property(property) => {
            notes.push(Note::new("Type", property.type_name.clone()));
            notes.push(Note::new("Cardinality", property.cardinality.clone()));
            notes.push(Note::new("Specialization ID", node.header.id.clone()));
        }
        NodeKind::Root(root) => {
            let contact = root.contact.as_deref().unwrap_or(NOT_AVAILABLE);
            notes.push(Note::new("Contact", contact));
            notes.push(Note::new("Authors", root.authors.join(", ")));
            notes.push(Note::new("Contributors", root.contributors.join(", ")));
        }
        _ => {}
    }
    notes
}

impl<'a> SpecializationVisitor for MindmapGenerator<'a> {
    fn on_root_enter(
        &mut self,
        _spec: &Specialization,
        node: &Node,
        root: &RootSpec,
    ) -> Result<(), CimspecError> {
        debug!(project = %self.project, id = %node.header.id, "mindmap: root");
        let id = self.emit_node(None, node, &node.header.name, NodeStyle::Fork)?;
        self.emit_change_history(id, root)?;
        self.emit_legend(id)
    }

    fn on_topic_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        _topic: &TopicSpec,
    ) -> Result<(), CimspecError> {
        let parent = node.parent.unwrap_or(spec.root());
        self.emit_node(Some(parent), node, &node.header.name, NodeStyle::Bubble)?;
        Ok(())
    }

    fn on_subprocess_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
    ) -> Result<(), CimspecError> {
        let parent = node.parent.unwrap_or(spec.root());
        self.emit_node(Some(parent), node, &node.header.name, NodeStyle::Bubble)?;
        Ok(())
    }

    fn on_property_set_enter(
        &mut self,
        _spec: &Specialization,
        node: &Node,
        set: &PropertySetSpec,
    ) -> Result<(), CimspecError> {
        let parent = node.parent.ok_or(StructuralError::UnknownNode { node: node.id })?;
        if self.suppress_if(node, parent, set.members_inherited) {
            return Ok(());
        }
        self.emit_node(Some(parent), node, &node.header.name, NodeStyle::Bubble)?;
        Ok(())
    }

    fn on_property_enter(
        &mut self,
        _spec: &Specialization,
        node: &Node,
        property: &PropertySpec,
    ) -> Result<(), CimspecError> {
        let parent = node.parent.ok_or(StructuralError::UnknownNode { node: node.id })?;
        if self.suppress_if(node, parent, property.was_injected) {
            return Ok(());
        }
        self.emit_node(Some(parent), node, &node.header.name, NodeStyle::Bubble)?;
        Ok(())
    }

    fn on_enum_choice_enter(
        &mut self,
        spec: &Specialization,
        node: &Node,
        choice: &EnumChoiceSpec,
    ) -> Result<(), CimspecError> {
        let owner = spec.node(choice.owner)?;
        let detail = match &owner.kind {
            NodeKind::Property(PropertySpec {
                enumeration: Some(enumeration),
                ..
            }) => enumeration.detail,
            _ => return Err(StructuralError::CacheMiss { node: choice.owner }.into()),
        };
        if self.suppress_if(node, choice.owner, false) || self.suppress_if(node, detail, false) {
            return Ok(());
        }
        self.emit_node(Some(detail), node, &choice.value, NodeStyle::Bubble)?;
        Ok(())
    }
}

impl<'a> Generator<'a> for MindmapGenerator<'a> {
    const FORMAT: &'static str = "mindmap";

    fn specialization(&self) -> &'a Specialization {
        self.spec
    }

    fn reset(&mut self) {
        self.map = MindMap::new();
        self.cache.clear();
        self.suppressed.clear();
    }

    fn get_output(&self) -> Result<String, CimspecError> {
        if !self.cache.contains(self.spec.root()) {
            return Err(StructuralError::NotGenerated.into());
        }
        self.map.to_xml(&self.renderer)
    }
}
