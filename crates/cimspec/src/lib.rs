pub mod builder;
pub mod cache;
pub mod document;
pub mod error;
pub mod generate;
pub mod json;
pub mod labels;
pub mod mindmap;
pub mod model;
pub mod style;
pub mod traversal;

pub use builder::{ChoiceDraft, EnumDraft, PropertyDraft, SpecializationBuilder};
pub use cache::FragmentCache;
pub use document::{SpecializationDocument, load_path};
pub use error::{CimspecError, StructuralError};
pub use generate::Generator;
pub use json::{JsonGenerator, JsonTemplate};
pub use labels::{LabelFormatter, TitleCaseLabels, property_label};
pub use mindmap::{MapNode, MapNodeId, MindMap, MindmapGenerator, Note};
pub use model::{
    ChangeEntry, EnumChoiceSpec, EnumSpec, Header, Node, NodeId, NodeKind, PropertySetSpec,
    PropertySpec, RootSpec, SectionKey, Specialization, TopicKind, TopicSpec,
};
pub use style::{LEGEND_SECTIONS, SectionStyle, StyleTable};
pub use traversal::{EventKind, SpecializationVisitor, walk};
