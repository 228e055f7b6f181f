/// Number of leading dotted-id segments (project, model, realm) dropped from property labels.
pub const PROPERTY_ID_PREFIX_SEGMENTS: usize = 3;

/// Converts raw identifiers into human-readable labels.
pub trait LabelFormatter {
    fn get_label(&self, name: &str) -> String;
}

impl<F> LabelFormatter for F
where
    F: Fn(&str) -> String,
{
    fn get_label(&self, name: &str) -> String {
        self(name)
    }
}

/// `key_properties` → `Key Properties`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitleCaseLabels;

impl LabelFormatter for TitleCaseLabels {
    fn get_label(&self, name: &str) -> String {
        name.split(|ch: char| ch == '_' || ch.is_whitespace())
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Label for a property: every id segment after the fixed prefix, labelled and joined by ` > `.
pub fn property_label<L>(labels: &L, id: &str) -> String
where
    L: LabelFormatter + ?Sized,
{
    id.split('.')
        .skip(PROPERTY_ID_PREFIX_SEGMENTS)
        .map(|segment| labels.get_label(segment))
        .collect::<Vec<_>>()
        .join(" > ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
