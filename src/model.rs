use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    #[default]
    Normal,
    Sub,
    Super,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAttributes {
    pub strong: bool,
    pub cursive: bool,
    pub underline: bool,
    pub script: Script,
}

/// One styled run of text. Neighbouring runs are never merged, even when
/// they carry the same attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RichString {
    pub text: String,
    pub attrs: TextAttributes,
}

impl RichString {
    pub fn plain(text: impl Into<String>) -> Self {
        RichString {
            text: text.into(),
            attrs: TextAttributes::default(),
        }
    }

    pub fn line_break() -> Self {
        RichString::plain("\n")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    pub img: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Code {
    pub content: String,
    pub language: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LinkContent {
    Paragraph(Paragraph),
    InlineImage(InlineImage),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "ref")]
    pub target: String,
    pub text: LinkContent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Inline {
    RichString(RichString),
    InlineImage(InlineImage),
    Link(Link),
    Code(Code),
}

impl Inline {
    /// The text payload when this fragment is a styled string.
    pub fn as_rich_string(&self) -> Option<&RichString> {
        match self {
            Inline::RichString(s) => Some(s),
            _ => None,
        }
    }
}

pub type RichText = Vec<Inline>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: RichText,
}

impl Paragraph {
    pub fn new(text: RichText) -> Self {
        Paragraph { text }
    }

    /// Stand-in body for a table cell without content.
    pub fn placeholder() -> Self {
        Paragraph {
            text: vec![Inline::RichString(RichString::plain(" "))],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListItem {
    #[serde(rename = "richtext")]
    Run { text: RichText },
    List(List),
    Paragraph(Paragraph),
    Link(Link),
    Code(Code),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub elements: Vec<ListItem>,
}

/// Column-group declaration. `span` is kept exactly as written in the source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Col {
    pub span: String,
    pub style: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    #[serde(rename = "th")]
    Header,
    #[serde(rename = "td")]
    Data,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "type")]
    pub kind: CellKind,
    pub colspan: String,
    pub content: Vec<TableSegment>,
}

pub type Row = Vec<Cell>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableBody {
    pub colgroup: Vec<Col>,
    pub body: Vec<Row>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TableSegment {
    Paragraph(Paragraph),
    InlineImage(InlineImage),
    List(List),
    Table { content: TableBody },
    Code(Code),
    Link(Link),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    Title,
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Maps a source heading level (1..=5) to its demoted model level.
    pub fn demoted(source_level: u8) -> Option<Self> {
        match source_level {
            1 => Some(HeadingLevel::Title),
            2 => Some(HeadingLevel::H1),
            3 => Some(HeadingLevel::H2),
            4 => Some(HeadingLevel::H3),
            5 => Some(HeadingLevel::H4),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub element: HeadingLevel,
    pub text: RichText,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TextSegment {
    TextElement(TextElement),
    Paragraph(Paragraph),
    InlineImage(InlineImage),
    Link(Link),
    List(List),
    Table { content: TableBody },
    Code(Code),
}

/// Ordered top-level segments extracted from one source document.
///
/// This is the JSON handed to the renderer. Every union is internally tagged
/// with `"kind"`, so two shapes differ from the older untagged contract:
/// inline styled strings carry `"kind": "richstring"`, and a plain run in a
/// list is `{"kind": "richtext", "text": [...]}` rather than a bare array.
/// Renderers written against the untagged shape need to read the tags.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TextSegment>,
}
