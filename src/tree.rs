//! Flat node arena the extractor walks.
//!
//! Markup is parsed once (HTML through html5ever, XHTML through roxmltree)
//! and every element is categorized into a [`Tag`] while the arena is built,
//! so the extractor never compares tag names itself. Parents are plain
//! indices into the arena.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Element categories the extractor knows about. Everything else is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// `h1` to `h5`; `h6` and deeper are `Other`.
    Heading(u8),
    Paragraph,
    Anchor,
    Image,
    Table,
    /// `thead`, `tbody` or `tfoot`.
    TableSection,
    Row,
    HeaderCell,
    DataCell,
    ColGroup,
    Col,
    UnorderedList,
    OrderedList,
    ListItem,
    Code,
    LineBreak,
    Div { content: bool },
    Span,
    Strong,
    Emphasis,
    Underline,
    Subscript,
    Superscript,
    Other,
}

impl Tag {
    pub fn classify(name: &str, class: Option<&str>) -> Tag {
        let has_class = |wanted: &str| {
            class.is_some_and(|c| c.split_whitespace().any(|c| c == wanted))
        };
        match name.to_ascii_lowercase().as_str() {
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "p" => Tag::Paragraph,
            "a" => Tag::Anchor,
            "img" => Tag::Image,
            "table" => Tag::Table,
            "thead" | "tbody" | "tfoot" => Tag::TableSection,
            "tr" => Tag::Row,
            "th" => Tag::HeaderCell,
            "td" => Tag::DataCell,
            "colgroup" => Tag::ColGroup,
            "col" => Tag::Col,
            "ul" => Tag::UnorderedList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "code" => Tag::Code,
            "br" => Tag::LineBreak,
            "div" => Tag::Div {
                content: has_class("content"),
            },
            "span" if has_class("underline") => Tag::Underline,
            "span" => Tag::Span,
            "strong" | "b" => Tag::Strong,
            "em" | "i" => Tag::Emphasis,
            "u" => Tag::Underline,
            "sub" => Tag::Subscript,
            "sup" => Tag::Superscript,
            _ => Tag::Other,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Element {
    pub tag: Tag,
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Tree {
    /// An empty tree holding only the document root.
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(Element {
                tag: Tag::Other,
                name: "#document".into(),
                attrs: Vec::new(),
            }),
        };
        Tree { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Category of an element, `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        match &self.node(id).data {
            NodeData::Element(el) => Some(el.tag),
            NodeData::Text(_) => None,
        }
    }

    /// Literal payload of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element(el) => el
                .attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Concatenated text of every descendant text node, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            match &self.node(next).data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element(_) => stack.extend(self.children(next).iter().rev()),
            }
        }
        out
    }

    /// Siblings after `id` under the same parent.
    pub fn following_siblings(&self, id: NodeId) -> &[NodeId] {
        let Some(parent) = self.parent(id) else {
            return &[];
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => &siblings[pos + 1..],
            None => &[],
        }
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let class = attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("class"))
            .map(|(_, v)| v.as_str());
        let tag = Tag::classify(name, class);
        let element = Element {
            tag,
            name: name.to_string(),
            attrs,
        };
        self.push(parent, NodeData::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Parses an HTML document or fragment. HTML parsing never fails; the
    /// parser recovers from malformed markup the way browsers do.
    pub fn parse_html(html: &str) -> Tree {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let mut tree = Tree::new();
        let root = tree.root();
        let mut stack: Vec<(Handle, NodeId)> = dom
            .document
            .children
            .borrow()
            .iter()
            .rev()
            .map(|h| (h.clone(), root))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            match &handle.data {
                DomData::Element { name, attrs, .. } => {
                    let attrs = attrs
                        .borrow()
                        .iter()
                        .map(|a| (a.name.local.to_string(), a.value.to_string()))
                        .collect();
                    let id = tree.append_element(parent, &name.local, attrs);
                    for child in handle.children.borrow().iter().rev() {
                        stack.push((child.clone(), id));
                    }
                }
                DomData::Text { contents } => {
                    tree.append_text(parent, &contents.borrow());
                }
                DomData::Document
                | DomData::Doctype { .. }
                | DomData::Comment { .. }
                | DomData::ProcessingInstruction { .. } => {}
            }
        }
        tree
    }

    /// Parses well-formed XHTML. Namespaces are dropped; only local names
    /// are kept.
    pub fn parse_xhtml(xml: &str) -> Result<Tree, Error> {
        let opts = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = roxmltree::Document::parse_with_options(xml, opts)?;
        let mut tree = Tree::new();
        let mut stack = vec![(doc.root_element(), tree.root())];

        while let Some((node, parent)) = stack.pop() {
            if node.is_element() {
                let attrs = node
                    .attributes()
                    .map(|a| (a.name().to_string(), a.value().to_string()))
                    .collect();
                let id = tree.append_element(parent, node.tag_name().name(), attrs);
                for child in node.children().rev() {
                    stack.push((child, id));
                }
            } else if node.is_text()
                && let Some(text) = node.text()
            {
                tree.append_text(parent, text);
            }
        }
        Ok(tree)
    }
}
