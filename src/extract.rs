use crate::error::Error;
use crate::images::ImageCollector;
use crate::model::{
    Code, HeadingLevel, Inline, InlineImage, Link, LinkContent, Paragraph, RichString, RichText,
    Script, TextAttributes, TextElement, TextSegment,
};
use crate::tree::{NodeId, Tag, Tree};

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Walks a parsed [`Tree`] and produces typed segments.
///
/// The extractor holds no state besides its inputs; the same tree always
/// yields the same segments.
pub struct Extractor<'a> {
    pub(crate) tree: &'a Tree,
    images: &'a dyn ImageCollector,
    max_depth: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(tree: &'a Tree, images: &'a dyn ImageCollector) -> Self {
        Extractor {
            tree,
            images,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Extracts the segments below `node`. With a non-empty `sections` list
    /// only the content of headings with those titles is kept.
    pub fn extract(&self, node: NodeId, sections: &[String]) -> Result<Vec<TextSegment>, Error> {
        let mut out = Vec::new();
        self.walk(node, sections, 0, &mut out)?;
        Ok(out)
    }

    pub(crate) fn descend(&self, depth: usize) -> Result<usize, Error> {
        if depth >= self.max_depth {
            return Err(Error::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(depth + 1)
    }

    fn walk(
        &self,
        id: NodeId,
        sections: &[String],
        depth: usize,
        out: &mut Vec<TextSegment>,
    ) -> Result<(), Error> {
        let depth = self.descend(depth)?;
        let Some(tag) = self.tree.tag(id) else {
            return Ok(());
        };

        if let Tag::Heading(level) = tag {
            if sections.is_empty()
                && let Some(element) = HeadingLevel::demoted(level)
            {
                let text = self.rich_text(self.tree.children(id), depth)?;
                out.push(TextSegment::TextElement(TextElement { element, text }));
            }
            return Ok(());
        }

        if !sections.is_empty() {
            return self.walk_sections(id, sections, depth, out);
        }

        let children = self.tree.children(id);
        match tag {
            Tag::Paragraph | Tag::Div { content: true } => {
                let text = self.rich_text(children, depth)?;
                out.push(TextSegment::Paragraph(Paragraph::new(text)));
            }
            Tag::Anchor => out.push(TextSegment::Link(self.link(id, depth)?)),
            Tag::Image => {
                if let Some(img) = self.image(id) {
                    out.push(TextSegment::InlineImage(img));
                }
            }
            Tag::Table => {
                let content = self.table(id, depth)?;
                out.push(TextSegment::Table { content });
            }
            Tag::UnorderedList => out.push(TextSegment::List(self.list(id, false, depth)?)),
            Tag::OrderedList => out.push(TextSegment::List(self.list(id, true, depth)?)),
            Tag::Code => out.push(TextSegment::Code(self.code(id))),
            Tag::LineBreak => {
                let text = vec![Inline::RichString(RichString::line_break())];
                out.push(TextSegment::Paragraph(Paragraph::new(text)));
            }
            _ => {
                for &child in children {
                    self.walk(child, &[], depth, out)?;
                }
            }
        }
        Ok(())
    }

    /// Filter mode: searches the children of `id` for section headings and
    /// extracts what follows each match. Everything outside a matched
    /// section is dropped.
    fn walk_sections(
        &self,
        id: NodeId,
        sections: &[String],
        depth: usize,
        out: &mut Vec<TextSegment>,
    ) -> Result<(), Error> {
        let children = self.tree.children(id);
        let mut i = 0;
        while i < children.len() {
            let child = children[i];
            match self.section_level(child, sections) {
                Some(level) => {
                    let body = self.section_body(child, level);
                    log::debug!(
                        "Section heading matched, {} sibling nodes captured",
                        body.len()
                    );
                    for &node in body {
                        self.walk(node, &[], depth, out)?;
                    }
                    i += 1 + body.len();
                }
                None => {
                    self.walk(child, sections, depth, out)?;
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Level of `id` when it is a heading whose title is one of `sections`.
    fn section_level(&self, id: NodeId, sections: &[String]) -> Option<u8> {
        let Some(Tag::Heading(level)) = self.tree.tag(id) else {
            return None;
        };
        let title = self.tree.text_content(id);
        let title = title.trim();
        sections.iter().any(|s| s.trim() == title).then_some(level)
    }

    /// Siblings following a section heading, up to the next heading of the
    /// same or a higher level.
    fn section_body(&self, heading: NodeId, level: u8) -> &'a [NodeId] {
        let tree = self.tree;
        let following = tree.following_siblings(heading);
        let end = following
            .iter()
            .position(|&n| matches!(tree.tag(n), Some(Tag::Heading(l)) if l <= level))
            .unwrap_or(following.len());
        &following[..end]
    }

    /// Inline content of `children`, with wrapper formatting applied on the
    /// way back up.
    pub(crate) fn rich_text(&self, children: &[NodeId], depth: usize) -> Result<RichText, Error> {
        let depth = self.descend(depth)?;
        let mut run = RichText::new();
        for &child in children {
            match self.tree.tag(child) {
                Some(Tag::Image) => {
                    if let Some(img) = self.image(child) {
                        run.push(Inline::InlineImage(img));
                    }
                }
                Some(Tag::Anchor) => run.push(Inline::Link(self.link(child, depth)?)),
                Some(Tag::LineBreak) => run.push(Inline::RichString(RichString::line_break())),
                Some(Tag::Code) => run.push(Inline::Code(self.code(child))),
                Some(tag) => {
                    let inner = self.rich_text(self.tree.children(child), depth)?;
                    run.extend(apply_attribute(inner, tag));
                }
                None => {
                    if let Some(text) = self.tree.text(child)
                        && !text.trim().is_empty()
                    {
                        run.push(Inline::RichString(RichString::plain(text)));
                    }
                }
            }
        }
        Ok(run)
    }

    pub(crate) fn link(&self, id: NodeId, depth: usize) -> Result<Link, Error> {
        let target = self.tree.attr(id, "href").unwrap_or_default().to_string();
        let text = self.link_content(self.tree.children(id), depth)?;
        Ok(Link { target, text })
    }

    /// A link around a lone image collapses to that image; anything else
    /// becomes a paragraph.
    fn link_content(&self, children: &[NodeId], depth: usize) -> Result<LinkContent, Error> {
        let mut significant = children.iter().copied().filter(|&c| {
            self.tree.text(c).is_none_or(|text| !text.trim().is_empty())
        });
        if let (Some(only), None) = (significant.next(), significant.next())
            && self.tree.tag(only) == Some(Tag::Image)
            && let Some(img) = self.image(only)
        {
            return Ok(LinkContent::InlineImage(img));
        }
        Ok(LinkContent::Paragraph(Paragraph::new(self.rich_text(children, depth)?)))
    }

    pub(crate) fn image(&self, id: NodeId) -> Option<InlineImage> {
        let Some(src) = self.tree.attr(id, "src") else {
            log::debug!("Skipping image without a source");
            return None;
        };
        let img = self.images.collect(src).unwrap_or_else(|| src.to_string());
        Some(InlineImage {
            img,
            title: self.tree.attr(id, "alt").map(str::to_string),
        })
    }

    pub(crate) fn code(&self, id: NodeId) -> Code {
        Code {
            content: self.tree.text_content(id),
            language: self.tree.attr(id, "data-lang").map(str::to_string),
        }
    }
}

/// Sets the formatting flag that `tag` stands for on every styled string of
/// `run`. Tags without a formatting meaning leave the run unchanged.
pub fn apply_attribute(run: RichText, tag: Tag) -> RichText {
    let set: fn(&mut TextAttributes) = match tag {
        Tag::Strong => |a: &mut TextAttributes| a.strong = true,
        Tag::Emphasis => |a: &mut TextAttributes| a.cursive = true,
        Tag::Underline => |a: &mut TextAttributes| a.underline = true,
        Tag::Subscript => |a: &mut TextAttributes| a.script = Script::Sub,
        Tag::Superscript => |a: &mut TextAttributes| a.script = Script::Super,
        _ => return run,
    };
    run.into_iter()
        .map(|inline| match inline {
            Inline::RichString(mut s) => {
                set(&mut s.attrs);
                Inline::RichString(s)
            }
            other => other,
        })
        .collect()
}
