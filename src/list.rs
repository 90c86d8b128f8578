use crate::error::Error;
use crate::extract::Extractor;
use crate::model::{List, ListItem, Paragraph};
use crate::tree::{NodeId, Tag};

impl Extractor<'_> {
    /// Rebuilds a `ul`/`ol` element. Only `li` children are looked at.
    pub(crate) fn list(&self, id: NodeId, ordered: bool, depth: usize) -> Result<List, Error> {
        let depth = self.descend(depth)?;
        let tree = self.tree;
        let mut elements = Vec::new();

        let items = tree
            .children(id)
            .iter()
            .filter(|&&c| tree.tag(c) == Some(Tag::ListItem));
        for &item in items {
            for &child in tree.children(item) {
                match tree.tag(child) {
                    Some(Tag::UnorderedList) => {
                        elements.push(ListItem::List(self.list(child, false, depth)?));
                    }
                    Some(Tag::OrderedList) => {
                        elements.push(ListItem::List(self.list(child, true, depth)?));
                    }
                    Some(Tag::Paragraph) => {
                        let text = self.rich_text(tree.children(child), depth)?;
                        elements.push(ListItem::Paragraph(Paragraph::new(text)));
                    }
                    // One wrapper level is unwrapped; only nested lists survive it.
                    Some(Tag::Div { .. }) => {
                        for &inner in tree.children(child) {
                            match tree.tag(inner) {
                                Some(Tag::UnorderedList) => {
                                    elements.push(ListItem::List(self.list(inner, false, depth)?));
                                }
                                Some(Tag::OrderedList) => {
                                    elements.push(ListItem::List(self.list(inner, true, depth)?));
                                }
                                _ => {}
                            }
                        }
                    }
                    Some(Tag::Anchor) => elements.push(ListItem::Link(self.link(child, depth)?)),
                    Some(Tag::Code) => elements.push(ListItem::Code(self.code(child))),
                    Some(_) => self.push_run(child, depth, &mut elements)?,
                    None => {
                        if tree.text(child) != Some("\n") {
                            self.push_run(child, depth, &mut elements)?;
                        }
                    }
                }
            }
        }
        Ok(List { ordered, elements })
    }

    fn push_run(
        &self,
        node: NodeId,
        depth: usize,
        elements: &mut Vec<ListItem>,
    ) -> Result<(), Error> {
        let text = self.rich_text(std::slice::from_ref(&node), depth)?;
        if !text.is_empty() {
            elements.push(ListItem::Run { text });
        }
        Ok(())
    }
}
