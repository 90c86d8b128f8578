use crate::error::Error;
use crate::extract::Extractor;
use crate::model::{Cell, CellKind, Col, Paragraph, Row, TableBody, TableSegment};
use crate::tree::{NodeId, Tag};

const DEFAULT_COLSPAN: &str = "1";
/// Written verbatim when a `col` has no `span`. Renderers rely on telling it
/// apart from the cell default.
const DEFAULT_COL_SPAN: &str = r#"\"1\""#;

impl Extractor<'_> {
    /// Rebuilds a `table` element into its column groups and rows.
    pub(crate) fn table(&self, id: NodeId, depth: usize) -> Result<TableBody, Error> {
        let depth = self.descend(depth)?;
        let tree = self.tree;
        let mut body = Vec::new();
        let mut colgroup = Vec::new();

        for &child in tree.children(id) {
            match tree.tag(child) {
                Some(Tag::TableSection) => {
                    for &row in tree.children(child) {
                        if tree.tag(row) == Some(Tag::Row) {
                            body.push(self.row(row, depth)?);
                        }
                    }
                }
                Some(Tag::Row) => body.push(self.row(child, depth)?),
                Some(Tag::ColGroup) => {
                    let cols = tree
                        .children(child)
                        .iter()
                        .filter(|&&c| tree.tag(c) == Some(Tag::Col));
                    for &col in cols {
                        colgroup.push(Col {
                            span: self.non_empty_attr(col, "span", DEFAULT_COL_SPAN),
                            style: tree.attr(col, "style").map(str::to_string),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(TableBody { colgroup, body })
    }

    fn row(&self, id: NodeId, depth: usize) -> Result<Row, Error> {
        let tree = self.tree;
        let mut row = Row::new();
        for &cell in tree.children(id) {
            let kind = match tree.tag(cell) {
                Some(Tag::HeaderCell) => CellKind::Header,
                Some(Tag::DataCell) => CellKind::Data,
                _ => continue,
            };
            let colspan = self.non_empty_attr(cell, "colspan", DEFAULT_COLSPAN);
            let children = tree.children(cell);
            let mut content = match children.first() {
                Some(&first) if tree.tag(first) != Some(Tag::LineBreak) => {
                    self.cell_content(children, depth)?
                }
                _ => Vec::new(),
            };
            if content.is_empty() {
                content.push(TableSegment::Paragraph(Paragraph::placeholder()));
            }
            row.push(Cell {
                kind,
                colspan,
                content,
            });
        }
        Ok(row)
    }

    /// Attribute value as written, or `default` when it is missing or empty.
    fn non_empty_attr(&self, id: NodeId, name: &str, default: &str) -> String {
        self.tree
            .attr(id, name)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Segments inside one cell. Wrapping `div`s are unwrapped.
    pub(crate) fn cell_content(
        &self,
        children: &[NodeId],
        depth: usize,
    ) -> Result<Vec<TableSegment>, Error> {
        let depth = self.descend(depth)?;
        let tree = self.tree;
        let mut out = Vec::new();

        for &child in children {
            match tree.tag(child) {
                Some(Tag::Paragraph | Tag::Span) => {
                    let text = self.rich_text(tree.children(child), depth)?;
                    out.push(TableSegment::Paragraph(Paragraph::new(text)));
                }
                Some(Tag::Image) => {
                    if let Some(img) = self.image(child) {
                        out.push(TableSegment::InlineImage(img));
                    }
                }
                Some(Tag::Table) => {
                    let content = self.table(child, depth)?;
                    out.push(TableSegment::Table { content });
                }
                Some(Tag::UnorderedList) => {
                    out.push(TableSegment::List(self.list(child, false, depth)?));
                }
                Some(Tag::OrderedList) => {
                    out.push(TableSegment::List(self.list(child, true, depth)?));
                }
                Some(Tag::Anchor) => out.push(TableSegment::Link(self.link(child, depth)?)),
                Some(Tag::Code) => out.push(TableSegment::Code(self.code(child))),
                // Wrappers nest freely; each level is unwrapped in turn.
                Some(Tag::Div { .. }) => {
                    out.extend(self.cell_content(tree.children(child), depth)?);
                }
                Some(_) => self.push_loose(child, depth, &mut out)?,
                None => {
                    if tree.text(child) != Some("\n") {
                        self.push_loose(child, depth, &mut out)?;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Wraps stray text or inline markup in a paragraph of its own.
    fn push_loose(
        &self,
        node: NodeId,
        depth: usize,
        out: &mut Vec<TableSegment>,
    ) -> Result<(), Error> {
        let text = self.rich_text(std::slice::from_ref(&node), depth)?;
        if !text.is_empty() {
            out.push(TableSegment::Paragraph(Paragraph::new(text)));
        }
        Ok(())
    }
}
