use wikiscribe::extract_transcript;
use wikiscribe::images::NoImages;
use wikiscribe::model::*;
use wikiscribe::tree::Tree;

fn list(html: &str) -> List {
    let tree = Tree::parse_html(html);
    let segments = extract_transcript(&tree, &[], &NoImages).unwrap().segments;
    match segments.as_slice() {
        [TextSegment::List(list)] => list.clone(),
        other => panic!("expected a single list, got {other:?}"),
    }
}

fn run(text: &str) -> ListItem {
    ListItem::Run {
        text: vec![Inline::RichString(RichString::plain(text))],
    }
}

#[test]
fn ordered_list_nested_in_unordered() {
    let outer = list("<ul><li><ol><li>first</li><li>second</li></ol></li></ul>");
    assert!(!outer.ordered);
    assert_eq!(
        outer.elements,
        vec![ListItem::List(List {
            ordered: true,
            elements: vec![run("first"), run("second")],
        })]
    );
}

#[test]
fn top_level_ordered_list() {
    let ol = list("<ol><li>a</li><li>b</li></ol>");
    assert!(ol.ordered);
    assert_eq!(ol.elements, vec![run("a"), run("b")]);
}

#[test]
fn item_children_each_become_an_element() {
    let items = list(
        r#"<ul><li>text <strong>bold</strong><p>para</p><a href="/x">link</a><code>c()</code></li></ul>"#,
    )
    .elements;
    let bold = RichString {
        text: "bold".into(),
        attrs: TextAttributes {
            strong: true,
            ..Default::default()
        },
    };
    assert_eq!(items.len(), 5);
    assert_eq!(items[0], run("text "));
    assert_eq!(
        items[1],
        ListItem::Run {
            text: vec![Inline::RichString(bold)],
        }
    );
    assert!(matches!(&items[2], ListItem::Paragraph(p) if p.text.len() == 1));
    assert!(matches!(&items[3], ListItem::Link(l) if l.target == "/x"));
    assert_eq!(
        items[4],
        ListItem::Code(Code {
            content: "c()".into(),
            language: None,
        })
    );
}

#[test]
fn div_wrapper_promotes_only_nested_lists() {
    let items = list(
        "<ul><li><div><p>dropped</p><ol><li>kept</li></ol><ul><li>too</li></ul></div></li></ul>",
    )
    .elements;
    assert_eq!(
        items,
        vec![
            ListItem::List(List {
                ordered: true,
                elements: vec![run("kept")],
            }),
            ListItem::List(List {
                ordered: false,
                elements: vec![run("too")],
            }),
        ]
    );
}

#[test]
fn non_item_children_and_blank_text_are_ignored() {
    let xhtml = "<ul>\n<li>\n</li>\n<span>stray</span><li>real</li></ul>";
    let tree = Tree::parse_xhtml(xhtml).unwrap();
    let segments = extract_transcript(&tree, &[], &NoImages).unwrap().segments;
    let [TextSegment::List(list)] = segments.as_slice() else {
        panic!("expected a list, got {segments:?}");
    };
    assert_eq!(list.elements, vec![run("real")]);
}

#[test]
fn deeply_nested_lists_keep_order() {
    let outer = list("<ul><li>a<ul><li>b<ol><li>c</li></ol></li></ul></li><li>d</li></ul>");
    assert_eq!(
        outer.elements,
        vec![
            run("a"),
            ListItem::List(List {
                ordered: false,
                elements: vec![
                    run("b"),
                    ListItem::List(List {
                        ordered: true,
                        elements: vec![run("c")],
                    }),
                ],
            }),
            run("d"),
        ]
    );
}
