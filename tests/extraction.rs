use std::cell::RefCell;

use wikiscribe::images::{ImageCollector, NoImages};
use wikiscribe::model::*;
use wikiscribe::tree::{Tag, Tree};
use wikiscribe::{Error, Extractor, apply_attribute, extract_transcript};

fn extract(html: &str) -> Vec<TextSegment> {
    let tree = Tree::parse_html(html);
    extract_transcript(&tree, &[], &NoImages)
        .expect("extraction failed")
        .segments
}

fn plain(text: &str) -> Inline {
    Inline::RichString(RichString::plain(text))
}

fn styled(text: &str, attrs: TextAttributes) -> Inline {
    Inline::RichString(RichString {
        text: text.to_string(),
        attrs,
    })
}

fn bold() -> TextAttributes {
    TextAttributes {
        strong: true,
        ..Default::default()
    }
}

fn italic() -> TextAttributes {
    TextAttributes {
        cursive: true,
        ..Default::default()
    }
}

fn script(script: Script) -> TextAttributes {
    TextAttributes {
        script,
        ..Default::default()
    }
}

fn paragraph(text: RichText) -> TextSegment {
    TextSegment::Paragraph(Paragraph::new(text))
}

#[derive(Default)]
struct Recorder {
    seen: RefCell<Vec<String>>,
}

impl ImageCollector for Recorder {
    fn collect(&self, src: &str) -> Option<String> {
        self.seen.borrow_mut().push(src.to_string());
        None
    }
}

#[test]
fn heading_and_formatted_paragraph() {
    let segments = extract("<h2>Title</h2><p>Hello <strong>world</strong></p>");
    assert_eq!(
        segments,
        vec![
            TextSegment::TextElement(TextElement {
                element: HeadingLevel::H1,
                text: vec![plain("Title")],
            }),
            paragraph(vec![plain("Hello "), styled("world", bold())]),
        ]
    );
}

#[test]
fn headings_are_demoted_one_level() {
    let segments = extract("<h1>a</h1><h2>b</h2><h3>c</h3><h4>d</h4><h5>e</h5><h6>f</h6>");
    let levels: Vec<HeadingLevel> = segments
        .iter()
        .map(|s| match s {
            TextSegment::TextElement(el) => el.element,
            other => panic!("unexpected segment {other:?}"),
        })
        .collect();
    assert_eq!(
        levels,
        vec![
            HeadingLevel::Title,
            HeadingLevel::H1,
            HeadingLevel::H2,
            HeadingLevel::H3,
            HeadingLevel::H4,
        ]
    );
}

#[test]
fn heading_links_are_not_emitted_twice() {
    let segments = extract(r#"<h3><a href="https://example.com">Anchor</a></h3>"#);
    assert_eq!(segments.len(), 1);
    assert!(
        matches!(&segments[0], TextSegment::TextElement(el) if el.element == HeadingLevel::H2)
    );
}

#[test]
fn nested_wrappers_compose_attributes() {
    let both = TextAttributes {
        strong: true,
        cursive: true,
        ..Default::default()
    };
    for html in [
        "<p><strong><em>x</em></strong></p>",
        "<p><em><strong>x</strong></em></p>",
    ] {
        assert_eq!(extract(html), vec![paragraph(vec![styled("x", both)])], "{html}");
    }
}

#[test]
fn outermost_script_wins() {
    let segments = extract("<p><sup><sub>x</sub></sup> and <sub>y</sub></p>");
    assert_eq!(
        segments,
        vec![paragraph(vec![
            styled("x", script(Script::Super)),
            plain(" and "),
            styled("y", script(Script::Sub)),
        ])]
    );
}

#[test]
fn underline_span_and_unknown_wrappers() {
    let segments =
        extract(r#"<p><span class="underline">u</span><span class="other">s</span><u>v</u></p>"#);
    let under = TextAttributes {
        underline: true,
        ..Default::default()
    };
    assert_eq!(
        segments,
        vec![paragraph(vec![
            styled("u", under),
            plain("s"),
            styled("v", under),
        ])]
    );
}

#[test]
fn b_and_i_are_strong_and_cursive() {
    let segments = extract("<p><b>x</b><i>y</i></p>");
    assert_eq!(
        segments,
        vec![paragraph(vec![styled("x", bold()), styled("y", italic())])]
    );
}

#[test]
fn whitespace_only_text_is_dropped() {
    let segments = extract("<p>  <em> </em>\n<strong>kept</strong> </p>");
    assert_eq!(segments, vec![paragraph(vec![styled("kept", bold())])]);
}

#[test]
fn inline_breaks_code_and_links() {
    let segments = extract(
        r#"<p>one<br>two <code data-lang="rust">let x = 1;</code> <a href="/docs">the <em>docs</em></a></p>"#,
    );
    let docs = Paragraph::new(vec![plain("the "), styled("docs", italic())]);
    assert_eq!(
        segments,
        vec![paragraph(vec![
            plain("one"),
            plain("\n"),
            plain("two "),
            Inline::Code(Code {
                content: "let x = 1;".into(),
                language: Some("rust".into()),
            }),
            Inline::Link(Link {
                target: "/docs".into(),
                text: LinkContent::Paragraph(docs),
            }),
        ])]
    );
}

#[test]
fn formatting_skips_links_and_images() {
    let run = vec![
        plain("a"),
        Inline::InlineImage(InlineImage {
            img: "x.png".into(),
            title: None,
        }),
    ];
    let out = apply_attribute(run.clone(), Tag::Strong);
    assert!(out[0].as_rich_string().is_some_and(|s| s.attrs.strong));
    assert_eq!(out[1], run[1]);
    assert_eq!(apply_attribute(run.clone(), Tag::Span), run);
}

#[test]
fn link_around_lone_image_collapses() {
    let segments = extract(r#"<a href="big.png"> <img src="small.png" alt="Preview"> </a>"#);
    assert_eq!(
        segments,
        vec![TextSegment::Link(Link {
            target: "big.png".into(),
            text: LinkContent::InlineImage(InlineImage {
                img: "small.png".into(),
                title: Some("Preview".into()),
            }),
        })]
    );
}

#[test]
fn link_with_image_and_text_stays_a_paragraph() {
    let segments = extract(r#"<a href="u"><img src="i.png">caption</a>"#);
    let TextSegment::Link(link) = &segments[0] else {
        panic!("expected a link, got {segments:?}");
    };
    let LinkContent::Paragraph(p) = &link.text else {
        panic!("expected a paragraph body");
    };
    assert_eq!(p.text.len(), 2);
}

#[test]
fn top_level_breaks_images_code_and_content_divs() {
    let segments = extract(
        r#"<br><img src="a.png"><img alt="no source"><code data-lang="sh">ls</code><div class="content">boxed</div>"#,
    );
    assert_eq!(
        segments,
        vec![
            paragraph(vec![plain("\n")]),
            TextSegment::InlineImage(InlineImage {
                img: "a.png".into(),
                title: None,
            }),
            TextSegment::Code(Code {
                content: "ls".into(),
                language: Some("sh".into()),
            }),
            paragraph(vec![plain("boxed")]),
        ]
    );
}

#[test]
fn structural_wrappers_are_transparent() {
    let segments =
        extract(r#"<section><article><div class="x"><p>deep</p></div></article></section>"#);
    assert_eq!(segments, vec![paragraph(vec![plain("deep")])]);
}

#[test]
fn images_are_reported_to_the_collector_in_order() {
    let tree = Tree::parse_html(
        r##"<img src="one.png"><p><a href="#"><img src="two.png"></a></p><table><tr><td><img src="three.png"></td></tr></table>"##,
    );
    let recorder = Recorder::default();
    extract_transcript(&tree, &[], &recorder).unwrap();
    assert_eq!(*recorder.seen.borrow(), vec!["one.png", "two.png", "three.png"]);
}

#[test]
fn extraction_is_repeatable() {
    let tree = Tree::parse_html(
        "<h1>T</h1><p>a <b>b</b></p><ul><li>x</li></ul><table><tr><td>c</td></tr></table>",
    );
    let first = extract_transcript(&tree, &[], &NoImages).unwrap();
    let second = extract_transcript(&tree, &[], &NoImages).unwrap();
    assert_eq!(first, second);
}

#[test]
fn deep_nesting_fails_cleanly() {
    let html = format!("{}<p>x</p>{}", "<div>".repeat(300), "</div>".repeat(300));
    let tree = Tree::parse_html(&html);
    match extract_transcript(&tree, &[], &NoImages) {
        Err(Error::TooDeep { limit }) => assert_eq!(limit, wikiscribe::DEFAULT_MAX_DEPTH),
        other => panic!("expected TooDeep, got {other:?}"),
    }
}

#[test]
fn depth_limit_is_configurable() {
    let tree = Tree::parse_html("<div><div><p>x</p></div></div>");
    let shallow = Extractor::new(&tree, &NoImages).with_max_depth(3);
    assert!(matches!(
        shallow.extract(tree.root(), &[]),
        Err(Error::TooDeep { limit: 3 })
    ));
    let roomy = Extractor::new(&tree, &NoImages).with_max_depth(64);
    assert_eq!(roomy.extract(tree.root(), &[]).unwrap().len(), 1);
}

#[test]
fn xhtml_input_is_parsed_strictly() {
    let xhtml = r#"<?xml version="1.0"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml"><body><h2>Intro</h2><p>Text <em>here</em></p></body></html>"#;
    let tree = Tree::parse_xhtml(xhtml).expect("valid xhtml");
    let segments = extract_transcript(&tree, &[], &NoImages).unwrap().segments;
    assert_eq!(segments.len(), 2);

    assert!(matches!(Tree::parse_xhtml("<p>unclosed"), Err(Error::Xml(_))));
}

#[test]
fn serialized_shape_uses_kind_tags() {
    let segments = extract(
        r#"<h1>T</h1><p><a href="u">l</a></p><table><tr><th>h</th></tr></table><ul><li>i</li></ul>"#,
    );
    let json = serde_json::to_value(Transcript { segments }).unwrap();
    let segs = &json["segments"];
    assert_eq!(segs[0]["kind"], "textelement");
    assert_eq!(segs[0]["element"], "title");
    assert_eq!(segs[0]["text"][0]["kind"], "richstring");
    assert_eq!(segs[1]["text"][0]["kind"], "link");
    assert_eq!(segs[1]["text"][0]["ref"], "u");
    assert_eq!(segs[2]["kind"], "table");
    assert_eq!(segs[2]["content"]["body"][0][0]["type"], "th");
    assert_eq!(segs[3]["elements"][0]["kind"], "richtext");
    assert_eq!(segs[3]["elements"][0]["text"][0]["text"], "i");
    assert_eq!(segs[0]["text"][0]["attrs"]["script"], "normal");

    let back: Transcript = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(serde_json::to_value(back).unwrap(), json);
}
