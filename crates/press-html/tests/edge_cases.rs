//! Edge case tests for press-html
//!
//! Malformed markup must be repaired, never rejected.

use press_dom::{ElementKind, NodeId};
use press_html::{HtmlError, HtmlParser};

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_empty_string() {
    assert!(matches!(HtmlParser::new().parse(""), Err(HtmlError::EmptyDocument)));
}

#[test]
fn test_parse_only_whitespace() {
    let result = HtmlParser::new().parse("   \t\n\r\n   ");
    assert!(matches!(result, Err(HtmlError::EmptyDocument)));
}

#[test]
fn test_parse_only_doctype() {
    // Not empty: the tree builder still synthesizes html/head/body
    let doc = HtmlParser::new().parse("<!DOCTYPE html>").unwrap();
    assert!(doc.body().is_valid());
}

#[test]
fn test_plain_text_document() {
    let doc = HtmlParser::new().parse("just words").unwrap();
    assert_eq!(doc.tree().text_content(doc.body()), "just words");
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_unclosed_tags_are_closed() {
    let doc = HtmlParser::new().parse("<div><p><span>text").unwrap();
    let tree = doc.tree();
    let span = tree
        .descendants(NodeId::ROOT)
        .into_iter()
        .find(|&n| tree.element(n).is_some_and(|e| e.kind == ElementKind::Span))
        .unwrap();
    assert_eq!(tree.text_content(span), "text");
}

#[test]
fn test_mismatched_tags() {
    let doc = HtmlParser::new().parse("<div><p></div></p>").unwrap();
    assert!(doc.tree().len() > 4);
}

#[test]
fn test_extra_closing_tags() {
    let doc = HtmlParser::new().parse("<div></div></div></div></div>").unwrap();
    let divs = doc
        .tree()
        .descendants(NodeId::ROOT)
        .into_iter()
        .filter(|&n| doc.tree().element(n).is_some_and(|e| e.kind == ElementKind::Div))
        .count();
    assert_eq!(divs, 1);
}

#[test]
fn test_comments_are_dropped() {
    let doc = HtmlParser::new().parse("<p><!-- hidden -->shown</p>").unwrap();
    assert_eq!(doc.tree().text_content(doc.body()), "shown");
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_deep_nesting() {
    let depth = 1_000;
    let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let doc = HtmlParser::new().parse(&html).unwrap();
    assert!(doc.tree().text_content(doc.body()).contains("deep"));
}

#[test]
fn test_style_elements_are_collected() {
    let html = "<style>p{color:red}</style><style media=screen>p{color:blue}</style><p>x</p>";
    let doc = HtmlParser::new().parse(html).unwrap();
    assert_eq!(doc.style_sheets(), vec!["p{color:red}".to_string()]);
}
