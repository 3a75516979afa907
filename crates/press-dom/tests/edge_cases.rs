//! Edge case tests for press-dom

use press_dom::{Document, DomError, DomTree, ElementKind, NodeId};

// ============================================================================
// Tree shape
// ============================================================================

#[test]
fn test_every_node_has_one_parent() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let mut parent = root;
    for _ in 0..50 {
        let div = tree.create_element(ElementKind::Div);
        tree.append_child(parent, div).unwrap();
        parent = div;
    }

    for id in tree.descendants(root).into_iter().skip(1) {
        let parent = tree.parent(id).expect("attached node has a parent");
        assert!(parent.index() < id.index());
    }
}

#[test]
fn test_ancestor_cannot_become_child() {
    let mut tree = DomTree::new();
    let outer = tree.create_element(ElementKind::Div);
    let inner = tree.create_element(ElementKind::Div);
    tree.append_child(tree.root(), outer).unwrap();
    tree.append_child(outer, inner).unwrap();

    // `outer` is attached, so this is refused before any cycle could form
    assert!(tree.append_child(inner, outer).is_err());
}

#[test]
fn test_detached_cycle_is_detected() {
    let mut tree = DomTree::new();
    let a = tree.create_element(ElementKind::Div);
    let b = tree.create_element(ElementKind::Div);
    tree.append_child(a, b).unwrap();

    assert!(matches!(tree.append_child(b, a), Err(DomError::Cycle { .. })));
}

#[test]
fn test_unknown_node() {
    let mut tree = DomTree::new();
    let bogus = NodeId::NONE;
    assert!(matches!(
        tree.append_child(tree.root(), bogus),
        Err(DomError::UnknownNode(_))
    ));
}

// ============================================================================
// Document helpers
// ============================================================================

#[test]
fn test_document_without_html_element() {
    let doc = Document::from_tree(DomTree::new());
    assert!(!doc.body().is_valid());
    assert_eq!(doc.title(), None);
    assert!(doc.style_sheets().is_empty());
}

#[test]
fn test_get_element_by_id() {
    let mut tree = DomTree::new();
    let html = tree.create_element(ElementKind::Html);
    let p = tree.create_element(ElementKind::P);
    tree.get_mut(p)
        .and_then(|n| n.as_element_mut())
        .unwrap()
        .set_attr("id", "intro");
    tree.append_child(tree.root(), html).unwrap();
    tree.append_child(html, p).unwrap();

    let doc = Document::from_tree(tree);
    assert_eq!(doc.get_element_by_id("intro"), Some(p));
    assert_eq!(doc.get_element_by_id("missing"), None);
}
