//! CSS Selectors
//!
//! Selectors are parsed from their serialized text into compound parts
//! joined by combinators, then matched right-to-left against the tree.

use press_dom::{DomTree, ElementData, NodeId};

/// Selector specificity (ids, classes/attributes/pseudo-classes, types)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// A single complex selector
#[derive(Debug, Clone)]
pub struct Selector {
    pub text: String,
    pub specificity: Specificity,
    /// Compounds from left to right; `combinators[i]` joins `compounds[i]`
    /// and `compounds[i + 1]`
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudos: Vec<PseudoClass>,
    /// Contains something we cannot evaluate; never matches
    unsupported: bool,
}

#[derive(Debug, Clone)]
struct AttrSelector {
    name: String,
    op: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Root,
    Empty,
    Link,
}

impl Selector {
    /// Parse a selector list (`h1, .title > span`) into its selectors
    pub fn parse_list(text: &str) -> Vec<Selector> {
        crate::values::split_commas(text)
            .iter()
            .filter_map(|s| Self::parse(s))
            .collect()
    }

    /// Parse one complex selector; `None` when it is syntactically empty
    pub fn parse(text: &str) -> Option<Selector> {
        let mut parser = SelectorParser {
            chars: text.trim().chars().collect(),
            pos: 0,
        };
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();

        loop {
            let compound = parser.compound();
            compounds.push(compound);
            match parser.combinator() {
                Some(c) => combinators.push(c),
                None => break,
            }
        }

        if compounds.iter().all(Compound::is_empty) {
            return None;
        }
        // Dangling combinator (`div >`): the trailing compound is empty
        if compounds.iter().any(Compound::is_empty) {
            if let Some(last) = compounds.last_mut() {
                last.unsupported = true;
            }
        }

        let specificity = compounds.iter().fold(Specificity::default(), |acc, c| {
            let s = c.specificity();
            Specificity(acc.0 + s.0, acc.1 + s.1, acc.2 + s.2)
        });

        Some(Selector {
            text: text.trim().to_string(),
            specificity,
            compounds,
            combinators,
        })
    }

    /// Check if the selector matches the element `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_from(tree, node, n - 1),
        }
    }

    fn matches_from(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|p| self.matches_from(tree, p, index - 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .any(|a| self.matches_from(tree, a, index - 1)),
            Combinator::NextSibling => tree
                .prev_element_sibling(node)
                .is_some_and(|s| self.matches_from(tree, s, index - 1)),
            Combinator::SubsequentSibling => {
                let mut cur = tree.prev_element_sibling(node);
                while let Some(s) = cur {
                    if self.matches_from(tree, s, index - 1) {
                        return true;
                    }
                    cur = tree.prev_element_sibling(s);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudos.is_empty()
            && !self.unsupported
    }

    fn specificity(&self) -> Specificity {
        let ids = self.id.is_some() as u32;
        let classes = (self.classes.len() + self.attrs.len() + self.pseudos.len()) as u32;
        let types = self.tag.as_deref().is_some_and(|t| t != "*") as u32;
        Specificity(ids, classes, types)
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        if self.unsupported {
            return false;
        }
        let Some(elem) = tree.element(node) else {
            return false;
        };

        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(elem.tag_name()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if elem.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| elem.has_class(c)) {
            return false;
        }
        if !self.attrs.iter().all(|a| a.matches(elem)) {
            return false;
        }
        self.pseudos.iter().all(|p| p.matches(tree, node, elem))
    }
}

impl AttrSelector {
    fn matches(&self, elem: &ElementData) -> bool {
        let Some(actual) = elem.get_attr(&self.name) else {
            return false;
        };
        let Some((op, expected)) = &self.op else {
            return true;
        };
        let expected = expected.as_str();
        match op {
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => actual.split_whitespace().any(|w| w == expected),
            AttrOp::DashMatch => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

impl PseudoClass {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "only-child" => Self::OnlyChild,
            "root" => Self::Root,
            "empty" => Self::Empty,
            "link" | "any-link" => Self::Link,
            _ => return None,
        })
    }

    fn matches(self, tree: &DomTree, node: NodeId, elem: &ElementData) -> bool {
        match self {
            Self::FirstChild => tree.prev_element_sibling(node).is_none(),
            Self::LastChild => tree.next_element_sibling(node).is_none(),
            Self::OnlyChild => {
                tree.prev_element_sibling(node).is_none() && tree.next_element_sibling(node).is_none()
            }
            Self::Root => tree.parent(node) == Some(NodeId::ROOT),
            Self::Empty => tree.children(node).next().is_none(),
            Self::Link => elem.tag_name() == "a" && elem.get_attr("href").is_some(),
        }
    }
}

struct SelectorParser {
    chars: Vec<char>,
    pos: usize,
}

impl SelectorParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                out.push(c);
                self.pos += 1;
            } else if c == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.bump() {
                    out.push(escaped);
                }
            } else {
                break;
            }
        }
        out
    }

    fn combinator(&mut self) -> Option<Combinator> {
        let had_space = self.skip_whitespace();
        let combinator = match self.peek()? {
            '>' => Combinator::Child,
            '+' => Combinator::NextSibling,
            '~' => Combinator::SubsequentSibling,
            _ if had_space => return Some(Combinator::Descendant),
            _ => return None,
        };
        self.pos += 1;
        self.skip_whitespace();
        Some(combinator)
    }

    fn compound(&mut self) -> Compound {
        let mut compound = Compound::default();

        if self.peek() == Some('*') {
            self.pos += 1;
            compound.tag = Some("*".into());
        } else if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            compound.tag = Some(self.ident().to_ascii_lowercase());
        }

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.pos += 1;
                    compound.id = Some(self.ident());
                }
                '.' => {
                    self.pos += 1;
                    compound.classes.push(self.ident());
                }
                '[' => {
                    self.pos += 1;
                    match self.attribute() {
                        Some(attr) => compound.attrs.push(attr),
                        None => compound.unsupported = true,
                    }
                }
                ':' => {
                    self.pos += 1;
                    if self.peek() == Some(':') {
                        // Pseudo-elements generate no boxes here
                        self.pos += 1;
                        self.ident();
                        compound.unsupported = true;
                    } else {
                        let name = self.ident();
                        if self.peek() == Some('(') {
                            self.skip_parens();
                            compound.unsupported = true;
                        } else {
                            match PseudoClass::from_name(&name) {
                                Some(p) => compound.pseudos.push(p),
                                None => compound.unsupported = true,
                            }
                        }
                    }
                }
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => break,
                _ => {
                    self.pos += 1;
                    compound.unsupported = true;
                }
            }
        }
        compound
    }

    fn attribute(&mut self) -> Option<AttrSelector> {
        self.skip_whitespace();
        let name = self.ident().to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.bump()? {
            ']' => return (!name.is_empty()).then_some(AttrSelector { name, op: None }),
            '=' => AttrOp::Equals,
            c @ ('~' | '|' | '^' | '$' | '*') => {
                if self.bump()? != '=' {
                    return None;
                }
                match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return None,
        };

        self.skip_whitespace();
        let value = match self.peek()? {
            q @ ('"' | '\'') => {
                self.pos += 1;
                let mut v = String::new();
                loop {
                    match self.bump()? {
                        c if c == q => break,
                        c => v.push(c),
                    }
                }
                v
            }
            _ => self.ident(),
        };
        self.skip_whitespace();
        // Case-sensitivity flags are accepted and ignored
        if self.peek().is_some_and(|c| c == 'i' || c == 's') {
            self.pos += 1;
            self.skip_whitespace();
        }
        if self.bump()? != ']' {
            return None;
        }
        Some(AttrSelector {
            name,
            op: Some((op, value)),
        })
    }

    fn skip_parens(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_dom::ElementKind;

    /// <div id=main class=box><p class="lead x">..</p><p>..</p><a href=#>..</a></div>
    fn tree() -> (DomTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element(ElementKind::Div);
        let p1 = tree.create_element(ElementKind::P);
        let p2 = tree.create_element(ElementKind::P);
        let a = tree.create_element(ElementKind::A);
        {
            let e = tree.get_mut(div).unwrap().as_element_mut().unwrap();
            e.set_attr("id", "main");
            e.set_attr("class", "box");
        }
        tree.get_mut(p1)
            .unwrap()
            .as_element_mut()
            .unwrap()
            .set_attr("class", "lead x");
        tree.get_mut(a)
            .unwrap()
            .as_element_mut()
            .unwrap()
            .set_attr("href", "https://example.com/docs");
        let root = tree.root();
        tree.append_child(root, div).unwrap();
        tree.append_child(div, p1).unwrap();
        tree.append_child(div, p2).unwrap();
        tree.append_child(div, a).unwrap();
        (tree, div, p1, p2, a)
    }

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_specificity() {
        assert_eq!(sel("p").specificity, Specificity(0, 0, 1));
        assert_eq!(sel("#main").specificity, Specificity(1, 0, 0));
        assert_eq!(sel("div.box > p:first-child").specificity, Specificity(0, 2, 2));
        assert_eq!(sel("*").specificity, Specificity(0, 0, 0));
        assert!(sel("#main").specificity > sel("div p.lead").specificity);
    }

    #[test]
    fn test_simple_matching() {
        let (tree, div, p1, p2, _) = tree();
        assert!(sel("p").matches(&tree, p1));
        assert!(sel(".lead").matches(&tree, p1));
        assert!(!sel(".lead").matches(&tree, p2));
        assert!(sel("#main").matches(&tree, div));
        assert!(sel("p.lead.x").matches(&tree, p1));
        assert!(sel("*").matches(&tree, p2));
    }

    #[test]
    fn test_combinators() {
        let (tree, _, p1, p2, a) = tree();
        assert!(sel("#main p").matches(&tree, p2));
        assert!(sel("div > p").matches(&tree, p1));
        assert!(!sel("body > p").matches(&tree, p1));
        assert!(sel("p + p").matches(&tree, p2));
        assert!(!sel("p + p").matches(&tree, p1));
        assert!(sel(".lead ~ a").matches(&tree, a));
    }

    #[test]
    fn test_pseudo_classes() {
        let (tree, div, p1, p2, a) = tree();
        assert!(sel("p:first-child").matches(&tree, p1));
        assert!(!sel("p:first-child").matches(&tree, p2));
        assert!(sel("a:last-child").matches(&tree, a));
        assert!(sel(":root").matches(&tree, div));
        assert!(sel("p:empty").matches(&tree, p2));
        assert!(sel("a:link").matches(&tree, a));
    }

    #[test]
    fn test_attribute_selectors() {
        let (tree, _, p1, _, a) = tree();
        assert!(sel("[href]").matches(&tree, a));
        assert!(sel("a[href^=\"https\"]").matches(&tree, a));
        assert!(sel("a[href$='docs']").matches(&tree, a));
        assert!(sel("a[href*=example]").matches(&tree, a));
        assert!(sel("[class~=x]").matches(&tree, p1));
        assert!(!sel("[class=x]").matches(&tree, p1));
    }

    #[test]
    fn test_unsupported_never_matches() {
        let (tree, _, p1, _, _) = tree();
        assert!(!sel("p::first-line").matches(&tree, p1));
        assert!(!sel("p:not(.x)").matches(&tree, p1));
        assert!(!sel("p:hover").matches(&tree, p1));
    }

    #[test]
    fn test_parse_list() {
        let list = Selector::parse_list("h1, .title > span ,p");
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].text, ".title > span");
    }
}
