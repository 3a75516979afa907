//! CSS Parser using lightningcss
//!
//! lightningcss does the tokenizing, error recovery and value validation.
//! Each rule is converted to our representation by serializing its
//! selectors and declaration values back to text, which the style system
//! reads with its own small value parsers.

use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::rules::page::PageMarginBox;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;

use crate::page::MarginBoxPosition;
use crate::selector::Selector;
use crate::shorthand;
use crate::{CssError, Declaration, PageRule, Rule, Stylesheet};

/// CSS Parser
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSS stylesheet
    ///
    /// Invalid rules and declarations are dropped by the parser's error
    /// recovery; an error is only returned when nothing could be read.
    pub fn parse(&self, css: &str) -> Result<Stylesheet, CssError> {
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };

        let stylesheet = StyleSheet::parse(css, options).map_err(|e| CssError::ParseError {
            line: e.loc.as_ref().map(|l| l.line + 1).unwrap_or(0),
            message: format!("{:?}", e.kind),
        })?;

        let mut result = Stylesheet::new();
        self.convert_rules(&stylesheet.rules, &mut result);

        tracing::debug!(
            "Parsed stylesheet: {} rules, {} @page rules",
            result.rules.len(),
            result.pages.len()
        );
        Ok(result)
    }

    /// Parse the contents of a `style` attribute
    pub fn parse_inline(&self, text: &str) -> Vec<Declaration> {
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };
        match DeclarationBlock::parse_string(text, options) {
            Ok(block) => self.convert_declarations(&block),
            Err(e) => {
                tracing::warn!("ignoring invalid inline style {:?}: {:?}", text, e.kind);
                Vec::new()
            }
        }
    }

    fn convert_rules(&self, rules: &CssRuleList, out: &mut Stylesheet) {
        for rule in rules.0.iter() {
            match rule {
                CssRule::Style(style_rule) => {
                    let text = match style_rule.selectors.to_css_string(PrinterOptions::default()) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("skipping rule with unprintable selector: {:?}", e);
                            continue;
                        }
                    };
                    let selectors = Selector::parse_list(&text);
                    let declarations = self.convert_declarations(&style_rule.declarations);
                    if !selectors.is_empty() && !declarations.is_empty() {
                        out.rules.push(Rule { selectors, declarations });
                    }
                }
                CssRule::Media(media) => {
                    let query = media
                        .query
                        .to_css_string(PrinterOptions::default())
                        .unwrap_or_default();
                    if applies_to_print(&query) {
                        self.convert_rules(&media.rules, out);
                    }
                }
                CssRule::Page(page) => {
                    let margin_boxes = page
                        .rules
                        .iter()
                        .filter_map(|m| {
                            let position = margin_box_position(&m.margin_box)?;
                            Some((position, self.convert_declarations(&m.declarations)))
                        })
                        .collect();
                    out.pages.push(PageRule {
                        declarations: self.convert_declarations(&page.declarations),
                        margin_boxes,
                    });
                }
                CssRule::Import(_) => {
                    tracing::debug!("@import is not followed");
                }
                _ => {}
            }
        }
    }

    fn convert_declarations(&self, block: &DeclarationBlock) -> Vec<Declaration> {
        let mut result = Vec::new();
        for decl in block.declarations.iter() {
            self.convert_declaration(decl, false, &mut result);
        }
        for decl in block.important_declarations.iter() {
            self.convert_declaration(decl, true, &mut result);
        }
        result
    }

    fn convert_declaration(&self, decl: &Property, important: bool, out: &mut Vec<Declaration>) {
        let property_id = decl.property_id();
        let name = property_id.name();
        let value = match decl.value_to_css_string(PrinterOptions::default()) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("skipping declaration {}: {:?}", name, e);
                return;
            }
        };

        for (property, value) in shorthand::expand(name, &value) {
            out.push(Declaration {
                property,
                value,
                important,
            });
        }
    }
}

impl Default for CssParser {
    fn default() -> Self {
        Self::new()
    }
}

fn applies_to_print(query: &str) -> bool {
    let q = query.trim().to_ascii_lowercase();
    if q.starts_with("not ") {
        return !q.contains("print");
    }
    q.is_empty() || q.contains("print") || q.contains("all")
}

fn margin_box_position(margin_box: &PageMarginBox) -> Option<MarginBoxPosition> {
    Some(match margin_box {
        PageMarginBox::TopLeft => MarginBoxPosition::TopLeft,
        PageMarginBox::TopCenter => MarginBoxPosition::TopCenter,
        PageMarginBox::TopRight => MarginBoxPosition::TopRight,
        PageMarginBox::BottomLeft => MarginBoxPosition::BottomLeft,
        PageMarginBox::BottomCenter => MarginBoxPosition::BottomCenter,
        PageMarginBox::BottomRight => MarginBoxPosition::BottomRight,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(decls: &'a [Declaration], name: &str) -> Option<&'a Declaration> {
        decls.iter().find(|d| d.property == name)
    }

    #[test]
    fn test_parse_simple_rule() {
        let sheet = CssParser::new().parse("p { color: red; margin: 0 }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.selectors[0].text, "p");
        assert!(find(&rule.declarations, "color").is_some());
        assert!(find(&rule.declarations, "margin-left").is_some());
    }

    #[test]
    fn test_selector_list() {
        let sheet = CssParser::new().parse("h1, h2 > span { color: blue }").unwrap();
        assert_eq!(sheet.rules[0].selectors.len(), 2);
    }

    #[test]
    fn test_important() {
        let sheet = CssParser::new().parse("p { color: red !important }").unwrap();
        assert!(sheet.rules[0].declarations[0].important);
    }

    #[test]
    fn test_invalid_rules_are_skipped() {
        let sheet = CssParser::new()
            .parse("p { color: red } @@@ garbage { ; } div { width: 10px }")
            .unwrap();
        assert!(sheet.rules.iter().any(|r| r.selectors[0].text == "div"));
    }

    #[test]
    fn test_page_rule() {
        let css = r#"@page { size: A4; margin: 2.5cm 2cm;
            @bottom-center { content: "Page " counter(page); font-size: 9pt } }"#;
        let sheet = CssParser::new().parse(css).unwrap();
        assert_eq!(sheet.pages.len(), 1);
        let page = &sheet.pages[0];
        assert!(find(&page.declarations, "size").is_some());
        assert!(find(&page.declarations, "margin-top").is_some());
        assert_eq!(page.margin_boxes.len(), 1);
        assert_eq!(page.margin_boxes[0].0, MarginBoxPosition::BottomCenter);
        assert!(find(&page.margin_boxes[0].1, "content").is_some());
    }

    #[test]
    fn test_media_print_is_included() {
        let sheet = CssParser::new()
            .parse("@media print { p { color: red } } @media screen { div { color: blue } }")
            .unwrap();
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors[0].text, "p");
    }

    #[test]
    fn test_inline_style() {
        let decls = CssParser::new().parse_inline("color: #ff0000; padding: 1px 2px");
        assert!(find(&decls, "color").is_some());
        assert!(find(&decls, "padding-right").is_some());
    }
}
