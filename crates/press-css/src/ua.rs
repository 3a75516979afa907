//! User agent stylesheet
//!
//! Print defaults applied before any author style.

use std::sync::OnceLock;

use crate::{CssParser, Stylesheet};

const UA_CSS: &str = r#"
html, body, div, p, ul, ol, li, h1, h2, h3, h4, h5, h6,
section, article, header, footer, nav, main, aside,
figure, figcaption, blockquote, pre, hr, address,
table, thead, tbody, tfoot, tr, td, th, caption,
dl, dt, dd, form, fieldset, details, summary { display: block }

head, title, meta, link, style, script, template, noscript { display: none }

li { display: list-item }

html { font-family: serif; font-size: 16px; color: #000 }
body { margin: 8px }

h1 { font-size: 2em; margin: 0.67em 0; font-weight: bold }
h2 { font-size: 1.5em; margin: 0.83em 0; font-weight: bold }
h3 { font-size: 1.17em; margin: 1em 0; font-weight: bold }
h4 { margin: 1.33em 0; font-weight: bold }
h5 { font-size: 0.83em; margin: 1.67em 0; font-weight: bold }
h6 { font-size: 0.67em; margin: 2.33em 0; font-weight: bold }

p, dl { margin: 1em 0 }
dd { margin-left: 40px }
blockquote, figure { margin: 1em 40px }

ul, ol { margin: 1em 0; padding-left: 40px }
ul { list-style-type: disc }
ol { list-style-type: decimal }
ul ul, ol ul { list-style-type: circle; margin: 0 }
ol ol, ul ol { margin: 0 }

strong, b, th, dt { font-weight: bold }
em, i, cite, var, dfn { font-style: italic }
u, ins { text-decoration: underline }
s, strike, del { text-decoration: line-through }
a:link { color: #0000ee; text-decoration: underline }
small { font-size: 0.83em }

pre, code, kbd, samp, tt { font-family: monospace }
pre { white-space: pre; margin: 1em 0 }

hr { border-top: 1px solid #808080; margin: 0.5em 0 }
th, td { padding: 1px }
"#;

/// The parsed user agent stylesheet, built once per process
pub fn user_agent_stylesheet() -> &'static Stylesheet {
    static UA: OnceLock<Stylesheet> = OnceLock::new();
    UA.get_or_init(|| match CssParser::new().parse(UA_CSS) {
        Ok(sheet) => sheet,
        Err(e) => {
            tracing::error!("user agent stylesheet failed to parse: {}", e);
            Stylesheet::new()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ua_stylesheet_parses() {
        let ua = user_agent_stylesheet();
        assert!(ua.rules.len() > 20);
    }
}
