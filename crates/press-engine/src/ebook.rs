//! E-book template
//!
//! Turns a course outline and its lesson bodies into one HTML document: a
//! title page (or cover image), a table of contents, then one chapter per
//! module. The look follows the requested font preset and background
//! color, switching to a light-on-dark palette for dark backgrounds.

use press_css::Color;
use serde::Deserialize;

use crate::error::{RenderError, Result};

/// Body of an e-book request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookRequest {
    pub outline: Outline,
    pub edited_content: Vec<LessonContent>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub cover_image_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Outline {
    #[serde(default = "default_title")]
    pub course_title: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    pub module_title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    pub lesson_title: String,
}

/// Final text of one lesson; `content` is HTML
#[derive(Debug, Clone, Deserialize)]
pub struct LessonContent {
    pub module_title: String,
    pub lesson_title: String,
    pub content: String,
}

fn default_title() -> String {
    "My E-book".to_string()
}

fn module_label(module: usize, title: &str) -> String {
    format!("Module {}: {}", module + 1, title)
}

fn lesson_label(module: usize, lesson: usize, title: &str) -> String {
    format!("Lesson {}.{}: {}", module + 1, lesson + 1, title)
}

impl Outline {
    /// Numbered chapter and lesson headings for a content item
    ///
    /// Content titles may be bare outline titles or already numbered
    /// ("Module 1: Basics"); either way the result matches the table of
    /// contents. Titles missing from the outline are used as given.
    pub fn labels(&self, module_title: &str, lesson_title: &str) -> (String, String) {
        let found = self.modules.iter().enumerate().find(|(m, module)| {
            module.module_title == module_title || module_label(*m, &module.module_title) == module_title
        });
        let Some((m, module)) = found else {
            return (module_title.to_string(), lesson_title.to_string());
        };

        let lesson = module
            .lessons
            .iter()
            .enumerate()
            .find(|(l, lesson)| {
                lesson.lesson_title == lesson_title || lesson_label(m, *l, &lesson.lesson_title) == lesson_title
            })
            .map_or_else(|| lesson_title.to_string(), |(l, lesson)| lesson_label(m, l, &lesson.lesson_title));
        (module_label(m, &module.module_title), lesson)
    }
}

impl EbookRequest {
    pub fn validate(&self) -> Result<()> {
        if self.outline.modules.is_empty() || self.edited_content.is_empty() {
            return Err(RenderError::invalid_input("Missing outline or final content data."));
        }
        Ok(())
    }
}

/// Typeface preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontPreset {
    Roboto,
    Merriweather,
    Montserrat,
    Lato,
    Lora,
    Playfair,
    Oswald,
    SourceSansPro,
    PtSerif,
    Nunito,
}

impl FontPreset {
    /// Preset for a request name; unknown names get Roboto
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "merriweather" => Self::Merriweather,
            "montserrat" => Self::Montserrat,
            "lato" => Self::Lato,
            "lora" => Self::Lora,
            "playfair" => Self::Playfair,
            "oswald" => Self::Oswald,
            "source_sans_pro" => Self::SourceSansPro,
            "pt_serif" => Self::PtSerif,
            "nunito" => Self::Nunito,
            _ => Self::Roboto,
        }
    }

    /// CSS `font-family` value
    pub fn family(self) -> &'static str {
        match self {
            Self::Roboto => "'Roboto', sans-serif",
            Self::Merriweather => "'Merriweather', serif",
            Self::Montserrat => "'Montserrat', sans-serif",
            Self::Lato => "'Lato', sans-serif",
            Self::Lora => "'Lora', serif",
            Self::Playfair => "'Playfair Display', serif",
            Self::Oswald => "'Oswald', sans-serif",
            Self::SourceSansPro => "'Source Sans Pro', sans-serif",
            Self::PtSerif => "'PT Serif', serif",
            Self::Nunito => "'Nunito', sans-serif",
        }
    }

    /// Extra heading declarations
    fn heading_style(self) -> &'static str {
        match self {
            Self::Montserrat => "text-transform: uppercase; letter-spacing: 1px; font-weight: 900;",
            Self::Oswald => "text-transform: uppercase;",
            Self::Merriweather | Self::Lora | Self::PtSerif => "",
            _ => "font-weight: 700;",
        }
    }
}

/// Text colors for a background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: &'static str,
    pub heading: &'static str,
    pub toc_link: &'static str,
    pub toc_border: &'static str,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        text: "#333333",
        heading: "#111111",
        toc_link: "#2c3e50",
        toc_border: "#CCCCCC",
    };

    pub const DARK: Palette = Palette {
        text: "#EAEAEA",
        heading: "#FFFFFF",
        toc_link: "#90cdf4",
        toc_border: "#4A5567",
    };

    pub fn for_background(background: &str) -> Self {
        if is_color_dark(background) { Self::DARK } else { Self::LIGHT }
    }
}

/// Perceived luminance below the midpoint; unparseable colors count as light
pub fn is_color_dark(color: &str) -> bool {
    Color::parse(color).is_some_and(|c| {
        let luminance = 0.299 * f32::from(c.r) + 0.587 * f32::from(c.g) + 0.114 * f32::from(c.b);
        luminance < 128.0
    })
}

/// ASCII slug safe for file names and fragment ids
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Stylesheet for a font preset and background color
pub fn stylesheet(font: FontPreset, background: &str) -> String {
    let palette = Palette::for_background(background);
    let background = Color::parse(background).map_or("#FFFFFF", |_| background);
    let family = font.family();
    let headings = font.heading_style();
    format!(
        "@page {{ size: A4; margin: 2.5cm 2cm; @bottom-center {{ content: 'Page ' counter(page); font-size: 10pt; color: #888; }} }}
body {{ background-color: {background}; line-height: 1.6; font-size: 12pt; color: {text}; font-family: {family}; }}
h1, h2, h3, h4 {{ page-break-after: avoid; color: {heading}; font-family: {family}; {headings} }}
.title-page {{ text-align: center; page-break-after: always; padding-top: 6cm; }}
.title-page h1 {{ font-size: 42pt; margin: 0; }}
.title-page h3 {{ font-size: 16pt; margin-top: 1cm; font-weight: normal; }}
.title-page img {{ max-width: 18cm; max-height: 18cm; }}
.toc-page {{ page-break-after: always; }}
.toc-page h2 {{ border-bottom: 2px solid {toc_border}; padding-bottom: 10px; }}
.toc-page ul {{ list-style-type: none; padding-left: 0; }}
.toc-module {{ font-size: 14pt; font-weight: bold; margin-bottom: 15px; }}
.toc-lessons {{ padding-left: 25px; margin-top: 10px; list-style-type: none; }}
.toc-lessons li {{ margin-bottom: 10px; font-size: 11pt; font-weight: normal; }}
.toc-page a {{ text-decoration: none; color: {toc_link}; }}
.chapter {{ page-break-before: always; }}
.lesson {{ margin-top: 30px; }}
.lesson-content {{ margin-top: 10px; text-align: justify; }}
.lesson-content p {{ margin-bottom: 1em; }}
.ai-image {{ text-align: center; margin: 2em 0; page-break-inside: avoid; }}
.ai-image img {{ max-width: 100%; page-break-inside: avoid; }}
",
        text = palette.text,
        heading = palette.heading,
        toc_border = palette.toc_border,
        toc_link = palette.toc_link,
    )
}

/// The complete e-book document
pub fn build_html(request: &EbookRequest) -> String {
    let font = FontPreset::from_name(request.font.as_deref().unwrap_or("roboto"));
    let background = request.color.as_deref().unwrap_or("#FFFFFF");
    let title = escape(&request.outline.course_title);

    let mut body = String::new();
    match request.cover_image_path.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(cover) => body.push_str(&format!(r#"<div class="title-page"><img src="{}"></div>"#, escape(cover))),
        None => body.push_str(&format!(r#"<div class="title-page"><h1>{title}</h1><h3>By Press</h3></div>"#)),
    }

    body.push_str(r#"<div class="toc-page"><h2>Table of Contents</h2><ul>"#);
    for (m, module) in request.outline.modules.iter().enumerate() {
        let heading = module_label(m, &module.module_title);
        body.push_str(&format!(
            r##"<li class="toc-module"><a href="#{}">{}</a><ul class="toc-lessons">"##,
            secure_filename(&heading),
            escape(&heading)
        ));
        for (l, lesson) in module.lessons.iter().enumerate() {
            let entry = lesson_label(m, l, &lesson.lesson_title);
            body.push_str(&format!(
                r##"<li><a href="#{}">{}</a></li>"##,
                secure_filename(&entry),
                escape(&entry)
            ));
        }
        body.push_str("</ul></li>");
    }
    body.push_str("</ul></div>");

    let mut current_module: Option<&str> = None;
    for item in &request.edited_content {
        let (chapter, lesson) = request.outline.labels(&item.module_title, &item.lesson_title);
        if current_module != Some(item.module_title.as_str()) {
            current_module = Some(item.module_title.as_str());
            body.push_str(&format!(
                r#"<div class="chapter"><h2 id="{}">{}</h2></div>"#,
                secure_filename(&chapter),
                escape(&chapter)
            ));
        }
        body.push_str(&format!(
            r#"<div class="lesson"><h4 id="{}">{}</h4><div class="lesson-content">{}</div></div>"#,
            secure_filename(&lesson),
            escape(&lesson),
            item.content
        ));
    }

    format!(
        "<html><head><meta charset=\"UTF-8\"><title>{title}</title><style>{}</style></head><body>{body}</body></html>",
        stylesheet(font, background)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> EbookRequest {
        serde_json::from_str(json).unwrap()
    }

    const SAMPLE: &str = r##"{
        "outline": {
            "course_title": "Rust & You",
            "modules": [
                {"module_title": "Basics", "lessons": [{"lesson_title": "Ownership"}, {"lesson_title": "Borrowing"}]},
                {"module_title": "Advanced", "lessons": [{"lesson_title": "Traits"}]}
            ]
        },
        "editedContent": [
            {"module_title": "Basics", "lesson_title": "Ownership", "content": "<p>Values have one owner.</p>"},
            {"module_title": "Basics", "lesson_title": "Borrowing", "content": "<p>References borrow.</p>"},
            {"module_title": "Advanced", "lesson_title": "Traits", "content": "<p>Shared behavior.</p>"}
        ],
        "font": "montserrat",
        "color": "#1a1a2e"
    }"##;

    #[test]
    fn test_is_color_dark() {
        assert!(is_color_dark("#000000"));
        assert!(is_color_dark("#1a1a2e"));
        assert!(!is_color_dark("#FFFFFF"));
        assert!(!is_color_dark("#f5f5dc"));
        assert!(!is_color_dark("not a color"));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("Module 1: Getting Started!"), "Module_1_Getting_Started");
        assert_eq!(secure_filename("  ._hidden_. "), "hidden");
    }

    #[test]
    fn test_font_presets() {
        assert_eq!(FontPreset::from_name("Lora"), FontPreset::Lora);
        assert_eq!(FontPreset::from_name("comic sans"), FontPreset::Roboto);
        assert!(FontPreset::PtSerif.family().contains("PT Serif"));
    }

    #[test]
    fn test_dark_background_uses_light_text() {
        let css = stylesheet(FontPreset::Roboto, "#000000");
        assert!(css.contains("color: #EAEAEA"));
        let css = stylesheet(FontPreset::Roboto, "#ffffff");
        assert!(css.contains("color: #333333"));
    }

    #[test]
    fn test_build_html_structure() {
        let html = build_html(&request(SAMPLE));
        assert!(html.contains("<h1>Rust &amp; You</h1>"));
        assert!(html.contains("Module 2: Advanced"));
        assert!(html.contains("Lesson 1.2: Borrowing"));
        assert_eq!(html.matches(r#"<div class="chapter">"#).count(), 2);
        assert_eq!(html.matches(r#"<div class="lesson">"#).count(), 3);
        assert!(html.contains("<p>Values have one owner.</p>"));
        assert!(html.contains("text-transform: uppercase"));
    }

    #[test]
    fn test_toc_links_match_chapter_ids() {
        let numbered = SAMPLE
            .replace(r#""module_title": "Basics", "lesson_title": "Ownership""#, r#""module_title": "Module 1: Basics", "lesson_title": "Lesson 1.1: Ownership""#)
            .replace(r#""module_title": "Basics", "lesson_title": "Borrowing""#, r#""module_title": "Module 1: Basics", "lesson_title": "Lesson 1.2: Borrowing""#);

        for json in [SAMPLE.to_string(), numbered] {
            let html = build_html(&request(&json));
            for id in ["Module_1_Basics", "Lesson_1.1_Ownership", "Lesson_1.2_Borrowing", "Module_2_Advanced", "Lesson_2.1_Traits"] {
                assert!(html.contains(&format!(r##"href="#{id}""##)), "missing link to {id}");
                assert!(html.contains(&format!(r#"id="{id}""#)), "missing target {id}");
            }
            assert_eq!(html.matches(r#"<div class="chapter">"#).count(), 2);
        }
    }

    #[test]
    fn test_unknown_titles_used_as_given() {
        let outline: Outline = serde_json::from_str(r#"{"modules": [{"module_title": "Basics", "lessons": []}]}"#).unwrap();
        assert_eq!(
            outline.labels("Extras", "Glossary"),
            ("Extras".to_string(), "Glossary".to_string())
        );
        assert_eq!(
            outline.labels("Basics", "Glossary"),
            ("Module 1: Basics".to_string(), "Glossary".to_string())
        );
    }

    #[test]
    fn test_cover_image_replaces_title() {
        let mut req = request(SAMPLE);
        req.cover_image_path = Some("covers/front.png".into());
        let html = build_html(&req);
        assert!(html.contains(r#"<img src="covers/front.png">"#));
        assert!(!html.contains("<h1>"));
    }

    #[test]
    fn test_missing_content_rejected() {
        let req = request(r#"{"outline": {"modules": []}, "editedContent": []}"#);
        assert_eq!(req.outline.course_title, "My E-book");
        assert!(req.validate().is_err());
    }
}
