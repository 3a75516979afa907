//! Per-request render options
//!
//! Sizes given as bare numbers are points; strings use CSS syntax
//! (`"A4 landscape"`, `"210mm 297mm"`, `"2cm 1.5cm"`).

use press_css::{Edges, Length, PageGeometry, parse_page_size};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Options accompanying one render
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Page box; overrides `@page` rules
    pub page: Option<PageOptions>,
    /// Override the service's compression setting
    pub compress: Option<bool>,
    /// Document title; defaults to the `<title>` element
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    pub size: Option<PageSizeOption>,
    pub margins: Option<MarginOption>,
    pub landscape: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageSizeOption {
    /// Width and height in points
    Dimensions([f32; 2]),
    /// Named size or CSS `size` value
    Css(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarginOption {
    /// Same margin on every side, in points
    Uniform(f32),
    /// Per side, in points
    Sides {
        #[serde(default)]
        top: f32,
        #[serde(default)]
        right: f32,
        #[serde(default)]
        bottom: f32,
        #[serde(default)]
        left: f32,
    },
    /// CSS margin shorthand with one to four lengths
    Css(String),
}

impl RenderOptions {
    /// Page geometry for a document whose own page box is `base`
    pub fn geometry(&self, base: PageGeometry) -> Result<PageGeometry> {
        let mut geometry = base;
        if let Some(page) = &self.page {
            if let Some(size) = &page.size {
                let (width, height) = size.dimensions()?;
                geometry.width = width;
                geometry.height = height;
            }
            if page.landscape && geometry.width < geometry.height {
                std::mem::swap(&mut geometry.width, &mut geometry.height);
            }
            if let Some(margins) = &page.margins {
                geometry.margin = margins.edges()?;
            }
        }

        if !geometry.is_valid() {
            return Err(RenderError::invalid_input(format!(
                "page {}x{}pt with margins {:?} leaves no content area",
                geometry.width, geometry.height, geometry.margin
            )));
        }
        Ok(geometry)
    }
}

impl PageSizeOption {
    pub fn dimensions(&self) -> Result<(f32, f32)> {
        match self {
            Self::Dimensions([w, h]) => Ok((*w, *h)),
            Self::Css(value) => {
                parse_page_size(value).ok_or_else(|| RenderError::invalid_input(format!("unknown page size {value:?}")))
            }
        }
    }
}

impl MarginOption {
    pub fn edges(&self) -> Result<Edges<f32>> {
        match self {
            Self::Uniform(v) => Ok(Edges::all(*v)),
            Self::Sides { top, right, bottom, left } => Ok(Edges {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            Self::Css(value) => {
                let invalid = || RenderError::invalid_input(format!("invalid margins {value:?}"));
                let lengths = value
                    .split_whitespace()
                    .map(|part| Length::parse(part).and_then(|l| l.to_points(12.0, 12.0)))
                    .collect::<Option<Vec<f32>>>()
                    .ok_or_else(invalid)?;
                match lengths.as_slice() {
                    [all] => Ok(Edges::all(*all)),
                    [v, h] => Ok(Edges {
                        top: *v,
                        right: *h,
                        bottom: *v,
                        left: *h,
                    }),
                    [t, h, b] => Ok(Edges {
                        top: *t,
                        right: *h,
                        bottom: *b,
                        left: *h,
                    }),
                    [t, r, b, l] => Ok(Edges {
                        top: *t,
                        right: *r,
                        bottom: *b,
                        left: *l,
                    }),
                    _ => Err(invalid()),
                }
            }
        }
    }
}
