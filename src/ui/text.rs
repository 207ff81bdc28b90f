//! Reading the rendered HTML template into lines of text runs and images.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::core::sparkline::Color;

static FONT_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)font-size\s*:\s*([0-9]+(?:\.[0-9]+)?)\s*px").expect("valid regex"));
static FONT_FAMILY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)font-family\s*:\s*['"]?([^'",;]+)"#).expect("valid regex"));
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[;\s])color\s*:\s*(#[0-9a-f]+)").expect("valid regex"));

/// Elements that end the current line
const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "tr", "li", "table", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6",
];
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head", "title"];

/// One piece of a line
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    /// `src` of an `<img>`
    Image(String),
}

/// The template reduced to what the overlay can draw.
///
/// Rows and block ends become line breaks, table cells are separated by a
/// space and whitespace collapses like in a browser. Empty lines are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub lines: Vec<Vec<Inline>>,
    /// Inline style of the first element that has one, i.e. the container
    pub style: Option<String>,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_fragment(html);
        let mut builder = FragmentBuilder::default();
        builder.visit_children(document.root_element());
        builder.finish()
    }

    /// The text of every line, images left out
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                let text: String = line
                    .iter()
                    .filter_map(|piece| match piece {
                        Inline::Text(text) => Some(text.as_str()),
                        Inline::Image(_) => None,
                    })
                    .collect();
                collapse_whitespace(&text).trim().to_string()
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Plain text for a surface that cannot draw HTML
pub fn html_to_text(html: &str) -> String {
    Fragment::parse(html).to_text()
}

#[derive(Default)]
struct FragmentBuilder {
    lines: Vec<Vec<Inline>>,
    line: Vec<Inline>,
    text: String,
    style: Option<String>,
}

impl FragmentBuilder {
    fn visit_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.text.push_str(text);
            } else if let Some(child) = ElementRef::wrap(child) {
                self.visit(child);
            }
        }
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        let node = element.value();
        let name = node.name();
        if SKIPPED_ELEMENTS.contains(&name) {
            return;
        }
        if self.style.is_none() {
            self.style = node.attr("style").map(str::to_string);
        }

        match name {
            "br" => self.break_line(),
            "img" => {
                if let Some(src) = node.attr("src") {
                    self.flush_text();
                    self.line.push(Inline::Image(src.trim().to_string()));
                }
            }
            _ => {
                self.visit_children(element);
                if BLOCK_ELEMENTS.contains(&name) {
                    self.break_line();
                } else if name == "td" || name == "th" {
                    self.text.push(' ');
                }
            }
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = collapse_whitespace(&self.text);
            self.text.clear();
            self.line.push(Inline::Text(text));
        }
    }

    fn break_line(&mut self) {
        self.flush_text();
        let line = tidy_line(std::mem::take(&mut self.line));
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    fn finish(mut self) -> Fragment {
        self.break_line();
        Fragment {
            lines: self.lines,
            style: self.style,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Trim the outer ends of a line and drop text pieces left empty
fn tidy_line(mut line: Vec<Inline>) -> Vec<Inline> {
    if let Some(Inline::Text(first)) = line.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(Inline::Text(last)) = line.last_mut() {
        *last = last.trim_end().to_string();
    }
    line.retain(|piece| !matches!(piece, Inline::Text(text) if text.is_empty()));
    line
}

/// `font-size: Npx` from an inline style
pub fn css_font_size(style: &str) -> Option<f64> {
    FONT_SIZE_RE
        .captures(style)
        .and_then(|caps| caps[1].parse().ok())
}

/// First family named in `font-family`
pub fn css_font_family(style: &str) -> Option<String> {
    FONT_FAMILY_RE
        .captures(style)
        .map(|caps| caps[1].trim().to_string())
        .filter(|family| !family.is_empty())
}

/// Hex `color`, ignoring `background-color` and friends
pub fn css_color(style: &str) -> Option<Color> {
    COLOR_RE
        .captures(style)
        .and_then(|caps| Color::parse(&caps[1]).ok())
}
