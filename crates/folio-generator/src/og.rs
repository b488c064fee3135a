//! Open Graph card images.
//!
//! Cards are rendered as SVG: a black canvas with an accent bar, the page title
//! wrapped to fit, and the site domain as a footer.

use std::fmt::Write as _;

use folio_core::Config;
use folio_parser::html_escape;
use thiserror::Error;

/// Card width in pixels.
pub const OG_WIDTH: u32 = 1200;

/// Card height in pixels.
pub const OG_HEIGHT: u32 = 600;

const PADDING: u32 = 92;
const TITLE_SIZE: u32 = 60;
const TITLE_LINE_HEIGHT: u32 = 76;
const FOOTER_SIZE: u32 = 32;

/// Title width budget per line, in half-width character units.
const LINE_UNITS: usize = 30;
const MAX_LINES: usize = 4;

/// Card request errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OgError {
    /// No usable `title` parameter.
    #[error("invalid request")]
    MissingTitle,
}

/// Validate the `title` query parameter.
pub fn require_title(title: Option<&str>) -> Result<&str, OgError> {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title),
        _ => Err(OgError::MissingTitle),
    }
}

/// One social card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgCard {
    title: String,
    domain_name: String,
    domain_suffix: String,
}

impl OgCard {
    /// Card for `title` on the configured site.
    pub fn new(config: &Config, title: &str) -> Self {
        let (domain_name, domain_suffix) = site_label(&config.site.base_url);
        Self {
            title: title.to_string(),
            domain_name,
            domain_suffix,
        }
    }

    /// Render as an SVG document.
    pub fn render(&self) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{OG_WIDTH}" height="{OG_HEIGHT}" viewBox="0 0 {OG_WIDTH} {OG_HEIGHT}">"#
        );
        let _ = writeln!(svg, r##"  <rect width="100%" height="100%" fill="#000000"/>"##);
        let _ = writeln!(
            svg,
            r##"  <rect x="{PADDING}" y="{PADDING}" width="80" height="20" fill="#ffffff"/>"##
        );

        let _ = writeln!(
            svg,
            r##"  <text font-family="system-ui, sans-serif" font-size="{TITLE_SIZE}" font-weight="700" fill="#ffffff">"##
        );
        let first_baseline = PADDING + 20 + 60 + TITLE_SIZE;
        for (i, line) in wrap_title(&self.title, LINE_UNITS, MAX_LINES).iter().enumerate() {
            let y = first_baseline + i as u32 * TITLE_LINE_HEIGHT;
            let _ = writeln!(
                svg,
                r#"    <tspan x="{PADDING}" y="{y}">{}</tspan>"#,
                html_escape(line)
            );
        }
        let _ = writeln!(svg, "  </text>");

        let _ = writeln!(
            svg,
            r##"  <text x="{PADDING}" y="{}" font-family="system-ui, sans-serif" font-size="{FOOTER_SIZE}" fill="#666666">//<tspan fill="#ffffff">{}</tspan>{}</text>"##,
            OG_HEIGHT - PADDING + FOOTER_SIZE / 2,
            html_escape(&self.domain_name),
            html_escape(&self.domain_suffix),
        );
        svg.push_str("</svg>\n");
        svg
    }
}

/// Split a base URL's host into its first label and the rest, `("example", ".app")`.
fn site_label(base_url: &str) -> (String, String) {
    let without_scheme = base_url
        .split_once("://")
        .map_or(base_url, |(_, rest)| rest);
    let host = without_scheme.split(['/', ':']).next().unwrap_or_default();

    match host.split_once('.') {
        Some((name, rest)) => (name.to_string(), format!(".{rest}")),
        None => (host.to_string(), String::new()),
    }
}

fn char_units(c: char) -> usize {
    if c >= '\u{2E80}' { 2 } else { 1 }
}

fn text_units(text: &str) -> usize {
    text.chars().map(char_units).sum()
}

/// Greedy word wrap. Words wider than a line break between characters.
fn wrap_title(title: &str, max_units: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0;

    for word in title.split_whitespace() {
        let sep = usize::from(!line.is_empty());
        let word_width = text_units(word);
        if width + sep + word_width <= max_units {
            if sep == 1 {
                line.push(' ');
            }
            line.push_str(word);
            width += sep + word_width;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            width = 0;
        }
        for c in word.chars() {
            let units = char_units(c);
            if width + units > max_units && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0;
            }
            line.push(c);
            width += units;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}
