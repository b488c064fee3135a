//! Front matter parsing for post files.
//!
//! A post opens with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2023-05-01
//! ---
//!
//! Body text.
//! ```
//!
//! The opening fence has to be the very first line of the file. Anything else is
//! treated as a file without front matter.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::{CoreError, Result};

/// YAML fence line.
pub const FENCE: &str = "---";

/// Front matter metadata for a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Post title. Posts without one are not published.
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,

    /// Short description used for listings, feeds and meta tags.
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: Option<String>,

    /// Single tag shown above the title in the index.
    #[serde(default, deserialize_with = "scalar_string")]
    pub tag: Option<String>,

    /// Publication date as written in the file.
    #[serde(default)]
    pub date: Option<RawDate>,

    /// Fields the site does not interpret.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Accept any YAML scalar as text, so `title: 1984` stays a title.
/// Sequences, mappings and nulls read as absent.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// A date value as it appears in YAML.
///
/// Numbers are taken as epoch milliseconds, everything else goes through
/// [`crate::date::parse_date`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    /// Epoch milliseconds.
    Millis(i64),
    /// Textual date.
    Text(String),
}

impl Frontmatter {
    /// The title, if present and non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

/// Split content into the YAML block and the remaining body.
///
/// Returns `None` when the file does not start with a fenced block or the block
/// is never closed.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let (first, rest) = split_line(content)?;
    if first.trim_end() != FENCE {
        return None;
    }

    let mut offset = 0;
    let mut remaining = rest;
    while !remaining.is_empty() {
        let (line, tail) = split_line(remaining).unwrap_or((remaining, ""));
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            return Some((yaml, tail));
        }
        offset += remaining.len() - tail.len();
        remaining = tail;
    }

    None
}

/// Split off the first line, without its line terminator.
fn split_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    match s.find('\n') {
        Some(pos) => {
            let line = &s[..pos];
            Some((line.strip_suffix('\r').unwrap_or(line), &s[pos + 1..]))
        }
        None => Some((s, "")),
    }
}

/// Parse front matter from a post file.
///
/// `Ok(None)` means the file has no front matter block at all; a block that is
/// not valid YAML is an error.
pub fn parse_frontmatter<'a>(content: &'a str, path: &Path) -> Result<Option<(Frontmatter, &'a str)>> {
    let Some((yaml, body)) = split_frontmatter(content) else {
        return Ok(None);
    };

    if yaml.trim().is_empty() {
        return Ok(Some((Frontmatter::default(), body)));
    }

    let value: Value = serde_yaml::from_str(yaml)?;
    if !value.is_mapping() {
        return Err(CoreError::frontmatter(path, "front matter is not a mapping"));
    }

    let frontmatter: Frontmatter =
        serde_yaml::from_value(value).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;

    Ok(Some((frontmatter, body)))
}
