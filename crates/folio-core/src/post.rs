//! Post file naming and post records.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    date::normalize_date,
    error::Result,
    frontmatter::{Frontmatter, parse_frontmatter},
};

/// Extension every post file carries.
pub const POST_EXTENSION: &str = "md";

/// Parsed post file name.
///
/// Supports patterns like:
/// - `hello.md` → slug: "hello", no suffix
/// - `hello.zh.md` → slug: "hello", suffix: "zh"
/// - `hello.zh_CN.md` → slug: "hello", suffix: "zh_CN"
/// - `a.b.c.md` → slug: "a.b", suffix: "c"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPath {
    /// Original file path.
    pub path: PathBuf,

    /// Language-neutral slug shared by all translations.
    pub slug: String,

    /// Language suffix from the file name, if any.
    pub suffix: Option<String>,
}

impl PostPath {
    /// Parse a post path. Returns `None` for anything that is not `*.md`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        Self::from_file_name(file_name).map(|(slug, suffix)| Self {
            path: path.to_path_buf(),
            slug,
            suffix,
        })
    }

    fn from_file_name(file_name: &str) -> Option<(String, Option<String>)> {
        let stem = file_name.strip_suffix(".md")?;
        if stem.is_empty() {
            return None;
        }

        match stem.rsplit_once('.') {
            Some((slug, suffix)) if !slug.is_empty() && !suffix.is_empty() => {
                Some((slug.to_string(), Some(suffix.to_string())))
            }
            _ => Some((stem.to_string(), None)),
        }
    }

    /// Effective language, falling back to `default_lang` when there is no suffix.
    pub fn language<'a>(&'a self, default_lang: &'a str) -> &'a str {
        self.suffix.as_deref().unwrap_or(default_lang)
    }

    /// File name for a `(slug, lang)` pair.
    pub fn file_name(slug: &str, lang: &str, default_lang: &str) -> String {
        if lang == default_lang {
            format!("{slug}.{POST_EXTENSION}")
        } else {
            format!("{slug}.{lang}.{POST_EXTENSION}")
        }
    }
}

/// A post read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Slug with the language suffix stripped.
    pub slug: String,

    /// Language of this variant.
    pub language: String,

    /// Post title.
    pub title: String,

    /// Post description.
    #[serde(default)]
    pub description: String,

    /// Post tag.
    #[serde(default)]
    pub tag: String,

    /// Publication date in epoch milliseconds.
    #[serde(default)]
    pub date: Option<i64>,

    /// Markdown body without the front matter. Only set when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl PostRecord {
    /// Build a record from file content.
    ///
    /// `Ok(None)` when the file has no front matter or no title; such files are not
    /// posts. Malformed YAML is an error so callers can report it.
    pub fn parse(
        content: &str,
        post_path: &PostPath,
        default_lang: &str,
        include_body: bool,
    ) -> Result<Option<Self>> {
        let Some((frontmatter, body)) = parse_frontmatter(content, &post_path.path)? else {
            return Ok(None);
        };
        Ok(Self::from_frontmatter(frontmatter, body, post_path, default_lang, include_body))
    }

    fn from_frontmatter(
        frontmatter: Frontmatter,
        body: &str,
        post_path: &PostPath,
        default_lang: &str,
        include_body: bool,
    ) -> Option<Self> {
        let title = frontmatter.title()?.to_string();

        let date = match &frontmatter.date {
            Some(raw) => {
                let normalized = normalize_date(raw);
                if normalized.is_none() {
                    tracing::warn!(path = %post_path.path.display(), ?raw, "unrecognised date");
                }
                normalized
            }
            None => None,
        };

        Some(Self {
            slug: post_path.slug.clone(),
            language: post_path.language(default_lang).to_string(),
            title,
            description: frontmatter.description.unwrap_or_default(),
            tag: frontmatter.tag.unwrap_or_default(),
            date,
            body: include_body.then(|| body.to_string()),
        })
    }

    /// Whether this is the canonical (default language) variant.
    pub fn is_canonical(&self, default_lang: &str) -> bool {
        self.language == default_lang
    }
}

/// Order posts newest first. Undated posts go last, ties break on title.
pub fn sort_by_date_desc(posts: &mut [PostRecord]) {
    posts.sort_by(|a, b| match (&b.date, &a.date) {
        (Some(b_date), Some(a_date)) => b_date.cmp(a_date).then_with(|| a.title.cmp(&b.title)),
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (None, None) => a.title.cmp(&b.title),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_path(name: &str) -> PostPath {
        PostPath::from_path(Path::new(name)).expect("post path")
    }

    #[test]
    fn test_post_path_simple() {
        let pp = post_path("posts/hello.md");
        assert_eq!(pp.slug, "hello");
        assert_eq!(pp.suffix, None);
        assert_eq!(pp.language("en"), "en");
    }

    #[test]
    fn test_post_path_with_language() {
        let pp = post_path("hello.zh.md");
        assert_eq!(pp.slug, "hello");
        assert_eq!(pp.language("en"), "zh");

        let pp = post_path("hello.zh_CN.md");
        assert_eq!(pp.suffix.as_deref(), Some("zh_CN"));
    }

    #[test]
    fn test_post_path_multi_part_suffix() {
        let pp = post_path("a.b.c.md");
        assert_eq!(pp.slug, "a.b");
        assert_eq!(pp.suffix.as_deref(), Some("c"));
    }

    #[test]
    fn test_post_path_rejects_other_files() {
        assert!(PostPath::from_path(Path::new("notes.txt")).is_none());
        assert!(PostPath::from_path(Path::new(".md")).is_none());
        assert!(PostPath::from_path(Path::new("hello.MD")).is_none());
    }

    #[test]
    fn test_post_path_dotfile_like_names() {
        let pp = post_path(".hello.md");
        assert_eq!(pp.slug, ".hello");
        assert_eq!(pp.suffix, None);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(PostPath::file_name("hello", "en", "en"), "hello.md");
        assert_eq!(PostPath::file_name("hello", "zh", "en"), "hello.zh.md");
    }

    #[test]
    fn test_parse_record() {
        let content = "---\ntitle: Hi\ntag: life\ndate: 2023-05-01\n---\nHello there.";
        let record = PostRecord::parse(content, &post_path("hello.md"), "en", true)
            .unwrap()
            .unwrap();

        assert_eq!(record.slug, "hello");
        assert_eq!(record.language, "en");
        assert_eq!(record.title, "Hi");
        assert_eq!(record.tag, "life");
        assert_eq!(record.date, Some(1_682_899_200_000));
        assert_eq!(record.body.as_deref(), Some("Hello there."));
        assert!(record.is_canonical("en"));
    }

    #[test]
    fn test_parse_record_without_body() {
        let content = "---\ntitle: Hi\n---\nHello there.";
        let record = PostRecord::parse(content, &post_path("hello.zh.md"), "en", false)
            .unwrap()
            .unwrap();
        assert_eq!(record.language, "zh");
        assert!(record.body.is_none());
        assert!(record.date.is_none());
    }

    #[test]
    fn test_parse_record_skips_untitled() {
        let content = "---\ndescription: nothing\n---\nBody";
        assert!(PostRecord::parse(content, &post_path("x.md"), "en", true).unwrap().is_none());
    }

    #[test]
    fn test_parse_record_skips_plain_markdown() {
        assert!(PostRecord::parse("# Title", &post_path("x.md"), "en", true).unwrap().is_none());
    }

    #[test]
    fn test_unparsable_date_is_dropped() {
        let content = "---\ntitle: Hi\ndate: someday\n---\n";
        let record = PostRecord::parse(content, &post_path("x.md"), "en", false).unwrap().unwrap();
        assert!(record.date.is_none());
    }

    fn record(title: &str, date: Option<i64>) -> PostRecord {
        PostRecord {
            slug: title.to_lowercase(),
            language: "en".into(),
            title: title.into(),
            description: String::new(),
            tag: String::new(),
            date,
            body: None,
        }
    }

    #[test]
    fn test_sort_by_date_desc() {
        let mut posts = vec![
            record("Old", Some(1)),
            record("Undated", None),
            record("New", Some(3)),
            record("Mid", Some(2)),
        ];
        sort_by_date_desc(&mut posts);
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["New", "Mid", "Old", "Undated"]);
    }
}
