//! Post ingestion.
//!
//! Reads the posts directory on every call; the file system is the only source
//! of truth. Files without front matter or without a title are not posts and
//! are left out silently.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashSet},
    fs, io,
    path::{Path, PathBuf},
};

use folio_core::{
    Config, PostPath, PostRecord,
    post::{POST_EXTENSION, sort_by_date_desc},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Post store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No post exists for the requested slug and language.
    #[error("post not found: {slug} ({lang})")]
    NotFound { slug: String, lang: String },

    /// The posts directory itself could not be read.
    #[error("cannot read posts directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A post file could not be read.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn not_found(slug: &str, lang: &str) -> Self {
        Self::NotFound {
            slug: slug.to_string(),
            lang: lang.to_string(),
        }
    }

    /// Whether this is the not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Read-only view over a directory of markdown posts.
#[derive(Debug, Clone)]
pub struct PostStore {
    dir: PathBuf,
    default_lang: String,
}

impl PostStore {
    /// Create a store over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, default_lang: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_lang: default_lang.into(),
        }
    }

    /// Create a store from configuration, resolving the posts directory under `root`.
    #[must_use]
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(config.posts_dir(root), config.site.default_language.clone())
    }

    /// Posts directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Language of files without a suffix.
    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    /// Every `*.md` file in the posts directory, in enumeration order.
    pub fn post_files(&self) -> Result<Vec<PostPath>> {
        let directory_error = |source| StoreError::Directory {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(directory_error)? {
            let path = entry.map_err(directory_error)?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(post_path) = PostPath::from_path(&path) {
                files.push(post_path);
            }
        }
        Ok(files)
    }

    /// Read every post.
    ///
    /// With `include_body` false the records carry metadata only. Enumeration
    /// order is preserved; when two files map to the same `(slug, language)`
    /// the first one wins.
    pub fn list_posts(&self, include_body: bool) -> Result<Vec<PostRecord>> {
        let files = self.post_files()?;
        debug!(dir = %self.dir.display(), count = files.len(), "listing posts");

        let mut seen = HashSet::new();
        let mut posts = Vec::with_capacity(files.len());
        for post_path in &files {
            let Some(record) = self.read_record(post_path, include_body)? else {
                continue;
            };
            if !seen.insert((record.slug.clone(), record.language.clone())) {
                warn!(
                    path = %post_path.path.display(),
                    slug = %record.slug,
                    lang = %record.language,
                    "duplicate post variant, ignoring"
                );
                continue;
            }
            posts.push(record);
        }

        Ok(posts)
    }

    /// Slugs of all posts, each once, for route generation.
    pub fn list_slugs(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .list_posts(false)?
            .into_iter()
            .map(|post| post.slug)
            .filter(|slug| seen.insert(slug.clone()))
            .collect())
    }

    /// Canonical-language posts, newest first.
    pub fn ordered_posts(&self, include_body: bool) -> Result<Vec<PostRecord>> {
        let mut posts: Vec<_> = self
            .list_posts(include_body)?
            .into_iter()
            .filter(|post| post.is_canonical(&self.default_lang))
            .collect();
        sort_by_date_desc(&mut posts);
        Ok(posts)
    }

    /// Languages `slug` is translated into, not counting the default language.
    ///
    /// Only file names are consulted.
    pub fn translations(&self, slug: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .post_files()?
            .into_iter()
            .filter(|file| file.slug == slug)
            .filter_map(|file| file.suffix)
            .filter(|suffix| *suffix != self.default_lang)
            .collect())
    }

    /// Translation languages for every slug, from one directory scan.
    pub fn translation_index(&self) -> Result<BTreeMap<String, BTreeSet<String>>> {
        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for file in self.post_files()? {
            if let Some(suffix) = file.suffix
                && suffix != self.default_lang
            {
                index.entry(file.slug).or_default().insert(suffix);
            }
        }
        Ok(index)
    }

    /// `(slug, language)` pairs to render: the default language first, then
    /// each translation, for every canonical post.
    pub fn static_params(&self) -> Result<Vec<(String, String)>> {
        let translations = self.translation_index()?;
        let mut params = Vec::new();
        for post in self.ordered_posts(false)? {
            params.push((post.slug.clone(), self.default_lang.clone()));
            if let Some(langs) = translations.get(&post.slug) {
                params.extend(langs.iter().map(|lang| (post.slug.clone(), lang.clone())));
            }
        }
        Ok(params)
    }

    /// Read one post with its body.
    pub fn get_post(&self, slug: &str, lang: &str) -> Result<PostRecord> {
        if !is_safe_segment(slug) || !is_safe_segment(lang) {
            return Err(StoreError::not_found(slug, lang));
        }

        let path = self
            .dir
            .join(PostPath::file_name(slug, lang, &self.default_lang));
        let post_path = PostPath {
            path,
            slug: slug.to_string(),
            suffix: (lang != self.default_lang).then(|| lang.to_string()),
        };

        if !post_path.path.is_file() {
            return Err(StoreError::not_found(slug, lang));
        }

        self.read_record(&post_path, true)?
            .ok_or_else(|| StoreError::not_found(slug, lang))
    }

    fn read_record(&self, post_path: &PostPath, include_body: bool) -> Result<Option<PostRecord>> {
        let bytes = fs::read(&post_path.path).map_err(|source| StoreError::Io {
            path: post_path.path.clone(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        if matches!(content, Cow::Owned(_)) {
            warn!(path = %post_path.path.display(), "post is not valid UTF-8, replacing bad bytes");
        }

        match PostRecord::parse(&content, post_path, &self.default_lang, include_body) {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                debug!(path = %post_path.path.display(), "no front matter or title, skipping");
                Ok(None)
            }
            Err(e) => {
                warn!(path = %post_path.path.display(), error = %e, "malformed front matter, skipping");
                Ok(None)
            }
        }
    }
}

/// Whether `segment` can be spliced into a file name inside the posts directory.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && !segment.contains("..")
        && !segment.contains(['/', '\\', '\0'])
        && !segment.ends_with(&format!(".{POST_EXTENSION}"))
}

/// Summary of a directory scan, used by validation.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Files that are not published posts.
    pub skipped: Vec<PathBuf>,
    /// Translation files whose default-language post is missing.
    pub orphans: Vec<PathBuf>,
    /// Number of published posts.
    pub posts: usize,
}

impl PostStore {
    /// Scan the directory and report files that will not show up on the site.
    pub fn scan(&self) -> Result<ScanReport> {
        let files = self.post_files()?;
        let mut report = ScanReport::default();
        let mut canonical = HashSet::new();
        let mut translated = Vec::new();

        for post_path in &files {
            match self.read_record(post_path, false)? {
                Some(record) => {
                    report.posts += 1;
                    if record.is_canonical(&self.default_lang) {
                        canonical.insert(record.slug);
                    } else {
                        translated.push(post_path.clone());
                    }
                }
                None => report.skipped.push(post_path.path.clone()),
            }
        }

        report.orphans = translated
            .into_iter()
            .filter(|file| !canonical.contains(&file.slug))
            .map(|file| file.path)
            .collect();

        info!(
            posts = report.posts,
            skipped = report.skipped.len(),
            orphans = report.orphans.len(),
            "scanned posts"
        );
        Ok(report)
    }
}
