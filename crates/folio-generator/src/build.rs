//! Static build orchestration.
//!
//! Renders every route to a directory tree that any static file server can
//! host: `/blog/{slug}/{lang}` becomes `blog/{slug}/{lang}/index.html`.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use folio_core::PostRecord;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    html::{HtmlError, HtmlGenerator, Theme},
    meta::post_path,
    rss::RssGenerator,
    store::{PostStore, StoreError},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Post store error.
    #[error("post store error: {0}")]
    Store(#[from] StoreError),

    /// HTML generation error.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Pages written, redirects excluded.
    pub pages: usize,

    /// Post pages written, translations included.
    pub posts: usize,

    /// Redirect pages written.
    pub redirects: usize,

    /// Whether the RSS feed was written.
    pub feed: bool,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Site builder.
#[derive(Debug)]
pub struct Builder {
    generator: HtmlGenerator,
    store: PostStore,
    output_dir: PathBuf,
}

impl Builder {
    /// Create a builder.
    #[must_use]
    pub fn new(generator: HtmlGenerator, store: PostStore, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            store,
            output_dir: output_dir.into(),
        }
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Execute the full build.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(
            posts = %self.store.dir().display(),
            output = %self.output_dir.display(),
            "starting build"
        );

        self.clean_output()?;

        let ordered = self.store.ordered_posts(true)?;

        self.write("index.html", &self.generator.render_home(Theme::Default)?)?;
        self.write(
            "blog/index.html",
            &self.generator.render_blog_index(&ordered, Theme::Default)?,
        )?;
        self.write("404.html", &self.generator.render_not_found(Theme::Default)?)?;
        stats.pages = 3;

        stats.posts = self.generate_posts()?;
        stats.pages += stats.posts;
        stats.redirects = self.generate_redirects(&ordered)?;

        if self.generator.config().rss.enabled {
            let feed = RssGenerator::new(self.generator.config(), self.generator.markdown())
                .generate(&ordered);
            self.write("blog/rss.xml", &feed)?;
            stats.feed = true;
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pages = stats.pages,
            posts = stats.posts,
            redirects = stats.redirects,
            feed = stats.feed,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    fn clean_output(&self) -> Result<()> {
        let io_error = |source| BuildError::Io {
            path: self.output_dir.clone(),
            source,
        };
        if self.output_dir.exists() {
            debug!(dir = %self.output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.output_dir).map_err(io_error)?;
        }
        fs::create_dir_all(&self.output_dir).map_err(io_error)
    }

    /// Render every `(slug, language)` pair in parallel.
    fn generate_posts(&self) -> Result<usize> {
        let params = self.store.static_params()?;
        let translations = self.store.translation_index()?;
        let none = BTreeSet::new();

        info!(count = params.len(), "generating post pages");

        let written: Vec<bool> = params
            .par_iter()
            .map(|(slug, lang)| {
                let post = match self.store.get_post(slug, lang) {
                    Ok(post) => post,
                    Err(e) if e.is_not_found() => {
                        warn!(%slug, %lang, "post vanished during build, skipping");
                        return Ok(false);
                    }
                    Err(e) => return Err(e.into()),
                };
                let langs = translations.get(slug).unwrap_or(&none);
                let html = self.generator.render_post(&post, langs, Theme::Default)?;
                self.write(&format!("blog/{slug}/{lang}/index.html"), &html)?;
                Ok(true)
            })
            .collect::<Result<_>>()?;

        Ok(written.into_iter().filter(|w| *w).count())
    }

    /// `/blog/{slug}` forwards to the default-language page.
    fn generate_redirects(&self, posts: &[PostRecord]) -> Result<usize> {
        let default_lang = &self.generator.config().site.default_language;
        for post in posts {
            let target = post_path(&post.slug, default_lang);
            let html = self.generator.render_redirect(&target)?;
            self.write(&format!("blog/{}/index.html", post.slug), &html)?;
        }
        Ok(posts.len())
    }

    fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.output_dir.join(relative);
        let io_error = |source| BuildError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&path, content).map_err(io_error)?;
        debug!(path = %path.display(), "wrote file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn builder(posts: &Path, output: &Path) -> Builder {
        let config = crate::test_config();
        let store = PostStore::new(posts, config.site.default_language.clone());
        Builder::new(HtmlGenerator::new(config), store, output)
    }

    #[test]
    fn test_build_empty_site() {
        let posts = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let stats = builder(posts.path(), output.path()).build().unwrap();

        assert_eq!(stats.pages, 3);
        assert_eq!(stats.posts, 0);
        assert!(stats.feed);
        assert!(output.path().join("index.html").exists());
        assert!(output.path().join("blog/index.html").exists());
        assert!(output.path().join("blog/rss.xml").exists());
    }

    #[test]
    fn test_build_with_translations() {
        let posts = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(
            posts.path().join("hello.md"),
            "---\ntitle: Hello\ndate: 2023-01-01\n---\nHello, world!\n",
        )
        .unwrap();
        fs::write(
            posts.path().join("hello.zh.md"),
            "---\ntitle: 你好\ndate: 2023-01-01\n---\n你好，世界！\n",
        )
        .unwrap();

        let stats = builder(posts.path(), output.path()).build().unwrap();

        assert_eq!(stats.posts, 2);
        assert_eq!(stats.redirects, 1);
        let en = fs::read_to_string(output.path().join("blog/hello/en/index.html")).unwrap();
        assert!(en.contains("Hello, world!"));
        let zh = fs::read_to_string(output.path().join("blog/hello/zh/index.html")).unwrap();
        assert!(zh.contains("你好，世界！"));
        let redirect = fs::read_to_string(output.path().join("blog/hello/index.html")).unwrap();
        assert!(redirect.contains("/blog/hello/en"));
    }

    #[test]
    fn test_build_cleans_output() {
        let posts = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(output.path().join("stale.html"), "old").unwrap();

        builder(posts.path(), output.path()).build().unwrap();
        assert!(!output.path().join("stale.html").exists());
    }

    #[test]
    fn test_build_missing_posts_dir_fails() {
        let output = TempDir::new().unwrap();
        let result = builder(Path::new("/nonexistent/posts"), output.path()).build();
        assert!(matches!(result, Err(BuildError::Store(StoreError::Directory { .. }))));
    }
}
