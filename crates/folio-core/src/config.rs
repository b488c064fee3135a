//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Where posts live.
    #[serde(default)]
    pub content: ContentConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// RSS feed settings.
    #[serde(default)]
    pub rss: RssConfig,

    /// Homepage settings.
    #[serde(default)]
    pub home: HomeConfig,

    /// Development server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title, also the suffix of every page title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Language of posts without a language suffix.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,

    /// Site author name.
    #[serde(default)]
    pub author: Option<String>,

    /// Twitter handle for card metadata, including the `@`.
    #[serde(default)]
    pub twitter: Option<String>,

    /// Default social card image.
    #[serde(default)]
    pub image: Option<String>,
}

/// Content location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory holding the markdown posts.
    #[serde(default = "default_posts_dir")]
    pub posts_dir: PathBuf,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Syntax highlighting theme name.
    #[serde(default = "default_syntax_theme")]
    pub syntax_theme: String,
}

/// RSS feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    /// Whether RSS feed is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of items in feed.
    #[serde(default = "default_rss_limit")]
    pub limit: usize,

    /// Channel description. Falls back to the site description.
    #[serde(default)]
    pub description: Option<String>,

    /// Channel image URL.
    #[serde(default)]
    pub image: Option<String>,

    /// Channel copyright line.
    #[serde(default)]
    pub copyright: Option<String>,
}

/// Homepage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Headline shown above the typewriter.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Meta description of the homepage.
    #[serde(default)]
    pub description: Option<String>,

    /// Phrases the typewriter cycles through.
    #[serde(default = "default_snippets")]
    pub snippets: Vec<String>,

    /// Profile links.
    #[serde(default)]
    pub links: Vec<LinkItem>,
}

/// A profile link on the homepage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    /// Accessible title.
    pub title: String,

    /// Icon name.
    #[serde(default)]
    pub icon: Option<String>,

    /// Target URL.
    pub url: String,
}

/// Development server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// File backing the preference store. In-memory when unset.
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,
}

// Default value functions
fn default_language() -> String {
    "en".to_string()
}

fn default_posts_dir() -> PathBuf {
    PathBuf::from("posts")
}

fn default_output_dir() -> String {
    "public".to_string()
}

fn default_syntax_theme() -> String {
    "base16-ocean.dark".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rss_limit() -> usize {
    20
}

fn default_greeting() -> String {
    "Hi there".to_string()
}

fn default_snippets() -> Vec<String> {
    vec!["Welcome".to_string()]
}

fn default_port() -> u16 {
    3000
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            syntax_theme: default_syntax_theme(),
        }
    }
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: default_rss_limit(),
            description: None,
            image: None,
            copyright: None,
        }
    }
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            description: None,
            snippets: default_snippets(),
            links: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            prefs_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            CoreError::Toml(source) => CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                source,
            ),
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration using the config crate, with `FOLIO__*` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.home.snippets.is_empty() {
            return Err(CoreError::config("home.snippets needs at least one phrase"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Resolve the posts directory against the directory holding the config file.
    pub fn posts_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content.posts_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
title = "Test Site"
base_url = "https://example.com"
default_language = "en"
twitter = "@someone"

[content]
posts_dir = "data/posts"

[build]
output_dir = "dist"
syntax_theme = "InspiredGitHub"

[rss]
limit = 15
copyright = "All rights reserved"

[home]
greeting = "Hi, I'm Test"
snippets = ["Engineer", "Writer"]

[[home.links]]
title = "GitHub"
icon = "github"
url = "https://github.com/test"

[server]
port = 8080
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.site.base_url, "https://example.com");
        assert_eq!(config.site.twitter.as_deref(), Some("@someone"));
        assert_eq!(config.content.posts_dir, PathBuf::from("data/posts"));
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.build.syntax_theme, "InspiredGitHub");
        assert_eq!(config.rss.limit, 15);
        assert_eq!(config.rss.copyright.as_deref(), Some("All rights reserved"));
        assert_eq!(config.home.snippets, vec!["Engineer", "Writer"]);
        assert_eq!(config.home.links.len(), 1);
        assert_eq!(config.home.links[0].icon.as_deref(), Some("github"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        let minimal_config = r#"
[site]
title = "Minimal Site"
base_url = "https://example.com"
"#;
        std::fs::write(&config_path, minimal_config).expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.default_language, "en");
        assert_eq!(config.content.posts_dir, PathBuf::from("posts"));
        assert_eq!(config.build.output_dir, "public");
        assert!(config.rss.enabled);
        assert_eq!(config.rss.limit, 20);
        assert_eq!(config.home.snippets.len(), 1);
        assert_eq!(config.server.port, 3000);
        assert!(config.server.prefs_path.is_none());
    }

    #[test]
    fn test_url_for() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        let config_content = r#"
[site]
title = "Test"
base_url = "https://example.com"
"#;
        std::fs::write(&config_path, config_content).expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.url_for("/blog/hello"), "https://example.com/blog/hello");
        assert_eq!(config.url_for("blog/hello"), "https://example.com/blog/hello");
    }

    #[test]
    fn test_config_validation_empty_title() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        let config_content = r#"
[site]
title = ""
base_url = "https://example.com"
"#;
        std::fs::write(&config_path, config_content).expect("write");

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("title cannot be empty")
        );
    }

    #[test]
    fn test_config_validation_empty_snippets() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        let config_content = r#"
[site]
title = "T"
base_url = "https://example.com"

[home]
snippets = []
"#;
        std::fs::write(&config_path, config_content).expect("write");

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("home.snippets"));
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_load_with_env() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, create_test_config()).expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");
        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.home.snippets, vec!["Engineer", "Writer"]);
    }
}
