//! Page metadata: `<title>`, description, Open Graph and Twitter card tags.

use std::fmt::Write as _;

use folio_core::Config;
use folio_parser::html_escape;

/// Route serving generated Open Graph images.
pub const OG_ROUTE: &str = "/api/og";

/// Absolute URL of the generated social card for `title`.
pub fn og_image_url(config: &Config, title: &str) -> String {
    format!(
        "{}?title={}",
        config.url_for(OG_ROUTE),
        urlencoding::encode(title)
    )
}

/// Path of a post page in one language. Segments are percent-encoded.
pub fn post_path(slug: &str, lang: &str) -> String {
    format!(
        "/blog/{}/{}",
        urlencoding::encode(slug),
        urlencoding::encode(lang)
    )
}

/// Public path of a post: the default language is addressed as `/blog/{slug}`.
pub fn share_path(slug: &str, lang: &str, default_lang: &str) -> String {
    if lang == default_lang {
        format!("/blog/{}", urlencoding::encode(slug))
    } else {
        post_path(slug, lang)
    }
}

/// Metadata for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    /// Full document title, site name included.
    pub title: String,
    /// Route title without the site suffix.
    pub og_title: String,
    /// Site name.
    pub site_name: String,
    /// Page description.
    pub description: Option<String>,
    /// Canonical absolute URL.
    pub url: String,
    /// Social card image.
    pub image: Option<String>,
    /// Twitter handle, `@` included.
    pub twitter: Option<String>,
    /// Open Graph type.
    pub kind: &'static str,
    /// Content language.
    pub locale: String,
}

impl PageMeta {
    /// Metadata for the page at `path`.
    ///
    /// With a route title the document title becomes `"{title} | {site}"`,
    /// otherwise just the site name.
    pub fn new(config: &Config, title: Option<&str>, path: &str) -> Self {
        let site = &config.site;
        let title = title.filter(|t| !t.is_empty());

        Self {
            title: match title {
                Some(title) => format!("{title} | {}", site.title),
                None => site.title.clone(),
            },
            og_title: title.unwrap_or(&site.title).to_string(),
            site_name: site.title.clone(),
            description: site.description.clone(),
            url: config.url_for(path),
            image: site.image.clone(),
            twitter: site.twitter.as_deref().map(twitter_handle),
            kind: "website",
            locale: site.default_language.clone(),
        }
    }

    /// Override the description. Empty strings are ignored.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }

    /// Set the social card image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Mark the page as an article in `locale`.
    #[must_use]
    pub fn article(mut self, locale: &str) -> Self {
        self.kind = "article";
        self.locale = locale.to_string();
        self
    }

    /// Twitter card type.
    pub fn card(&self) -> &'static str {
        if self.image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        }
    }

    /// Render as `<head>` markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let mut tag = |attr: &str, key: &str, value: &str| {
            let _ = writeln!(
                out,
                r#"    <meta {attr}="{key}" content="{}">"#,
                html_escape(value)
            );
        };

        if let Some(description) = &self.description {
            tag("name", "description", description);
        }
        tag("property", "og:title", &self.og_title);
        if let Some(description) = &self.description {
            tag("property", "og:description", description);
        }
        tag("property", "og:url", &self.url);
        tag("property", "og:site_name", &self.site_name);
        tag("property", "og:locale", &self.locale);
        tag("property", "og:type", self.kind);
        if let Some(image) = &self.image {
            tag("property", "og:image", image);
        }
        tag("name", "twitter:card", self.card());
        tag("name", "twitter:title", &self.og_title);
        if let Some(description) = &self.description {
            tag("name", "twitter:description", description);
        }
        if let Some(handle) = &self.twitter {
            tag("name", "twitter:site", handle);
            tag("name", "twitter:creator", handle);
        }
        if let Some(image) = &self.image {
            tag("name", "twitter:image", image);
        }

        format!(
            "<title>{}</title>\n    <link rel=\"canonical\" href=\"{}\">\n{out}",
            html_escape(&self.title),
            html_escape(&self.url),
        )
    }
}

fn twitter_handle(name: &str) -> String {
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        crate::test_config()
    }

    #[test]
    fn test_title_suffix() {
        let config = config();
        assert_eq!(PageMeta::new(&config, Some("Blog"), "/blog").title, "Blog | Cyandev");
        assert_eq!(PageMeta::new(&config, None, "/").title, "Cyandev");
        assert_eq!(PageMeta::new(&config, Some(""), "/").title, "Cyandev");
    }

    #[test]
    fn test_card_depends_on_image() {
        let config = config();
        let meta = PageMeta::new(&config, Some("Post"), "/blog/post/en");
        assert_eq!(meta.card(), "summary");

        let meta = meta.with_image(og_image_url(&config, "Post"));
        assert_eq!(meta.card(), "summary_large_image");
    }

    #[test]
    fn test_og_image_url_is_encoded() {
        let config = config();
        assert_eq!(
            og_image_url(&config, "Hello World & more"),
            "https://example.app/api/og?title=Hello%20World%20%26%20more"
        );
    }

    #[test]
    fn test_post_paths() {
        assert_eq!(post_path("hello", "en"), "/blog/hello/en");
        assert_eq!(post_path("a b#1", "zh"), "/blog/a%20b%231/zh");
        assert_eq!(share_path("hello", "en", "en"), "/blog/hello");
        assert_eq!(share_path("hello", "zh", "en"), "/blog/hello/zh");
    }

    #[test]
    fn test_to_html() {
        let config = config();
        let html = PageMeta::new(&config, Some("A <b> post"), "/blog/a/en")
            .with_description("About things")
            .article("zh")
            .to_html();

        assert!(html.contains("<title>A &lt;b&gt; post | Cyandev</title>"));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(html.contains(r#"<meta property="og:locale" content="zh">"#));
        assert!(html.contains(r#"<meta name="description" content="About things">"#));
        assert!(html.contains(r#"<meta name="twitter:site" content="@unixzii">"#));
        assert!(html.contains(r#"<link rel="canonical" href="https://example.app/blog/a/en">"#));
    }
}
