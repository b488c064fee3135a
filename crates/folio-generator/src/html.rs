//! HTML page generation.
//!
//! Every page is a body template wrapped in the `base` shell, which carries the
//! metadata block and the theme class.

use std::collections::BTreeSet;

use folio_core::{Config, PostRecord, config::LinkItem, date::format_human};
use folio_parser::{MarkdownRenderer, html_escape};
use thiserror::Error;
use tracing::debug;

use crate::{
    meta::{PageMeta, og_image_url, post_path, share_path},
    rss::post_url,
    template::{TemplateContext, TemplateError, TemplateRegistry},
};

/// Links shown inline on the home page; the rest go into the overflow menu.
pub const INLINE_LINKS: usize = 3;

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// Colour scheme, stored under the `uiStyle` preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// Light scheme.
    #[default]
    Default,
    /// Dark scheme.
    Dark,
}

impl Theme {
    /// Theme for a stored preference value. Unknown values fall back to the default.
    pub fn from_pref(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Default,
        }
    }

    /// Preference value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
        }
    }

    /// Class applied to the root element.
    pub fn class(self) -> &'static str {
        match self {
            Self::Default => "default-theme",
            Self::Dark => "dark-theme",
        }
    }
}

/// Element a non-link button renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTag {
    Button,
    Summary,
    Span,
}

impl HtmlTag {
    fn name(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Summary => "summary",
            Self::Span => "span",
        }
    }
}

/// What a button renders as: a link or a plain element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTarget<'a> {
    Link { href: &'a str },
    Tag(HtmlTag),
}

/// Render a button. `label` is already HTML.
pub fn render_button(target: ButtonTarget<'_>, label: &str) -> String {
    match target {
        ButtonTarget::Link { href } if href.starts_with('/') => {
            format!(r#"<a class="button" href="{}">{label}</a>"#, html_escape(href))
        }
        ButtonTarget::Link { href } => format!(
            r#"<a class="button" href="{}" target="_blank" rel="noopener noreferrer">{label}</a>"#,
            html_escape(href)
        ),
        ButtonTarget::Tag(HtmlTag::Button) => {
            format!(r#"<button class="button" type="button">{label}</button>"#)
        }
        ButtonTarget::Tag(tag) => {
            let name = tag.name();
            format!(r#"<{name} class="button">{label}</{name}>"#)
        }
    }
}

/// Split home links into the inline ones and the overflow.
pub fn split_links(links: &[LinkItem]) -> (&[LinkItem], &[LinkItem]) {
    links.split_at(links.len().min(INLINE_LINKS))
}

/// Display name of a language code.
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "zh" | "zh-CN" | "zh_CN" => "简体中文",
        "zh-TW" | "zh_TW" => "繁體中文",
        "ja" => "日本語",
        "ko" => "한국어",
        "fr" => "Français",
        "de" => "Deutsch",
        "es" => "Español",
        other => other,
    }
}

/// HTML page generator.
#[derive(Debug)]
pub struct HtmlGenerator {
    config: Config,
    markdown: MarkdownRenderer,
    templates: TemplateRegistry,
}

impl HtmlGenerator {
    /// Create a generator, highlighting code with the configured theme.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let markdown = MarkdownRenderer::with_theme(&config.build.syntax_theme);
        Self::with_templates(config, markdown, TemplateRegistry::new())
    }

    /// Create a generator with custom templates.
    #[must_use]
    pub fn with_templates(config: Config, markdown: MarkdownRenderer, templates: TemplateRegistry) -> Self {
        Self {
            config,
            markdown,
            templates,
        }
    }

    /// Site configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Markdown renderer shared with feed generation.
    pub fn markdown(&self) -> &MarkdownRenderer {
        &self.markdown
    }

    /// Landing page.
    pub fn render_home(&self, theme: Theme) -> Result<String> {
        let home = &self.config.home;
        let snippet = home.snippets.first().map(String::as_str).unwrap_or_default();

        let mut meta = PageMeta::new(&self.config, None, "/");
        if meta.image.is_none() {
            meta = meta.with_image(og_image_url(&self.config, &self.config.site.title));
        }
        if let Some(description) = &home.description {
            meta = meta.with_description(description);
        }

        let ctx = TemplateContext::new()
            .with_var("greeting", html_escape(&home.greeting))
            .with_var("snippet", html_escape(snippet))
            .with_opt("description", home.description.as_deref().map(html_escape))
            .with_var("links", links_html(&home.links));
        let content = self.templates.render("home", &ctx)?;

        self.wrap(&meta, &self.config.site.default_language, theme, &content)
    }

    /// Blog index listing `posts` in the given order.
    pub fn render_blog_index(&self, posts: &[PostRecord], theme: Theme) -> Result<String> {
        debug!(count = posts.len(), "rendering blog index");
        let default_lang = &self.config.site.default_language;

        let items: String = posts
            .iter()
            .map(|post| post_list_item(post, default_lang))
            .collect();

        let meta = PageMeta::new(&self.config, Some("Blog"), "/blog")
            .with_image(og_image_url(&self.config, "Blog"));
        let ctx = TemplateContext::new()
            .with_var("title", "Blog")
            .with_var("items", items);
        let content = self.templates.render("blog_index", &ctx)?;

        self.wrap(&meta, default_lang, theme, &content)
    }

    /// A single post in one language.
    ///
    /// `translations` are the non-default languages the post exists in; the
    /// language switcher is shown only when there is at least one.
    pub fn render_post(
        &self,
        post: &PostRecord,
        translations: &BTreeSet<String>,
        theme: Theme,
    ) -> Result<String> {
        debug!(slug = %post.slug, lang = %post.language, "rendering post");

        let path = share_path(&post.slug, &post.language, &self.config.site.default_language);
        let meta = PageMeta::new(&self.config, Some(&post.title), &path)
            .with_description(&post.description)
            .with_image(og_image_url(&self.config, &post.title))
            .article(&post.language);

        let body = post
            .body
            .as_deref()
            .map(|body| self.markdown.render(body))
            .unwrap_or_default();

        let ctx = TemplateContext::new()
            .with_var("title", html_escape(&post.title))
            .with_var("meta", post_meta_html(post))
            .with_opt("languages", self.language_switcher(post, translations))
            .with_var("content", body)
            .with_var("share_url", html_escape(&self.share_url(post)));
        let content = self.templates.render("post", &ctx)?;

        self.wrap(&meta, &post.language, theme, &content)
    }

    /// 404 page.
    pub fn render_not_found(&self, theme: Theme) -> Result<String> {
        let meta = PageMeta::new(&self.config, Some("Not Found"), "/404");
        let content = self.templates.render("not_found", &TemplateContext::new())?;
        self.wrap(&meta, &self.config.site.default_language, theme, &content)
    }

    /// Redirect page for static hosting.
    pub fn render_redirect(&self, url: &str) -> Result<String> {
        let ctx = TemplateContext::new().with_var("redirect_url", html_escape(url));
        Ok(self.templates.render("redirect", &ctx)?)
    }

    /// Twitter intent URL sharing `post`.
    pub fn share_url(&self, post: &PostRecord) -> String {
        let url = post_url(&self.config, &post.slug, &post.language);
        format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            urlencoding::encode(&post.title),
            urlencoding::encode(&url)
        )
    }

    fn language_switcher(&self, post: &PostRecord, translations: &BTreeSet<String>) -> Option<String> {
        if translations.is_empty() {
            return None;
        }

        let default_lang = &self.config.site.default_language;
        let links = std::iter::once(default_lang)
            .chain(translations.iter())
            .map(|lang| {
                let name = html_escape(language_name(lang));
                if *lang == post.language {
                    format!(r#"<span class="current">{name}</span>"#)
                } else {
                    format!(
                        r#"<a href="{}" hreflang="{}">{name}</a>"#,
                        post_path(&post.slug, lang),
                        html_escape(lang)
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n        ");
        Some(links)
    }

    fn wrap(&self, meta: &PageMeta, lang: &str, theme: Theme, content: &str) -> Result<String> {
        let ctx = TemplateContext::new()
            .with_var("lang", html_escape(lang))
            .with_var("theme_class", theme.class())
            .with_var("head", meta.to_html())
            .with_var("site_title", html_escape(&self.config.site.title))
            .with_var("content", content);
        Ok(self.templates.render("base", &ctx)?)
    }
}

fn link_label(link: &LinkItem) -> String {
    let icon = link
        .icon
        .as_deref()
        .map(|icon| format!(r#"<span class="icon icon-{}" aria-hidden="true"></span>"#, html_escape(icon)))
        .unwrap_or_default();
    format!("{icon}{}", html_escape(&link.title))
}

fn links_html(links: &[LinkItem]) -> String {
    let (inline, overflow) = split_links(links);
    let mut out: Vec<String> = inline
        .iter()
        .map(|link| {
            let button = render_button(ButtonTarget::Link { href: &link.url }, &link_label(link));
            format!("        <li>{button}</li>")
        })
        .collect();

    if !overflow.is_empty() {
        let items: String = overflow
            .iter()
            .map(|link| render_button(ButtonTarget::Link { href: &link.url }, &link_label(link)))
            .collect();
        let toggle = render_button(ButtonTarget::Tag(HtmlTag::Summary), "More");
        out.push(format!(
            r#"        <li><details>{toggle}<div class="menu">{items}</div></details></li>"#
        ));
    }

    out.join("\n")
}

fn post_meta_html(post: &PostRecord) -> String {
    let mut parts = Vec::new();
    if !post.tag.is_empty() {
        parts.push(format!(r#"<span class="tag">#{}</span>"#, html_escape(&post.tag)));
    }
    if let Some(date) = post.date
        && let Some(dt) = folio_core::date::from_millis(date)
    {
        parts.push(format!(
            r#"<time datetime="{}">{}</time>"#,
            dt.format("%Y-%m-%d"),
            format_human(date)
        ));
    }
    parts.join(" ")
}

fn post_list_item(post: &PostRecord, default_lang: &str) -> String {
    let mut item = format!(
        r#"        <li><a href="{}">{}</a>"#,
        post_path(&post.slug, default_lang),
        html_escape(&post.title)
    );
    if !post.description.is_empty() {
        item.push_str(&format!("<p>{}</p>", html_escape(&post.description)));
    }
    let meta = post_meta_html(post);
    if !meta.is_empty() {
        item.push_str(&format!(r#"<p class="meta">{meta}</p>"#));
    }
    item.push_str("</li>\n");
    item
}
