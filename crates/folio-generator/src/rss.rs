//! RSS feed generation.
//!
//! One RSS 2.0 channel for the blog, built from canonical posts with their
//! rendered HTML in `content:encoded`.

use std::collections::BTreeMap;

use chrono::Utc;
use folio_core::{Config, PostRecord, date::from_millis};
use folio_parser::MarkdownRenderer;
use rss::{ChannelBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};
use tracing::debug;

use crate::meta::share_path;

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

/// Canonical URL of a post page.
pub fn post_url(config: &Config, slug: &str, lang: &str) -> String {
    config.url_for(&share_path(slug, lang, &config.site.default_language))
}

/// RSS feed generator.
#[derive(Debug)]
pub struct RssGenerator<'a> {
    config: &'a Config,
    markdown: &'a MarkdownRenderer,
}

impl<'a> RssGenerator<'a> {
    /// Create a generator.
    #[must_use]
    pub fn new(config: &'a Config, markdown: &'a MarkdownRenderer) -> Self {
        Self { config, markdown }
    }

    /// Feed title.
    pub fn title(&self) -> String {
        match &self.config.site.author {
            Some(author) => format!("{author}'s Blog"),
            None => format!("{}'s Blog", self.config.site.title),
        }
    }

    /// Generate the feed XML from posts in display order.
    ///
    /// At most `rss.limit` posts are included.
    pub fn generate(&self, posts: &[PostRecord]) -> String {
        let limit = self.config.rss.limit;
        let items: Vec<Item> = posts
            .iter()
            .take(limit)
            .map(|post| self.post_to_item(post))
            .collect();

        debug!(count = items.len(), limit, "generating RSS feed");

        let site = &self.config.site;
        let link = self.config.url_for("/blog");
        let title = self.title();

        let image = self
            .config
            .rss
            .image
            .as_ref()
            .or(site.image.as_ref())
            .map(|url| {
                ImageBuilder::default()
                    .url(url.clone())
                    .title(title.clone())
                    .link(link.clone())
                    .build()
            });

        let copyright = self.config.rss.copyright.clone().or_else(|| {
            site.author
                .as_ref()
                .map(|author| format!("All rights reserved {author}"))
        });

        let channel = ChannelBuilder::default()
            .namespaces(BTreeMap::from([(
                "content".to_string(),
                CONTENT_NAMESPACE.to_string(),
            )]))
            .title(title)
            .link(link)
            .description(
                self.config
                    .rss
                    .description
                    .as_deref()
                    .or(site.description.as_deref())
                    .unwrap_or(&site.title)
                    .to_string(),
            )
            .language(Some(site.default_language.clone()))
            .copyright(copyright)
            .image(image)
            .generator(Some("folio".to_string()))
            .last_build_date(Some(Utc::now().to_rfc2822()))
            .items(items)
            .build();

        channel.to_string()
    }

    fn post_to_item(&self, post: &PostRecord) -> Item {
        let url = post_url(self.config, &post.slug, &post.language);
        let guid = GuidBuilder::default().value(url.clone()).permalink(true).build();

        let mut builder = ItemBuilder::default();
        builder.title(Some(post.title.clone()));
        builder.link(Some(url));
        builder.guid(Some(guid));

        if !post.description.is_empty() {
            builder.description(Some(post.description.clone()));
        }

        if let Some(date) = post.date.and_then(from_millis) {
            builder.pub_date(Some(date.to_rfc2822()));
        }

        if !post.tag.is_empty() {
            builder.categories(vec![rss::Category {
                name: post.tag.clone(),
                domain: None,
            }]);
        }

        if let Some(body) = &post.body {
            builder.content(Some(self.markdown.render(body)));
        }

        builder.build()
    }
}
