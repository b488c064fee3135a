//! folio generator library
//!
//! Turns a directory of markdown posts into the pages of a personal site.
//!
//! # Modules
//!
//! - [`store`] - post discovery, translations and lookup
//! - [`template`] - HTML template system with variable interpolation
//! - [`html`] - page rendering
//! - [`meta`] - title, Open Graph and Twitter card metadata
//! - [`og`] - social card images
//! - [`rss`] - RSS feed generation
//! - [`build`] - static build orchestration

pub mod build;
pub mod html;
pub mod meta;
pub mod og;
pub mod rss;
pub mod store;
pub mod template;

pub use build::{BuildStats, Builder};
pub use html::{ButtonTarget, HtmlGenerator, HtmlTag, Theme};
pub use meta::PageMeta;
pub use og::{OgCard, OgError};
pub use rss::RssGenerator;
pub use store::{PostStore, StoreError};
pub use template::{Template, TemplateContext, TemplateRegistry};

#[cfg(test)]
pub(crate) fn test_config() -> folio_core::Config {
    folio_core::Config::parse(
        r#"
[site]
title = "Cyandev"
base_url = "https://example.app"
description = "Personal site"
twitter = "unixzii"

[home]
greeting = "Hi, I'm Cyandev"
snippets = ["Engineer", "Writer"]

[[home.links]]
title = "GitHub"
icon = "github"
url = "https://github.com/example"

[[home.links]]
title = "Blog"
url = "/blog"
"#,
    )
    .expect("test config")
}
