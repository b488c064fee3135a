//! End-to-end tests for the post pipeline.
//!
//! Exercise the demo site and a throwaway site built in a temp dir.

use std::{fs, path::Path};

use folio_core::Config;
use folio_generator::{Builder, HtmlGenerator, OgCard, PostStore, RssGenerator, Theme};

const DEMO_DIR: &str = "../../demo";

fn demo() -> Option<(Config, PostStore)> {
    let root = Path::new(DEMO_DIR);
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        // Skip if running from a different working directory
        return None;
    }
    let config = Config::load(&config_path).expect("demo config should load");
    let store = PostStore::from_config(&config, root);
    Some((config, store))
}

#[test]
fn test_demo_posts_are_discovered() {
    let Some((_, store)) = demo() else { return };

    let posts = store.ordered_posts(false).expect("list posts");
    let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, ["typewriter", "hello-world"]);
    assert_eq!(posts[0].date, Some(1_682_899_200_000));

    let translations = store.translations("hello-world").expect("translations");
    assert!(translations.contains("zh"));
}

#[test]
fn test_demo_static_params() {
    let Some((_, store)) = demo() else { return };

    let params = store.static_params().expect("static params");
    assert_eq!(
        params,
        [
            ("typewriter".to_string(), "en".to_string()),
            ("hello-world".to_string(), "en".to_string()),
            ("hello-world".to_string(), "zh".to_string()),
        ]
    );
}

#[test]
fn test_demo_post_renders() {
    let Some((config, store)) = demo() else { return };
    let generator = HtmlGenerator::new(config);

    let post = store.get_post("hello-world", "zh").expect("zh post");
    let translations = store.translations("hello-world").expect("translations");
    let html = generator
        .render_post(&post, &translations, Theme::Dark)
        .expect("render");

    assert!(html.contains("dark-theme"));
    assert!(html.contains("欢迎来到这个博客。"));
    assert!(html.contains(r#"href="/blog/hello-world/en""#));
}

#[test]
fn test_demo_feed() {
    let Some((config, store)) = demo() else { return };
    let generator = HtmlGenerator::new(config);

    let posts = store.ordered_posts(true).expect("posts");
    let xml = RssGenerator::new(generator.config(), generator.markdown()).generate(&posts);

    assert_eq!(xml.matches("<item>").count(), 2);
    assert!(xml.contains("<link>https://folio.app/blog/typewriter</link>"));
    // Translations never appear in the feed.
    assert!(!xml.contains("/blog/hello-world/zh"));
}

#[test]
fn test_demo_og_card() {
    let Some((config, _)) = demo() else { return };
    let svg = OgCard::new(&config, "Building a Typewriter").render();
    assert!(svg.contains("Building a Typewriter"));
    assert!(svg.contains(">folio</tspan>.app"));
}

#[test]
fn test_full_build() {
    let site = tempfile::tempdir().expect("temp site");
    let posts_dir = site.path().join("posts");
    fs::create_dir(&posts_dir).unwrap();

    fs::write(
        site.path().join("config.toml"),
        r#"
[site]
title = "Temp"
base_url = "https://temp.dev"

[home]
snippets = ["One", "Two"]

[rss]
limit = 1
"#,
    )
    .unwrap();
    fs::write(
        posts_dir.join("old.md"),
        "---\ntitle: Old\ndate: 2020-01-01\n---\nOld post.\n",
    )
    .unwrap();
    fs::write(
        posts_dir.join("new.md"),
        "---\ntitle: New\ndate: 2024-01-01\n---\nNew post.\n",
    )
    .unwrap();
    fs::write(
        posts_dir.join("new.ja.md"),
        "---\ntitle: 新しい\ndate: 2024-01-01\n---\n新しい記事。\n",
    )
    .unwrap();
    fs::write(posts_dir.join("draft.md"), "no front matter\n").unwrap();

    let config = Config::load(&site.path().join("config.toml")).unwrap();
    let store = PostStore::from_config(&config, site.path());
    let output = site.path().join("public");

    let stats = Builder::new(HtmlGenerator::new(config), store, &output)
        .build()
        .expect("build");

    assert_eq!(stats.posts, 3);
    assert_eq!(stats.redirects, 2);
    assert!(output.join("blog/new/ja/index.html").exists());
    assert!(!output.join("blog/draft").exists());

    let index = fs::read_to_string(output.join("blog/index.html")).unwrap();
    let new_at = index.find("/blog/new/en").expect("new listed");
    let old_at = index.find("/blog/old/en").expect("old listed");
    assert!(new_at < old_at, "newest post comes first");

    let feed = fs::read_to_string(output.join("blog/rss.xml")).unwrap();
    assert_eq!(feed.matches("<item>").count(), 1);
    assert!(feed.contains("<link>https://temp.dev/blog/new</link>"));
}
