//! Check command - validate configuration and posts

use std::{fs, path::Path};

use color_eyre::eyre::{Result, bail};
use folio_core::{Config, date::normalize_date, frontmatter::parse_frontmatter};
use folio_generator::PostStore;

use crate::config_root;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration and every post file. With `strict`, warnings
/// fail the check too.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and posts");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(ref cfg) = config {
        let root = config_root(config_path);
        let store = PostStore::from_config(cfg, root);

        println!("\nChecking posts...");
        validate_posts(&store, &mut result);

        println!("\nChecking translations...");
        validate_translations(&store, &mut result);

        println!("\nChecking configuration values...");
        check_config_values(cfg, root, &mut result);
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Quick validation for build/serve.
///
/// Returns warnings for translations that have no default-language post.
/// Directory errors are left for the command itself to report.
pub fn quick_validate(store: &PostStore) -> Vec<String> {
    match store.scan() {
        Ok(report) => report
            .orphans
            .iter()
            .map(|path| orphan_warning(path, store.default_lang()))
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn orphan_warning(path: &Path, default_lang: &str) -> String {
    format!(
        "{}: translation without a {default_lang} post, it will not be listed",
        path.display()
    )
}

/// Parse every post file and report what will not be published.
fn validate_posts(store: &PostStore, result: &mut ValidationResult) {
    let files = match store.post_files() {
        Ok(files) => files,
        Err(e) => {
            result.add_error(e.to_string());
            println!("  ✗ {e}");
            return;
        }
    };

    let mut published = 0;
    let mut failed = 0;

    for post_path in &files {
        let path = &post_path.path;
        let content = match fs::read(path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(c) => c,
                Err(e) => {
                    result.add_warning(format!(
                        "{}: not valid UTF-8, bad bytes will be replaced",
                        path.display()
                    ));
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            },
            Err(e) => {
                result.add_error(format!("{}: Failed to read file: {e}", path.display()));
                failed += 1;
                continue;
            }
        };

        match parse_frontmatter(&content, path) {
            Err(e) => {
                result.add_error(format!("{}: {e}", path.display()));
                failed += 1;
            }
            Ok(None) => {
                result.add_warning(format!("{}: no front matter, not a post", path.display()));
            }
            Ok(Some((frontmatter, _))) => {
                if frontmatter.title().is_none() {
                    result.add_warning(format!("{}: no title, not a post", path.display()));
                    continue;
                }
                if let Some(raw) = &frontmatter.date
                    && normalize_date(raw).is_none()
                {
                    result.add_warning(format!(
                        "{}: unrecognised date {raw:?}, post will be listed last",
                        path.display()
                    ));
                }
                published += 1;
            }
        }
    }

    if failed == 0 {
        println!("  ✓ {published} of {} files are published posts", files.len());
    } else {
        println!("  ✗ {failed}/{} post files have errors", files.len());
    }
}

fn validate_translations(store: &PostStore, result: &mut ValidationResult) {
    let Ok(report) = store.scan() else {
        return;
    };

    if report.orphans.is_empty() {
        println!("  ✓ Every translation has a {} post", store.default_lang());
    }
    for path in &report.orphans {
        result.add_warning(orphan_warning(path, store.default_lang()));
    }

    if let Ok(index) = store.translation_index() {
        let translated: usize = index.values().map(|langs| langs.len()).sum();
        println!(
            "  ℹ {translated} translation(s) across {} post(s)",
            index.len()
        );
    }
}

/// Check configuration values for common issues.
fn check_config_values(config: &Config, root: &Path, result: &mut ValidationResult) {
    if !config.site.base_url.starts_with("http") {
        result.add_warning("site.base_url should start with http:// or https://");
    }
    if config.site.base_url.ends_with('/') {
        result.add_warning("site.base_url should not end with a slash");
    }

    if config.rss.enabled && config.rss.limit == 0 {
        result.add_warning("rss.limit is 0, the feed will be empty");
    }

    if config.site.twitter.is_none() {
        result.add_warning("site.twitter is not set, cards carry no twitter:site");
    }

    let output = root.join(&config.build.output_dir);
    if output.exists() && !output.is_dir() {
        result.add_error(format!(
            "Output path exists but is not a directory: {}",
            output.display()
        ));
    }

    if !result.has_errors() {
        println!("  ✓ Configuration values look fine");
    }
}
