//! Build command - renders the site to static files

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use folio_generator::{Builder, HtmlGenerator, PostStore};

use super::check::quick_validate;
use crate::config_root;

/// Run the build command.
///
/// `output` overrides `build.output_dir` from the configuration.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?output, "Starting build");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let root = config_root(config_path);

    let store = PostStore::from_config(&config, root);
    let warnings = quick_validate(&store);
    if !warnings.is_empty() {
        println!();
        println!("  Warnings:");
        for warn in &warnings {
            println!("  ⚠ {warn}");
        }
        println!();
    }

    let output = output.map_or_else(|| root.join(&config.build.output_dir), Path::to_path_buf);
    tracing::debug!(?config, "Loaded configuration");

    let builder = Builder::new(HtmlGenerator::new(config), store, &output);
    let stats = builder.build().wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:      {}", stats.pages);
    println!("  Posts:      {}", stats.posts);
    println!("  Redirects:  {}", stats.redirects);
    println!("  Feed:       {}", if stats.feed { "yes" } else { "no" });
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}
