//! HTML templates.
//!
//! Plain string interpolation: `{{ name }}` is required, `{{ name? }}` may be
//! absent. Values are inserted verbatim, so callers escape text themselves.

use std::collections::HashMap;

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Variables available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert that skips `None`.
    #[must_use]
    pub fn with_opt(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Get a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A named template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a template.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render with `context`.
    ///
    /// Substituted values are never rescanned for placeholders.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| TemplateError::InvalidSyntax("unclosed {{ delimiter".to_string()))?;

            let var_name = after[..end].trim();
            let (var_name, optional) = match var_name.strip_suffix('?') {
                Some(stripped) => (stripped.trim_end(), true),
                None => (var_name, false),
            };

            match context.get(var_name) {
                Some(value) => out.push_str(value),
                None if optional => {}
                None => return Err(TemplateError::MissingVariable(var_name.to_string())),
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Templates by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a registry holding the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register(Template::new("base", BASE_TEMPLATE));
        registry.register(Template::new("home", HOME_TEMPLATE));
        registry.register(Template::new("blog_index", BLOG_INDEX_TEMPLATE));
        registry.register(Template::new("post", POST_TEMPLATE));
        registry.register(Template::new("not_found", NOT_FOUND_TEMPLATE));
        registry.register(Template::new("redirect", REDIRECT_TEMPLATE));
        registry
    }

    /// Register or replace a template.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render a named template.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        self.get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?
            .render(context)
    }
}

/// Page shell.
pub const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}" class="{{ theme_class }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {{ head }}
    <link rel="alternate" type="application/rss+xml" title="{{ site_title }}" href="/blog/rss.xml">
    <style>
        :root {
            --color-bg: #ffffff;
            --color-text: #111111;
            --color-muted: #666666;
            --color-border: #e5e5e5;
            --color-accent: #0070f3;
            --color-code-bg: #f5f5f5;
            color-scheme: light;
        }

        .dark-theme {
            --color-bg: #000000;
            --color-text: #ededed;
            --color-muted: #888888;
            --color-border: #333333;
            --color-accent: #3291ff;
            --color-code-bg: #111111;
            color-scheme: dark;
        }

        *, *::before, *::after { box-sizing: border-box; }

        body {
            margin: 0;
            font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
            line-height: 1.7;
            color: var(--color-text);
            background-color: var(--color-bg);
        }

        a { color: var(--color-accent); text-decoration: none; }
        a:hover { text-decoration: underline; }

        .container { max-width: 720px; margin: 0 auto; padding: 3rem 1.5rem; }

        header.site nav { display: flex; gap: 1.25rem; align-items: center; margin-bottom: 3rem; }
        header.site nav a { color: var(--color-muted); }
        header.site .theme-toggle { margin-left: auto; }

        .button {
            display: inline-flex;
            align-items: center;
            gap: 0.375rem;
            padding: 0.375rem 0.75rem;
            border: 1px solid var(--color-border);
            border-radius: 999px;
            background: none;
            color: var(--color-text);
            font: inherit;
            cursor: pointer;
        }

        .button:hover { border-color: var(--color-text); text-decoration: none; }

        .hero h1 { font-size: 2.5rem; margin: 0 0 0.5rem; }
        .typewriter { font-size: 1.5rem; color: var(--color-muted); min-height: 2.5rem; }
        .typewriter .caret { display: inline-block; width: 2px; height: 1.25em; margin-left: 2px; vertical-align: text-bottom; background: currentColor; }
        .typewriter.idle .caret { animation: blink 1s step-end infinite; }
        @keyframes blink { 50% { opacity: 0; } }

        .links { display: flex; flex-wrap: wrap; gap: 0.5rem; margin-top: 2rem; list-style: none; padding: 0; }
        .links details { position: relative; }
        .links details summary { list-style: none; }
        .links details[open] .menu {
            position: absolute;
            top: 110%;
            left: 0;
            display: flex;
            flex-direction: column;
            gap: 0.25rem;
            padding: 0.5rem;
            border: 1px solid var(--color-border);
            border-radius: 0.5rem;
            background: var(--color-bg);
        }

        .post-list { list-style: none; padding: 0; }
        .post-list li { margin-bottom: 1.5rem; }
        .post-list .meta, .post .meta { color: var(--color-muted); font-size: 0.875rem; }
        .tag { margin-right: 0.5rem; }

        .post .languages { display: flex; gap: 0.5rem; margin: 1rem 0; }
        .post .languages .current { font-weight: 600; }
        .post .content pre { padding: 1rem; overflow-x: auto; border-radius: 0.5rem; background: var(--color-code-bg); }
        .post .content img { max-width: 100%; }
        .post footer { margin-top: 3rem; padding-top: 1rem; border-top: 1px solid var(--color-border); }
    </style>
</head>
<body>
    <div class="container">
        <header class="site">
            <nav>
                <a href="/">{{ site_title }}</a>
                <a href="/blog">Blog</a>
                <a href="/blog/rss.xml">RSS</a>
                <button class="button theme-toggle" type="button" data-pref="uiStyle">Theme</button>
            </nav>
        </header>
        <main>
{{ content }}
        </main>
    </div>
    <script>
        document.querySelector('.theme-toggle').addEventListener('click', function () {
            var root = document.documentElement;
            var dark = !root.classList.contains('dark-theme');
            root.classList.toggle('dark-theme', dark);
            root.classList.toggle('default-theme', !dark);
            fetch('/api/prefs/uiStyle', {
                method: 'PUT',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(dark ? 'dark' : 'default')
            }).catch(function () {});
        });
    </script>
</body>
</html>"##;

/// Landing page body.
pub const HOME_TEMPLATE: &str = r#"<section class="hero">
    <h1>{{ greeting }}</h1>
    <p class="typewriter idle" data-source="/api/typewriter"><span class="text">{{ snippet }}</span><span class="caret"></span></p>
    <p class="description">{{ description? }}</p>
    <ul class="links">
{{ links }}
    </ul>
</section>
<script>
    (function () {
        var el = document.querySelector('.typewriter');
        if (!el || !window.EventSource) return;
        var text = el.querySelector('.text');
        var source = new EventSource(el.dataset.source);
        source.onmessage = function (event) {
            var frame = JSON.parse(event.data);
            text.textContent = frame.current;
            el.classList.toggle('idle', frame.idle);
        };
        source.onerror = function () { source.close(); };
    })();
</script>"#;

/// Blog index body.
pub const BLOG_INDEX_TEMPLATE: &str = r#"<section class="blog">
    <h1>{{ title }}</h1>
    <ul class="post-list">
{{ items }}
    </ul>
</section>"#;

/// Single post body.
pub const POST_TEMPLATE: &str = r#"<article class="post">
    <header>
        <h1>{{ title }}</h1>
        <p class="meta">{{ meta? }}</p>
        <nav class="languages">{{ languages? }}</nav>
    </header>
    <div class="content">
{{ content }}
    </div>
    <footer>
        <a href="{{ share_url }}" target="_blank" rel="noopener">Share on Twitter</a>
        · <a href="/blog">All posts</a>
    </footer>
</article>"#;

/// Not found body.
pub const NOT_FOUND_TEMPLATE: &str = r#"<section class="not-found">
    <h1>404</h1>
    <p>This page could not be found.</p>
    <p><a href="/">Back home</a></p>
</section>"#;

/// Client-side redirect for static hosting.
pub const REDIRECT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta http-equiv="refresh" content="0; url={{ redirect_url }}">
    <link rel="canonical" href="{{ redirect_url }}">
    <title>Redirecting...</title>
</head>
<body>
    <p>Redirecting to <a href="{{ redirect_url }}">{{ redirect_url }}</a></p>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_simple_render() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let ctx = TemplateContext::new().with_var("name", "World");
        assert_eq!(template.render(&ctx).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_template_optional_variable() {
        let template = Template::new("test", "Hello{{ suffix? }}!");
        assert_eq!(template.render(&TemplateContext::new()).unwrap(), "Hello!");

        let ctx = TemplateContext::new().with_opt("suffix", Some(", World"));
        assert_eq!(template.render(&ctx).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_template_missing_required_variable() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let result = template.render(&TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::MissingVariable(name)) if name == "name"));
    }

    #[test]
    fn test_template_unclosed_delimiter() {
        let template = Template::new("test", "Hello, {{ name");
        let result = template.render(&TemplateContext::new().with_var("name", "x"));
        assert!(matches!(result, Err(TemplateError::InvalidSyntax(_))));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = Template::new("test", "{{ a }}");
        let ctx = TemplateContext::new().with_var("a", "{{ b }}");
        assert_eq!(template.render(&ctx).unwrap(), "{{ b }}");
    }

    #[test]
    fn test_registry_has_builtins() {
        let registry = TemplateRegistry::new();
        for name in ["base", "home", "blog_index", "post", "not_found", "redirect"] {
            assert!(registry.get(name).is_some(), "{name}");
        }
        assert!(matches!(
            registry.render("missing", &TemplateContext::new()),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_render_base_template() {
        let registry = TemplateRegistry::new();
        let ctx = TemplateContext::new()
            .with_var("lang", "en")
            .with_var("theme_class", "dark-theme")
            .with_var("head", "<title>Home | Site</title>")
            .with_var("site_title", "Site")
            .with_var("content", "<p>Hello!</p>");

        let html = registry.render("base", &ctx).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en" class="dark-theme">"#));
        assert!(html.contains("<title>Home | Site</title>"));
        assert!(html.contains("<p>Hello!</p>"));
    }
}
