//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,
    pub blog_dir: String,
    pub category_dir: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Writing
    pub default_category: String,
    pub render_drafts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Derived fields
    pub words_per_minute: usize,
    pub excerpt_length: usize,
    pub related_limit: usize,
    #[serde(default)]
    pub default_images: Vec<String>,

    // Feed
    pub feed_limit: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Inkpress".to_string(),
            description: String::new(),
            author: "Editorial Team".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            blog_dir: "blog".to_string(),
            category_dir: "category".to_string(),

            content_dir: "content/posts".to_string(),
            public_dir: "public".to_string(),

            default_category: "uncategorized".to_string(),
            render_drafts: false,
            highlight: HighlightConfig::default(),

            words_per_minute: 200,
            excerpt_length: 160,
            related_limit: 3,
            default_images: Vec::new(),

            feed_limit: 20,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        // An empty file deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// URL path of a post page, e.g. `/blog/hello-world/`
    pub fn post_path(&self, slug: &str) -> String {
        format!("{}/{}/", self.blog_dir.trim_matches('/'), slug)
    }

    /// URL path of a category listing page
    pub fn category_path(&self, category: &str) -> String {
        format!(
            "{}/{}/{}/",
            self.blog_dir.trim_matches('/'),
            self.category_dir.trim_matches('/'),
            slug::slugify(category)
        )
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}
