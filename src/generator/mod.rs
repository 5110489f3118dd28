//! Generator module - writes the artifacts the presentation layer consumes
//!
//! Everything is derived from the public post collection: a sitemap, an
//! Atom feed, a search index and the JSON listing/detail files that static
//! page builds read instead of touching markdown.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::content::PostSummary;
use crate::helpers::{
    absolutize_urls, escape_xml, full_url_for, post_url, strip_html, strip_invalid_xml_chars,
};
use crate::query::{PostCollection, PostDetail};
use crate::Site;

/// Directory (under public) holding the JSON artifacts
pub const API_DIR: &str = "api";

/// Static artifact generator
pub struct Generator {
    site: Site,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Self {
        Self { site: site.clone() }
    }

    /// Generate every artifact from the given (public) collection
    pub fn generate(&self, posts: &PostCollection) -> Result<()> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        // Detail files of removed posts must not linger
        let api_dir = public_dir.join(API_DIR);
        if api_dir.exists() {
            fs::remove_dir_all(&api_dir)?;
        }

        self.generate_api(posts)?;
        write_file(&public_dir.join("sitemap.xml"), &sitemap_xml(&self.site.config, posts))?;
        tracing::info!("Generated sitemap.xml");
        write_file(&public_dir.join("atom.xml"), &atom_feed(&self.site.config, posts))?;
        tracing::info!("Generated atom.xml");
        self.generate_search_index(posts)?;

        Ok(())
    }

    /// Listing, detail, static params and count files
    fn generate_api(&self, posts: &PostCollection) -> Result<()> {
        let config = &self.site.config;
        let api_dir = self.site.public_dir.join(API_DIR);

        let summaries: Vec<PostSummary> = posts
            .all()
            .iter()
            .map(|p| PostSummary::new(p, &config.default_images))
            .collect();
        write_json(&api_dir.join("posts.json"), &summaries)?;

        for post in posts.all() {
            if let Some(detail) = PostDetail::build(posts, &post.slug, config) {
                write_json(
                    &api_dir.join("posts").join(format!("{}.json", post.slug)),
                    &detail,
                )?;
                tracing::debug!("Generated detail for {}", post.slug);
            }
        }

        let slugs: Vec<&str> = posts.all().iter().map(|p| p.slug.as_str()).collect();
        write_json(&api_dir.join("slugs.json"), &slugs)?;
        write_json(
            &api_dir.join("categories.json"),
            &posts.categories_with_counts(),
        )?;
        write_json(&api_dir.join("tags.json"), &posts.tags_with_counts())?;

        tracing::info!("Generated JSON for {} posts", posts.len());
        Ok(())
    }

    /// Generate search index (JSON)
    fn generate_search_index(&self, posts: &PostCollection) -> Result<()> {
        let config = &self.site.config;
        let search_data: Vec<serde_json::Value> = posts
            .all()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "title": p.title,
                    "url": post_url(config, &p.slug),
                    "content": strip_html(&p.content_html),
                    "tags": p.tags,
                    "category": p.category,
                    "date": p.published_at.format("%Y-%m-%d").to_string(),
                })
            })
            .collect();

        write_json(&self.site.public_dir.join("search.json"), &search_data)?;
        tracing::info!("Generated search.json");
        Ok(())
    }
}

/// Sitemap listing the site root, the blog index, category pages and
/// every post in the collection
pub fn sitemap_xml(config: &SiteConfig, posts: &PostCollection) -> String {
    let newest = posts.all().iter().map(|p| p.updated_at).max();

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    push_url(&mut xml, &full_url_for(config, ""), newest);
    push_url(
        &mut xml,
        &full_url_for(config, &format!("{}/", config.blog_dir.trim_matches('/'))),
        newest,
    );

    for category in posts.categories_with_counts() {
        let lastmod = posts
            .filter_by_category(&category.name)
            .iter()
            .map(|p| p.updated_at)
            .max();
        push_url(
            &mut xml,
            &full_url_for(config, &config.category_path(&category.name)),
            lastmod,
        );
    }

    for post in posts.all() {
        push_url(&mut xml, &post_url(config, &post.slug), Some(post.updated_at));
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: Option<DateTime<Utc>>) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(loc)));
    if let Some(lastmod) = lastmod {
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            lastmod.format("%Y-%m-%d")
        ));
    }
    xml.push_str("  </url>\n");
}

/// Atom feed of the newest posts
pub fn atom_feed(config: &SiteConfig, posts: &PostCollection) -> String {
    let base_url = config.url.trim_end_matches('/');
    let updated = posts
        .all()
        .iter()
        .map(|p| p.updated_at)
        .max()
        .unwrap_or_else(Utc::now);

    let mut feed = String::new();
    feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    feed.push('\n');
    feed.push_str(&format!(
        "<feed xmlns=\"http://www.w3.org/2005/Atom\" xml:lang=\"{}\">\n",
        escape_xml(&config.language)
    ));
    feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
    if !config.description.is_empty() {
        feed.push_str(&format!(
            "  <subtitle>{}</subtitle>\n",
            escape_xml(&config.description)
        ));
    }
    feed.push_str(&format!(
        "  <link href=\"{}\" rel=\"self\"/>\n",
        full_url_for(config, "atom.xml")
    ));
    feed.push_str(&format!("  <link href=\"{}\"/>\n", full_url_for(config, "")));
    feed.push_str(&format!("  <updated>{}</updated>\n", updated.to_rfc3339()));
    feed.push_str(&format!("  <id>{}</id>\n", full_url_for(config, "")));
    feed.push_str(&format!(
        "  <author><name>{}</name></author>\n",
        escape_xml(&config.author)
    ));

    for post in posts.all().iter().take(config.feed_limit) {
        let url = post_url(config, &post.slug);
        feed.push_str("  <entry>\n");
        feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
        feed.push_str(&format!("    <link href=\"{}\"/>\n", url));
        feed.push_str(&format!("    <id>{}</id>\n", url));
        feed.push_str(&format!(
            "    <published>{}</published>\n",
            post.published_at.to_rfc3339()
        ));
        feed.push_str(&format!(
            "    <updated>{}</updated>\n",
            post.updated_at.to_rfc3339()
        ));
        feed.push_str(&format!(
            "    <author><name>{}</name></author>\n",
            escape_xml(&post.author.name)
        ));
        feed.push_str(&format!(
            "    <summary>{}</summary>\n",
            escape_xml(&post.excerpt)
        ));
        let content = strip_invalid_xml_chars(&absolutize_urls(&post.content_html, base_url));
        // "]]>" would close the CDATA section early
        let content = content.replace("]]>", "]]]]><![CDATA[>");
        feed.push_str(&format!(
            "    <content type=\"html\"><![CDATA[{}]]></content>\n",
            content
        ));
        feed.push_str("  </entry>\n");
    }

    feed.push_str("</feed>\n");
    feed
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_file(path, &json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
